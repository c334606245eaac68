pub mod auth;
pub mod auth_store;
pub mod categories;
pub mod client;
pub mod clock;
pub mod error;
pub mod events;
pub mod monitor;
pub mod refresh;
pub mod rooms;
pub mod stats;
