pub mod category;
pub mod envelope;
pub mod listing;
pub mod room;
pub mod session;
pub mod stats;
pub mod upload;
