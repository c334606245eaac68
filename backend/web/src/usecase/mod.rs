pub mod error;
pub mod images;
