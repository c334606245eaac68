pub mod guard;
pub mod images;
