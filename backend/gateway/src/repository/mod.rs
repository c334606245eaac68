pub mod cookies;
pub mod storage;
