pub mod geocoding;
pub mod storage;
