pub mod gateway;
pub mod storage;
pub mod tracker;
