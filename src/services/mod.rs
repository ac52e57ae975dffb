pub mod export;
pub mod file_records;
pub mod filter;
pub mod reaper;
pub mod records;
pub mod storage;
