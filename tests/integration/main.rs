mod common;
mod http;
mod reaper;
mod records;
