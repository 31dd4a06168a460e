// Infrastructure layer module
// Database adapters and the filesystem storage service

pub mod database;
pub mod repositories;
pub mod storage;
