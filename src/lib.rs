pub mod config;
pub mod credentials;
pub mod errors;
pub mod password;
pub mod search;
pub mod service;
pub mod storage;
