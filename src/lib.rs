pub mod config;
pub mod crawler;
pub mod parser;
pub mod service;
pub mod storage;
pub mod utils;

pub use utils::{NewsError, NewsResult};
