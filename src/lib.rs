pub mod config;
pub mod crawler;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod storage;
pub mod utils;
