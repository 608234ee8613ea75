#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod metrics;

// 에러
pub use error::{ConfigError, LogfwdError};

// 설정
pub use config::LogfwdConfig;
