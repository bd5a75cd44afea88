// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod learning;
pub mod persistence;
pub mod render;
pub mod store;
pub mod terminal;
pub use crate::core::engine::LoggerEngine;
pub use crate::error::{EntryError, LogError};
