// src/core/mod.rs

pub mod engine;
pub mod phonetic;
pub mod resolver;
pub mod session;
pub mod types;
