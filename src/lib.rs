pub mod aggregate;
pub mod cli;
pub mod commands;
pub mod config;
pub mod counting;
pub mod error;
pub mod export;
pub mod library;
pub mod samples;
pub mod sequence_processor;
mod utils;

pub use error::{Error, Result};
