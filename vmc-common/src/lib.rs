//! # VMC Common Library
//!
//! Shared code for the video metadata catalog tools:
//! - Error types
//! - Configuration loading and root folder resolution
//! - Human-readable clock formatting

pub mod config;
pub mod error;
pub mod human_time;

pub use error::{Error, Result};
