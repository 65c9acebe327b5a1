//! # Exam Author Library
//!
//! This library exposes the exam-author modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod token;

// Re-export exam_author_core for convenience
pub use exam_author_core;
