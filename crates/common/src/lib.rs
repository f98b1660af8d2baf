//! Shared types and configuration for the sqlgate crates.
//!
//! This crate contains the base building blocks for the gateway:
//! - **Configuration**: Strongly typed application configuration (`config`).
//! - **Error Handling**: Unified error type with stable codes (`error`).
//! - **Models**: Transport-neutral values, rows, and schema descriptors (`models`).
pub mod config;
pub mod error;
pub mod models;
