//! Wayfarer Core - Domain models, errors, and configuration
//!
//! This crate contains the domain types shared by the search engine, the
//! feed engine and every storage or provider adapter.

pub mod config;
pub mod error;
pub mod geodesy;
pub mod models;

pub use error::{ErrorKind, Result, WayfarerError};
