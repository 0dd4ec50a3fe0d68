//! Core domain + application logic for the guild roster bot.
//!
//! This crate is intentionally framework-agnostic. Discord REST / gateway access
//! lives behind ports (traits) implemented in the adapter crate.

pub mod config;
pub mod domain;
pub mod errors;
pub mod export;
pub mod logging;
pub mod ports;
pub mod service;

pub use errors::{Error, Result};
