//! DVS Core - Shared domain types for the super-admin console.
//!
//! This crate provides common types used across the console components:
//! - `console` - Server-rendered super-admin console
//! - `cli` - Command-line exports and alert broadcasting
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O and no
//! HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, emails, alert/account enums and pagination math

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
