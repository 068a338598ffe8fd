//! Core types for the DVS super-admin console.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod pagination;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use pagination::{PAGE_SIZE, PageWindow, page_count};
pub use status::*;
