//! Trinket Store Core - Shared types library.
//!
//! This crate provides common types used across all Trinket Store components:
//! - `client` - Backend fetch adapter, resource stores, cart and checkout
//! - `cli` - Command-line front end over the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`fields`] - Form field validators and normalizers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod fields;
pub mod types;

pub use types::*;
