//! Threadline Core - Shared domain types.
//!
//! This crate provides the types shared by every Threadline component:
//! - `storefront` - Server-rendered shop (catalog, cart, checkout, profile)
//! - `cli` - Command-line tools for migrations and catalog checks
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. Validation rules that both the storefront and the
//! CLI rely on (email, mobile number, profile fields, cart arithmetic) live here.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, products, profiles, carts and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
