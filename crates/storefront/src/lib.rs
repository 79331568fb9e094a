//! Threadline storefront library.
//!
//! Server-rendered shop front: catalog, product detail, cart, checkout,
//! order history, login and a profile editor. The binary in `main.rs` wires
//! configuration, stores and the backend client; everything else lives here
//! so it can be tested in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
