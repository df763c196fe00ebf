//! Barbot firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by the `espidf`
//! feature or `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod catalog;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod pins;
pub mod recipe;
pub mod safety;
pub mod session;

pub mod adapters;
pub mod drivers;
