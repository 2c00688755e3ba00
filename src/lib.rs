//! Market desk service: historical quotes, investment-growth simulation and
//! a closed-form European option pricer behind an authenticated HTTP API.
//!
//! The pricing engine under [`models`] is pure and synchronous; everything
//! else is I/O around it.

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod feeds;
pub mod models;
pub mod portfolio;
pub mod server;
pub mod state;

pub use errors::{AppError, AppResult};
