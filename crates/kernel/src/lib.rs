//! Vitrina Kernel Library
//!
//! Listing query engine and HTTP surface for the collectibles storefront.
//! The main entry point for running the server is the `vitrina` binary.

pub mod catalog;
pub mod config;
pub mod error;
pub mod gather;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use state::AppState;
