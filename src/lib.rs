//! # depreg
//!
//! A private dependency registry: imports identified by URL, immutable
//! versioned archives, and per-import owner/reader access control. Usable
//! as a standalone server or as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! depreg = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use depreg::config::RegistryConfig;
//! use depreg::registry::Registry;
//! use depreg::server::{AppState, create_router};
//!
//! let config = RegistryConfig::load(None)?;
//! let registry = Registry::open(&config)?;
//! let router = create_router(Arc::new(AppState::new(registry.gate)));
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

pub mod auth;
pub mod binstore;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod manager;
pub mod metastore;
pub mod registry;
pub mod resolver;
pub mod server;
pub mod store;
pub mod types;
