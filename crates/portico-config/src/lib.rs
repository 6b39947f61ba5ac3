//! Typed configuration system for Portico.
//!
//! This crate provides a strongly-typed configuration system for Portico
//! applications with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! The configuration system is built around the [`PorticoConfig`] struct:
//!
//! - [`RouterSection`] - suffix normalization and convention-guard settings
//! - [`CacheSection`] - match-result cache settings
//! - [`RouteEntry`] - declared `[[route]]` table entries
//!
//! # Example
//!
//! ```no_run
//! use portico_config::ConfigLoader;
//!
//! # fn main() -> Result<(), portico_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("portico.toml")?
//!     .with_env_prefix("PORTICO")
//!     .load()?;
//!
//! let declared = config.declared_routes()?;
//! println!("{} declared routes", declared.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [router]
//! strict_actions = false
//! namespace_blacklist = ["app.internal"]
//! strip_suffixes = [".html"]
//!
//! [cache]
//! enabled = true
//! ttl_secs = 60
//! max_entries = 10000
//!
//! [[route]]
//! pattern = "/users/{id}"
//! verbs = ["GET"]
//! controller = "Users"
//! action = "show"
//! name = "users.show"
//! ```

#![doc(html_root_url = "https://docs.rs/portico-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::PorticoConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{CacheSection, RouteEntry, RouterSection};
