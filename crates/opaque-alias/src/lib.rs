#![forbid(unsafe_code)]
//! # Opaque Alias
//!
//! Opaque aliases for internal identifiers and application routes.
//!
//! Real ids (database keys) and static page paths are swapped for random
//! tokens before they reach a URL. The correspondence is remembered in a
//! [`MappingStore`] backed by any [`KeyValueBackend`], and can be reversed
//! when a token comes back.
//!
//! Aliases are unsigned random strings. They hide predictable ids; they do
//! not authorize anything.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use opaque_alias::{AliasManager, EntityType, MemoryBackend, UserRole};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = AliasManager::init_default_config(Arc::new(MemoryBackend::new()))?;
//!
//! // Alias an order id and resolve it later
//! let token = manager.get_or_create_secure_id("ORD-1042", EntityType::Order)?;
//! assert!(manager.is_valid_secure_order_id(&token));
//! assert_eq!(manager.get_real_id_from_secure(&token).as_deref(), Some("ORD-1042"));
//!
//! // Route aliases are stable
//! let routes = manager.initialize_secure_routes()?;
//! let admin = &routes["/admin/produits"];
//! assert!(manager.validate_route_access(admin, Some(UserRole::Admin)).is_valid);
//! assert!(!manager.validate_route_access(admin, Some(UserRole::Client)).is_valid);
//!
//! // Sign-out forgets ids but keeps routes
//! manager.reset_mappings();
//! assert_eq!(manager.get_real_id_from_secure(&token), None);
//! assert_eq!(manager.get_real_route(admin).as_deref(), Some("/admin/produits"));
//! # Ok(())
//! # }
//! ```

mod backend;
mod catalog;
mod config;
mod domain;
mod error;
mod generator;
mod routes;
mod sanitize;
mod store;
mod token_parser;
mod validator;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use catalog::{CatalogRoute, RouteCatalog, RouteSection};
pub use config::{
    AccessPolicy, AliasConfig, EntityType, GeneratorConfig, InputLimits, StorageKeys, UserRole,
};
pub use domain::AliasManager;
pub use error::{ConfigError, Error, OperationError, Result, StorageError};
pub use generator::IdGenerator;
pub use routes::RouteSecurity;
pub use sanitize::{
    sanitize_input, sanitize_value, validate_and_sanitize_data, validate_url_param_values,
    validate_url_params,
};
pub use store::{MappingStats, MappingStore};
pub use token_parser::{parse_token, TokenShape, ORDER_TOKEN_LENGTH};
pub use validator::{RouteAccess, SecurityValidator};
