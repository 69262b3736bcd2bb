//! # company-directory-graphql
//!
//! GraphQL façade over the B2B company directory: company profiles and the
//! media, representatives, success stories, trade shows and buyer contacts
//! hanging off them.
//!
//! ## Features
//!
//! - **Entity types** - whitelisted fields plus computed media URLs and renditions
//! - **DataLoader** - request-scoped batching of foreign-key lookups
//! - **Cursor Pagination** - keyset cursors over filtered and sorted listings
//! - **Mutations** - permission-checked, validated, transactional writes
//! - **Auth Context** - viewer extraction for the axum GraphQL handler
//!
//! ## Usage
//!
//! ```rust,no_run
//! use company_directory_graphql::{schema::build_schema, store::Store, AppConfig};
//!
//! let config = AppConfig::default();
//! let schema = build_schema(Store::in_memory(), &config);
//! println!("{}", schema.sdl());
//! ```

pub mod auth;
pub mod config;
pub mod dataloaders;
pub mod filters;
pub mod media;
pub mod mutations;
pub mod objects;
pub mod pagination;
pub mod query;
pub mod resolvers;
pub mod schema;
pub mod server;
pub mod store;
pub mod telemetry;
pub mod types;

pub use auth::{graphql_handler, scoped_request, Viewer};
pub use crate::config::AppConfig;
pub use dataloaders::Loaders;
pub use pagination::{Connection, CursorCodec, Edge, PageInfo, PaginationInput};
pub use schema::{build_schema, DirectorySchema};
pub use store::{Store, StoreError};
pub use types::{DateTime, GlobalId};

use thiserror::Error;

/// Errors raised outside the mutation payload contract
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("Pagination error: {0}")]
    PaginationError(String),

    #[error("Invalid global id: {0}")]
    InvalidId(String),

    #[error("Expected an id of type {expected}, got {found}")]
    WrongIdType { expected: &'static str, found: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ::config::ConfigError),
}

/// Result type for directory operations
pub type Result<T> = std::result::Result<T, DirectoryError>;
