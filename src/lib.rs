//! CMS API: a generic REST resource router over a fixed content model on PostgreSQL.

pub mod case;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod registry;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{ServerConfig, StorageBackend};
pub use dispatch::ResourcePath;
pub use error::{ApiError, ConfigError, StoreError};
pub use migration::{apply_migrations, reset};
pub use registry::{ContentLookup, Registry, ResourceBundle};
pub use routes::app;
pub use schema::ResourceKind;
pub use state::AppState;
pub use store::ensure_database_exists;
pub use store::memory::MemoryStore;
