//! Command-line and environment configuration for the gateway binary.

use std::sync::Arc;

use axum::http::HeaderValue;
use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::store::{MemoryStore, RecordStore, RestStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// In-process table, lost on exit.
    Memory,
    /// PostgREST-compatible hosted database.
    Rest,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--store-url (SUPABASE_URL) is required for the rest store")]
    MissingStoreUrl,

    #[error("--store-key (SUPABASE_ANON_KEY) is required for the rest store")]
    MissingStoreKey,

    #[error("invalid CORS origin {0:?}")]
    InvalidOrigin(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Parser, Debug, Clone)]
#[command(name = "todo-gateway")]
#[command(about = "HTTP gateway between the todo UI and its record store", long_about = None)]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Record store backend
    #[arg(long, env = "TODO_STORE", value_enum, default_value_t = StoreKind::Memory)]
    pub store: StoreKind,

    /// Base URL of the hosted store
    #[arg(long, env = "SUPABASE_URL")]
    pub store_url: Option<String>,

    /// API key of the hosted store
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub store_key: Option<String>,

    /// Table holding the todo rows
    #[arg(long, env = "TODO_TABLE", default_value = "todos")]
    pub table: String,

    /// Allowed browser origins; any origin when empty
    #[arg(long = "cors-origin", env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parse the configured origins. Blank entries are skipped; any other
    /// entry that is not a valid header value fails.
    pub fn allowed_origins(&self) -> Result<Vec<HeaderValue>, ConfigError> {
        self.cors_origins
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(|o| HeaderValue::from_str(o).map_err(|_| ConfigError::InvalidOrigin(o.to_string())))
            .collect()
    }

    pub fn build_store(&self) -> Result<Arc<dyn RecordStore>, ConfigError> {
        match self.store {
            StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreKind::Rest => {
                let url = self.store_url.as_deref().ok_or(ConfigError::MissingStoreUrl)?;
                let key = self.store_key.as_deref().ok_or(ConfigError::MissingStoreKey)?;
                Ok(Arc::new(RestStore::new(url, key, &self.table)?))
            }
        }
    }
}
