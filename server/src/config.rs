//! Command-line and environment configuration.

use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use todo_core::{FileStore, SqliteStore};

use crate::handlers::SharedStore;

/// Persistence strategy for the todo collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// One SQLite table, one row per todo.
    Sqlite,
    /// One JSON file rewritten on every change.
    File,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "todo-server", about = "Todo list HTTP service", version)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "TODO_HOST", default_value_t = IpAddr::V6(Ipv6Addr::UNSPECIFIED))]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    #[arg(long, env = "TODO_BACKEND", value_enum, default_value_t = Backend::Sqlite)]
    pub backend: Backend,

    /// Directory holding the store file.
    #[arg(long, env = "TODO_DATA_DIR", default_value = "store")]
    pub data_dir: PathBuf,

    /// Built frontend served for every non-API path.
    #[arg(long, env = "TODO_STATIC_DIR", default_value = "frontend/dist")]
    pub static_dir: PathBuf,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn store_path(&self) -> PathBuf {
        let file = match self.backend {
            Backend::Sqlite => "todos.db",
            Backend::File => "todos.json",
        };
        self.data_dir.join(file)
    }

    /// Build the configured store. The caller still has to `initialize` it.
    pub fn open_store(&self) -> SharedStore {
        match self.backend {
            Backend::Sqlite => Arc::new(SqliteStore::new(self.store_path())),
            Backend::File => Arc::new(FileStore::new(self.store_path())),
        }
    }
}
