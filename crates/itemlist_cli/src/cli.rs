//! Command-line parser and global option handling.

use clap::{Args, Parser, Subcommand, ValueEnum};
use itemlist_core::{
    BackendConfig, IdScheme, StoreConfig, WritePolicy, DEFAULT_STORAGE_KEY,
};
use std::path::{Path, PathBuf};

const DEFAULT_HTTP_TIMEOUT_MS: &str = "10000";

/// Manage a small list of titled items.
#[derive(Debug, Parser)]
#[command(name = "itemlist")]
#[command(about = "Create, edit, search and delete list items")]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long = "log-dir", env = "ITEMLIST_LOG_DIR", global = true)]
    pub log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long = "log-level", env = "ITEMLIST_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    Memory,
    File,
    Sqlite,
    Http,
}

/// Where items are stored.
#[derive(Debug, Args)]
pub struct StoreArgs {
    #[arg(
        long,
        value_enum,
        env = "ITEMLIST_BACKEND",
        default_value = "file",
        global = true
    )]
    pub backend: BackendKind,

    /// Directory for the file backend
    #[arg(long = "data-dir", env = "ITEMLIST_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Database file for the sqlite backend
    #[arg(long = "db", env = "ITEMLIST_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Base URL for the http backend
    #[arg(long = "url", env = "ITEMLIST_URL", global = true)]
    pub url: Option<String>,

    #[arg(
        long = "timeout-ms",
        env = "ITEMLIST_TIMEOUT_MS",
        default_value = DEFAULT_HTTP_TIMEOUT_MS,
        global = true
    )]
    pub timeout_ms: u64,

    /// Snapshot storage key
    #[arg(long = "key", env = "ITEMLIST_KEY", default_value = DEFAULT_STORAGE_KEY, global = true)]
    pub key: String,

    /// best-effort|strict
    #[arg(
        long = "write-policy",
        env = "ITEMLIST_WRITE_POLICY",
        default_value = "best-effort",
        global = true
    )]
    pub write_policy: WritePolicy,

    /// uuid|timestamp
    #[arg(long = "id-scheme", env = "ITEMLIST_ID_SCHEME", default_value = "uuid", global = true)]
    pub id_scheme: IdScheme,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show items, newest first
    List {
        /// Case-insensitive match on title or description
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Add an item
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Change an item's title or description
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long = "clear-description")]
        clear_description: bool,
    },
    /// Delete one item
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every item
    Clear {
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the version
    Version,
}

impl StoreArgs {
    /// Resolves flags into a store config; the file backend defaults to
    /// `./.itemlist` under the current directory.
    pub fn to_config(&self) -> Result<StoreConfig, String> {
        let backend = match self.backend {
            BackendKind::Memory => BackendConfig::Memory,
            BackendKind::File => {
                let dir = match &self.data_dir {
                    Some(dir) => absolute(dir)?,
                    None => absolute(Path::new(".itemlist"))?,
                };
                BackendConfig::File { dir }
            }
            BackendKind::Sqlite => {
                let path = self
                    .db
                    .as_ref()
                    .ok_or_else(|| "--db is required for the sqlite backend".to_string())?;
                BackendConfig::Sqlite {
                    path: absolute(path)?,
                }
            }
            BackendKind::Http => {
                let base_url = self
                    .url
                    .clone()
                    .ok_or_else(|| "--url is required for the http backend".to_string())?;
                BackendConfig::Http {
                    base_url,
                    timeout_ms: self.timeout_ms,
                }
            }
        };

        Ok(StoreConfig {
            backend,
            storage_key: self.key.clone(),
            write_policy: self.write_policy,
            id_scheme: self.id_scheme,
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf, String> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|err| format!("cannot resolve `{}`: {err}", path.display()))
}
