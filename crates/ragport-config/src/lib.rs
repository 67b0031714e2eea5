//! Configuration for ragport.
//!
//! Values are resolved in this order, later sources winning:
//!
//! 1. built-in defaults
//! 2. the TOML config file (`--config`, else `ragport.toml` if present)
//! 3. `{env:VAR}` and `{file:path}` references inside the file
//! 4. `RAGPORT_*` environment variables (a `.env` file fills in unset ones)
//! 5. command line flags, applied by the CLI
//!
//! ```toml
//! [graph]
//! uri = "ws://localhost:8000"
//! username = "root"
//! password = "{env:SURREAL_PASSWORD}"
//!
//! [import]
//! batch_size = 500
//! ```

pub mod components;
pub mod error;
pub mod loader;
pub mod references;

pub use components::{
    DuplicatePolicy, EmbeddingEndpoint, EmbeddingFlavor, EmbeddingSettings, GraphConfig,
    ImportConfig, ImportSettings, SourceConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, DEFAULT_CONFIG_FILE};
