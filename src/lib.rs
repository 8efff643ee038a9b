pub mod backup;
pub mod config;
pub mod error;
pub mod logger;
pub mod naming;
pub mod utils;
pub mod validate;

pub use backup::{copy_tree, copy_tree_excluding, BackupJob, BackupSummary, SourceReport};
pub use config::{
    create_sample_settings, default_settings_path, dump_settings, load_settings, parse_settings,
    timestamp, LogLevel, Settings,
};
pub use error::StampbakError;
pub use logger::{init_file_logging, Logger, TracingLogger};
pub use naming::{resolve_unique_dir, source_name};
pub use utils::format_size;
pub use validate::{is_valid_path, validate_source};

/// Main library result type
pub type Result<T> = std::result::Result<T, StampbakError>;
