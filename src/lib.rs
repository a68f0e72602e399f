pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod store;
pub mod utils;

pub use crate::core::{EntryParser, EntryWriter, ImportRunner, SourceFetcher};
pub use config::ServerConfig;
pub use domain::model::{DictionaryEntry, ImportJob, ImportRequest, JobStatus};
pub use store::{FileDictionaryStore, FileJobStore, LocalStorage};
pub use utils::error::{ImportError, Result};
