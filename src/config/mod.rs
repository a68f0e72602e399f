use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "dict-import")]
#[command(about = "Dictionary import service for the bilingual learning app")]
pub struct ServerConfig {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, default_value = "8080")]
    pub port: u16,

    /// Directory holding the dictionary corpus and the job ledger.
    #[arg(long, default_value = "./data")]
    pub data_dir: String,

    #[arg(long, default_value = "es")]
    pub source_lang: String,

    #[arg(long, default_value = "en")]
    pub target_lang: String,

    /// Entries per write transaction.
    #[arg(long, default_value = "500")]
    pub batch_size: usize,

    /// Maximum dictionary source payload in bytes.
    #[arg(long, default_value = "10485760")]
    pub max_source_bytes: u64,

    #[arg(long, default_value = "60")]
    pub fetch_timeout_seconds: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("host", &self.host)?;
        validate_path("data_dir", &self.data_dir)?;
        validate_non_empty_string("source_lang", &self.source_lang)?;
        validate_non_empty_string("target_lang", &self.target_lang)?;
        if self.source_lang == self.target_lang {
            return Err(ImportError::InvalidConfigValue {
                field: "target_lang".to_string(),
                value: self.target_lang.clone(),
                reason: "source and target language must differ".to_string(),
            });
        }
        validate_positive_number("batch_size", self.batch_size as u64, 1)?;
        validate_positive_number("max_source_bytes", self.max_source_bytes, 1)?;
        validate_positive_number("fetch_timeout_seconds", self.fetch_timeout_seconds, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: "./data".to_string(),
            source_lang: "es".to_string(),
            target_lang: "en".to_string(),
            batch_size: 500,
            max_source_bytes: 10 * 1024 * 1024,
            fetch_timeout_seconds: 60,
            verbose: false,
        }
    }

    #[test]
    fn default_shape_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn identical_language_pair_is_rejected() {
        let mut config = config();
        config.target_lang = "es".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = config();
        config.batch_size = 0;
        assert!(config.validate().is_err());
    }
}
