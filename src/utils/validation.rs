use crate::utils::error::{ImportError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Checks a submitted source locator: an http(s)/file URL or a filesystem path.
pub fn validate_source(source: &str) -> Result<()> {
    if source.trim().is_empty() {
        return Err(ImportError::InvalidSource {
            reason: "source cannot be empty".to_string(),
        });
    }

    match Url::parse(source) {
        Ok(url) => match url.scheme() {
            "http" | "https" | "file" => Ok(()),
            scheme => Err(ImportError::InvalidSource {
                reason: format!("unsupported scheme: {}", scheme),
            }),
        },
        // Not a URL: treat as a local path.
        Err(_) => validate_path("source", source).map_err(|_| ImportError::InvalidSource {
            reason: "not a valid URL or path".to_string(),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ImportError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ImportError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ImportError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ImportError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_https_and_file_urls() {
        assert!(validate_source("http://example.com/dict.txt").is_ok());
        assert!(validate_source("https://example.com/dict.txt").is_ok());
        assert!(validate_source("file:///var/data/dict.txt").is_ok());
    }

    #[test]
    fn accepts_bare_paths() {
        assert!(validate_source("./dict/es-en.txt").is_ok());
        assert!(validate_source("dict.txt").is_ok());
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(matches!(
            validate_source("ftp://example.com/dict.txt"),
            Err(ImportError::InvalidSource { .. })
        ));
    }

    #[test]
    fn rejects_empty_source() {
        assert!(validate_source("").is_err());
        assert!(validate_source("   ").is_err());
    }

    #[test]
    fn validates_numbers_against_minimum() {
        assert!(validate_positive_number("batch_size", 500, 1).is_ok());
        assert!(validate_positive_number("batch_size", 0, 1).is_err());
    }
}
