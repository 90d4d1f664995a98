use crate::utils::error::{MediaError, Result};
use regex::Regex;
use std::sync::OnceLock;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MediaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MediaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(MediaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MediaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(MediaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 副檔名不含前導點，也不可包含路徑分隔符
pub fn validate_extension(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    if value.starts_with('.') || value.contains(['/', '\\']) {
        return Err(MediaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Extension must be a bare name such as 'mp4'".to_string(),
        });
    }
    Ok(())
}

/// 位元率格式，例如 24k、96K、1.5M 或 64000
pub fn validate_bitrate(field_name: &str, value: &str) -> Result<()> {
    static BITRATE: OnceLock<Regex> = OnceLock::new();
    let re = BITRATE.get_or_init(|| {
        Regex::new(r"^\d+(\.\d+)?[kKmM]?$").expect("bitrate pattern is valid")
    });

    if !re.is_match(value) {
        return Err(MediaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Expected a bitrate such as 24k, 96k or 64000".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("workers", 4, 1).is_ok());
        assert!(validate_positive_number("workers", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("sizes", 16u32, 1, 2048).is_ok());
        assert!(validate_range("sizes", 0u32, 1, 2048).is_err());
        assert!(validate_range("sizes", 4096u32, 1, 2048).is_err());
    }

    #[test]
    fn test_validate_bitrate() {
        assert!(validate_bitrate("bitrate", "24k").is_ok());
        assert!(validate_bitrate("bitrate", "1.5M").is_ok());
        assert!(validate_bitrate("bitrate", "64000").is_ok());
        assert!(validate_bitrate("bitrate", "").is_err());
        assert!(validate_bitrate("bitrate", "fast").is_err());
        assert!(validate_bitrate("bitrate", "24 k").is_err());
    }

    #[test]
    fn test_validate_extension() {
        assert!(validate_extension("extension", "mp4").is_ok());
        assert!(validate_extension("extension", ".mp4").is_err());
        assert!(validate_extension("extension", "a/b").is_err());
        assert!(validate_extension("extension", "  ").is_err());
    }
}
