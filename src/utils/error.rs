use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Encoder '{program}' not found or not runnable: {reason}")]
    EncoderNotFound { program: String, reason: String },

    #[error("Encoder exited with status {exit_code:?}: {stderr}")]
    EncoderFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("SVG rendering error: {message}")]
    RenderError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Task error: {message}")]
    TaskError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Environment,
    Conversion,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 依嚴重程度對應程式結束碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl MediaError {
    pub fn render(message: impl Into<String>) -> Self {
        MediaError::RenderError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        MediaError::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MediaError::InputNotFound { .. } => ErrorCategory::Input,
            MediaError::EncoderNotFound { .. } => ErrorCategory::Environment,
            MediaError::EncoderFailed { .. } | MediaError::RenderError { .. } => {
                ErrorCategory::Conversion
            }
            MediaError::ConfigError { .. } | MediaError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            MediaError::IoError(_)
            | MediaError::SerializationError(_)
            | MediaError::TaskError { .. } => ErrorCategory::System,
        }
    }

    /// 缺少輸入檔只回報錯誤，不視為失敗的執行
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Conversion => ErrorSeverity::Medium,
            ErrorCategory::Environment | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MediaError::InputNotFound { path } => {
                format!("Cannot find input '{}'", path.display())
            }
            MediaError::EncoderNotFound { program, .. } => {
                format!("Cannot find the '{}' command", program)
            }
            MediaError::EncoderFailed { exit_code, .. } => match exit_code {
                Some(code) => format!("Encoder failed with exit code {}", code),
                None => "Encoder was terminated by a signal".to_string(),
            },
            MediaError::RenderError { message } => format!("Could not render SVG: {}", message),
            MediaError::ConfigError { message } => format!("Invalid configuration: {}", message),
            MediaError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid value for '{}': {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MediaError::InputNotFound { .. } => {
                "Check the path, or run the command from the directory that contains the file"
            }
            MediaError::EncoderNotFound { .. } => {
                "Make sure FFmpeg is installed and available on your PATH, or pass --encoder"
            }
            MediaError::EncoderFailed { .. } => {
                "Re-run with --verbose to see the encoder output for this file"
            }
            MediaError::RenderError { .. } => "Open the SVG in a viewer to check that it is valid",
            MediaError::ConfigError { .. } | MediaError::InvalidConfigValueError { .. } => {
                "Fix the command-line flags or the TOML configuration file"
            }
            MediaError::IoError(_) => "Check file permissions and free disk space",
            MediaError::SerializationError(_) | MediaError::TaskError { .. } => {
                "Re-run with --verbose and report the log if the problem persists"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, MediaError>;
