//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    ReadError {
        /// File path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid TOML for the schema.
    #[error("failed to parse {path}: {source}")]
    ParseError {
        /// File path.
        path: String,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range or inconsistent.
    #[error("invalid {field}: {message}")]
    ValidationError {
        /// Dotted path of the offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A credential required to talk to Discord is missing.
    #[error("missing {field}; set it in the config file or via {env}")]
    MissingCredential {
        /// Dotted path of the field.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = ConfigError::ValidationError {
            field: "commands.page_limit".into(),
            message: "must be between 1 and 25".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid commands.page_limit: must be between 1 and 25"
        );
    }

    #[test]
    fn missing_credential_names_env_var() {
        let err = ConfigError::MissingCredential {
            field: "discord.public_key",
            env: "DISCORD_PUBLIC_KEY",
        };
        assert!(err.to_string().contains("DISCORD_PUBLIC_KEY"));
    }
}
