use crate::ConfigResult;

/// Trait for configuration validation
pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}

/// General validation utilities
pub struct ValidationUtils;

impl ValidationUtils {
    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field_name: &str) -> ConfigResult<()> {
        if value.trim().is_empty() {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} cannot be empty"
            )));
        }
        Ok(())
    }

    /// Validate that a value lies within an inclusive range
    pub fn validate_range<T>(value: T, min: T, max: T, field_name: &str) -> ConfigResult<()>
    where
        T: PartialOrd + std::fmt::Display,
    {
        if value < min || value > max {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be between {min} and {max}, got {value}"
            )));
        }
        Ok(())
    }

    /// Validate that a millisecond timeout is positive and reasonable
    pub fn validate_timeout_ms(timeout_ms: u64, field_name: &str) -> ConfigResult<()> {
        if timeout_ms == 0 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be greater than 0"
            )));
        }
        if timeout_ms > 3_600_000 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be less than or equal to 3600000"
            )));
        }
        Ok(())
    }

    /// Validate a socket address of the form host:port
    pub fn validate_bind_address(address: &str, field_name: &str) -> ConfigResult<()> {
        Self::validate_not_empty(address, field_name)?;
        address
            .parse::<std::net::SocketAddr>()
            .map(|_| ())
            .map_err(|e| {
                crate::ConfigError::Validation(format!("{field_name} is not a valid address: {e}"))
            })
    }
}
