//! Human-readable byte size parsing ("250MB", "1GB", "4096").

/// Errors from [`parse_byte_size`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ByteSizeError {
    /// The input was empty after trimming.
    #[error("empty size string")]
    Empty,

    /// The numeric portion did not parse as a decimal integer.
    #[error("invalid size value: {0}")]
    Invalid(String),

    /// The value was zero or negative.
    #[error("size must be positive")]
    NonPositive,

    /// The value multiplied by its suffix exceeds a signed 64-bit integer.
    #[error("size value too large")]
    Overflow,
}

/// Parse a size string like "250MB", "1GB", or "500" (bytes).
///
/// Suffixes KB/MB/GB are case-insensitive powers of 1024; a bare decimal
/// integer is a byte count.
pub fn parse_byte_size(s: &str) -> Result<u64, ByteSizeError> {
    let s = s.trim().to_ascii_uppercase();
    if s.is_empty() {
        return Err(ByteSizeError::Empty);
    }

    let (digits, multiplier) = if let Some(rest) = s.strip_suffix("GB") {
        (rest, 1u64 << 30)
    } else if let Some(rest) = s.strip_suffix("MB") {
        (rest, 1 << 20)
    } else if let Some(rest) = s.strip_suffix("KB") {
        (rest, 1 << 10)
    } else {
        (s.as_str(), 1)
    };

    let digits = digits.trim();
    let value: i64 = digits
        .parse()
        .map_err(|_| ByteSizeError::Invalid(digits.to_string()))?;

    if value <= 0 {
        return Err(ByteSizeError::NonPositive);
    }

    if multiplier > 1 && value as u64 > i64::MAX as u64 / multiplier {
        return Err(ByteSizeError::Overflow);
    }

    Ok(value as u64 * multiplier)
}
