use thiserror::Error;

/// Failure of a [`StringService`] operation caused by its input
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringServiceError {
    /// Operation does not accept an empty string
    #[error("empty string")]
    EmptyInput,
}

/// Stateless string operations
///
/// Every operation is a pure function of its input and may be called concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringService;

impl StringService {
    /// Converts every character to its uppercase equivalent
    pub fn uppercase(&self, s: &str) -> Result<String, StringServiceError> {
        if s.is_empty() {
            return Err(StringServiceError::EmptyInput);
        }

        Ok(s.to_uppercase())
    }

    /// Number of characters in the input
    pub fn count(&self, s: &str) -> usize {
        s.chars().count()
    }
}
