//! Environment shared by the registry reducers.

use crate::error::RegistryError;

/// Default upper bound on label length, in bytes
pub const DEFAULT_MAX_LABEL_LEN: usize = 256;

/// Limits injected into every registry reducer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryEnvironment {
    /// Maximum length of event names, candidate names and directory names
    pub max_label_len: usize,
}

impl RegistryEnvironment {
    /// Creates an environment with the given label limit
    #[must_use]
    pub const fn new(max_label_len: usize) -> Self {
        Self { max_label_len }
    }

    /// Checks that a label is non-blank and within the length limit
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] naming `field` otherwise.
    pub fn check_label(&self, field: &str, label: &str) -> Result<(), RegistryError> {
        if label.trim().is_empty() {
            return Err(RegistryError::invalid(format!("{field} cannot be empty")));
        }
        if label.len() > self.max_label_len {
            return Err(RegistryError::invalid(format!(
                "{field} is {} bytes, limit is {}",
                label.len(),
                self.max_label_len
            )));
        }
        Ok(())
    }
}

impl Default for RegistryEnvironment {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LABEL_LEN)
    }
}
