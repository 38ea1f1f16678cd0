//! Limits applied while loading markup
//!
//! This module defines the limits the loader enforces to protect against
//! oversized or pathologically nested input.

use crate::error::{Error, Result};

/// Loader limits configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum element nesting depth
    pub max_depth: usize,

    /// Maximum input size in bytes
    pub max_input_size: usize,

    /// Maximum number of attributes per element
    pub max_attributes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            max_input_size: 100 * 1024 * 1024, // 100 MB
            max_attributes: 1000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_depth: 100,
            max_input_size: 10 * 1024 * 1024, // 10 MB
            max_attributes: 100,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_depth: 10000,
            max_input_size: 1024 * 1024 * 1024, // 1 GB
            max_attributes: 10000,
        }
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the maximum input size
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    /// Check if nesting depth is within limits
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            Err(Error::LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if input size is within limits
    pub fn check_input_size(&self, size: usize) -> Result<()> {
        if size > self.max_input_size {
            Err(Error::LimitExceeded(format!(
                "XML size {} bytes exceeds maximum {} bytes",
                size, self.max_input_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of attributes is within limits
    pub fn check_attributes(&self, count: usize) -> Result<()> {
        if count > self.max_attributes {
            Err(Error::LimitExceeded(format!(
                "Attribute count {} exceeds maximum {}",
                count, self.max_attributes
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_depth, 1000);
        assert!(limits.check_depth(500).is_ok());
        assert!(limits.check_depth(1500).is_err());
    }

    #[test]
    fn test_strict_limits() {
        let limits = Limits::strict();
        assert!(limits.max_depth < Limits::default().max_depth);
        assert!(limits.check_depth(150).is_err());
    }

    #[test]
    fn test_permissive_limits() {
        let limits = Limits::permissive();
        assert!(limits.max_depth > Limits::default().max_depth);
        assert!(limits.check_depth(5000).is_ok());
    }

    #[test]
    fn test_check_input_size() {
        let limits = Limits::default().with_max_input_size(16);
        assert!(limits.check_input_size(16).is_ok());
        assert!(matches!(
            limits.check_input_size(17),
            Err(Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_check_attributes() {
        let limits = Limits::strict();
        assert!(limits.check_attributes(100).is_ok());
        assert!(limits.check_attributes(101).is_err());
    }
}
