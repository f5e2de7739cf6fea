//! Error types.

use core::fmt;

/// A record's length did not match the container's element size.
///
/// Returned by [`SkipList::insert`](crate::SkipList::insert); the container is
/// left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeMismatch {
    /// The container's element size.
    pub expected: usize,
    /// Length of the rejected record.
    pub actual: usize,
}

impl fmt::Display for SizeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record is {} bytes, container holds {}-byte records",
            self.actual, self.expected
        )
    }
}

impl std::error::Error for SizeMismatch {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = SizeMismatch {
            expected: 8,
            actual: 3,
        };
        assert_eq!(err.to_string(), "record is 3 bytes, container holds 8-byte records");
    }
}
