//! # Vermilion Editor Core
//!
//! Foundational crate for the Vermilion editor: the branching transaction
//! journal and platform-agnostic viewport interaction types.

pub mod journal;
pub mod view;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
