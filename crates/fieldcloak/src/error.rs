//! Error types returned by the transform entry points.

use thiserror::Error;

/// Boxed error produced by a leaf transform.
pub type LeafError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a single transform call.
///
/// Whatever the variant, no partially transformed value escapes: the caller
/// still owns its untouched input and gets only this error back.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The root value is not a record, a reference to a record, or an
    /// ordered sequence. Fix the call site; retrying will not help.
    #[error("unsupported shape: input is not a struct or slice (found {found})")]
    UnsupportedShape {
        /// Short description of what was found instead.
        found: &'static str,
    },

    /// The leaf transform (encrypt or decrypt) rejected a field value.
    #[error("leaf transform failed at field `{path}`")]
    Leaf {
        /// Dotted path of the failing field, e.g. `"[2].address.street"`.
        path: String,
        /// The error reported by the leaf transform, unchanged.
        #[source]
        source: LeafError,
    },

    /// Nested records go deeper than [`crate::MAX_DEPTH`].
    #[error("value nests records deeper than {limit} levels")]
    DepthExceeded {
        /// The configured limit.
        limit: usize,
    },
}

impl TransformError {
    /// Returns `true` when the error originates from the leaf cipher rather
    /// than from the shape of the input.
    pub fn is_leaf(&self) -> bool {
        matches!(self, TransformError::Leaf { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_error_keeps_source() {
        let err = TransformError::Leaf {
            path: "address.street".into(),
            source: "aead operation failed".into(),
        };
        assert!(err.is_leaf());
        assert!(err.to_string().contains("address.street"));
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("aead operation failed"));
    }

    #[test]
    fn shape_error_names_found_kind() {
        let err = TransformError::UnsupportedShape { found: "string" };
        assert!(!err.is_leaf());
        assert!(err.to_string().contains("not a struct"));
        assert!(err.to_string().contains("string"));
    }
}
