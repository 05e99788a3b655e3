use crate::syntax::Span;
use thiserror::Error;

/// Reasons a method body cannot be translated. All of them are fatal for the
/// method being translated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslateError {
    #[error("unsupported {construct} in `{method}` ({span}): `{node}`")]
    UnsupportedNode {
        method: String,
        construct: &'static str,
        node: String,
        /// Location of the node, or of the closest located node before it.
        span: Span,
    },

    #[error("no HLSL mapping for type `{name}` ({span})")]
    UnmappedType { name: String, span: Span },

    #[error("cannot resolve member `{member}`: {reason}")]
    Resolution { member: String, reason: String },
}

pub type Result<T> = std::result::Result<T, TranslateError>;
