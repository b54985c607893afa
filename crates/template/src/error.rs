//! Error taxonomy for template parsing and rendering

use std::fmt::Display;
use thiserror::Error;

/// A hard error raised while rendering a template. These surface to the
/// embedder and abort the render. Expression-level problems are *not* hard
/// errors; they are recorded as [RenderWarning]s and the offending
/// sub-expression evaluates to nil.
///
/// Errors hold owned data so they can outlive the template and context.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A tag's arguments did not match its declared grammar
    #[error("malformed `{keyword}` tag: {reason}")]
    MalformedStatement { keyword: String, reason: String },

    /// A tag parsed structurally but a required compiled binding was absent
    /// when its behavior ran
    #[error("tag `{keyword}` is missing compiled binding `{binding}`")]
    MissingArtifact {
        keyword: String,
        binding: &'static str,
    },

    /// A runtime semantic violation, e.g. a non-integer `limit:` value
    #[error("invalid invocation of `{keyword}`: {reason}")]
    InvalidInvocation { keyword: String, reason: String },

    /// A keyword that matched no registered tag spec. Unregistered keywords
    /// encountered during a render are skipped with a diagnostic instead;
    /// this error exists for embedders resolving keywords directly against
    /// the registry.
    #[error("unknown tag `{keyword}`")]
    UnknownTag { keyword: String },

    /// A registered filter's evaluator failed
    #[error("filter `{filter}` failed")]
    Filter {
        filter: String,
        #[source]
        source: FilterError,
    },
}

/// An error produced by a filter evaluator. Filter implementations are
/// external to the engine, so this is a plain message carrier.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FilterError {
    message: String,
}

impl FilterError {
    pub fn new(message: impl Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// A soft diagnostic recorded on the render context. The render continues;
/// the offending sub-expression evaluates to nil (or the tag is skipped).
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RenderWarning {
    /// An expression that could not be parsed or folded
    #[error("malformed expression `{fragment}`: {reason}")]
    MalformedExpression { fragment: String, reason: String },

    /// A filter identifier missing from the registry. The filter chain
    /// stops and yields the last good value.
    #[error("unknown filter `{name}`")]
    UnknownFilter { name: String },

    /// An operator identifier missing from the registry
    #[error("unknown operator `{name}`")]
    UnknownOperator { name: String },

    /// End of template was reached while a tag scope was still open
    #[error("unclosed `{keyword}` scope at end of template")]
    UnbalancedScopes { keyword: String },
}
