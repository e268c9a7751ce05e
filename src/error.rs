// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Error types for template mapping

use thiserror::Error;

/// Errors returned across the public mapping boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    /// Template, data or placeholder text could not be parsed
    #[error("parse error: {0}")]
    ParseError(String),

    /// A value had the wrong kind, or a format name was not recognized
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Strict structural resolution failed
    #[error("template mapping failed at '{path}': {reason}")]
    TemplateMappingFailed {
        /// Template path of the node that could not be resolved
        path: String,
        /// Human readable cause
        reason: String,
        /// Compact JSON of the failing template fragment
        template: String,
        /// Compact JSON of the data the fragment was matched against
        data: String,
    },

    /// The requested output format is known but has no codec
    #[error("unsupported output format '{0}'")]
    UnsupportedFormat(String),

    /// Template or data does not line up with the supplied schema
    #[error("structural mismatch at '{path}': {reason}")]
    StructuralMismatch {
        /// Path of the offending template placeholder or data node
        path: String,
        /// Human readable cause
        reason: String,
    },
}
