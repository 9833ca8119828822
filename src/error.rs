//! Error types for the scriptmark library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`GraderError`] — **Fatal**: the evaluation cannot proceed at all
//!   (missing question, non-positive mark scale, provider not configured,
//!   the model call itself failing). Returned as `Err(GraderError)` from
//!   [`crate::grade::evaluate`] and mapped onto HTTP status codes by the
//!   server layer.
//!
//! * [`FileError`] — **Non-fatal**: a single uploaded file failed to
//!   extract (corrupt archive, unreadable PDF) but the rest of the batch
//!   is fine. Stored inside [`crate::payload::FileStatus`] so callers can
//!   inspect partial success rather than losing the whole submission to
//!   one bad attachment.
//!
//! The separation lets callers decide their own tolerance: reject the
//! submission when nothing extracted, or grade whatever survived.

use thiserror::Error;

/// All fatal errors returned by the scriptmark library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::payload::FileStatus`] rather than propagated here.
#[derive(Debug, Error)]
pub enum GraderError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The question text is missing or blank.
    #[error("Missing required field 'question'")]
    MissingQuestion,

    /// The mark scale is absent, zero, or negative.
    #[error("'maxMarks' must be a positive number, got {got}")]
    InvalidMaxMarks { got: f64 },

    // ── Provider errors ───────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The scoring model call failed outright.
    #[error("Scoring model call failed: {message}")]
    ModelCallFailed { message: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single uploaded file.
///
/// Stored in [`crate::payload::FileStatus`] when extraction fails.
/// The overall assembly continues with the remaining files.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The document could not be opened at all (bad magic, corrupt xref,
    /// truncated zip central directory).
    #[error("'{name}': cannot open document: {detail}")]
    Unreadable { name: String, detail: String },

    /// Text extraction or page rasterisation failed mid-document.
    #[error("'{name}': extraction failed: {detail}")]
    ExtractionFailed { name: String, detail: String },

    /// A fallback page render could not be encoded for the API.
    #[error("'{name}': page {page} image encoding failed: {detail}")]
    EncodingFailed {
        name: String,
        page: usize,
        detail: String,
    },
}
