//! # Error Types
//!
//! This module defines the error type used throughout the aguja library.
//!
//! The engine is a pure transducer: every error propagates to the caller,
//! nothing is retried or recovered locally, and no byte output is produced
//! on the failing invocation.

use thiserror::Error;

/// Main error type for aguja operations.
#[derive(Debug, Error)]
pub enum EscpError {
    /// A command parameter is outside its permitted range.
    #[error("parameter '{param}' = {value} is outside [{lo}, {hi}]")]
    Range {
        param: &'static str,
        value: i64,
        lo: i64,
        hi: i64,
    },

    /// A value is not in a closed enumeration (e.g. CPI not in {10,12,15,17,20}).
    #[error("invalid value: {0}")]
    Validation(String),

    /// Malformed hex literal or unmappable text under strict encoding.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Invalid image dimensions or unsupported graphics mode.
    #[error("graphics error in {operation}: {reason}")]
    Graphics {
        operation: &'static str,
        reason: String,
    },

    /// A dynamic node reached the measure phase without being resolved.
    #[error(
        "unresolved {kind} node reached layout; dynamic nodes must be resolved \
         (layout::resolve) before measurement"
    )]
    UnresolvedNode { kind: &'static str },

    /// An engine invariant was violated. Signals a bug, not bad input.
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl EscpError {
    /// Range-check a parameter, returning it on success.
    ///
    /// Used at the command-encoder API boundary so every escape sequence is
    /// validated before a single byte is assembled.
    pub fn check_range(
        param: &'static str,
        value: i64,
        lo: i64,
        hi: i64,
    ) -> Result<i64, EscpError> {
        if value < lo || value > hi {
            return Err(EscpError::Range {
                param,
                value,
                lo,
                hi,
            });
        }
        Ok(value)
    }
}
