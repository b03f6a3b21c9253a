//! Error types returned by the symbol-table pipeline.

use thiserror::Error;

/// Everything that can go wrong while turning a symbol listing into symbol
/// tables. There is no partial-success mode: any `Error` aborts the run.
#[derive(Debug, Error)]
pub enum Error {
    /// A line of the `nm -n` listing didn't have the shape
    /// `<hex address> <type char> <name>`.
    #[error("malformed symbol listing at line {line_no}: {line:?}")]
    Listing {
        /// 1-based line number within the listing.
        line_no: usize,
        /// The offending line, verbatim.
        line: String,
    },

    /// A symbol name exceeded the mode's `MAX_SYMBOL_LENGTH`.
    #[error("symbol \"{name}\" at line {line_no} is too long ({len} > {max} bytes)")]
    NameTooLong {
        name: String,
        line_no: usize,
        len: usize,
        max: usize,
    },

    /// A canonical name's tokenized length didn't fit in a 2-byte ULEB-128
    /// length prefix (16,383 max).
    #[error("encoded name for \"{name}\" is too long to represent ({len} tokens)")]
    EncodedNameTooLong { name: String, len: usize },

    /// One or both `.text` (or `.init.text`) sentinel symbols were never
    /// observed in the listing.
    #[error("the listing never defines the {which} section bounds")]
    MissingSection { which: &'static str },

    /// A dictionary slot was referenced by a symbol's token stream but was
    /// never populated. Can't happen given the way slots are filled;
    /// this is an assertion, not a user-facing condition.
    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),
}

pub type Result<T> = std::result::Result<T, Error>;
