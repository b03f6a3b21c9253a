//! Symbol tokenization, sorting, and table-emission core for the kernel
//! symbol-table generator.
//!
//! This crate has no knowledge of argv, child processes, or the
//! filesystem — it takes a parsed listing and a [`Mode`] and returns
//! formatted table text through an [`Emitter`]. The `ksymgen` binary owns
//! everything upstream (spawning `nm`) and downstream (writing the file).

#![forbid(unsafe_code)]

pub mod backend;
pub mod emit;
pub mod error;
pub mod mode;
pub mod parse;
pub mod pipeline;
pub mod sort;
pub mod symbol;
pub mod token;
pub mod uleb128;

pub use emit::Emitter;
pub use error::{Error, Result};
pub use mode::Mode;
pub use symbol::{Section, Symbol};
