//! # vorhees-core
//!
//! Disassembly indexing and correlation for compiled object files.
//!
//! This crate turns the executable sections of an object file into one
//! ordered instruction stream, indexes which part of the stream each section
//! produced, maps symbols back onto that stream and serializes the result:
//! - Object loading via the `object` crate ([`model`])
//! - Single-instruction decoding and rendering behind traits ([`decoder`])
//! - The decode loop and per-section index ([`index`])
//! - Symbol → instruction correlation ([`correlate`])
//! - JSON report and plain listing output ([`report`])
//!
//! ## Target Support
//!
//! - **x86 / x86-64**: decoded with `iced-x86`
//! - Other architectures are rejected at target resolution
//!
//! ## Threading
//!
//! Loading and indexing run once, synchronously. The resulting
//! [`Disassembler`] is immutable and can be queried from any number of
//! threads.

pub mod backends;
pub mod correlate;
pub mod decoder;
pub mod disassembler;
pub mod error;
pub mod index;
pub mod model;
pub mod prelude;
pub mod report;
pub mod types;

pub use disassembler::{Disassembler, IndexOptions};
// Re-export commonly used types
pub use error::{Result, VorheesError};
pub use types::{Instruction, Operand, Section, SectionId, Symbol, SymbolKind};
