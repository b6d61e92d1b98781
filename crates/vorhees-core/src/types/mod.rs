//! # Types
//!
//! Container-agnostic types describing a loaded object file.
//!
//! These types abstract away the object format, so the indexing and
//! reporting code works with "sections", "symbols" and "instructions"
//! without knowing whether the input was ELF, Mach-O or PE.

pub mod instruction;
pub mod section;
pub mod symbol;

// Re-export all public types
pub use instruction::{Instruction, Operand};
pub use section::{Section, SectionData, SectionId};
pub use symbol::{Relocation, RelocationSymbol, Symbol, SymbolKind};
