//! Common module for library exports

pub use crate::backends::{self, Backends};
pub use crate::correlate::{EligibilityPolicy, SymbolCorrelator};
pub use crate::decoder::{DecodedInstruction, InstructionDecoder, TextRenderer};
pub use crate::disassembler::{Disassembler, IndexOptions};
pub use crate::error::{Result, VorheesError};
pub use crate::index::{DisassemblyIndex, InstructionRange, RangeIndex, SectionScan};
pub use crate::model::{ObjectModel, RelocationScope, TargetTriple};
pub use crate::report::{write_listing, Report};
pub use crate::types::*;
