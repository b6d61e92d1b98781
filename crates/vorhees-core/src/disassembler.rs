//! # Disassembler
//!
//! One-shot pipeline over a single object file:
//!
//! 1. Load the object model (sections, symbols, relocations, triple)
//! 2. Resolve a decoder backend for the triple
//! 3. Decode every executable section into the [`DisassemblyIndex`]
//!
//! After [`Disassembler::open`] returns, everything is immutable. Symbol
//! correlation and report emission are read-only queries and can run from
//! several threads at once.
//!
//! ## Example
//!
//! ```rust,no_run
//! use vorhees_core::{backends, Disassembler, IndexOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>>
//! {
//!     let backends = backends::initialize();
//!     let dis = Disassembler::open("foo.o", backends, IndexOptions::default())?;
//!     if let Some(main) = dis.model().symbol_by_name("main") {
//!         for insn in dis.instructions_for(main) {
//!             println!("{}", dis.render(insn));
//!         }
//!     }
//!     println!("{}", dis.report().to_json(false)?);
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::Path;

use crate::backends::{Backends, Target};
use crate::correlate::{EligibilityPolicy, SymbolCorrelator};
use crate::decoder::{InstructionDecoder, TextRenderer};
use crate::error::Result;
use crate::index::DisassemblyIndex;
use crate::model::{ObjectModel, RelocationScope};
use crate::report::Report;
use crate::types::{Instruction, Symbol};

/// Library-level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexOptions
{
    /// Symbol types that correlate with instructions
    pub eligibility: EligibilityPolicy,
    /// Relocation tables to collect
    pub relocations: RelocationScope,
}

/// A loaded, fully indexed object file.
pub struct Disassembler
{
    model: ObjectModel,
    index: DisassemblyIndex,
    correlator: SymbolCorrelator,
    renderer: Box<dyn TextRenderer + Send + Sync>,
}

impl fmt::Debug for Disassembler
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Disassembler")
            .field("file_name", &self.model.file_name())
            .field("triple", self.model.triple())
            .field("instructions", &self.index.len())
            .field("correlator", &self.correlator)
            .finish_non_exhaustive()
    }
}

impl Disassembler
{
    /// Load `path`, resolve its target and decode it.
    ///
    /// ## Errors
    ///
    /// - `FileOpen` / `ObjectParse`: the file could not be loaded
    /// - `TargetResolution`: no backend for the file's architecture
    /// - `SectionRead`: an executable section's bytes are unavailable
    pub fn open(path: impl AsRef<Path>, backends: &'static Backends, options: IndexOptions) -> Result<Self>
    {
        let model = ObjectModel::open(path, options.relocations)?;
        Self::from_model(model, backends, options)
    }

    /// Index an already loaded model.
    ///
    /// ## Errors
    ///
    /// - `TargetResolution`: no backend for the model's architecture
    /// - `SectionRead`: an executable section's bytes are unavailable
    pub fn from_model(model: ObjectModel, backends: &'static Backends, options: IndexOptions) -> Result<Self>
    {
        let target = backends.lookup(model.triple())?;
        tracing::debug!(triple = %model.triple(), backend = target.name(), "resolved target");
        Self::with_backend(model, &target, options)
    }

    fn with_backend(model: ObjectModel, target: &Target, options: IndexOptions) -> Result<Self>
    {
        let mut decoder = target.decoder()?;
        Self::with_parts(model, decoder.as_mut(), target.renderer(), options)
    }

    /// Index a model with an explicit decoder and renderer.
    ///
    /// ## Errors
    ///
    /// `SectionRead` if an executable section's bytes are unavailable.
    pub fn with_parts(
        model: ObjectModel,
        decoder: &mut dyn InstructionDecoder,
        renderer: Box<dyn TextRenderer + Send + Sync>,
        options: IndexOptions,
    ) -> Result<Self>
    {
        let index = DisassemblyIndex::build(&model, decoder)?;
        Ok(Self {
            model,
            index,
            correlator: SymbolCorrelator::new(options.eligibility),
            renderer,
        })
    }

    pub fn model(&self) -> &ObjectModel
    {
        &self.model
    }

    pub fn index(&self) -> &DisassemblyIndex
    {
        &self.index
    }

    /// The whole instruction stream.
    pub fn instructions(&self) -> &[Instruction]
    {
        self.index.instructions()
    }

    /// Instructions correlated with `symbol` (section granularity).
    pub fn instructions_for(&self, symbol: &Symbol) -> &[Instruction]
    {
        self.correlator.instructions_for(symbol, &self.model, &self.index)
    }

    /// Instructions inside `symbol`'s own byte span.
    pub fn symbol_body(&self, symbol: &Symbol) -> &[Instruction]
    {
        SymbolCorrelator::narrow_to_symbol(symbol, self.instructions_for(symbol))
    }

    pub fn renderer(&self) -> &dyn TextRenderer
    {
        self.renderer.as_ref()
    }

    /// One-line listing of an instruction.
    pub fn render(&self, instruction: &Instruction) -> String
    {
        self.renderer.render_instruction(instruction)
    }

    /// Build the structured document.
    pub fn report(&self) -> Report
    {
        Report::emit(&self.model, &self.index, self.renderer.as_ref())
    }
}
