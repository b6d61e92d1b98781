//! # Object Model
//!
//! A loaded object file: sections, symbols, relocations and target triple.
//!
//! The model is built once by [`ObjectModel::open`] (or [`ObjectModel::parse`]
//! for bytes already in memory) and is read-only afterwards. Everything the
//! indexer and the report need is copied out of the container at load time,
//! so the model owns its data and does not borrow the file buffer.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vorhees_core::model::{ObjectModel, RelocationScope};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>>
//! {
//!     let model = ObjectModel::open("foo.o", RelocationScope::Dynamic)?;
//!     println!("{} targets {}", model.file_name(), model.triple());
//!     for section in model.sections().iter().filter(|s| s.executable) {
//!         println!("{} @ 0x{:x}", section.display_name(), section.address);
//!     }
//!     Ok(())
//! }
//! ```

mod loader;
pub mod triple;

use std::fs;
use std::path::Path;

pub use triple::{Architecture, ObjectFormat, TargetTriple};

use crate::error::{Result, VorheesError};
use crate::types::{Relocation, Section, SectionId, Symbol};

/// Which relocation tables to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelocationScope
{
    /// Only the dynamic relocation table
    #[default]
    Dynamic,
    /// Dynamic relocations followed by every section's relocation table
    All,
}

/// Aggregate of everything read from one object file.
#[derive(Debug, Clone)]
pub struct ObjectModel
{
    file_name: String,
    triple: TargetTriple,
    sections: Vec<Section>,
    symbols: Vec<Symbol>,
    relocations: Vec<Relocation>,
}

impl ObjectModel
{
    /// Assemble a model from already-converted parts.
    ///
    /// Sections must be given in container order; that order is the order
    /// the index is built in.
    pub fn from_parts(
        file_name: impl Into<String>,
        triple: TargetTriple,
        sections: Vec<Section>,
        symbols: Vec<Symbol>,
        relocations: Vec<Relocation>,
    ) -> Self
    {
        Self {
            file_name: file_name.into(),
            triple,
            sections,
            symbols,
            relocations,
        }
    }

    /// Read and parse the object file at `path`.
    ///
    /// ## Errors
    ///
    /// - `FileOpen`: the path is missing or unreadable
    /// - `ObjectParse`: the bytes are not an object file we understand
    pub fn open(path: impl AsRef<Path>, scope: RelocationScope) -> Result<Self>
    {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| VorheesError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "read object file");
        loader::load(path, &data, scope)
    }

    /// Parse an object file that is already in memory.
    ///
    /// `file_name` is what the report will show as `FileName`.
    ///
    /// ## Errors
    ///
    /// - `ObjectParse`: the bytes are not an object file we understand
    pub fn parse(file_name: impl AsRef<Path>, data: &[u8], scope: RelocationScope) -> Result<Self>
    {
        loader::load(file_name.as_ref(), data, scope)
    }

    pub fn file_name(&self) -> &str
    {
        &self.file_name
    }

    pub fn triple(&self) -> &TargetTriple
    {
        &self.triple
    }

    /// All sections, in container order.
    pub fn sections(&self) -> &[Section]
    {
        &self.sections
    }

    pub fn symbols(&self) -> &[Symbol]
    {
        &self.symbols
    }

    pub fn relocations(&self) -> &[Relocation]
    {
        &self.relocations
    }

    /// Look up a section by its identifier.
    pub fn section(&self, id: SectionId) -> Option<&Section>
    {
        self.sections.iter().find(|section| section.id == id)
    }

    /// First symbol with the given name.
    pub fn symbol_by_name(&self, name: &str) -> Option<&Symbol>
    {
        self.symbols.iter().find(|symbol| symbol.name.as_deref() == Some(name))
    }
}
