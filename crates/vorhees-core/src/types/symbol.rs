//! Symbol and relocation types.

use std::fmt;

use super::SectionId;

/// Type classification of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind
{
    /// Function symbol
    Function,
    /// Data, section, file, untyped label or any other classified symbol
    Other,
    /// The container did not let us classify the symbol
    Unresolved,
}

impl fmt::Display for SymbolKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            SymbolKind::Function => "function",
            SymbolKind::Other => "other",
            SymbolKind::Unresolved => "unresolved",
        };
        write!(f, "{label}")
    }
}

/// A symbol table entry.
///
/// Name, address and value are optional independently: each one is `None`
/// when the container could not resolve it, and the report omits exactly
/// that field.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol
{
    /// Symbol name
    pub name: Option<String>,
    /// Address inside the image (the raw value for undefined symbols)
    pub address: Option<u64>,
    /// Raw symbol value
    pub value: Option<u64>,
    /// Size in bytes (0 when unknown)
    pub size: u64,
    /// Type classification
    pub kind: SymbolKind,
    /// Owning section; `None` for undefined, absolute and common symbols
    pub section: Option<SectionId>,
}

impl Symbol
{
    /// A function symbol defined in `section`.
    pub fn function(name: impl Into<String>, address: u64, size: u64, section: SectionId) -> Self
    {
        Self {
            name: Some(name.into()),
            address: Some(address),
            value: Some(address),
            size,
            kind: SymbolKind::Function,
            section: Some(section),
        }
    }

    /// Whether `address` falls inside `[address, address + size)`.
    ///
    /// Always false for symbols with no address or a zero size.
    pub fn covers(&self, address: u64) -> bool
    {
        match self.address {
            Some(start) if self.size > 0 => address >= start && address - start < self.size,
            _ => false,
        }
    }
}

/// Symbol referenced by a relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationSymbol
{
    /// Index in the symbol table the relocation refers to
    pub index: usize,
    /// Resolved name, if any
    pub name: Option<String>,
}

/// A relocation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation
{
    /// Offset (or address, for dynamic relocations) being patched
    pub offset: u64,
    /// Container-specific relocation type number
    pub kind: u32,
    /// Target symbol; `None` when the relocation has no resolvable symbol
    pub symbol: Option<RelocationSymbol>,
}
