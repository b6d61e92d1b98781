//! # Symbol Correlation
//!
//! Maps a symbol to the part of the instruction stream it owns.
//!
//! Ownership is decided at section granularity: an eligible symbol gets all
//! instructions of its owning section, so two functions in the same `.text`
//! resolve to the same slice. [`SymbolCorrelator::narrow_to_symbol`] cuts
//! that slice down to the symbol's own `[address, address + size)` for
//! callers that need byte-accurate function bodies.
//!
//! ## Filter order
//!
//! Each step short-circuits to an empty slice:
//!
//! 1. the symbol's type could not be determined
//! 2. the [`EligibilityPolicy`] rejects the symbol's type
//! 3. the owning section cannot be resolved
//! 4. the owning section is not executable
//! 5. the owning section produced no instructions

use std::fmt;
use std::str::FromStr;

use crate::index::DisassemblyIndex;
use crate::model::ObjectModel;
use crate::types::{Instruction, Symbol, SymbolKind};

/// Which symbol types may be correlated with instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EligibilityPolicy
{
    /// Only function symbols are correlated
    #[default]
    FunctionsOnly,
    /// Every classified symbol except functions is correlated
    ///
    /// Matches the inverted check of earlier `vorhees` releases, kept for
    /// consumers that depend on its output.
    ExcludeFunctions,
}

impl EligibilityPolicy
{
    /// Whether a symbol of type `kind` passes the eligibility step.
    pub fn admits(self, kind: SymbolKind) -> bool
    {
        match self {
            EligibilityPolicy::FunctionsOnly => kind == SymbolKind::Function,
            EligibilityPolicy::ExcludeFunctions => kind != SymbolKind::Function,
        }
    }
}

impl FromStr for EligibilityPolicy
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "functions-only" | "functions" => Ok(EligibilityPolicy::FunctionsOnly),
            "exclude-functions" | "non-functions" => Ok(EligibilityPolicy::ExcludeFunctions),
            _ => Err(format!(
                "Unknown eligibility policy: {s}. Use 'functions-only' or 'exclude-functions'"
            )),
        }
    }
}

impl fmt::Display for EligibilityPolicy
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            EligibilityPolicy::FunctionsOnly => "functions-only",
            EligibilityPolicy::ExcludeFunctions => "exclude-functions",
        };
        write!(f, "{label}")
    }
}

/// Resolves symbols to instruction slices under a fixed policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolCorrelator
{
    policy: EligibilityPolicy,
}

impl SymbolCorrelator
{
    pub fn new(policy: EligibilityPolicy) -> Self
    {
        Self { policy }
    }

    pub fn policy(&self) -> EligibilityPolicy
    {
        self.policy
    }

    /// Instructions owned by `symbol` (its whole section); possibly empty.
    pub fn instructions_for<'a>(&self, symbol: &Symbol, model: &ObjectModel, index: &'a DisassemblyIndex) -> &'a [Instruction]
    {
        if symbol.kind == SymbolKind::Unresolved {
            return &[];
        }
        if !self.policy.admits(symbol.kind) {
            return &[];
        }
        let Some(section) = symbol.section.and_then(|id| model.section(id)) else {
            return &[];
        };
        if !section.executable {
            return &[];
        }
        index.section_instructions(section.id)
    }

    /// Keep only the instructions that start inside the symbol's byte span.
    ///
    /// Returns an empty slice when the symbol has no address or no size.
    /// Instructions within one section are in address order, so the result
    /// is a contiguous sub-slice.
    pub fn narrow_to_symbol<'a>(symbol: &Symbol, instructions: &'a [Instruction]) -> &'a [Instruction]
    {
        let start = instructions.partition_point(|insn| symbol.address.is_some_and(|first| insn.address < first));
        let end = start + instructions[start..].iter().take_while(|insn| symbol.covers(insn.address)).count();
        &instructions[start..end]
    }
}
