//! # Report Emission
//!
//! Serializes a loaded object and its instruction stream into a structured
//! document, or into a plain listing for `--dump`.
//!
//! ## Schema
//!
//! ```json
//! {
//!   "FileName": "foo.o",
//!   "Sections": [{ "Name": ".text", "Address": 0 }],
//!   "Symbols": [{ "Name": "main", "Address": 0, "Value": 0 }],
//!   "Relocations": [{ "Symbol": "puts", "Offset": 16, "Type": 4 }, {}],
//!   "OpCodes": [{ "Name": "Push_r64", "OpCode": 1234, "Address": 0,
//!                 "Operands": [{ "Register": "rbp" }] }]
//! }
//! ```
//!
//! Optional fields are omitted, never written as `null`. A relocation with no
//! resolvable symbol is written as `{}` so positions keep matching the
//! relocation table. Each operand object holds exactly one of `Register`,
//! `Immediate` (integer or float) or `Other`.

use std::io::Write;

use serde::Serialize;

use crate::decoder::TextRenderer;
use crate::error::Result;
use crate::index::DisassemblyIndex;
use crate::model::ObjectModel;
use crate::types::{Instruction, Operand, Relocation, Section, Symbol};

/// The structured document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Report
{
    pub file_name: String,
    pub sections: Vec<SectionEntry>,
    pub symbols: Vec<SymbolEntry>,
    pub relocations: Vec<RelocationEntry>,
    pub op_codes: Vec<OpCodeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SectionEntry
{
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub address: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SymbolEntry
{
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
}

/// One relocation; all fields absent when its symbol did not resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RelocationEntry
{
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OpCodeEntry
{
    pub name: String,
    pub op_code: u32,
    pub address: u64,
    pub operands: Vec<OperandEntry>,
}

/// Single-key operand object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OperandEntry
{
    Register(String),
    Immediate(Immediate),
    Other(String),
}

/// Numeric immediate; serialized as a bare JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Immediate
{
    Integer(i64),
    Float(f64),
}

impl From<&Section> for SectionEntry
{
    fn from(section: &Section) -> Self
    {
        Self {
            name: section.name.clone(),
            address: section.address,
        }
    }
}

impl From<&Symbol> for SymbolEntry
{
    fn from(symbol: &Symbol) -> Self
    {
        Self {
            name: symbol.name.clone(),
            address: symbol.address,
            value: symbol.value,
        }
    }
}

impl From<&Relocation> for RelocationEntry
{
    fn from(relocation: &Relocation) -> Self
    {
        match &relocation.symbol {
            Some(symbol) => Self {
                symbol: symbol.name.clone(),
                offset: Some(relocation.offset),
                kind: Some(relocation.kind),
            },
            None => Self::default(),
        }
    }
}

/// Tag one operand for the report.
pub fn operand_entry(operand: &Operand, renderer: &dyn TextRenderer) -> OperandEntry
{
    match operand {
        Operand::Register(id) if *id != 0 => OperandEntry::Register(renderer.register_name(*id)),
        Operand::Immediate(value) => OperandEntry::Immediate(Immediate::Integer(*value)),
        Operand::FloatImmediate(value) => OperandEntry::Immediate(Immediate::Float(*value)),
        // Register 0 is "no register" and is reported as text
        other => OperandEntry::Other(renderer.render_operand(other)),
    }
}

fn op_code_entry(instruction: &Instruction, renderer: &dyn TextRenderer) -> OpCodeEntry
{
    OpCodeEntry {
        name: renderer.opcode_name(instruction.opcode),
        op_code: instruction.opcode,
        address: instruction.address,
        operands: instruction
            .operands
            .iter()
            .map(|operand| operand_entry(operand, renderer))
            .collect(),
    }
}

impl Report
{
    /// Build the document. Pure: the same inputs always give the same report.
    pub fn emit(model: &ObjectModel, index: &DisassemblyIndex, renderer: &dyn TextRenderer) -> Self
    {
        Self {
            file_name: model.file_name().to_string(),
            sections: model.sections().iter().map(SectionEntry::from).collect(),
            symbols: model.symbols().iter().map(SymbolEntry::from).collect(),
            relocations: model.relocations().iter().map(RelocationEntry::from).collect(),
            op_codes: index
                .instructions()
                .iter()
                .map(|instruction| op_code_entry(instruction, renderer))
                .collect(),
        }
    }

    /// Serialize to JSON text.
    ///
    /// ## Errors
    ///
    /// `Serialize` if `serde_json` fails.
    pub fn to_json(&self, pretty: bool) -> Result<String>
    {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Write one rendered instruction per line.
///
/// Nothing is written for an empty stream.
///
/// ## Errors
///
/// `Io` if writing fails.
pub fn write_listing<W: Write>(out: &mut W, instructions: &[Instruction], renderer: &dyn TextRenderer) -> Result<()>
{
    for instruction in instructions {
        writeln!(out, "{}", renderer.render_instruction(instruction))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use serde_json::json;

    use super::*;
    use crate::types::{RelocationSymbol, SectionId};

    struct Names;

    impl TextRenderer for Names
    {
        fn opcode_name(&self, opcode: u32) -> String
        {
            format!("OP{opcode}")
        }

        fn register_name(&self, register: u32) -> String
        {
            format!("r{register}")
        }
    }

    fn to_value<T: Serialize>(value: &T) -> serde_json::Value
    {
        serde_json::to_value(value).unwrap()
    }

    #[test]
    fn test_operand_tagging()
    {
        let operands = [
            Operand::Register(5),
            Operand::Register(0),
            Operand::Immediate(-8),
            Operand::FloatImmediate(0.5),
            Operand::Other("[r5]".to_string()),
        ];
        let tagged: Vec<_> = operands.iter().map(|op| to_value(&operand_entry(op, &Names))).collect();
        assert_eq!(
            tagged,
            vec![
                json!({ "Register": "r5" }),
                json!({ "Other": "<noreg>" }),
                json!({ "Immediate": -8 }),
                json!({ "Immediate": 0.5 }),
                json!({ "Other": "[r5]" }),
            ]
        );
    }

    #[test]
    fn test_integer_and_float_immediates_share_a_key()
    {
        let int = to_value(&OperandEntry::Immediate(Immediate::Integer(3)));
        let float = to_value(&OperandEntry::Immediate(Immediate::Float(3.0)));
        assert!(int["Immediate"].is_i64());
        assert!(float["Immediate"].is_f64());
    }

    #[test]
    fn test_missing_fields_are_omitted()
    {
        let section = Section::new(1, None, 0x40, 0, false, Vec::new());
        assert_eq!(to_value(&SectionEntry::from(&section)), json!({ "Address": 0x40 }));

        let symbol = Symbol {
            name: Some("ext".into()),
            address: None,
            value: Some(0),
            size: 0,
            kind: crate::types::SymbolKind::Other,
            section: None,
        };
        assert_eq!(to_value(&SymbolEntry::from(&symbol)), json!({ "Name": "ext", "Value": 0 }));
    }

    #[test]
    fn test_relocation_entries()
    {
        let resolved = Relocation {
            offset: 0x10,
            kind: 7,
            symbol: Some(RelocationSymbol {
                index: 3,
                name: Some("puts".into()),
            }),
        };
        let nameless = Relocation {
            offset: 0x18,
            kind: 7,
            symbol: Some(RelocationSymbol { index: 4, name: None }),
        };
        let unresolved = Relocation {
            offset: 0x20,
            kind: 8,
            symbol: None,
        };

        assert_eq!(
            to_value(&RelocationEntry::from(&resolved)),
            json!({ "Symbol": "puts", "Offset": 0x10, "Type": 7 })
        );
        assert_eq!(to_value(&RelocationEntry::from(&nameless)), json!({ "Offset": 0x18, "Type": 7 }));
        assert_eq!(to_value(&RelocationEntry::from(&unresolved)), json!({}));
    }

    #[test]
    fn test_listing_lines()
    {
        let insn = Instruction {
            address: 0,
            section: SectionId(1),
            section_offset: 0,
            opcode: 2,
            operands: vec![Operand::Register(1), Operand::Immediate(4)],
            bytes: vec![0; 2],
        };
        let mut out = Vec::new();
        write_listing(&mut out, &[insn.clone(), insn], &Names).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "OP2 r1, 4\nOP2 r1, 4\n");

        let mut out = Vec::new();
        write_listing(&mut out, &[], &Names).unwrap();
        assert!(out.is_empty());
    }
}
