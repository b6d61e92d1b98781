//! # Decoder and Renderer Interfaces
//!
//! The index never decodes machine code itself. It drives an
//! [`InstructionDecoder`] one instruction at a time and, for output, asks a
//! [`TextRenderer`] to turn opcodes, registers and operands into text.
//!
//! ## Why use traits?
//!
//! - The decode loop and the report are target independent
//! - Tests can script a decoder byte by byte
//! - Adding an architecture means adding a backend, nothing else
//!
//! The shipped backend is [`x86`], built on `iced-x86`.

pub mod x86;

use crate::types::{Instruction, Operand, SectionId};

/// Result of a successful single-instruction decode.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedInstruction
{
    /// Decoder-specific opcode identifier
    pub opcode: u32,
    /// Operands in decoder order
    pub operands: Vec<Operand>,
    /// Number of bytes consumed
    pub length: usize,
}

impl DecodedInstruction
{
    /// Attach position information, producing a stream entry.
    ///
    /// `bytes` must start at the decoded instruction; the first `length`
    /// bytes (clamped to what is available) are recorded as its encoding.
    pub fn into_instruction(self, address: u64, section: SectionId, section_offset: u64, bytes: &[u8]) -> Instruction
    {
        let length = self.length.min(bytes.len());
        Instruction {
            address,
            section,
            section_offset,
            opcode: self.opcode,
            operands: self.operands,
            bytes: bytes[..length].to_vec(),
        }
    }
}

/// Decodes at most one instruction at a time.
///
/// Implementations must be deterministic: the same bytes at the same
/// address always yield the same result.
pub trait InstructionDecoder
{
    /// Decode one instruction from the start of `bytes`, which live at
    /// `address`.
    ///
    /// Returns `None` when nothing valid starts at `bytes[0]`.
    fn decode_one(&mut self, bytes: &[u8], address: u64) -> Option<DecodedInstruction>;
}

/// Turns decoded instructions into text.
pub trait TextRenderer
{
    /// Mnemonic-level name of an opcode identifier.
    fn opcode_name(&self, opcode: u32) -> String;

    /// Name of a register id. Not called for id 0.
    fn register_name(&self, register: u32) -> String;

    /// Textual form of any operand.
    fn render_operand(&self, operand: &Operand) -> String
    {
        match operand {
            Operand::Register(0) => "<noreg>".to_string(),
            Operand::Register(id) => self.register_name(*id),
            Operand::Immediate(value) => value.to_string(),
            Operand::FloatImmediate(value) => value.to_string(),
            Operand::Other(text) => text.clone(),
        }
    }

    /// One-line assembly listing of a whole instruction.
    fn render_instruction(&self, instruction: &Instruction) -> String
    {
        let operands: Vec<String> = instruction.operands.iter().map(|op| self.render_operand(op)).collect();
        if operands.is_empty() {
            self.opcode_name(instruction.opcode)
        } else {
            format!("{} {}", self.opcode_name(instruction.opcode), operands.join(", "))
        }
    }
}
