//! Decoded instruction types.

use super::SectionId;

/// A single instruction operand, in the decoder's own operand order.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand
{
    /// Register operand; id 0 means "no register"
    Register(u32),
    /// Integer immediate (branch targets included)
    Immediate(i64),
    /// Floating-point immediate
    FloatImmediate(f64),
    /// Anything else (memory references, far pointers, ...) as rendered by
    /// the decoder
    Other(String),
}

/// A decoded machine instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction
{
    /// Address the instruction was decoded at
    pub address: u64,
    /// Section the instruction was decoded from
    pub section: SectionId,
    /// Offset of the first byte from the section's start
    pub section_offset: u64,
    /// Decoder-specific opcode identifier
    pub opcode: u32,
    /// Operands in decoder order
    pub operands: Vec<Operand>,
    /// Raw encoding
    pub bytes: Vec<u8>,
}

impl Instruction
{
    /// Encoded length in bytes.
    pub fn len(&self) -> usize
    {
        self.bytes.len()
    }

    /// True for a zero-length record, which no real decoder produces.
    pub fn is_empty(&self) -> bool
    {
        self.bytes.is_empty()
    }
}
