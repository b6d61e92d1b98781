//! x86/x64 backend using iced-x86.
//!
//! This module provides a thin wrapper around iced-x86 that converts its
//! instruction representation to our [`DecodedInstruction`] and renders
//! instructions in Intel syntax.

use iced_x86::{
    Code, Decoder, DecoderOptions, Formatter, Instruction as IcedInstruction, IntelFormatter, OpKind, Register,
};

use super::{DecodedInstruction, InstructionDecoder, TextRenderer};
use crate::types::{Instruction, Operand};

/// Single-instruction x86 decoder.
///
/// Opcode identifiers are iced `Code` values, register ids are iced
/// `Register` values (`Register::None` is 0).
pub struct X86Decoder
{
    bitness: u32,
    formatter: IntelFormatter,
}

impl X86Decoder
{
    /// Create a decoder for 16-, 32- or 64-bit code.
    ///
    /// Returns `None` for any other bitness.
    pub fn new(bitness: u32) -> Option<Self>
    {
        matches!(bitness, 16 | 32 | 64).then(|| Self {
            bitness,
            formatter: IntelFormatter::new(),
        })
    }

    fn convert_operand(&mut self, instr: &IcedInstruction, operand: u32) -> Operand
    {
        match instr.op_kind(operand) {
            OpKind::Register => Operand::Register(instr.op_register(operand) as u32),
            OpKind::NearBranch16 | OpKind::NearBranch32 | OpKind::NearBranch64 => {
                Operand::Immediate(instr.near_branch_target() as i64)
            }
            OpKind::Immediate8
            | OpKind::Immediate8_2nd
            | OpKind::Immediate16
            | OpKind::Immediate32
            | OpKind::Immediate64
            | OpKind::Immediate8to16
            | OpKind::Immediate8to32
            | OpKind::Immediate8to64
            | OpKind::Immediate32to64 => Operand::Immediate(instr.immediate(operand) as i64),
            _ => Operand::Other(self.format_operand(instr, operand)),
        }
    }

    fn format_operand(&mut self, instr: &IcedInstruction, operand: u32) -> String
    {
        let mut text = String::new();
        // Formatter operand numbering differs from the instruction's for a few encodings
        if let Ok(Some(index)) = self.formatter.get_formatter_operand(instr, operand) {
            if self.formatter.format_operand(instr, &mut text, index).is_err() {
                text.clear();
            }
        }
        text
    }
}

impl InstructionDecoder for X86Decoder
{
    fn decode_one(&mut self, bytes: &[u8], address: u64) -> Option<DecodedInstruction>
    {
        if bytes.is_empty() {
            return None;
        }

        let mut decoder = Decoder::with_ip(self.bitness, bytes, address, DecoderOptions::NONE);
        let instr = decoder.decode();
        if instr.is_invalid() {
            return None;
        }

        let operands = (0..instr.op_count()).map(|i| self.convert_operand(&instr, i)).collect();
        Some(DecodedInstruction {
            opcode: instr.code() as u32,
            operands,
            length: instr.len(),
        })
    }
}

/// Intel-syntax renderer matching [`X86Decoder`].
pub struct X86Renderer
{
    bitness: u32,
}

impl X86Renderer
{
    pub fn new(bitness: u32) -> Self
    {
        Self { bitness }
    }
}

impl TextRenderer for X86Renderer
{
    fn opcode_name(&self, opcode: u32) -> String
    {
        Code::try_from(opcode as usize).map_or_else(|_| format!("<opcode {opcode}>"), |code| format!("{code:?}"))
    }

    fn register_name(&self, register: u32) -> String
    {
        Register::try_from(register as usize)
            .map_or_else(|_| format!("<reg {register}>"), |reg| format!("{reg:?}").to_lowercase())
    }

    fn render_instruction(&self, instruction: &Instruction) -> String
    {
        // Re-decode the recorded bytes; decoding is deterministic
        let Ok(mut decoder) = Decoder::try_with_ip(self.bitness, &instruction.bytes, instruction.address, DecoderOptions::NONE)
        else {
            return "(bad)".to_string();
        };
        let instr = decoder.decode();
        if instr.is_invalid() {
            return "(bad)".to_string();
        }
        let mut formatter = IntelFormatter::new();
        let mut output = String::new();
        formatter.format(&instr, &mut output);
        output
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::types::SectionId;

    fn decode(bitness: u32, bytes: &[u8], address: u64) -> Option<DecodedInstruction>
    {
        X86Decoder::new(bitness).unwrap().decode_one(bytes, address)
    }

    #[test]
    fn test_rejects_bad_bitness()
    {
        assert!(X86Decoder::new(8).is_none());
        assert!(X86Decoder::new(64).is_some());
    }

    #[test]
    fn test_decode_push_rbp()
    {
        let decoded = decode(64, &[0x55, 0xc3], 0x1000).unwrap();
        assert_eq!(decoded.length, 1);
        assert_eq!(decoded.opcode, Code::Push_r64 as u32);
        assert_eq!(decoded.operands, vec![Operand::Register(Register::RBP as u32)]);
    }

    #[test]
    fn test_decode_register_pair()
    {
        let decoded = decode(64, &[0x48, 0x89, 0xe5], 0).unwrap();
        assert_eq!(decoded.length, 3);
        assert_eq!(
            decoded.operands,
            vec![Operand::Register(Register::RBP as u32), Operand::Register(Register::RSP as u32)]
        );
    }

    #[test]
    fn test_decode_near_branch_as_immediate_target()
    {
        let decoded = decode(64, &[0xe8, 0x00, 0x00, 0x00, 0x00], 0x1000).unwrap();
        assert_eq!(decoded.length, 5);
        assert_eq!(decoded.operands, vec![Operand::Immediate(0x1005)]);
    }

    #[test]
    fn test_decode_immediate()
    {
        // mov eax, 0x2a
        let decoded = decode(64, &[0xb8, 0x2a, 0x00, 0x00, 0x00], 0).unwrap();
        assert_eq!(decoded.operands[1], Operand::Immediate(0x2a));
    }

    #[test]
    fn test_decode_memory_operand_is_textual()
    {
        // mov eax, [rbp-4]
        let decoded = decode(64, &[0x8b, 0x45, 0xfc], 0).unwrap();
        assert_eq!(decoded.operands[0], Operand::Register(Register::EAX as u32));
        match &decoded.operands[1] {
            Operand::Other(text) => assert!(text.contains("rbp"), "unexpected text {text}"),
            other => panic!("expected textual operand, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_invalid_and_truncated()
    {
        // `push es` does not exist in 64-bit mode
        assert!(decode(64, &[0x06], 0).is_none());
        // mov eax, imm32 with the immediate cut short
        assert!(decode(64, &[0xb8, 0x01], 0).is_none());
        assert!(decode(64, &[], 0).is_none());
    }

    #[test]
    fn test_renderer_names()
    {
        let renderer = X86Renderer::new(64);
        assert_eq!(renderer.opcode_name(Code::Push_r64 as u32), "Push_r64");
        assert_eq!(renderer.register_name(Register::RSP as u32), "rsp");
        assert!(renderer.opcode_name(u32::MAX).starts_with("<opcode"));
    }

    #[test]
    fn test_render_instruction_from_bytes()
    {
        let bytes = [0x48, 0x89, 0xe5];
        let decoded = decode(64, &bytes, 0x40).unwrap();
        let insn = decoded.into_instruction(0x40, SectionId(1), 0, &bytes);
        assert_eq!(X86Renderer::new(64).render_instruction(&insn), "mov rbp,rsp");
    }
}
