//! Shared fixtures for integration tests
#![allow(dead_code)]

use object::write::{Object as ObjectWriter, Relocation as WriteRelocation, Symbol as WriteSymbol, SymbolSection as WriteSymbolSection};
use object::{Architecture as ObjArchitecture, BinaryFormat, Endianness, RelocationFlags, SectionKind, SymbolFlags, SymbolScope};
use vorhees_core::decoder::{DecodedInstruction, InstructionDecoder, TextRenderer};
use vorhees_core::model::{Architecture, ObjectFormat, ObjectModel, TargetTriple};
use vorhees_core::types::{Operand, Section, Symbol, SymbolKind};
use vorhees_core::SectionId;

/// push rbp; mov rbp, rsp; pop rbp; ret
pub const PROLOGUE: &[u8] = &[0x55, 0x48, 0x89, 0xe5, 0x5d, 0xc3];

/// Undecodable in 64-bit mode on its own (`push es`)
pub const BAD: u8 = 0x06;

/// Four-byte instructions; a leading 0xff is undecodable. Opcode is the
/// first byte, the second byte becomes a register operand.
pub struct FixedWidth;

impl InstructionDecoder for FixedWidth
{
    fn decode_one(&mut self, bytes: &[u8], _address: u64) -> Option<DecodedInstruction>
    {
        if bytes.len() < 4 || bytes[0] == 0xff {
            return None;
        }
        Some(DecodedInstruction {
            opcode: u32::from(bytes[0]),
            operands: vec![Operand::Register(u32::from(bytes[1]))],
            length: 4,
        })
    }
}

pub struct Names;

impl TextRenderer for Names
{
    fn opcode_name(&self, opcode: u32) -> String
    {
        format!("op{opcode}")
    }

    fn register_name(&self, register: u32) -> String
    {
        format!("r{register}")
    }
}

pub fn x86_64() -> TargetTriple
{
    TargetTriple::new(Architecture::X86_64, ObjectFormat::Elf, true)
}

pub fn code(id: usize, name: &str, address: u64, bytes: Vec<u8>) -> Section
{
    let size = bytes.len() as u64;
    Section::new(id, Some(name.to_string()), address, size, true, bytes)
}

pub fn data(id: usize, name: &str, address: u64, bytes: Vec<u8>) -> Section
{
    let size = bytes.len() as u64;
    Section::new(id, Some(name.to_string()), address, size, false, bytes)
}

pub fn data_symbol(name: &str, address: u64, section: SectionId) -> Symbol
{
    Symbol {
        name: Some(name.to_string()),
        address: Some(address),
        value: Some(address),
        size: 4,
        kind: SymbolKind::Other,
        section: Some(section),
    }
}

/// "foo.o": `.text` (#1) at 0x1000 with two four-byte instructions and
/// `.data` (#2) at 0x2000 holding symbol `bar`.
pub fn foo_model() -> ObjectModel
{
    let sections = vec![
        code(1, ".text", 0x1000, vec![0x10, 1, 0, 0, 0x11, 2, 0, 0]),
        data(2, ".data", 0x2000, vec![0; 4]),
    ];
    let symbols = vec![
        Symbol::function("foo", 0x1000, 8, SectionId(1)),
        data_symbol("bar", 0x2000, SectionId(2)),
    ];
    ObjectModel::from_parts("foo.o", x86_64(), sections, symbols, Vec::new())
}

/// Relocatable x86-64 ELF with `.text` = `text`, a `.data` word and
/// symbols `main` (function over all of `.text`), `counter` (data) and an
/// undefined `puts` referenced by one `.text` relocation.
pub fn elf_object(text: &[u8]) -> Vec<u8>
{
    elf_object_for(ObjArchitecture::X86_64, text)
}

pub fn elf_object_for(arch: ObjArchitecture, text: &[u8]) -> Vec<u8>
{
    elf_object_with_labels(arch, text, &[])
}

/// Like [`elf_object_for`], plus untyped local labels (`STT_NOTYPE`) at the
/// given `.text` offsets.
pub fn elf_object_with_labels(arch: ObjArchitecture, text: &[u8], labels: &[(&str, u64)]) -> Vec<u8>
{
    let mut obj = ObjectWriter::new(BinaryFormat::Elf, arch, Endianness::Little);
    let text_id = obj.add_section(Vec::new(), b".text".to_vec(), SectionKind::Text);
    obj.append_section_data(text_id, text, 16);
    let data_id = obj.add_section(Vec::new(), b".data".to_vec(), SectionKind::Data);
    obj.append_section_data(data_id, &[0; 4], 4);

    obj.add_symbol(WriteSymbol {
        name: b"main".to_vec(),
        value: 0,
        size: text.len() as u64,
        kind: object::SymbolKind::Text,
        scope: SymbolScope::Linkage,
        weak: false,
        section: WriteSymbolSection::Section(text_id),
        flags: SymbolFlags::None,
    });
    obj.add_symbol(WriteSymbol {
        name: b"counter".to_vec(),
        value: 0,
        size: 4,
        kind: object::SymbolKind::Data,
        scope: SymbolScope::Linkage,
        weak: false,
        section: WriteSymbolSection::Section(data_id),
        flags: SymbolFlags::None,
    });
    for (name, offset) in labels {
        obj.add_symbol(WriteSymbol {
            name: name.as_bytes().to_vec(),
            value: *offset,
            size: 0,
            kind: object::SymbolKind::Label,
            scope: SymbolScope::Compilation,
            weak: false,
            section: WriteSymbolSection::Section(text_id),
            flags: SymbolFlags::None,
        });
    }
    let puts = obj.add_symbol(WriteSymbol {
        name: b"puts".to_vec(),
        value: 0,
        size: 0,
        kind: object::SymbolKind::Text,
        scope: SymbolScope::Dynamic,
        weak: false,
        section: WriteSymbolSection::Undefined,
        flags: SymbolFlags::None,
    });

    if arch == ObjArchitecture::X86_64 && text.len() >= 4 {
        obj.add_relocation(
            text_id,
            WriteRelocation {
                offset: 0,
                symbol: puts,
                addend: -4,
                flags: RelocationFlags::Elf {
                    r_type: object::elf::R_X86_64_PLT32,
                },
            },
        )
        .expect("add relocation");
    }

    obj.write().expect("write ELF")
}

/// Point the section header of `section` at a file offset past the end of
/// a little-endian ELF64 image, so its data can no longer be read.
pub fn detach_elf64_section(mut bytes: Vec<u8>, section: &str) -> Vec<u8>
{
    use object::{Object, ObjectSection};

    let index = object::File::parse(&*bytes)
        .unwrap()
        .section_by_name(section)
        .unwrap()
        .index()
        .0;
    let read_u64 = |at: usize| u64::from_le_bytes(bytes[at..at + 8].try_into().unwrap());
    let shoff = read_u64(0x28) as usize;
    let shentsize = u16::from_le_bytes([bytes[0x3a], bytes[0x3b]]) as usize;

    // sh_offset lives 0x18 bytes into an Elf64_Shdr
    let at = shoff + index * shentsize + 0x18;
    let past_end = bytes.len() as u64 + 0x1000;
    bytes[at..at + 8].copy_from_slice(&past_end.to_le_bytes());
    bytes
}
