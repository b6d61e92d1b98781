//! Target triple derived from an object file header.

use std::fmt;

/// CPU architecture of an object file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Architecture
{
    /// 32-bit x86
    X86,
    /// x86-64 (including the x32 ABI)
    X86_64,
    /// 64-bit ARM
    Aarch64,
    /// 32-bit ARM
    Arm,
    /// 64-bit RISC-V
    Riscv64,
    /// Anything the backends do not know about
    Unknown(String),
}

impl Architecture
{
    /// Decoder bitness for x86 variants.
    pub fn x86_bitness(&self) -> Option<u32>
    {
        match self {
            Architecture::X86 => Some(32),
            Architecture::X86_64 => Some(64),
            _ => None,
        }
    }
}

impl From<object::Architecture> for Architecture
{
    fn from(arch: object::Architecture) -> Self
    {
        match arch {
            object::Architecture::I386 => Architecture::X86,
            object::Architecture::X86_64 | object::Architecture::X86_64_X32 => Architecture::X86_64,
            object::Architecture::Aarch64 => Architecture::Aarch64,
            object::Architecture::Arm => Architecture::Arm,
            object::Architecture::Riscv64 => Architecture::Riscv64,
            other => Architecture::Unknown(format!("{other:?}").to_lowercase()),
        }
    }
}

impl fmt::Display for Architecture
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Architecture::X86 => write!(f, "i386"),
            Architecture::X86_64 => write!(f, "x86_64"),
            Architecture::Aarch64 => write!(f, "aarch64"),
            Architecture::Arm => write!(f, "arm"),
            Architecture::Riscv64 => write!(f, "riscv64"),
            Architecture::Unknown(name) => write!(f, "{name}"),
        }
    }
}

/// Container format of an object file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectFormat
{
    Elf,
    MachO,
    Coff,
    Pe,
    Other,
}

impl ObjectFormat
{
    fn vendor_os(self) -> &'static str
    {
        match self {
            ObjectFormat::Elf => "unknown-linux",
            ObjectFormat::MachO => "apple-darwin",
            ObjectFormat::Coff | ObjectFormat::Pe => "pc-windows",
            ObjectFormat::Other => "unknown-unknown",
        }
    }

    fn suffix(self) -> &'static str
    {
        match self {
            ObjectFormat::Elf => "elf",
            ObjectFormat::MachO => "macho",
            ObjectFormat::Coff => "coff",
            ObjectFormat::Pe => "pe",
            ObjectFormat::Other => "unknown",
        }
    }
}

impl From<object::BinaryFormat> for ObjectFormat
{
    fn from(format: object::BinaryFormat) -> Self
    {
        match format {
            object::BinaryFormat::Elf => ObjectFormat::Elf,
            object::BinaryFormat::MachO => ObjectFormat::MachO,
            object::BinaryFormat::Coff => ObjectFormat::Coff,
            object::BinaryFormat::Pe => ObjectFormat::Pe,
            _ => ObjectFormat::Other,
        }
    }
}

/// Architecture, format and byte order of an object file.
///
/// Displays as `<arch>-<vendor>-<os>-<format>`, e.g. `x86_64-unknown-linux-elf`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetTriple
{
    pub architecture: Architecture,
    pub format: ObjectFormat,
    pub little_endian: bool,
}

impl TargetTriple
{
    pub fn new(architecture: Architecture, format: ObjectFormat, little_endian: bool) -> Self
    {
        Self {
            architecture,
            format,
            little_endian,
        }
    }
}

impl fmt::Display for TargetTriple
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}-{}-{}", self.architecture, self.format.vendor_os(), self.format.suffix())
    }
}
