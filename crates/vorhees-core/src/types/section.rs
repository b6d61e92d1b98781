//! Section types.

use std::fmt;
use std::sync::Arc;

/// Identifier of a section inside its object file
///
/// This is the container's own section index (for ELF it counts the null
/// section, so `.text` is usually not 0). It is only meaningful for the
/// object file it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectionId(pub usize);

impl From<usize> for SectionId
{
    fn from(value: usize) -> Self
    {
        SectionId(value)
    }
}

impl fmt::Display for SectionId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "#{}", self.0)
    }
}

/// Raw contents of a section as captured at load time.
///
/// Reading can fail for a truncated or corrupt container. The failure is kept
/// rather than raised so that only the sections somebody actually needs
/// (executable ones, during the index build) turn it into an error.
#[derive(Debug, Clone)]
pub enum SectionData
{
    /// Bytes were read successfully
    Loaded(Arc<[u8]>),
    /// The container refused to hand out the bytes
    Unreadable(String),
}

impl SectionData
{
    /// Borrow the loaded bytes, or the container's reason for refusing them.
    pub fn bytes(&self) -> Result<&[u8], &str>
    {
        match self {
            SectionData::Loaded(bytes) => Ok(bytes),
            SectionData::Unreadable(reason) => Err(reason),
        }
    }
}

impl From<Vec<u8>> for SectionData
{
    fn from(bytes: Vec<u8>) -> Self
    {
        SectionData::Loaded(bytes.into())
    }
}

impl From<&[u8]> for SectionData
{
    fn from(bytes: &[u8]) -> Self
    {
        SectionData::Loaded(bytes.into())
    }
}

/// A section of a loaded object file.
#[derive(Debug, Clone)]
pub struct Section
{
    /// Container section index
    pub id: SectionId,
    /// Section name; `None` if the string table lookup failed
    pub name: Option<String>,
    /// Base (virtual) address
    pub address: u64,
    /// Size declared by the section header
    ///
    /// This can be larger than the bytes actually present in the file.
    pub size: u64,
    /// Whether the section holds code
    pub executable: bool,
    /// Contents captured when the file was loaded
    pub data: SectionData,
}

impl Section
{
    /// Build a section from its parts.
    pub fn new(id: impl Into<SectionId>, name: Option<String>, address: u64, size: u64, executable: bool, data: impl Into<SectionData>) -> Self
    {
        Self {
            id: id.into(),
            name,
            address,
            size,
            executable,
            data: data.into(),
        }
    }

    /// Name for log and error messages.
    pub fn display_name(&self) -> &str
    {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}
