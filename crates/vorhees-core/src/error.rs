//! # Error Types
//!
//! General error handling for loading, indexing and reporting.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Only fatal conditions are represented here. Undecodable bytes, symbol
//! fields that fail to resolve and relocations without a symbol degrade the
//! output instead of producing an error.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::SectionId;

/// Main error type for Vorhees operations
///
/// ## Error Categories
///
/// 1. **Load errors**: FileOpen, ObjectParse (abort before any decode)
/// 2. **Target errors**: TargetResolution (abort before any decode)
/// 3. **Index errors**: SectionRead (abort the whole build, no partial index)
/// 4. **Output errors**: Serialize, Io
///
/// Every variant maps to a distinct process exit status, see
/// [`VorheesError::exit_code`].
#[derive(Error, Debug)]
pub enum VorheesError
{
    /// The object file path is missing or unreadable
    #[error("Failed to open {}: {source}", path.display())]
    FileOpen
    {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The file was read but the container could not be parsed
    ///
    /// This happens for files that are not ELF, Mach-O, PE/COFF or one of
    /// the other formats the `object` crate understands, or for headers that
    /// are too damaged to enumerate sections.
    #[error("Failed to parse object file {}: {reason}", path.display())]
    ObjectParse
    {
        /// Path of the rejected file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// No decoder backend is registered for the object's target
    #[error("Error identifying the target for the input object file: {0}")]
    TargetResolution(String),

    /// An executable section's bytes are unavailable or truncated
    ///
    /// A single unreadable executable section fails the whole index build.
    #[error("Failed to read section {section}{}: {reason}", name.as_deref().map(|n| format!(" ({n})")).unwrap_or_default())]
    SectionRead
    {
        /// Identifier of the offending section
        section: SectionId,
        /// Section name, if the container provides one
        name: Option<String>,
        /// Container message
        reason: String,
    },

    /// Report serialization failed
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// I/O error while writing output
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl VorheesError
{
    /// Process exit status for this error.
    ///
    /// Each fatal kind gets its own non-zero status so callers can tell
    /// failures apart without parsing the message.
    pub const fn exit_code(&self) -> i32
    {
        match self {
            VorheesError::FileOpen { .. } => 2,
            VorheesError::ObjectParse { .. } => 3,
            VorheesError::TargetResolution(_) => 4,
            VorheesError::SectionRead { .. } => 5,
            VorheesError::Serialize(_) | VorheesError::Io(_) => 1,
        }
    }
}

/// Convenience type alias for `Result<T, VorheesError>`
///
/// ```rust
/// use vorhees_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, VorheesError>;
