//! # Backend Registry
//!
//! Process-wide table of decoder backends, initialized exactly once.
//!
//! Call [`initialize`] before building anything. It returns a
//! `&'static Backends`, and [`crate::Disassembler::open`] takes that reference
//! as an argument, so there is no way to construct an index without the
//! registry having been set up first. Repeated calls are cheap and return
//! the same registry.
//!
//! ```rust
//! let backends = vorhees_core::backends::initialize();
//! assert!(std::ptr::eq(backends, vorhees_core::backends::initialize()));
//! ```

use once_cell::sync::OnceCell;

use crate::decoder::x86::{X86Decoder, X86Renderer};
use crate::decoder::{InstructionDecoder, TextRenderer};
use crate::error::{Result, VorheesError};
use crate::model::TargetTriple;

static BACKENDS: OnceCell<Backends> = OnceCell::new();

/// Set up the backend registry (first call) and return it.
pub fn initialize() -> &'static Backends
{
    BACKENDS.get_or_init(|| {
        let backends = Backends::builtin();
        tracing::debug!(targets = ?backends.names(), "initialized decoder backends");
        backends
    })
}

/// Registry of supported targets.
#[derive(Debug)]
pub struct Backends
{
    targets: Vec<TargetInfo>,
}

#[derive(Debug, Clone, Copy)]
struct TargetInfo
{
    name: &'static str,
    bitness: u32,
}

impl Backends
{
    fn builtin() -> Self
    {
        Self {
            targets: vec![
                TargetInfo {
                    name: "x86",
                    bitness: 32,
                },
                TargetInfo {
                    name: "x86-64",
                    bitness: 64,
                },
            ],
        }
    }

    /// Names of the registered targets.
    pub fn names(&self) -> Vec<&'static str>
    {
        self.targets.iter().map(|target| target.name).collect()
    }

    /// Find the backend for a triple.
    ///
    /// ## Errors
    ///
    /// `TargetResolution` if no backend handles the triple's architecture.
    pub fn lookup(&self, triple: &TargetTriple) -> Result<Target>
    {
        let bitness = triple.architecture.x86_bitness().filter(|_| triple.little_endian);
        self.targets
            .iter()
            .find(|target| Some(target.bitness) == bitness)
            .map(|info| Target {
                name: info.name,
                bitness: info.bitness,
            })
            .ok_or_else(|| {
                VorheesError::TargetResolution(format!(
                    "no decoder for target '{triple}' (supported: {})",
                    self.names().join(", ")
                ))
            })
    }
}

/// A resolved target: hands out a decoder and a matching renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target
{
    name: &'static str,
    bitness: u32,
}

impl Target
{
    pub fn name(&self) -> &'static str
    {
        self.name
    }

    /// Fresh decoder for this target.
    ///
    /// ## Errors
    ///
    /// `TargetResolution` if the backend rejects the target's bitness.
    pub fn decoder(&self) -> Result<Box<dyn InstructionDecoder>>
    {
        X86Decoder::new(self.bitness)
            .map(|decoder| Box::new(decoder) as Box<dyn InstructionDecoder>)
            .ok_or_else(|| VorheesError::TargetResolution(format!("{}: unsupported bitness {}", self.name, self.bitness)))
    }

    pub fn renderer(&self) -> Box<dyn TextRenderer + Send + Sync>
    {
        Box::new(X86Renderer::new(self.bitness))
    }
}
