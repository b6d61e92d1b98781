//! # Disassembly Index
//!
//! Decodes every executable section and builds one ordered instruction
//! stream plus a per-section index into it.
//!
//! ## Layout
//!
//! ```text
//! sections:   .init        .plt (data only)   .text
//! stream:     [0 1 2]      -                  [3 4 5 6 ...]
//! ranges:     .init→0..=2                     .text→3..=n
//! ```
//!
//! Sections are visited in container order and each one's instructions are
//! appended in address order. A section that yields no instructions gets no
//! range. The ranges, taken in registration order, tile a prefix of the
//! stream with no gaps and no overlap.
//!
//! ## Resynchronization
//!
//! When the decoder finds nothing valid at an offset, the loop moves ahead
//! exactly one byte and tries again. Literal pools, padding and other data
//! embedded in code are skipped this way without failing the section.
//!
//! ## Failure
//!
//! The only error is an executable section whose bytes cannot be read. It
//! aborts the whole build; no partial index is returned.

use std::ops::Range;

use crate::decoder::InstructionDecoder;
use crate::error::{Result, VorheesError};
use crate::model::ObjectModel;
use crate::types::{Instruction, Section, SectionId};

/// Inclusive `[first, last]` span of stream indices owned by one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionRange
{
    first: usize,
    last: usize,
}

impl InstructionRange
{
    /// Index of the section's first instruction.
    pub fn first(&self) -> usize
    {
        self.first
    }

    /// Index of the section's last instruction.
    pub fn last(&self) -> usize
    {
        self.last
    }

    /// Number of instructions in the span (never 0).
    pub fn len(&self) -> usize
    {
        self.last - self.first + 1
    }

    /// Always false: a registered span holds at least one instruction.
    pub fn is_empty(&self) -> bool
    {
        false
    }

    /// Equivalent half-open range, for slicing.
    pub fn as_range(&self) -> Range<usize>
    {
        self.first..self.last + 1
    }
}

/// Section → stream span, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeIndex
{
    entries: Vec<(SectionId, InstructionRange)>,
}

impl RangeIndex
{
    /// Span registered for `section`, if it produced any instruction.
    pub fn get(&self, section: SectionId) -> Option<InstructionRange>
    {
        self.entries.iter().find(|(id, _)| *id == section).map(|(_, range)| *range)
    }

    /// Registered spans in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionId, InstructionRange)> + '_
    {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }

    fn register(&mut self, section: SectionId, range: InstructionRange)
    {
        self.entries.push((section, range));
    }
}

/// What the decode loop did with one executable section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionScan
{
    pub section: SectionId,
    /// Bytes scanned: `min(declared size, bytes available)`
    pub scanned_bytes: u64,
    /// Instructions appended to the stream
    pub decoded: usize,
    /// Bytes stepped over by resynchronization
    pub skipped_bytes: u64,
}

/// The flat instruction stream and its per-section index.
///
/// Built once by [`DisassemblyIndex::build`] and immutable afterwards, so it
/// can be shared between threads and read without locking.
#[derive(Debug, Clone, Default)]
pub struct DisassemblyIndex
{
    instructions: Vec<Instruction>,
    ranges: RangeIndex,
    scans: Vec<SectionScan>,
}

impl DisassemblyIndex
{
    /// Decode all executable sections of `model`.
    ///
    /// ## Errors
    ///
    /// `SectionRead` if an executable section's bytes are unavailable.
    pub fn build(model: &ObjectModel, decoder: &mut dyn InstructionDecoder) -> Result<Self>
    {
        let mut index = DisassemblyIndex::default();
        // Stream position of the next section's first instruction. Kept
        // separately so sections without instructions never move it.
        let mut next_first = 0usize;

        for section in model.sections().iter().filter(|section| section.executable) {
            let scan = index.scan_section(section, decoder)?;
            if scan.decoded > 0 {
                let range = InstructionRange {
                    first: next_first,
                    last: next_first + scan.decoded - 1,
                };
                index.ranges.register(section.id, range);
                next_first += scan.decoded;
            }
            debug_assert_eq!(next_first, index.instructions.len());

            tracing::debug!(
                section = %section.id,
                name = section.display_name(),
                scanned = scan.scanned_bytes,
                decoded = scan.decoded,
                skipped = scan.skipped_bytes,
                "disassembled section"
            );
            index.scans.push(scan);
        }

        tracing::info!(
            file = model.file_name(),
            instructions = index.instructions.len(),
            sections = index.ranges.len(),
            "built disassembly index"
        );
        Ok(index)
    }

    fn scan_section(&mut self, section: &Section, decoder: &mut dyn InstructionDecoder) -> Result<SectionScan>
    {
        let bytes = section.data.bytes().map_err(|reason| VorheesError::SectionRead {
            section: section.id,
            name: section.name.clone(),
            reason: reason.to_string(),
        })?;

        // The header's size can claim more than the file holds
        let usable = usize::try_from(section.size).map_or(bytes.len(), |size| size.min(bytes.len()));
        let bytes = &bytes[..usable];

        let mut offset = 0usize;
        let mut decoded = 0usize;
        let mut skipped = 0u64;
        while offset < usable {
            let address = section.address.wrapping_add(offset as u64);
            let window = &bytes[offset..];
            match decoder.decode_one(window, address) {
                Some(insn) => {
                    let length = insn.length.max(1);
                    self.instructions
                        .push(insn.into_instruction(address, section.id, offset as u64, window));
                    decoded += 1;
                    offset = offset.saturating_add(length);
                }
                None => {
                    tracing::trace!(section = %section.id, address, "no instruction, resynchronizing");
                    skipped += 1;
                    offset += 1;
                }
            }
        }

        Ok(SectionScan {
            section: section.id,
            scanned_bytes: usable as u64,
            decoded,
            skipped_bytes: skipped,
        })
    }

    /// The whole stream, in section then address order.
    pub fn instructions(&self) -> &[Instruction]
    {
        &self.instructions
    }

    pub fn ranges(&self) -> &RangeIndex
    {
        &self.ranges
    }

    /// Per-section scan statistics, one entry per executable section.
    pub fn scans(&self) -> &[SectionScan]
    {
        &self.scans
    }

    /// Scan statistics for one section.
    pub fn scan(&self, section: SectionId) -> Option<&SectionScan>
    {
        self.scans.iter().find(|scan| scan.section == section)
    }

    /// Instructions decoded from `section`; empty if it produced none.
    pub fn section_instructions(&self, section: SectionId) -> &[Instruction]
    {
        self.ranges
            .get(section)
            .map_or(&[][..], |range| &self.instructions[range.as_range()])
    }

    pub fn len(&self) -> usize
    {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.instructions.is_empty()
    }
}
