//! Tests for the disassembly index

mod common;

use common::{code, data, elf_object, x86_64, FixedWidth, BAD, PROLOGUE};
use vorhees_core::backends;
use vorhees_core::index::DisassemblyIndex;
use vorhees_core::model::{ObjectModel, RelocationScope};
use vorhees_core::report::write_listing;
use vorhees_core::{Disassembler, IndexOptions, SectionId};

fn x86_index(text: &[u8]) -> Disassembler
{
    let bytes = elf_object(text);
    let model = ObjectModel::parse("test.o", &bytes, RelocationScope::Dynamic).unwrap();
    Disassembler::from_model(model, backends::initialize(), IndexOptions::default()).unwrap()
}

fn text_id(dis: &Disassembler) -> SectionId
{
    dis.model()
        .sections()
        .iter()
        .find(|s| s.name.as_deref() == Some(".text"))
        .map(|s| s.id)
        .unwrap()
}

#[test]
fn test_n_valid_instructions_yield_n_entries()
{
    let dis = x86_index(PROLOGUE);
    let text = text_id(&dis);

    let insns = dis.index().section_instructions(text);
    assert_eq!(insns.len(), 4);
    assert!(insns.windows(2).all(|pair| pair[0].address < pair[1].address));
    let offsets: Vec<u64> = insns.iter().map(|i| i.section_offset).collect();
    assert_eq!(offsets, vec![0, 1, 4, 5]);
}

#[test]
fn test_resynchronization_keeps_instruction_count()
{
    let clean = x86_index(PROLOGUE);

    for k in 1..=5usize {
        let mut text = vec![PROLOGUE[0]];
        text.extend(std::iter::repeat(BAD).take(k));
        text.extend_from_slice(&PROLOGUE[1..]);
        let dirty = x86_index(&text);

        let clean_scan = clean.index().scan(text_id(&clean)).unwrap();
        let dirty_scan = dirty.index().scan(text_id(&dirty)).unwrap();
        assert_eq!(dirty_scan.decoded, clean_scan.decoded, "k = {k}");
        assert_eq!(dirty_scan.scanned_bytes, clean_scan.scanned_bytes + k as u64);
        assert_eq!(dirty_scan.skipped_bytes, k as u64);
    }
}

#[test]
fn test_ranges_partition_the_stream()
{
    let sections = vec![
        code(1, ".init", 0x100, vec![1, 0, 0, 0, 2, 0, 0, 0]),
        code(2, ".plt", 0x200, vec![0xff; 3]),
        data(3, ".rodata", 0x300, vec![1, 0, 0, 0]),
        code(4, ".fini", 0x400, Vec::new()),
        code(5, ".text", 0x500, vec![3, 0, 0, 0, 0xff, 4, 0, 0, 0, 5, 0, 0, 0]),
        code(6, ".text.cold", 0x600, vec![6, 0, 0, 0]),
    ];
    let model = ObjectModel::from_parts("multi.o", x86_64(), sections, Vec::new(), Vec::new());
    let index = DisassemblyIndex::build(&model, &mut FixedWidth).unwrap();

    let mut rebuilt = Vec::new();
    let mut expected_first = 0;
    for (_, range) in index.ranges().iter() {
        assert_eq!(range.first(), expected_first);
        rebuilt.extend_from_slice(&index.instructions()[range.as_range()]);
        expected_first = range.last() + 1;
    }
    assert_eq!(rebuilt, index.instructions());

    let registered: Vec<SectionId> = index.ranges().iter().map(|(id, _)| id).collect();
    assert_eq!(registered, vec![SectionId(1), SectionId(5), SectionId(6)]);
    for (id, range) in index.ranges().iter() {
        assert!(index.instructions()[range.as_range()].iter().all(|i| i.section == id));
    }
}

#[test]
fn test_scenario_section_lookup()
{
    let model = common::foo_model();
    let index = DisassemblyIndex::build(&model, &mut FixedWidth).unwrap();

    let text = index.section_instructions(SectionId(1));
    let addresses: Vec<u64> = text.iter().map(|i| i.address).collect();
    assert_eq!(addresses, vec![0x1000, 0x1004]);
    assert!(index.section_instructions(SectionId(2)).is_empty());
}

#[test]
fn test_dump_of_undecodable_file_is_empty()
{
    let dis = x86_index(&[BAD, BAD, BAD]);
    assert!(dis.instructions().is_empty());
    assert!(dis.index().ranges().is_empty());

    let mut out = Vec::new();
    write_listing(&mut out, dis.instructions(), dis.renderer()).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_dump_lines_render_instructions()
{
    let dis = x86_index(PROLOGUE);
    let mut out = Vec::new();
    write_listing(&mut out, dis.instructions(), dis.renderer()).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["push rbp", "mov rbp,rsp", "pop rbp", "ret"]);
}

#[test]
fn test_index_is_shareable_across_threads()
{
    let dis = x86_index(PROLOGUE);
    let counts: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| dis.instructions().iter().filter(|i| !i.is_empty()).count()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(counts, vec![4; 4]);
}
