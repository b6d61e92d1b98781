//! Conversion from `object` crate records into the owned model types.

use std::path::Path;

use object::{
    Object, ObjectSection, ObjectSymbol, ObjectSymbolTable, RelocationFlags, RelocationTarget, SectionKind,
    SymbolSection,
};

use super::{ObjectModel, RelocationScope, TargetTriple};
use crate::error::{Result, VorheesError};
use crate::types::{Relocation, RelocationSymbol, Section, SectionData, SectionId, Symbol, SymbolKind};

pub(super) fn load(path: &Path, data: &[u8], scope: RelocationScope) -> Result<ObjectModel>
{
    let file = object::File::parse(data).map_err(|err| VorheesError::ObjectParse {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    let triple = TargetTriple::new(file.architecture().into(), file.format().into(), file.is_little_endian());
    let sections: Vec<Section> = file.sections().map(|section| convert_section(&section)).collect();
    let symbols: Vec<Symbol> = file.symbols().map(|symbol| convert_symbol(&symbol)).collect();

    let mut relocations = Vec::new();
    if let Some(dynamic) = file.dynamic_relocations() {
        let table = file.dynamic_symbol_table();
        for (offset, relocation) in dynamic {
            let symbol = symbol_target(&relocation, |index| {
                table
                    .as_ref()
                    .and_then(|table| table.symbol_by_index(index).ok())
                    .map(|symbol| symbol.name().ok().map(str::to_owned))
            });
            relocations.push(Relocation {
                offset,
                kind: relocation_type(relocation.flags()),
                symbol,
            });
        }
    }
    if scope == RelocationScope::All {
        for section in file.sections() {
            for (offset, relocation) in section.relocations() {
                let symbol = symbol_target(&relocation, |index| {
                    file.symbol_by_index(index)
                        .ok()
                        .map(|symbol| symbol.name().ok().map(str::to_owned))
                });
                relocations.push(Relocation {
                    offset,
                    kind: relocation_type(relocation.flags()),
                    symbol,
                });
            }
        }
    }

    tracing::info!(
        file = %path.display(),
        triple = %triple,
        sections = sections.len(),
        symbols = symbols.len(),
        relocations = relocations.len(),
        "loaded object file"
    );

    Ok(ObjectModel::from_parts(path.display().to_string(), triple, sections, symbols, relocations))
}

fn convert_section<'data, S: ObjectSection<'data>>(section: &S) -> Section
{
    let data = match section.data() {
        Ok(bytes) => SectionData::from(bytes),
        Err(err) => SectionData::Unreadable(err.to_string()),
    };
    Section {
        id: SectionId(section.index().0),
        name: section.name().ok().map(str::to_owned),
        address: section.address(),
        size: section.size(),
        executable: section.kind() == SectionKind::Text,
        data,
    }
}

fn convert_symbol<'data, S: ObjectSymbol<'data>>(symbol: &S) -> Symbol
{
    let kind = match symbol.kind() {
        object::SymbolKind::Text => SymbolKind::Function,
        // Untyped labels (ELF `STT_NOTYPE`) are still classified
        object::SymbolKind::Unknown
        | object::SymbolKind::Data
        | object::SymbolKind::Section
        | object::SymbolKind::File
        | object::SymbolKind::Label
        | object::SymbolKind::Tls => SymbolKind::Other,
        _ => SymbolKind::Unresolved,
    };
    let section = match symbol.section() {
        SymbolSection::Section(index) => Some(SectionId(index.0)),
        _ => None,
    };
    Symbol {
        name: symbol.name().ok().map(str::to_owned),
        address: Some(symbol.address()),
        value: Some(symbol.address()),
        size: symbol.size(),
        kind,
        section,
    }
}

/// Resolve the symbol a relocation points at.
///
/// `lookup` returns `None` when the index is not in the table and
/// `Some(None)` when the entry exists but its name is unreadable.
fn symbol_target<F>(relocation: &object::Relocation, lookup: F) -> Option<RelocationSymbol>
where
    F: FnOnce(object::SymbolIndex) -> Option<Option<String>>,
{
    let RelocationTarget::Symbol(index) = relocation.target() else {
        return None;
    };
    lookup(index).map(|name| RelocationSymbol { index: index.0, name })
}

fn relocation_type(flags: RelocationFlags) -> u32
{
    match flags {
        RelocationFlags::Elf { r_type } => r_type,
        RelocationFlags::MachO { r_type, .. } => u32::from(r_type),
        RelocationFlags::Coff { typ } => u32::from(typ),
        RelocationFlags::Xcoff { r_rtype, .. } => u32::from(r_rtype),
        _ => 0,
    }
}
