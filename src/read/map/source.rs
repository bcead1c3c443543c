//! Grouping symbols by the C or C++ source file they were compiled from.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::DefaultHashBuilder;
use indexmap::IndexMap;

use super::gcc::AddressResolver;
use super::symbol::{ParseOutcome, SymbolRecord};
use super::{check_text, MapReader};
use crate::read::Result;

/// Derives a source file name from a symbol's library/object origin.
///
/// The first `.cpp` (or failing that `.c`) extension is located and the name
/// in front of it is taken, stopping at a `.`, a space, a `:` or a path
/// separator. Returns `None` if there is no such extension or no name
/// before it.
///
/// ```
/// use mapfile::source_file_name;
///
/// assert_eq!(source_file_name("game:player.cpp.obj").as_deref(), Some("player.cpp"));
/// assert_eq!(source_file_name("src/util.c.o").as_deref(), Some("util.c"));
/// assert_eq!(source_file_name("libcmt:crt0.obj"), None);
/// ```
pub fn source_file_name(origin: &str) -> Option<String> {
    let (ext, at) = match origin.find(".cpp") {
        Some(at) => (".cpp", at),
        None => (".c", origin.find(".c")?),
    };
    let stem_start = origin[..at]
        .rfind(|c: char| matches!(c, '.' | ' ' | ':' | '/' | '\\'))
        .map_or(0, |sep| sep + 1);
    let stem = &origin[stem_start..at];
    if stem.is_empty() {
        return None;
    }
    let mut name = String::with_capacity(stem.len() + ext.len());
    name.push_str(stem);
    name.push_str(ext);
    Some(name)
}

/// One symbol of a source group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSymbol {
    /// Zero-based segment index.
    pub segment: usize,
    /// Offset within the segment.
    pub offset: u64,
    /// Symbol name, including any DeDe marker.
    pub name: String,
}

/// Symbols grouped by originating library/object, for origins that name a
/// C or C++ source file. Groups keep the order they were first seen in.
#[derive(Debug, Clone)]
pub struct SourceIndex {
    groups: IndexMap<String, Vec<SourceSymbol>, DefaultHashBuilder>,
}

impl Default for SourceIndex {
    fn default() -> Self {
        SourceIndex {
            groups: IndexMap::with_hasher(DefaultHashBuilder::default()),
        }
    }
}

impl SourceIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        SourceIndex::default()
    }

    /// Collects every valid symbol of a MAP file.
    pub fn from_map<R: AddressResolver>(
        data: &[u8],
        num_segments: usize,
        resolver: R,
    ) -> Result<Self> {
        let data = check_text(data)?;
        let mut index = SourceIndex::new();
        for entry in MapReader::new(data, num_segments, resolver) {
            if entry.outcome == ParseOutcome::Symbol {
                index.insert(&entry.symbol);
            }
        }
        Ok(index)
    }

    /// Adds a symbol if its origin mentions a `.c` file.
    ///
    /// Returns false if the symbol was ignored.
    pub fn insert(&mut self, sym: &SymbolRecord) -> bool {
        let origin = sym.library();
        if !origin.contains(".c") {
            return false;
        }
        let symbol = SourceSymbol {
            segment: sym.segment,
            offset: sym.offset,
            name: String::from(sym.name()),
        };
        match self.groups.get_mut(origin) {
            Some(group) => group.push(symbol),
            None => {
                self.groups.insert(String::from(origin), vec![symbol]);
            }
        }
        true
    }

    /// Returns the number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if no symbol has been grouped.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the symbols of one origin.
    pub fn get(&self, origin: &str) -> Option<&[SourceSymbol]> {
        self.groups.get(origin).map(Vec::as_slice)
    }

    /// Iterates over `(origin, symbols)` groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SourceSymbol])> {
        self.groups
            .iter()
            .map(|(origin, symbols)| (origin.as_str(), symbols.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::map::symbol::{LibraryName, SymbolName};

    fn symbol(offset: u64, name: &str, origin: &str) -> SymbolRecord {
        let mut sym = SymbolRecord::new();
        sym.segment = 0;
        sym.offset = offset;
        sym.name = SymbolName::from_bytes(name.as_bytes());
        sym.library = LibraryName::from_bytes(origin.as_bytes());
        sym
    }

    #[test]
    fn file_names() {
        assert_eq!(source_file_name("a b.cpp").as_deref(), Some("b.cpp"));
        assert_eq!(source_file_name("obj\\x.c").as_deref(), Some("x.c"));
        assert_eq!(source_file_name("plain.cc.obj").as_deref(), Some("plain.c"));
        assert_eq!(source_file_name(".cpp"), None);
        assert_eq!(source_file_name("lib:.c"), None);
    }

    #[test]
    fn groups_in_first_seen_order() {
        let mut index = SourceIndex::new();
        assert!(index.insert(&symbol(0x20, "draw", "game:render.cpp.obj")));
        assert!(index.insert(&symbol(0x10, "init", "game:main.c.obj")));
        assert!(!index.insert(&symbol(0x30, "_memcpy", "libcmt:memcpy.obj")));
        assert!(index.insert(&symbol(0x40, "blit", "game:render.cpp.obj")));

        let groups: Vec<_> = index.iter().map(|(origin, syms)| (origin, syms.len())).collect();
        assert_eq!(
            groups,
            vec![("game:render.cpp.obj", 2), ("game:main.c.obj", 1)]
        );
        let render = index.get("game:render.cpp.obj").unwrap();
        assert_eq!(render[1].name, "blit");
        assert_eq!(render[1].offset, 0x40);
    }
}
