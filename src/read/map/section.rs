use core::fmt;

use super::consts::*;
use super::scan::trim_end;

/// The kind of symbol table a line belongs to.
///
/// Owned by the driver and passed into the classifier by value; no parser
/// keeps a copy between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapSection {
    /// Outside of any recognized table.
    None,
    /// Microsoft "Publics by Value ... Lib:Object".
    Msvc,
    /// Borland "Publics by Name".
    BorlandByName,
    /// Borland "Publics by Value".
    BorlandByValue,
    /// Watcom "Address Symbol" memory map.
    Watcom,
    /// GNU ld "Linker script and memory map".
    Gcc,
}

impl MapSection {
    /// Returns true for every variant except `None`.
    #[inline]
    pub fn is_open(self) -> bool {
        self != MapSection::None
    }

    /// Returns the dialect used to parse lines of this section.
    pub fn dialect(self) -> Option<Dialect> {
        match self {
            MapSection::None => None,
            MapSection::Msvc | MapSection::BorlandByName | MapSection::BorlandByValue => {
                Some(Dialect::Ms)
            }
            MapSection::Watcom => Some(Dialect::Watcom),
            MapSection::Gcc => Some(Dialect::Gcc),
        }
    }
}

impl Default for MapSection {
    fn default() -> Self {
        MapSection::None
    }
}

impl fmt::Display for MapSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MapSection::None => "none",
            MapSection::Msvc => "MSVC publics",
            MapSection::BorlandByName => "Borland publics by name",
            MapSection::BorlandByValue => "Borland publics by value",
            MapSection::Watcom => "Watcom memory map",
            MapSection::Gcc => "GNU ld memory map",
        })
    }
}

/// The line grammar shared by one or more sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `seg:offset name rva+base [type] lib:object`
    Ms,
    /// `seg:offset[marker] name`
    Watcom,
    /// `0xaddress name`
    Gcc,
}

const SECTION_HEADERS: [(&[u8], MapSection); 6] = [
    (MSVC_HDR_START, MapSection::Msvc),
    (MSVC_HDR_START2, MapSection::Msvc),
    (BCCL_HDR_NAME_START, MapSection::BorlandByName),
    (BCCL_HDR_VALUE_START, MapSection::BorlandByValue),
    (WATCOM_MEMMAP_START, MapSection::Watcom),
    (GCC_MEMMAP_START, MapSection::Gcc),
];

/// Checks whether `line` is the header of a symbol table.
///
/// The comparison is case-insensitive and covers the whole line, apart from
/// trailing whitespace. Returns `MapSection::None` if nothing matches.
pub fn recognize_section_start(line: &[u8]) -> MapSection {
    let line = trim_end(line);
    SECTION_HEADERS
        .iter()
        .find(|(header, _)| line.eq_ignore_ascii_case(header))
        .map(|&(_, section)| section)
        .unwrap_or(MapSection::None)
}

/// Checks whether `line` closes the `current` section.
///
/// Returns `MapSection::None` when it does and `current` otherwise. Borland
/// tables have no footer; they are closed when a line fails to parse.
pub fn recognize_section_end(current: MapSection, line: &[u8]) -> MapSection {
    let closes = match current {
        MapSection::Msvc => {
            line.starts_with(MSVC_LINE_NUMBER)
                || line.starts_with(MSVC_FIXUP)
                || line.starts_with(MSVC_EXPORTS)
        }
        MapSection::BorlandByName | MapSection::BorlandByValue => false,
        MapSection::Watcom => line.starts_with(WATCOM_END_TABLE_HDR),
        MapSection::Gcc => line.starts_with(GCC_MEMMAP_END),
        MapSection::None => false,
    };
    if closes {
        MapSection::None
    } else {
        current
    }
}
