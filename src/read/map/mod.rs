//! Support for reading linker MAP files.
//!
//! Symbol tables written by MS link, Borland tlink/ilink, Watcom wlink and
//! GNU ld are recognized by their header lines. [`MapReader`] walks a whole
//! file and yields each table line with its classification;
//! [`apply_map`] feeds the symbols to a [`SymbolSink`].
//!
//! The line parsers in [`ms`], [`watcom`] and [`gcc`] can also be driven
//! directly.

use alloc::string::String;

use log::{debug, trace, warn};

use crate::read::{Error, Result};

pub mod consts;
pub use consts::*;

pub mod scan;
pub use scan::*;

mod section;
pub use section::*;

mod symbol;
pub use symbol::*;

pub mod ms;
pub use ms::parse_ms_line;

pub mod watcom;
pub use watcom::parse_watcom_line;

pub mod gcc;
pub use gcc::{parse_gcc_line, AddressResolver, LinearResolver, SegmentRange, SegmentTable};

mod comment;
pub use comment::*;

mod library;
pub use library::*;

mod apply;
pub use apply::*;

mod source;
pub use source::*;

/// Checks that `data` looks like a text MAP file.
///
/// Returns `data` unchanged on success. Fails if it is empty or contains a
/// NUL byte, which rules out binaries and UTF-16 text.
pub fn check_text(data: &[u8]) -> Result<&[u8]> {
    if data.is_empty() {
        return Err(Error("MAP file is empty"));
    }
    if memchr::memchr(0, data).is_some() {
        return Err(Error("MAP file looks binary or UTF-16"));
    }
    Ok(data)
}

/// One line dispatched to a symbol table parser.
#[derive(Debug, Clone, Copy)]
pub struct MapEntry<'data> {
    /// The table the line was parsed as part of.
    pub section: MapSection,
    /// How the line was classified.
    pub outcome: ParseOutcome,
    /// The parsed fields. Only meaningful for `Symbol`, and for `Comment`
    /// where `name` holds the text.
    pub symbol: SymbolRecord,
    /// True once a "Static symbols" marker has been seen.
    pub is_static: bool,
    /// The raw line, without leading whitespace or line terminator.
    pub line: &'data [u8],
}

/// Counters kept by [`MapReader`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MapStats {
    /// Symbol table headers recognized.
    pub sections: usize,
    /// Lines parsed as valid symbols.
    pub symbols: usize,
    /// Comment lines.
    pub comments: usize,
    /// Lines with the shape of a symbol that failed validation.
    pub invalid: usize,
    /// Boilerplate lines inside tables, including statics markers.
    pub skipped: usize,
}

/// Walks a MAP file and parses every line inside a symbol table.
///
/// Lines shorter than [`MIN_LINE_LEN`] are ignored. Outside of a table each
/// line is checked for a header; inside one, for the table's footer and
/// otherwise handed to the dialect parser. A `Finishing` line closes the
/// table, after which a later header may open another.
///
/// Once a "Static symbols" marker has been seen, every later entry reports
/// `is_static`, including entries of later tables.
#[derive(Debug)]
pub struct MapReader<'data, R: AddressResolver> {
    lines: Lines<'data>,
    num_segments: usize,
    resolver: R,
    section: MapSection,
    in_statics: bool,
    symbol: SymbolRecord,
    previous: SymbolRecord,
    stats: MapStats,
}

impl<'data, R: AddressResolver> MapReader<'data, R> {
    /// Creates a reader over `data`.
    ///
    /// `num_segments` is the number of segments in the loaded image; symbols
    /// outside it are reported as `Invalid`. `resolver` converts the linear
    /// addresses of GNU ld maps.
    pub fn new(data: &'data [u8], num_segments: usize, resolver: R) -> Self {
        MapReader {
            lines: Lines::new(data),
            num_segments,
            resolver,
            section: MapSection::None,
            in_statics: false,
            symbol: SymbolRecord::new(),
            previous: SymbolRecord::new(),
            stats: MapStats::default(),
        }
    }

    /// The table currently open.
    pub fn section(&self) -> MapSection {
        self.section
    }

    /// Counters for the lines read so far.
    pub fn stats(&self) -> MapStats {
        self.stats
    }

    /// The record of the line dispatched before the last one.
    pub fn previous_symbol(&self) -> &SymbolRecord {
        &self.previous
    }

    fn parse_line(&mut self, line: &[u8]) -> ParseOutcome {
        let sym = &mut self.symbol;
        match self.section.dialect() {
            Some(Dialect::Ms) => parse_ms_line(sym, line, self.num_segments),
            Some(Dialect::Watcom) => parse_watcom_line(sym, line, self.num_segments),
            Some(Dialect::Gcc) => parse_gcc_line(sym, line, self.num_segments, &self.resolver),
            None => ParseOutcome::Skip,
        }
    }
}

impl<'data, R: AddressResolver> Iterator for MapReader<'data, R> {
    type Item = MapEntry<'data>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            if line.len() < MIN_LINE_LEN {
                continue;
            }

            if !self.section.is_open() {
                self.section = recognize_section_start(line);
                if self.section.is_open() {
                    self.stats.sections += 1;
                    debug!("{} starts at line: '{}'", self.section, lossy(line));
                }
                continue;
            }
            let open = self.section;
            self.section = recognize_section_end(open, line);
            if !self.section.is_open() {
                debug!("{} ends at line: '{}'", open, lossy(line));
                continue;
            }

            let section = self.section;
            self.previous = self.symbol;
            self.symbol.reset();
            let outcome = self.parse_line(line);
            match outcome {
                ParseOutcome::Symbol => self.stats.symbols += 1,
                ParseOutcome::Comment => {
                    self.stats.comments += 1;
                    trace!("Comment line: '{}'", lossy(line));
                }
                ParseOutcome::SectionEnd => {
                    self.in_statics = true;
                    self.stats.skipped += 1;
                    trace!("Static symbols follow: '{}'", lossy(line));
                }
                ParseOutcome::Skip => {
                    self.stats.skipped += 1;
                    trace!("Skipping line: '{}'", lossy(line));
                }
                ParseOutcome::Finishing => {
                    self.section = MapSection::None;
                    debug!("Parsing finished at line: '{}'", lossy(line));
                }
                ParseOutcome::Invalid => {
                    self.stats.invalid += 1;
                    warn!("Invalid map line: '{}'", lossy(line));
                }
            }

            return Some(MapEntry {
                section,
                outcome,
                symbol: self.symbol,
                is_static: self.in_statics,
                line,
            });
        }
    }
}

fn lossy(line: &[u8]) -> alloc::borrow::Cow<'_, str> {
    String::from_utf8_lossy(line)
}
