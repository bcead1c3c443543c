//! Symbol lines of Microsoft and Borland listings.
//!
//! A table line is a run of whitespace separated fields:
//!
//! ```text
//!  0001:00001000       _main                      00401000 f   main.obj
//!  ^seg:offset         ^name                      ^rva+base ^type ^lib:object
//! ```
//!
//! The type column is optional and the lib:object column may be missing in
//! Borland tables. Whatever field comes last is taken as the origin, and the
//! fourth field, if any, supplies the type tag.

use super::consts::{MAX_NAME_LEN, MIN_LINE_LEN, MS_ENTRY_POINT, MS_STATIC_SYMBOLS};
use super::scan::{is_space, parse_hex, starts_with_ignore_case};
use super::symbol::{validate, zero_based_segment, LibraryName, ParseOutcome, SymbolName, SymbolRecord};

/// Parses one line of an MSVC or Borland symbol table into `sym`.
///
/// `num_segments` bounds the segment index; the listing counts segments
/// from one.
pub fn parse_ms_line(sym: &mut SymbolRecord, line: &[u8], num_segments: usize) -> ParseOutcome {
    if starts_with_ignore_case(line, MS_ENTRY_POINT) {
        return ParseOutcome::Skip;
    }
    if starts_with_ignore_case(line, MS_STATIC_SYMBOLS) {
        return ParseOutcome::SectionEnd;
    }

    let line = &line[..line.len().min(MAX_NAME_LEN + MIN_LINE_LEN)];
    let mut fields = line.split(|&b| is_space(b)).filter(|field| !field.is_empty());

    // Fewer than three fields is the normal end of the table.
    let (address, name, rva_base) = match (fields.next(), fields.next(), fields.next()) {
        (Some(address), Some(name), Some(rva_base)) => (address, name, rva_base),
        _ => return ParseOutcome::Finishing,
    };

    // The type column is the fourth field when there is one; the origin is
    // always the last field.
    let last = match fields.next() {
        Some(tag) => {
            sym.type_tag = tag[0];
            fields.last().unwrap_or(tag)
        }
        None => {
            sym.type_tag = 0;
            rva_base
        }
    };
    sym.library = LibraryName::from_bytes(last);
    sym.name = SymbolName::from_bytes(name);

    let mut parts = address.splitn(2, |&b| b == b':');
    let segment = parts.next().and_then(parse_hex).and_then(zero_based_segment);
    let offset = parts.next().and_then(parse_hex);
    match (segment, offset) {
        (Some(segment), Some(offset)) => {
            sym.segment = segment;
            sym.offset = offset;
        }
        _ => return ParseOutcome::Invalid,
    }

    validate(sym, num_segments)
}
