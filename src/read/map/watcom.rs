//! Symbol lines of Watcom `wlink` memory maps.

use super::consts::{
    COMMENT_CHAR, MAX_NAME_LEN, MIN_LINE_LEN, WATCOM_MEMMAP_COMMENT, WATCOM_MEMMAP_SKIP,
};
use super::scan::{starts_with_ignore_case, trim_end, Cursor};
use super::symbol::{validate, zero_based_segment, ParseOutcome, SymbolName, SymbolRecord};

/// Bytes that end a symbol name.
const NAME_STOP: &[u8] = b"\t\n;";

/// Parses one line of a Watcom memory map into `sym`.
///
/// Accepted shapes:
/// - `;text` and `Module: name` are comments,
/// - the `=======        ======` rule under the header is skipped,
/// - `ssss:oooooooo<c> name` is a symbol, where `<c>` is a single marker
///   byte (`*`, `+` or a space).
///
/// Anything else ends the table.
pub fn parse_watcom_line(
    sym: &mut SymbolRecord,
    line: &[u8],
    num_segments: usize,
) -> ParseOutcome {
    let line = &line[..line.len().min(MAX_NAME_LEN + MIN_LINE_LEN)];

    if line.first() == Some(&COMMENT_CHAR) {
        sym.name = SymbolName::from_bytes(&line[1..]);
        return ParseOutcome::Comment;
    }
    if starts_with_ignore_case(line, WATCOM_MEMMAP_SKIP) {
        return ParseOutcome::Skip;
    }
    if starts_with_ignore_case(line, WATCOM_MEMMAP_COMMENT) {
        sym.name = SymbolName::from_bytes(&line[WATCOM_MEMMAP_COMMENT.len()..]);
        return ParseOutcome::Comment;
    }

    let (segment, offset, name) = match scan_symbol(line) {
        Some(fields) => fields,
        None => return ParseOutcome::Finishing,
    };
    sym.name = SymbolName::from_bytes(trim_end(name));
    sym.segment = match zero_based_segment(segment) {
        Some(segment) => segment,
        None => return ParseOutcome::Invalid,
    };
    sym.offset = offset;

    validate(sym, num_segments)
}

fn scan_symbol(line: &[u8]) -> Option<(u64, u64, &[u8])> {
    let mut cursor = Cursor::new(line);
    let segment = cursor.hex(4)?;
    cursor.skip_space();
    if !cursor.eat(b":") {
        return None;
    }
    let offset = cursor.hex(8)?;
    cursor.any()?;
    cursor.skip_space();
    let name = cursor.take_until(NAME_STOP)?;
    Some((segment, offset, name))
}
