//! Symbol lines of GNU ld memory maps, and the address resolution they need.
//!
//! GNU ld prints linear addresses. Turning one into a segment and offset
//! requires the segment layout of the loaded image, which only the host
//! knows; it is supplied through [`AddressResolver`].

use alloc::vec::Vec;

use super::consts::{
    COMMENT_CHAR, GCC_ASSIGNMENT, GCC_MEMMAP_LOAD, GCC_MEMMAP_SKIP, GCC_PROVIDE, INVALID_OFFSET,
    MAX_NAME_LEN, MIN_LINE_LEN,
};
use super::scan::{starts_with_ignore_case, trim_end, Cursor};
use super::symbol::{validate, ParseOutcome, SymbolName, SymbolRecord};

/// Maps a linear address to a zero-based segment index and an offset.
pub trait AddressResolver {
    /// Returns `None` if `address` lies outside every known segment.
    fn resolve(&self, address: u64) -> Option<(usize, u64)>;
}

impl<'a, T: AddressResolver + ?Sized> AddressResolver for &'a T {
    #[inline]
    fn resolve(&self, address: u64) -> Option<(usize, u64)> {
        (**self).resolve(address)
    }
}

/// Places every address in segment 0 at an offset equal to the address.
///
/// Useful when no image is loaded and addresses are wanted as printed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearResolver;

impl AddressResolver for LinearResolver {
    #[inline]
    fn resolve(&self, address: u64) -> Option<(usize, u64)> {
        Some((0, address))
    }
}

/// One segment of a loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRange {
    /// Linear start address.
    pub start: u64,
    /// Size in bytes.
    pub size: u64,
}

impl SegmentRange {
    #[inline]
    fn contains(&self, address: u64) -> bool {
        address >= self.start && address - self.start < self.size
    }
}

/// A segment layout, numbered in ascending address order.
#[derive(Debug, Default, Clone)]
pub struct SegmentTable {
    segments: Vec<SegmentRange>,
}

impl SegmentTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        SegmentTable::default()
    }

    /// Adds a segment. Indices of segments above it shift up by one.
    pub fn push(&mut self, start: u64, size: u64) {
        let range = SegmentRange { start, size };
        let idx = self.segments.partition_point(|s| s.start <= start);
        self.segments.insert(idx, range);
    }

    /// Returns the number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the table has no segments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the segments in index order.
    #[inline]
    pub fn segments(&self) -> &[SegmentRange] {
        &self.segments
    }
}

impl core::iter::FromIterator<(u64, u64)> for SegmentTable {
    fn from_iter<I: IntoIterator<Item = (u64, u64)>>(iter: I) -> Self {
        let mut table = SegmentTable::new();
        for (start, size) in iter {
            table.push(start, size);
        }
        table
    }
}

impl AddressResolver for SegmentTable {
    fn resolve(&self, address: u64) -> Option<(usize, u64)> {
        let idx = self.segments.partition_point(|s| s.start <= address);
        let idx = idx.checked_sub(1)?;
        let segment = &self.segments[idx];
        if segment.contains(address) {
            Some((idx, address - segment.start))
        } else {
            None
        }
    }
}

/// Bytes that end a symbol name.
const NAME_STOP: &[u8] = b"\t\n;";

/// Parses one line of a GNU ld memory map into `sym`.
///
/// Section and input-section lines (starting with `.` or `*`) are skipped,
/// `LOAD file` lines are comments holding the whole line, and
/// `0xaddress name` lines are symbols. Script assignments name the symbol
/// they define. The address is converted through
/// `resolver`; an address outside every segment leaves the offset unresolved
/// and the line is reported as invalid. Anything else ends the table.
pub fn parse_gcc_line<R: AddressResolver + ?Sized>(
    sym: &mut SymbolRecord,
    line: &[u8],
    num_segments: usize,
    resolver: &R,
) -> ParseOutcome {
    let line = &line[..line.len().min(MAX_NAME_LEN + MIN_LINE_LEN)];

    if line.first() == Some(&COMMENT_CHAR) {
        sym.name = SymbolName::from_bytes(&line[1..]);
        return ParseOutcome::Comment;
    }
    if GCC_MEMMAP_SKIP
        .iter()
        .any(|prefix| starts_with_ignore_case(line, prefix))
    {
        return ParseOutcome::Skip;
    }
    if starts_with_ignore_case(line, GCC_MEMMAP_LOAD) {
        sym.name = SymbolName::from_bytes(line);
        return ParseOutcome::Comment;
    }

    let (address, name) = match scan_symbol(line) {
        Some(fields) => fields,
        None => return ParseOutcome::Finishing,
    };
    // "0xaddress 0xsize file.o" rows belong to an input section, not a symbol.
    if name.starts_with(b"0x") {
        return ParseOutcome::Skip;
    }
    let name = assigned_symbol(trim_end(name));
    // ". = ALIGN (4)" moves the location counter and defines nothing.
    if name == b"." {
        return ParseOutcome::Skip;
    }
    sym.name = SymbolName::from_bytes(name);
    match resolver.resolve(address) {
        Some((segment, offset)) => {
            sym.segment = segment;
            sym.offset = offset;
        }
        None => sym.offset = INVALID_OFFSET,
    }

    validate(sym, num_segments)
}

fn scan_symbol(line: &[u8]) -> Option<(u64, &[u8])> {
    let mut cursor = Cursor::new(line);
    cursor.skip_space();
    if !cursor.eat(b"0x") {
        return None;
    }
    let address = cursor.hex(16)?;
    // Wider than 64 bits.
    if cursor.peek().map_or(false, |b| b.is_ascii_hexdigit()) {
        return None;
    }
    cursor.any()?;
    cursor.skip_space();
    let name = cursor.take_until(NAME_STOP)?;
    Some((address, name))
}

/// Reduces a linker script assignment such as `_sdata = .` or
/// `PROVIDE (end = .)` to the symbol it defines. Other names are returned
/// unchanged.
fn assigned_symbol(name: &[u8]) -> &[u8] {
    let target = match name
        .windows(GCC_ASSIGNMENT.len())
        .position(|w| w == GCC_ASSIGNMENT)
    {
        Some(at) => &name[..at],
        None => return name,
    };
    let target = GCC_PROVIDE
        .iter()
        .find_map(|prefix| target.strip_prefix(*prefix))
        .unwrap_or(target);
    trim_end(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SegmentTable {
        vec![(0x0800_0000, 0x1000), (0x2000_0000, 0x400)].into_iter().collect()
    }

    fn parse(line: &[u8]) -> (ParseOutcome, SymbolRecord) {
        let mut sym = SymbolRecord::new();
        let outcome = parse_gcc_line(&mut sym, line, 2, &table());
        (outcome, sym)
    }

    #[test]
    fn resolves_linear_address() {
        let (outcome, sym) = parse(b"0x08000130                Reset_Handler");
        assert_eq!(outcome, ParseOutcome::Symbol);
        assert_eq!(sym.segment, 0);
        assert_eq!(sym.offset, 0x130);
        assert_eq!(sym.name(), "Reset_Handler");

        let (outcome, sym) = parse(b"0x0000000020000010                _sdata");
        assert_eq!(outcome, ParseOutcome::Symbol);
        assert_eq!(sym.segment, 1);
        assert_eq!(sym.offset, 0x10);
    }

    #[test]
    fn unmapped_address_is_invalid() {
        let (outcome, sym) = parse(b"0x10000000                orphan");
        assert_eq!(outcome, ParseOutcome::Invalid);
        assert!(!sym.has_offset());
    }

    #[test]
    fn fill_line_is_skipped() {
        let (outcome, _) = parse(b"*fill*         0x08000100        0x4");
        assert_eq!(outcome, ParseOutcome::Skip);
        let (outcome, _) = parse(b" *(.text*)");
        assert_eq!(outcome, ParseOutcome::Skip);
        let (outcome, _) = parse(b".text          0x08000000      0x2a4");
        assert_eq!(outcome, ParseOutcome::Skip);
    }

    #[test]
    fn input_section_row_is_skipped() {
        let (outcome, _) = parse(b"0x08000000       0xc0 startup.o");
        assert_eq!(outcome, ParseOutcome::Skip);
    }

    #[test]
    fn assignments_define_their_target() {
        let (outcome, sym) = parse(b"0x20000000                _sdata = .");
        assert_eq!(outcome, ParseOutcome::Symbol);
        assert_eq!(sym.name(), "_sdata");

        let (outcome, sym) = parse(b"0x08000200                PROVIDE (__end_text = .)");
        assert_eq!(outcome, ParseOutcome::Symbol);
        assert_eq!(sym.name(), "__end_text");

        let (outcome, _) = parse(b"0x08000200                . = ALIGN (0x4)");
        assert_eq!(outcome, ParseOutcome::Skip);
    }

    #[test]
    fn overlong_address_finishes_table() {
        let (outcome, _) = parse(b"0x00000000008000130        Reset_Handler");
        assert_eq!(outcome, ParseOutcome::Finishing);
        let (outcome, sym) = parse(b"0x0000000008000130        Reset_Handler");
        assert_eq!(outcome, ParseOutcome::Symbol);
        assert_eq!(sym.offset, 0x130);
    }

    #[test]
    fn load_line_keeps_whole_text() {
        let (outcome, sym) = parse(b"LOAD build/main.o");
        assert_eq!(outcome, ParseOutcome::Comment);
        assert_eq!(sym.name(), "LOAD build/main.o");
    }

    #[test]
    fn comment_line() {
        let (outcome, sym) = parse(b";0x08000130 hidden");
        assert_eq!(outcome, ParseOutcome::Comment);
        assert_eq!(sym.name(), "0x08000130 hidden");
    }

    #[test]
    fn other_text_finishes_table() {
        let (outcome, _) = parse(b"Discarded input sections");
        assert_eq!(outcome, ParseOutcome::Finishing);
    }

    #[test]
    fn segment_table_orders_by_address() {
        let mut table = SegmentTable::new();
        table.push(0x3000, 0x100);
        table.push(0x1000, 0x100);
        assert_eq!(table.resolve(0x1010), Some((0, 0x10)));
        assert_eq!(table.resolve(0x3000), Some((1, 0)));
        assert_eq!(table.resolve(0x1100), None);
        assert_eq!(table.resolve(0x0fff), None);
    }
}
