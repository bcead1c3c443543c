//! Line scanning over a flat MAP file buffer.
//!
//! Every function here takes an explicit `end` bound and never looks at
//! `data[end..]`, so the same buffer can be rescanned from any position.

/// Whitespace as classified by the C `isspace` predicate.
#[inline]
pub fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Returns the position of the first non-whitespace byte in `data[start..end]`,
/// or `end` if there is none.
pub fn skip_blank(data: &[u8], start: usize, end: usize) -> usize {
    let end = end.min(data.len());
    let mut pos = start.min(end);
    while pos < end && is_space(data[pos]) {
        pos += 1;
    }
    pos
}

/// Returns the position of the first CR or LF byte in `data[start..end]`,
/// or `end` if there is none.
pub fn find_line_end(data: &[u8], start: usize, end: usize) -> usize {
    let end = end.min(data.len());
    let start = start.min(end);
    match memchr::memchr2(b'\r', b'\n', &data[start..end]) {
        Some(idx) => start + idx,
        None => end,
    }
}

/// Iterator over the non-blank lines of a buffer.
///
/// Leading whitespace of each line is skipped; the line ends before the
/// next CR or LF. Trailing spaces are kept.
#[derive(Debug, Clone)]
pub struct Lines<'data> {
    data: &'data [u8],
    pos: usize,
}

impl<'data> Lines<'data> {
    /// Starts scanning at the beginning of `data`.
    pub fn new(data: &'data [u8]) -> Self {
        Lines { data, pos: 0 }
    }
}

impl<'data> Iterator for Lines<'data> {
    type Item = &'data [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.data.len();
        let start = skip_blank(self.data, self.pos, end);
        if start >= end {
            self.pos = end;
            return None;
        }
        let eol = find_line_end(self.data, start, end);
        self.pos = eol;
        Some(&self.data[start..eol])
    }
}

/// Case-insensitive ASCII prefix test.
#[inline]
pub(crate) fn starts_with_ignore_case(line: &[u8], prefix: &[u8]) -> bool {
    line.len() >= prefix.len() && line[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Strips trailing whitespace.
pub(crate) fn trim_end(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., last] = line {
        if !is_space(*last) {
            break;
        }
        line = rest;
    }
    line
}

/// Parses a hexadecimal number with an optional `0x` prefix.
///
/// At most 16 digits are accepted; anything else yields `None`.
pub(crate) fn parse_hex(field: &[u8]) -> Option<u64> {
    let digits = match field {
        [b'0', b'x', rest @ ..] | [b'0', b'X', rest @ ..] => rest,
        _ => field,
    };
    if digits.is_empty() || digits.len() > 16 {
        return None;
    }
    digits.iter().try_fold(0u64, |value, &b| {
        let digit = (b as char).to_digit(16)?;
        Some((value << 4) | u64::from(digit))
    })
}

/// A forward-only cursor implementing the handful of `scanf` conversions
/// the Watcom and GNU listings are matched against.
#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    /// Skips any run of whitespace, including none.
    pub(crate) fn skip_space(&mut self) {
        self.pos = skip_blank(self.data, self.pos, self.data.len());
    }

    /// Consumes `lit` if the remaining input starts with it.
    pub(crate) fn eat(&mut self, lit: &[u8]) -> bool {
        if self.data[self.pos..].starts_with(lit) {
            self.pos += lit.len();
            true
        } else {
            false
        }
    }

    /// Reads between 1 and `max_digits` hex digits after optional whitespace.
    pub(crate) fn hex(&mut self, max_digits: usize) -> Option<u64> {
        self.skip_space();
        let mut value = 0u64;
        let mut digits = 0;
        while digits < max_digits {
            let digit = match self.data.get(self.pos) {
                Some(&b) => match (b as char).to_digit(16) {
                    Some(d) => d,
                    None => break,
                },
                None => break,
            };
            value = (value << 4) | u64::from(digit);
            self.pos += 1;
            digits += 1;
        }
        if digits == 0 {
            None
        } else {
            Some(value)
        }
    }

    /// Returns the next byte without consuming it.
    pub(crate) fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Consumes exactly one byte, whatever it is.
    pub(crate) fn any(&mut self) -> Option<u8> {
        let b = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    /// Consumes at least one byte up to (not including) any byte in `stop`.
    pub(crate) fn take_until(&mut self, stop: &[u8]) -> Option<&'a [u8]> {
        let rest = &self.data[self.pos..];
        let len = rest.iter().position(|b| stop.contains(b)).unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }
}
