use core::convert::TryFrom;
use core::{fmt, str};

use super::consts::{INVALID_OFFSET, INVALID_SEGMENT, MAX_LIBRARY_LEN, MAX_NAME_LEN};

/// A string stored inline in a fixed buffer of `N` bytes.
///
/// Input longer than `N` bytes is truncated at the last whole character that
/// fits. Invalid UTF-8 in the input is replaced with U+FFFD, so the contents
/// are always a valid `str` of at most `N` bytes.
#[derive(Clone, Copy)]
pub struct BoundedName<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> BoundedName<N> {
    /// The maximum number of bytes this name can hold.
    pub const CAPACITY: usize = N;

    /// Creates an empty name.
    pub const fn new() -> Self {
        BoundedName {
            bytes: [0; N],
            len: 0,
        }
    }

    /// Creates a name from raw line bytes, truncating to `N` bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut name = Self::new();
        name.push_bytes(data);
        name
    }

    /// Appends raw bytes until the buffer is full.
    ///
    /// Returns false if anything had to be dropped.
    pub fn push_bytes(&mut self, mut data: &[u8]) -> bool {
        while !data.is_empty() {
            match str::from_utf8(data) {
                Ok(valid) => return self.push_str(valid),
                Err(error) => {
                    let (valid, rest) = data.split_at(error.valid_up_to());
                    let valid = str::from_utf8(valid).unwrap_or_default();
                    if !self.push_str(valid) || !self.push_str("\u{FFFD}") {
                        return false;
                    }
                    let skip = error.error_len().unwrap_or(rest.len());
                    data = &rest[skip..];
                }
            }
        }
        true
    }

    /// Appends `s` until the buffer is full, never splitting a character.
    ///
    /// Returns false if anything had to be dropped.
    pub fn push_str(&mut self, s: &str) -> bool {
        let room = N - self.len;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.bytes[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        take == s.len()
    }

    /// Empties the name.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        // Only whole characters of valid UTF-8 are ever copied in.
        str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }

    /// Returns the stored bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Returns the length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the name is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Default for BoundedName<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PartialEq for BoundedName<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> Eq for BoundedName<N> {}

impl<const N: usize> PartialEq<str> for BoundedName<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<const N: usize> PartialEq<&str> for BoundedName<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<const N: usize> fmt::Debug for BoundedName<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for BoundedName<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A symbol or comment name, at most [`MAX_NAME_LEN`] bytes.
pub type SymbolName = BoundedName<MAX_NAME_LEN>;
/// A library/object origin, at most [`MAX_LIBRARY_LEN`] bytes.
pub type LibraryName = BoundedName<MAX_LIBRARY_LEN>;

/// The classification of one line inside a symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseOutcome {
    /// A valid symbol; every field of the record is set.
    Symbol,
    /// A comment; the record name holds its text.
    Comment,
    /// The "Static symbols" marker. Later symbols are file-local.
    SectionEnd,
    /// The line cannot belong to the table, which has therefore ended.
    Finishing,
    /// The line has the shape of a symbol but fails validation.
    Invalid,
    /// Known boilerplate.
    Skip,
}

/// One parsed entry of a MAP file symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRecord {
    /// Zero-based segment index.
    pub segment: usize,
    /// Offset within the segment, or [`INVALID_OFFSET`].
    pub offset: u64,
    /// Symbol name, or the text of a comment.
    pub name: SymbolName,
    /// Originating "lib:object", empty if the listing gives none.
    pub library: LibraryName,
    /// Dialect-specific type tag (`b'f'` marks a function), 0 if absent.
    pub type_tag: u8,
}

impl SymbolRecord {
    /// Returns a record with no fields resolved.
    pub const fn new() -> Self {
        SymbolRecord {
            segment: INVALID_SEGMENT,
            offset: INVALID_OFFSET,
            name: SymbolName::new(),
            library: LibraryName::new(),
            type_tag: 0,
        }
    }

    /// Resets every field to its unresolved value.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Returns the symbol name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the library/object origin.
    #[inline]
    pub fn library(&self) -> &str {
        self.library.as_str()
    }

    /// Returns the type tag, if the listing gave one.
    #[inline]
    pub fn type_tag(&self) -> Option<char> {
        if self.type_tag == 0 {
            None
        } else {
            Some(self.type_tag as char)
        }
    }

    /// Returns true if the listing marks this symbol as a function.
    #[inline]
    pub fn is_function(&self) -> bool {
        self.type_tag == b'f'
    }

    /// Returns true if the offset has been resolved.
    #[inline]
    pub fn has_offset(&self) -> bool {
        self.offset != INVALID_OFFSET
    }
}

impl Default for SymbolRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a one-based segment number to a zero-based index.
///
/// Segment 0 does not exist in the one-based numbering and yields `None`.
#[inline]
pub(crate) fn zero_based_segment(segment: u64) -> Option<usize> {
    usize::try_from(segment.checked_sub(1)?).ok()
}

/// The bound check shared by every dialect.
pub(crate) fn validate(sym: &SymbolRecord, num_segments: usize) -> ParseOutcome {
    if sym.segment >= num_segments || sym.offset == INVALID_OFFSET || sym.name.is_empty() {
        ParseOutcome::Invalid
    } else {
        ParseOutcome::Symbol
    }
}
