// Literal strings that identify MAP file sections and special lines.
// Reference: output of MS link, Borland tlink/ilink, Watcom wlink and GNU ld.

/// Maximum number of bytes kept for a symbol name or comment.
pub const MAX_NAME_LEN: usize = 511;
/// Maximum number of bytes kept for a library/object origin string.
pub const MAX_LIBRARY_LEN: usize = 260;
/// Shortest line that can hold a symbol entry ("xxxx:xxxxxxxx ").
pub const MIN_LINE_LEN: usize = 14;
/// Offset value meaning "not resolved".
pub const INVALID_OFFSET: u64 = u64::MAX;
/// Segment value meaning "not resolved".
pub const INVALID_SEGMENT: usize = usize::MAX;

// Section headers. The two MS spellings differ only in column alignment.
pub const MSVC_HDR_START: &[u8] =
    b"Address         Publics by Value              Rva+Base     Lib:Object";
pub const MSVC_HDR_START2: &[u8] =
    b"Address         Publics by Value              Rva+Base       Lib:Object";
pub const BCCL_HDR_NAME_START: &[u8] = b"Address         Publics by Name";
pub const BCCL_HDR_VALUE_START: &[u8] = b"Address         Publics by Value";
pub const WATCOM_MEMMAP_START: &[u8] = b"Address        Symbol";
pub const GCC_MEMMAP_START: &[u8] = b"Linker script and memory map";

// Section terminators.
pub const MSVC_LINE_NUMBER: &[u8] = b"Line numbers for ";
pub const MSVC_FIXUP: &[u8] = b"FIXUPS: ";
pub const MSVC_EXPORTS: &[u8] = b" Exports";
pub const WATCOM_END_TABLE_HDR: &[u8] = b"+----------------------+";
pub const GCC_MEMMAP_END: &[u8] = b"OUTPUT(";

// MS-style table lines.
pub const MS_ENTRY_POINT: &[u8] = b"entry point at";
pub const MS_STATIC_SYMBOLS: &[u8] = b"Static symbols";

// Watcom table lines.
pub const WATCOM_MEMMAP_SKIP: &[u8] = b"=======        ======";
pub const WATCOM_MEMMAP_COMMENT: &[u8] = b"Module: ";

// GNU ld table lines.
pub const GCC_MEMMAP_SKIP: [&[u8]; 4] = [b".", b" .", b"*", b" *"];
pub const GCC_MEMMAP_LOAD: &[u8] = b"LOAD ";
pub const GCC_ASSIGNMENT: &[u8] = b" = ";
pub const GCC_PROVIDE: [&[u8]; 2] = [b"PROVIDE (", b"PROVIDE_HIDDEN ("];

/// Leading character of a comment line in Watcom and GNU listings.
pub const COMMENT_CHAR: u8 = b';';
