//! Applying parsed MAP symbols to a host database.

use log::{log, Level};

use super::comment::split_marker;
use super::gcc::AddressResolver;
use super::library::LibraryPrefixes;
use super::symbol::{ParseOutcome, SymbolRecord};
use super::{check_text, MapReader};
use crate::read::{Error, Result};

/// What a parsed symbol name is turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplyTarget {
    /// A name at the symbol address.
    Name,
    /// A comment at the symbol address.
    Comment,
}

impl Default for ApplyTarget {
    fn default() -> Self {
        ApplyTarget::Name
    }
}

/// Options for [`apply_map`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Whether symbols become names or comments.
    pub apply_to: ApplyTarget,
    /// Overwrite names and comments the host already has.
    pub replace_existing: bool,
    /// Log every applied symbol at info level instead of debug.
    pub verbose: bool,
}

/// Function attributes derived from a symbol's origin.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionFlags {
    /// The function comes from a known SDK library.
    pub library: bool,
    /// The function was listed after the "Static symbols" marker.
    pub static_def: bool,
}

impl FunctionFlags {
    /// Returns true if no flag is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.library && !self.static_def
    }
}

/// The host side of [`apply_map`].
///
/// Addresses are given as a zero-based segment index and an offset within
/// that segment.
pub trait SymbolSink {
    /// Returns true if the address already has a name the user chose.
    ///
    /// Auto-generated and dummy names should report false.
    fn has_user_name(&self, segment: usize, offset: u64) -> bool;

    /// Returns true if the address already has a comment.
    fn has_comment(&self, segment: usize, offset: u64) -> bool;

    /// Names the address. Returns false if the host refused.
    fn set_name(&mut self, segment: usize, offset: u64, name: &str) -> bool;

    /// Comments the address. Returns false if the host refused.
    fn set_comment(&mut self, segment: usize, offset: u64, comment: &str) -> bool;

    /// Marks the address as the start of a function.
    ///
    /// Called for every symbol the listing types as a function, whether or
    /// not its name was applied.
    fn mark_function(&mut self, segment: usize, offset: u64, flags: FunctionFlags);
}

impl<'a, T: SymbolSink + ?Sized> SymbolSink for &'a mut T {
    fn has_user_name(&self, segment: usize, offset: u64) -> bool {
        (**self).has_user_name(segment, offset)
    }

    fn has_comment(&self, segment: usize, offset: u64) -> bool {
        (**self).has_comment(segment, offset)
    }

    fn set_name(&mut self, segment: usize, offset: u64, name: &str) -> bool {
        (**self).set_name(segment, offset, name)
    }

    fn set_comment(&mut self, segment: usize, offset: u64, comment: &str) -> bool {
        (**self).set_comment(segment, offset, comment)
    }

    fn mark_function(&mut self, segment: usize, offset: u64, flags: FunctionFlags) {
        (**self).mark_function(segment, offset, flags)
    }
}

/// Totals reported by [`apply_map`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// Symbol tables found in the file.
    pub sections: usize,
    /// Names and comments the sink accepted. Existing ones that were kept
    /// are not counted.
    pub applied: usize,
    /// Lines that failed validation plus names and comments the sink refused.
    pub invalid: usize,
}

/// Parses a MAP file and applies its symbols to `sink`.
///
/// Existing names and comments are kept unless `options.replace_existing`
/// is set. DeDe name markers override `options.apply_to` for their symbol.
/// Function symbols are passed to [`SymbolSink::mark_function`] with
/// [`FunctionFlags::library`] set when their library is in `libraries`.
///
/// Returns an error if the data is not text or holds no symbol table.
pub fn apply_map<R, S>(
    data: &[u8],
    num_segments: usize,
    resolver: R,
    options: &LoadOptions,
    libraries: &LibraryPrefixes,
    sink: &mut S,
) -> Result<LoadSummary>
where
    R: AddressResolver,
    S: SymbolSink + ?Sized,
{
    let data = check_text(data)?;
    let level = if options.verbose {
        Level::Info
    } else {
        Level::Debug
    };

    let mut reader = MapReader::new(data, num_segments, resolver);
    let mut summary = LoadSummary::default();
    for entry in &mut reader {
        match entry.outcome {
            ParseOutcome::Symbol => {}
            ParseOutcome::Comment if entry.symbol.has_offset() => {}
            _ => continue,
        }
        let flags = FunctionFlags {
            library: libraries.contains_library(entry.symbol.library()),
            static_def: entry.is_static,
        };
        match apply_symbol(&entry.symbol, flags, options, level, sink) {
            Some(true) => summary.applied += 1,
            Some(false) => summary.invalid += 1,
            None => {}
        }
    }

    let stats = reader.stats();
    if stats.sections == 0 {
        return Err(Error("No MAP section header found"));
    }
    summary.sections = stats.sections;
    summary.invalid += stats.invalid;
    log::info!(
        "Applied {} symbols, {} invalid, from {} sections",
        summary.applied,
        summary.invalid,
        summary.sections
    );
    Ok(summary)
}

/// Applies one symbol. Returns whether the sink accepted the change, or
/// `None` if the existing name or comment was kept.
fn apply_symbol<S: SymbolSink + ?Sized>(
    sym: &SymbolRecord,
    flags: FunctionFlags,
    options: &LoadOptions,
    level: Level,
    sink: &mut S,
) -> Option<bool> {
    let (marker, name) = split_marker(sym.name());
    let target = marker.forced_target().unwrap_or(options.apply_to);
    let (segment, offset) = (sym.segment, sym.offset);

    match target {
        ApplyTarget::Name => {
            let mut applied = None;
            if options.replace_existing || !sink.has_user_name(segment, offset) {
                let ok = sink.set_name(segment, offset, name);
                applied = Some(ok);
                log!(
                    level,
                    "{:04X}:{:08X} - change name to '{}' {}",
                    segment,
                    offset,
                    name,
                    if ok { "succeeded" } else { "failed" }
                );
            }
            if sym.is_function() {
                sink.mark_function(segment, offset, flags);
            }
            applied
        }
        ApplyTarget::Comment => {
            if !options.replace_existing && sink.has_comment(segment, offset) {
                return None;
            }
            let ok = sink.set_comment(segment, offset, name);
            log!(
                level,
                "{:04X}:{:08X} - change comment to '{}' {}",
                segment,
                offset,
                name,
                if ok { "succeeded" } else { "failed" }
            );
            Some(ok)
        }
    }
}
