//! # `mapfile`
//!
//! The `mapfile` crate reads the symbol tables that linkers write into
//! MAP files.
//!
//! Four families of listings are understood:
//! - Microsoft `link` ("Publics by Value ... Lib:Object"),
//! - Borland/Embarcadero `tlink`/`ilink` ("Publics by Name" and "Publics by Value"),
//! - Watcom `wlink` ("Address Symbol" memory map),
//! - GNU `ld` ("Linker script and memory map").
//!
//! The core is a set of line-level parsers in [`read::map`]. Each line of a
//! symbol table resolves to exactly one [`ParseOutcome`], so a malformed line
//! never stops the scan of the lines after it. [`MapReader`] threads the
//! current [`MapSection`] between lines and yields one [`MapEntry`] per
//! dispatched line.
//!
//! ## Example
//! ```
//! use mapfile::{MapReader, ParseOutcome, LinearResolver};
//!
//! let text = b"\
//!   Address         Publics by Value              Rva+Base       Lib:Object\r\n\
//!  0001:00000000       _main                      00401000 f   main.obj\r\n";
//! let mut reader = MapReader::new(text, 1, LinearResolver);
//! let entry = reader.next().unwrap();
//! assert_eq!(entry.outcome, ParseOutcome::Symbol);
//! assert_eq!(entry.symbol.name(), "_main");
//! ```

#![deny(missing_debug_implementations)]
#![no_std]

#[cfg(feature = "cargo-all")]
compile_error!("'--all-features' is not supported; use '--features std' instead");

#[allow(unused_imports)]
#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
#[allow(unused_imports)]
#[macro_use]
extern crate std;

pub mod read;
pub use read::*;
