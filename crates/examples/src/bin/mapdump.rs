use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use mapfile::{
    apply_map, source_file_name, AddressResolver, ApplyTarget, FunctionFlags, LibraryPrefixes,
    LinearResolver, LoadOptions, MapReader, MapSection, ParseOutcome, SegmentTable, SourceIndex, SymbolSink,
};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

/// Print the symbols of a linker MAP file.
#[derive(Parser, Debug)]
struct Args {
    /// MAP file to read.
    file: PathBuf,
    /// Number of segments in the image. Defaults to the number of
    /// `--segment` ranges, or 16 if none are given.
    #[arg(long)]
    segments: Option<usize>,
    /// Segment layout for GNU ld maps, as hex `START:SIZE`. Repeatable.
    #[arg(long = "segment", value_parser = parse_segment)]
    ranges: Vec<(u64, u64)>,
    /// Apply symbols as comments instead of names.
    #[arg(long)]
    comments: bool,
    /// Replace names and comments applied earlier in the same run.
    #[arg(long)]
    replace: bool,
    /// Group symbols by C/C++ source file.
    #[arg(long)]
    sources: bool,
    /// Library list to flag as library code, one name per line. Defaults to
    /// the Xbox SDK libraries.
    #[arg(long = "xbox-libs")]
    xbox_libs: Option<PathBuf>,
    /// Increase verbosity (can be supplied multiple times).
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    verbosity: u8,
}

fn parse_segment(s: &str) -> Result<(u64, u64), String> {
    let (start, size) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:SIZE, got '{}'", s))?;
    let hex = |v: &str| {
        let v = v.trim_start_matches("0x").trim_start_matches("0X");
        u64::from_str_radix(v, 16).map_err(|e| format!("bad hex value '{}': {}", v, e))
    };
    Ok((hex(start)?, hex(size)?))
}

/// An in-memory stand-in for a disassembler database.
#[derive(Default)]
struct Database {
    names: HashMap<(usize, u64), String>,
    comments: HashMap<(usize, u64), String>,
    functions: HashMap<(usize, u64), FunctionFlags>,
}

impl SymbolSink for Database {
    fn has_user_name(&self, segment: usize, offset: u64) -> bool {
        self.names.contains_key(&(segment, offset))
    }

    fn has_comment(&self, segment: usize, offset: u64) -> bool {
        self.comments.contains_key(&(segment, offset))
    }

    fn set_name(&mut self, segment: usize, offset: u64, name: &str) -> bool {
        self.names.insert((segment, offset), name.to_string());
        true
    }

    fn set_comment(&mut self, segment: usize, offset: u64, comment: &str) -> bool {
        self.comments.insert((segment, offset), comment.to_string());
        true
    }

    fn mark_function(&mut self, segment: usize, offset: u64, flags: FunctionFlags) {
        self.functions.insert((segment, offset), flags);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = match args.verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish()
        .try_init()
        .map_err(|e| anyhow!("failed to set tracing subscriber: {}", e))?;

    run(args)
}

fn run(args: Args) -> Result<()> {
    let data = fs::read(&args.file).with_context(|| format!("read {}", args.file.display()))?;
    log::info!("Read {} bytes from {}", data.len(), args.file.display());

    let libraries = match &args.xbox_libs {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read {}", path.display()))?;
            LibraryPrefixes::parse(&text).context("parse library list")?
        }
        None => LibraryPrefixes::xbox(),
    };

    let table: SegmentTable = args.ranges.iter().copied().collect();
    let resolver: &dyn AddressResolver = if table.is_empty() {
        &LinearResolver
    } else {
        &table
    };
    let num_segments = args
        .segments
        .unwrap_or(if table.is_empty() { 16 } else { table.len() });

    let mut index = SourceIndex::new();
    let mut section = MapSection::None;
    for entry in MapReader::new(&data, num_segments, resolver) {
        if entry.section != section {
            section = entry.section;
            println!("# {}", section);
        }
        if entry.outcome != ParseOutcome::Symbol {
            continue;
        }
        let sym = &entry.symbol;
        println!(
            "{:04X}:{:08X} {} {:<40} {}{}",
            sym.segment + 1,
            sym.offset,
            sym.type_tag().unwrap_or(' '),
            sym.name(),
            sym.library(),
            if entry.is_static { " (static)" } else { "" }
        );
        if args.sources {
            index.insert(sym);
        }
    }

    let options = LoadOptions {
        apply_to: if args.comments {
            ApplyTarget::Comment
        } else {
            ApplyTarget::Name
        },
        replace_existing: args.replace,
        verbose: args.verbosity > 0,
    };
    let mut db = Database::default();
    let summary = apply_map(&data, num_segments, resolver, &options, &libraries, &mut db)
        .with_context(|| format!("load {}", args.file.display()))?;
    let library_functions = db.functions.values().filter(|f| f.library).count();

    println!();
    println!("Sections:          {}", summary.sections);
    println!("Symbols applied:   {}", summary.applied);
    println!("Invalid symbols:   {}", summary.invalid);
    println!("Functions:         {}", db.functions.len());
    println!("Library functions: {}", library_functions);

    if args.sources {
        for (origin, symbols) in index.iter() {
            let file = source_file_name(origin).unwrap_or_else(|| origin.to_string());
            println!();
            println!("{} ({})", file, origin);
            for sym in symbols {
                println!("    {:04X}:{:08X} {}", sym.segment + 1, sym.offset, sym.name);
            }
        }
    }

    Ok(())
}
