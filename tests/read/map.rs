use mapfile::{
    apply_map, FunctionFlags, LibraryPrefixes, LinearResolver, LoadOptions, MapReader, MapSection,
    ParseOutcome, SegmentTable, SourceIndex, SymbolSink,
};

#[derive(Default)]
struct Database {
    names: Vec<(usize, u64, String)>,
    comments: Vec<(usize, u64, String)>,
    functions: Vec<(usize, u64, FunctionFlags)>,
}

impl SymbolSink for Database {
    fn has_user_name(&self, segment: usize, offset: u64) -> bool {
        self.names
            .iter()
            .any(|(s, o, _)| (*s, *o) == (segment, offset))
    }

    fn has_comment(&self, segment: usize, offset: u64) -> bool {
        self.comments
            .iter()
            .any(|(s, o, _)| (*s, *o) == (segment, offset))
    }

    fn set_name(&mut self, segment: usize, offset: u64, name: &str) -> bool {
        self.names.push((segment, offset, name.to_string()));
        true
    }

    fn set_comment(&mut self, segment: usize, offset: u64, comment: &str) -> bool {
        self.comments.push((segment, offset, comment.to_string()));
        true
    }

    fn mark_function(&mut self, segment: usize, offset: u64, flags: FunctionFlags) {
        self.functions.push((segment, offset, flags));
    }
}

fn symbols(data: &[u8], num_segments: usize) -> Vec<(usize, u64, String)> {
    MapReader::new(data, num_segments, LinearResolver)
        .filter(|entry| entry.outcome == ParseOutcome::Symbol)
        .map(|entry| {
            (
                entry.symbol.segment,
                entry.symbol.offset,
                entry.symbol.name().to_string(),
            )
        })
        .collect()
}

#[test]
fn msvc_publics() {
    let data = include_bytes!("../../testfiles/map/msvc.map");
    let mut reader = MapReader::new(&data[..], 3, LinearResolver);
    let entries: Vec<_> = (&mut reader).collect();
    assert!(entries.iter().all(|e| e.section == MapSection::Msvc));

    let stats = reader.stats();
    assert_eq!(stats.sections, 1);
    assert_eq!(stats.symbols, 7);
    assert_eq!(stats.invalid, 1);
    assert_eq!(stats.skipped, 2);

    let update = entries
        .iter()
        .find(|e| e.symbol.name() == "?Update@Player@@QAEXM@Z")
        .expect("member function");
    assert_eq!((update.symbol.segment, update.symbol.offset), (0, 0x40));
    assert!(update.symbol.is_function());
    assert_eq!(update.symbol.library(), "player.obj");

    let helper = entries
        .iter()
        .find(|e| e.symbol.name() == "_helper")
        .expect("static function");
    assert!(helper.is_static);

    // The table is closed by the FIXUPS footer.
    assert!(symbols(data, 3).iter().all(|(_, _, name)| name != "_after_fixups"));
}

#[test]
fn msvc_apply_flags_library_functions() {
    let data = include_bytes!("../../testfiles/map/msvc.map");
    let mut db = Database::default();
    let summary = apply_map(
        data,
        3,
        LinearResolver,
        &LoadOptions::default(),
        &LibraryPrefixes::xbox(),
        &mut db,
    )
    .expect("apply");
    assert_eq!(summary.sections, 1);
    assert_eq!(summary.applied, 7);
    assert_eq!(summary.invalid, 1);

    let flags_of = |offset: u64| {
        db.functions
            .iter()
            .find(|(s, o, _)| (*s, *o) == (0, offset))
            .map(|(_, _, flags)| *flags)
    };
    assert_eq!(flags_of(0x0), Some(FunctionFlags::default()));
    assert_eq!(
        flags_of(0xa0),
        Some(FunctionFlags {
            library: true,
            static_def: false
        })
    );
    assert_eq!(
        flags_of(0x100),
        Some(FunctionFlags {
            library: true,
            static_def: false
        })
    );
    assert_eq!(
        flags_of(0x80),
        Some(FunctionFlags {
            library: false,
            static_def: true
        })
    );
    assert_eq!(db.functions.len(), 5);
}

#[test]
fn borland_dede_markers() {
    let data = include_bytes!("../../testfiles/map/borland.map");
    let outcomes: Vec<_> = MapReader::new(&data[..], 2, LinearResolver)
        .map(|e| (e.section, e.outcome))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            (MapSection::BorlandByValue, ParseOutcome::Symbol),
            (MapSection::BorlandByValue, ParseOutcome::Symbol),
            (MapSection::BorlandByValue, ParseOutcome::Symbol),
            (MapSection::BorlandByValue, ParseOutcome::Symbol),
            // A two-column line ends the table.
            (MapSection::BorlandByValue, ParseOutcome::Finishing),
        ]
    );

    let mut db = Database::default();
    let summary = apply_map(
        data,
        2,
        LinearResolver,
        &LoadOptions::default(),
        &LibraryPrefixes::new(),
        &mut db,
    )
    .expect("apply");
    assert_eq!(summary.applied, 3);
    assert_eq!(
        db.names,
        vec![
            (0, 0xa4c, "TForm1.FormCreate".to_string()),
            (1, 0x10, "Form1".to_string()),
        ]
    );
    // The control comment lands where the method comment already is.
    assert_eq!(
        db.comments,
        vec![(0, 0xb10, "TForm1.Button1Click".to_string())]
    );
}

#[test]
fn watcom_memory_map() {
    let data = include_bytes!("../../testfiles/map/watcom.map");
    let mut reader = MapReader::new(&data[..], 2, LinearResolver);
    let entries: Vec<_> = (&mut reader).collect();
    let stats = reader.stats();
    assert_eq!(stats.sections, 1);
    assert_eq!(stats.symbols, 4);
    assert_eq!(stats.comments, 3);
    assert_eq!(stats.invalid, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(reader.section(), MapSection::None);

    let comments: Vec<_> = entries
        .iter()
        .filter(|e| e.outcome == ParseOutcome::Comment)
        .map(|e| e.symbol.name().to_string())
        .collect();
    assert_eq!(comments[0], "main.obj(C:\\src\\main.c)");
    assert_eq!(comments[2], " patched by hand");

    assert_eq!(
        symbols(data, 2),
        vec![
            (0, 0x10, "main_".to_string()),
            (0, 0x50, "unused_helper_".to_string()),
            (1, 0x0, "_player_count".to_string()),
            (0, 0x200, "_cstart_".to_string()),
        ]
    );
}

#[test]
fn gcc_memory_map() {
    let data = include_bytes!("../../testfiles/map/gcc.map");
    let segments: SegmentTable = vec![(0x0800_0000, 0x1_0000), (0x2000_0000, 0x5000)]
        .into_iter()
        .collect();
    let mut reader = MapReader::new(&data[..], segments.len(), &segments);
    let symbols: Vec<_> = (&mut reader)
        .filter(|e| e.outcome == ParseOutcome::Symbol)
        .map(|e| (e.symbol.segment, e.symbol.offset, e.symbol.name().to_string()))
        .collect();
    assert_eq!(
        symbols,
        vec![
            (0, 0x0, "g_pfnVectors".to_string()),
            (0, 0x10c, "main".to_string()),
            (0, 0x140, "SystemInit".to_string()),
            (0, 0x16c, "memcpy".to_string()),
            (1, 0x0, "_sdata".to_string()),
            (1, 0x4, "g_counter".to_string()),
        ]
    );
    let stats = reader.stats();
    assert_eq!(stats.comments, 3);
    // _estack sits one past the end of RAM, orphan_symbol outside every segment.
    assert_eq!(stats.invalid, 2);
    assert_eq!(stats.skipped, 9);
}

#[test]
fn source_groups() {
    let data = b"\
 Address         Publics by Value              Rva+Base       Lib:Object
 0001:00000000       _main                      00401000 f   game:main.c.obj
 0001:00000040       _draw                      00401040 f   game:render.cpp.obj
 0001:00000080       _memcpy                    00401080 f   libcmt:memcpy.obj
 0001:000000c0       _blit                      004010c0 f   game:render.cpp.obj
";
    let index = SourceIndex::from_map(data, 1, LinearResolver).expect("index");
    let groups: Vec<_> = index
        .iter()
        .map(|(origin, syms)| {
            (
                mapfile::source_file_name(origin).expect("source name"),
                syms.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            )
        })
        .collect();
    assert_eq!(
        groups,
        vec![
            ("main.c".to_string(), vec!["_main"]),
            ("render.cpp".to_string(), vec!["_draw", "_blit"]),
        ]
    );
}

#[test]
fn rejects_binary_input() {
    let mut db = Database::default();
    let err = apply_map(
        b"\x7fELF\x02\x01\x01\0\0\0",
        1,
        LinearResolver,
        &LoadOptions::default(),
        &LibraryPrefixes::new(),
        &mut db,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "MAP file looks binary or UTF-16");
}
