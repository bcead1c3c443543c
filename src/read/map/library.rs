//! Library names whose functions are treated as library code.

use alloc::string::String;

use hashbrown::HashSet;

use crate::read::{ReadError, Result};

/// Libraries shipped with the first Xbox and the Xbox 360 SDKs.
///
/// Stored lowercase, without the `:` that separates library and object in
/// MS listings.
const XBOX_LIBRARIES: &[&str] = &[
    "d3d8-xbox", "d3d8", "d3dx8", "d3dx8d", "d3dx8dt", "d3dxof", "dxguid", "winhttp5",
    "xboxdbg", "xcontent", "xgraphics", "xonservr", "d3d8d", "d3d8i", "d3d8ltcg", "dmusic",
    "dmusicd", "dmusici", "dmusicltcg", "dsound", "dsoundd", "libc", "libcd", "libcmt",
    "libcmtd", "libcp", "libcpd", "libcpmt", "libcpmtd", "oldnames", "uix", "uixd", "uuid",
    "xacteng", "xactengd", "xactengi", "xactengltcg", "xapilib", "xapilibd", "xbdm", "xboxkrnl",
    "xgraphicsd", "xgraphicsltcg", "xkbd", "xkbdd", "xmv", "xmvd", "xnet", "xnetd", "xnetn",
    "xnetnd", "xnets", "xnetsd", "xonline", "xonlined", "xonlinel", "xonlineld", "xonlinels",
    "xonlinelsd", "xonlinen", "xonlinend", "xonlines", "xonlinesd", "xperf", "xsndtrk",
    "xsndtrkd", "xvoice", "xvoiced", "d3d9", "d3d9d", "d3d9i", "d3d9ltcg", "d3d9ltcgi", "d3dx9",
    "d3dx9d", "d3dx9i", "dxerr9", "libpmcpb", "libpmcpbd", "multidisc", "multidiscd", "nuiapi",
    "nuiapid", "nuiaudio", "nuiaudiod", "nuifitnessapi", "nuifitnessapid", "nuihandles",
    "nuihandlesd", "nuispeech", "nuispeechd", "qnetxaudio2", "qnetxaudio2d", "st", "std",
    "stltcg", "tracerecording", "tracerecordingd", "vcomp", "vcompd", "x3daudio", "x3daudiod",
    "x3daudioi", "x3daudioltcg", "xact3", "xact3i", "xact3ltcg", "xacta3", "xactad3", "xactd3",
    "xapilibi", "xapobase", "xapobased", "xapofx", "xapofxd", "xaudio2", "xaudiod2", "xauth",
    "xauthd", "xav", "xavatar2", "xavatar2d", "xavatar2ltcg", "xavd", "xbc", "xbcd", "xcam",
    "xcamd", "xffb", "xffbd", "xgetserviceendpoint", "xgetserviceendpointd", "xhttp", "xhttpd",
    "xhv2", "xhvd2", "xime", "ximed", "xinput2", "xinput2d", "xinputremap", "xinputremapd",
    "xjson", "xjsond", "xmahal", "xmahald", "xmahali", "xmahalltcg", "xmcore", "xmcored",
    "xmcorei", "xmcoreltcg", "xmedia2", "xmediad2", "xmic", "xmicd", "xmp", "xmpd",
    "xnetconfiginfo", "xnetconfiginfod", "xparty", "xpartyd", "xrnm", "xrnmd", "xrnms",
    "xrnmsd", "xsim", "xsimd", "xsocialpost", "xsocialpostd", "xstudio", "xtms", "xtmsd",
    "xuihtml", "xuihtmld", "xuirender", "xuirenderd", "xuirenderltcg", "xuirun", "xuiruna",
    "xuirunad", "xuirund", "xuirunltcg", "xuivideo", "xuivideod", "xwmadecode", "xwmadecoded",
    "retaildump",
];

/// A set of library names, compared case-insensitively.
///
/// A symbol's origin is written `library:object` in MS listings; the library
/// part before the first `:` is what gets looked up.
#[derive(Debug, Default, Clone)]
pub struct LibraryPrefixes {
    names: HashSet<String>,
}

impl LibraryPrefixes {
    /// Creates an empty set.
    pub fn new() -> Self {
        LibraryPrefixes::default()
    }

    /// Returns the built-in Xbox SDK library set.
    pub fn xbox() -> Self {
        let mut set = LibraryPrefixes::new();
        for name in XBOX_LIBRARIES {
            set.insert(name);
        }
        set
    }

    /// Reads a set from text holding one library name per line.
    ///
    /// Blank lines and lines starting with `#` are ignored. A trailing `:` on
    /// a name is accepted and dropped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut set = LibraryPrefixes::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let name = library_name(line).read_error("Invalid library name in library list")?;
            set.insert(name);
        }
        Ok(set)
    }

    /// Adds a library name. Returns false if it was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        self.names.insert(name.to_ascii_lowercase())
    }

    /// Returns true if `name` is in the set.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name.to_ascii_lowercase().as_str())
    }

    /// Returns true if the library part of a `library:object` origin is in
    /// the set. Origins without a `:` never match.
    pub fn contains_library(&self, origin: &str) -> bool {
        match origin.split_once(':') {
            Some((library, _)) => self.contains(library),
            None => false,
        }
    }

    /// Returns the number of names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn library_name(line: &str) -> Option<&str> {
    let name = line.strip_suffix(':').unwrap_or(line);
    if name.is_empty() || name.contains(|c: char| c == ':' || c.is_whitespace()) {
        None
    } else {
        Some(name)
    }
}

impl<'a> Extend<&'a str> for LibraryPrefixes {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name);
        }
    }
}
