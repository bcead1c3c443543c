//! Name markers written by the DeDe Delphi decompiler.
//!
//! DeDe emits MS-style MAP files where a short prefix on the symbol name
//! says how the entry should be used. The prefix is not part of the name.

use super::apply::ApplyTarget;

/// Known DeDe name prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameMarker {
    /// `<-`: a function entry point.
    Function,
    /// `*`: a VCL control.
    Control,
    /// `->`: a VCL method.
    Method,
    /// No marker.
    None,
}

impl NameMarker {
    /// Returns the target this marker forces, if any.
    ///
    /// Functions always become names; controls and methods always become
    /// comments.
    pub fn forced_target(self) -> Option<ApplyTarget> {
        match self {
            NameMarker::Function => Some(ApplyTarget::Name),
            NameMarker::Control | NameMarker::Method => Some(ApplyTarget::Comment),
            NameMarker::None => None,
        }
    }
}

/// Classifies `name` and returns it without its marker.
pub fn split_marker(name: &str) -> (NameMarker, &str) {
    if let Some(rest) = name.strip_prefix("<-") {
        (NameMarker::Function, rest)
    } else if let Some(rest) = name.strip_prefix('*') {
        (NameMarker::Control, rest)
    } else if let Some(rest) = name.strip_prefix("->") {
        (NameMarker::Method, rest)
    } else {
        (NameMarker::None, name)
    }
}
