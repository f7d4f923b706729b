//! Access to the external dump utility
//!
//! The resolver never reads DWARF sections itself; it asks a [`DumpSource`]
//! for the text objdump renders for each section.

pub mod arch;
pub mod objdump;

use std::fmt;
use std::path::Path;

use crate::error::{ResolveError, Result};

pub use arch::{check_architecture, detect_architecture, SUPPORTED_ARCH};
pub use objdump::{Objdump, RecordedDumps, DEFAULT_OBJDUMP, OBJDUMP_ENV};

/// The three dumps a resolution correlates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DumpKind {
    /// Raw line-number programs (`--dwarf=rawline`)
    RawLine,
    /// Debugging information entries (`--dwarf=info`)
    Info,
    /// Location lists (`--dwarf=loc`)
    Loc,
}

impl DumpKind {
    /// All kinds, in the order a resolution consumes them
    pub const ALL: [DumpKind; 3] = [DumpKind::RawLine, DumpKind::Info, DumpKind::Loc];

    /// objdump option rendering this dump
    pub fn objdump_flag(self) -> &'static str {
        match self {
            DumpKind::RawLine => "--dwarf=rawline",
            DumpKind::Info => "--dwarf=info",
            DumpKind::Loc => "--dwarf=loc",
        }
    }

    /// File name used when dumps are recorded to a directory
    pub fn file_name(self) -> &'static str {
        match self {
            DumpKind::RawLine => "rawline.txt",
            DumpKind::Info => "info.txt",
            DumpKind::Loc => "loc.txt",
        }
    }
}

impl fmt::Display for DumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DumpKind::RawLine => "rawline",
            DumpKind::Info => "info",
            DumpKind::Loc => "loc",
        };
        f.write_str(name)
    }
}

/// Source of the textual DWARF dumps of an object file
pub trait DumpSource {
    /// Render one dump of `object` as text
    fn dump(&self, kind: DumpKind, object: &Path) -> Result<String>;
}

impl<T: DumpSource + ?Sized> DumpSource for Box<T> {
    fn dump(&self, kind: DumpKind, object: &Path) -> Result<String> {
        (**self).dump(kind, object)
    }
}

/// Reject dumps with nothing in them; an empty dump can't be told apart from a
/// tool that silently failed
pub(crate) fn non_empty(kind: DumpKind, text: String) -> Result<String> {
    if text.trim().is_empty() {
        Err(ResolveError::dump(kind, "empty output"))
    } else {
        Ok(text)
    }
}
