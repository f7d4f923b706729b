//! Declaration lookup in `objdump --dwarf=info`
//!
//! objdump prints a DIE's attributes one per line, so an entry is never seen
//! as a record. [`DeclarationCandidate`] accumulates the attributes the
//! lookup cares about and `DW_AT_decl_line` marks the point where an entry is
//! considered complete.
//!
//! GCC emits `DW_AT_location` after `DW_AT_decl_line`. When the dump carries
//! DIE headers (`<2><3e>: Abbrev Number: 3 (DW_TAG_variable)`), a matching
//! entry that has not shown its own location yet is read on to its end so the
//! location reported is the entry's own.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, trace};
use regex::Regex;

use super::file_table::{FileTable, UnitToken};
use super::number::{parse_number, Radix};

/// Offset of a location list in the location-list section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationRef(pub u64);

impl LocationRef {
    /// Parse an offset as printed in a `DW_AT_location` value
    pub fn parse(token: &str) -> Option<Self> {
        parse_number(token, Radix::Decimal).map(Self)
    }

    /// Get the raw byte offset
    pub fn offset(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LocationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// The first entry declared at the requested file and line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationMatch {
    /// Line program the declaration file was resolved in
    pub unit: UnitToken,
    /// Unit-local index of the declaration file
    pub file_index: u64,
    /// Resolved declaration file
    pub path: PathBuf,
    /// Declaration line
    pub line: u64,
    /// Location list in effect when the entry completed, if any
    pub location: Option<LocationRef>,
}

/// Attributes of the entry currently being read
///
/// The stmt-list reference lives for the whole unit. The location reference
/// carries over to later entries until another `DW_AT_location` replaces or
/// clears it. The declaration file and line belong to a single entry and are
/// taken when the entry completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationCandidate {
    stmt_list: Option<UnitToken>,
    location: Option<LocationRef>,
    decl_file: Option<u64>,
    decl_line: Option<u64>,
}

/// A declaration file and line observed for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
struct CompletedEntry {
    stmt_list: UnitToken,
    decl_file: u64,
    decl_line: u64,
    location: Option<LocationRef>,
}

impl DeclarationCandidate {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    fn set_stmt_list(&mut self, value: &str) {
        self.stmt_list = first_token(value).map(UnitToken::parse);
    }

    fn set_location(&mut self, value: &str) {
        self.location = list_location(value);
    }

    fn set_decl_file(&mut self, value: &str) {
        self.decl_file = first_token(value).and_then(|t| parse_number(t, Radix::Decimal));
    }

    /// Record the declaration line and take the completed entry, if whole
    fn complete(&mut self, value: &str) -> Option<CompletedEntry> {
        self.decl_line = first_token(value).and_then(|t| parse_number(t, Radix::Decimal));

        let decl_file = self.decl_file.take();
        let decl_line = self.decl_line.take();
        Some(CompletedEntry {
            stmt_list: self.stmt_list.clone()?,
            decl_file: decl_file?,
            decl_line: decl_line?,
            location: self.location,
        })
    }

    /// Forget everything at a compilation unit boundary
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Attributes the lookup tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tracked {
    StmtList,
    Location,
    DeclFile,
    DeclLine,
}

const TRACKED: [(gimli::DwAt, Tracked); 4] = [
    (gimli::DW_AT_stmt_list, Tracked::StmtList),
    (gimli::DW_AT_location, Tracked::Location),
    (gimli::DW_AT_decl_file, Tracked::DeclFile),
    (gimli::DW_AT_decl_line, Tracked::DeclLine),
];

impl Tracked {
    fn from_name(name: &str) -> Option<Self> {
        TRACKED
            .iter()
            .find(|(at, _)| at.static_string() == Some(name))
            .map(|(_, tracked)| *tracked)
    }
}

/// Find the location list of the entry declared at `target_line` of `target_source`
///
/// Entries are scanned in dump order and the first whose declaration file
/// resolves to `target_source` and whose declaration line equals
/// `target_line` wins. Entries whose file cannot be resolved are skipped.
pub fn find_declaration_location(
    info_dump: &str,
    file_table: &FileTable,
    target_source: &Path,
    target_line: u64,
) -> Option<DeclarationMatch> {
    let patterns = patterns();
    let mut candidate = DeclarationCandidate::new();
    let mut seen_entry_headers = false;
    let mut entry_has_location = false;

    let mut lines = info_dump.lines();
    while let Some(line) = lines.next() {
        if patterns.unit_header.is_match(line) {
            candidate.reset();
            entry_has_location = false;
            continue;
        }
        if patterns.entry_header.is_match(line) {
            seen_entry_headers = true;
            entry_has_location = false;
            continue;
        }

        let Some((tracked, value)) = tracked_attribute(line) else {
            continue;
        };

        match tracked {
            Tracked::StmtList => candidate.set_stmt_list(value),
            Tracked::Location => {
                candidate.set_location(value);
                entry_has_location = true;
            }
            Tracked::DeclFile => candidate.set_decl_file(value),
            Tracked::DeclLine => {
                let Some(entry) = candidate.complete(value) else {
                    continue;
                };
                let Some(path) = file_table.resolve(&entry.stmt_list, entry.decl_file) else {
                    trace!(
                        "Unresolvable declaration file {} in line program {}",
                        entry.decl_file,
                        entry.stmt_list
                    );
                    continue;
                };

                if path == target_source && entry.decl_line == target_line {
                    let location = if seen_entry_headers && !entry_has_location {
                        trailing_location(&mut lines).unwrap_or(entry.location)
                    } else {
                        entry.location
                    };
                    debug!(
                        "Declaration {}:{} found, location list {}",
                        path.display(),
                        entry.decl_line,
                        location.map_or_else(|| "none".to_string(), |l| l.to_string())
                    );
                    return Some(DeclarationMatch {
                        path: path.to_path_buf(),
                        unit: entry.stmt_list,
                        file_index: entry.decl_file,
                        line: entry.decl_line,
                        location,
                    });
                }
            }
        }
    }

    debug!(
        "No declaration at {}:{}",
        target_source.display(),
        target_line
    );
    None
}

/// Read the rest of the current entry for its own `DW_AT_location`
///
/// Returns `None` when the entry ends without one, `Some(None)` when it has a
/// location that is not a list.
fn trailing_location<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Option<Option<LocationRef>> {
    let patterns = patterns();
    for line in lines {
        if patterns.entry_header.is_match(line) || patterns.unit_header.is_match(line) {
            return None;
        }
        if let Some((Tracked::Location, value)) = tracked_attribute(line) {
            return Some(list_location(value));
        }
    }
    None
}

/// Recognize a tracked `DW_AT_*` line and return its value
fn tracked_attribute(line: &str) -> Option<(Tracked, &str)> {
    let captures = patterns().attribute.captures(line)?;
    let tracked = Tracked::from_name(captures.get(1)?.as_str())?;
    let value = captures.get(2).map_or("", |m| m.as_str());
    Some((tracked, value))
}

/// Location list named by a `DW_AT_location` value
///
/// Only location lists are usable; an inline expression yields `None`.
fn list_location(value: &str) -> Option<LocationRef> {
    if value.contains("location list") {
        first_token(value).and_then(LocationRef::parse)
    } else {
        None
    }
}

fn first_token(value: &str) -> Option<&str> {
    value.split_whitespace().next()
}

struct Patterns {
    unit_header: Regex,
    entry_header: Regex,
    attribute: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        unit_header: Regex::new(r"^\s*Compilation Unit @ offset").expect("valid regex"),
        entry_header: Regex::new(r"^\s*<\d+><[0-9a-fA-F]+>: Abbrev Number:").expect("valid regex"),
        attribute: Regex::new(r"\b(DW_AT_\w+)\s*:\s*(.*)$").expect("valid regex"),
    })
}
