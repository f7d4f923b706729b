//! File table reconstruction from `objdump --dwarf=rawline`
//!
//! Every line-number program carries its own directory and file tables, and
//! `DW_AT_decl_file` indexes into the table of the program named by the
//! unit's `DW_AT_stmt_list`. The same index therefore means different files
//! in different units, which is why the table is keyed by both.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, trace};
use regex::Regex;

use super::number::{parse_number, Radix};
use super::split_fields;

/// Identifies a line-number program by its offset in `.debug_line`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitToken {
    /// Canonical numeric offset
    Offset(u64),
    /// A token objdump printed that is not a number, compared verbatim
    Raw(String),
}

impl UnitToken {
    /// Canonicalize a token as printed by objdump (`0x0`, `0`, ...)
    pub fn parse(token: &str) -> Self {
        match parse_number(token, Radix::Decimal) {
            Some(offset) => UnitToken::Offset(offset),
            None => UnitToken::Raw(token.trim().to_string()),
        }
    }
}

impl fmt::Display for UnitToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitToken::Offset(offset) => write!(f, "{:#x}", offset),
            UnitToken::Raw(raw) => f.write_str(raw),
        }
    }
}

/// Key of a resolved file: the owning line program and the unit-local index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileTableKey {
    /// Line program the index belongs to
    pub unit: UnitToken,
    /// Unit-local file index
    pub index: u64,
}

impl FileTableKey {
    pub fn new(unit: UnitToken, index: u64) -> Self {
        Self { unit, index }
    }
}

/// Immutable snapshot of every resolvable file in a line dump
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTable {
    entries: HashMap<FileTableKey, PathBuf>,
}

impl FileTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resolved path, replacing any previous one for the key
    pub fn insert(&mut self, key: FileTableKey, path: PathBuf) {
        self.entries.insert(key, path);
    }

    /// Resolve a file index within the given line program
    pub fn resolve(&self, unit: &UnitToken, index: u64) -> Option<&Path> {
        self.entries
            .get(&FileTableKey::new(unit.clone(), index))
            .map(PathBuf::as_path)
    }

    /// Number of resolved files
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing could be resolved
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all resolved files, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&FileTableKey, &Path)> {
        self.entries.iter().map(|(key, path)| (key, path.as_path()))
    }
}

impl FromIterator<(FileTableKey, PathBuf)> for FileTable {
    fn from_iter<I: IntoIterator<Item = (FileTableKey, PathBuf)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Build the file table of every line program in a rawline dump
///
/// Malformed rows and files whose directory is missing are skipped; only the
/// row matching the target declaration is ever consulted, so a partial table
/// is still useful.
pub fn build_file_table(line_dump: &str) -> FileTable {
    let mut builder = FileTableBuilder::default();
    for line in line_dump.lines() {
        builder.feed(line);
    }
    builder.finish()
}

/// Which part of a line program header is being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Idle,
    Directories,
    Files,
}

/// Column positions of the file name table
///
/// DWARF 4 and older print `Entry Dir Time Size Name`; binutils prints
/// `Entry Dir Name` (optionally with an `MD5` column) for DWARF 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileColumns {
    dir: usize,
    name: usize,
}

impl Default for FileColumns {
    fn default() -> Self {
        Self { dir: 1, name: 4 }
    }
}

impl FileColumns {
    /// Derive column positions from an `Entry ...` header row
    fn from_header(header: &str) -> Option<Self> {
        let columns: Vec<&str> = header.split_whitespace().collect();
        let dir = columns.iter().position(|c| *c == "Dir")?;
        let name = columns.iter().position(|c| *c == "Name")?;
        (dir < name).then_some(Self { dir, name })
    }
}

struct FileTableBuilder {
    table: FileTable,
    unit: Option<UnitToken>,
    section: Section,
    columns: FileColumns,
    directories: HashMap<u64, String>,
    files: HashMap<u64, PathBuf>,
}

impl Default for FileTableBuilder {
    fn default() -> Self {
        Self {
            table: FileTable::new(),
            unit: None,
            section: Section::Idle,
            columns: FileColumns::default(),
            directories: HashMap::new(),
            files: HashMap::new(),
        }
    }
}

impl FileTableBuilder {
    fn feed(&mut self, line: &str) {
        let patterns = patterns();

        if let Some(captures) = patterns.unit_offset.captures(line) {
            self.flush();
            self.unit = Some(UnitToken::parse(&captures[1]));
            self.section = Section::Idle;
            self.columns = FileColumns::default();
            trace!("Line program header at {}", captures[1].trim());
            return;
        }
        if patterns.directory_table.is_match(line) {
            self.section = Section::Directories;
            return;
        }
        if patterns.file_table.is_match(line) {
            self.section = Section::Files;
            return;
        }
        if patterns.statements.is_match(line) {
            self.section = Section::Idle;
            return;
        }

        match self.section {
            Section::Idle => {}
            Section::Directories => self.directory_row(line),
            Section::Files => self.file_row(line),
        }
    }

    fn directory_row(&mut self, line: &str) {
        let fields = split_fields(line, 2);
        let [index, name] = fields.as_slice() else {
            return;
        };
        let Some(index) = parse_number(index, Radix::Decimal) else {
            return;
        };
        self.directories
            .insert(index, strip_indirect(name).to_string());
    }

    fn file_row(&mut self, line: &str) {
        if line.trim_start().starts_with("Entry") {
            if let Some(columns) = FileColumns::from_header(line) {
                self.columns = columns;
            }
            return;
        }

        let fields = split_fields(line, self.columns.name + 1);
        if fields.len() != self.columns.name + 1 {
            return;
        }
        let (Some(index), Some(dir)) = (
            parse_number(fields[0], Radix::Decimal),
            parse_number(fields[self.columns.dir], Radix::Decimal),
        ) else {
            return;
        };

        match self.directories.get(&dir) {
            Some(directory) => {
                let name = strip_indirect(fields[self.columns.name]);
                self.files.insert(index, Path::new(directory).join(name));
            }
            None => trace!("File {} refers to unknown directory {}", index, dir),
        }
    }

    /// Merge the current unit's files into the snapshot and start afresh
    fn flush(&mut self) {
        let files = std::mem::take(&mut self.files);
        self.directories.clear();

        if files.is_empty() {
            return;
        }
        match &self.unit {
            Some(unit) => {
                debug!("Line program {}: {} files", unit, files.len());
                for (index, path) in files {
                    self.table.insert(FileTableKey::new(unit.clone(), index), path);
                }
            }
            None => debug!("Dropping {} files listed before any line program header", files.len()),
        }
    }

    fn finish(mut self) -> FileTable {
        self.flush();
        self.table
    }
}

/// Drop the `(indirect line string, offset: 0x..): ` prefix of DWARF 5 names
fn strip_indirect(name: &str) -> &str {
    let name = name.trim_end();
    match patterns().indirect.find(name) {
        Some(prefix) => &name[prefix.end()..],
        None => name,
    }
}

struct Patterns {
    unit_offset: Regex,
    directory_table: Regex,
    file_table: Regex,
    statements: Regex,
    indirect: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        unit_offset: Regex::new(r"^\s*Offset:\s+(\S+)").expect("valid regex"),
        directory_table: Regex::new(r"^\s*The Directory Table").expect("valid regex"),
        file_table: Regex::new(r"^\s*The File Name Table").expect("valid regex"),
        statements: Regex::new(r"^\s*(?:No )?Line Number Statements").expect("valid regex"),
        indirect: Regex::new(r"^\(indirect (?:line )?string, offset: 0x[0-9a-fA-F]+\):\s*")
            .expect("valid regex"),
    })
}
