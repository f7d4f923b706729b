//! Variable range resolution
//!
//! Correlates the three dumps of an object file: file tables resolve the
//! declaration of the variable, whose location list yields the PC ranges.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::dwarf::{
    build_file_table, extract_ranges, find_declaration_location, DeclarationMatch, LocationRef,
    PcRange, PcRanges,
};
use crate::error::Result;
use crate::platform::{check_architecture, DumpKind, DumpSource, Objdump, RecordedDumps};

/// A variable as resolved by the debugger front-end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableQuery {
    /// Variable name, for reporting only
    pub name: String,
    /// Line the variable is declared at
    pub decl_line: u64,
    /// Source file the variable is declared in, as recorded in the line tables
    pub source_file: PathBuf,
    /// Object file carrying the debug information
    pub object_file: PathBuf,
    /// Architecture name reported by the debugger
    pub architecture: String,
}

/// Outcome of a resolution that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The variable's location list and its ranges, in dump order
    Ranges {
        declaration: DeclarationMatch,
        location: LocationRef,
        ranges: PcRanges,
    },
    /// The location list exists but holds no ranges
    NoRanges {
        declaration: DeclarationMatch,
        location: LocationRef,
    },
    /// The declaration was found but its location is not a location list
    NoLocationList { declaration: DeclarationMatch },
    /// Nothing is declared at the requested file and line
    DeclarationNotFound,
}

impl Resolution {
    /// Ranges found, empty for every outcome but [`Resolution::Ranges`]
    pub fn ranges(&self) -> &[PcRange] {
        match self {
            Resolution::Ranges { ranges, .. } => ranges,
            _ => &[],
        }
    }

    /// Matched declaration, if any
    pub fn declaration(&self) -> Option<&DeclarationMatch> {
        match self {
            Resolution::Ranges { declaration, .. }
            | Resolution::NoRanges { declaration, .. }
            | Resolution::NoLocationList { declaration } => Some(declaration),
            Resolution::DeclarationNotFound => None,
        }
    }
}

/// Correlate already rendered dumps
///
/// Pure function of its inputs: the same dumps always give the same result.
pub fn correlate(
    line_dump: &str,
    info_dump: &str,
    loc_dump: &str,
    source_file: &Path,
    decl_line: u64,
) -> Resolution {
    let file_table = build_file_table(line_dump);
    debug!("File table: {} entries", file_table.len());

    let Some(declaration) = find_declaration_location(info_dump, &file_table, source_file, decl_line)
    else {
        return Resolution::DeclarationNotFound;
    };
    let Some(location) = declaration.location else {
        return Resolution::NoLocationList { declaration };
    };

    let ranges = extract_ranges(loc_dump, location);
    if ranges.is_empty() {
        Resolution::NoRanges {
            declaration,
            location,
        }
    } else {
        Resolution::Ranges {
            declaration,
            location,
            ranges,
        }
    }
}

/// Where dumps come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// objdump binary to run
    pub objdump: PathBuf,
    /// Read recorded dumps from this directory instead of running objdump
    pub recorded_dumps: Option<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            objdump: Objdump::from_env().program().to_path_buf(),
            recorded_dumps: None,
        }
    }
}

impl ResolverConfig {
    /// Build the dump source this configuration describes
    pub fn dump_source(&self) -> Box<dyn DumpSource> {
        match &self.recorded_dumps {
            Some(dir) => Box::new(RecordedDumps::new(dir)),
            None => Box::new(Objdump::new(&self.objdump)),
        }
    }
}

/// Resolves variables against one dump source
pub struct Resolver<S: DumpSource> {
    source: S,
}

impl Resolver<Box<dyn DumpSource>> {
    /// Create a resolver from a configuration
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.dump_source())
    }
}

impl<S: DumpSource> Resolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Resolve the PC ranges of a variable
    ///
    /// The architecture is checked before any dump is taken. Each dump is
    /// taken once; a failing dump ends the resolution.
    pub fn resolve(&self, query: &VariableQuery) -> Result<Resolution> {
        check_architecture(&query.architecture)?;
        info!(
            "Resolving {} ({}:{}) in {}",
            query.name,
            query.source_file.display(),
            query.decl_line,
            query.object_file.display()
        );

        let object = query.object_file.as_path();
        let line_dump = self.source.dump(DumpKind::RawLine, object)?;
        let info_dump = self.source.dump(DumpKind::Info, object)?;
        let loc_dump = self.source.dump(DumpKind::Loc, object)?;

        let resolution = correlate(
            &line_dump,
            &info_dump,
            &loc_dump,
            &query.source_file,
            query.decl_line,
        );
        info!("{}: {} ranges", query.name, resolution.ranges().len());
        Ok(resolution)
    }
}
