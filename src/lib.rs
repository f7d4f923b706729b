//! PCRANGE - find the PC ranges over which a local variable's location is valid
//!
//! Heavy inlining leaves many locals invisible to the debugger outside a few
//! instruction windows. This library recovers those windows from the text
//! GNU objdump renders for an object's DWARF sections: the line tables
//! (`--dwarf=rawline`), the debugging information entries (`--dwarf=info`)
//! and the location lists (`--dwarf=loc`).

pub mod dwarf;
pub mod error;
pub mod platform;
pub mod resolver;

/// Re-export key types for easier access in tests
pub use dwarf::{
    build_file_table, extract_ranges, find_declaration_location, DeclarationMatch, FileTable,
    FileTableKey, LocationRef, PcRange, PcRanges, UnitToken,
};
pub use error::{ResolveError, Result};
pub use platform::{DumpKind, DumpSource, Objdump, RecordedDumps};
pub use resolver::{correlate, Resolution, Resolver, ResolverConfig, VariableQuery};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Initialize the logging system
pub fn init_logging(level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("pcrange", level)
        .format_timestamp_secs()
        .init();
}
