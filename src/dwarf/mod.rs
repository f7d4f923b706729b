//! Parsers for the textual DWARF dumps rendered by GNU objdump
//!
//! The three dumps are correlated in order: the file tables from
//! `--dwarf=rawline` resolve the declaration files found in `--dwarf=info`,
//! which yields the offset of a location list in `--dwarf=loc`.

pub mod declaration;
pub mod file_table;
pub mod loclist;
pub mod number;

pub use declaration::{find_declaration_location, DeclarationMatch, LocationRef};
pub use file_table::{build_file_table, FileTable, FileTableKey, UnitToken};
pub use loclist::{extract_ranges, PcRange, PcRanges};
pub use number::{parse_number, Radix};

/// Split a row into at most `limit` whitespace-separated fields
///
/// The last field keeps the remainder of the row, inner whitespace included.
pub(crate) fn split_fields(line: &str, limit: usize) -> Vec<&str> {
    let mut fields = Vec::with_capacity(limit);
    let mut rest = line.trim();

    while !rest.is_empty() && fields.len() + 1 < limit {
        match rest.find(char::is_whitespace) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                fields.push(rest);
                rest = "";
            }
        }
    }
    if !rest.is_empty() {
        fields.push(rest);
    }

    fields
}
