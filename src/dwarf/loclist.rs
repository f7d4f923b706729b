//! Location list extraction from `objdump --dwarf=loc`
//!
//! GNU objdump prints one row per entry:
//!
//! ```text
//!     Offset   Begin    End      Expression
//!     00000000 00000000 0000000c (DW_OP_reg0 (r0))
//!     0000000f 0000000c 00000020 (DW_OP_reg4 (r4))
//!     0000001e <End of list>
//! ```
//!
//! A list is identified by the offset of its first row and runs until the
//! next `<End of list>` sentinel.

use std::fmt;

use log::{debug, trace};

use super::declaration::LocationRef;
use super::number::{parse_number, Radix};
use super::split_fields;

const END_OF_LIST: &str = "<End of list>";
const BASE_ADDRESS: &str = "(base address)";
const VIEW_PAIR_HEADER: &str = "views at";

/// Instruction addresses delimiting where a location is valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PcRange {
    /// First address covered
    pub start: u64,
    /// Address just past the covered range
    pub end: u64,
}

impl PcRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for PcRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x} -- {:x}", self.start, self.end)
    }
}

/// Ranges of one location list, in dump order
pub type PcRanges = Vec<PcRange>;

/// Collect the ranges of the location list starting at `location`
///
/// Only the first list opened at that offset is read. An offset that never
/// appears yields an empty list; callers treat that as "no narrowed
/// liveness window", not as a failure.
pub fn extract_ranges(loc_dump: &str, location: LocationRef) -> PcRanges {
    let mut ranges = PcRanges::new();
    let mut active = false;
    // binutils prints the begin/end of a view-pair entry on the next row
    let mut under_view_pair = false;

    for line in loc_dump.lines() {
        let fields = split_fields(line, 2);
        let Some(index) = fields.first() else {
            continue;
        };
        let rest = fields.get(1).copied().unwrap_or("");

        if line.contains(END_OF_LIST) {
            if active {
                break;
            }
            continue;
        }

        if !active {
            if parse_number(index, Radix::Hexadecimal) == Some(location.offset()) {
                trace!("Location list {} opens: {}", location, line.trim());
                active = true;
                under_view_pair = rest.contains(VIEW_PAIR_HEADER);
                // GNU layout: the opening row carries the first entry itself
                if let Some(range) = leading_pair(rest) {
                    ranges.push(range);
                }
            }
            continue;
        }

        let continuation = under_view_pair;
        under_view_pair = rest.contains(VIEW_PAIR_HEADER);
        if rest.contains(BASE_ADDRESS) {
            continue;
        }
        match row_pair(line, continuation) {
            Some(range) => ranges.push(range),
            None => trace!("Skipping location row: {}", line.trim()),
        }
    }

    debug!("Location list {}: {} ranges", location, ranges.len());
    ranges
}

/// Pair formed by the first two fields of `text`, if both are addresses
fn leading_pair(text: &str) -> Option<PcRange> {
    let mut tokens = text.split_whitespace();
    let start = parse_number(tokens.next()?, Radix::Hexadecimal)?;
    let end = parse_number(tokens.next()?, Radix::Hexadecimal)?;
    Some(PcRange::new(start, end))
}

/// Pair carried by a row inside an open list
///
/// Rows normally lead with their own offset, followed by begin and end. Rows
/// of exactly two fields, and the `continuation` row following a view pair,
/// carry begin and end without an offset.
fn row_pair(line: &str, continuation: bool) -> Option<PcRange> {
    if continuation || line.split_whitespace().count() == 2 {
        return leading_pair(line);
    }
    match split_fields(line, 2).as_slice() {
        [_, rest] => leading_pair(rest),
        _ => None,
    }
}
