//! Canonical parsing of numeric tokens found in objdump output
//!
//! objdump is not consistent about radix: line-table offsets and `DW_AT_*`
//! values carry a `0x` prefix, location-list offsets are bare hexadecimal,
//! file indices and line numbers are bare decimal. Every parser goes through
//! [`parse_number`] so that the same offset always compares equal, whatever
//! form it was printed in.

/// Radix applied to tokens that carry no prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    /// Bare tokens are decimal; `0x`, `0o` and `0b` prefixes are honoured
    Decimal,
    /// Bare tokens are hexadecimal; a `0x` prefix is tolerated
    Hexadecimal,
}

impl Radix {
    fn base(self) -> u32 {
        match self {
            Radix::Decimal => 10,
            Radix::Hexadecimal => 16,
        }
    }
}

/// Parse a numeric token into its canonical value
///
/// Returns `None` for anything that is not a complete unsigned number in the
/// selected radix, so callers can treat the row as noise.
pub fn parse_number(token: &str, default: Radix) -> Option<u64> {
    let token = token.trim();

    let (digits, base) = if let Some(rest) = strip_prefix(token, "0x") {
        (rest, 16)
    } else if default == Radix::Decimal {
        if let Some(rest) = strip_prefix(token, "0o") {
            (rest, 8)
        } else if let Some(rest) = strip_prefix(token, "0b") {
            (rest, 2)
        } else {
            (token, default.base())
        }
    } else {
        (token, default.base())
    };

    // from_str_radix accepts a leading sign, objdump never prints one
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    u64::from_str_radix(digits, base).ok()
}

/// Case-insensitive prefix strip (`0X10` shows up in hand-written dumps)
fn strip_prefix<'a>(token: &'a str, prefix: &str) -> Option<&'a str> {
    let head = token.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &token[prefix.len()..])
}
