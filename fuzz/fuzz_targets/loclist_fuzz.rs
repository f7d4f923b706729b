#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pcrange::{extract_ranges, LocationRef};

#[derive(Debug, Arbitrary)]
struct Input {
    loc_dump: String,
    offset: u64,
}

fuzz_target!(|input: Input| {
    let first = extract_ranges(&input.loc_dump, LocationRef(input.offset));
    let second = extract_ranges(&input.loc_dump, LocationRef(input.offset));

    assert_eq!(first, second);
    assert!(first.len() <= input.loc_dump.lines().count());
});
