#![no_main]

use libfuzzer_sys::fuzz_target;
use pcrange::build_file_table;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let table = build_file_table(&text);

    // Every entry comes from a row of the dump, so it can't outnumber the lines
    assert!(table.len() <= text.lines().count());
});
