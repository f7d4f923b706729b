#![no_main]

use std::path::{Path, PathBuf};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pcrange::{find_declaration_location, FileTable, FileTableKey, UnitToken};

#[derive(Debug, Arbitrary)]
struct Input {
    info_dump: String,
    unit: u64,
    file_index: u64,
    source: String,
    line: u64,
}

fuzz_target!(|input: Input| {
    let table: FileTable = [(
        FileTableKey::new(UnitToken::Offset(input.unit), input.file_index),
        PathBuf::from(&input.source),
    )]
    .into_iter()
    .collect();

    if let Some(found) =
        find_declaration_location(&input.info_dump, &table, Path::new(&input.source), input.line)
    {
        assert_eq!(found.line, input.line);
        assert_eq!(found.path, Path::new(&input.source));
    }
});
