use std::path::{Path, PathBuf};

use pcrange::{
    build_file_table, find_declaration_location, DumpKind, FileTable, FileTableKey, LocationRef,
    UnitToken,
};
use test_case::test_case;

use crate::test_helpers::{firmware_dump, MAIN_C, SPI_C, SPI_H};

fn firmware_table() -> FileTable {
    build_file_table(&firmware_dump(DumpKind::RawLine))
}

#[test_case(MAIN_C, 22, Some(LocationRef(0x0)) ; "count")]
#[test_case(MAIN_C, 23, Some(LocationRef(0x2a)) ; "flags")]
#[test_case(MAIN_C, 25, None ; "buf lives on the stack")]
#[test_case(MAIN_C, 27, Some(LocationRef(0x6e)) ; "unused")]
#[test_case(SPI_C, 22, Some(LocationRef(0x3d)) ; "same line in another unit")]
#[test_case(SPI_C, 39, Some(LocationRef(0x5b)) ; "parameter")]
#[test_case(SPI_C, 40, None ; "parameter in a register")]
#[test_case(SPI_H, 10, None ; "global at a fixed address")]
fn test_firmware_declarations(source: &str, line: u64, expected: Option<LocationRef>) {
    let found = find_declaration_location(
        &firmware_dump(DumpKind::Info),
        &firmware_table(),
        Path::new(source),
        line,
    )
    .expect("declaration should be found");

    assert_eq!(found.path, PathBuf::from(source));
    assert_eq!(found.line, line);
    assert_eq!(found.location, expected);
}

#[test_case(MAIN_C, 99 ; "no such line")]
#[test_case("/home/fw/src/other.c", 22 ; "no such file")]
#[test_case("main.c", 22 ; "relative path")]
fn test_firmware_declaration_not_found(source: &str, line: u64) {
    assert!(find_declaration_location(
        &firmware_dump(DumpKind::Info),
        &firmware_table(),
        Path::new(source),
        line,
    )
    .is_none());
}

#[test]
fn test_units_are_told_apart_by_stmt_list() {
    let table: FileTable = [
        (FileTableKey::new(UnitToken::Offset(0), 1), PathBuf::from("/a/one.c")),
        (FileTableKey::new(UnitToken::Offset(0x40), 1), PathBuf::from("/a/two.c")),
    ]
    .into_iter()
    .collect();
    let info = "\
  Compilation Unit @ offset 0x0:
    DW_AT_stmt_list   : 0x0
    DW_AT_location    : 0x10 (location list)
    DW_AT_decl_file   : 1
    DW_AT_decl_line   : 7
  Compilation Unit @ offset 0x30:
    DW_AT_stmt_list   : 0x40
    DW_AT_location    : 0x20 (location list)
    DW_AT_decl_file   : 1
    DW_AT_decl_line   : 7
";

    let one = find_declaration_location(info, &table, Path::new("/a/one.c"), 7).unwrap();
    let two = find_declaration_location(info, &table, Path::new("/a/two.c"), 7).unwrap();

    assert_eq!(one.location, Some(LocationRef(0x10)));
    assert_eq!(one.unit, UnitToken::Offset(0));
    assert_eq!(two.location, Some(LocationRef(0x20)));
    assert_eq!(two.unit, UnitToken::Offset(0x40));
}

#[test]
fn test_first_match_wins() {
    let table: FileTable = [(FileTableKey::new(UnitToken::Offset(0), 1), PathBuf::from("/a/inl.h"))]
        .into_iter()
        .collect();
    let info = "\
    DW_AT_stmt_list   : 0x0
    DW_AT_location    : 0x10 (location list)
    DW_AT_decl_file   : 1
    DW_AT_decl_line   : 4
    DW_AT_location    : 0x80 (location list)
    DW_AT_decl_file   : 1
    DW_AT_decl_line   : 4
";

    let found = find_declaration_location(info, &table, Path::new("/a/inl.h"), 4).unwrap();
    assert_eq!(found.location, Some(LocationRef(0x10)));
}

#[test]
fn test_unresolvable_entries_are_skipped() {
    let table: FileTable = [(FileTableKey::new(UnitToken::Offset(0), 2), PathBuf::from("/a/b.c"))]
        .into_iter()
        .collect();
    let info = "\
    DW_AT_stmt_list   : 0x0
    DW_AT_location    : 0x10 (location list)
    DW_AT_decl_file   : 9
    DW_AT_decl_line   : 4
    DW_AT_decl_file   : 2
    DW_AT_decl_line   : 4
";

    let found = find_declaration_location(info, &table, Path::new("/a/b.c"), 4).unwrap();
    assert_eq!(found.file_index, 2);
}

#[test]
fn test_stmt_list_forms_compare_numerically() {
    let table: FileTable = [(FileTableKey::new(UnitToken::parse("0x00000000"), 1), PathBuf::from("/a/b.c"))]
        .into_iter()
        .collect();
    let info = "    DW_AT_stmt_list   : 0\n    DW_AT_decl_file   : 1\n    DW_AT_decl_line   : 4\n";

    assert!(find_declaration_location(info, &table, Path::new("/a/b.c"), 4).is_some());
}
