use std::path::{Path, PathBuf};

use mockall::mock;
use mockall::predicate::{always, eq};
use pcrange::{
    DumpKind, DumpSource, LocationRef, PcRange, RecordedDumps, Resolution, ResolveError,
    Resolver, VariableQuery,
};
use test_case::test_case;

use crate::test_helpers::{firmware_dump, firmware_dumps_dir, MAIN_C, SPI_C, SPI_H};

mock! {
    pub Dumps {}
    impl DumpSource for Dumps {
        fn dump(&self, kind: DumpKind, object: &Path) -> pcrange::Result<String>;
    }
}

fn query(source: &str, line: u64, architecture: &str) -> VariableQuery {
    VariableQuery {
        name: "var".to_string(),
        decl_line: line,
        source_file: PathBuf::from(source),
        object_file: PathBuf::from("build/firmware.elf"),
        architecture: architecture.to_string(),
    }
}

/// A mock serving the firmware fixtures, each dump exactly once
fn firmware_mock() -> MockDumps {
    let mut dumps = MockDumps::new();
    for kind in DumpKind::ALL {
        let text = firmware_dump(kind);
        dumps
            .expect_dump()
            .with(eq(kind), always())
            .times(1)
            .returning(move |_, _| Ok(text.clone()));
    }
    dumps
}

#[test]
fn test_resolves_through_all_three_dumps() {
    let resolver = Resolver::new(firmware_mock());
    let resolution = resolver.resolve(&query(MAIN_C, 22, "arm")).unwrap();

    assert_eq!(
        resolution.ranges(),
        &[
            PcRange::new(0x80001a4, 0x80001b2),
            PcRange::new(0x80001b2, 0x80001c8),
            PcRange::new(0x80001d0, 0x80001dc),
        ]
    );
    let declaration = resolution.declaration().unwrap();
    assert_eq!(declaration.path, PathBuf::from(MAIN_C));
    assert_eq!(declaration.location, Some(LocationRef(0)));
}

#[test]
fn test_dumps_the_requested_object() {
    let mut dumps = MockDumps::new();
    dumps
        .expect_dump()
        .withf(|_, object| object == Path::new("build/firmware.elf"))
        .times(3)
        .returning(|kind, _| Ok(firmware_dump(kind)));

    let resolver = Resolver::new(dumps);
    assert!(resolver.resolve(&query(SPI_C, 39, "arm")).is_ok());
}

#[test]
fn test_unsupported_architecture_takes_no_dump() {
    let mut dumps = MockDumps::new();
    dumps.expect_dump().never();

    let resolver = Resolver::new(dumps);
    let err = resolver.resolve(&query(MAIN_C, 22, "aarch64")).unwrap_err();

    match err {
        ResolveError::UnsupportedArchitecture { found, supported } => {
            assert_eq!(found, "aarch64");
            assert_eq!(supported, "arm");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_dump_failure_stops_the_resolution() {
    let mut dumps = MockDumps::new();
    let rawline = firmware_dump(DumpKind::RawLine);
    dumps
        .expect_dump()
        .with(eq(DumpKind::RawLine), always())
        .times(1)
        .returning(move |_, _| Ok(rawline.clone()));
    dumps
        .expect_dump()
        .with(eq(DumpKind::Info), always())
        .times(1)
        .returning(|kind, _| {
            Err(ResolveError::DumpUtilityFailure {
                kind,
                reason: "arm-none-eabi-objdump exited with exit status: 1".to_string(),
            })
        });
    dumps
        .expect_dump()
        .with(eq(DumpKind::Loc), always())
        .never();

    let resolver = Resolver::new(dumps);
    let err = resolver.resolve(&query(MAIN_C, 22, "arm")).unwrap_err();

    assert!(matches!(
        err,
        ResolveError::DumpUtilityFailure { kind: DumpKind::Info, .. }
    ));
    assert_eq!(
        err.to_string(),
        "info dump failed: arm-none-eabi-objdump exited with exit status: 1"
    );
}

#[test_case(MAIN_C, 23, &[(0x80001a6, 0x80001f0)] ; "flags")]
#[test_case(SPI_C, 22, &[(0x8000210, 0x8000224), (0x8000230, 0x800024a)] ; "n")]
#[test_case(SPI_C, 39, &[(0x8000200, 0x800020c)] ; "tx")]
fn test_recorded_firmware_ranges(source: &str, line: u64, expected: &[(u64, u64)]) {
    let resolver = Resolver::new(RecordedDumps::new(firmware_dumps_dir()));
    let resolution = resolver.resolve(&query(source, line, "armv7e-m")).unwrap();

    let expected: Vec<PcRange> = expected
        .iter()
        .map(|&(start, end)| PcRange::new(start, end))
        .collect();
    assert_eq!(resolution.ranges(), expected.as_slice());
}

#[test]
fn test_recorded_firmware_outcomes() {
    let resolver = Resolver::new(RecordedDumps::new(firmware_dumps_dir()));

    assert!(matches!(
        resolver.resolve(&query(MAIN_C, 27, "arm")).unwrap(),
        Resolution::NoRanges { location: LocationRef(0x6e), .. }
    ));
    assert!(matches!(
        resolver.resolve(&query(MAIN_C, 25, "arm")).unwrap(),
        Resolution::NoLocationList { .. }
    ));
    assert!(matches!(
        resolver.resolve(&query(SPI_H, 10, "arm")).unwrap(),
        Resolution::NoLocationList { .. }
    ));
    assert_eq!(
        resolver.resolve(&query(MAIN_C, 99, "arm")).unwrap(),
        Resolution::DeclarationNotFound
    );
}

#[test]
fn test_printed_ranges() {
    let resolver = Resolver::new(RecordedDumps::new(firmware_dumps_dir()));
    let resolution = resolver.resolve(&query(SPI_C, 22, "arm")).unwrap();

    let printed: Vec<String> = resolution.ranges().iter().map(ToString::to_string).collect();
    assert_eq!(printed, vec!["8000210 -- 8000224", "8000230 -- 800024a"]);
}
