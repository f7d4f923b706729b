use std::process::{Command, Output};

use crate::test_helpers::{firmware_dumps_dir, MAIN_C, SPI_C};

/// Run the pcrange binary against the recorded firmware dumps
fn pcrange(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pcrange"))
        .args(args)
        .arg("--dumps")
        .arg(firmware_dumps_dir())
        .arg("firmware.elf")
        .output()
        .expect("pcrange should run")
}

#[test]
fn test_prints_one_range_per_line() {
    let output = pcrange(&["-a", "arm", "-s", SPI_C, "-l", "22"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "8000210 -- 8000224\n8000230 -- 800024a\n"
    );
}

#[test]
fn test_missing_declaration_exit_status() {
    let output = pcrange(&["-a", "arm", "-s", MAIN_C, "-l", "99"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_failure_is_reported_once() {
    let output = pcrange(&["-a", "aarch64", "-s", MAIN_C, "-l", "22"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr.matches("Unsupported architecture 'aarch64'").count(), 1, "{}", stderr);
}
