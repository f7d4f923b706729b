//! Dump sources: the objdump subprocess and dumps recorded to disk

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info};

use super::{non_empty, DumpKind, DumpSource};
use crate::error::{ResolveError, Result};

/// objdump used when nothing else is configured
pub const DEFAULT_OBJDUMP: &str = "arm-none-eabi-objdump";

/// Environment variable overriding [`DEFAULT_OBJDUMP`]
pub const OBJDUMP_ENV: &str = "PCRANGE_OBJDUMP";

/// Runs GNU objdump once per requested dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objdump {
    program: PathBuf,
}

impl Objdump {
    /// Use a specific objdump binary
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use `$PCRANGE_OBJDUMP`, falling back to the ARM toolchain's objdump
    pub fn from_env() -> Self {
        match env::var_os(OBJDUMP_ENV) {
            Some(program) if !program.is_empty() => Self::new(program),
            _ => Self::new(DEFAULT_OBJDUMP),
        }
    }

    /// Get the objdump binary
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl DumpSource for Objdump {
    fn dump(&self, kind: DumpKind, object: &Path) -> Result<String> {
        debug!(
            "Running {} {} -- {}",
            self.program.display(),
            kind.objdump_flag(),
            object.display()
        );

        let output = Command::new(&self.program)
            .arg(kind.objdump_flag())
            .arg("--")
            .arg(object)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                ResolveError::dump(kind, format!("cannot run {}: {}", self.program.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResolveError::dump(
                kind,
                format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    stderr.trim()
                ),
            ));
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| ResolveError::dump(kind, format!("output is not UTF-8: {}", e)))?;
        info!("{} dump: {} bytes", kind, text.len());
        non_empty(kind, text)
    }
}

/// Dumps captured earlier, one file per kind in a directory
///
/// Lets a resolution be replayed without the toolchain, e.g. from dumps
/// attached to a bug report. The object path is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDumps {
    dir: PathBuf,
}

impl RecordedDumps {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Path a dump of `kind` is read from
    pub fn path(&self, kind: DumpKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }
}

impl DumpSource for RecordedDumps {
    fn dump(&self, kind: DumpKind, _object: &Path) -> Result<String> {
        let path = self.path(kind);
        debug!("Reading recorded {} dump from {}", kind, path.display());

        let text = fs::read_to_string(&path)
            .map_err(|e| ResolveError::dump(kind, format!("{}: {}", path.display(), e)))?;
        non_empty(kind, text)
    }
}
