//! Target architecture checks
//!
//! Only 32-bit ARM objects are supported: the dump grammar handled here is
//! the one `arm-none-eabi-objdump` produces.

use std::fs;
use std::path::Path;

use log::debug;
use object::{Architecture, Object};

use crate::error::{ResolveError, Result};

/// The supported architecture family, as debuggers name it
pub const SUPPORTED_ARCH: &str = "arm";

/// Check if a debugger architecture name belongs to the supported family
///
/// GDB reports plain `arm` for most targets and a variant such as
/// `armv7e-m` when the ELF attributes name one.
pub fn is_supported(name: &str) -> bool {
    name == SUPPORTED_ARCH || name.starts_with("armv")
}

/// Fail unless `name` belongs to the supported family
pub fn check_architecture(name: &str) -> Result<()> {
    if is_supported(name) {
        Ok(())
    } else {
        Err(ResolveError::UnsupportedArchitecture {
            found: name.to_string(),
            supported: SUPPORTED_ARCH.to_string(),
        })
    }
}

/// Read the architecture of an object file, named the way GDB names it
pub fn detect_architecture(path: &Path) -> Result<String> {
    let inspection = |reason: String| ResolveError::ObjectInspection {
        path: path.to_path_buf(),
        reason,
    };

    let data = fs::read(path).map_err(|e| inspection(e.to_string()))?;
    let file = object::File::parse(&*data).map_err(|e| inspection(e.to_string()))?;

    let name = architecture_name(file.architecture());
    debug!("{} is {:?} ({})", path.display(), file.architecture(), name);
    Ok(name.to_string())
}

/// GDB-style name of an `object` architecture
pub fn architecture_name(arch: Architecture) -> &'static str {
    match arch {
        Architecture::Arm => "arm",
        Architecture::Aarch64 | Architecture::Aarch64_Ilp32 => "aarch64",
        Architecture::I386 => "i386",
        Architecture::X86_64 | Architecture::X86_64_X32 => "i386:x86-64",
        Architecture::Riscv32 => "riscv:rv32",
        Architecture::Riscv64 => "riscv:rv64",
        Architecture::Mips | Architecture::Mips64 => "mips",
        Architecture::PowerPc | Architecture::PowerPc64 => "powerpc:common",
        _ => "unknown",
    }
}
