//! Purpose: Resolve which record file a command operates on.
//! Exports: `DEFAULT_STORE_FILE`, `StoreLocation`, `resolve_store_path`.
//! Role: Keep CLI flag, env, and default semantics aligned from one source.
//! Invariants: Default store is `hostel_data.txt` in the working directory.
//! Invariants: Named stores must not contain path separators.

use std::path::{Path, PathBuf};

use crate::core::error::{Error, ErrorKind};

pub const DEFAULT_STORE_FILE: &str = "hostel_data.txt";
const STORE_EXTENSION: &str = ".txt";

/// Where the caller asked the store to live. `file` wins over `dir`/`name`.
#[derive(Clone, Debug, Default)]
pub struct StoreLocation {
    pub file: Option<PathBuf>,
    pub dir: Option<PathBuf>,
    pub name: Option<String>,
}

pub fn resolve_store_path(location: &StoreLocation) -> Result<PathBuf, Error> {
    if let Some(file) = &location.file {
        return Ok(file.clone());
    }
    let dir = location.dir.as_deref().unwrap_or_else(|| Path::new("."));
    match &location.name {
        Some(name) => resolve_named_store_path(name, dir),
        None => Ok(dir.join(DEFAULT_STORE_FILE)),
    }
}

fn resolve_named_store_path(name: &str, dir: &Path) -> Result<PathBuf, Error> {
    if name.is_empty() {
        return Err(Error::new(ErrorKind::Usage).with_message("store name must not be empty"));
    }
    if name.contains(['/', '\\']) {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("store name must not contain path separators")
            .with_hint("Use --file for an explicit path, or --dir plus a bare --name."));
    }
    if name.ends_with(STORE_EXTENSION) {
        return Ok(dir.join(name));
    }
    Ok(dir.join(format!("{name}{STORE_EXTENSION}")))
}
