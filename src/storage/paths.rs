use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Joins an uploader-supplied file name onto a namespace root, rejecting
/// anything that could land outside the root.
///
/// Pure string/path logic; no filesystem access. A valid name is exactly one
/// normal path component: no separators, no `.`/`..`, no absolute prefixes,
/// no NUL bytes. Callers must treat failure as access denied and skip the
/// filesystem operation entirely.
pub fn resolve_name(root: &Path, raw_name: &str) -> Result<PathBuf> {
    if raw_name.is_empty() || raw_name.contains('\0') {
        return Err(Error::UnsafeName);
    }
    if raw_name.contains('/') || raw_name.contains('\\') {
        return Err(Error::UnsafeName);
    }

    let mut components = Path::new(raw_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(root.join(raw_name)),
        _ => Err(Error::UnsafeName),
    }
}
