//! Path policy: safe filenames, version locations, and root containment.
//!
//! Stored paths are always relative to the storage root and have the shape
//! `{owner_id}/{document_id}/v{version_number}/{safe_name}`. Every stored
//! path is re-checked against the root before it is used, not only when
//! it is written.

use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use handout_core::error::AppError;
use handout_core::result::AppResult;

/// Strip any directory component from `filename` and replace every
/// character outside `[A-Za-z0-9._-]` with `_`.
///
/// Both `/` and `\` count as separators regardless of platform.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Whether a sanitized name is usable as a stored filename.
///
/// Empty names and names made only of dots (`.`, `..`) are not.
pub fn is_usable_filename(safe_name: &str) -> bool {
    !safe_name.is_empty() && !safe_name.chars().all(|c| c == '.')
}

/// Lower-cased extension of a sanitized name including the leading dot,
/// e.g. `".pdf"`. Names without an extension (or dotfiles like
/// `.bashrc`) yield `None`.
pub fn extension_of(safe_name: &str) -> Option<String> {
    let (stem, ext) = safe_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_ascii_lowercase()))
}

/// Relative location of a version file.
pub fn version_path(owner_id: Uuid, document_id: Uuid, version_number: i32, safe_name: &str) -> String {
    format!("{owner_id}/{document_id}/v{version_number}/{safe_name}")
}

/// Lexically join `relative` onto `root` and require the result to lie
/// strictly inside `root`. No filesystem access.
///
/// `..` components are folded, so `a/../../etc` is caught even when the
/// target does not exist. Absolute inputs and drive prefixes are rejected.
pub fn join_within(root: &Path, relative: &str) -> AppResult<PathBuf> {
    let mut joined = root.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                joined.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(AppError::path_traversal());
                }
                joined.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return Err(AppError::path_traversal()),
        }
    }

    if depth == 0 {
        return Err(AppError::path_traversal());
    }
    Ok(joined)
}

/// Resolve a stored relative path against the canonical storage root.
///
/// The lexical check runs first; the canonical form (with symlinks
/// followed) must then still be strictly inside the root, compared
/// component-wise so `/data2` never passes for `/data`. A path that
/// passes the lexical check but does not exist fails with
/// `NotFoundOnDisk`.
pub async fn resolve_within(canonical_root: &Path, relative: &str) -> AppResult<PathBuf> {
    let joined = join_within(canonical_root, relative)?;

    let canonical = match tokio::fs::canonicalize(&joined).await {
        Ok(p) => p,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::not_found_on_disk("Stored file is missing"));
        }
        Err(e) => return Err(AppError::io("Failed to resolve stored path", e)),
    };

    if !is_strictly_within(canonical_root, &canonical) {
        return Err(AppError::path_traversal());
    }
    Ok(canonical)
}

/// Component-wise containment: `candidate` is below `root` and not equal
/// to it.
pub fn is_strictly_within(root: &Path, candidate: &Path) -> bool {
    candidate != root && candidate.starts_with(root)
}
