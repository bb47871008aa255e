//! Directory walk that finds module files under a root.
//!
//! Equivalent of the `**/*.<ext>` glob: every regular file with the given
//! extension, at any depth, reported as a `/`-joined module path relative to
//! the root with the extension stripped (`users/profile.rs` → `users/profile`).

use std::io;
use std::path::{Path, PathBuf};

/// Guard against symlink cycles.
const MAX_WALK_DEPTH: usize = 32;

/// Walk `root` and return module paths in lexicographic order.
///
/// A missing root yields an empty list.
pub async fn discover_modules(root: &Path, extension: &str) -> io::Result<Vec<String>> {
    let mut found = Vec::new();
    let mut pending: Vec<(PathBuf, usize)> = vec![(root.to_path_buf(), 0)];

    while let Some((dir, depth)) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound && depth == 0 => {
                tracing::debug!(root = %root.display(), "Module root does not exist");
                return Ok(found);
            }
            Err(e) => return Err(e),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            // Follows symlinks.
            let meta = match tokio::fs::metadata(&path).await {
                Ok(meta) => meta,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            if meta.is_dir() {
                if depth + 1 < MAX_WALK_DEPTH {
                    pending.push((path, depth + 1));
                }
            } else if meta.is_file() && path.extension().is_some_and(|ext| ext == extension) {
                if let Some(module) = module_path(root, &path) {
                    found.push(module);
                }
            }
        }
    }

    found.sort();
    Ok(found)
}

/// `root/a/b.rs` → `a/b`.
pub fn module_path(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    (!parts.is_empty()).then(|| parts.join("/"))
}
