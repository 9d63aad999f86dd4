//! Finds the `.js` modules below a source root.

use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::errors::Result;

/// Every `.js` file below `root`, as sorted `/`-separated paths relative to it.
pub fn discover_modules(root: &Path) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source root {} is not a directory", root.display()),
        )
        .into());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "js") {
            continue;
        }
        if let Ok(relative) = path.strip_prefix(root) {
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            files.push(parts.join("/"));
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discovers_nested_js_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("lib/util")).unwrap();
        fs::write(dir.path().join("main.js"), "").unwrap();
        fs::write(dir.path().join("lib/util/b.js"), "").unwrap();
        fs::write(dir.path().join("lib/a.js"), "").unwrap();
        fs::write(dir.path().join("lib/readme.md"), "").unwrap();

        let files = discover_modules(dir.path()).unwrap();
        assert_eq!(files, vec!["lib/a.js", "lib/util/b.js", "main.js"]);
    }

    #[test]
    fn test_missing_root_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_modules(&dir.path().join("nope")).unwrap_err();
        assert_eq!(err.code(), "AMD011");
    }
}
