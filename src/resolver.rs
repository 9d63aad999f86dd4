//! Module names, stable module identifiers and the lookup seam used by the formatter.

use lazy_static::lazy_static;
use oxc_syntax::identifier::is_identifier_name;
use regex::Regex;

use crate::module::ModuleRecord;

lazy_static! {
    static ref NON_IDENTIFIER_CHAR: Regex = Regex::new(r"[^A-Za-z0-9_$]").unwrap();
}

/// Read-only view of already-resolved modules.
///
/// The formatter never owns module naming: it asks the lookup for the record
/// a source path refers to and uses that record's identifier.
pub trait ModuleLookup: Sync {
    fn lookup(&self, importer: &ModuleRecord, source_path: &str) -> Option<&ModuleRecord>;

    /// Stable identifier of the module `source_path` refers to from `importer`.
    fn module_id(&self, importer: &ModuleRecord, source_path: &str) -> Option<&str> {
        self.lookup(importer, source_path)
            .map(|module| module.id.as_str())
    }
}

/// Derives the identifier a module is bound to inside dependent factories.
///
/// `rsvp/defer` becomes `rsvp$defer$$`. The trailing `$$` keeps these names
/// apart from `__es6_export__` and `__exports__`.
pub fn module_id(name: &str) -> String {
    let mut id = NON_IDENTIFIER_CHAR.replace_all(name, "$").into_owned();
    id.push_str("$$");
    if !is_identifier_name(&id) {
        id.insert(0, '_');
    }
    id
}

pub fn is_relative(source_path: &str) -> bool {
    source_path.starts_with("./") || source_path.starts_with("../") || source_path == "." || source_path == ".."
}

/// Resolves `source_path` as written in `importer_name` to a module name.
///
/// Relative paths are joined onto the importer's directory, bare paths are
/// names already. A trailing `.js` is dropped either way.
pub fn resolve_module_name(importer_name: &str, source_path: &str) -> String {
    if !is_relative(source_path) {
        return strip_js_extension(source_path).to_string();
    }

    let mut segments: Vec<&str> = importer_name.split('/').collect();
    // drop the importer's own file name
    segments.pop();

    for part in source_path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if segments.last().map_or(true, |s| *s == "..") {
                    segments.push("..");
                } else {
                    segments.pop();
                }
            }
            _ => segments.push(part),
        }
    }

    strip_js_extension(&segments.join("/")).to_string()
}

pub fn module_name_from_path(relative_path: &str) -> String {
    strip_js_extension(&relative_path.replace('\\', "/")).to_string()
}

fn strip_js_extension(path: &str) -> &str {
    path.strip_suffix(".js").unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_id_sanitizes_paths() {
        assert_eq!(module_id("rsvp/defer"), "rsvp$defer$$");
        assert_eq!(module_id("test/fixtures/a"), "test$fixtures$a$$");
        assert_eq!(module_id("my-lib.core"), "my$lib$core$$");
        assert_eq!(module_id("1"), "_1$$");
    }

    #[test]
    fn test_module_ids_never_collide_with_reserved_names() {
        for name in ["__exports__", "__es6_export__", "exports"] {
            let id = module_id(name);
            assert_ne!(id, "__exports__");
            assert_ne!(id, "__es6_export__");
        }
    }

    #[test]
    fn test_resolve_relative_paths() {
        assert_eq!(resolve_module_name("test/fixtures/2", "./1"), "test/fixtures/1");
        assert_eq!(resolve_module_name("test/fixtures/2", "../lib/x.js"), "test/lib/x");
        assert_eq!(resolve_module_name("main", "./a"), "a");
        assert_eq!(resolve_module_name("main", "../a"), "../a");
        assert_eq!(resolve_module_name("a/b/c", "./../../d"), "d");
    }

    #[test]
    fn test_resolve_bare_paths() {
        assert_eq!(resolve_module_name("test/fixtures/9", "assert"), "assert");
        assert_eq!(resolve_module_name("x", "vendor/jquery.js"), "vendor/jquery");
    }

    #[test]
    fn test_module_name_from_path() {
        assert_eq!(module_name_from_path("test/fixtures/1.js"), "test/fixtures/1");
        assert_eq!(module_name_from_path("lib\\util.js"), "lib/util");
    }
}
