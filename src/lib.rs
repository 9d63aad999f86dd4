//! # AMD Module Formatter
//!
//! Rewrites ES modules into AMD `define()` registrations.
//!
//! ## Output Shapes
//!
//! 1. **Registered exports**: a module with named exports (or a default export
//!    next to other exports) receives the `exports` dependency and registers
//!    every binding through `__es6_export__("name", value)`.
//!
//! 2. **Mid-body default**: a lone default export that is followed by other
//!    statements is assigned as `__exports__["default"] = value`.
//!
//! 3. **Terminal default**: a lone default export in last position becomes
//!    `return { default: value };`, or `return value;` with direct exports.
//!    No `exports` dependency is requested.
//!
//! ## Bindings
//!
//! Every dependency is passed to the factory as a parameter derived from its
//! module name (`test/fixtures/a` → `test$fixtures$a$$`). Imported names are
//! re-bound at the top of the factory (`var a; a = test$fixtures$a$$["a"];`)
//! before any module code runs.
//!
//! With direct exports, an import declaration with a single specifier binds
//! the imported local straight to the factory parameter.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod classify;
mod dependencies;
mod discovery;
mod errors;
mod exports;
mod formatter;
mod graph;
mod module;
mod options;
mod prelude;
mod resolver;
mod rewrite;
mod snippets;
mod wrapper;


pub use classify::{classify, ExportStrategy};
pub use dependencies::{build_dependencies, Dependency, DependencyMeta};
pub use discovery::discover_modules;
pub use errors::*;
pub use formatter::{AmdFormatter, FormattedModule};
pub use graph::{FileSystemSources, MemorySources, ModuleGraph, SourceProvider};
pub use module::{DeclarationKind, DeclarationRecord, DeclarationSet, ModuleRecord, Specifier};
pub use options::{FormatterConfig, FormatterOptions, DIRECT_EXPORTS_ENV, NAMED_MODULES_ENV};
pub use resolver::{module_id, resolve_module_name, ModuleLookup};

/// Loads every given path as an entry and formats the resulting graph.
pub fn format_sources(
    sources: MemorySources,
    options: FormatterOptions,
) -> Result<Vec<FormattedModule>> {
    let graph = ModuleGraph::load(&sources, &sources.paths())?;
    AmdFormatter::new(options).build(&graph)
}

#[cfg(feature = "napi")]
fn to_napi_error(err: FormatError) -> napi::Error {
    napi::Error::from_reason(format!("[{}] {}", err.code(), err))
}

/// `sources_json` maps relative paths to module source text.
#[cfg(feature = "napi")]
#[napi]
pub fn format_modules_native(
    sources_json: String,
    options_json: Option<String>,
) -> napi::Result<Vec<FormattedModule>> {
    let sources: std::collections::HashMap<String, String> = serde_json::from_str(&sources_json)
        .map_err(|e| napi::Error::from_reason(format!("Sources parse error: {}", e)))?;
    let config = match options_json {
        Some(json) => FormatterConfig::from_json(&json).map_err(to_napi_error)?,
        None => FormatterConfig::default(),
    };

    format_sources(MemorySources::new(sources), config.resolve()).map_err(to_napi_error)
}

#[cfg(feature = "napi")]
#[napi]
pub fn amd_formatter_bridge() -> String {
    "AMD Formatter Native Bridge Connected".to_string()
}
