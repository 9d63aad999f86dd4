//! Dependency paths and factory parameters.

use crate::errors::{FormatError, Result};
use crate::module::{DeclarationSet, ModuleRecord};
use crate::options::FormatterOptions;
use crate::resolver::ModuleLookup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Resolved module name; the identity entries are deduplicated by.
    pub module: String,
    /// Path literal as written in the importing module (`./a`).
    pub path: String,
    /// Factory parameter the dependency is bound to.
    pub identifier: String,
    /// The parameter is an imported local itself, not a namespace alias.
    pub direct: bool,
}

/// Parallel dependency and parameter lists: entry `i` of `paths()` binds to
/// entry `i` of `identifiers()`.
#[derive(Debug, Clone, Default)]
pub struct DependencyMeta {
    pub entries: Vec<Dependency>,
}

impl DependencyMeta {
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.path.as_str()).collect()
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.identifier.as_str()).collect()
    }

    pub fn binding_for(&self, module: &str) -> Option<&Dependency> {
        self.entries.iter().find(|d| d.module == module)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Walks imports then exports and emits one entry per distinct source module.
pub fn build_dependencies(
    module: &ModuleRecord,
    lookup: &dyn ModuleLookup,
    options: &FormatterOptions,
) -> Result<DependencyMeta> {
    let mut meta = DependencyMeta::default();

    for (declarations, import_side) in [(&module.imports, true), (&module.exports, false)] {
        collect_side(module, declarations, import_side, lookup, options, &mut meta)?;
    }

    Ok(meta)
}

fn collect_side(
    module: &ModuleRecord,
    declarations: &DeclarationSet,
    import_side: bool,
    lookup: &dyn ModuleLookup,
    options: &FormatterOptions,
    meta: &mut DependencyMeta,
) -> Result<()> {
    for source_module in &declarations.modules {
        if meta.binding_for(source_module).is_some() {
            continue;
        }

        let matching = declarations
            .declaration_for_source(source_module)
            .ok_or_else(|| FormatError::MissingDeclaration {
                module: module.name.clone(),
                source_module: source_module.clone(),
            })?;
        let path = matching.source_path.clone().unwrap_or_else(|| source_module.clone());

        // re-exports read `alias["x"]`, so only imports may bind the local directly
        let dependency = if options.direct_exports && import_side && matching.specifiers.len() == 1 {
            Dependency {
                module: source_module.clone(),
                path,
                identifier: matching.specifiers[0].name.clone(),
                direct: true,
            }
        } else {
            let identifier = lookup
                .module_id(module, &path)
                .ok_or_else(|| FormatError::UnresolvedModule {
                    module: module.name.clone(),
                    source_path: path.clone(),
                })?
                .to_string();
            Dependency {
                module: source_module.clone(),
                path,
                identifier,
                direct: false,
            }
        };

        tracing::trace!(
            module = %module.name,
            dependency = %dependency.path,
            identifier = %dependency.identifier,
            direct = dependency.direct,
            "bound dependency"
        );
        meta.entries.push(dependency);
    }
    Ok(())
}
