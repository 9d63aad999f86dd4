//! Statements placed at the top of the factory body that rebind imported and
//! re-exported names before any module code runs.

use oxc_ast::ast::{Expression, Statement};

use crate::classify::ExportStrategy;
use crate::dependencies::{Dependency, DependencyMeta};
use crate::errors::{FormatError, Result};
use crate::exports::ExportActions;
use crate::module::{ModuleRecord, DEFAULT_EXPORT};
use crate::snippets::var_declaration;

pub struct PreludeBuilder<'a, 'm> {
    actions: &'m ExportActions<'a>,
    module: &'m ModuleRecord,
    dependencies: &'m DependencyMeta,
}

impl<'a, 'm> PreludeBuilder<'a, 'm> {
    pub fn new(
        actions: &'m ExportActions<'a>,
        module: &'m ModuleRecord,
        dependencies: &'m DependencyMeta,
    ) -> Self {
        Self {
            actions,
            module,
            dependencies,
        }
    }

    pub fn build(&self) -> Result<Vec<Statement<'a>>> {
        let mut prelude = Vec::new();
        self.push_imports(&mut prelude)?;
        self.push_re_exports(&mut prelude)?;
        Ok(prelude)
    }

    // import { value } from './a';  ->  var value; value = a$$["value"];
    fn push_imports(&self, prelude: &mut Vec<Statement<'a>>) -> Result<()> {
        let imports = &self.module.imports;
        for name in &imports.names {
            let Some(specifier) = imports.find_specifier_by_name(name) else {
                continue;
            };
            let binding = self.binding(imports.declaration_of(specifier).source.as_deref())?;
            if binding.direct {
                // the factory parameter already is this local
                continue;
            }

            prelude.push(var_declaration(self.actions.ast.allocator, &self.module.name, &specifier.name)?);

            let value = match specifier.from.as_deref() {
                Some(DEFAULT_EXPORT) if self.actions.direct_exports => {
                    self.actions.identifier(&binding.identifier)
                }
                Some(from) => self.actions.computed_member(&binding.identifier, from),
                // import * as ns from './a';
                None => self.actions.identifier(&binding.identifier),
            };
            prelude.push(self.actions.assign_identifier(&specifier.name, value));
        }
        Ok(())
    }

    // export { x } from './a';  ->  __es6_export__("x", a$$["x"]);
    fn push_re_exports(&self, prelude: &mut Vec<Statement<'a>>) -> Result<()> {
        if self.actions.strategy == ExportStrategy::TerminalReturn {
            // the return is emitted where the declaration stood
            return Ok(());
        }

        let exports = &self.module.exports;
        for name in &exports.names {
            let Some(specifier) = exports.find_specifier_by_name(name) else {
                continue;
            };
            let declaration = exports.declaration_of(specifier);
            if !declaration.has_source() {
                continue;
            }
            let value = re_export_value(
                self.actions,
                self.module,
                self.dependencies,
                declaration.source.as_deref(),
                specifier.from.as_deref(),
            )?;
            prelude.push(self.actions.action(&specifier.name, value));
        }
        Ok(())
    }

    fn binding(&self, source: Option<&str>) -> Result<&'m Dependency> {
        binding_for(self.module, self.dependencies, source)
    }
}

/// `alias["from"]`, the value of a name re-exported from `source`.
pub fn re_export_value<'a>(
    actions: &ExportActions<'a>,
    module: &ModuleRecord,
    dependencies: &DependencyMeta,
    source: Option<&str>,
    from: Option<&str>,
) -> Result<Expression<'a>> {
    let binding = binding_for(module, dependencies, source)?;
    Ok(actions.computed_member(&binding.identifier, from.unwrap_or(DEFAULT_EXPORT)))
}

fn binding_for<'d>(
    module: &ModuleRecord,
    dependencies: &'d DependencyMeta,
    source: Option<&str>,
) -> Result<&'d Dependency> {
    let source = source.unwrap_or_default();
    dependencies
        .binding_for(source)
        .ok_or_else(|| FormatError::MissingDeclaration {
            module: module.name.clone(),
            source_module: source.to_string(),
        })
}
