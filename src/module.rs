//! Module records and their import/export declaration collections.
//!
//! Records are built once from a parsed program and are read-only afterwards.
//! They hold owned data only, so a record can cross threads while each
//! formatting pass re-parses the source into its own arena.

use oxc_ast::ast::*;
use serde::{Deserialize, Serialize};

use crate::errors::{FormatError, Result};

pub const DEFAULT_EXPORT: &str = "default";

/// A single binding introduced by an import or export declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specifier {
    /// Local binding for imports, exported name for exports.
    pub name: String,
    /// Name on the other side: the imported name, the re-exported source name,
    /// or the local identifier of a local export. `None` is a namespace import.
    pub from: Option<String>,
    /// Index of the owning record in its `DeclarationSet`.
    pub declaration: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    Import,
    /// `export default ...`
    DefaultExport,
    /// `export var/function/class ...`
    DeclarationExport,
    /// `export { a, b as c }`
    SpecifierExport,
    /// `export { a } from './x'`
    ReExport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationRecord {
    pub kind: DeclarationKind,
    pub specifiers: Vec<Specifier>,
    /// Source path as written (`./a`).
    pub source_path: Option<String>,
    /// Name of the resolved source module; identity for deduplication.
    pub source: Option<String>,
    /// Index of the first statement that contributed to this record.
    pub statement: usize,
}

impl DeclarationRecord {
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationSet {
    /// Distinct resolved source modules, in first-appearance order.
    pub modules: Vec<String>,
    pub declarations: Vec<DeclarationRecord>,
    /// Imported local names or exported names, in declaration order.
    pub names: Vec<String>,
}

impl DeclarationSet {
    pub fn find_specifier_by_name(&self, name: &str) -> Option<&Specifier> {
        self.declarations
            .iter()
            .flat_map(|declaration| declaration.specifiers.iter())
            .find(|specifier| specifier.name == name)
    }

    pub fn declaration_of(&self, specifier: &Specifier) -> &DeclarationRecord {
        &self.declarations[specifier.declaration]
    }

    pub fn declaration_for_source(&self, module_name: &str) -> Option<&DeclarationRecord> {
        self.declarations
            .iter()
            .find(|declaration| declaration.source.as_deref() == Some(module_name))
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    fn add_sourced(
        &mut self,
        kind: DeclarationKind,
        source_path: &str,
        source: String,
        statement: usize,
    ) -> usize {
        if let Some(index) = self
            .declarations
            .iter()
            .position(|d| d.source.as_deref() == Some(source.as_str()))
        {
            return index;
        }
        self.modules.push(source.clone());
        self.declarations.push(DeclarationRecord {
            kind,
            specifiers: Vec::new(),
            source_path: Some(source_path.to_string()),
            source: Some(source),
            statement,
        });
        self.declarations.len() - 1
    }

    fn add_local(&mut self, kind: DeclarationKind, statement: usize) -> usize {
        self.declarations.push(DeclarationRecord {
            kind,
            specifiers: Vec::new(),
            source_path: None,
            source: None,
            statement,
        });
        self.declarations.len() - 1
    }

    fn push_specifier(&mut self, declaration: usize, name: String, from: Option<String>) {
        self.names.push(name.clone());
        self.declarations[declaration].specifiers.push(Specifier {
            name,
            from,
            declaration,
        });
    }
}

/// A module as the formatter sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    /// Stable identifier other modules bind this one to.
    pub id: String,
    /// Module name, also the AMD name (`test/fixtures/1`).
    pub name: String,
    /// Path relative to the source root (`test/fixtures/1.js`).
    pub relative_path: String,
    /// `None` for external modules that are referenced but never formatted.
    pub source: Option<String>,
    pub imports: DeclarationSet,
    pub exports: DeclarationSet,
}

impl ModuleRecord {
    pub fn external(name: &str) -> Self {
        Self {
            id: crate::resolver::module_id(name),
            name: name.to_string(),
            relative_path: name.to_string(),
            source: None,
            imports: DeclarationSet::default(),
            exports: DeclarationSet::default(),
        }
    }

    pub fn is_external(&self) -> bool {
        self.source.is_none()
    }

    /// Builds a record from an already parsed program.
    ///
    /// `resolve` maps a source path as written to the name of the module it
    /// refers to.
    pub fn from_program(
        name: &str,
        relative_path: &str,
        source: &str,
        program: &Program<'_>,
        resolve: impl Fn(&str) -> String,
    ) -> Result<Self> {
        let mut imports = DeclarationSet::default();
        let mut exports = DeclarationSet::default();

        for (index, stmt) in program.body.iter().enumerate() {
            match stmt {
                Statement::ImportDeclaration(decl) => {
                    collect_import(&mut imports, decl, index, &resolve);
                }
                Statement::ExportDefaultDeclaration(decl) => {
                    let local = match &decl.declaration {
                        ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                            func.id.as_ref().map(|id| id.name.to_string())
                        }
                        ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                            class.id.as_ref().map(|id| id.name.to_string())
                        }
                        _ => None,
                    };
                    check_unique(&exports, name, DEFAULT_EXPORT)?;
                    let record = exports.add_local(DeclarationKind::DefaultExport, index);
                    exports.push_specifier(record, DEFAULT_EXPORT.to_string(), local);
                }
                Statement::ExportNamedDeclaration(decl) => {
                    collect_named_export(&mut exports, decl, index, name, &resolve)?;
                }
                _ => {}
            }
        }

        Ok(Self {
            id: crate::resolver::module_id(name),
            name: name.to_string(),
            relative_path: relative_path.to_string(),
            source: Some(source.to_string()),
            imports,
            exports,
        })
    }
}

fn collect_import(
    imports: &mut DeclarationSet,
    decl: &ImportDeclaration<'_>,
    index: usize,
    resolve: &impl Fn(&str) -> String,
) {
    let source_path = decl.source.value.as_str();
    let record = imports.add_sourced(DeclarationKind::Import, source_path, resolve(source_path), index);

    let Some(specifiers) = &decl.specifiers else {
        // import './polyfill';
        return;
    };
    for specifier in specifiers {
        match specifier {
            ImportDeclarationSpecifier::ImportSpecifier(s) => {
                imports.push_specifier(
                    record,
                    s.local.name.to_string(),
                    Some(module_export_name(&s.imported)),
                );
            }
            ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                imports.push_specifier(
                    record,
                    s.local.name.to_string(),
                    Some(DEFAULT_EXPORT.to_string()),
                );
            }
            ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                imports.push_specifier(record, s.local.name.to_string(), None);
            }
        }
    }
}

fn collect_named_export(
    exports: &mut DeclarationSet,
    decl: &ExportNamedDeclaration<'_>,
    index: usize,
    module_name: &str,
    resolve: &impl Fn(&str) -> String,
) -> Result<()> {
    if let Some(declaration) = &decl.declaration {
        let names = declared_names(declaration);
        if names.is_empty() {
            // TypeScript-only or otherwise unsupported; the rewriter reports it.
            return Ok(());
        }
        let record = exports.add_local(DeclarationKind::DeclarationExport, index);
        for local in names {
            check_unique(exports, module_name, &local)?;
            exports.push_specifier(record, local.clone(), Some(local));
        }
        return Ok(());
    }

    let record = match &decl.source {
        Some(source) => {
            let source_path = source.value.as_str();
            exports.add_sourced(DeclarationKind::ReExport, source_path, resolve(source_path), index)
        }
        None => exports.add_local(DeclarationKind::SpecifierExport, index),
    };
    for specifier in &decl.specifiers {
        let exported = module_export_name(&specifier.exported);
        check_unique(exports, module_name, &exported)?;
        exports.push_specifier(record, exported, Some(module_export_name(&specifier.local)));
    }
    Ok(())
}

fn check_unique(exports: &DeclarationSet, module_name: &str, exported: &str) -> Result<()> {
    if !exports.has_name(exported) {
        return Ok(());
    }
    if exported == DEFAULT_EXPORT {
        return Err(FormatError::MultipleDefaultExports {
            module: module_name.to_string(),
        });
    }
    Err(FormatError::DuplicateExport {
        module: module_name.to_string(),
        name: exported.to_string(),
    })
}

pub fn module_export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.to_string(),
        ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        ModuleExportName::StringLiteral(s) => s.value.to_string(),
    }
}

/// Names bound by an exportable declaration, in source order.
pub fn declared_names(declaration: &Declaration<'_>) -> Vec<String> {
    let mut names = Vec::new();
    match declaration {
        Declaration::VariableDeclaration(var_decl) => {
            for declarator in &var_decl.declarations {
                collect_binding_names(&declarator.id, &mut names);
            }
        }
        Declaration::FunctionDeclaration(func) => {
            if let Some(id) = &func.id {
                names.push(id.name.to_string());
            }
        }
        Declaration::ClassDeclaration(class) => {
            if let Some(id) = &class.id {
                names.push(id.name.to_string());
            }
        }
        _ => {}
    }
    names
}

pub fn collect_binding_names(pattern: &BindingPattern<'_>, names: &mut Vec<String>) {
    match pattern {
        BindingPattern::BindingIdentifier(id) => names.push(id.name.to_string()),
        BindingPattern::ObjectPattern(obj) => {
            for prop in &obj.properties {
                collect_binding_names(&prop.value, names);
            }
            if let Some(rest) = &obj.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        BindingPattern::ArrayPattern(arr) => {
            for elem in arr.elements.iter().flatten() {
                collect_binding_names(elem, names);
            }
            if let Some(rest) = &arr.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        BindingPattern::AssignmentPattern(assign) => collect_binding_names(&assign.left, names),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve_module_name;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn collect(name: &str, code: &str) -> Result<ModuleRecord> {
        let allocator = Allocator::default();
        // duplicate exports may also be reported by the parser; collection has its own check
        let ret = Parser::new(&allocator, code, SourceType::default().with_module(true)).parse();
        ModuleRecord::from_program(name, &format!("{name}.js"), code, &ret.program, |path| {
            resolve_module_name(name, path)
        })
    }

    #[test]
    fn test_import_specifier_kinds() {
        let record = collect(
            "lib/m",
            "import a, { b as c } from './x';\nimport * as ns from '../y';\nimport './z';",
        )
        .unwrap();
        let imports = &record.imports;
        assert_eq!(imports.modules, vec!["lib/x", "y", "lib/z"]);
        assert_eq!(imports.names, vec!["a", "c", "ns"]);

        let a = imports.find_specifier_by_name("a").unwrap();
        assert_eq!(a.from.as_deref(), Some(DEFAULT_EXPORT));
        let c = imports.find_specifier_by_name("c").unwrap();
        assert_eq!(c.from.as_deref(), Some("b"));
        let ns = imports.find_specifier_by_name("ns").unwrap();
        assert_eq!(ns.from, None);
        assert_eq!(imports.declaration_of(ns).source_path.as_deref(), Some("../y"));

        let side_effect = imports.declaration_for_source("lib/z").unwrap();
        assert!(side_effect.specifiers.is_empty());
    }

    #[test]
    fn test_sourced_declarations_are_merged() {
        let record = collect(
            "m",
            "import { a } from './x';\nimport { b } from './x.js';\nexport { c } from './x';\nexport { d } from './x';",
        )
        .unwrap();
        assert_eq!(record.imports.declarations.len(), 1);
        assert_eq!(record.imports.declarations[0].specifiers.len(), 2);
        assert_eq!(record.exports.declarations.len(), 1);
        assert_eq!(record.exports.declarations[0].kind, DeclarationKind::ReExport);
        assert_eq!(record.exports.modules, vec!["x"]);
    }

    #[test]
    fn test_export_kinds() {
        let record = collect(
            "m",
            "export var a = 1, { b, c: [d] } = o;\nexport function f() {}\nexport class K {}\nvar g;\nexport { g as h };\nexport default function main() {}",
        )
        .unwrap();
        let exports = &record.exports;
        assert_eq!(exports.names, vec!["a", "b", "d", "f", "K", "h", "default"]);

        let h = exports.find_specifier_by_name("h").unwrap();
        assert_eq!(h.from.as_deref(), Some("g"));
        assert_eq!(exports.declaration_of(h).kind, DeclarationKind::SpecifierExport);

        let default = exports.find_specifier_by_name(DEFAULT_EXPORT).unwrap();
        assert_eq!(default.from.as_deref(), Some("main"));
        assert_eq!(exports.declaration_of(default).statement, 5);
        assert!(!exports.declaration_of(default).has_source());
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let err = collect("m", "export var a = 1;\nvar b;\nexport { b as a };").unwrap_err();
        assert_eq!(err.code(), "AMD008");

        let err = collect("m", "export default 1;\nvar x;\nexport { x as default };").unwrap_err();
        assert_eq!(err.code(), "AMD001");
    }

    #[test]
    fn test_external_record() {
        let record = ModuleRecord::external("vendor/jquery");
        assert!(record.is_external());
        assert_eq!(record.id, "vendor$jquery$$");
        assert!(record.imports.modules.is_empty());
    }
}
