//! Rewrites top-level import/export statements.
//!
//! The rewriter never mutates the body it reads. It produces one `Edit` per
//! statement that changes, keyed by the statement's index, and `apply_edits`
//! assembles the new body from the original plus those edits.

use oxc_allocator::{Allocator, CloneIn};
use oxc_ast::ast::*;

use crate::classify::ExportStrategy;
use crate::dependencies::DependencyMeta;
use crate::errors::{FormatError, Result};
use crate::exports::ExportActions;
use crate::module::{declared_names, module_export_name, ModuleRecord, DEFAULT_EXPORT};
use crate::prelude::re_export_value;

#[derive(Debug)]
pub enum Replacement<'a> {
    Remove,
    Swap(Vec<Statement<'a>>),
}

impl Replacement<'_> {
    pub fn describe(&self) -> &'static str {
        match self {
            Replacement::Remove => "remove",
            Replacement::Swap(statements) if statements.is_empty() => "swap-empty",
            Replacement::Swap(_) => "swap",
        }
    }
}

#[derive(Debug)]
pub struct Edit<'a> {
    pub index: usize,
    pub replacement: Replacement<'a>,
}

pub struct StatementRewriter<'a, 'm> {
    actions: &'m ExportActions<'a>,
    module: &'m ModuleRecord,
    dependencies: &'m DependencyMeta,
}

impl<'a, 'm> StatementRewriter<'a, 'm> {
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

    fn allocator(&self) -> &'a Allocator {
        self.actions.ast.allocator
    }

    pub fn edits(&self, body: &[Statement<'a>]) -> Result<Vec<Edit<'a>>> {
        let mut edits = Vec::new();
        for (index, stmt) in body.iter().enumerate() {
            if let Some(replacement) = self.rewrite_statement(stmt)? {
                tracing::trace!(
                    module = %self.module.name,
                    index,
                    edit = replacement.describe(),
                    "statement edit"
                );
                edits.push(Edit { index, replacement });
            }
        }
        Ok(edits)
    }

    fn rewrite_statement(&self, stmt: &Statement<'a>) -> Result<Option<Replacement<'a>>> {
        match stmt {
            // bindings come from the prelude and the dependency list
            Statement::ImportDeclaration(_) => Ok(Some(Replacement::Remove)),
            Statement::ExportDefaultDeclaration(decl) => self.default_export(decl).map(Some),
            Statement::ExportNamedDeclaration(decl) => self.named_export(decl).map(Some),
            Statement::ExportAllDeclaration(_) => Err(self.unsupported("ExportAllDeclaration")),
            Statement::TSExportAssignment(_) => Err(self.unsupported("TSExportAssignment")),
            Statement::TSNamespaceExportDeclaration(_) => {
                Err(self.unsupported("TSNamespaceExportDeclaration"))
            }
            _ => Ok(None),
        }
    }

    fn default_export(&self, decl: &ExportDefaultDeclaration<'a>) -> Result<Replacement<'a>> {
        match &decl.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                let mut func = func.clone_in(self.allocator());
                let name = func.id.as_ref().map(|id| id.name.to_string());
                match name {
                    // export default function foo() {}  ->  function foo() {}  + export foo
                    Some(name) => Ok(Replacement::Swap(vec![
                        Statement::FunctionDeclaration(func),
                        self.actions
                            .action(DEFAULT_EXPORT, self.actions.identifier(&name)),
                    ])),
                    None => {
                        func.r#type = FunctionType::FunctionExpression;
                        Ok(Replacement::Swap(vec![self
                            .actions
                            .action(DEFAULT_EXPORT, Expression::FunctionExpression(func))]))
                    }
                }
            }
            ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                let mut class = class.clone_in(self.allocator());
                let name = class.id.as_ref().map(|id| id.name.to_string());
                match name {
                    Some(name) => Ok(Replacement::Swap(vec![
                        Statement::ClassDeclaration(class),
                        self.actions
                            .action(DEFAULT_EXPORT, self.actions.identifier(&name)),
                    ])),
                    None => {
                        class.r#type = ClassType::ClassExpression;
                        Ok(Replacement::Swap(vec![self
                            .actions
                            .action(DEFAULT_EXPORT, Expression::ClassExpression(class))]))
                    }
                }
            }
            kind => {
                // export default {foo: 1};
                let value = kind
                    .as_expression()
                    .map(|e| e.clone_in(self.allocator()))
                    .ok_or_else(|| self.unsupported("TSInterfaceDeclaration"))?;
                Ok(Replacement::Swap(vec![self.actions.action(DEFAULT_EXPORT, value)]))
            }
        }
    }

    fn named_export(&self, decl: &ExportNamedDeclaration<'a>) -> Result<Replacement<'a>> {
        if let Some(declaration) = &decl.declaration {
            let kept = match declaration {
                Declaration::VariableDeclaration(var_decl) => {
                    Statement::VariableDeclaration(var_decl.clone_in(self.allocator()))
                }
                Declaration::FunctionDeclaration(func) => {
                    Statement::FunctionDeclaration(func.clone_in(self.allocator()))
                }
                Declaration::ClassDeclaration(class) => {
                    Statement::ClassDeclaration(class.clone_in(self.allocator()))
                }
                other => return Err(self.unsupported(declaration_kind(other))),
            };

            // export var a = 1, b = 2;  ->  var a = 1, b = 2;  + export a, b
            let mut statements = vec![kept];
            for name in declared_names(declaration) {
                statements.push(self.actions.action(&name, self.actions.identifier(&name)));
            }
            return Ok(Replacement::Swap(statements));
        }

        if let Some(source) = &decl.source {
            return self.re_export(decl, source.value.as_str());
        }

        // export { a, b as c };
        let statements = decl
            .specifiers
            .iter()
            .map(|specifier| {
                let exported = module_export_name(&specifier.exported);
                let local = module_export_name(&specifier.local);
                self.actions.action(&exported, self.actions.identifier(&local))
            })
            .collect();
        Ok(Replacement::Swap(statements))
    }

    // export { x } from './a';
    fn re_export(
        &self,
        decl: &ExportNamedDeclaration<'a>,
        source_path: &str,
    ) -> Result<Replacement<'a>> {
        if self.actions.strategy != ExportStrategy::TerminalReturn {
            // registered by the prelude
            return Ok(Replacement::Remove);
        }

        let source = self
            .module
            .exports
            .declarations
            .iter()
            .find(|d| d.source_path.as_deref() == Some(source_path))
            .and_then(|d| d.source.as_deref())
            .ok_or_else(|| FormatError::MissingDeclaration {
                module: self.module.name.clone(),
                source_module: source_path.to_string(),
            })?;

        let mut statements = Vec::new();
        for specifier in &decl.specifiers {
            let exported = module_export_name(&specifier.exported);
            let from = module_export_name(&specifier.local);
            let value = re_export_value(
                self.actions,
                self.module,
                self.dependencies,
                Some(source),
                Some(&from),
            )?;
            statements.push(self.actions.action(&exported, value));
        }
        Ok(Replacement::Swap(statements))
    }

    fn unsupported(&self, found: &str) -> FormatError {
        FormatError::UnsupportedExport {
            module: self.module.name.clone(),
            found: found.to_string(),
        }
    }
}

fn declaration_kind(declaration: &Declaration<'_>) -> &'static str {
    match declaration {
        Declaration::VariableDeclaration(_) => "VariableDeclaration",
        Declaration::FunctionDeclaration(_) => "FunctionDeclaration",
        Declaration::ClassDeclaration(_) => "ClassDeclaration",
        Declaration::TSTypeAliasDeclaration(_) => "TSTypeAliasDeclaration",
        Declaration::TSInterfaceDeclaration(_) => "TSInterfaceDeclaration",
        Declaration::TSEnumDeclaration(_) => "TSEnumDeclaration",
        Declaration::TSModuleDeclaration(_) => "TSModuleDeclaration",
        _ => "TypeScript declaration",
    }
}

/// Builds the rewritten body: statements without an edit are carried over,
/// `Remove` drops the statement and `Swap` splices its replacements in.
pub fn apply_edits<'a>(
    allocator: &'a Allocator,
    body: &[Statement<'a>],
    edits: Vec<Edit<'a>>,
) -> Vec<Statement<'a>> {
    let mut edits = edits.into_iter().peekable();
    let mut rewritten = Vec::with_capacity(body.len());

    for (index, stmt) in body.iter().enumerate() {
        match edits.next_if(|edit| edit.index == index) {
            Some(Edit {
                replacement: Replacement::Swap(statements),
                ..
            }) => rewritten.extend(statements),
            Some(Edit {
                replacement: Replacement::Remove,
                ..
            }) => {}
            None => rewritten.push(stmt.clone_in(allocator)),
        }
    }
    rewritten
}
