//! Per-module pipeline and the parallel batch driver.

#[cfg(feature = "napi")]
use napi_derive::napi;
use oxc_allocator::Allocator;
use oxc_ast::ast::{BindingIdentifier, IdentifierReference, Program};
use oxc_ast::AstBuilder;
use oxc_ast_visit::Visit;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_span::SourceType;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::classify::classify;
use crate::dependencies::build_dependencies;
use crate::errors::{FormatError, Result};
use crate::exports::ExportActions;
use crate::graph::ModuleGraph;
use crate::module::ModuleRecord;
use crate::options::FormatterOptions;
use crate::prelude::PreludeBuilder;
use crate::resolver::ModuleLookup;
use crate::rewrite::{apply_edits, StatementRewriter};
use crate::snippets::{EXPORTS_OBJECT, EXPORT_HELPER};
use crate::wrapper::{wrap_module, DefineSignature};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct FormattedModule {
    pub name: String,
    pub filename: String,
    pub code: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AmdFormatter {
    pub options: FormatterOptions,
}

impl AmdFormatter {
    pub fn new(options: FormatterOptions) -> Self {
        Self { options }
    }

    /// Formats every non-external module of the graph, in execution order.
    pub fn build(&self, graph: &ModuleGraph) -> Result<Vec<FormattedModule>> {
        self.build_modules(graph.modules(), graph)
    }

    pub fn build_modules(
        &self,
        modules: &[ModuleRecord],
        lookup: &dyn ModuleLookup,
    ) -> Result<Vec<FormattedModule>> {
        modules
            .par_iter()
            .filter(|module| !module.is_external())
            .map(|module| self.format_module(module, lookup))
            .collect()
    }

    pub fn format_module(
        &self,
        module: &ModuleRecord,
        lookup: &dyn ModuleLookup,
    ) -> Result<FormattedModule> {
        let Some(source) = module.source.as_deref() else {
            return Err(FormatError::ModuleNotFound {
                module: module.name.clone(),
                name: module.name.clone(),
            });
        };

        let allocator = Allocator::default();
        let source_type = SourceType::default().with_module(true);
        let ret = Parser::new(&allocator, source, source_type).parse();
        if !ret.errors.is_empty() {
            let message = ret
                .errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FormatError::Parse {
                module: module.name.clone(),
                message,
            });
        }
        let mut program = ret.program;

        check_reserved_identifiers(module, &program)?;

        let strategy = classify(module, &program.body, &self.options)?;
        let dependencies = build_dependencies(module, lookup, &self.options)?;

        let ast = AstBuilder::new(&allocator);
        let actions = ExportActions::new(ast, strategy, self.options.direct_exports);

        let mut body = PreludeBuilder::new(&actions, module, &dependencies).build()?;
        let edits = StatementRewriter::new(&actions, module, &dependencies).edits(&program.body)?;
        body.extend(apply_edits(&allocator, &program.body, edits));

        let signature = DefineSignature::new(module, strategy, &dependencies, &self.options);
        let define = wrap_module(&allocator, module, &signature, body)?;

        program.body = ast.vec();
        program.body.push(define);
        program.directives = ast.vec();
        program.hashbang = None;
        program.comments = ast.vec();

        let code = Codegen::new().build(&program).code;

        tracing::debug!(
            module = %module.name,
            strategy = strategy.as_str(),
            dependencies = dependencies.len(),
            "formatted module"
        );

        Ok(FormattedModule {
            name: module.name.clone(),
            filename: module.relative_path.clone(),
            code,
        })
    }
}

/// Collects every use of the names the generated factory reserves.
#[derive(Default)]
struct ReservedNameCollector {
    found: Option<String>,
}

impl ReservedNameCollector {
    fn check(&mut self, name: &str) {
        if self.found.is_none() && (name == EXPORT_HELPER || name == EXPORTS_OBJECT) {
            self.found = Some(name.to_string());
        }
    }
}

impl<'a> Visit<'a> for ReservedNameCollector {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        self.check(&ident.name);
    }

    fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
        self.check(&ident.name);
    }
}

fn check_reserved_identifiers(module: &ModuleRecord, program: &Program<'_>) -> Result<()> {
    let mut collector = ReservedNameCollector::default();
    collector.visit_program(program);
    match collector.found {
        Some(name) => Err(FormatError::ReservedIdentifier {
            module: module.name.clone(),
            name,
        }),
        None => Ok(()),
    }
}
