//! Wraps a rewritten module body in the AMD registration call:
//!
//! ```text
//! define(["./a", "exports"], function(a$$, __exports__) {
//!     "use strict";
//!     function __es6_export__(name, value) { __exports__[name] = value; }
//!     <prelude>
//!     <body>
//! });
//! ```

use oxc_allocator::Allocator;
use oxc_ast::ast::{Argument, Expression, FunctionBody, Statement};

use crate::classify::ExportStrategy;
use crate::dependencies::DependencyMeta;
use crate::errors::{FormatError, Result};
use crate::module::ModuleRecord;
use crate::options::FormatterOptions;
use crate::snippets::{
    export_helper_source, js_string, parse_statements, EXPORTS_DEPENDENCY, EXPORTS_OBJECT,
};

/// Arguments of the `define()` call, before the factory body is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineSignature {
    pub name: Option<String>,
    pub dependencies: Vec<String>,
    pub parameters: Vec<String>,
    pub export_helper: bool,
}

impl DefineSignature {
    pub fn new(
        module: &ModuleRecord,
        strategy: ExportStrategy,
        dependencies: &DependencyMeta,
        options: &FormatterOptions,
    ) -> Self {
        let mut paths: Vec<String> = dependencies.paths().into_iter().map(String::from).collect();
        let mut parameters: Vec<String> = dependencies
            .identifiers()
            .into_iter()
            .map(String::from)
            .collect();

        // a terminal default export returns its value instead
        if strategy.uses_exports_object() {
            paths.push(EXPORTS_DEPENDENCY.to_string());
            parameters.push(EXPORTS_OBJECT.to_string());
        }

        Self {
            name: options.named_modules.then(|| module.name.clone()),
            dependencies: paths,
            parameters,
            export_helper: strategy.uses_exports_object(),
        }
    }

    /// Source of the call with an empty factory (apart from the prologue).
    pub fn to_source(&self) -> String {
        let mut args = Vec::new();
        if let Some(name) = &self.name {
            args.push(js_string(name));
        }

        let deps: Vec<String> = self.dependencies.iter().map(|d| js_string(d)).collect();
        args.push(format!("[{}]", deps.join(", ")));

        let helper = if self.export_helper {
            export_helper_source()
        } else {
            String::new()
        };
        args.push(format!(
            "function({}) {{\n\"use strict\";\n{}\n}}",
            self.parameters.join(", "),
            helper
        ));

        format!("define({});", args.join(", "))
    }
}

/// Builds the single top-level statement that replaces the module body.
pub fn wrap_module<'a>(
    allocator: &'a Allocator,
    module: &ModuleRecord,
    signature: &DefineSignature,
    body: Vec<Statement<'a>>,
) -> Result<Statement<'a>> {
    let malformed = || FormatError::Parse {
        module: module.name.clone(),
        message: "generated define() call has no factory body".to_string(),
    };

    let mut define = parse_statements(allocator, &module.name, &signature.to_source())?
        .pop()
        .ok_or_else(malformed)?;

    let factory = factory_body(&mut define).ok_or_else(malformed)?;
    for stmt in body {
        factory.statements.push(stmt);
    }
    Ok(define)
}

fn factory_body<'s, 'a>(define: &'s mut Statement<'a>) -> Option<&'s mut FunctionBody<'a>> {
    let Statement::ExpressionStatement(stmt) = define else {
        return None;
    };
    let Expression::CallExpression(call) = &mut stmt.expression else {
        return None;
    };
    match call.arguments.last_mut()? {
        Argument::FunctionExpression(func) => func.body.as_deref_mut(),
        _ => None,
    }
}
