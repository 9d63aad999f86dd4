//! Default-export classification.
//!
//! Decided once per module and threaded through both the statement rewriter
//! and the wrapper, so every export action in a module agrees on its form.

use oxc_ast::ast::Statement;

use crate::errors::{FormatError, Result};
use crate::module::{module_export_name, ModuleRecord, DEFAULT_EXPORT};
use crate::options::FormatterOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStrategy {
    /// The lone default export is the last statement: `return value;`
    /// (or `return { default: value };`). No `__exports__` parameter.
    TerminalReturn,
    /// The lone default export sits before other statements:
    /// `__exports__["default"] = value;`
    MidBodyAssign,
    /// Any other export set: `__es6_export__(name, value);`
    RegisteredCall,
}

impl ExportStrategy {
    /// Whether the factory receives the `exports` dependency.
    pub fn uses_exports_object(self) -> bool {
        !matches!(self, ExportStrategy::TerminalReturn)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExportStrategy::TerminalReturn => "terminal-return",
            ExportStrategy::MidBodyAssign => "mid-body-assign",
            ExportStrategy::RegisteredCall => "registered-call",
        }
    }
}

/// True when `stmt` is `export default ...` or a specifier list exporting `default`.
pub fn declares_default_export(stmt: &Statement<'_>) -> bool {
    match stmt {
        Statement::ExportDefaultDeclaration(_) => true,
        Statement::ExportNamedDeclaration(decl) => decl
            .specifiers
            .iter()
            .any(|s| module_export_name(&s.exported) == DEFAULT_EXPORT),
        _ => false,
    }
}

pub fn classify(
    module: &ModuleRecord,
    body: &[Statement<'_>],
    options: &FormatterOptions,
) -> Result<ExportStrategy> {
    let default_statements = body.iter().filter(|s| declares_default_export(s)).count();
    if default_statements > 1 {
        return Err(FormatError::MultipleDefaultExports {
            module: module.name.clone(),
        });
    }

    let exports = &module.exports;
    if !exports.has_name(DEFAULT_EXPORT) {
        return Ok(ExportStrategy::RegisteredCall);
    }

    if exports.declarations.len() > 1 || exports.names.len() > 1 {
        if options.direct_exports {
            return Err(FormatError::DirectExportConflict {
                module: module.name.clone(),
            });
        }
        return Ok(ExportStrategy::RegisteredCall);
    }

    let terminal = body.last().map_or(false, declares_default_export);
    if terminal {
        Ok(ExportStrategy::TerminalReturn)
    } else if options.direct_exports {
        Err(FormatError::NonTerminalDefaultExport {
            module: module.name.clone(),
        })
    } else {
        Ok(ExportStrategy::MidBodyAssign)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{
        ERR_DIRECT_EXPORT_CONFLICT, ERR_MULTIPLE_DEFAULT_EXPORTS, ERR_NON_TERMINAL_DEFAULT_EXPORT,
    };
    use crate::resolver::resolve_module_name;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn classify_source(code: &str, options: FormatterOptions) -> Result<ExportStrategy> {
        let allocator = Allocator::default();
        let source_type = SourceType::default().with_module(true);
        // Duplicate exports may also be reported by the parser; the body is still usable.
        let ret = Parser::new(&allocator, code, source_type).parse();
        let module = ModuleRecord::from_program("m", "m.js", code, &ret.program, |p| {
            resolve_module_name("m", p)
        })?;
        classify(&module, &ret.program.body, &options)
    }

    #[test]
    fn test_no_default_registers_calls() {
        let strategy =
            classify_source("export var a = 1; export function b() {}", FormatterOptions::default());
        assert_eq!(strategy.unwrap(), ExportStrategy::RegisteredCall);

        let strategy = classify_source("var x = 1;", FormatterOptions::default());
        assert_eq!(strategy.unwrap(), ExportStrategy::RegisteredCall);
    }

    #[test]
    fn test_terminal_default_returns() {
        let strategy = classify_source(
            "function foo() {}\nexport default foo;",
            FormatterOptions::default(),
        );
        assert_eq!(strategy.unwrap(), ExportStrategy::TerminalReturn);

        let strategy = classify_source(
            "export default function foo() {}",
            FormatterOptions::new(true, true),
        );
        assert_eq!(strategy.unwrap(), ExportStrategy::TerminalReturn);
    }

    #[test]
    fn test_mid_body_default_assigns() {
        let strategy = classify_source(
            "export default function foo() {}\nfoo.bar = 1;",
            FormatterOptions::default(),
        );
        assert_eq!(strategy.unwrap(), ExportStrategy::MidBodyAssign);
        assert!(!ExportStrategy::TerminalReturn.uses_exports_object());
        assert!(ExportStrategy::MidBodyAssign.uses_exports_object());
    }

    #[test]
    fn test_default_alongside_named_exports_registers() {
        let strategy = classify_source(
            "export var a = 1;\nexport default a;",
            FormatterOptions::default(),
        );
        assert_eq!(strategy.unwrap(), ExportStrategy::RegisteredCall);

        // One specifier list carrying two names.
        let strategy = classify_source(
            "var a = 1, b = 2;\nexport { a as default, b };",
            FormatterOptions::default(),
        );
        assert_eq!(strategy.unwrap(), ExportStrategy::RegisteredCall);
    }

    #[test]
    fn test_specifier_default_is_classified() {
        let strategy = classify_source("var a = 1;\nexport { a as default };", FormatterOptions::default());
        assert_eq!(strategy.unwrap(), ExportStrategy::TerminalReturn);
    }

    #[test]
    fn test_direct_exports_errors() {
        let err = classify_source(
            "export default 1;\nvar after = 2;",
            FormatterOptions::new(true, true),
        )
        .unwrap_err();
        assert_eq!(err.code(), ERR_NON_TERMINAL_DEFAULT_EXPORT);

        let err = classify_source(
            "export var a = 1;\nexport default a;",
            FormatterOptions::new(true, true),
        )
        .unwrap_err();
        assert_eq!(err.code(), ERR_DIRECT_EXPORT_CONFLICT);
    }

    #[test]
    fn test_two_default_statements_fail() {
        let err = classify_source(
            "var a = 1;\nexport { a as default };\nexport default 2;",
            FormatterOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.code(), ERR_MULTIPLE_DEFAULT_EXPORTS);
    }
}
