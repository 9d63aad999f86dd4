//! Fixed JavaScript fragments parsed straight into a module's arena.

use oxc_allocator::{Allocator, CloneIn};
use oxc_ast::ast::Statement;
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::errors::{FormatError, Result};

pub const EXPORT_HELPER: &str = "__es6_export__";
pub const EXPORTS_OBJECT: &str = "__exports__";
pub const EXPORTS_DEPENDENCY: &str = "exports";

/// `function __es6_export__(name, value) { __exports__[name] = value; }`
pub fn export_helper_source() -> String {
    format!(
        "function {EXPORT_HELPER}(name, value) {{ {EXPORTS_OBJECT}[name] = value; }}"
    )
}

/// Parses `code` and returns its top-level statements allocated in `allocator`.
pub fn parse_statements<'a>(
    allocator: &'a Allocator,
    module: &str,
    code: &str,
) -> Result<Vec<Statement<'a>>> {
    let text: &'a str = allocator.alloc_str(code);
    let ret = Parser::new(allocator, text, SourceType::default()).parse();
    if !ret.errors.is_empty() {
        return Err(FormatError::Parse {
            module: module.to_string(),
            message: format!("generated fragment `{}`: {:?}", code, ret.errors),
        });
    }
    Ok(ret
        .program
        .body
        .iter()
        .map(|stmt| stmt.clone_in(allocator))
        .collect())
}

/// `var name;`
pub fn var_declaration<'a>(
    allocator: &'a Allocator,
    module: &str,
    name: &str,
) -> Result<Statement<'a>> {
    parse_statements(allocator, module, &format!("var {};", name))?
        .pop()
        .ok_or_else(|| FormatError::Parse {
            module: module.to_string(),
            message: format!("empty declaration for `{}`", name),
        })
}

/// Quotes `value` as a JavaScript string literal.
pub fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_declaration() {
        let allocator = Allocator::default();
        let stmt = var_declaration(&allocator, "m", "value").unwrap();
        assert!(matches!(stmt, Statement::VariableDeclaration(_)));
    }

    #[test]
    fn test_helper_parses_as_function() {
        let allocator = Allocator::default();
        let stmts = parse_statements(&allocator, "m", &export_helper_source()).unwrap();
        assert_eq!(stmts.len(), 1);
        assert!(matches!(stmts[0], Statement::FunctionDeclaration(_)));
    }

    #[test]
    fn test_invalid_fragment_is_a_parse_error() {
        let allocator = Allocator::default();
        let err = parse_statements(&allocator, "m", "var ;").unwrap_err();
        assert_eq!(err.code(), crate::errors::ERR_PARSE);
    }

    #[test]
    fn test_js_string_escapes() {
        assert_eq!(js_string("./a"), "\"./a\"");
        assert_eq!(js_string("we\"ird"), "\"we\\\"ird\"");
    }
}
