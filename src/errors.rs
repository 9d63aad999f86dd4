use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_MULTIPLE_DEFAULT_EXPORTS: &str = "AMD001";
pub const ERR_NON_TERMINAL_DEFAULT_EXPORT: &str = "AMD002";
pub const ERR_DIRECT_EXPORT_CONFLICT: &str = "AMD003";
pub const ERR_UNSUPPORTED_EXPORT: &str = "AMD004";
pub const ERR_MISSING_DECLARATION: &str = "AMD005";
pub const ERR_UNRESOLVED_MODULE: &str = "AMD006";
pub const ERR_PARSE: &str = "AMD007";
pub const ERR_DUPLICATE_EXPORT: &str = "AMD008";
pub const ERR_RESERVED_IDENTIFIER: &str = "AMD009";
pub const ERR_MODULE_NOT_FOUND: &str = "AMD010";
pub const ERR_IO: &str = "AMD011";

pub type Result<T> = std::result::Result<T, FormatError>;

/// Every variant is fatal for the module being formatted and therefore for its batch.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("more than one default export detected in `{module}`")]
    MultipleDefaultExports { module: String },

    #[error("a default export before the end of module detected in `{module}`")]
    NonTerminalDefaultExport { module: String },

    #[error("`{module}` combines a default export with other exports, which direct exports cannot express")]
    DirectExportConflict { module: String },

    #[error("unexpected export style in `{module}`, found: {found}")]
    UnsupportedExport { module: String, found: String },

    #[error("no matching declaration for source module `{source_module}` in `{module}`")]
    MissingDeclaration {
        module: String,
        source_module: String,
    },

    #[error("cannot resolve `{source_path}` imported by `{module}`")]
    UnresolvedModule { module: String, source_path: String },

    #[error("failed to parse `{module}`: {message}")]
    Parse { module: String, message: String },

    #[error("export `{name}` is declared more than once in `{module}`")]
    DuplicateExport { module: String, name: String },

    #[error("`{module}` uses the reserved identifier `{name}`")]
    ReservedIdentifier { module: String, name: String },

    #[error("module `{name}` not found (required by `{module}`)")]
    ModuleNotFound { module: String, name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormatError {
    pub fn code(&self) -> &'static str {
        match self {
            FormatError::MultipleDefaultExports { .. } => ERR_MULTIPLE_DEFAULT_EXPORTS,
            FormatError::NonTerminalDefaultExport { .. } => ERR_NON_TERMINAL_DEFAULT_EXPORT,
            FormatError::DirectExportConflict { .. } => ERR_DIRECT_EXPORT_CONFLICT,
            FormatError::UnsupportedExport { .. } => ERR_UNSUPPORTED_EXPORT,
            FormatError::MissingDeclaration { .. } => ERR_MISSING_DECLARATION,
            FormatError::UnresolvedModule { .. } => ERR_UNRESOLVED_MODULE,
            FormatError::Parse { .. } => ERR_PARSE,
            FormatError::DuplicateExport { .. } => ERR_DUPLICATE_EXPORT,
            FormatError::ReservedIdentifier { .. } => ERR_RESERVED_IDENTIFIER,
            FormatError::ModuleNotFound { .. } => ERR_MODULE_NOT_FOUND,
            FormatError::Io(_) => ERR_IO,
        }
    }

    /// The property of the output that this error protects.
    pub fn guarantee(&self) -> &'static str {
        get_guarantee(self.code())
    }
}

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_MULTIPLE_DEFAULT_EXPORTS => "A module exports at most one default value.",
        ERR_NON_TERMINAL_DEFAULT_EXPORT => {
            "Direct exports return the default value only from the last statement."
        }
        ERR_DIRECT_EXPORT_CONFLICT => {
            "Direct exports are used only when the default export is the sole export."
        }
        ERR_UNSUPPORTED_EXPORT => {
            "Every export is a declaration or a specifier list the AMD form can register."
        }
        ERR_MISSING_DECLARATION => "Every dependency maps to exactly one declaration record.",
        ERR_UNRESOLVED_MODULE => "Every source path resolves to a module record.",
        ERR_PARSE => "Only syntactically valid modules are formatted.",
        ERR_DUPLICATE_EXPORT => "Exported names are unique within a module.",
        ERR_RESERVED_IDENTIFIER => {
            "`__es6_export__` and `__exports__` belong to the generated factory body."
        }
        ERR_MODULE_NOT_FOUND => "Every relative import names a module that exists.",
        ERR_IO => "Module sources are readable.",
        _ => "Unknown invariant.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let err = FormatError::NonTerminalDefaultExport {
            module: "a".to_string(),
        };
        assert_eq!(err.code(), "AMD002");
        assert!(err.to_string().contains("before the end of module"));
        assert!(err.guarantee().starts_with("Direct exports"));
    }

    #[test]
    fn test_io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: FormatError = io.into();
        assert_eq!(err.code(), ERR_IO);
        assert_eq!(get_guarantee("nope"), "Unknown invariant.");
    }
}
