//! Export-registration statements.

use oxc_allocator::Box as oxc_box;
use oxc_ast::ast::*;
use oxc_ast::AstBuilder;
use oxc_span::SPAN;

use crate::classify::ExportStrategy;
use crate::module::DEFAULT_EXPORT;
use crate::snippets::{EXPORTS_OBJECT, EXPORT_HELPER};

/// Builds the statement that makes `value` visible as export `name`, in the
/// form the module's strategy dictates.
pub struct ExportActions<'a> {
    pub ast: AstBuilder<'a>,
    pub strategy: ExportStrategy,
    pub direct_exports: bool,
}

impl<'a> ExportActions<'a> {
    pub fn new(ast: AstBuilder<'a>, strategy: ExportStrategy, direct_exports: bool) -> Self {
        Self {
            ast,
            strategy,
            direct_exports,
        }
    }

    pub fn action(&self, name: &str, value: Expression<'a>) -> Statement<'a> {
        match self.strategy {
            ExportStrategy::RegisteredCall => self.registration_call(name, value),
            ExportStrategy::MidBodyAssign => self.exports_assignment(name, value),
            ExportStrategy::TerminalReturn => self.terminal_return(value),
        }
    }

    /// `name` as a reference expression.
    pub fn identifier(&self, name: &str) -> Expression<'a> {
        let atom = self.ast.allocator.alloc_str(name);
        self.ast.expression_identifier(SPAN, atom)
    }

    /// `object["property"]`
    pub fn computed_member(&self, object: &str, property: &str) -> Expression<'a> {
        Expression::from(self.ast.member_expression_computed(
            SPAN,
            self.identifier(object),
            self.string_literal(property),
            false,
        ))
    }

    pub fn string_literal(&self, value: &str) -> Expression<'a> {
        let atom = self.ast.allocator.alloc_str(value);
        self.ast.expression_string_literal(SPAN, atom, None)
    }

    /// `name = value;`
    pub fn assign_identifier(&self, name: &str, value: Expression<'a>) -> Statement<'a> {
        let atom = self.ast.allocator.alloc_str(name);
        let target = SimpleAssignmentTarget::AssignmentTargetIdentifier(
            self.ast.alloc(self.ast.identifier_reference(SPAN, atom)),
        );
        self.ast.statement_expression(
            SPAN,
            self.ast.expression_assignment(
                SPAN,
                AssignmentOperator::Assign,
                AssignmentTarget::from(target),
                value,
            ),
        )
    }

    // __es6_export__("name", value);
    fn registration_call(&self, name: &str, value: Expression<'a>) -> Statement<'a> {
        let mut args = self.ast.vec();
        args.push(Argument::from(self.string_literal(name)));
        args.push(Argument::from(value));

        self.ast.statement_expression(
            SPAN,
            self.ast.expression_call(
                SPAN,
                self.identifier(EXPORT_HELPER),
                None::<oxc_box<TSTypeParameterInstantiation>>,
                args,
                false,
            ),
        )
    }

    // __exports__["name"] = value;
    fn exports_assignment(&self, name: &str, value: Expression<'a>) -> Statement<'a> {
        let member = self.ast.member_expression_computed(
            SPAN,
            self.identifier(EXPORTS_OBJECT),
            self.string_literal(name),
            false,
        );
        self.ast.statement_expression(
            SPAN,
            self.ast.expression_assignment(
                SPAN,
                AssignmentOperator::Assign,
                AssignmentTarget::from(SimpleAssignmentTarget::from(member)),
                value,
            ),
        )
    }

    // return value;  /  return { default: value };
    fn terminal_return(&self, value: Expression<'a>) -> Statement<'a> {
        if self.direct_exports {
            return self.ast.statement_return(SPAN, Some(value));
        }

        let key = PropertyKey::StaticIdentifier(
            self.ast.alloc(self.ast.identifier_name(SPAN, DEFAULT_EXPORT)),
        );
        let mut props = self.ast.vec();
        props.push(self.ast.object_property_kind_object_property(
            SPAN,
            PropertyKind::Init,
            key,
            value,
            false,
            false,
            false,
        ));
        self.ast
            .statement_return(SPAN, Some(self.ast.expression_object(SPAN, props)))
    }
}
