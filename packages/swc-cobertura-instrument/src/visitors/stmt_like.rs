use swc_core::{
    common::{Span, Spanned},
    ecma::ast::*,
};

/// Element of a statement list the coverage visitor instruments: plain
/// statements, or module items at the top level of an ES module.
pub(crate) trait StmtLike: Sized {
    fn from_stmt(stmt: Stmt) -> Self;

    /// Span to count the item at, `None` for items without runtime effect.
    fn counted_span(&self) -> Option<Span>;

    fn as_if_stmt_mut(&mut self) -> Option<&mut IfStmt>;

    /// String literal expression statement, i.e. `"use strict";`.
    fn is_directive(&self) -> bool;
}

impl StmtLike for Stmt {
    fn from_stmt(stmt: Stmt) -> Self {
        stmt
    }

    fn counted_span(&self) -> Option<Span> {
        match self {
            Stmt::Empty(..) => None,
            _ => Some(self.span()),
        }
    }

    fn as_if_stmt_mut(&mut self) -> Option<&mut IfStmt> {
        match self {
            Stmt::If(if_stmt) => Some(if_stmt),
            Stmt::Labeled(LabeledStmt { body, .. }) => body.as_if_stmt_mut(),
            _ => None,
        }
    }

    fn is_directive(&self) -> bool {
        match self {
            Stmt::Expr(ExprStmt { expr, .. }) => matches!(&**expr, Expr::Lit(Lit::Str(..))),
            _ => false,
        }
    }
}

impl StmtLike for ModuleItem {
    fn from_stmt(stmt: Stmt) -> Self {
        ModuleItem::Stmt(stmt)
    }

    fn counted_span(&self) -> Option<Span> {
        match self {
            ModuleItem::Stmt(stmt) => stmt.counted_span(),
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export_decl)) => Some(export_decl.span),
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export_default_decl)) => {
                Some(export_default_decl.span)
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export_default_expr)) => {
                Some(export_default_expr.span)
            }
            // imports, re-exports and export lists
            ModuleItem::ModuleDecl(..) => None,
        }
    }

    fn as_if_stmt_mut(&mut self) -> Option<&mut IfStmt> {
        match self {
            ModuleItem::Stmt(stmt) => stmt.as_if_stmt_mut(),
            ModuleItem::ModuleDecl(..) => None,
        }
    }

    fn is_directive(&self) -> bool {
        match self {
            ModuleItem::Stmt(stmt) => stmt.is_directive(),
            ModuleItem::ModuleDecl(..) => false,
        }
    }
}

/// Inserts statements after the leading directives of a list.
pub(crate) fn insert_after_directives<T: StmtLike>(items: &mut Vec<T>, stmts: Vec<Stmt>) {
    let directives = items.iter().take_while(|item| item.is_directive()).count();
    items.splice(directives..directives, stmts.into_iter().map(T::from_stmt));
}
