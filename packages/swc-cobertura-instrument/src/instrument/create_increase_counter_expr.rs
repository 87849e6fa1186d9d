use swc_core::{common::DUMMY_SP, ecma::ast::*};

use crate::utils::ast_builder::{create_computed_member_expr, create_num_lit_expr, create_str_lit_expr};

/// Creates an expr like `__$coberturajs["lib/a.js"][12].hits++`.
/// `counter_ident` selects the counter of the line entry (`hits`, `true` or `false`).
pub(crate) fn create_increase_counter_expr(
    cov_ident: &Ident,
    file_path: &str,
    line: u32,
    counter_ident: &IdentName,
) -> Expr {
    let file_entry = create_computed_member_expr(
        Expr::Ident(cov_ident.clone()),
        create_str_lit_expr(file_path),
    );
    let line_entry = create_computed_member_expr(file_entry, create_num_lit_expr(line));

    Expr::Update(UpdateExpr {
        span: DUMMY_SP,
        op: UpdateOp::PlusPlus,
        prefix: false,
        arg: Box::new(Expr::Member(MemberExpr {
            span: DUMMY_SP,
            obj: Box::new(line_entry),
            prop: MemberProp::Ident(counter_ident.clone()),
        })),
    })
}

/// Same as `create_increase_counter_expr`, as an expression statement.
pub(crate) fn create_increase_counter_stmt(
    cov_ident: &Ident,
    file_path: &str,
    line: u32,
    counter_ident: &IdentName,
) -> Stmt {
    Stmt::Expr(ExprStmt {
        span: DUMMY_SP,
        expr: Box::new(create_increase_counter_expr(
            cov_ident,
            file_path,
            line,
            counter_ident,
        )),
    })
}
