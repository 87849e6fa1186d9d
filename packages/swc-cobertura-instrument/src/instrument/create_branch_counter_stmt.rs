use swc_core::{common::DUMMY_SP, ecma::ast::*};

use super::create_increase_counter_expr::create_increase_counter_stmt;
use crate::constants::idents::{IDENT_FALSE, IDENT_TRUE};

/// Creates the shadow conditional counting the outcome of a captured `if` test:
///
/// ```js
/// if ($captured) $cov["file"][line].true++;
/// else $cov["file"][line].false++;
/// ```
pub(crate) fn create_branch_counter_stmt(
    cov_ident: &Ident,
    file_path: &str,
    line: u32,
    captured_ident: &Ident,
) -> Stmt {
    Stmt::If(IfStmt {
        span: DUMMY_SP,
        test: Box::new(Expr::Ident(captured_ident.clone())),
        cons: Box::new(create_increase_counter_stmt(
            cov_ident,
            file_path,
            line,
            &IDENT_TRUE,
        )),
        alt: Some(Box::new(create_increase_counter_stmt(
            cov_ident,
            file_path,
            line,
            &IDENT_FALSE,
        ))),
    })
}
