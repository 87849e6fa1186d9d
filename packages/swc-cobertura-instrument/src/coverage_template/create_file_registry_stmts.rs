use cobertura_oxide::CoverageLine;
use swc_core::{ecma::ast::*, quote};

use crate::utils::ast_builder::{create_bool_lit_expr, create_num_lit_expr, create_str_lit_expr};

/// Creates the per-file registry reset and one initializer per discovered line:
///
/// ```js
/// $cov["file"] = [];
/// $cov["file"][1] = { hits: 0, branch: false, true: 0, false: 0 };
/// ```
pub fn create_file_registry_stmts<'a>(
    cov_ident: &Ident,
    file_path: &str,
    lines: impl IntoIterator<Item = &'a CoverageLine>,
) -> Vec<Stmt> {
    let file = create_str_lit_expr(file_path);

    let mut stmts = vec![quote!(
        "$cov[$file] = [];" as Stmt,
        cov = cov_ident.clone(),
        file: Expr = file.clone()
    )];

    stmts.extend(lines.into_iter().map(|line| {
        quote!(
            "$cov[$file][$line] = { hits: 0, branch: $branch, true: 0, false: 0 };" as Stmt,
            cov = cov_ident.clone(),
            file: Expr = file.clone(),
            line: Expr = create_num_lit_expr(line.number),
            branch: Expr = create_bool_lit_expr(line.branch)
        )
    }));

    stmts
}
