use swc_core::{ecma::ast::*, quote};

use crate::utils::ast_builder::create_str_lit_expr;

/// Creates the statements attaching the process-wide registry to the global scope,
/// initializing it on first use:
///
/// ```js
/// var $cov = $scope["$cov"];
/// if (typeof $cov === "undefined") {
///   $cov = $scope["$cov"] = {};
/// }
/// ```
pub fn create_global_stmt_template(cov_ident: &Ident, coverage_global_scope: &Expr) -> Vec<Stmt> {
    let key = create_str_lit_expr(&cov_ident.sym);

    vec![
        quote!(
            "var $cov = $scope[$key];" as Stmt,
            cov = cov_ident.clone(),
            scope: Expr = coverage_global_scope.clone(),
            key: Expr = key.clone()
        ),
        quote!(
            r#"
if (typeof $cov === "undefined") {
  $cov = $scope[$key] = {};
}
"# as Stmt,
            cov = cov_ident.clone(),
            scope: Expr = coverage_global_scope.clone(),
            key: Expr = key
        ),
    ]
}
