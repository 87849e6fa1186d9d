use swc_core::{ecma::ast::*, quote};

use crate::utils::ast_builder::create_str_lit_expr;

/// Creates an exit hook writing the process-wide registry as JSON, registered
/// once per process no matter how many instrumented files are loaded:
///
/// ```js
/// if (typeof process !== "undefined" && typeof require === "function" && !$scope["$covDump"]) {
///   $scope["$covDump"] = true;
///   process.on("exit", function () {
///     require("fs").writeFileSync("$dump_file", JSON.stringify($scope["$cov"]));
///   });
/// }
/// ```
pub fn create_dump_hook_stmt(
    cov_ident: &Ident,
    coverage_global_scope: &Expr,
    dump_file: &str,
) -> Stmt {
    quote!(
        r#"
if (typeof process !== "undefined" && typeof require === "function" && !$scope[$flag]) {
  $scope[$flag] = true;
  process.on("exit", function () {
    require("fs").writeFileSync($dump_file, JSON.stringify($scope[$key]));
  });
}
"# as Stmt,
        scope: Expr = coverage_global_scope.clone(),
        flag: Expr = create_str_lit_expr(&format!("{}Dump", cov_ident.sym)),
        key: Expr = create_str_lit_expr(&cov_ident.sym),
        dump_file: Expr = create_str_lit_expr(dump_file)
    )
}
