pub(crate) mod create_branch_counter_stmt;
pub(crate) mod create_increase_counter_expr;
