//! Utility fn to create the ASTs of the coverage runtime prologue.
pub(crate) mod create_assignment_stmt;
pub(crate) mod create_dump_hook_stmt;
pub(crate) mod create_file_registry_stmts;
pub(crate) mod create_global_stmt_template;
