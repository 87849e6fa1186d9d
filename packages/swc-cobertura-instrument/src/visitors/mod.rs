pub(crate) mod coverage_visitor;
pub(crate) mod finders;
pub(crate) mod stmt_like;
