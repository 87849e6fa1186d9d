use std::fmt::{Display, Formatter};

/// Path of the node currently visited, used in tracing spans.
#[derive(Copy, Debug, Clone, PartialEq)]
pub enum Node {
    Module,
    Script,
    ModuleItems,
    Stmts,
    IfStmt,
    ForStmt,
    ForInStmt,
    ForOfStmt,
    WhileStmt,
    DoWhileStmt,
    Function,
    ArrowExpr,
    Constructor,
    GetterProp,
    SetterProp,
    StaticBlock,
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{:#?}", self)
    }
}
