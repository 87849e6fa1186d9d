use cobertura_oxide::{CoverageLine, FileRegistry};
use swc_core::{
    common::{sync::Lrc, util::take::Take, SourceMapper, Spanned, DUMMY_SP},
    ecma::{
        ast::*,
        visit::{VisitMut, VisitMutWith, VisitWith},
    },
};
use tracing::instrument;

use super::{
    finders::ConditionalIdentFinder,
    stmt_like::{insert_after_directives, StmtLike},
};
use crate::{
    constants::idents::IDENT_HITS,
    coverage_template::{
        create_assignment_stmt::create_assignment_stmt,
        create_dump_hook_stmt::create_dump_hook_stmt,
        create_file_registry_stmts::create_file_registry_stmts,
        create_global_stmt_template::create_global_stmt_template,
    },
    instrument::{
        create_branch_counter_stmt::create_branch_counter_stmt,
        create_increase_counter_expr::create_increase_counter_stmt,
    },
    utils::{
        ast_builder::create_scope_expr, lookup_range::get_line_from_span,
        naming::ConditionalIdentGenerator, node::Node,
    },
    InstrumentOptions,
};

/// Visitor injecting line hit counters and `if` outcome counters into every
/// statement list of a program, then prepending the coverage runtime prologue.
pub struct CoverageVisitor<S: SourceMapper> {
    source_map: Lrc<S>,
    file_path: String,
    instrument_options: InstrumentOptions,
    cov_ident: Ident,
    naming: ConditionalIdentGenerator,
    // Lines discovered so far, ascending.
    registry: FileRegistry,
    // Line of the statement owning the list being visited. `None` at the top
    // level and right below a function boundary.
    enclosing_line: Option<u32>,
    // Whether the next statement list is a program or function body, the
    // only lists with a directive prologue.
    directive_context: bool,
    nodes: Vec<Node>,
}

/// Public interface to create a visitor performs transform to inject
/// coverage instrumentation counters.
pub fn create_coverage_instrumentation_visitor<S: SourceMapper>(
    source_map: Lrc<S>,
    instrument_options: InstrumentOptions,
    file_path: String,
) -> CoverageVisitor<S> {
    CoverageVisitor::new(source_map, instrument_options, file_path)
}

impl<S: SourceMapper> CoverageVisitor<S> {
    pub fn new(
        source_map: Lrc<S>,
        instrument_options: InstrumentOptions,
        file_path: String,
    ) -> CoverageVisitor<S> {
        let cov_ident = Ident::new_no_ctxt(
            instrument_options.coverage_variable.as_str().into(),
            DUMMY_SP,
        );
        let naming = ConditionalIdentGenerator::new(instrument_options.conditional_prefix());

        CoverageVisitor {
            source_map,
            file_path,
            instrument_options,
            cov_ident,
            naming,
            registry: FileRegistry::new(),
            enclosing_line: None,
            directive_context: false,
            nodes: vec![],
        }
    }

    /// Lines discovered by the last traversal, ascending, counters zeroed.
    pub fn coverage_lines(&self) -> Vec<CoverageLine> {
        self.registry.lines().copied().collect()
    }

    // Display current nodes.
    fn print_node(&self) -> String {
        self.nodes
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<String>>()
            .join(":")
    }

    /// Starts numbering temporaries after any the program already declares.
    fn seed_naming<N: VisitWith<ConditionalIdentFinder>>(&mut self, node: &N) {
        let mut finder = ConditionalIdentFinder::new(self.naming.prefix());
        node.visit_with(&mut finder);
        self.naming.resume_after(finder.max_suffix);
    }

    /// Create coverage instrumentation template stmts to be injected into the top of the transformed output.
    fn get_coverage_templates(&self) -> Vec<Stmt> {
        let scope = create_scope_expr(&self.instrument_options.coverage_global_scope);

        let mut stmts = create_global_stmt_template(&self.cov_ident, &scope);
        stmts.extend(create_file_registry_stmts(
            &self.cov_ident,
            &self.file_path,
            self.registry.lines(),
        ));

        if let Some(dump_file) = &self.instrument_options.coverage_dump_file {
            stmts.push(create_dump_hook_stmt(&self.cov_ident, &scope, dump_file));
        }

        stmts
    }

    /// Replaces the test of an `if` with a temporary capturing it, returns the
    /// statements to insert before the `if`: the capture and the outcome counter.
    fn capture_conditional(&mut self, if_stmt: &mut IfStmt, line: u32) -> Vec<Stmt> {
        let captured_ident = self.naming.next_ident();

        if_stmt.test.visit_mut_with(self);
        let test = if_stmt.test.take();
        *if_stmt.test = Expr::Ident(captured_ident.clone());

        self.registry.discover(line, true);

        vec![
            create_assignment_stmt(&captured_ident, *test),
            create_branch_counter_stmt(&self.cov_ident, &self.file_path, line, &captured_ident),
        ]
    }

    /// Rebuilds a statement list with counters placed before each statement.
    fn instrument_stmt_list<T>(&mut self, items: &mut Vec<T>)
    where
        T: StmtLike + VisitMutWith<Self>,
    {
        let enclosing_line = self.enclosing_line;
        let mut counted_lines: Vec<u32> = vec![];
        let mut in_directive_prologue = std::mem::take(&mut self.directive_context);
        let mut new_items = Vec::with_capacity(items.len());

        for mut item in items.drain(..) {
            if in_directive_prologue && item.is_directive() {
                new_items.push(item);
                continue;
            }
            in_directive_prologue = false;

            let line = item
                .counted_span()
                .and_then(|span| get_line_from_span(&self.source_map, &span));

            let line = match line {
                Some(line) => line,
                None => {
                    tracing::trace!(
                        span = ?item.counted_span(),
                        "Statement is not counted, visiting its children only"
                    );
                    item.visit_mut_with(self);
                    new_items.push(item);
                    continue;
                }
            };

            // One outcome counter pair per line: an `if` sharing the line of
            // an already captured one (a one-line `else if`) is not captured.
            let captures = !self
                .registry
                .get(line)
                .is_some_and(|coverage_line| coverage_line.branch);
            self.enclosing_line = Some(line);
            let mut before = match item.as_if_stmt_mut() {
                Some(if_stmt) if captures => self.capture_conditional(if_stmt, line),
                _ => vec![],
            };
            item.visit_mut_with(self);
            self.enclosing_line = enclosing_line;

            self.registry.discover(line, false);

            if enclosing_line != Some(line) && !counted_lines.contains(&line) {
                counted_lines.push(line);
                before.push(create_increase_counter_stmt(
                    &self.cov_ident,
                    &self.file_path,
                    line,
                    &IDENT_HITS,
                ));
            }

            new_items.extend(before.into_iter().map(T::from_stmt));
            new_items.push(item);
        }

        *items = new_items;
    }

    /// Visits a node below a function boundary, where statements on the line
    /// of the enclosing statement run on their own schedule.
    fn visit_mut_function_boundary<N: VisitMutWith<Self>>(
        &mut self,
        node: Node,
        n: &mut N,
        directive_context: bool,
    ) {
        self.nodes.push(node);
        let enclosing_line = self.enclosing_line.take();
        let outer_directive_context =
            std::mem::replace(&mut self.directive_context, directive_context);
        n.visit_mut_children_with(self);
        self.directive_context = outer_directive_context;
        self.enclosing_line = enclosing_line;
        self.nodes.pop();
    }
}

/// Wraps a single statement body into a block, so it forms a statement list.
fn wrap_in_block(body: &mut Box<Stmt>) {
    if matches!(&**body, Stmt::Block(..)) {
        return;
    }

    let stmt = body.take();
    **body = Stmt::Block(BlockStmt {
        span: stmt.span(),
        stmts: vec![*stmt],
        ..BlockStmt::dummy()
    });
}

macro_rules! visit_mut_loop_body {
    ($fn_name: ident, $N: ident) => {
        #[instrument(skip_all, fields(node = %self.print_node()))]
        fn $fn_name(&mut self, n: &mut $N) {
            self.nodes.push(Node::$N);
            wrap_in_block(&mut n.body);
            n.visit_mut_children_with(self);
            self.nodes.pop();
        }
    };
}

impl<S: SourceMapper> VisitMut for CoverageVisitor<S> {
    #[instrument(skip_all, fields(node = %self.print_node()))]
    fn visit_mut_module(&mut self, module: &mut Module) {
        self.nodes.push(Node::Module);
        self.seed_naming(&*module);
        self.directive_context = true;

        module.visit_mut_children_with(self);

        let templates = self.get_coverage_templates();
        insert_after_directives(&mut module.body, templates);
        self.nodes.pop();
    }

    #[instrument(skip_all, fields(node = %self.print_node()))]
    fn visit_mut_script(&mut self, script: &mut Script) {
        self.nodes.push(Node::Script);
        self.seed_naming(&*script);
        self.directive_context = true;

        script.visit_mut_children_with(self);

        let templates = self.get_coverage_templates();
        insert_after_directives(&mut script.body, templates);
        self.nodes.pop();
    }

    #[instrument(skip_all, fields(node = %self.print_node()))]
    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        self.nodes.push(Node::ModuleItems);
        self.instrument_stmt_list(items);
        self.nodes.pop();
    }

    #[instrument(skip_all, fields(node = %self.print_node()))]
    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        self.nodes.push(Node::Stmts);
        self.instrument_stmt_list(stmts);
        self.nodes.pop();
    }

    #[instrument(skip_all, fields(node = %self.print_node()))]
    fn visit_mut_if_stmt(&mut self, if_stmt: &mut IfStmt) {
        self.nodes.push(Node::IfStmt);
        wrap_in_block(&mut if_stmt.cons);
        if let Some(alt) = &mut if_stmt.alt {
            wrap_in_block(alt);
        }

        if_stmt.visit_mut_children_with(self);
        self.nodes.pop();
    }

    visit_mut_loop_body!(visit_mut_for_stmt, ForStmt);
    visit_mut_loop_body!(visit_mut_for_in_stmt, ForInStmt);
    visit_mut_loop_body!(visit_mut_for_of_stmt, ForOfStmt);
    visit_mut_loop_body!(visit_mut_while_stmt, WhileStmt);
    visit_mut_loop_body!(visit_mut_do_while_stmt, DoWhileStmt);

    fn visit_mut_function(&mut self, function: &mut Function) {
        self.visit_mut_function_boundary(Node::Function, function, true);
    }

    fn visit_mut_arrow_expr(&mut self, arrow_expr: &mut ArrowExpr) {
        self.visit_mut_function_boundary(Node::ArrowExpr, arrow_expr, true);
    }

    fn visit_mut_constructor(&mut self, constructor: &mut Constructor) {
        self.visit_mut_function_boundary(Node::Constructor, constructor, true);
    }

    fn visit_mut_getter_prop(&mut self, getter_prop: &mut GetterProp) {
        self.visit_mut_function_boundary(Node::GetterProp, getter_prop, true);
    }

    fn visit_mut_setter_prop(&mut self, setter_prop: &mut SetterProp) {
        self.visit_mut_function_boundary(Node::SetterProp, setter_prop, true);
    }

    fn visit_mut_static_block(&mut self, static_block: &mut StaticBlock) {
        self.visit_mut_function_boundary(Node::StaticBlock, static_block, false);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use swc_core::{
        common::{FileName, SourceMap},
        ecma::parser::{parse_file_as_program, Syntax},
    };

    use super::*;

    fn visit(src: &str) -> (Program, CoverageVisitor<SourceMap>) {
        let cm: Lrc<SourceMap> = Default::default();
        let fm = cm.new_source_file(FileName::Custom("a.js".to_string()).into(), src.to_string());
        let mut program = parse_file_as_program(
            &fm,
            Syntax::Es(Default::default()),
            EsVersion::EsNext,
            None,
            &mut vec![],
        )
        .unwrap();

        let mut visitor =
            create_coverage_instrumentation_visitor(cm, Default::default(), "a.js".to_string());
        program.visit_mut_with(&mut visitor);

        (program, visitor)
    }

    fn lines(visitor: &CoverageVisitor<SourceMap>) -> Vec<(u32, bool)> {
        visitor
            .coverage_lines()
            .iter()
            .map(|line| (line.number, line.branch))
            .collect()
    }

    #[test]
    fn should_discover_lines_once() {
        let (_, visitor) = visit("a();\nif (x) {\n  b();\n  c(); d();\n}\n");

        assert_eq!(
            lines(&visitor),
            vec![(1, false), (2, true), (3, false), (4, false)]
        );
    }

    #[test]
    fn should_discover_nested_function_lines() {
        let (_, visitor) = visit("function f() {\n  return 1;\n}\nvar g = () => {\n  h();\n};\n");

        assert_eq!(
            lines(&visitor),
            vec![(1, false), (2, false), (4, false), (5, false)]
        );
    }

    #[test]
    fn should_discover_else_if_as_branch() {
        let (_, visitor) = visit("if (a) {\n  b();\n} else if (c) {\n  d();\n}\n");

        assert_eq!(
            lines(&visitor),
            vec![(1, true), (2, false), (3, true), (4, false)]
        );
    }

    #[test]
    fn should_discover_single_statement_loop_bodies() {
        let (_, visitor) = visit("for (;;)\n  a();\nwhile (x)\n  if (y) b();\n");

        assert_eq!(
            lines(&visitor),
            vec![(1, false), (2, false), (3, false), (4, true)]
        );
    }

    #[test]
    fn should_capture_conditional_test() {
        let (program, _) = visit("if (x) y();\n");

        let Program::Script(script) = program else {
            panic!("expected a script");
        };

        // 2 registry guards, the file reset, 1 line initializer, then the capture
        let body = &script.body[4..];
        assert_eq!(body.len(), 4);
        assert!(matches!(&body[0], Stmt::Decl(Decl::Var(..))));
        assert!(matches!(&body[1], Stmt::If(..)));
        assert!(matches!(&body[2], Stmt::Expr(..)));

        let Stmt::If(if_stmt) = &body[3] else {
            panic!("expected the original if statement");
        };
        assert!(
            matches!(&*if_stmt.test, Expr::Ident(ident) if &*ident.sym == "__$coberturajsConditional_0")
        );
        assert!(matches!(&*if_stmt.cons, Stmt::Block(..)));
    }

    #[test]
    fn should_keep_directives_first() {
        let (program, _) = visit("'use strict';\na();\n");

        let Program::Script(script) = program else {
            panic!("expected a script");
        };
        assert!(script.body[0].is_directive());
        assert!(matches!(&script.body[1], Stmt::Decl(Decl::Var(..))));
    }

    #[test]
    fn should_skip_imports_in_modules() {
        let (_, visitor) = visit("import a from 'a';\nexport const b = a();\nexport { b as c };\n");

        assert_eq!(lines(&visitor), vec![(2, false)]);
    }

    #[test]
    fn should_not_capture_else_if_on_parent_line() {
        let (program, visitor) = visit("if (a) { p(); } else if (b) { q(); }\n");

        assert_eq!(lines(&visitor), vec![(1, true)]);

        let Program::Script(script) = program else {
            panic!("expected a script");
        };
        let Some(Stmt::If(if_stmt)) = script.body.last() else {
            panic!("expected the original if statement last");
        };
        let Some(Stmt::Block(alt)) = if_stmt.alt.as_deref() else {
            panic!("expected the else branch wrapped into a block");
        };
        // the nested `if` keeps its own test and gets no counters
        assert_eq!(alt.stmts.len(), 1);
        let Stmt::If(nested) = &alt.stmts[0] else {
            panic!("expected the nested if statement");
        };
        assert!(matches!(&*nested.test, Expr::Ident(ident) if &*ident.sym == "b"));
    }

    #[test]
    fn should_pass_through_stmts_without_location() {
        let cm: Lrc<SourceMap> = Default::default();
        let fm = cm.new_source_file(
            FileName::Custom("a.js".to_string()).into(),
            "a();\nb();\n".to_string(),
        );
        let mut program = parse_file_as_program(
            &fm,
            Syntax::Es(Default::default()),
            EsVersion::EsNext,
            None,
            &mut vec![],
        )
        .unwrap();

        let Program::Script(script) = &mut program else {
            panic!("expected a script");
        };
        let located = script.body.pop().unwrap();
        script.body.push(Stmt::Block(BlockStmt {
            span: DUMMY_SP,
            stmts: vec![located],
            ..BlockStmt::dummy()
        }));

        let mut visitor =
            create_coverage_instrumentation_visitor(cm, Default::default(), "a.js".to_string());
        program.visit_mut_with(&mut visitor);

        assert_eq!(lines(&visitor), vec![(1, false), (2, false)]);

        let Program::Script(script) = program else {
            panic!("expected a script");
        };
        let Some(Stmt::Block(block)) = script.body.last() else {
            panic!("expected the synthetic block last");
        };

        // no counter right before the synthetic block, one inside it
        assert!(matches!(
            &script.body[script.body.len() - 2],
            Stmt::Expr(ExprStmt { expr, .. }) if matches!(&**expr, Expr::Call(..))
        ));
        assert_eq!(block.stmts.len(), 2);
        assert!(matches!(
            &block.stmts[0],
            Stmt::Expr(ExprStmt { expr, .. }) if matches!(&**expr, Expr::Update(..))
        ));
    }

    #[test]
    fn should_count_string_statements_in_blocks() {
        let (_, visitor) = visit("if (z) {\n  'marker';\n  g();\n}\n");

        assert_eq!(lines(&visitor), vec![(1, true), (2, false), (3, false)]);
    }

    #[test]
    fn should_skip_function_directives() {
        let (_, visitor) = visit("function f() {\n  'use strict';\n  g();\n}\n");

        assert_eq!(lines(&visitor), vec![(1, false), (3, false)]);
    }

    #[test]
    fn should_discover_labeled_if_as_branch() {
        let (_, visitor) = visit("outer: if (x) {\n  y();\n}\n");

        assert_eq!(lines(&visitor), vec![(1, true), (2, false)]);
    }

    #[test]
    fn should_capture_once_per_line() {
        let (program, visitor) = visit("if (a) {} if (b) {}\n");

        assert_eq!(lines(&visitor), vec![(1, true)]);

        let Program::Script(script) = program else {
            panic!("expected a script");
        };
        let Some(Stmt::If(if_stmt)) = script.body.last() else {
            panic!("expected the second if statement last");
        };
        assert!(matches!(&*if_stmt.test, Expr::Ident(ident) if &*ident.sym == "b"));
    }
}
