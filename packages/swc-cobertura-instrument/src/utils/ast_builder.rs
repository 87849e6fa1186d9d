use swc_core::{common::DUMMY_SP, ecma::ast::*};

pub fn create_str_lit_expr(value: &str) -> Expr {
    Expr::Lit(Lit::Str(Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: None,
    }))
}

pub fn create_num_lit_expr(value: u32) -> Expr {
    Expr::Lit(Lit::Num(Number {
        span: DUMMY_SP,
        value: value as f64,
        raw: None,
    }))
}

pub fn create_bool_lit_expr(value: bool) -> Expr {
    Expr::Lit(Lit::Bool(Bool {
        span: DUMMY_SP,
        value,
    }))
}

/// `$obj[$prop]`
pub fn create_computed_member_expr(obj: Expr, prop: Expr) -> Expr {
    Expr::Member(MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(obj),
        prop: MemberProp::Computed(ComputedPropName {
            span: DUMMY_SP,
            expr: Box::new(prop),
        }),
    })
}

/// Builds the expression a scope option names: `this`, an identifier or a
/// dotted member path like `globalThis.app`.
pub fn create_scope_expr(scope: &str) -> Expr {
    let mut segments = scope.split('.').map(str::trim);

    let root = match segments.next() {
        Some("this") => Expr::This(ThisExpr { span: DUMMY_SP }),
        Some(name) if !name.is_empty() => Expr::Ident(Ident::new_no_ctxt(name.into(), DUMMY_SP)),
        _ => Expr::This(ThisExpr { span: DUMMY_SP }),
    };

    segments
        .filter(|segment| !segment.is_empty())
        .fold(root, |obj, segment| {
            Expr::Member(MemberExpr {
                span: DUMMY_SP,
                obj: Box::new(obj),
                prop: MemberProp::Ident(IdentName::new(segment.into(), DUMMY_SP)),
            })
        })
}
