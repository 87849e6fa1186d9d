//! Static ident declarations being used across templates
use once_cell::sync::Lazy;
use swc_core::{common::DUMMY_SP, ecma::ast::IdentName};

pub static IDENT_HITS: Lazy<IdentName> = Lazy::new(|| IdentName::new("hits".into(), DUMMY_SP));

pub static IDENT_TRUE: Lazy<IdentName> = Lazy::new(|| IdentName::new("true".into(), DUMMY_SP));

pub static IDENT_FALSE: Lazy<IdentName> =
    Lazy::new(|| IdentName::new("false".into(), DUMMY_SP));
