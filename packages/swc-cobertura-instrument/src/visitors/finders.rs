use swc_core::ecma::{ast::*, visit::Visit};

/// Finds the largest numeric suffix of identifiers already named
/// `<prefix><n>`, i.e. temporaries left by an earlier instrumentation.
#[derive(Debug)]
pub struct ConditionalIdentFinder {
    prefix: String,
    pub max_suffix: Option<u32>,
}

impl ConditionalIdentFinder {
    pub fn new(prefix: &str) -> ConditionalIdentFinder {
        ConditionalIdentFinder {
            prefix: prefix.to_string(),
            max_suffix: None,
        }
    }
}

impl Visit for ConditionalIdentFinder {
    fn visit_ident(&mut self, ident: &Ident) {
        let suffix = ident
            .sym
            .strip_prefix(self.prefix.as_str())
            .and_then(|suffix| suffix.parse::<u32>().ok());

        if let Some(suffix) = suffix {
            self.max_suffix = Some(self.max_suffix.map_or(suffix, |max| max.max(suffix)));
        }
    }
}
