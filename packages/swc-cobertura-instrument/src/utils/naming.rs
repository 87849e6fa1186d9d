use swc_core::{common::DUMMY_SP, ecma::ast::Ident};

/// Hands out the names of the temporaries capturing `if` tests,
/// `<prefix>0`, `<prefix>1`, ... for a single instrumentation run.
#[derive(Clone, Debug)]
pub struct ConditionalIdentGenerator {
    prefix: String,
    next: u32,
}

impl ConditionalIdentGenerator {
    pub fn new(prefix: String) -> ConditionalIdentGenerator {
        ConditionalIdentGenerator { prefix, next: 0 }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Continues numbering after a suffix already used in the source.
    pub fn resume_after(&mut self, used_suffix: Option<u32>) {
        if let Some(used_suffix) = used_suffix {
            self.next = self.next.max(used_suffix.saturating_add(1));
        }
    }

    pub fn next_ident(&mut self) -> Ident {
        let ident = Ident::new_no_ctxt(format!("{}{}", self.prefix, self.next).into(), DUMMY_SP);
        self.next += 1;
        ident
    }
}
