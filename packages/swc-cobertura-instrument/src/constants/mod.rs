pub(crate) mod idents;
