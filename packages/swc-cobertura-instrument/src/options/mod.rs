pub(crate) mod instrument_options;
