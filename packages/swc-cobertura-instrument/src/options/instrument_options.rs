use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstrumentLogOptions {
    pub level: Option<String>,
    pub enable_trace: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstrumentOptions {
    /// Name of the process-wide registry global.
    pub coverage_variable: String,
    /// Expression naming the global object the registry is attached to.
    pub coverage_global_scope: String,
    /// If set, instrumented programs dump the registry as JSON to this path on exit.
    pub coverage_dump_file: Option<String>,
    pub instrument_log: InstrumentLogOptions,
}

impl Default for InstrumentOptions {
    fn default() -> Self {
        InstrumentOptions {
            coverage_variable: "__$coberturajs".to_string(),
            coverage_global_scope: "global".to_string(),
            coverage_dump_file: None,
            instrument_log: Default::default(),
        }
    }
}

impl InstrumentOptions {
    /// Prefix of the temporaries capturing `if` tests.
    pub fn conditional_prefix(&self) -> String {
        format!("{}Conditional_", self.coverage_variable)
    }
}
