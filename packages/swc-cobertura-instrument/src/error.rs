use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("Could not parse {file_name}:{line}: {message}")]
    Parse {
        file_name: String,
        line: usize,
        message: String,
    },
    #[error("Could not generate instrumented code")]
    Serialization(#[source] std::io::Error),
    #[error("Generated code is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
