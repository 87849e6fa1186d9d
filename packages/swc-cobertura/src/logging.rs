use swc_cobertura_instrument::InstrumentLogOptions;
use tracing_subscriber::fmt::format::FmtSpan;

pub fn parse_log_level(level: Option<&str>) -> Option<tracing::Level> {
    match level {
        Some("error") => Some(tracing::Level::ERROR),
        Some("debug") => Some(tracing::Level::DEBUG),
        Some("info") => Some(tracing::Level::INFO),
        Some("warn") => Some(tracing::Level::WARN),
        Some("trace") => Some(tracing::Level::TRACE),
        _ => None,
    }
}

/// Installs the stderr subscriber. Nothing is logged if no known level is configured.
pub fn initialize_instrumentation_log(log_options: &InstrumentLogOptions) {
    if let Some(log_level) = parse_log_level(log_options.level.as_deref()) {
        let builder = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr);

        let builder = if log_options.enable_trace {
            builder.with_span_events(FmtSpan::ENTER | FmtSpan::CLOSE)
        } else {
            builder
        };

        builder
            .with_ansi(false)
            .event_format(tracing_subscriber::fmt::format().pretty())
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_known_levels() {
        assert_eq!(parse_log_level(Some("warn")), Some(tracing::Level::WARN));
        assert_eq!(parse_log_level(Some("trace")), Some(tracing::Level::TRACE));
        assert_eq!(parse_log_level(Some("verbose")), None);
        assert_eq!(parse_log_level(None), None);
    }
}
