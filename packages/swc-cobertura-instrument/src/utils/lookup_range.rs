use swc_core::common::{sync::Lrc, SourceMapper, Span};

/// 1-based line of the original source a span starts at.
///
/// Nodes synthesized by earlier transforms carry the dummy position and
/// cannot be located, those return `None`.
pub fn get_line_from_span<S: SourceMapper>(source_map: &Lrc<S>, span: &Span) -> Option<u32> {
    if span.lo.is_dummy() {
        return None;
    }

    let loc = source_map.lookup_char_pos(span.lo);
    Some(loc.line as u32)
}
