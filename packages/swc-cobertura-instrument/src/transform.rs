use cobertura_oxide::CoverageLine;
use swc_core::{
    common::{
        comments::{Comments, SingleThreadedComments},
        sync::Lrc,
        FileName, SourceMap, Spanned,
    },
    ecma::{
        ast::{EsVersion, Program},
        codegen::{text_writer::JsWriter, Config, Emitter, Node as _},
        parser::{error::Error as ParserError, parse_file_as_program, Syntax},
        visit::VisitMutWith,
    },
};

use crate::{create_coverage_instrumentation_visitor, InstrumentError, InstrumentOptions};

/// Instrumented source along with the lines the instrumentation discovered.
#[derive(Clone, Debug, PartialEq)]
pub struct InstrumentOutput {
    pub code: String,
    pub lines: Vec<CoverageLine>,
}

/// Instruments a source file with default options.
pub fn instrument(source: &str, file_name: &str) -> Result<String, InstrumentError> {
    instrument_with_options(source, file_name, &Default::default())
}

pub fn instrument_with_options(
    source: &str,
    file_name: &str,
    instrument_options: &InstrumentOptions,
) -> Result<String, InstrumentError> {
    instrument_source(source, file_name, instrument_options).map(|output| output.code)
}

/// Parses `source`, injects coverage counters keyed by `file_name` and
/// generates the instrumented code, prologue first.
#[tracing::instrument(skip(source, instrument_options))]
pub fn instrument_source(
    source: &str,
    file_name: &str,
    instrument_options: &InstrumentOptions,
) -> Result<InstrumentOutput, InstrumentError> {
    let cm: Lrc<SourceMap> = Default::default();
    let comments = SingleThreadedComments::default();

    let mut program = parse_program(&cm, &comments, source, file_name)?;

    let mut visitor = create_coverage_instrumentation_visitor(
        cm.clone(),
        instrument_options.clone(),
        file_name.to_string(),
    );
    program.visit_mut_with(&mut visitor);

    let code = print_program(&cm, &program, Some(&comments as &dyn Comments))?;
    let lines = visitor.coverage_lines();

    tracing::debug!(
        lines = lines.len(),
        branches = lines.iter().filter(|line| line.branch).count(),
        "Instrumented file"
    );

    Ok(InstrumentOutput { code, lines })
}

fn parse_program(
    cm: &Lrc<SourceMap>,
    comments: &SingleThreadedComments,
    source: &str,
    file_name: &str,
) -> Result<Program, InstrumentError> {
    let fm = cm.new_source_file(
        FileName::Custom(file_name.to_string()).into(),
        source.to_string(),
    );

    let mut recovered_errors = vec![];
    let program = parse_file_as_program(
        &fm,
        Syntax::Es(Default::default()),
        EsVersion::EsNext,
        Some(comments as &dyn Comments),
        &mut recovered_errors,
    )
    .map_err(|e| to_parse_error(cm, file_name, e))?;

    // Recovered errors still mean the input is not valid source.
    match recovered_errors.into_iter().next() {
        Some(e) => Err(to_parse_error(cm, file_name, e)),
        None => Ok(program),
    }
}

fn to_parse_error(cm: &Lrc<SourceMap>, file_name: &str, e: ParserError) -> InstrumentError {
    let line = if e.span().lo.is_dummy() {
        0
    } else {
        cm.lookup_char_pos(e.span().lo).line
    };

    InstrumentError::Parse {
        file_name: file_name.to_string(),
        line,
        message: e.kind().msg().to_string(),
    }
}

fn print_program(
    cm: &Lrc<SourceMap>,
    program: &Program,
    comments: Option<&dyn Comments>,
) -> Result<String, InstrumentError> {
    let mut buf = vec![];
    {
        let mut emitter = Emitter {
            cfg: Config::default(),
            cm: cm.clone(),
            comments,
            wr: JsWriter::new(cm.clone(), "\n", &mut buf, None),
        };

        program
            .emit_with(&mut emitter)
            .map_err(InstrumentError::Serialization)?;
    }

    Ok(String::from_utf8(buf)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Parses and prints minified without comments, so sources differing only
    /// in formatting compare equal.
    fn normalize(src: &str) -> String {
        let cm: Lrc<SourceMap> = Default::default();
        let fm = cm.new_source_file(FileName::Anon.into(), src.to_string());
        let program = parse_file_as_program(
            &fm,
            Syntax::Es(Default::default()),
            EsVersion::EsNext,
            None,
            &mut vec![],
        )
        .unwrap();

        let mut buf = vec![];
        {
            let mut emitter = Emitter {
                cfg: Config::default().with_minify(true),
                cm: cm.clone(),
                comments: None,
                wr: JsWriter::new(cm.clone(), "\n", &mut buf, None),
            };
            program.emit_with(&mut emitter).unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    fn assert_instrumented(src: &str, expected: &str) {
        let actual = instrument(src, "a.js").unwrap();
        assert_eq!(normalize(&actual), normalize(expected));
    }

    const PROLOGUE: &str = r#"
var __$coberturajs = global["__$coberturajs"];
if (typeof __$coberturajs === "undefined") {
  __$coberturajs = global["__$coberturajs"] = {};
}
__$coberturajs["a.js"] = [];
"#;

    #[test]
    fn should_instrument_statements() {
        assert_instrumented(
            "a();\nb();\n",
            &format!(
                r#"{PROLOGUE}
__$coberturajs["a.js"][1] = {{ hits: 0, branch: false, true: 0, false: 0 }};
__$coberturajs["a.js"][2] = {{ hits: 0, branch: false, true: 0, false: 0 }};
__$coberturajs["a.js"][1].hits++;
a();
__$coberturajs["a.js"][2].hits++;
b();
"#
            ),
        );
    }

    #[test]
    fn should_capture_if_test() {
        assert_instrumented(
            "if (x) { y(); }\n",
            &format!(
                r#"{PROLOGUE}
__$coberturajs["a.js"][1] = {{ hits: 0, branch: true, true: 0, false: 0 }};
var __$coberturajsConditional_0 = x;
if (__$coberturajsConditional_0) __$coberturajs["a.js"][1].true++;
else __$coberturajs["a.js"][1].false++;
__$coberturajs["a.js"][1].hits++;
if (__$coberturajsConditional_0) {{
  y();
}}
"#
            ),
        );
    }

    #[test]
    fn should_instrument_if_else_on_separate_lines() {
        assert_instrumented(
            "if (x) {\n  y();\n} else {\n  z();\n}\n",
            &format!(
                r#"{PROLOGUE}
__$coberturajs["a.js"][1] = {{ hits: 0, branch: true, true: 0, false: 0 }};
__$coberturajs["a.js"][2] = {{ hits: 0, branch: false, true: 0, false: 0 }};
__$coberturajs["a.js"][4] = {{ hits: 0, branch: false, true: 0, false: 0 }};
var __$coberturajsConditional_0 = x;
if (__$coberturajsConditional_0) __$coberturajs["a.js"][1].true++;
else __$coberturajs["a.js"][1].false++;
__$coberturajs["a.js"][1].hits++;
if (__$coberturajsConditional_0) {{
  __$coberturajs["a.js"][2].hits++;
  y();
}} else {{
  __$coberturajs["a.js"][4].hits++;
  z();
}}
"#
            ),
        );
    }

    #[test]
    fn should_instrument_function_body() {
        assert_instrumented(
            "function f(a) {\n  return a;\n}\n",
            &format!(
                r#"{PROLOGUE}
__$coberturajs["a.js"][1] = {{ hits: 0, branch: false, true: 0, false: 0 }};
__$coberturajs["a.js"][2] = {{ hits: 0, branch: false, true: 0, false: 0 }};
__$coberturajs["a.js"][1].hits++;
function f(a) {{
  __$coberturajs["a.js"][2].hits++;
  return a;
}}
"#
            ),
        );
    }

    #[test]
    fn should_capture_else_if_on_own_line() {
        assert_instrumented(
            "if (a) {\n  p();\n} else if (b) {\n  q();\n}\n",
            &format!(
                r#"{PROLOGUE}
__$coberturajs["a.js"][1] = {{ hits: 0, branch: true, true: 0, false: 0 }};
__$coberturajs["a.js"][2] = {{ hits: 0, branch: false, true: 0, false: 0 }};
__$coberturajs["a.js"][3] = {{ hits: 0, branch: true, true: 0, false: 0 }};
__$coberturajs["a.js"][4] = {{ hits: 0, branch: false, true: 0, false: 0 }};
var __$coberturajsConditional_0 = a;
if (__$coberturajsConditional_0) __$coberturajs["a.js"][1].true++;
else __$coberturajs["a.js"][1].false++;
__$coberturajs["a.js"][1].hits++;
if (__$coberturajsConditional_0) {{
  __$coberturajs["a.js"][2].hits++;
  p();
}} else {{
  var __$coberturajsConditional_1 = b;
  if (__$coberturajsConditional_1) __$coberturajs["a.js"][3].true++;
  else __$coberturajs["a.js"][3].false++;
  __$coberturajs["a.js"][3].hits++;
  if (__$coberturajsConditional_1) {{
    __$coberturajs["a.js"][4].hits++;
    q();
  }}
}}
"#
            ),
        );
    }

    #[test]
    fn should_count_one_line_else_if_outcomes_once() {
        assert_instrumented(
            "if (a) { p(); } else if (b) { q(); }\n",
            &format!(
                r#"{PROLOGUE}
__$coberturajs["a.js"][1] = {{ hits: 0, branch: true, true: 0, false: 0 }};
var __$coberturajsConditional_0 = a;
if (__$coberturajsConditional_0) __$coberturajs["a.js"][1].true++;
else __$coberturajs["a.js"][1].false++;
__$coberturajs["a.js"][1].hits++;
if (__$coberturajsConditional_0) {{
  p();
}} else {{
  if (b) {{
    q();
  }}
}}
"#
            ),
        );
    }

    #[test]
    fn should_count_one_line_loop_once() {
        assert_instrumented(
            "for (var i = 0; i < 3; i++) step(i);\n",
            &format!(
                r#"{PROLOGUE}
__$coberturajs["a.js"][1] = {{ hits: 0, branch: false, true: 0, false: 0 }};
__$coberturajs["a.js"][1].hits++;
for (var i = 0; i < 3; i++) {{
  step(i);
}}
"#
            ),
        );
    }

    #[test]
    fn should_number_conditionals_in_visit_order() {
        let code = instrument("if (a) {\n  if (b) {}\n}\nif (c) {}\n", "a.js").unwrap();
        let normalized = normalize(&code);

        assert!(normalized.contains("var __$coberturajsConditional_0=a"));
        assert!(normalized.contains("var __$coberturajsConditional_1=b"));
        assert!(normalized.contains("var __$coberturajsConditional_2=c"));
    }

    #[test]
    fn should_evaluate_test_once() {
        let code = instrument("if (next()) {\n  a();\n}\n", "a.js").unwrap();
        assert_eq!(normalize(&code).matches("next()").count(), 1);
    }

    #[test]
    fn should_keep_directive_prologue() {
        let code = instrument("\"use strict\";\na();\n", "a.js").unwrap();
        assert!(normalize(&code).starts_with("\"use strict\";var __$coberturajs="));
    }

    #[test]
    fn should_add_dump_hook() {
        let options = InstrumentOptions {
            coverage_dump_file: Some("coverage/registry.json".to_string()),
            ..Default::default()
        };
        let code = instrument_with_options("a();\n", "a.js", &options).unwrap();
        let normalized = normalize(&code);

        assert!(normalized.contains(r#"global["__$coberturajsDump"]=true"#));
        assert!(normalized.contains(r#"writeFileSync("coverage/registry.json""#));
    }

    #[test]
    fn should_use_options() {
        let options = InstrumentOptions {
            coverage_variable: "__cov".to_string(),
            coverage_global_scope: "globalThis".to_string(),
            ..Default::default()
        };
        let output = instrument_source("if (x) {}\n", "lib/b.js", &options).unwrap();
        let normalized = normalize(&output.code);

        assert!(normalized.starts_with(r#"var __cov=globalThis["__cov"];"#));
        assert!(normalized.contains(r#"__cov["lib/b.js"][1].hits++"#));
        assert!(normalized.contains("var __covConditional_0=x"));
        assert_eq!(output.lines, vec![CoverageLine::new(1, true)]);
    }

    #[test]
    fn should_keep_comments() {
        let code = instrument("// keep me\na();\n", "a.js").unwrap();
        assert!(code.contains("// keep me"));
    }

    #[test]
    fn should_report_parse_error() {
        let err = instrument("a();\nif (", "broken.js").unwrap_err();

        match err {
            InstrumentError::Parse {
                file_name, line, ..
            } => {
                assert_eq!(file_name, "broken.js");
                assert_eq!(line, 2);
            }
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn should_reinstrument_output() {
        let once = instrument("if (x) {\n  y();\n}\n", "a.js").unwrap();
        let twice = instrument(&once, "a.js").unwrap();
        let normalized = normalize(&twice);

        // the prologue guard and the outcome counter of the first run are `if`s too
        assert_eq!(normalized.matches("var __$coberturajsConditional_0=").count(), 1);
        assert!(normalized.contains("var __$coberturajsConditional_3=__$coberturajsConditional_0"));
    }
}
