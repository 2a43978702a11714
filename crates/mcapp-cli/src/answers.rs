//! Building the flat answer map from user input.
//!
//! Sources are applied in order, each overriding the previous one: the
//! seed map, the `--answers` file, the `--values` file, `--set` flags and
//! finally template questions for anything still unanswered.

use std::io::{BufRead, Write};
use std::path::Path;

use mcapp_core::answers::FlatAnswers;
use mcapp_core::types::Question;
use serde_yaml::Value;
use tracing::debug;

use crate::cli::AnswerArgs;
use crate::error::CliError;

/// Applies the answer file, values file and `--set` flags to `seed`.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, or a `--set`
/// argument has no `=`.
pub fn collect_answers(mut seed: FlatAnswers, args: &AnswerArgs) -> Result<FlatAnswers, CliError> {
    if let Some(path) = &args.answers {
        let answers = parse_answers(&read_file(path, "answers")?)?;
        debug!(path = %path.display(), count = answers.len(), "read answers file");
        seed.extend(answers);
    }
    if let Some(path) = &args.values {
        let values = parse_values(&read_file(path, "values")?)?;
        debug!(path = %path.display(), count = values.len(), "read values file");
        seed.extend(values);
    }
    for arg in &args.set {
        let (key, value) = parse_set(arg)?;
        seed.insert(key, value);
    }
    Ok(seed)
}

fn read_file(path: &Path, what: &str) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| {
        CliError::InvalidArgument(format!(
            "failed to read {what} file '{}': {e}",
            path.display()
        ))
    })
}

fn parse_document(content: &str) -> Result<Value, CliError> {
    serde_yaml::from_str(content)
        .map_err(|e| CliError::InvalidArgument(format!("invalid JSON or YAML: {e}")))
}

/// Renders a scalar as answer text; `None` for maps and lists.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn key_text(key: &Value) -> Result<String, CliError> {
    scalar_text(key)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| CliError::InvalidArgument(format!("invalid answer key: {key:?}")))
}

/// Parses an answers document: a JSON or YAML map of key to scalar.
///
/// # Errors
///
/// Returns an error if the document is not a map or a value is not a
/// scalar.
pub fn parse_answers(content: &str) -> Result<FlatAnswers, CliError> {
    let mut answers = FlatAnswers::new();
    let mapping = match parse_document(content)? {
        Value::Null => return Ok(answers),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(CliError::InvalidArgument(
                "answers file must be a map of key to value".to_string(),
            ));
        }
    };
    for (key, value) in &mapping {
        let key = key_text(key)?;
        let value = scalar_text(value).ok_or_else(|| {
            CliError::InvalidArgument(format!("answer '{key}' must be a single value"))
        })?;
        answers.insert(key, value);
    }
    Ok(answers)
}

/// Parses a Helm values document into flat answers.
///
/// Nested maps become dotted keys (`image.tag`) and list items are
/// indexed (`hosts[0]`). Null leaves are skipped.
///
/// # Errors
///
/// Returns an error if the document does not parse or a key is not a
/// scalar.
pub fn parse_values(content: &str) -> Result<FlatAnswers, CliError> {
    let mut values = FlatAnswers::new();
    flatten("", &parse_document(content)?, &mut values)?;
    Ok(values)
}

fn flatten(prefix: &str, value: &Value, out: &mut FlatAnswers) -> Result<(), CliError> {
    match value {
        Value::Null => {}
        Value::Mapping(mapping) => {
            for (key, child) in mapping {
                let key = key_text(key)?;
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out)?;
            }
        }
        Value::Sequence(items) => {
            for (i, child) in items.iter().enumerate() {
                flatten(&format!("{prefix}[{i}]"), child, out)?;
            }
        }
        Value::Tagged(tagged) => flatten(prefix, &tagged.value, out)?,
        scalar => {
            if prefix.is_empty() {
                return Err(CliError::InvalidArgument(
                    "values file must be a map".to_string(),
                ));
            }
            out.insert(prefix.to_string(), scalar_text(scalar).unwrap_or_default());
        }
    }
    Ok(())
}

/// Splits a `--set` argument on its first `=`.
///
/// # Errors
///
/// Returns an error if there is no `=` or the key is empty.
pub fn parse_set(arg: &str) -> Result<(String, String), CliError> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(CliError::InvalidArgument(format!(
            "invalid --set '{arg}', expected KEY=VALUE"
        ))),
    }
}

/// Asks template questions on a terminal.
#[derive(Debug)]
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Creates a prompter reading answers from `input`.
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Asks one question until it gets an acceptable answer.
    ///
    /// Empty input takes the default. Enum questions only accept one of
    /// their options.
    ///
    /// # Errors
    ///
    /// Returns an error on IO failure, or when input ends before a
    /// required question without a default is answered.
    pub fn ask(&mut self, question: &Question) -> Result<String, CliError> {
        loop {
            self.write_prompt(question)?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                if !question.default.is_empty() || !question.required {
                    return Ok(question.default.clone());
                }
                return Err(CliError::InvalidArgument(format!(
                    "no answer given for required question '{}'",
                    question.variable
                )));
            }

            let answer = line.trim();
            if answer.is_empty() {
                if !question.default.is_empty() || !question.required {
                    return Ok(question.default.clone());
                }
                writeln!(self.output, "A value is required.")?;
                continue;
            }
            if !question.options.is_empty() && !question.options.iter().any(|o| o == answer) {
                writeln!(
                    self.output,
                    "Must be one of: {}",
                    question.options.join(", ")
                )?;
                continue;
            }
            return Ok(answer.to_string());
        }
    }

    fn write_prompt(&mut self, question: &Question) -> Result<(), CliError> {
        if !question.description.is_empty() {
            writeln!(self.output, "{}", question.description)?;
        }
        let mut prompt = if question.label.is_empty() {
            question.variable.clone()
        } else {
            format!("{} ({})", question.label, question.variable)
        };
        if !question.kind.is_empty() {
            prompt.push_str(&format!(" [{}]", question.kind));
        }
        if !question.options.is_empty() {
            prompt.push_str(&format!(" {{{}}}", question.options.join("|")));
        }
        if !question.default.is_empty() {
            prompt.push_str(&format!(" (default: {})", question.default));
        }
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;
        Ok(())
    }
}

/// Fills answers for template questions not already answered.
///
/// With a prompter each open question is asked; without one, defaults are
/// filled in and questions without a default stay unanswered.
///
/// # Errors
///
/// Returns any prompt failure.
pub fn answer_questions<R: BufRead, W: Write>(
    questions: &[Question],
    answers: &mut FlatAnswers,
    mut prompter: Option<&mut Prompter<R, W>>,
) -> Result<(), CliError> {
    for question in questions {
        if question.variable.is_empty() || answers.contains_key(&question.variable) {
            continue;
        }
        let value = match prompter.as_deref_mut() {
            Some(prompter) => prompter.ask(question)?,
            None => question.default.clone(),
        };
        if value.is_empty() {
            debug!(variable = %question.variable, "question left unanswered");
            continue;
        }
        answers.insert(question.variable.clone(), value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn question(variable: &str, default: &str, required: bool) -> Question {
        Question {
            variable: variable.into(),
            default: default.into(),
            required,
            kind: "string".into(),
            ..Question::default()
        }
    }

    #[test]
    fn answers_accept_json() {
        let answers = parse_answers(r#"{"replicas": 3, "enabled": true, "c-1:p-1:tag": "v1"}"#)
            .expect("parse");
        assert_eq!(answers["replicas"], "3");
        assert_eq!(answers["enabled"], "true");
        assert_eq!(answers["c-1:p-1:tag"], "v1");
    }

    #[test]
    fn answers_accept_yaml() {
        let answers = parse_answers("replicas: 1.5\nmycluster:Default:image: redis\n").expect("parse");
        assert_eq!(answers["replicas"], "1.5");
        assert_eq!(answers["mycluster:Default:image"], "redis");
    }

    #[test]
    fn nested_answer_is_rejected() {
        let err = parse_answers("image:\n  tag: 1\n").expect_err("nested");
        assert!(err.to_string().contains("'image' must be a single value"));
    }

    #[test]
    fn empty_answers_file_is_empty_map() {
        assert!(parse_answers("").expect("parse").is_empty());
    }

    #[test]
    fn values_flatten_maps_and_lists() {
        let values = parse_values(
            "image:\n  repository: redis\n  tag: 6.0-alpine\nhosts:\n  - a.example\n  - b.example\nunset: null\n",
        )
        .expect("parse");
        assert_eq!(values["image.repository"], "redis");
        assert_eq!(values["image.tag"], "6.0-alpine");
        assert_eq!(values["hosts[0]"], "a.example");
        assert_eq!(values["hosts[1]"], "b.example");
        assert!(!values.contains_key("unset"));
    }

    #[test]
    fn set_splits_on_first_equals() {
        assert_eq!(
            parse_set("mycluster:opts=a=b").expect("parse"),
            ("mycluster:opts".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_set("empty=").expect("parse").1, "");
        assert!(matches!(parse_set("novalue"), Err(CliError::InvalidArgument(_))));
        assert!(parse_set("=x").is_err());
    }

    #[test]
    fn later_sources_override_earlier() {
        let mut answers_file = NamedTempFile::new().expect("temp");
        writeln!(answers_file, "replicas: 2\nname: from-file").expect("write");

        let seed = FlatAnswers::from([("replicas".to_string(), "1".to_string())]);
        let args = AnswerArgs {
            answers: Some(answers_file.path().to_path_buf()),
            values: None,
            set: vec!["replicas=5".into()],
        };
        let answers = collect_answers(seed, &args).expect("collect");
        assert_eq!(answers["replicas"], "5");
        assert_eq!(answers["name"], "from-file");
    }

    #[test]
    fn missing_file_is_invalid_argument() {
        let args = AnswerArgs {
            values: Some("/nonexistent/values.yaml".into()),
            ..AnswerArgs::default()
        };
        let err = collect_answers(FlatAnswers::new(), &args).expect_err("missing");
        assert!(err.to_string().contains("failed to read values file"));
    }

    #[test]
    fn no_prompt_fills_defaults_only() {
        let questions = vec![
            question("replicas", "1", true),
            question("password", "", true),
            question("tag", "latest", false),
        ];
        let mut answers = FlatAnswers::from([("tag".to_string(), "v2".to_string())]);
        answer_questions::<Cursor<&[u8]>, Vec<u8>>(&questions, &mut answers, None)
            .expect("answer");
        assert_eq!(answers["replicas"], "1");
        assert_eq!(answers["tag"], "v2");
        assert!(!answers.contains_key("password"));
    }

    #[test]
    fn prompt_uses_input_and_defaults() {
        let questions = vec![question("replicas", "1", true), question("name", "", true)];
        let mut prompter = Prompter::new(Cursor::new(&b"\n\ncache\n"[..]), Vec::new());
        let mut answers = FlatAnswers::new();
        answer_questions(&questions, &mut answers, Some(&mut prompter)).expect("answer");

        assert_eq!(answers["replicas"], "1");
        assert_eq!(answers["name"], "cache");
        let shown = String::from_utf8(prompter.output).expect("utf8");
        assert!(shown.contains("replicas [string] (default: 1): "));
        assert!(shown.contains("A value is required."));
    }

    #[test]
    fn prompt_enforces_enum_options() {
        let mut q = question("mode", "", true);
        q.options = vec!["standalone".into(), "cluster".into()];
        let mut prompter = Prompter::new(Cursor::new(&b"sharded\ncluster\n"[..]), Vec::new());
        assert_eq!(prompter.ask(&q).expect("ask"), "cluster");
        let shown = String::from_utf8(prompter.output).expect("utf8");
        assert!(shown.contains("Must be one of: standalone, cluster"));
    }

    #[test]
    fn prompt_fails_at_eof_for_required_question() {
        let mut prompter = Prompter::new(Cursor::new(&b""[..]), Vec::new());
        let err = prompter.ask(&question("name", "", true)).expect_err("eof");
        assert!(err.to_string().contains("required question 'name'"));
    }
}
