//! Compiled prompt templates with named `{placeholder}` substitution.
//!
//! Syntax: `{name}` is a placeholder, `{{` and `}}` are literal braces. Names follow the usual
//! identifier rule (`[A-Za-z_][A-Za-z0-9_]*`) and are case-sensitive. Compilation rejects
//! malformed braces up front so that rendering can only fail on a missing value.
//!
//! Values from `CONCIERGE_VAR_<NAME>` arrive under the lowercased `<name>`, so placeholders fed
//! from the environment must be written in lowercase (`{restaurant}`, not `{RESTAURANT}`).
//! `--var KEY=VALUE` keeps `KEY` as written.

use std::collections::BTreeMap;

/// Values supplied when rendering: variable name to replacement text.
pub type TemplateValues = BTreeMap<String, String>;

/// Error from compiling or rendering a [`PromptTemplate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// The template text is malformed. `position` is a byte offset into the source.
    #[error("invalid template at byte {position}: {message}")]
    Parse { position: usize, message: String },
    /// A placeholder referenced by the template has no value.
    #[error("missing value for template variable `{name}`")]
    MissingVariable { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Var(String),
}

/// A template string plus the variables it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
    variables: Vec<String>,
    input_variables: Vec<String>,
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse(source: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                literal.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                literal.push('}');
            }
            '}' => {
                return Err(TemplateError::Parse {
                    position: pos,
                    message: "single '}' encountered; use '}}' for a literal brace".to_string(),
                });
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(TemplateError::Parse {
                        position: pos,
                        message: "unclosed '{'".to_string(),
                    });
                }
                if !is_identifier(&name) {
                    return Err(TemplateError::Parse {
                        position: pos,
                        message: format!("invalid placeholder name {:?}", name),
                    });
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Var(name));
            }
            c => literal.push(c),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

impl PromptTemplate {
    /// Compiles `source`, binding it to the declared `input_variables`.
    ///
    /// The declared list does not restrict rendering: every placeholder the text references
    /// must be supplied at render time, declared or not.
    pub fn compile(
        source: impl Into<String>,
        input_variables: Vec<String>,
    ) -> Result<Self, TemplateError> {
        let source = source.into();
        let segments = parse(&source)?;
        let mut variables: Vec<String> = Vec::new();
        for seg in &segments {
            if let Segment::Var(name) = seg {
                if !variables.contains(name) {
                    variables.push(name.clone());
                }
            }
        }
        Ok(Self {
            source,
            segments,
            variables,
            input_variables,
        })
    }

    /// Raw template text as written in the source document.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Variables referenced by the text, in order of first appearance.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Variables declared alongside the template (`input_variables`).
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Referenced variables that are missing from the declared `input_variables`.
    pub fn undeclared_variables(&self) -> Vec<&str> {
        self.variables
            .iter()
            .filter(|v| !self.input_variables.contains(v))
            .map(String::as_str)
            .collect()
    }

    /// Renders the template with `values`.
    ///
    /// Resolves to the final string or to [`TemplateError::MissingVariable`] for the first
    /// referenced variable without a value. Extra values are ignored. Callers must await the
    /// result before using it to build anything that depends on it.
    pub async fn render(&self, values: &TemplateValues) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());
        for seg in &self.segments {
            match seg {
                Segment::Literal(s) => out.push_str(s),
                Segment::Var(name) => {
                    let value = values
                        .get(name)
                        .ok_or_else(|| TemplateError::MissingVariable { name: name.clone() })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> TemplateValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn substitutes_every_placeholder() {
        let t = PromptTemplate::compile(
            "Book {x} for {y}, then confirm {x}.",
            vec!["x".into(), "y".into()],
        )
        .unwrap();
        let out = t.render(&values(&[("x", "A"), ("y", "B")])).await.unwrap();
        assert_eq!(out, "Book A for B, then confirm A.");
        assert_eq!(t.variables(), ["x", "y"]);
    }

    #[tokio::test]
    async fn missing_value_fails_render() {
        let t = PromptTemplate::compile("{x} and {y}", vec!["x".into(), "y".into()]).unwrap();
        let err = t.render(&values(&[("x", "A")])).await.unwrap_err();
        assert_eq!(err, TemplateError::MissingVariable { name: "y".into() });
    }

    #[tokio::test]
    async fn double_braces_are_literals() {
        let t = PromptTemplate::compile("{{\"date\": \"{day}\"}}", vec![]).unwrap();
        let out = t.render(&values(&[("day", "today")])).await.unwrap();
        assert_eq!(out, "{\"date\": \"today\"}");
    }

    #[tokio::test]
    async fn plain_text_needs_no_values() {
        let t = PromptTemplate::compile("You are a booking assistant.", vec![]).unwrap();
        assert!(t.variables().is_empty());
        let out = t.render(&TemplateValues::new()).await.unwrap();
        assert_eq!(out, "You are a booking assistant.");
    }

    #[test]
    fn rejects_unclosed_brace() {
        let err = PromptTemplate::compile("Hello {name", vec![]).unwrap_err();
        assert!(matches!(err, TemplateError::Parse { position: 6, .. }));
    }

    #[test]
    fn rejects_stray_closing_brace() {
        let err = PromptTemplate::compile("oops }", vec![]).unwrap_err();
        assert!(matches!(err, TemplateError::Parse { position: 5, .. }));
    }

    #[test]
    fn rejects_bad_placeholder_names() {
        for src in ["{}", "{1st}", "{with space}", "{a-b}"] {
            assert!(
                matches!(PromptTemplate::compile(src, vec![]), Err(TemplateError::Parse { .. })),
                "{src} should not compile"
            );
        }
    }

    #[test]
    fn reports_undeclared_variables() {
        let t = PromptTemplate::compile("{a} {b} {c}", vec!["a".into()]).unwrap();
        assert_eq!(t.undeclared_variables(), vec!["b", "c"]);
        assert_eq!(t.input_variables(), ["a"]);
    }

    #[test]
    fn keeps_multibyte_text_intact() {
        let t = PromptTemplate::compile("예약 {name}님", vec!["name".into()]).unwrap();
        assert_eq!(t.source(), "예약 {name}님");
        assert_eq!(t.variables(), ["name"]);
    }
}
