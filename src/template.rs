// ABOUTME: Placeholder substitution for task and agent templates.
// ABOUTME: Replaces `{name}` tokens from an input bundle; stray braces pass through.

use std::collections::HashMap;

use crate::error::TemplateError;

/// Caller-supplied parameters for a run, e.g. `{"stock": "Tata Steel"}`.
pub type Inputs = HashMap<String, String>;

/// A well-formed placeholder found in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placeholder<'a> {
    /// Byte offset of the opening brace.
    start: usize,
    /// Byte offset one past the closing brace.
    end: usize,
    name: &'a str,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Find the next well-formed `{name}` at or after `from`.
fn next_placeholder(template: &str, from: usize) -> Option<Placeholder<'_>> {
    let mut cursor = from;
    while let Some(offset) = template[cursor..].find('{') {
        let start = cursor + offset;
        let body = &template[start + 1..];
        let name_len = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());

        if name_len > 0 && body[name_len..].starts_with('}') {
            return Some(Placeholder {
                start,
                end: start + 1 + name_len + 1,
                name: &body[..name_len],
            });
        }

        cursor = start + 1;
    }
    None
}

/// List the distinct placeholder names in a template, in order of first use.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    let mut cursor = 0;
    while let Some(p) = next_placeholder(template, cursor) {
        if !names.contains(&p.name) {
            names.push(p.name);
        }
        cursor = p.end;
    }
    names
}

/// Substitute every placeholder from `inputs`.
///
/// Fails on the first placeholder with no matching key.
pub fn render(template: &str, inputs: &Inputs) -> Result<String, TemplateError> {
    render_with::<&str>(template, inputs, &[])
}

/// Substitute placeholders from `inputs`, leaving names in `passthrough`
/// untouched when the bundle has no value for them.
///
/// Values are inserted as-is and never re-scanned.
pub fn render_with<S: AsRef<str>>(
    template: &str,
    inputs: &Inputs,
    passthrough: &[S],
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;

    while let Some(p) = next_placeholder(template, cursor) {
        out.push_str(&template[cursor..p.start]);
        match inputs.get(p.name) {
            Some(value) => out.push_str(value),
            None if passthrough.iter().any(|n| n.as_ref() == p.name) => {
                out.push_str(&template[p.start..p.end]);
            }
            None => return Err(TemplateError::MissingParameter(p.name.to_string())),
        }
        cursor = p.end;
    }

    out.push_str(&template[cursor..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(pairs: &[(&str, &str)]) -> Inputs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_all_occurrences() {
        let rendered = render(
            "Latest data about {stock}, cash flow for stock {stock}",
            &inputs(&[("stock", "Tata Steel")]),
        )
        .unwrap();
        assert_eq!(
            rendered,
            "Latest data about Tata Steel, cash flow for stock Tata Steel"
        );
        assert!(!rendered.contains("{stock}"));
    }

    #[test]
    fn test_render_without_placeholders() {
        let rendered = render("Summarise provided information", &Inputs::new()).unwrap();
        assert_eq!(rendered, "Summarise provided information");
    }

    #[test]
    fn test_missing_parameter_names_placeholder() {
        let err = render("Provide a response to {query}", &Inputs::new()).unwrap_err();
        assert_eq!(err, TemplateError::MissingParameter("query".into()));
    }

    #[test]
    fn test_stray_braces_pass_through() {
        let template = "Return JSON like { \"a\": 1 } or {} or a lone { and } for {topic}";
        let rendered = render(template, &inputs(&[("topic", "AI")])).unwrap();
        assert_eq!(
            rendered,
            "Return JSON like { \"a\": 1 } or {} or a lone { and } for AI"
        );
    }

    #[test]
    fn test_unterminated_placeholder_passes_through() {
        let rendered = render("Explore {topic", &inputs(&[("topic", "AI")])).unwrap();
        assert_eq!(rendered, "Explore {topic");
    }

    #[test]
    fn test_nested_brace_before_placeholder() {
        let rendered = render("{{topic}}", &inputs(&[("topic", "AI")])).unwrap();
        assert_eq!(rendered, "{AI}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let rendered = render("{a}", &inputs(&[("a", "{b}")])).unwrap();
        assert_eq!(rendered, "{b}");
    }

    #[test]
    fn test_passthrough_leaves_dependency_names() {
        let rendered = render_with(
            "Analyse {collect} for {topic}",
            &inputs(&[("topic", "AI")]),
            &["collect"],
        )
        .unwrap();
        assert_eq!(rendered, "Analyse {collect} for AI");
    }

    #[test]
    fn test_input_wins_over_passthrough() {
        let rendered =
            render_with("{collect}", &inputs(&[("collect", "x")]), &["collect"]).unwrap();
        assert_eq!(rendered, "x");
    }

    #[test]
    fn test_placeholders_are_distinct_and_ordered() {
        let names = placeholders("{query} then {topic} and {query} but not { x }");
        assert_eq!(names, vec!["query", "topic"]);
    }

    #[test]
    fn test_multibyte_text_around_placeholders() {
        let rendered = render("₹ crore für {stock} ✓", &inputs(&[("stock", "HDFC")])).unwrap();
        assert_eq!(rendered, "₹ crore für HDFC ✓");
    }
}
