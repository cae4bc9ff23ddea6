//! Option templates rendered against an event payload.
//!
//! Options are minijinja templates over the payload: `{{ data }}`,
//! `{{ article.title }}`, `{{ article.paragraphs.0 }}`. Missing values and
//! null render as an empty string; strings render verbatim. Text without
//! template markers is returned as is.

use minijinja::{Environment, Error, Output, State, UndefinedBehavior, escape_formatter};
use serde_json::{Map, Value};
use tracing::trace;

fn is_template(text: &str) -> bool {
    text.contains("{{") || text.contains("{%") || text.contains("{#")
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Lenient);
    env.set_keep_trailing_newline(true);
    env.set_formatter(skip_none);
    env
}

fn skip_none(
    out: &mut Output<'_>,
    state: &State<'_, '_>,
    value: &minijinja::Value,
) -> Result<(), Error> {
    if value.is_none() {
        return Ok(());
    }
    escape_formatter(out, state, value)
}

/// Check that `template` parses.
pub fn check(template: &str) -> Result<(), Error> {
    if !is_template(template) {
        return Ok(());
    }
    environment().template_from_str(template).map(|_| ())
}

/// Render `template` against `payload`.
pub fn interpolate(template: &str, payload: &Map<String, Value>) -> Result<String, Error> {
    if !is_template(template) {
        return Ok(template.to_string());
    }
    let env = environment();
    let rendered = env.template_from_str(template)?.render(payload)?;
    trace!("Interpolated {template:?} -> {} chars", rendered.len());
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Map<String, Value> {
        json!({
            "data": "Hello.",
            "count": 3,
            "flag": true,
            "nothing": null,
            "article": {"title": "Rust", "paragraphs": ["First.", "Second."]}
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn render(template: &str) -> String {
        interpolate(template, &payload()).unwrap()
    }

    #[test]
    fn substitutes_top_level_keys() {
        assert_eq!(render("{{data}}"), "Hello.");
        assert_eq!(render("n={{ count }}, f={{flag}}"), "n=3, f=true");
    }

    #[test]
    fn follows_nested_paths_and_indices() {
        assert_eq!(
            render("{{ article.title }}: {{ article.paragraphs.1 }}"),
            "Rust: Second."
        );
    }

    #[test]
    fn missing_and_null_render_empty() {
        assert_eq!(render("[{{ missing }}]"), "[]");
        assert_eq!(render("[{{ nothing }}]"), "[]");
        assert_eq!(render("[{{ article.paragraphs.9 }}]"), "[]");
        assert_eq!(render("[{{ data.deeper }}]"), "[]");
    }

    #[test]
    fn structured_values_render_their_items() {
        let rendered = render("{{ article.paragraphs }}");
        assert!(rendered.contains("First."), "{rendered}");
        assert!(rendered.contains("Second."), "{rendered}");
    }

    #[test]
    fn text_without_tags_is_unchanged() {
        assert_eq!(render("plain text"), "plain text");
        assert_eq!(render(""), "");
        assert_eq!(render("{ not a tag }"), "{ not a tag }");
    }

    #[test]
    fn values_are_not_html_escaped() {
        let payload = json!({"data": "Tom & Jerry <3"}).as_object().cloned().unwrap();
        assert_eq!(interpolate("{{ data }}", &payload).unwrap(), "Tom & Jerry <3");
    }

    #[test]
    fn unterminated_tag_is_a_syntax_error() {
        assert!(interpolate("a {{ data", &payload()).is_err());
        assert!(check("a {{ data").is_err());
        assert!(check("{{ data }}").is_ok());
        assert!(check("plain").is_ok());
    }
}
