use std::collections::HashMap;

/// Sentinel that should never appear in real templates.
const ESCAPE_SENTINEL: &str = "\x00LBRACE\x00";
/// Sentinel for escaped closing brace.
const ESCAPE_SENTINEL_CLOSE: &str = "\x00RBRACE\x00";

/// Render an instruction template with variable substitution.
///
/// Replaces `{key}` placeholders with values from `vars`. Unknown
/// placeholders are left untouched.
///
/// Use `{{` to insert a literal `{` and `}}` to insert a literal `}`.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use llm_workflows::prompt::render;
///
/// let mut vars = HashMap::new();
/// vars.insert("today".to_string(), "Monday, June 02, 2025".to_string());
/// let result = render("Today is {today}. Reply as {{\"ok\": true}}", &vars);
/// assert_eq!(result, r#"Today is Monday, June 02, 2025. Reply as {"ok": true}"#);
/// ```
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    // Pass 1: protect escaped braces
    let mut rendered = template.replace("{{", ESCAPE_SENTINEL);
    rendered = rendered.replace("}}", ESCAPE_SENTINEL_CLOSE);

    // Pass 2: substitute placeholders
    for (key, value) in vars {
        let placeholder = format!("{{{}}}", key);
        rendered = rendered.replace(&placeholder, value);
    }

    // Pass 3: restore escaped braces
    rendered = rendered.replace(ESCAPE_SENTINEL, "{");
    rendered = rendered.replace(ESCAPE_SENTINEL_CLOSE, "}");
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_basic() {
        let result = render(
            "Today is {today}. Analyze if the text describes a calendar event.",
            &vars(&[("today", "Friday, January 10, 2025")]),
        );
        assert_eq!(
            result,
            "Today is Friday, January 10, 2025. Analyze if the text describes a calendar event."
        );
    }

    #[test]
    fn test_render_no_placeholders() {
        let result = render("static instruction", &vars(&[("today", "x")]));
        assert_eq!(result, "static instruction");
    }

    #[test]
    fn test_render_unknown_placeholder_kept() {
        let result = render("Hello {name}", &HashMap::new());
        assert_eq!(result, "Hello {name}");
    }

    #[test]
    fn test_render_escaped_braces() {
        let result = render(
            "Hello {name}, JSON: {{\"key\": \"val\"}}",
            &vars(&[("name", "Alice")]),
        );
        assert_eq!(result, r#"Hello Alice, JSON: {"key": "val"}"#);
    }

    #[test]
    fn test_render_escaped_braces_no_substitution() {
        let result = render(
            "Output format: {{\"result\": {{\"value\": 42}}}}",
            &HashMap::new(),
        );
        assert_eq!(result, r#"Output format: {"result": {"value": 42}}"#);
    }
}
