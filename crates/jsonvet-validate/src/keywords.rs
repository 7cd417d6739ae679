//! Keyword context and `${token}` message templating.

use serde_json::Value;
use std::collections::BTreeMap;

/// Token name → value map used to render message templates.
///
/// The engine seeds every field with `name`, `value` and `path`; rules add
/// their own tokens (`minimum`, `maximum`, `pattern`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keywords {
    values: BTreeMap<String, Value>,
}

impl Keywords {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for one field.
    ///
    /// An absent value is left out so `${value}` stays verbatim.
    pub fn for_field(name: &str, value: Option<&Value>, path: &str) -> Self {
        let mut keywords = Self::new();
        keywords.insert("name", name);
        if let Some(value) = value {
            keywords.insert("value", value.clone());
        }
        keywords.insert("path", path);
        keywords
    }

    /// Set a token, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder form of [`Keywords::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Value of a token.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// `true` if the token is set.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Render `template`, replacing each `${token}` with its value.
    ///
    /// Tokens that are unknown or bound to null stay verbatim. Substituted
    /// text is not scanned again.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let token = &after[..end];
                    match self.values.get(token).and_then(display_value) {
                        Some(text) => out.push_str(&text),
                        None => out.push_str(&rest[start..start + 2 + end + 1]),
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(format_number(n)),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Integral floats print without a fraction (`10.0` → `10`).
fn format_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// Render a float bound the same way numbers in data are rendered.
pub(crate) fn number_value(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn substitutes_known_tokens() {
        let keywords = Keywords::for_field("UserName", Some(&json!("ab")), "/users[0]/name");
        assert_eq!(
            keywords.render("${name} at ${path} was ${value}"),
            "UserName at /users[0]/name was ab"
        );
    }

    #[test]
    fn unknown_and_null_tokens_stay_verbatim() {
        let keywords = Keywords::for_field("age", Some(&Value::Null), "/age");
        assert_eq!(
            keywords.render("${name}: ${value} ${minimum}"),
            "age: ${value} ${minimum}"
        );

        let absent = Keywords::for_field("age", None, "/age");
        assert!(!absent.contains("value"));
        assert_eq!(absent.render("${value}"), "${value}");
    }

    #[test]
    fn substituted_text_is_not_expanded_again() {
        let keywords = Keywords::new()
            .with("name", "${path}")
            .with("path", "/x");
        assert_eq!(keywords.render("${name} ${path}"), "${path} /x");
    }

    #[test]
    fn unterminated_token_is_kept() {
        let keywords = Keywords::new().with("name", "age");
        assert_eq!(keywords.render("${name} ${name"), "age ${name");
    }

    #[test]
    fn numbers_render_compactly() {
        let keywords = Keywords::new()
            .with("minimum", number_value(0.0))
            .with("maximum", number_value(10.5))
            .with("count", 3);
        assert_eq!(keywords.render("${minimum}-${maximum}-${count}"), "0-10.5-3");
    }

    #[test]
    fn structured_values_render_as_json() {
        let keywords = Keywords::new().with("value", json!([1, 2]));
        assert_eq!(keywords.render("got ${value}"), "got [1,2]");
    }
}
