use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// One step of a key path into a loosely shaped JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for PathStep<'a> {
    fn from(key: &'a str) -> Self {
        PathStep::Key(key)
    }
}

impl From<usize> for PathStep<'_> {
    fn from(index: usize) -> Self {
        PathStep::Index(index)
    }
}

/// Walk `path` from `root`. Missing keys, out-of-range indices, a step into
/// the wrong kind of container and explicit `null` all come back as `None`.
pub fn lookup<'v>(root: &'v Value, path: &[PathStep<'_>]) -> Option<&'v Value> {
    let mut current = root;
    for step in path {
        current = match (step, current) {
            (PathStep::Key(key), Value::Object(map)) => map.get(*key)?,
            (PathStep::Index(index), Value::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }

    match current {
        Value::Null => None,
        other => Some(other),
    }
}

/// A value declared numeric by the record, kept as text when the model sent
/// something that does not read as a number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(number) => Scalar::Number(number),
                None => Scalar::Text(n.to_string()),
            },
            Value::String(s) => match parse_number(s) {
                Some(number) => Scalar::Number(number),
                None => Scalar::Text(s.clone()),
            },
            other => Scalar::Text(other.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", format_number(*n)),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Numeric-looking strings such as `"250"` or `" 12.5 "`. Non-finite values
/// are not numbers for our purposes.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// `250.0` prints as `250`, `12.5` stays `12.5`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Strings pass through; any other value is shown as its JSON text.
/// Blank strings count as absent.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub fn as_text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(as_text).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_and_indexed() {
        let doc = json!({"a": {"b": [10, {"c": "deep"}]}});

        assert_eq!(lookup(&doc, &["a".into(), "b".into(), PathStep::Index(0)]), Some(&json!(10)));
        assert_eq!(
            lookup(&doc, &["a".into(), "b".into(), PathStep::Index(1), "c".into()]),
            Some(&json!("deep"))
        );
    }

    #[test]
    fn test_lookup_degrades_to_none() {
        let doc = json!({"a": {"b": [1]}, "n": null, "s": "text"});

        assert_eq!(lookup(&doc, &["missing".into()]), None);
        assert_eq!(lookup(&doc, &["a".into(), "b".into(), PathStep::Index(5)]), None);
        assert_eq!(lookup(&doc, &["a".into(), PathStep::Index(0)]), None);
        assert_eq!(lookup(&doc, &["s".into(), "inner".into()]), None);
        assert_eq!(lookup(&doc, &["n".into()]), None);
    }

    #[test]
    fn test_scalar_coercion() {
        assert_eq!(Scalar::from_value(&json!(80)), Scalar::Number(80.0));
        assert_eq!(Scalar::from_value(&json!("80")), Scalar::Number(80.0));
        assert_eq!(Scalar::from_value(&json!(" 12.5 ")), Scalar::Number(12.5));
        assert_eq!(Scalar::from_value(&json!("about 80")), Scalar::Text("about 80".to_string()));
        assert_eq!(Scalar::from_value(&json!("NaN")), Scalar::Text("NaN".to_string()));
        assert_eq!(Scalar::from_value(&json!(true)), Scalar::Text("true".to_string()));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(650.0), "650");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(Scalar::Number(350.0).to_string(), "350");
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(as_text(&json!("Pizza")), Some("Pizza".to_string()));
        assert_eq!(as_text(&json!("  ")), None);
        assert_eq!(as_text(&json!(42)), Some("42".to_string()));
        assert_eq!(
            as_text_list(&json!(["Bun", null, 3])),
            vec!["Bun".to_string(), "3".to_string()]
        );
        assert!(as_text_list(&json!("Bun, Cheese")).is_empty());
    }
}
