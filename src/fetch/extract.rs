//! Ordered fallbacks for pulling a field out of loosely-shaped JSON.
//!
//! A [`FieldChain`] tries each candidate extractor in order and returns the
//! first hit; callers supply the default when none match.

use serde_json::Value;
use tracing::trace;

type Extractor<T> = Box<dyn Fn(&Value) -> Option<T> + Send + Sync>;

pub struct FieldChain<T> {
    name: &'static str,
    candidates: Vec<Extractor<T>>,
}

impl<T> FieldChain<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            candidates: Vec::new(),
        }
    }

    /// Appends a lower-priority candidate.
    pub fn then<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&Value) -> Option<T> + Send + Sync + 'static,
    {
        self.candidates.push(Box::new(extractor));
        self
    }

    pub fn extract(&self, item: &Value) -> Option<T> {
        self.candidates.iter().find_map(|candidate| candidate(item))
    }

    pub fn extract_or_else<F: FnOnce() -> T>(&self, item: &Value, default: F) -> T {
        self.extract(item).unwrap_or_else(|| {
            trace!(field = self.name, "No candidate matched, using default");
            default()
        })
    }
}

/// Non-empty string at a JSON pointer such as `/coordinates/latitude`.
pub fn text_at(pointer: &'static str) -> impl Fn(&Value) -> Option<String> + Send + Sync {
    move |item| {
        item.pointer(pointer)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Number at a JSON pointer. Numeric strings are accepted.
pub fn number_at(pointer: &'static str) -> impl Fn(&Value) -> Option<f64> + Send + Sync {
    move |item| match item.pointer(pointer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The `YYYY-MM-DD` prefix of a timestamp string at a JSON pointer.
pub fn date_prefix_at(pointer: &'static str) -> impl Fn(&Value) -> Option<String> + Send + Sync {
    let text = text_at(pointer);
    move |item| {
        let s = text(item)?;
        s.get(..10).map(str::to_string)
    }
}
