use serde_json::Value;

/// Matches records whose top-level `field` equals `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqFilter {
    pub field: &'static str,
    pub value: String,
}

impl EqFilter {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// Used by backends that keep records as JSON.
    pub fn matches(&self, record: &Value) -> bool {
        record
            .get(self.field)
            .and_then(Value::as_str)
            .is_some_and(|v| v == self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn matches_only_equal_strings() {
        let filter = EqFilter::new("status", "active");

        assert!(filter.matches(&json!({ "status": "active" })));
        assert!(!filter.matches(&json!({ "status": "completed" })));
        assert!(!filter.matches(&json!({ "status": "Active" })));
        assert!(!filter.matches(&json!({ "other": "active" })));
        assert!(!filter.matches(&json!({ "status": 1 })));
    }
}
