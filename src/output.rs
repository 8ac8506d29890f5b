//! CLI output controls.
//!
//! CHANGELOG:
//! - 01/30/2026 - Reduced to json/compact for the WhatsApp CLI

use serde::Serialize;
use serde_json::json;

/// Output settings from global CLI flags.
#[derive(Debug, Clone, Default)]
pub struct OutputControls {
    pub json: bool,
    pub compact: bool,
}

impl OutputControls {
    /// Serialize `data` as pretty or compact JSON.
    pub fn emit<T: Serialize>(&self, data: &T) -> String {
        let value = serde_json::to_value(data).unwrap_or(json!(null));
        let rendered = if self.compact {
            serde_json::to_string(&value)
        } else {
            serde_json::to_string_pretty(&value)
        };
        rendered.unwrap_or_else(|_| "null".to_string())
    }

    pub fn print<T: Serialize>(&self, data: &T) {
        println!("{}", self.emit(data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_has_no_whitespace() {
        let controls = OutputControls {
            json: true,
            compact: true,
        };
        assert_eq!(controls.emit(&json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn test_pretty_is_multiline() {
        let controls = OutputControls {
            json: true,
            compact: false,
        };
        assert!(controls.emit(&json!({"a": 1})).contains('\n'));
    }
}
