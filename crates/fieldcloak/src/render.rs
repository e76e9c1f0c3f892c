//! Rendering of arbitrary values into a single log field.

use serde::Serialize;
use thiserror::Error;

/// Failure to render a value for logging.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The value could not be serialised to JSON.
    #[error("failed to serialise value for logging: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Render `value` as a log string.
///
/// A string renders as itself, without quotes. A null renders as the empty
/// string. Anything else renders as compact JSON.
///
/// # Errors
///
/// Returns [`RenderError::Serialize`] if `value`'s `Serialize` impl fails, e.g.
/// a map with non-string keys.
pub fn log_string<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    // Re-serialise rather than printing the `Value`, which would sort keys.
    let rendered = match serde_json::to_value(value)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        _ => serde_json::to_string(value)?,
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Login {
        user: String,
        attempts: u32,
    }

    #[test]
    fn strings_render_raw() {
        assert_eq!(log_string("plain text").unwrap(), "plain text");
        assert_eq!(log_string(&String::from("a \"quoted\" word")).unwrap(), "a \"quoted\" word");
    }

    #[test]
    fn null_renders_empty() {
        assert_eq!(log_string(&None::<String>).unwrap(), "");
        assert_eq!(log_string(&()).unwrap(), "");
    }

    #[test]
    fn structs_render_as_compact_json() {
        let login = Login {
            user: "alice".into(),
            attempts: 2,
        };
        assert_eq!(log_string(&login).unwrap(), r#"{"user":"alice","attempts":2}"#);
        assert_eq!(log_string(&[1, 2, 3]).unwrap(), "[1,2,3]");
        assert_eq!(log_string(&true).unwrap(), "true");
    }

    #[test]
    fn non_string_map_keys_fail() {
        let map = HashMap::from([((1, 2), "x")]);
        assert!(matches!(log_string(&map), Err(RenderError::Serialize(_))));
    }
}
