//! Log entry formatting
//!
//! Pure transformations from typed logging events to the text blocks that
//! land on disk. Nothing in this module touches the filesystem.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Characters that are illegal in filenames on at least one supported platform
const ILLEGAL_FILENAME_CHARS: &[char] = &['/', ':', '\\', '?', '%', '*', '|', '"', '<', '>'];

/// Parameter keys whose values are masked before serialization
const SENSITIVE_KEYS: &[&str] = &["password", "old_password", "new_password"];

/// Placeholder substituted for masked parameter values
const MASK: &str = "***";

/// Timestamp format used inside log bodies (millisecond precision)
const BODY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Timestamp format used in per-call filenames
const FILENAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S%.3f";

/// Replace every filename-illegal character with an underscore.
pub fn sanitize_filename(name: &str) -> String {
    name.replace(|c: char| ILLEGAL_FILENAME_CHARS.contains(&c), "_")
}

/// Build the timestamped filename for a per-call log.
///
/// Millisecond precision: two entries logged inside the same millisecond
/// share a name and the later write wins.
pub(crate) fn per_call_filename(at: DateTime<Local>, name: &str) -> String {
    format!(
        "{}_{}.txt",
        at.format(FILENAME_TIMESTAMP_FORMAT),
        sanitize_filename(name)
    )
}

/// Mask sensitive values on a copy of the parameter mapping. The caller's
/// mapping is never mutated.
pub fn mask_parameters(parameters: &Map<String, Value>) -> Map<String, Value> {
    let mut masked = parameters.clone();
    for key in SENSITIVE_KEYS {
        if masked.contains_key(*key) {
            masked.insert((*key).to_string(), Value::from(MASK));
        }
    }
    masked
}

/// Render a value as pretty-printed JSON, falling back to its `Debug` text
/// when the value does not serialize. Never fails.
pub fn render_json<T>(value: &T) -> String
where
    T: Serialize + fmt::Debug + ?Sized,
{
    match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("JSON encoding failed: {}", e);
            format!("{:?}", value)
        }
    }
}

/// Render the elapsed time between request and response, e.g. `1.234 seconds`.
pub fn format_duration(request_time: DateTime<Local>, response_time: DateTime<Local>) -> String {
    let millis = response_time
        .signed_duration_since(request_time)
        .num_milliseconds();
    format!("{:.3} seconds", millis as f64 / 1000.0)
}

/// Compose the per-call text block for one API response.
#[allow(clippy::too_many_arguments)]
pub fn format_api_entry<T>(
    api_name: &str,
    parameters: Option<&Map<String, Value>>,
    request_time: DateTime<Local>,
    headers: Option<&BTreeMap<String, String>>,
    response: Option<&T>,
    response_time: DateTime<Local>,
    status_code: u16,
) -> String
where
    T: Serialize + fmt::Debug,
{
    let mut content = format!(
        "API: {}\nStatus Code: {}\n\nRequest Time: {}\nResponse Time: {}\nDuration: {}\n",
        api_name,
        status_code,
        request_time.format(BODY_TIMESTAMP_FORMAT),
        response_time.format(BODY_TIMESTAMP_FORMAT),
        format_duration(request_time, response_time),
    );

    if let Some(headers) = headers {
        content.push_str(&format!("\nHeaders:\n{}\n", render_json(headers)));
    }

    if let Some(parameters) = parameters {
        let masked = mask_parameters(parameters);
        if !masked.is_empty() {
            content.push_str(&format!("\nParameters:\n{}\n", render_json(&masked)));
        }
    }

    if let Some(response) = response {
        content.push_str(&format!("\nResponse:\n{}\n", render_json(response)));
    }

    content
}

/// Compose the per-call text block for one database query.
pub fn format_database_entry<T>(
    at: DateTime<Local>,
    db_name: &str,
    predicate: Option<&str>,
    limit: Option<usize>,
    count: usize,
    response: Option<&T>,
) -> String
where
    T: Serialize + fmt::Debug,
{
    let mut content = format!(
        "Timestamp: {}\nDatabase: {}\nRecords Found: {}\n",
        at.format(BODY_TIMESTAMP_FORMAT),
        db_name,
        count
    );

    if let Some(limit) = limit {
        content.push_str(&format!("Limit: {}\n", limit));
    }

    content.push_str(&format!("Predicate: {}\n\n", predicate.unwrap_or("None")));

    if let Some(response) = response {
        match serde_json::to_string_pretty(response) {
            Ok(json) => content.push_str(&format!("Response (JSON):\n{}\n\n", json)),
            Err(e) => {
                tracing::error!("JSON encoding failed: {}", e);
                content.push_str(&format!("Response:\n{:?}\n\n", response));
            }
        }
    }

    content
}

/// Compose the block appended to the continuous navigation log for one
/// screen-navigation event.
pub fn format_navigation_entry(at: DateTime<Local>, description: &str, title: &str) -> String {
    format!(
        "\nTimestamp: {}\nTitle: {}\nAction: {}\n-------------------------",
        at.format(BODY_TIMESTAMP_FORMAT),
        title,
        description
    )
}

/// Kind of control a recorded UI-test action targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    Shape,
    DatePicker,
    Checkbox,
    Picker,
    Button,
    TextEditor,
    TextField,
    SecureTextField,
    Image,
    Slider,
    Stepper,
    Toggle,
    Text,
    Menu,
}

/// Synthesize the test-automation command for one recorded action.
///
/// `into` names the target field for text-input controls and defaults to
/// an empty string when unspecified.
pub fn ui_test_command(kind: ControlKind, identifier: &str, into: Option<&str>) -> String {
    use ControlKind::*;

    match kind {
        Button | Image | Text | Menu | Shape | Stepper => format!("app.tap(\"{}\")\n", identifier),
        Slider => "app.adjustSlider()\n".to_string(),
        Toggle => format!("app.toggle(\"{}\")\n", identifier),
        TextField | TextEditor | SecureTextField => {
            format!("app.type(\"{}\", text: \"{}\")\n", into.unwrap_or(""), identifier)
        }
        // Every remaining kind records as a plain tap.
        _ => format!("app.tap(\"{}\")\n", identifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn local(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 14, h, m, s).unwrap()
    }

    #[test]
    fn test_sanitize_filename_strips_illegal_characters() {
        let sanitized = sanitize_filename("v1/users:list?page=2|\"hot\"<now>");
        for c in ['/', ':', '\\', '?', '%', '*', '|', '"', '<', '>'] {
            assert!(!sanitized.contains(c), "found illegal {:?}", c);
        }
        assert_eq!(sanitized, "v1_users_list_page=2__hot__now_");
    }

    #[test]
    fn test_mask_parameters_replaces_sensitive_values() {
        let mut params = Map::new();
        params.insert("user".to_string(), json!("ada"));
        params.insert("password".to_string(), json!("hunter2"));
        params.insert("new_password".to_string(), json!("hunter3"));

        let masked = mask_parameters(&params);
        assert_eq!(masked["user"], json!("ada"));
        assert_eq!(masked["password"], json!("***"));
        assert_eq!(masked["new_password"], json!("***"));
        // original mapping untouched
        assert_eq!(params["password"], json!("hunter2"));
    }

    #[test]
    fn test_format_duration_millisecond_precision() {
        let t0 = local(10, 0, 0);
        let t1 = t0 + chrono::Duration::milliseconds(1234);
        assert_eq!(format_duration(t0, t1), "1.234 seconds");
        assert_eq!(format_duration(t0, t0), "0.000 seconds");
    }

    #[test]
    fn test_api_entry_layout_and_masking() {
        let t0 = local(10, 0, 0);
        let t1 = t0 + chrono::Duration::milliseconds(250);
        let mut params = Map::new();
        params.insert("password".to_string(), json!("hunter2"));

        let content = format_api_entry(
            "auth/login",
            Some(&params),
            t0,
            None,
            Some(&json!({"ok": true})),
            t1,
            200,
        );

        assert!(content.starts_with("API: auth/login\nStatus Code: 200\n\nRequest Time: "));
        assert!(content.contains("Duration: 0.250 seconds\n"));
        assert!(content.contains("\nParameters:\n"));
        assert!(content.contains("***"));
        assert!(!content.contains("hunter2"));
        assert!(content.contains("\nResponse:\n"));
    }

    #[test]
    fn test_api_entry_omits_empty_sections() {
        let t0 = local(9, 30, 0);
        let content =
            format_api_entry::<Value>("health", None, t0, None, None, t0, 204);
        assert!(!content.contains("Headers:"));
        assert!(!content.contains("Parameters:"));
        assert!(!content.contains("Response:"));
    }

    #[test]
    fn test_database_entry_optional_limit_and_predicate() {
        let at = local(11, 15, 0);
        let with_limit = format_database_entry(
            at,
            "users.sqlite",
            Some("age > 21"),
            Some(50),
            3,
            Some(&json!([1, 2, 3])),
        );
        assert!(with_limit.contains("Database: users.sqlite\n"));
        assert!(with_limit.contains("Records Found: 3\n"));
        assert!(with_limit.contains("Limit: 50\n"));
        assert!(with_limit.contains("Predicate: age > 21\n"));
        assert!(with_limit.contains("Response (JSON):\n"));

        let without = format_database_entry::<Value>(at, "users.sqlite", None, None, 0, None);
        assert!(!without.contains("Limit:"));
        assert!(without.contains("Predicate: None\n"));
    }

    #[test]
    fn test_navigation_entry_block() {
        let at = local(8, 0, 5);
        let block = format_navigation_entry(at, "Settings opened", "Settings");
        assert!(block.starts_with("\nTimestamp: 2025-03-14 08:00:05.000\n"));
        assert!(block.contains("Title: Settings\n"));
        assert!(block.contains("Action: Settings opened\n"));
        assert!(block.ends_with("-------------------------"));
    }

    #[test]
    fn test_render_json_falls_back_to_debug_text() {
        // map keys that are not strings cannot be encoded as JSON
        let mut weird = std::collections::HashMap::new();
        weird.insert((1, 2), "x");

        let rendered = render_json(&weird);
        assert!(!rendered.is_empty());
        assert!(serde_json::from_str::<Value>(&rendered).is_err());
    }

    #[test]
    fn test_ui_test_commands() {
        assert_eq!(
            ui_test_command(ControlKind::Toggle, "darkModeSwitch", None),
            "app.toggle(\"darkModeSwitch\")\n"
        );
        assert_eq!(
            ui_test_command(ControlKind::Button, "saveButton", None),
            "app.tap(\"saveButton\")\n"
        );
        assert_eq!(
            ui_test_command(ControlKind::Slider, "volume", None),
            "app.adjustSlider()\n"
        );
        assert_eq!(
            ui_test_command(ControlKind::TextField, "ada@example.com", Some("emailField")),
            "app.type(\"emailField\", text: \"ada@example.com\")\n"
        );
        // target defaults to an empty string
        assert_eq!(
            ui_test_command(ControlKind::SecureTextField, "pw", None),
            "app.type(\"\", text: \"pw\")\n"
        );
        // kinds without a dedicated template fall back to tap
        assert_eq!(
            ui_test_command(ControlKind::DatePicker, "dueDate", None),
            "app.tap(\"dueDate\")\n"
        );
    }
}
