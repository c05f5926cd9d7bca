use anyhow::Result;
use serde::Serialize;
use serde_json::json;

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// A prompt in place of results, e.g. when grades are missing. Carries the
/// same `action` values the HTTP API reports.
pub fn render_prompt_json(message: &str, action: Option<&str>) -> Result<String> {
    let mut body = json!({ "ok": false, "error": message });
    if let Some(action) = action {
        body["action"] = json!(action);
    }
    render_json(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_action_only_when_present() {
        let with_action = render_prompt_json("enter grades", Some("enter_grades")).unwrap();
        assert!(with_action.contains("\"action\": \"enter_grades\""));
        let without = render_prompt_json("catalog down", None).unwrap();
        assert!(!without.contains("action"));
    }
}
