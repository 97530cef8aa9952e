//! GitHub Actions output formatting

/// Escape content for GitHub Actions output and workflow commands
pub fn safe_output_escape(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Format a list of values as a JSON array string
pub fn format_json_array(values: &[&str]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

/// Render an `::error::` workflow command for `message`.
///
/// Multi-line messages stay a single annotation.
pub fn error_command(message: &str) -> String {
    format!("::error::{}", safe_output_escape(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_output_escape() {
        assert_eq!(safe_output_escape("100%\r\nDone"), "100%25%0D%0ADone");
        assert_eq!(safe_output_escape("plain"), "plain");
    }

    #[test]
    fn test_format_json_array() {
        assert_eq!(format_json_array(&[]), "[]");
        assert_eq!(format_json_array(&["court", "say \"hi\""]), r#"["court","say \"hi\""]"#);
    }

    #[test]
    fn test_error_command_single_line() {
        let msg = "Failed to parse checks file as YAML\nmapping values are not allowed";
        assert_eq!(
            error_command(msg),
            "::error::Failed to parse checks file as YAML%0Amapping values are not allowed"
        );
    }
}
