//! JSON parsing utilities for the request-service client.

use anyhow::Result;

/// Attempt to parse JSON and, on failure, include a contextual snippet of the
/// line where the error occurred along with the serde path and type mismatch.
pub fn parse_json_with_context<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    let jd = &mut serde_json::Deserializer::from_str(body);
    match serde_path_to_error::deserialize(jd) {
        Ok(value) => Ok(value),
        Err(err) => {
            let inner_err = err.inner();
            let (line, column) = (inner_err.line(), inner_err.column());
            let path = err.path().to_string();

            let msg = inner_err.to_string();
            let loc = format!(" at line {line} column {column}");
            let msg_without_loc = msg.strip_suffix(&loc).unwrap_or(&msg);

            let mut final_err = String::new();
            if !path.is_empty() && path != "." {
                final_err.push_str(&format!("at path '{path}': "));
            }
            final_err.push_str(&format!(
                "{} (line {line} col {column})\n{}",
                describe_mismatch(msg_without_loc),
                error_snippet(body, line, column, 20)
            ));

            Err(anyhow::anyhow!(final_err))
        }
    }
}

/// Rewrite "invalid type: X, expected Y" as "expected Y, got X".
fn describe_mismatch(error_msg: &str) -> String {
    if let Some(rest) = error_msg.strip_prefix("invalid type: ")
        && let Some((actual, expected)) = rest.split_once(", expected ")
    {
        return format!("expected {}, got {actual}", expected.trim());
    }
    error_msg.to_string()
}

fn error_snippet(body: &str, line: usize, column: usize, context_len: usize) -> String {
    let target_line = body.lines().nth(line.saturating_sub(1)).unwrap_or("");
    if target_line.is_empty() {
        return "(empty line)".to_string();
    }

    // Byte offsets; back off to char boundaries so titles with accents never panic.
    let error_idx = column.saturating_sub(1).min(target_line.len());
    let half_len = context_len / 2;
    let mut start = error_idx.saturating_sub(half_len);
    while !target_line.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (error_idx + half_len).min(target_line.len());
    while !target_line.is_char_boundary(end) {
        end += 1;
    }

    let indicator = " ".repeat(error_idx - start) + "^";
    format!("...{}...\n   {indicator}", &target_line[start..end])
}
