use super::store::Record;
use serde_json::Value;

const INDENT: &str = "  ";

/// Renders a recording as human-readable lines.
///
/// The first line is `"<group>: <description>"`. Each key follows on its own
/// line, indented two spaces per nesting level; nested mappings print `key:`
/// and then their children one level deeper.
pub fn describe_lines(group: &str, description: &str, record: &Record) -> Vec<String> {
    let mut lines = vec![format!("{group}: {description}")];
    push_entries(&mut lines, INDENT, record);
    lines
}

fn push_entries(lines: &mut Vec<String>, prefix: &str, entries: &Record) {
    for (key, value) in entries {
        match value {
            Value::Object(children) => {
                lines.push(format!("{prefix}{key}:"));
                push_entries(lines, &format!("{prefix}{INDENT}"), children);
            }
            leaf => lines.push(format!("{prefix}{key}: {}", render_value(leaf))),
        }
    }
}

/// Strings print bare; everything else prints as compact JSON
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
