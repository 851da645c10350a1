//! Lint: every `[X]` button the UI draws must be tappable.
//!
//! Button text pushed with `cl.push(...)` is drawn but never registered as a
//! click target, which works with a keyboard and silently fails on touch.
//! Buttons must go through `push_clickable()` or `ButtonBar`.
//!
//! Statements are scanned as a whole (split on `;`), so a `push(` whose
//! arguments span several lines is still caught.

use std::fs;
use std::path::Path;

/// Files that draw lines into a `ClickableList`.
const SCANNED: [&str; 2] = ["src/tower/render.rs", "src/widgets.rs"];

/// A bracket key like `[I]`, `[S]`, `[1]`.
fn contains_bracket_key(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 3 {
        return false;
    }
    (0..bytes.len() - 2).any(|i| {
        let ch = bytes[i + 1];
        bytes[i] == b'[' && bytes[i + 2] == b']' && (ch.is_ascii_alphanumeric() || b"-=!~|".contains(&ch))
    })
}

/// Source with line comments removed, keeping line numbers intact.
fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| if line.trim_start().starts_with("//") { "" } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `(first line number, statement)` for every statement that pushes a
/// bracket key without registering it.
fn find_unclickable_buttons(source: &str) -> Vec<(usize, String)> {
    let source = strip_comments(source);
    let mut violations = Vec::new();
    let mut line = 1;
    for stmt in source.split(';') {
        let leading = stmt.len() - stmt.trim_start().len();
        let start = line + stmt[..leading].matches('\n').count();
        line += stmt.matches('\n').count();

        let pushes = stmt.contains(".push(");
        let registers = stmt.contains("push_clickable(") || stmt.contains(".button(");
        if pushes && !registers && contains_bracket_key(stmt) {
            let compact: Vec<&str> = stmt.split_whitespace().collect();
            violations.push((start, compact.join(" ")));
        }
    }
    violations
}

/// Names of the `pub const X: u16` action IDs.
fn action_ids(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|l| l.trim().strip_prefix("pub const "))
        .filter_map(|rest| rest.split_once(": u16"))
        .map(|(name, _)| name.to_string())
        .collect()
}

#[test]
fn no_bracket_keys_in_non_clickable_push() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut msg = String::new();
    for file in SCANNED {
        let source = fs::read_to_string(root.join(file)).unwrap();
        for (line, stmt) in find_unclickable_buttons(&source) {
            msg.push_str(&format!("  {}:{}: {}\n", file, line, stmt));
        }
    }
    assert!(
        msg.is_empty(),
        "bracket-key text drawn with push(); use push_clickable() or ButtonBar:\n{}",
        msg
    );
}

#[test]
fn every_action_id_is_drawn() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let actions = fs::read_to_string(root.join("src/tower/actions.rs")).unwrap();
    let render = fs::read_to_string(root.join("src/tower/render.rs")).unwrap();
    let ids = action_ids(&actions);
    assert!(ids.len() > 20);
    let missing: Vec<&String> = ids.iter().filter(|id| !render.contains(id.as_str())).collect();
    assert!(missing.is_empty(), "action IDs never drawn: {:?}", missing);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_bracket_key_in_push() {
        let source = r#"cl.push(Line::from(" [I] Import  [S] Stats"));"#;
        assert_eq!(find_unclickable_buttons(source).len(), 1);
    }

    #[test]
    fn detects_push_spanning_lines() {
        let source = "let a = 1;\ncl.push(Line::from(Span::styled(\n    \"[U] Upgrade\",\n    style,\n)));";
        let v = find_unclickable_buttons(source);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].0, 2);
    }

    #[test]
    fn allows_push_clickable() {
        let source = "cl.push_clickable(\n    button(\"[R] Rush\".to_string(), true),\n    RUSH_BUILD,\n);";
        assert!(find_unclickable_buttons(source).is_empty());
    }

    #[test]
    fn ignores_comments() {
        let source = "// cl.push(Line::from(\" [I] Import\"));\ncl.push(Line::from(\"\"));";
        assert!(find_unclickable_buttons(source).is_empty());
    }

    #[test]
    fn bracket_key_detection() {
        assert!(contains_bracket_key("[I]"));
        assert!(contains_bracket_key("[1]"));
        assert!(contains_bracket_key("[-]"));
        assert!(!contains_bracket_key("[]"));
        assert!(!contains_bracket_key("[Esc]"));
        assert!(!contains_bracket_key("[{}]"));
        assert!(!contains_bracket_key("abc"));
    }

    #[test]
    fn action_ids_parsed() {
        let source = "pub const OPEN_BUILD: u16 = 1;\n/// doc\npub const LIST_RANGE: u16 = 90;\nconst X: u8 = 2;";
        assert_eq!(action_ids(source), vec!["OPEN_BUILD", "LIST_RANGE"]);
    }
}
