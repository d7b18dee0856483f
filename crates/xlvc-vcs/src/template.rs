//! Commit message templating: `{action}`, `{filename}`, `{timestamp}`,
//! `{branch}`, `{files}`, plus caller-supplied key/value pairs.

use std::collections::BTreeMap;

use regex::Regex;

/// The kind of change a commit records, substituted for `{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Update,
    Delete,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// Render `template`, substituting every recognized or caller-supplied
/// placeholder present in `values`. A placeholder whose key is present but
/// whose value is `None` renders as the empty string ("missing"). A
/// `{word}` token whose key is absent from `values` entirely is passed
/// through literally ("unknown").
pub fn render(template: &str, values: &BTreeMap<String, Option<String>>) -> String {
    let re = Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid");
    re.replace_all(template, |caps: &regex::Captures| {
        let key = &caps[1];
        match values.get(key) {
            Some(Some(value)) => value.clone(),
            Some(None) => String::new(),
            None => caps[0].to_string(),
        }
    })
    .into_owned()
}

/// Build the recognized placeholder set for one commit.
pub fn standard_placeholders(
    action: Action,
    filename: &str,
    timestamp: &str,
    branch: Option<&str>,
    files: usize,
) -> BTreeMap<String, Option<String>> {
    let mut values = BTreeMap::new();
    values.insert("action".to_string(), Some(action.as_str().to_string()));
    values.insert("filename".to_string(), Some(filename.to_string()));
    values.insert("timestamp".to_string(), Some(timestamp.to_string()));
    values.insert("branch".to_string(), branch.map(str::to_string));
    values.insert("files".to_string(), Some(files.to_string()));
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_recognized_placeholders() {
        let values = standard_placeholders(Action::Update, "Budget.xlsx", "2026-08-01T00:00:00Z", Some("main"), 3);
        let rendered = render("{action}: {filename} ({files} files on {branch})", &values);
        assert_eq!(rendered, "update: Budget.xlsx (3 files on main)");
    }

    #[test]
    fn test_render_missing_placeholder_is_empty() {
        let values = standard_placeholders(Action::Add, "Book1.xlsx", "2026-08-01T00:00:00Z", None, 1);
        let rendered = render("branch: [{branch}]", &values);
        assert_eq!(rendered, "branch: []");
    }

    #[test]
    fn test_render_unknown_placeholder_passes_through() {
        let values = standard_placeholders(Action::Delete, "Book1.xlsx", "2026-08-01T00:00:00Z", Some("main"), 1);
        let rendered = render("{action} by {ticket}", &values);
        assert_eq!(rendered, "delete by {ticket}");
    }

    #[test]
    fn test_render_caller_supplied_extra_placeholder() {
        let mut values = standard_placeholders(Action::Add, "Book1.xlsx", "2026-08-01T00:00:00Z", Some("main"), 1);
        values.insert("author".to_string(), Some("alice".to_string()));
        let rendered = render("{action} by {author}", &values);
        assert_eq!(rendered, "add by alice");
    }
}
