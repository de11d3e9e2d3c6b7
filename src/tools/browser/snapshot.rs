//! Snapshot parsing for agent-browser output
//!
//! Parses the accessibility tree JSON from agent-browser.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parsed snapshot from agent-browser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Whether the operation succeeded
    #[serde(default)]
    pub success: bool,
    /// Snapshot data
    #[serde(default)]
    pub data: Option<SnapshotData>,
}

/// Snapshot data content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotData {
    /// Raw snapshot string (accessibility tree)
    #[serde(default)]
    pub snapshot: String,
    /// Element refs mapped to their info
    #[serde(default)]
    pub refs: HashMap<String, Element>,
}

/// An element in the snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// ARIA role
    #[serde(default)]
    pub role: String,
    /// Accessible name
    #[serde(default)]
    pub name: String,
    /// Element value (for inputs)
    #[serde(default)]
    pub value: Option<String>,
    /// Whether element is focused
    #[serde(default)]
    pub focused: bool,
}

impl Snapshot {
    /// Count the number of elements with refs
    pub fn count_elements(&self) -> usize {
        self.data.as_ref().map(|d| d.refs.len()).unwrap_or(0)
    }

    /// Interactive elements ordered by ref number (e1, e2, ..., e10)
    pub fn interactive_elements(&self) -> Vec<(&String, &Element)> {
        let mut elements: Vec<(&String, &Element)> = self
            .data
            .as_ref()
            .map(|d| d.refs.iter().filter(|(_, el)| el.is_interactive()).collect())
            .unwrap_or_default();

        elements.sort_by_key(|(ref_id, _)| {
            (
                ref_id
                    .trim_start_matches(|c: char| !c.is_ascii_digit())
                    .parse::<u64>()
                    .unwrap_or(u64::MAX),
                (*ref_id).clone(),
            )
        });
        elements
    }

    /// Get the raw accessibility tree string
    pub fn raw_tree(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.snapshot.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// Format interactive elements for the model
    pub fn format_for_display(&self) -> String {
        if self.data.is_none() {
            return "No snapshot data available".to_string();
        }

        let elements = self.interactive_elements();
        let mut output = format!(
            "Page Elements ({} interactive of {}):\n",
            elements.len(),
            self.count_elements()
        );

        for (ref_id, element) in elements {
            let value_str = element
                .value
                .as_ref()
                .map(|v| format!(" = \"{}\"", v))
                .unwrap_or_default();

            output.push_str(&format!(
                "  @{}: {} \"{}\"{}",
                ref_id, element.role, element.name, value_str
            ));

            if element.focused {
                output.push_str(" [focused]");
            }

            output.push('\n');
        }

        output
    }
}

impl Element {
    /// Check if this is an interactive element
    pub fn is_interactive(&self) -> bool {
        matches!(
            self.role.as_str(),
            "button"
                | "link"
                | "textbox"
                | "checkbox"
                | "radio"
                | "combobox"
                | "menuitem"
                | "tab"
                | "switch"
                | "searchbox"
                | "spinbutton"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(role: &str, name: &str) -> Element {
        Element {
            role: role.to_string(),
            name: name.to_string(),
            value: None,
            focused: false,
        }
    }

    fn snapshot(elements: Vec<(&str, Element)>) -> Snapshot {
        Snapshot {
            success: true,
            data: Some(SnapshotData {
                snapshot: String::new(),
                refs: elements
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            }),
        }
    }

    #[test]
    fn test_format_lists_interactive_in_ref_order() {
        let mut search = element("searchbox", "Search");
        search.focused = true;
        search.value = Some("laptop".to_string());

        let snapshot = snapshot(vec![
            ("e10", element("link", "Next page")),
            ("e2", search),
            ("e3", element("heading", "Results")),
        ]);

        let text = snapshot.format_for_display();
        assert!(text.starts_with("Page Elements (2 interactive of 3)"));
        let search_pos = text.find("@e2: searchbox \"Search\" = \"laptop\" [focused]").unwrap();
        let link_pos = text.find("@e10: link \"Next page\"").unwrap();
        assert!(search_pos < link_pos);
        assert!(!text.contains("heading"));
    }

    #[test]
    fn test_parse_agent_browser_json() {
        let raw = r#"{
            "success": true,
            "data": {
                "snapshot": "- button \"Go\" [ref=e1]",
                "refs": {"e1": {"role": "button", "name": "Go", "nth": 0}}
            }
        }"#;

        let snapshot: Snapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.count_elements(), 1);
        assert_eq!(snapshot.raw_tree(), Some("- button \"Go\" [ref=e1]"));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot {
            success: false,
            data: None,
        };
        assert_eq!(snapshot.format_for_display(), "No snapshot data available");
        assert!(snapshot.raw_tree().is_none());
    }
}
