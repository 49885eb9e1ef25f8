//! Claim lookup over the ranked sidebar list.
//!
//! The sidebar is owned by the host and changes independently of the chat
//! stream. It is sampled once per finalized record and never mutated here.

use std::{fmt, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classify::strip_formatting;

/// One scored row of the sidebar.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SidebarEntry {
    pub score: i32,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl SidebarEntry {
    pub fn new(score: i32, owner: impl Into<String>) -> Self {
        Self {
            score,
            owner: owner.into(),
            display_name: None,
            prefix: None,
            suffix: None,
        }
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn team(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self.suffix = Some(suffix.into());
        self
    }

    /// Display text as the sidebar shows it, team decoration included.
    pub fn render(&self) -> String {
        let name = self.display_name.as_deref().unwrap_or(&self.owner);
        format!(
            "{}{}{}",
            self.prefix.as_deref().unwrap_or_default(),
            name,
            self.suffix.as_deref().unwrap_or_default()
        )
    }
}

/// What the host can currently tell about the sidebar.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SidebarView {
    /// The host could not be queried at all.
    Unavailable,
    /// No sidebar objective is displayed.
    Hidden,
    Shown(Vec<SidebarEntry>),
}

pub trait SidebarSource: Send + Sync {
    fn sidebar(&self) -> SidebarView;
}

impl<F> SidebarSource for F
where
    F: Fn() -> SidebarView + Send + Sync,
{
    fn sidebar(&self) -> SidebarView {
        self()
    }
}

/// Result of a claim lookup. `Display` yields the text written to the shop log.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Claim {
    Value(String),
    ClientError,
    NoSidebar,
    ValueMissing,
    ValueEmpty,
    LabelMissing,
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Claim::Value(value) => f.write_str(value),
            Claim::ClientError => f.write_str("Unknown (Client Error)"),
            Claim::NoSidebar => f.write_str("No Sidebar"),
            Claim::ValueMissing => f.write_str("Claim Value Missing"),
            Claim::ValueEmpty => f.write_str("Claim Value Empty"),
            Claim::LabelMissing => f.write_str("Claim Label Missing"),
        }
    }
}

fn claim_label() -> &'static Regex {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    LABEL.get_or_init(|| {
        Regex::new(r"(?i-u:Current Claim:)").expect("claim label regex is valid")
    })
}

fn bracketed_value() -> &'static Regex {
    static VALUE: OnceLock<Regex> = OnceLock::new();
    VALUE.get_or_init(|| Regex::new(r"\[([^\]]*)\]").expect("bracket regex is valid"))
}

/// Renders entries top to bottom: highest score first, ties in supplied order.
pub fn ordered_lines(entries: &[SidebarEntry]) -> Vec<String> {
    let mut sorted: Vec<&SidebarEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.score.cmp(&a.score));
    sorted.into_iter().map(SidebarEntry::render).collect()
}

/// Finds the `Current Claim:` label and reads the bracketed value on the line below it.
pub fn claim_from_lines<S: AsRef<str>>(lines: &[S]) -> Claim {
    for (idx, line) in lines.iter().enumerate() {
        let label = strip_formatting(line.as_ref());
        if !claim_label().is_match(label.trim()) {
            continue;
        }
        let value = lines
            .get(idx + 1)
            .and_then(|next| bracketed_value().captures(next.as_ref()))
            .map(|caps| strip_formatting(&caps[1]).trim().to_string());
        return match value {
            Some(value) if value.is_empty() => Claim::ValueEmpty,
            Some(value) => Claim::Value(value),
            None => Claim::ValueMissing,
        };
    }
    Claim::LabelMissing
}

pub fn claim_for_view(view: &SidebarView) -> Claim {
    match view {
        SidebarView::Unavailable => Claim::ClientError,
        SidebarView::Hidden => Claim::NoSidebar,
        SidebarView::Shown(entries) => claim_from_lines(&ordered_lines(entries)),
    }
}

pub fn lookup_claim(source: &dyn SidebarSource) -> Claim {
    claim_for_view(&source.sidebar())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bracketed_value_below_label() {
        assert_eq!(
            claim_from_lines(&["Current Claim:", "[MyClaim]"]),
            Claim::Value("MyClaim".to_string())
        );
        assert_eq!(
            claim_from_lines(&["Balance: 40", "§7current claim: ", "§e[ §aSpawn Town ]"]),
            Claim::Value("Spawn Town".to_string())
        );
    }

    #[test]
    fn reports_each_missing_piece() {
        assert_eq!(
            claim_from_lines(&["Current Claim:", "no brackets here"]),
            Claim::ValueMissing
        );
        assert_eq!(claim_from_lines(&["Current Claim:"]), Claim::ValueMissing);
        assert_eq!(claim_from_lines(&["Current Claim:", "[ §r ]"]), Claim::ValueEmpty);
        assert_eq!(claim_from_lines(&["Balance: 40"]), Claim::LabelMissing);
        assert_eq!(claim_from_lines::<&str>(&[]), Claim::LabelMissing);
    }

    #[test]
    fn first_label_wins() {
        assert_eq!(
            claim_from_lines(&["Current Claim:", "nothing", "Current Claim:", "[Later]"]),
            Claim::ValueMissing
        );
    }

    #[test]
    fn entries_are_ordered_by_descending_score() {
        let entries = vec![
            SidebarEntry::new(1, "#claim").team("§6[", "§6]").display_name("Harbor"),
            SidebarEntry::new(5, "#title").display_name("Stats"),
            SidebarEntry::new(2, "#label").display_name("Current Claim:"),
            SidebarEntry::new(5, "#tie"),
        ];
        assert_eq!(
            ordered_lines(&entries),
            vec!["Stats", "#tie", "Current Claim:", "§6[Harbor§6]"]
        );
        assert_eq!(
            claim_for_view(&SidebarView::Shown(entries)),
            Claim::Value("Harbor".to_string())
        );
    }

    #[test]
    fn view_state_maps_to_placeholders() {
        assert_eq!(claim_for_view(&SidebarView::Unavailable), Claim::ClientError);
        assert_eq!(claim_for_view(&SidebarView::Hidden), Claim::NoSidebar);
        assert_eq!(Claim::ClientError.to_string(), "Unknown (Client Error)");
        assert_eq!(Claim::LabelMissing.to_string(), "Claim Label Missing");

        let source = || SidebarView::Hidden;
        assert_eq!(lookup_claim(&source), Claim::NoSidebar);
    }
}
