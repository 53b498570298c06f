use serde::Serialize;

pub const NO_ICON_MATCH: &str =
    "The image is classified but doesn't match any supported waste type for SDG display.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
}

/// Sustainable Development Goal icons shown for one waste category, laid
/// out in two columns. Paths are relative to the icon directory.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct IconGroup {
    pub keyword: &'static str,
    pub title: &'static str,
    pub severity: Severity,
    pub columns: [&'static [&'static str]; 2],
}

impl IconGroup {
    pub fn verdict(&self) -> String {
        match self.severity {
            Severity::Success => format!("The image is classified as **{}**.", self.title),
            Severity::Warning => format!("⚠ The image is classified as **{}**.", self.title),
        }
    }

    pub fn icons(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().flat_map(|column| column.iter().copied())
    }
}

pub static ICON_GROUPS: &[IconGroup] = &[
    IconGroup {
        keyword: "cardboard",
        title: "Cardboard",
        severity: Severity::Success,
        columns: [&["12.png", "13.png"], &["14.png", "15.png"]],
    },
    IconGroup {
        keyword: "plastic",
        title: "Plastic",
        severity: Severity::Success,
        columns: [&["6.jpg", "12.png"], &["14.png", "15.png"]],
    },
    IconGroup {
        keyword: "glass",
        title: "Glass",
        severity: Severity::Success,
        columns: [&["12.png"], &["14.png"]],
    },
    IconGroup {
        keyword: "metal",
        title: "Metal",
        severity: Severity::Success,
        columns: [&["3.png", "6.jpg"], &["12.png", "14.png"]],
    },
    IconGroup {
        keyword: "paper",
        title: "Paper",
        severity: Severity::Success,
        columns: [&["12.png", "13.png"], &["15.png"]],
    },
    IconGroup {
        keyword: "trash",
        title: "Trash",
        severity: Severity::Warning,
        columns: [&["7.png"], &["12.png"]],
    },
];

/// First group whose keyword occurs in the trimmed, lowercased label. Digits
/// and separators are left in place, unlike the footprint key.
pub fn icon_group(label: &str) -> Option<&'static IconGroup> {
    let label = label.trim().to_lowercase();
    ICON_GROUPS
        .iter()
        .find(|group| label.contains(group.keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plastic_variant_selects_plastic_icons() {
        let group = icon_group("Plastic_02").unwrap();
        assert_eq!(group.keyword, "plastic");
        assert_eq!(
            group.icons().collect::<Vec<_>>(),
            vec!["6.jpg", "12.png", "14.png", "15.png"]
        );
    }

    #[test]
    fn indexed_labels_match() {
        assert_eq!(icon_group("0 cardboard").unwrap().title, "Cardboard");
        assert_eq!(icon_group(" 5 Trash ").unwrap().severity, Severity::Warning);
    }

    #[test]
    fn unknown_label_falls_back() {
        assert!(icon_group("banana").is_none());
    }

    #[test]
    fn separators_inside_a_keyword_are_not_normalized() {
        // the footprint key would read "glass" here
        assert!(icon_group("gla_ss").is_none());
    }

    #[test]
    fn verdicts_follow_severity() {
        assert_eq!(
            icon_group("paper").unwrap().verdict(),
            "The image is classified as **Paper**."
        );
        assert_eq!(
            icon_group("trash").unwrap().verdict(),
            "⚠ The image is classified as **Trash**."
        );
    }

    #[test]
    fn categories_are_mutually_exclusive() {
        for group in ICON_GROUPS {
            let matches = ICON_GROUPS
                .iter()
                .filter(|other| group.keyword.contains(other.keyword))
                .count();
            assert_eq!(matches, 1, "{}", group.keyword);
        }
    }
}
