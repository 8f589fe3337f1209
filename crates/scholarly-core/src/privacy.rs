// ── Privacy filter ──

use serde::Serialize;
use tracing::debug;

use crate::model::{PrivacySettings, Scholarship};

/// Scholarships left after filtering, plus how many were removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyFilterResult {
    pub visible: Vec<Scholarship>,
    pub hidden_count: usize,
}

/// Hide every scholarship whose eligibility depends on a field the user
/// has chosen not to share. With scholarship matching off, nothing is
/// shown.
pub fn filter_scholarships_by_privacy(
    scholarships: &[Scholarship],
    settings: &PrivacySettings,
) -> PrivacyFilterResult {
    if !settings.scholarship_matches {
        return PrivacyFilterResult {
            visible: Vec::new(),
            hidden_count: scholarships.len(),
        };
    }

    let visible: Vec<Scholarship> = scholarships
        .iter()
        .filter(|s| s.tags.iter().all(|tag| settings.allows(*tag)))
        .cloned()
        .collect();
    let hidden_count = scholarships.len() - visible.len();
    debug!(total = scholarships.len(), hidden_count, "applied privacy filter");

    PrivacyFilterResult {
        visible,
        hidden_count,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::EligibilityTag;

    fn catalog() -> Vec<Scholarship> {
        vec![
            Scholarship::new("1", "Women in Technology Award", "For women pursuing STEM"),
            Scholarship::new("2", "Merit Scholarship", "Awarded for academic excellence"),
            Scholarship::new("3", "International Student Grant", "Open to students abroad"),
        ]
    }

    #[test]
    fn everything_visible_by_default() {
        let result = filter_scholarships_by_privacy(&catalog(), &PrivacySettings::default());
        assert_eq!(result.visible.len(), 3);
        assert_eq!(result.hidden_count, 0);
    }

    #[test]
    fn gender_off_hides_women_in_technology() {
        let settings = PrivacySettings {
            gender: false,
            ..PrivacySettings::default()
        };
        let scholarships = vec![Scholarship::new(
            "1",
            "Women in Technology Award",
            "Supporting the next generation",
        )];
        let result = filter_scholarships_by_privacy(&scholarships, &settings);
        assert!(result.visible.is_empty());
        assert_eq!(result.hidden_count, 1);
    }

    #[test]
    fn explicit_tags_override_keywords() {
        let settings = PrivacySettings {
            nationality: false,
            ..PrivacySettings::default()
        };
        // Tags were supplied, so the "international" keyword is not consulted.
        let tagged = Scholarship::new("9", "International Essay Prize", "")
            .with_tags([EligibilityTag::Major]);
        let result = filter_scholarships_by_privacy(&[tagged], &settings);
        assert_eq!(result.hidden_count, 0);
    }

    #[test]
    fn decoded_listings_are_filtered_by_their_text() {
        let settings = PrivacySettings {
            gender: false,
            ..PrivacySettings::default()
        };
        let listings: Vec<Scholarship> = serde_json::from_str(
            r#"[
                {"id":"1","name":"Women in Technology Award","description":"For women pursuing STEM"},
                {"id":"2","name":"Merit Scholarship"}
            ]"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        let result = filter_scholarships_by_privacy(&listings, &settings);
        assert_eq!(result.hidden_count, 1);
        assert_eq!(result.visible.len(), 1);
        assert_eq!(result.visible[0].id, "2");
    }

    #[test]
    fn matching_off_hides_everything() {
        let settings = PrivacySettings {
            scholarship_matches: false,
            ..PrivacySettings::default()
        };
        let result = filter_scholarships_by_privacy(&catalog(), &settings);
        assert!(result.visible.is_empty());
        assert_eq!(result.hidden_count, 3);
    }
}
