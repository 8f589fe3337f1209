// ── Privacy settings and scholarship eligibility tags ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// A student attribute a scholarship's eligibility can depend on.
///
/// Each tag corresponds to one visibility flag in [`PrivacySettings`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum EligibilityTag {
    Gender,
    Nationality,
    CityState,
    GradeLevel,
    SchoolType,
    Gpa,
    Major,
    Degree,
    GraduationYear,
}

/// Keyword table used to derive tags from free text.
const KEYWORD_TAGS: &[(&str, EligibilityTag)] = &[
    ("women", EligibilityTag::Gender),
    ("female", EligibilityTag::Gender),
    ("international", EligibilityTag::Nationality),
    ("stem", EligibilityTag::Major),
    ("technology", EligibilityTag::Major),
    ("engineering", EligibilityTag::Major),
    ("undergraduate", EligibilityTag::GradeLevel),
    ("graduate", EligibilityTag::GradeLevel),
    ("rural", EligibilityTag::CityState),
    ("community", EligibilityTag::CityState),
];

impl EligibilityTag {
    /// Derive tags from a scholarship's name and description.
    pub fn infer(name: &str, description: &str) -> BTreeSet<EligibilityTag> {
        let haystack = format!("{name} {description}").to_lowercase();
        KEYWORD_TAGS
            .iter()
            .filter(|(keyword, _)| haystack.contains(keyword))
            .map(|(_, tag)| *tag)
            .collect()
    }
}

/// Which profile attributes the student lets others see and match on.
///
/// Every flag defaults to visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct PrivacySettings {
    pub gender: bool,
    pub nationality: bool,
    pub city_state: bool,
    pub grade_level: bool,
    pub school_type: bool,
    pub gpa: bool,
    pub major: bool,
    pub degree: bool,
    pub graduation_year: bool,
    pub scholarships: bool,
    pub scholarship_matches: bool,
    pub saved_scholarships: bool,
    pub applied_scholarships: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            gender: true,
            nationality: true,
            city_state: true,
            grade_level: true,
            school_type: true,
            gpa: true,
            major: true,
            degree: true,
            graduation_year: true,
            scholarships: true,
            scholarship_matches: true,
            saved_scholarships: true,
            applied_scholarships: true,
        }
    }
}

/// Names accepted by [`PrivacySettings::set`], in display order.
pub const PRIVACY_FLAGS: [&str; 13] = [
    "gender",
    "nationality",
    "cityState",
    "gradeLevel",
    "schoolType",
    "gpa",
    "major",
    "degree",
    "graduationYear",
    "scholarships",
    "scholarshipMatches",
    "savedScholarships",
    "appliedScholarships",
];

impl PrivacySettings {
    /// Whether the attribute behind `tag` is visible.
    pub fn allows(&self, tag: EligibilityTag) -> bool {
        match tag {
            EligibilityTag::Gender => self.gender,
            EligibilityTag::Nationality => self.nationality,
            EligibilityTag::CityState => self.city_state,
            EligibilityTag::GradeLevel => self.grade_level,
            EligibilityTag::SchoolType => self.school_type,
            EligibilityTag::Gpa => self.gpa,
            EligibilityTag::Major => self.major,
            EligibilityTag::Degree => self.degree,
            EligibilityTag::GraduationYear => self.graduation_year,
        }
    }

    fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        let flag = match name {
            "gender" => &mut self.gender,
            "nationality" => &mut self.nationality,
            "cityState" | "city-state" => &mut self.city_state,
            "gradeLevel" | "grade-level" => &mut self.grade_level,
            "schoolType" | "school-type" => &mut self.school_type,
            "gpa" => &mut self.gpa,
            "major" => &mut self.major,
            "degree" => &mut self.degree,
            "graduationYear" | "graduation-year" => &mut self.graduation_year,
            "scholarships" => &mut self.scholarships,
            "scholarshipMatches" | "scholarship-matches" => &mut self.scholarship_matches,
            "savedScholarships" | "saved-scholarships" => &mut self.saved_scholarships,
            "appliedScholarships" | "applied-scholarships" => &mut self.applied_scholarships,
            _ => return None,
        };
        Some(flag)
    }

    /// Set a flag by its camelCase (or kebab-case) name. Returns `false`
    /// for an unknown name.
    pub fn set(&mut self, name: &str, visible: bool) -> bool {
        match self.flag_mut(name) {
            Some(flag) => {
                *flag = visible;
                true
            }
            None => false,
        }
    }

    /// Tags whose attribute is currently hidden.
    pub fn hidden_tags(&self) -> BTreeSet<EligibilityTag> {
        EligibilityTag::iter().filter(|t| !self.allows(*t)).collect()
    }

    /// `(name, value)` pairs in display order.
    pub fn flags(&self) -> Vec<(&'static str, bool)> {
        let mut copy = *self;
        PRIVACY_FLAGS
            .iter()
            .map(|name| (*name, copy.flag_mut(name).is_some_and(|f| *f)))
            .collect()
    }
}

/// A scholarship listing as seen by the privacy filter.
///
/// Deserializing a listing without tags derives them from its text, so
/// every decoded listing is filterable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ScholarshipRecord")]
pub struct Scholarship {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    /// Explicit eligibility tags. Listings that arrive without any get
    /// them derived from text by [`Scholarship::with_inferred_tags`].
    pub tags: BTreeSet<EligibilityTag>,
}

/// Wire shape of a listing, before tag inference.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScholarshipRecord {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    deadline: Option<String>,
    #[serde(default)]
    tags: BTreeSet<EligibilityTag>,
}

impl From<ScholarshipRecord> for Scholarship {
    fn from(record: ScholarshipRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            slug: record.slug,
            amount: record.amount,
            deadline: record.deadline,
            tags: record.tags,
        }
        .with_inferred_tags()
    }
}

impl Scholarship {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            slug: None,
            amount: None,
            deadline: None,
            tags: BTreeSet::new(),
        }
        .with_inferred_tags()
    }

    /// Fill in tags from the keyword table if none were supplied.
    pub fn with_inferred_tags(mut self) -> Self {
        if self.tags.is_empty() {
            self.tags = EligibilityTag::infer(&self.name, &self.description);
        }
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = EligibilityTag>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// URL slug: explicit, or derived from the name.
    pub fn slug(&self) -> String {
        if let Some(ref slug) = self.slug {
            return slug.clone();
        }
        let mut slug = String::with_capacity(self.name.len());
        let mut dash = false;
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
                dash = false;
            } else if !dash && !slug.is_empty() {
                slug.push('-');
                dash = true;
            }
        }
        slug.trim_end_matches('-').to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn infers_tags_from_keywords() {
        let s = Scholarship::new("1", "Women in Technology Award", "For future engineers");
        assert_eq!(
            s.tags,
            BTreeSet::from([EligibilityTag::Gender, EligibilityTag::Major])
        );
    }

    #[test]
    fn explicit_tags_are_kept() {
        let s = Scholarship::new("1", "Rural Leaders Fund", "")
            .with_tags([EligibilityTag::Gpa]);
        assert_eq!(s.tags, BTreeSet::from([EligibilityTag::Gpa]));
    }

    #[test]
    fn decoded_listing_without_tags_gets_inferred_tags() {
        let s: Scholarship = serde_json::from_str(
            r#"{"id":"1","name":"Women in Technology Award","description":"For women pursuing STEM"}"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            s.tags,
            BTreeSet::from([EligibilityTag::Gender, EligibilityTag::Major])
        );

        let tagged: Scholarship =
            serde_json::from_str(r#"{"id":"2","name":"Women in Technology Award","tags":["gpa"]}"#)
                .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(tagged.tags, BTreeSet::from([EligibilityTag::Gpa]));
    }

    #[test]
    fn set_accepts_camel_and_kebab_names() {
        let mut settings = PrivacySettings::default();
        assert!(settings.set("cityState", false));
        assert!(settings.set("graduation-year", false));
        assert!(!settings.set("shoeSize", false));
        assert!(!settings.city_state);
        assert!(!settings.graduation_year);
        assert_eq!(
            settings.hidden_tags(),
            BTreeSet::from([EligibilityTag::CityState, EligibilityTag::GraduationYear])
        );
    }

    #[test]
    fn missing_fields_default_to_visible() {
        let settings: PrivacySettings =
            serde_json::from_str(r#"{"gender": false}"#).unwrap_or_else(|e| panic!("{e}"));
        assert!(!settings.gender);
        assert!(settings.scholarship_matches);
    }

    #[test]
    fn slug_is_derived_from_name() {
        let s = Scholarship::new("1", "Women in Technology Award!", "");
        assert_eq!(s.slug(), "women-in-technology-award");
    }

    #[test]
    fn flags_follow_display_order() {
        let flags = PrivacySettings::default().flags();
        assert_eq!(flags.len(), PRIVACY_FLAGS.len());
        assert!(flags.iter().all(|(_, v)| *v));
        assert_eq!(flags.first().map(|(n, _)| *n), Some("gender"));
    }
}
