use serde::{Deserialize, Deserializer, Serialize};

use crate::templates::TemplateKind;

/// Proficiency assigned to a freshly added skill row.
pub const DEFAULT_SKILL_LEVEL: u8 = 75;

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

/// The normalized resume record handed from the form step to the preview step.
///
/// Every list is in entry order. Blank rows are removed once, by
/// `ResumeForm::submit`; renderers and the exporter take the lists as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    #[serde(default)]
    pub template: TemplateDescriptor,
    #[serde(default)]
    pub personal: PersonalInfo,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub skills: Vec<SkillEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<CertificationEntry>,
}

impl ResumeDocument {
    /// The preview variant this document renders with.
    pub fn template_kind(&self) -> TemplateKind {
        self.template.resolve_kind()
    }

    /// Drops every all-blank row, keeping the order of the remaining ones.
    pub(crate) fn retain_filled_rows(&mut self) {
        retain_filled(&mut self.education);
        retain_filled(&mut self.experience);
        retain_filled(&mut self.skills);
        retain_filled(&mut self.projects);
        retain_filled(&mut self.certifications);
    }
}

/// Identifies the preview renderer. `kind` wins over the free-form title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TemplateKind>,
}

impl Default for TemplateDescriptor {
    fn default() -> Self {
        TemplateDescriptor::for_kind(TemplateKind::Creative)
    }
}

impl TemplateDescriptor {
    pub fn for_kind(kind: TemplateKind) -> Self {
        TemplateDescriptor {
            title: kind.default_title().to_string(),
            kind: Some(kind),
        }
    }

    pub fn resolve_kind(&self) -> TemplateKind {
        self.kind
            .unwrap_or_else(|| TemplateKind::from_title(&self.title))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Personal details
// ────────────────────────────────────────────────────────────────────────────

/// Contact block. The simple form stores `fullName`/`jobTitle`; both spellings
/// are accepted and the canonical one is written back.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default, alias = "fullName")]
    pub name: String,
    #[serde(default, alias = "jobTitle")]
    pub title: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// Embedded `data:` URI, or any other image reference.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub profile_pic: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub website: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub linkedin: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub github: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instagram: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub twitter: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub whatsapp: String,
}

impl PersonalInfo {
    /// Social handles in display order, skipping blanks.
    pub fn socials(&self) -> Vec<(&'static str, &str)> {
        [
            ("WEBSITE", self.website.as_str()),
            ("LINKEDIN", self.linkedin.as_str()),
            ("GITHUB", self.github.as_str()),
            ("INSTAGRAM", self.instagram.as_str()),
            ("TWITTER", self.twitter.as_str()),
            ("WHATSAPP", self.whatsapp.as_str()),
        ]
        .into_iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section rows
// ────────────────────────────────────────────────────────────────────────────

/// A section row that can be entirely blank.
pub trait ContentRow {
    fn is_blank(&self) -> bool;
}

fn blank(values: &[&str]) -> bool {
    values.iter().all(|v| v.trim().is_empty())
}

fn retain_filled<T: ContentRow>(rows: &mut Vec<T>) {
    rows.retain(|row| !row.is_blank());
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub year: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub start_year: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub end_year: String,
}

impl EducationEntry {
    /// `year` when set, otherwise the `start - end` span.
    pub fn period(&self) -> String {
        if !self.year.trim().is_empty() {
            return self.year.clone();
        }
        join_span(&self.start_year, &self.end_year)
    }
}

impl ContentRow for EducationEntry {
    fn is_blank(&self) -> bool {
        blank(&[
            &self.school,
            &self.degree,
            &self.year,
            &self.start_year,
            &self.end_year,
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(default)]
    pub company: String,
    #[serde(default, alias = "position")]
    pub role: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub duration: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub start_date: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub end_date: String,
    #[serde(default, alias = "responsibilities")]
    pub details: String,
}

impl ExperienceEntry {
    pub fn period(&self) -> String {
        if !self.duration.trim().is_empty() {
            return self.duration.clone();
        }
        join_span(&self.start_date, &self.end_date)
    }
}

impl ContentRow for ExperienceEntry {
    fn is_blank(&self) -> bool {
        blank(&[
            &self.company,
            &self.role,
            &self.duration,
            &self.start_date,
            &self.end_date,
            &self.details,
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    #[serde(default)]
    pub name: String,
    /// 0–100, drawn as the filled share of a bar.
    #[serde(default = "default_level", deserialize_with = "deserialize_level")]
    pub level: u8,
}

impl Default for SkillEntry {
    fn default() -> Self {
        SkillEntry {
            name: String::new(),
            level: DEFAULT_SKILL_LEVEL,
        }
    }
}

impl SkillEntry {
    pub fn fraction(&self) -> f32 {
        f32::from(self.level.min(100)) / 100.0
    }
}

impl ContentRow for SkillEntry {
    /// The level slider always carries a value, so only the name counts.
    fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
}

impl ProjectEntry {
    /// Link as an absolute URL; bare hosts get an `https://` prefix.
    pub fn href(&self) -> String {
        let link = self.link.trim();
        if link.starts_with("http") {
            link.to_string()
        } else {
            format!("https://{link}")
        }
    }
}

impl ContentRow for ProjectEntry {
    fn is_blank(&self) -> bool {
        blank(&[&self.title, &self.description, &self.link])
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CertificationEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub year: String,
}

impl ContentRow for CertificationEntry {
    fn is_blank(&self) -> bool {
        blank(&[&self.title, &self.issuer, &self.year])
    }
}

fn join_span(start: &str, end: &str) -> String {
    match (start.trim(), end.trim()) {
        ("", "") => String::new(),
        (s, "") => s.to_string(),
        ("", e) => e.to_string(),
        (s, e) => format!("{s} - {e}"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skill level parsing
// ────────────────────────────────────────────────────────────────────────────

fn default_level() -> u8 {
    DEFAULT_SKILL_LEVEL
}

/// Range inputs hand back strings; older documents carry numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum LevelRepr {
    Number(f64),
    Text(String),
}

fn deserialize_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<LevelRepr>::deserialize(deserializer)? {
        None => return Ok(DEFAULT_SKILL_LEVEL),
        Some(LevelRepr::Number(n)) => n,
        Some(LevelRepr::Text(s)) if s.trim().is_empty() => return Ok(DEFAULT_SKILL_LEVEL),
        Some(LevelRepr::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid skill level '{s}'")))?,
    };
    Ok(clamp_level(raw))
}

pub(crate) fn clamp_level(raw: f64) -> u8 {
    if raw.is_nan() {
        return DEFAULT_SKILL_LEVEL;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
