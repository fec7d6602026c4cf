//! Form session: the editable draft behind the multi-step resume forms.
//!
//! Rows are added and edited freely, blank ones included. `submit` is the
//! single point where all-blank rows are dropped and the draft becomes the
//! stored `ResumeDocument`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::resume::{
    clamp_level, CertificationEntry, EducationEntry, ExperienceEntry, ProjectEntry,
    ResumeDocument, SkillEntry, TemplateDescriptor,
};
use crate::render::images::to_data_uri;
use crate::templates::TemplateKind;

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Unknown section '{0}'")]
    UnknownSection(String),

    #[error("Section {section} has no field '{field}'")]
    UnknownField { section: String, field: String },

    #[error("Section {section} has no row {index}")]
    RowOutOfRange { section: Section, index: usize },

    #[error("Field '{0}' is required")]
    MissingField(&'static str),

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("Invalid skill level '{0}'")]
    InvalidLevel(String),

    #[error("Profile picture must be an image, got '{0}'")]
    UnsupportedImage(String),
}

/// Repeatable sections of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Education,
    Experience,
    Skills,
    Projects,
    Certifications,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Education => "education",
            Section::Experience => "experience",
            Section::Skills => "skills",
            Section::Projects => "projects",
            Section::Certifications => "certifications",
        };
        f.write_str(name)
    }
}

impl FromStr for Section {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "education" => Ok(Section::Education),
            "experience" => Ok(Section::Experience),
            "skills" => Ok(Section::Skills),
            "projects" => Ok(Section::Projects),
            "certifications" => Ok(Section::Certifications),
            other => Err(FormError::UnknownSection(other.to_string())),
        }
    }
}

/// One edit to a draft, as sent by a client that edits field by field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FormEdit {
    SetPersonal { field: String, value: String },
    SetSummary { value: String },
    AddRow { section: Section },
    RemoveRow { section: Section, index: usize },
    UpdateField {
        section: Section,
        index: usize,
        field: String,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct ResumeForm {
    kind: TemplateKind,
    draft: ResumeDocument,
}

impl ResumeForm {
    /// A fresh form with one blank row in every section the template shows.
    pub fn new(kind: TemplateKind) -> ResumeForm {
        let mut draft = ResumeDocument {
            template: TemplateDescriptor::for_kind(kind),
            education: vec![EducationEntry::default()],
            experience: vec![ExperienceEntry::default()],
            skills: vec![SkillEntry::default()],
            projects: vec![ProjectEntry::default()],
            ..Default::default()
        };
        if kind == TemplateKind::Simple {
            draft.certifications.push(CertificationEntry::default());
        }
        ResumeForm { kind, draft }
    }

    /// Wraps a complete payload posted by a client-side form.
    pub fn from_draft(draft: ResumeDocument) -> ResumeForm {
        ResumeForm {
            kind: draft.template_kind(),
            draft,
        }
    }

    pub fn draft(&self) -> &ResumeDocument {
        &self.draft
    }

    pub fn set_summary(&mut self, value: impl Into<String>) {
        self.draft.summary = value.into();
    }

    pub fn set_personal(&mut self, field: &str, value: impl Into<String>) -> Result<(), FormError> {
        let p = &mut self.draft.personal;
        let slot = match field {
            "name" | "fullName" => &mut p.name,
            "title" | "jobTitle" => &mut p.title,
            "email" => &mut p.email,
            "phone" => &mut p.phone,
            "address" => &mut p.address,
            "website" => &mut p.website,
            "linkedin" => &mut p.linkedin,
            "github" => &mut p.github,
            "instagram" => &mut p.instagram,
            "twitter" => &mut p.twitter,
            "whatsapp" => &mut p.whatsapp,
            _ => {
                return Err(FormError::UnknownField {
                    section: "personal".into(),
                    field: field.into(),
                })
            }
        };
        *slot = value.into();
        Ok(())
    }

    /// Stores an uploaded picture as an inline `data:` URI.
    pub fn set_profile_picture(&mut self, bytes: &[u8], mime: &str) -> Result<(), FormError> {
        if !mime.starts_with("image/") || image::guess_format(bytes).is_err() {
            return Err(FormError::UnsupportedImage(mime.to_string()));
        }
        self.draft.personal.profile_pic = to_data_uri(bytes, mime);
        Ok(())
    }

    /// Appends a blank row and returns its index.
    pub fn add_row(&mut self, section: Section) -> usize {
        let d = &mut self.draft;
        match section {
            Section::Education => push_default(&mut d.education),
            Section::Experience => push_default(&mut d.experience),
            Section::Skills => push_default(&mut d.skills),
            Section::Projects => push_default(&mut d.projects),
            Section::Certifications => push_default(&mut d.certifications),
        }
    }

    pub fn remove_row(&mut self, section: Section, index: usize) -> Result<(), FormError> {
        let d = &mut self.draft;
        let len = match section {
            Section::Education => d.education.len(),
            Section::Experience => d.experience.len(),
            Section::Skills => d.skills.len(),
            Section::Projects => d.projects.len(),
            Section::Certifications => d.certifications.len(),
        };
        if index >= len {
            return Err(FormError::RowOutOfRange { section, index });
        }
        match section {
            Section::Education => {
                d.education.remove(index);
            }
            Section::Experience => {
                d.experience.remove(index);
            }
            Section::Skills => {
                d.skills.remove(index);
            }
            Section::Projects => {
                d.projects.remove(index);
            }
            Section::Certifications => {
                d.certifications.remove(index);
            }
        }
        Ok(())
    }

    pub fn update_field(
        &mut self,
        section: Section,
        index: usize,
        field: &str,
        value: &str,
    ) -> Result<(), FormError> {
        let unknown = || FormError::UnknownField {
            section: section.to_string(),
            field: field.to_string(),
        };
        let out_of_range = FormError::RowOutOfRange { section, index };
        let d = &mut self.draft;

        let slot: &mut String = match section {
            Section::Education => {
                let row = d.education.get_mut(index).ok_or(out_of_range)?;
                match field {
                    "school" => &mut row.school,
                    "degree" => &mut row.degree,
                    "year" => &mut row.year,
                    "startYear" => &mut row.start_year,
                    "endYear" => &mut row.end_year,
                    _ => return Err(unknown()),
                }
            }
            Section::Experience => {
                let row = d.experience.get_mut(index).ok_or(out_of_range)?;
                match field {
                    "company" => &mut row.company,
                    "role" | "position" => &mut row.role,
                    "duration" => &mut row.duration,
                    "startDate" => &mut row.start_date,
                    "endDate" => &mut row.end_date,
                    "details" | "responsibilities" => &mut row.details,
                    _ => return Err(unknown()),
                }
            }
            Section::Skills => {
                let row = d.skills.get_mut(index).ok_or(out_of_range)?;
                match field {
                    "name" => &mut row.name,
                    "level" => {
                        let level = value
                            .trim()
                            .parse::<f64>()
                            .map_err(|_| FormError::InvalidLevel(value.to_string()))?;
                        row.level = clamp_level(level);
                        return Ok(());
                    }
                    _ => return Err(unknown()),
                }
            }
            Section::Projects => {
                let row = d.projects.get_mut(index).ok_or(out_of_range)?;
                match field {
                    "title" => &mut row.title,
                    "description" => &mut row.description,
                    "link" => &mut row.link,
                    _ => return Err(unknown()),
                }
            }
            Section::Certifications => {
                let row = d.certifications.get_mut(index).ok_or(out_of_range)?;
                match field {
                    "title" => &mut row.title,
                    "issuer" => &mut row.issuer,
                    "year" => &mut row.year,
                    _ => return Err(unknown()),
                }
            }
        };
        *slot = value.to_string();
        Ok(())
    }

    pub fn apply(&mut self, edit: FormEdit) -> Result<(), FormError> {
        match edit {
            FormEdit::SetPersonal { field, value } => self.set_personal(&field, value),
            FormEdit::SetSummary { value } => {
                self.set_summary(value);
                Ok(())
            }
            FormEdit::AddRow { section } => {
                self.add_row(section);
                Ok(())
            }
            FormEdit::RemoveRow { section, index } => self.remove_row(section, index),
            FormEdit::UpdateField {
                section,
                index,
                field,
                value,
            } => self.update_field(section, index, &field, &value),
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        let p = &self.draft.personal;
        for &field in self.kind.config().required_personal {
            let value = match field {
                "name" => &p.name,
                "email" => &p.email,
                "title" => &p.title,
                "phone" => &p.phone,
                _ => continue,
            };
            if value.trim().is_empty() {
                return Err(FormError::MissingField(field));
            }
        }
        let email = p.email.trim();
        if !email.is_empty() && !looks_like_email(email) {
            return Err(FormError::InvalidEmail(email.to_string()));
        }
        Ok(())
    }

    /// Validates, drops all-blank rows and hands back the finished document.
    pub fn submit(mut self) -> Result<ResumeDocument, FormError> {
        self.validate()?;
        self.draft.retain_filled_rows();
        Ok(self.draft)
    }
}

fn push_default<T: Default>(rows: &mut Vec<T>) -> usize {
    rows.push(T::default());
    rows.len() - 1
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_form_has_one_blank_row_per_section() {
        let form = ResumeForm::new(TemplateKind::Creative);
        assert_eq!(form.draft().education.len(), 1);
        assert_eq!(form.draft().skills[0].level, 75);
        assert!(form.draft().certifications.is_empty());
        assert_eq!(ResumeForm::new(TemplateKind::Simple).draft().certifications.len(), 1);
    }

    #[test]
    fn test_submit_drops_blank_rows_in_order() {
        let mut form = ResumeForm::new(TemplateKind::Creative);
        form.set_personal("name", "Ada").unwrap();
        form.update_field(Section::Education, 0, "school", "Home").unwrap();
        form.add_row(Section::Education);
        let third = form.add_row(Section::Education);
        form.update_field(Section::Education, third, "year", "1843").unwrap();

        let doc = form.submit().unwrap();
        let years: Vec<&str> = doc.education.iter().map(|e| e.year.as_str()).collect();
        assert_eq!(years, vec!["", "1843"]);
        assert_eq!(doc.education[0].school, "Home");
        assert!(doc.experience.is_empty());
        assert!(doc.skills.is_empty());
    }

    #[test]
    fn test_ada_lovelace_payload() {
        let draft: ResumeDocument = serde_json::from_value(json!({
            "personal": { "fullName": "Ada Lovelace", "jobTitle": "Engineer" },
            "skills": [{ "name": "C++" }, { "name": "" }]
        }))
        .unwrap();
        let doc = ResumeForm::from_draft(draft).submit().unwrap();
        assert_eq!(doc.skills.len(), 1);
        assert_eq!(doc.skills[0].name, "C++");
        assert_eq!(doc.personal.name, "Ada Lovelace");
    }

    #[test]
    fn test_required_name_and_email_shape() {
        let mut form = ResumeForm::new(TemplateKind::Professional);
        assert_eq!(form.validate(), Err(FormError::MissingField("name")));
        form.set_personal("fullName", "Ada").unwrap();
        assert!(form.validate().is_ok());
        form.set_personal("email", "ada@nowhere").unwrap();
        assert!(matches!(form.validate(), Err(FormError::InvalidEmail(_))));
        form.set_personal("email", "ada@example.com").unwrap();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_and_rows_are_rejected() {
        let mut form = ResumeForm::new(TemplateKind::Creative);
        assert!(matches!(
            form.update_field(Section::Projects, 0, "stars", "5"),
            Err(FormError::UnknownField { .. })
        ));
        assert_eq!(
            form.update_field(Section::Projects, 3, "title", "x"),
            Err(FormError::RowOutOfRange { section: Section::Projects, index: 3 })
        );
        assert!(form.remove_row(Section::Skills, 1).is_err());
        assert!(form.set_personal("age", "30").is_err());
        assert!("hobbies".parse::<Section>().is_err());
    }

    #[test]
    fn test_skill_level_updates_are_clamped() {
        let mut form = ResumeForm::new(TemplateKind::Creative);
        form.update_field(Section::Skills, 0, "level", "150").unwrap();
        assert_eq!(form.draft().skills[0].level, 100);
        assert!(matches!(
            form.update_field(Section::Skills, 0, "level", "high"),
            Err(FormError::InvalidLevel(_))
        ));
    }

    #[test]
    fn test_remove_row_keeps_others() {
        let mut form = ResumeForm::new(TemplateKind::Creative);
        form.update_field(Section::Skills, 0, "name", "Rust").unwrap();
        form.add_row(Section::Skills);
        form.update_field(Section::Skills, 1, "name", "Go").unwrap();
        form.remove_row(Section::Skills, 0).unwrap();
        assert_eq!(form.draft().skills[0].name, "Go");
    }

    #[test]
    fn test_profile_picture_becomes_data_uri() {
        let png: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];
        let mut form = ResumeForm::new(TemplateKind::Creative);
        form.set_profile_picture(png, "image/png").unwrap();
        assert!(form.draft().personal.profile_pic.starts_with("data:image/png;base64,"));
        assert!(form.set_profile_picture(b"plain text", "text/plain").is_err());
    }

    #[test]
    fn test_edits_apply_in_order() {
        let edits: Vec<FormEdit> = serde_json::from_value(json!([
            { "op": "set_personal", "field": "fullName", "value": "Ada Lovelace" },
            { "op": "add_row", "section": "skills" },
            { "op": "update_field", "section": "skills", "index": 1, "field": "name", "value": "Rust" },
            { "op": "update_field", "section": "skills", "index": 1, "field": "level", "value": "140" },
            { "op": "remove_row", "section": "education", "index": 0 },
            { "op": "set_summary", "value": "First programmer." }
        ]))
        .unwrap();

        let mut form = ResumeForm::new(TemplateKind::Creative);
        for edit in edits {
            form.apply(edit).unwrap();
        }
        let doc = form.submit().unwrap();
        assert_eq!(doc.personal.name, "Ada Lovelace");
        assert_eq!(doc.summary, "First programmer.");
        assert!(doc.education.is_empty());
        assert_eq!(doc.skills.len(), 1);
        assert_eq!(doc.skills[0].name, "Rust");
        assert_eq!(doc.skills[0].level, 100);
    }
}
