use serde::{Deserialize, Serialize};

/// Contact block. Every field is optional: parsers routinely miss some of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
}

/// One position in the work history. Dates are kept as the free text the parser produced;
/// interpretation happens in `text::dates`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub achievements: Vec<String>,
}

impl ExperienceEntry {
    /// Complete iff title, company, both dates, and at least one of achievements/description.
    pub fn is_complete(&self) -> bool {
        let present = |s: &str| !s.trim().is_empty();
        present(&self.title)
            && present(&self.company)
            && present(&self.start_date)
            && present(&self.end_date)
            && (self.achievements.iter().any(|a| present(a)) || present(&self.description))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub graduation_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationEntry {
    pub name: String,
    pub issuer: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    /// 0 when the parser could not tell.
    pub page_count: u32,
    /// 0 when the parser could not tell; the engine counts words itself in that case.
    pub word_count: u32,
    /// Lowercase extension without the dot, e.g. `pdf`, `docx`.
    pub file_format: String,
    pub has_photo: bool,
}

/// A parsed résumé. Read-only for the duration of a scoring run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeDocument {
    pub contact: Contact,
    pub summary: Option<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<String>,
    pub certifications: Vec<CertificationEntry>,
    pub metadata: DocumentMetadata,
}

impl ResumeDocument {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
