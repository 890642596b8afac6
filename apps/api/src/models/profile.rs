use serde::{Deserialize, Serialize};

/// A candidate identity used to personalise generated resumes.
///
/// Profiles are owned by the persistence layer; the pipeline only reads them.
/// Optional text fields treat `Some("")` the same as `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub company_history: Option<String>,
    #[serde(default)]
    pub extra_note: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub current_role: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub style_settings: Option<StyleSettings>,
}

/// Raw style preferences as stored on a profile. Values are unvalidated
/// strings until resolved by `render::style::ResolvedStyle::resolve`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSettings {
    #[serde(default)]
    pub full_name_color: Option<String>,
    #[serde(default)]
    pub current_role_color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub heading_font: Option<String>,
    #[serde(default)]
    pub text_font: Option<String>,
    #[serde(default)]
    pub line_height: Option<String>,
}

/// One job posting to generate a resume for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub job_title: String,
    #[serde(default)]
    pub company_name: String,
    pub job_description: String,
    #[serde(default)]
    pub link: String,
}

/// Returns the trimmed value when the field is present and non-blank.
pub fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Profile {
    pub fn current_role(&self) -> &str {
        non_empty(&self.current_role).unwrap_or("")
    }
}
