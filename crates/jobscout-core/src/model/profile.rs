use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Structured view of a resume, built once per run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeProfile {
    /// Normalized lowercase skill tokens.
    pub skills: BTreeSet<String>,
    /// Years of experience; 0 when the resume does not say.
    pub experience_years: u32,
    pub location: Option<String>,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub raw_text: String,
}

impl ResumeProfile {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.experience_years == 0 && self.location.is_none()
    }
}
