//! Shape of a tailoring response as returned by the model and stored with the resume.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoringResult {
    pub job_details: JobDetails,
    pub tailored_resume: TailoredResume,
    pub cover_letter: CoverLetter,
    #[serde(default)]
    pub extracted_keywords: ExtractedKeywords,
    #[serde(default)]
    pub match_percentage: MatchPercentage,
    #[serde(default)]
    pub role_fit_assessment: RoleFitAssessment,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobDetails {
    pub company: String,
    pub role: String,
    pub job_type: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TailoredResume {
    /// Markdown of the tailored resume.
    pub content: String,
    pub improvement_suggestions: Vec<String>,
}

/// Models return the cover letter either as plain text or wrapped in an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoverLetter {
    Text(String),
    Document { content: String },
}

impl CoverLetter {
    pub fn text(&self) -> &str {
        match self {
            CoverLetter::Text(s) => s,
            CoverLetter::Document { content } => content,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedKeywords {
    pub job_description_keywords: Vec<Keyword>,
    pub matched_keywords: Vec<Keyword>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keyword {
    pub keyword: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A score the model may emit as a number or as text such as "85%".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Number(f64),
    Text(String),
}

impl Default for Score {
    fn default() -> Self {
        Score::Text(String::new())
    }
}

impl Score {
    pub fn display(&self) -> String {
        match self {
            Score::Number(n) => format!("{n}"),
            Score::Text(s) if s.trim().is_empty() => "N/A".to_string(),
            Score::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchPercentage {
    pub percentage: Score,
    pub calculation: MatchCalculation,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchCalculation {
    pub keyword_match: Score,
    pub skills_alignment: Score,
    pub experience_relevance: Score,
    pub total: Score,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleFitAssessment {
    pub fit: String,
    pub explanation: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Analysis view
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordStatus {
    JobDescriptionOnly,
    Matched,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordRow {
    pub keyword: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: KeywordStatus,
}

impl TailoringResult {
    /// Job-description keywords first, then matched ones, each tagged with its status.
    pub fn keyword_table(&self) -> Vec<KeywordRow> {
        let rows = |keywords: &[Keyword], status| {
            keywords
                .iter()
                .map(move |k| KeywordRow {
                    keyword: k.keyword.clone(),
                    kind: k.kind.clone(),
                    status,
                })
                .collect::<Vec<_>>()
        };
        let mut table = rows(
            &self.extracted_keywords.job_description_keywords,
            KeywordStatus::JobDescriptionOnly,
        );
        table.extend(rows(
            &self.extracted_keywords.matched_keywords,
            KeywordStatus::Matched,
        ));
        table
    }
}
