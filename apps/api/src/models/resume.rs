use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::tailoring::TailoringResult;

/// Which version of a tailored resume to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Tailored,
    Original,
}

/// A stored resume. Tailored resumes keep the original Markdown in `content`
/// and the model's full response in `tailored_response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub id: Uuid,
    /// Original Markdown source.
    pub content: String,
    /// Display title; the company name for tailored resumes.
    pub title: String,
    pub position: Option<String>,
    pub is_tailored: bool,
    pub job_description: Option<String>,
    pub tailored_response: Option<TailoringResult>,
    pub created_at: DateTime<Utc>,
}

impl Resume {
    pub fn new(input: NewResume) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: input.content,
            title: input.title.unwrap_or_default(),
            position: input.position,
            is_tailored: input.tailored_response.is_some(),
            job_description: input.job_description,
            tailored_response: input.tailored_response,
            created_at: Utc::now(),
        }
    }

    /// Title for lists and headers; untitled resumes get a placeholder.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled Resume"
        } else {
            &self.title
        }
    }

    /// Markdown to render for `view`. Non-tailored resumes always show their
    /// content; tailored ones show the tailored text unless the original is asked
    /// for, falling back to the original when the response carries no content.
    pub fn display_content(&self, view: View) -> &str {
        if !self.is_tailored || view == View::Original {
            return &self.content;
        }
        self.tailored_response
            .as_ref()
            .map(|r| r.tailored_resume.content.as_str())
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&self.content)
    }
}

/// Input for creating a resume.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewResume {
    pub content: String,
    pub title: Option<String>,
    pub position: Option<String>,
    pub job_description: Option<String>,
    pub tailored_response: Option<TailoringResult>,
}

/// Summary row for the resume list.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeSummary {
    pub id: Uuid,
    pub title: String,
    pub position: Option<String>,
    pub is_tailored: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Resume> for ResumeSummary {
    fn from(r: &Resume) -> Self {
        Self {
            id: r.id,
            title: r.display_title().to_string(),
            position: r.position.clone(),
            is_tailored: r.is_tailored,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub content: String,
    pub title: String,
    pub position: Option<String>,
    pub is_tailored: bool,
    pub job_description: Option<String>,
    pub tailored_response: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ResumeRow> for Resume {
    type Error = serde_json::Error;

    fn try_from(row: ResumeRow) -> Result<Self, Self::Error> {
        let tailored_response = row
            .tailored_response
            .map(serde_json::from_value)
            .transpose()?;
        Ok(Self {
            id: row.id,
            content: row.content,
            title: row.title,
            position: row.position,
            is_tailored: row.is_tailored,
            job_description: row.job_description,
            tailored_response,
            created_at: row.created_at,
        })
    }
}
