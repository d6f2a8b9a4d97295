// Prompt constants for resume tailoring.

/// System prompt for tailoring. Enforces JSON-only output.
pub const TAILOR_SYSTEM: &str = "You are an expert resume writer and career coach. \
    You rewrite resumes so they target a specific job description without inventing experience. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Tailoring prompt template. Replace `{resume}` and `{job_description}` before sending.
pub const TAILOR_PROMPT_TEMPLATE: &str = r###"Tailor the resume below to the job description.

Rules:
- Keep every fact from the original resume truthful. Do NOT add employers, titles, dates, or skills the candidate does not have.
- Keep the Markdown structure: `##` for sections, `###` for entries, `-` for bullets.
- Reorder and reword bullets so the most relevant experience comes first.
- Mirror the job description's terminology where the resume supports it.

Return a JSON object with this EXACT schema:
{
  "jobDetails": {
    "company": "Acme Corp",
    "role": "Senior Backend Engineer",
    "jobType": "Full-time",
    "location": "Remote"
  },
  "tailoredResume": {
    "content": "## Experience\n### Engineer, Foo\n- Built ...",
    "improvementSuggestions": ["Quantify the latency improvement"]
  },
  "coverLetter": "Dear Hiring Manager, ...",
  "extractedKeywords": {
    "jobDescriptionKeywords": [{"keyword": "Kubernetes", "type": "skill"}],
    "matchedKeywords": [{"keyword": "Rust", "type": "skill"}]
  },
  "matchPercentage": {
    "percentage": 78,
    "calculation": {
      "keywordMatch": 30,
      "skillsAlignment": 28,
      "experienceRelevance": 20,
      "total": 78
    },
    "explanation": "..."
  },
  "roleFitAssessment": {
    "fit": "Strong",
    "explanation": "..."
  },
  "nextSteps": ["Prepare a system design example"]
}

RESUME (Markdown):
{resume}

JOB DESCRIPTION:
{job_description}
"###;

pub fn build_tailor_prompt(resume: &str, job_description: &str) -> String {
    TAILOR_PROMPT_TEMPLATE
        .replace("{resume}", resume)
        .replace("{job_description}", job_description)
}
