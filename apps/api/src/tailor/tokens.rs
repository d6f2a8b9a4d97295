use serde::Serialize;

use crate::tailor::prompts::{TAILOR_PROMPT_TEMPLATE, TAILOR_SYSTEM};

/// Share of the model's context window a request may use.
pub const MAX_CONTEXT_SHARE: f64 = 0.8;

/// Used when the prompt template cannot be measured (empty).
const FALLBACK_BASE_PROMPT_TOKENS: usize = 350;

/// Rough token count: one token per four characters, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Tokens taken by the fixed system prompt and template, before inputs are inserted.
pub fn base_prompt_tokens() -> usize {
    match estimate_tokens(TAILOR_SYSTEM) + estimate_tokens(TAILOR_PROMPT_TEMPLATE) {
        0 => FALLBACK_BASE_PROMPT_TOKENS,
        n => n,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenBudget {
    pub estimated: usize,
    pub limit: u32,
}

impl TokenBudget {
    pub fn for_inputs(resume: &str, job_description: &str, base: usize, limit: u32) -> Self {
        let input = (resume.chars().count() + job_description.chars().count()).div_ceil(4);
        Self {
            estimated: base + input,
            limit,
        }
    }

    pub fn exceeds_limit(&self) -> bool {
        self.estimated as f64 > f64::from(self.limit) * MAX_CONTEXT_SHARE
    }
}
