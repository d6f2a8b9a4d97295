use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Contact details rendered as the header of every resume. Stored as a single record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct UserDetails {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub linkedin: String,
    pub portfolio: String,
}

impl UserDetails {
    pub fn is_blank(&self) -> bool {
        [
            &self.name,
            &self.address,
            &self.phone,
            &self.email,
            &self.linkedin,
            &self.portfolio,
        ]
        .iter()
        .all(|f| f.trim().is_empty())
    }
}
