pub mod resume;
pub mod tailoring;
pub mod user;

pub use resume::{NewResume, Resume, ResumeRow, ResumeSummary, View};
pub use tailoring::TailoringResult;
pub use user::UserDetails;
