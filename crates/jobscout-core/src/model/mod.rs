//! Records flowing through the pipeline: postings in, profiles alongside,
//! scores out. All of them are plain serde data and never mutated once built.

mod posting;
mod profile;
mod score;

pub use posting::{job_id_from_url, JobPosting, LocationType, Salary};
pub use profile::ResumeProfile;
pub use score::{JobMatchScore, Recommendation, ScoreBreakdown};
