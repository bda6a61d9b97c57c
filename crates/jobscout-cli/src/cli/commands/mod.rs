//! CLI command handlers. Each command is in its own file.

mod config;
mod rank;
mod search;

pub use config::run_config;
pub use rank::{run_rank, RankOptions};
pub use search::{run_search, SearchOptions};

use jobscout_core::config::SearchDefaults;
use jobscout_core::model::ResumeProfile;
use jobscout_core::resume::load_profile;
use jobscout_core::scoring::CandidatePreferences;
use std::path::Path;

/// Resume profile from the flag or the configured default path. Missing
/// or unreadable resumes give an empty profile (warnings are printed).
pub(crate) fn resume_profile(flag: Option<&Path>, defaults: &SearchDefaults) -> ResumeProfile {
    let Some(path) = flag.or(defaults.resume_path.as_deref()) else {
        eprintln!("note: no resume given; skill and experience matching will be weak");
        return ResumeProfile::default();
    };
    let extraction = load_profile(path);
    for warning in &extraction.warnings {
        eprintln!("warning: {warning}");
    }
    extraction.profile
}

/// Location preferences: flags win over `[search]` config.
pub(crate) fn preferences(
    remote_only: bool,
    location: Option<String>,
    defaults: &SearchDefaults,
) -> CandidatePreferences {
    CandidatePreferences {
        remote_only: remote_only || defaults.remote_only,
        location: location.or_else(|| defaults.location.clone()),
    }
}
