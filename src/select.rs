// src/select.rs
//! Incremental selection: decide which candidates are new relative to the
//! stored watermark.

use chrono::{DateTime, Utc};

use crate::post::CandidatePost;

/// Pick the posts that should be published this run.
///
/// Without a watermark (no prior run persisted) the first `first_run_limit`
/// candidates are taken from the front, bootstrapping the channel without
/// flooding it with history. With a watermark, every candidate dated at or
/// after it qualifies (inclusive boundary). Never errors; input is untouched.
pub fn select_new(
    candidates: &[CandidatePost],
    watermark: Option<DateTime<Utc>>,
    first_run_limit: usize,
) -> Vec<CandidatePost> {
    match watermark {
        None => candidates.iter().take(first_run_limit).cloned().collect(),
        Some(mark) => candidates
            .iter()
            .filter(|post| post.date >= mark)
            .cloned()
            .collect(),
    }
}
