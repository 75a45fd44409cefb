// src/post.rs
use chrono::{DateTime, Utc};

/// A raw news entry parsed from the listing page, before its article page
/// has been fetched.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CandidatePost {
    pub title: String,
    /// Publish timestamp; `UNIX_EPOCH` when the listing carried no parsable date,
    /// so the post is always considered old and never re-published.
    pub date: DateTime<Utc>,
    /// Raw link target from the listing, possibly relative. Callers must guard `None`.
    pub link: Option<String>,
}

/// A candidate post augmented with optional image and description after
/// fetching its article page. `link` is absolute once enrichment succeeded.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EnrichedPost {
    pub title: String,
    pub date: DateTime<Utc>,
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl From<CandidatePost> for EnrichedPost {
    fn from(post: CandidatePost) -> Self {
        Self {
            title: post.title,
            date: post.date,
            link: post.link,
            image: None,
            desc: None,
        }
    }
}
