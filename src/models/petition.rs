//! Petition record models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing status filter understood by the petition site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetitionStatus {
    /// Signature collection in progress. This is the tracked status:
    /// new records found here are enriched and broadcast.
    Active,
    /// Under consideration.
    InProcess,
    /// Answered.
    Processed,
}

impl PetitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InProcess => "in_process",
            Self::Processed => "processed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "in_process" => Some(Self::InProcess),
            "processed" => Some(Self::Processed),
            _ => None,
        }
    }
}

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Parameters of one orchestrated listing crawl. Ephemeral, never persisted.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub status: PetitionStatus,
    pub sort: String,
    pub order: SortOrder,
}

impl ScrapeRequest {
    /// A crawl of the given status with the default sort (newest first).
    pub fn by_status(status: PetitionStatus) -> Self {
        Self {
            status,
            sort: "date".to_string(),
            order: SortOrder::Desc,
        }
    }
}

/// A partial petition record carrying listing-page fields only.
///
/// Produced by the record parser; detail fields are added later through
/// a separate enrichment pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetitionListing {
    /// Natural key, stable across re-scrapes.
    pub number: String,
    /// Topic tag with literal `#` characters stripped.
    pub tag: String,
    pub title: String,
    /// Free-text status label as shown on the site.
    pub status: String,
    /// String-formatted vote count, not guaranteed numeric.
    pub vote_count: String,
    /// Absolute URL of the petition's detail page.
    pub link: String,
    pub published_at: String,
    /// Present only for answered petitions.
    pub answered_at: Option<String>,
    /// Remaining-time label, when shown.
    pub countdown: Option<String>,
}

/// Fields available only on the detail page.
///
/// Both fields empty means "enrichment unavailable" (e.g. the detail fetch
/// failed); an empty detail is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetitionDetail {
    pub creator: String,
    pub body_text: String,
}

impl PetitionDetail {
    pub fn is_empty(&self) -> bool {
        self.creator.is_empty() && self.body_text.is_empty()
    }
}

/// A fully persisted petition record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Petition {
    pub number: String,
    pub tag: String,
    pub title: String,
    pub status: String,
    pub vote_count: String,
    pub link: String,
    pub published_at: String,
    pub answered_at: Option<String>,
    pub countdown: Option<String>,
    /// Detail field, populated by enrichment. Additive-only.
    pub creator: Option<String>,
    /// Detail field, populated by enrichment. Additive-only.
    pub body_text: Option<String>,
    /// Set once, at first persistence.
    pub created_at: DateTime<Utc>,
    /// Bumped on every reconciling write.
    pub updated_at: DateTime<Utc>,
}

impl Petition {
    /// A freshly sighted petition, before any enrichment.
    pub fn from_listing(listing: PetitionListing, now: DateTime<Utc>) -> Self {
        Self {
            number: listing.number,
            tag: listing.tag,
            title: listing.title,
            status: listing.status,
            vote_count: listing.vote_count,
            link: listing.link,
            published_at: listing.published_at,
            answered_at: listing.answered_at,
            countdown: listing.countdown,
            creator: None,
            body_text: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh listing fields from a re-scrape. Detail fields and
    /// `created_at` are untouched; `updated_at` is bumped.
    pub fn apply_listing(&mut self, listing: PetitionListing, now: DateTime<Utc>) {
        self.tag = listing.tag;
        self.title = listing.title;
        self.status = listing.status;
        self.vote_count = listing.vote_count;
        self.link = listing.link;
        self.published_at = listing.published_at;
        self.answered_at = listing.answered_at;
        self.countdown = listing.countdown;
        self.updated_at = now;
    }

    /// Merge detail fields. Additive: an empty field never overwrites a
    /// previously populated one.
    pub fn apply_detail(&mut self, detail: &PetitionDetail, now: DateTime<Utc>) {
        if !detail.creator.is_empty() {
            self.creator = Some(detail.creator.clone());
        }
        if !detail.body_text.is_empty() {
            self.body_text = Some(detail.body_text.clone());
        }
        self.updated_at = now;
    }

    /// Whether the detail pass still has work to do for this record.
    pub fn needs_details(&self) -> bool {
        let missing = |field: &Option<String>| field.as_deref().is_none_or(str::is_empty);
        missing(&self.creator) || missing(&self.body_text)
    }
}
