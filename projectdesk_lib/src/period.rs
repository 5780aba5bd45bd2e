//! Academic period windows.
//!
//! Submission and registration actions are only allowed while the matching
//! period is open. [`PeriodGate`] asks the backend, caches the answer for a
//! minute, and treats any failure as "closed".

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use projectdesk_api::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::QueryCache;
use crate::config::CacheConfig;
use crate::error::ProjectDeskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    ProposalSubmission,
    ProjectRegistration,
    DocumentSubmission,
    Evaluation,
}

impl PeriodType {
    pub const ALL: [PeriodType; 4] = [
        PeriodType::ProposalSubmission,
        PeriodType::ProjectRegistration,
        PeriodType::DocumentSubmission,
        PeriodType::Evaluation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::ProposalSubmission => "proposal_submission",
            PeriodType::ProjectRegistration => "project_registration",
            PeriodType::DocumentSubmission => "document_submission",
            PeriodType::Evaluation => "evaluation",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = ProjectDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        PeriodType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                ProjectDeskError::InvalidInput(format!(
                    "unknown period type '{}', expected one of: {}",
                    s,
                    PeriodType::ALL.map(|t| t.as_str()).join(", ")
                ))
            })
    }
}

/// A period as returned by `GET /periods/active/{type}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub period_type: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Period {
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.start_date.as_deref().and_then(|s| parse_instant(s, false))
    }

    /// A date-only end runs to the end of that day.
    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        self.end_date.as_deref().and_then(|s| parse_instant(s, true))
    }

    /// The backend's `isActive` flag wins; otherwise `now` must fall inside
    /// the window. A window with an unreadable bound is closed.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        if let Some(flag) = self.is_active {
            return flag;
        }
        match (self.starts_at(), self.ends_at()) {
            (Some(start), Some(end)) => start <= now && now <= end,
            _ => false,
        }
    }
}

fn parse_instant(s: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|dt| dt.and_utc())
}

/// Whether a period type is open, with the period that decided it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStatus {
    pub period_type: PeriodType,
    pub is_active: bool,
    pub period: Option<Period>,
}

impl PeriodStatus {
    pub fn closed(period_type: PeriodType) -> Self {
        Self {
            period_type,
            is_active: false,
            period: None,
        }
    }

    pub fn evaluate(period_type: PeriodType, period: Option<Period>, now: DateTime<Utc>) -> Self {
        let is_active = period.as_ref().is_some_and(|p| p.is_open_at(now));
        Self {
            period_type,
            is_active,
            period,
        }
    }
}

pub struct PeriodGate {
    client: Arc<Client>,
    cache: QueryCache<PeriodStatus>,
}

impl PeriodGate {
    pub fn new(client: Arc<Client>) -> Self {
        Self::with_cache_config(client, CacheConfig::period_gate())
    }

    pub fn with_cache_config(client: Arc<Client>, config: CacheConfig) -> Self {
        Self {
            client,
            cache: QueryCache::new(config),
        }
    }

    /// Checks whether `period_type` is open.
    ///
    /// Never fails: if the backend can't be reached or answers with an
    /// error the period is reported closed, and that answer is not cached.
    pub async fn check(&self, period_type: PeriodType) -> PeriodStatus {
        let key = format!("period:{}", period_type);
        let client = Arc::clone(&self.client);
        let result = self
            .cache
            .fetch(&key, move || async move {
                let path = format!("/periods/active/{}", period_type);
                let resp = client.get::<Option<Period>>(&path).await?;
                Ok(PeriodStatus::evaluate(period_type, resp.data, Utc::now()))
            })
            .await;

        match result {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Period check for {} failed, treating as closed: {}", period_type, e);
                PeriodStatus::closed(period_type)
            }
        }
    }

    pub async fn is_active(&self, period_type: PeriodType) -> bool {
        self.check(period_type).await.is_active
    }

    /// Forgets the cached answer for `period_type`.
    pub fn invalidate(&self, period_type: PeriodType) {
        self.cache.invalidate(&format!("period:{}", period_type));
    }
}
