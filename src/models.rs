use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One portfolio project entry, as the dashboard and the public site shape it.
///
/// The persistence endpoints deliberately accept any array element (see
/// `handlers`); this typed form is used by the dashboard logic and by the
/// server-rendered index, which parse elements leniently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_link: Option<String>,
    /// Legacy single-image field, kept mirrored to `images[0]`.
    #[serde(default)]
    pub img_src: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DailyVisitors {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisitorStats {
    pub daily: Vec<DailyVisitors>,
    pub total: u64,
}

/// The single aggregate document holding every analytics counter.
///
/// `countries` is part of the persisted shape but nothing increments it; the
/// collector reports country data that was never aggregated server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsDocument {
    #[serde(default)]
    pub page_views: BTreeMap<String, u64>,
    #[serde(default)]
    pub project_clicks: BTreeMap<String, u64>,
    #[serde(default)]
    pub visitors: VisitorStats,
    #[serde(default = "default_devices")]
    pub devices: BTreeMap<String, u64>,
    #[serde(default)]
    pub browsers: BTreeMap<String, u64>,
    #[serde(default)]
    pub countries: BTreeMap<String, u64>,
}

impl Default for AnalyticsDocument {
    fn default() -> Self {
        Self {
            page_views: BTreeMap::new(),
            project_clicks: BTreeMap::new(),
            visitors: VisitorStats::default(),
            devices: default_devices(),
            browsers: BTreeMap::new(),
            countries: BTreeMap::new(),
        }
    }
}

fn default_devices() -> BTreeMap<String, u64> {
    ["desktop", "mobile", "tablet"]
        .into_iter()
        .map(|kind| (kind.to_string(), 0))
        .collect()
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectsResponse {
    pub success: bool,
    pub projects: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SaveProjectsRequest {
    #[serde(default)]
    pub projects: Option<Value>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveProjectsResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub analytics: AnalyticsDocument,
}

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrackResponse {
    pub success: bool,
    pub message: String,
}
