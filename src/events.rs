use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::models::{AnalyticsDocument, DailyVisitors};

/// A telemetry event accepted by `POST /api/analytics`.
///
/// The set is closed: anything else in the `event` field is a validation
/// error rather than a silent no-op.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent {
    PageView { page: String },
    ProjectClick { project: String },
    Visitor {
        device: Option<String>,
        browser: Option<String>,
    },
}

impl AnalyticsEvent {
    pub fn parse(event: &str, data: &Value) -> Result<Self, String> {
        match event {
            "pageView" => Ok(Self::PageView {
                page: str_field(data, "page").unwrap_or_else(|| "/".to_string()),
            }),
            "projectClick" => Ok(Self::ProjectClick {
                project: str_field(data, "project").unwrap_or_else(|| "Unknown".to_string()),
            }),
            "visitor" => Ok(Self::Visitor {
                device: str_field(data, "device"),
                browser: str_field(data, "browser"),
            }),
            other => Err(format!("unknown event '{other}'")),
        }
    }
}

fn str_field(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

pub fn apply_event(doc: &mut AnalyticsDocument, event: &AnalyticsEvent) {
    apply_event_at(doc, event, Utc::now().date_naive());
}

pub fn apply_event_at(doc: &mut AnalyticsDocument, event: &AnalyticsEvent, today: NaiveDate) {
    match event {
        AnalyticsEvent::PageView { page } => {
            bump(&mut doc.page_views, page);
        }
        AnalyticsEvent::ProjectClick { project } => {
            bump(&mut doc.project_clicks, project);
        }
        AnalyticsEvent::Visitor { device, browser } => {
            doc.visitors.total = doc.visitors.total.saturating_add(1);

            // One entry per calendar day; same-day visits accumulate.
            let date = today.format("%Y-%m-%d").to_string();
            match doc.visitors.daily.iter_mut().find(|d| d.date == date) {
                Some(entry) => entry.count = entry.count.saturating_add(1),
                None => doc.visitors.daily.push(DailyVisitors { date, count: 1 }),
            }

            if let Some(device) = device {
                bump(&mut doc.devices, device);
            }
            if let Some(browser) = browser {
                bump(&mut doc.browsers, browser);
            }
        }
    }
}

fn bump(map: &mut std::collections::BTreeMap<String, u64>, key: &str) {
    let count = map.entry(key.to_string()).or_insert(0);
    *count = count.saturating_add(1);
}
