//! Client-side instrumentation logic: user-agent classification, the
//! once-per-session visitor gate, and a local mirror of the counters for
//! instant dashboard paint. The collector produces events; the transport
//! that posts them to `/api/analytics` is fire-and-forget and failures are
//! only logged.

use crate::events::{apply_event, AnalyticsEvent};
use crate::models::AnalyticsDocument;

/// Only the mirrored copy trims visitor history; the endpoint keeps all of it.
pub const MIRROR_DAILY_LIMIT: usize = 30;

pub fn detect_device(user_agent: &str) -> &'static str {
    let ua = user_agent.to_ascii_lowercase();
    let is_tablet = ua.contains("tablet")
        || ua.contains("ipad")
        || ua.contains("playbook")
        || ua.contains("silk")
        || (ua.contains("android") && !ua.contains("mobi"));
    if is_tablet {
        return "tablet";
    }

    let is_mobile = ua.contains("mobile")
        || ua.contains("android")
        || ua.contains("iphone")
        || ua.contains("ipod")
        || ua.contains("iemobile")
        || ua.contains("blackberry")
        || ua.contains("opera mini");
    if is_mobile {
        return "mobile";
    }

    "desktop"
}

// Same match order the site shipped with: Chrome wins over Edge because
// Edge UAs also contain "Chrome".
pub fn detect_browser(user_agent: &str) -> &'static str {
    if user_agent.contains("Firefox") {
        "Firefox"
    } else if user_agent.contains("Chrome") {
        "Chrome"
    } else if user_agent.contains("Safari") {
        "Safari"
    } else if user_agent.contains("Edge") {
        "Edge"
    } else {
        "Other"
    }
}

/// Per-session collector. Emits the events a page interaction should send and
/// mirrors each of them into a local document so the dashboard can paint
/// before the server answers.
#[derive(Debug, Default)]
pub struct Collector {
    visitor_tracked: bool,
    mirror: AnalyticsDocument,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mirrored counters; a hint only, the server document is
    /// authoritative.
    pub fn mirror(&self) -> &AnalyticsDocument {
        &self.mirror
    }

    /// A page load: always a `pageView`, plus one `visitor` event the first
    /// time in the session.
    pub fn page_view(&mut self, page: &str, user_agent: &str) -> Vec<AnalyticsEvent> {
        let mut events = vec![AnalyticsEvent::PageView {
            page: page.to_string(),
        }];

        if !self.visitor_tracked {
            self.visitor_tracked = true;
            events.push(AnalyticsEvent::Visitor {
                device: Some(detect_device(user_agent).to_string()),
                browser: Some(detect_browser(user_agent).to_string()),
            });
        }

        for event in &events {
            apply_event(&mut self.mirror, event);
        }
        self.trim_mirror();
        events
    }

    pub fn project_click(&mut self, title: &str) -> AnalyticsEvent {
        let event = AnalyticsEvent::ProjectClick {
            project: title.to_string(),
        };
        apply_event(&mut self.mirror, &event);
        event
    }

    fn trim_mirror(&mut self) {
        let daily = &mut self.mirror.visitors.daily;
        if daily.len() > MIRROR_DAILY_LIMIT {
            let excess = daily.len() - MIRROR_DAILY_LIMIT;
            daily.drain(..excess);
        }
    }
}
