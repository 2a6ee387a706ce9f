use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::models::AnalyticsDocument;
use crate::store::{Store, ANALYTICS_KEY, PROJECTS_KEY};

/// Shared handler state. Both documents live behind an async mutex, so every
/// read-modify-write against them serializes in-process; concurrent event
/// POSTs cannot lose increments.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<Store>,
    pub projects: Arc<Mutex<Vec<Value>>>,
    pub analytics: Arc<Mutex<AnalyticsDocument>>,
}

impl AppState {
    /// Hydrates both documents from the store, fail-open: anything missing or
    /// unreadable starts from its default value.
    pub async fn hydrate(config: Config, store: Store) -> Self {
        let projects: Vec<Value> = store.load_or_default(PROJECTS_KEY).await;
        let analytics: AnalyticsDocument = store.load_or_default(ANALYTICS_KEY).await;

        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            projects: Arc::new(Mutex::new(projects)),
            analytics: Arc::new(Mutex::new(analytics)),
        }
    }
}
