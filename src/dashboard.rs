//! Controller logic behind the admin dashboard: session lifetime, draft
//! editing with bounded image uploads, and the list operations that precede a
//! whole-list save. The UI on top of this is a thin shell; every mutation here
//! is followed by re-POSTing the entire list, so the last full list wins.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::models::ProjectRecord;

/// Dashboard sessions stay valid for a day, then force a re-login.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Up to three slideshow images per project.
pub const MAX_IMAGES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// An authenticated dashboard session, stamped at login.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn authenticate(password: &str, expected: &str, now: DateTime<Utc>) -> Option<Self> {
        if password == expected {
            Some(Self { created_at: now })
        } else {
            None
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at < Duration::hours(SESSION_TTL_HOURS)
    }
}

/// On-device copy of the project list: a hint for instant paint. The server
/// response is always authoritative and overwrites it wholesale.
#[derive(Debug, Clone, Default)]
pub struct ProjectCache {
    cached: Option<Vec<ProjectRecord>>,
}

impl ProjectCache {
    pub fn hint(&self) -> Option<&[ProjectRecord]> {
        self.cached.as_deref()
    }

    pub fn refresh(&mut self, authoritative: Vec<ProjectRecord>) {
        self.cached = Some(authoritative);
    }
}

/// A project being created or edited in the dashboard form. Upload widgets
/// hand back image URLs one at a time; `accept_image` folds them in.
#[derive(Debug, Clone, Default)]
pub struct ProjectDraft {
    pub title: String,
    pub tags: Vec<String>,
    pub project_link: Option<String>,
    pub img_src: String,
    pub images: Vec<String>,
}

impl ProjectDraft {
    /// Appends an uploaded image URL, capped at `MAX_IMAGES`, keeping the
    /// legacy `imgSrc` mirrored to the first image.
    pub fn accept_image(&mut self, url: impl Into<String>) {
        if self.images.len() >= MAX_IMAGES {
            return;
        }
        let url = url.into();
        if self.img_src.is_empty() {
            self.img_src = url.clone();
        }
        self.images.push(url);
    }

    pub fn remove_image(&mut self, index: usize) {
        if index < self.images.len() {
            self.images.remove(index);
            self.img_src = self.images.first().cloned().unwrap_or_default();
        }
    }

    pub fn into_record(self, id: String) -> ProjectRecord {
        let images = if self.images.is_empty() && !self.img_src.is_empty() {
            vec![self.img_src.clone()]
        } else {
            self.images
        };
        ProjectRecord {
            id,
            title: self.title,
            tags: self.tags,
            project_link: self.project_link,
            img_src: self.img_src,
            images,
        }
    }
}

/// Client-generated id in the `user-<millis>-<random>` shape the stored data
/// already uses.
pub fn generate_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();
    format!("user-{}-{suffix}", now.timestamp_millis())
}

pub fn add_project(list: &mut Vec<ProjectRecord>, record: ProjectRecord) {
    list.push(record);
}

/// Replaces the record with the same id wholesale. Returns false when the id
/// is unknown.
pub fn edit_project(list: &mut [ProjectRecord], updated: ProjectRecord) -> bool {
    match list.iter_mut().find(|p| p.id == updated.id) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}

/// Removes exactly the record with the given id, preserving the relative
/// order of the rest.
pub fn delete_project(list: &mut Vec<ProjectRecord>, id: &str) -> bool {
    let before = list.len();
    list.retain(|p| p.id != id);
    list.len() != before
}

/// Swaps the record with its immediate neighbor in the given direction.
/// A no-op at either boundary or for an unknown id.
pub fn move_project(list: &mut [ProjectRecord], id: &str, direction: MoveDirection) -> bool {
    let Some(index) = list.iter().position(|p| p.id == id) else {
        return false;
    };
    match direction {
        MoveDirection::Up if index > 0 => {
            list.swap(index, index - 1);
            true
        }
        MoveDirection::Down if index + 1 < list.len() => {
            list.swap(index, index + 1);
            true
        }
        _ => false,
    }
}
