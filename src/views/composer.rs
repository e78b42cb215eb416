use std::sync::Arc;

use crate::{
    domain::{AnnouncementPatch, NewAnnouncement},
    service::AnnouncementStore,
};
use super::Notice;

/// Admin-side publishing commands. Every outcome comes back as a `Notice`.
pub struct AnnouncementComposer {
    store: Arc<AnnouncementStore>,
}

impl AnnouncementComposer {
    pub fn new(store: Arc<AnnouncementStore>) -> Self {
        Self { store }
    }

    pub async fn publish(&self, input: NewAnnouncement) -> Notice {
        match self.store.create(input).await {
            Ok(created) => Notice::Success(format!("Published \"{}\"", created.title)),
            Err(err) => Notice::Error(err.to_string()),
        }
    }

    pub async fn edit(&self, id: &str, patch: AnnouncementPatch) -> Notice {
        match self.store.update(id, patch).await {
            Ok(updated) => Notice::Success(format!("Updated \"{}\"", updated.title)),
            Err(err) => Notice::Error(err.to_string()),
        }
    }

    pub async fn toggle_visibility(&self, id: &str) -> Notice {
        let Some(current) = self.store.snapshot().find(id).map(|a| a.visible) else {
            return Notice::Error(format!("Announcement {} not found", id));
        };

        let patch = AnnouncementPatch {
            visible: Some(!current),
            ..Default::default()
        };
        match self.store.update(id, patch).await {
            Ok(updated) if updated.visible => Notice::Success(format!("\"{}\" is now visible", updated.title)),
            Ok(updated) => Notice::Success(format!("\"{}\" is now hidden", updated.title)),
            Err(err) => Notice::Error(err.to_string()),
        }
    }

    pub async fn remove(&self, id: &str) -> Notice {
        match self.store.delete(id).await {
            Ok(()) => Notice::Success("Announcement deleted".to_string()),
            Err(err) => Notice::Error(err.to_string()),
        }
    }
}
