use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use validator::Validate;

use crate::{
    api::AnnouncementApi,
    domain::{Announcement, AnnouncementPatch, NewAnnouncement, Role},
    error::{AppError, Result},
    transform::{to_backend, to_frontend},
};

/// Snapshot of everything the announcement views render from.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub announcements: Vec<Announcement>,
    pub loading: bool,
    pub error: Option<String>,
    /// Ids with an optimistic change waiting on the backend.
    pending: HashSet<String>,
    /// Confirmed views, keyed by id, with the fetch sequence current at confirmation.
    confirmed: HashMap<String, u64>,
    in_flight: usize,
}

impl StoreState {
    pub fn find(&self, id: &str) -> Option<&Announcement> {
        self.announcements.iter().find(|a| a.id == id)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains(id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Announcement> {
        self.announcements.iter_mut().find(|a| a.id == id)
    }

    /// Installs a fetched list issued under `token`.
    ///
    /// A view the backend may not have counted when it built the list
    /// (still pending, or confirmed after the fetch went out) survives.
    fn replace_from_fetch(&mut self, fetched: Vec<Announcement>, token: u64) {
        let merged = fetched
            .into_iter()
            .map(|mut incoming| {
                let newer_local = self.pending.contains(&incoming.id)
                    || self.confirmed.get(&incoming.id).is_some_and(|&seq| seq >= token);
                if newer_local {
                    if let Some(local) = self.find(&incoming.id).filter(|a| a.has_seen) {
                        incoming.has_seen = true;
                        incoming.views = incoming.views.max(local.views);
                    }
                }
                incoming
            })
            .collect();
        self.announcements = merged;
        self.confirmed.retain(|_, seq| *seq >= token);
    }
}

/// What `mark_seen` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeenOutcome {
    /// The backend confirmed the view; `views` is its authoritative count.
    Recorded { views: u64 },
    AlreadySeen,
    /// Another mark-seen for this id has not resolved yet.
    Pending,
    NotFound,
}

/// Client-side cache of the announcements the current user may see.
///
/// Reads are synchronous snapshots off a `watch` channel; commands go to the
/// backend and fold the result back in. The state is never locked across an
/// `.await`.
pub struct AnnouncementStore {
    api: Arc<dyn AnnouncementApi>,
    role: Role,
    admin_page_limit: u32,
    state: watch::Sender<StoreState>,
    fetch_seq: AtomicU64,
}

impl AnnouncementStore {
    pub fn new(api: Arc<dyn AnnouncementApi>, role: Role, admin_page_limit: u32) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            api,
            role,
            admin_page_limit,
            state,
            fetch_seq: AtomicU64::new(0),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// Replaces the list with the backend's view of it.
    ///
    /// Only the most recently issued fetch may write; a slower, older
    /// response is dropped and its caller gets the current list size
    /// instead. On failure the list is emptied.
    pub async fn fetch(&self) -> Result<usize> {
        let token = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.begin();

        let result = if self.role.is_admin() {
            self.api.list_all(self.admin_page_limit).await
        } else {
            self.api.list_for_role(self.role).await
        };

        let latest = self.fetch_seq.load(Ordering::SeqCst) == token;

        match result {
            Ok(records) => {
                let mut seen_ids = HashSet::new();
                let announcements: Vec<Announcement> = records
                    .into_iter()
                    .map(to_frontend)
                    .filter(|a| {
                        let fresh = seen_ids.insert(a.id.clone());
                        if !fresh {
                            tracing::warn!("Backend returned duplicate announcement {}", a.id);
                        }
                        fresh
                    })
                    .collect();
                let count = announcements.len();

                if !latest {
                    tracing::debug!("Discarding stale announcement fetch #{}", token);
                    return Ok(self.superseded());
                }
                self.finish(|s| s.replace_from_fetch(announcements, token));
                tracing::debug!("Fetched {} announcements for {}", count, self.role);
                Ok(count)
            }
            Err(err) => {
                if !latest {
                    tracing::debug!("Ignoring failure of stale fetch #{}: {}", token, err);
                    return Ok(self.superseded());
                }
                tracing::warn!("Failed to fetch announcements: {}", err);
                self.finish(|s| {
                    s.announcements.clear();
                    s.confirmed.retain(|_, seq| *seq >= token);
                    s.error = Some(err.to_string());
                });
                Err(err)
            }
        }
    }

    /// Settles a fetch that lost the race without touching the list.
    fn superseded(&self) -> usize {
        let mut count = 0;
        self.finish(|s| count = s.announcements.len());
        count
    }

    pub async fn create(&self, input: NewAnnouncement) -> Result<Announcement> {
        self.require_admin()?;
        if let Err(errors) = input.validate() {
            return self.reject(errors.into());
        }

        let payload = to_backend(&AnnouncementPatch::from(input));
        self.begin();

        match self.api.create(payload).await {
            Ok(record) => {
                let created = to_frontend(record);
                let entry = created.clone();
                self.finish(|s| {
                    // A concurrent fetch may already have picked it up.
                    s.announcements.retain(|a| a.id != entry.id);
                    s.announcements.insert(0, entry);
                });
                tracing::info!("Published announcement {}", created.id);
                Ok(created)
            }
            Err(err) => {
                tracing::warn!("Failed to publish announcement: {}", err);
                self.finish(|s| s.error = Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Sends only the fields set on `patch`.
    pub async fn update(&self, id: &str, patch: AnnouncementPatch) -> Result<Announcement> {
        self.require_admin()?;
        let payload = to_backend(&patch);
        if payload.is_empty() {
            return self.reject(AppError::InvalidInput("No fields to update".to_string()));
        }

        self.begin();

        match self.api.update(id, payload).await {
            Ok(record) => {
                let mut updated = to_frontend(record);
                self.finish(|s| {
                    if let Some(existing) = s.find_mut(id) {
                        // The backend doesn't echo per-viewer state on writes.
                        updated.has_seen = updated.has_seen || existing.has_seen;
                        *existing = updated.clone();
                    }
                });
                tracing::info!("Updated announcement {}", id);
                Ok(updated)
            }
            Err(err) => {
                tracing::warn!("Failed to update announcement {}: {}", id, err);
                self.finish(|s| s.error = Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Removes the entry once the backend confirms the delete.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.require_admin()?;
        self.begin();

        match self.api.delete(id).await {
            Ok(()) => {
                self.finish(|s| s.announcements.retain(|a| a.id != id));
                tracing::info!("Deleted announcement {}", id);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Failed to delete announcement {}: {}", id, err);
                self.finish(|s| s.error = Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Records a view optimistically, then reconciles with the backend.
    ///
    /// The local entry is bumped and flagged before the request goes out.
    /// On success the count is replaced by the server's; on failure the
    /// whole list is re-fetched.
    pub async fn mark_seen(&self, id: &str) -> Result<SeenOutcome> {
        let mut skipped = None;
        self.state.send_if_modified(|s| {
            let cleared = s.error.take().is_some();
            let pending = s.pending.contains(id);
            match s.announcements.iter_mut().find(|a| a.id == id) {
                None => {
                    skipped = Some(SeenOutcome::NotFound);
                    cleared
                }
                Some(_) if pending => {
                    skipped = Some(SeenOutcome::Pending);
                    cleared
                }
                Some(a) if a.has_seen => {
                    skipped = Some(SeenOutcome::AlreadySeen);
                    cleared
                }
                Some(a) => {
                    a.views += 1;
                    a.has_seen = true;
                    s.pending.insert(id.to_string());
                    s.in_flight += 1;
                    s.loading = true;
                    true
                }
            }
        });
        if let Some(outcome) = skipped {
            return Ok(outcome);
        }

        match self.api.mark_seen(id).await {
            Ok(receipt) => {
                let seq = self.fetch_seq.load(Ordering::SeqCst);
                self.finish(|s| {
                    s.pending.remove(id);
                    if let Some(a) = s.find_mut(id) {
                        a.views = receipt.seen_count;
                        a.has_seen = true;
                        s.confirmed.insert(id.to_string(), seq);
                    }
                });
                Ok(SeenOutcome::Recorded { views: receipt.seen_count })
            }
            Err(err) => {
                tracing::warn!("Failed to mark announcement {} seen, re-fetching: {}", id, err);
                self.finish(|s| {
                    s.pending.remove(id);
                });
                if let Err(refetch) = self.fetch().await {
                    tracing::warn!("Rollback fetch failed: {}", refetch);
                }
                Err(err)
            }
        }
    }

    fn require_admin(&self) -> Result<()> {
        if self.role.is_admin() {
            Ok(())
        } else {
            self.reject(AppError::Forbidden)
        }
    }

    fn reject<T>(&self, err: AppError) -> Result<T> {
        self.state.send_modify(|s| s.error = Some(err.to_string()));
        Err(err)
    }

    fn begin(&self) {
        self.state.send_modify(|s| {
            s.error = None;
            s.in_flight += 1;
            s.loading = true;
        });
    }

    fn finish(&self, apply: impl FnOnce(&mut StoreState)) {
        self.state.send_modify(|s| {
            apply(s);
            s.in_flight = s.in_flight.saturating_sub(1);
            s.loading = s.in_flight > 0;
        });
    }
}
