#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use sanctum::{
    api::AnnouncementApi,
    domain::{AnnouncementPayload, AnnouncementRecord, Role, SeenReceipt},
    error::{AppError, Result},
};

/// In-memory backend for store tests.
///
/// Failures are armed per operation and consumed by the next matching call.
/// `hold_next_list` / `hold_seen` park a call until the test releases it.
#[derive(Default)]
pub struct FakeAnnouncementApi {
    inner: Mutex<FakeState>,
    pub list_entered: Notify,
    pub seen_entered: Notify,
}

#[derive(Default)]
struct FakeState {
    records: Vec<AnnouncementRecord>,
    next_id: u64,
    fail_list: Option<AppError>,
    fail_create: Option<AppError>,
    fail_update: Option<AppError>,
    fail_delete: Option<AppError>,
    fail_seen: Option<AppError>,
    list_gates: VecDeque<Arc<Notify>>,
    seen_gate: Option<Arc<Notify>>,
    calls: Vec<String>,
    payloads: Vec<AnnouncementPayload>,
}

pub fn record(id: &str, title: &str, visible: bool, seen_count: u64) -> AnnouncementRecord {
    AnnouncementRecord {
        id: id.to_string(),
        title: title.to_string(),
        content: format!("{} body", title),
        is_active: visible,
        duration_days: None,
        kind: Some("info".to_string()),
        target_role: None,
        created_at: Some("2026-04-01T12:00:00Z".to_string()),
        seen_count: Some(seen_count),
        has_seen: Some(false),
    }
}

pub fn server_error(message: &str) -> AppError {
    AppError::Server {
        status: 500,
        message: message.to_string(),
        data: None,
    }
}

impl FakeAnnouncementApi {
    pub fn with_records(records: Vec<AnnouncementRecord>) -> Arc<Self> {
        let fake = Self::default();
        fake.inner.lock().unwrap().records = records;
        Arc::new(fake)
    }

    pub fn set_records(&self, records: Vec<AnnouncementRecord>) {
        self.inner.lock().unwrap().records = records;
    }

    pub fn set_seen_count(&self, id: &str, count: u64) {
        let mut state = self.inner.lock().unwrap();
        if let Some(r) = state.records.iter_mut().find(|r| r.id == id) {
            r.seen_count = Some(count);
        }
    }

    pub fn fail_next_list(&self, err: AppError) {
        self.inner.lock().unwrap().fail_list = Some(err);
    }

    pub fn fail_next_create(&self, err: AppError) {
        self.inner.lock().unwrap().fail_create = Some(err);
    }

    pub fn fail_next_update(&self, err: AppError) {
        self.inner.lock().unwrap().fail_update = Some(err);
    }

    pub fn fail_next_delete(&self, err: AppError) {
        self.inner.lock().unwrap().fail_delete = Some(err);
    }

    pub fn fail_next_seen(&self, err: AppError) {
        self.inner.lock().unwrap().fail_seen = Some(err);
    }

    /// The next list call snapshots the records, then waits for the returned gate.
    pub fn hold_next_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.inner.lock().unwrap().list_gates.push_back(gate.clone());
        gate
    }

    /// Every mark-seen call waits for the returned gate until `release_seen`.
    pub fn hold_seen(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.inner.lock().unwrap().seen_gate = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn payloads(&self) -> Vec<AnnouncementPayload> {
        self.inner.lock().unwrap().payloads.clone()
    }

    pub fn server_views(&self, id: &str) -> Option<u64> {
        let state = self.inner.lock().unwrap();
        state.records.iter().find(|r| r.id == id).and_then(|r| r.seen_count)
    }

    async fn list(&self, call: String, visible_only: bool) -> Result<Vec<AnnouncementRecord>> {
        let (outcome, gate) = {
            let mut state = self.inner.lock().unwrap();
            state.calls.push(call);
            let outcome = match state.fail_list.take() {
                Some(err) => Err(err),
                None => Ok(state
                    .records
                    .iter()
                    .filter(|r| !visible_only || r.is_active)
                    .cloned()
                    .collect()),
            };
            (outcome, state.list_gates.pop_front())
        };

        self.list_entered.notify_one();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        outcome
    }
}

#[async_trait]
impl AnnouncementApi for FakeAnnouncementApi {
    async fn list_all(&self, limit: u32) -> Result<Vec<AnnouncementRecord>> {
        self.list(format!("list_all:{}", limit), false).await
    }

    async fn list_for_role(&self, role: Role) -> Result<Vec<AnnouncementRecord>> {
        self.list(format!("list_for_role:{}", role), true).await
    }

    async fn create(&self, payload: AnnouncementPayload) -> Result<AnnouncementRecord> {
        let mut state = self.inner.lock().unwrap();
        state.calls.push("create".to_string());
        state.payloads.push(payload.clone());
        if let Some(err) = state.fail_create.take() {
            return Err(err);
        }

        state.next_id += 1;
        let created = AnnouncementRecord {
            id: format!("new-{}", state.next_id),
            title: payload.title.unwrap_or_default(),
            content: payload.content.unwrap_or_default(),
            is_active: payload.is_active.unwrap_or(true),
            duration_days: payload.duration_days,
            kind: payload.kind,
            target_role: payload.target_role,
            created_at: Some("2026-04-02T08:00:00Z".to_string()),
            seen_count: Some(0),
            has_seen: None,
        };
        state.records.insert(0, created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, payload: AnnouncementPayload) -> Result<AnnouncementRecord> {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(format!("update:{}", id));
        state.payloads.push(payload.clone());
        if let Some(err) = state.fail_update.take() {
            return Err(err);
        }

        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::Rejected {
                status: 404,
                message: "Announcement not found".to_string(),
                data: None,
            })?;
        if let Some(title) = payload.title {
            record.title = title;
        }
        if let Some(content) = payload.content {
            record.content = content;
        }
        if let Some(active) = payload.is_active {
            record.is_active = active;
        }
        if let Some(kind) = payload.kind {
            record.kind = Some(kind);
        }
        if payload.duration_days.is_some() {
            record.duration_days = payload.duration_days;
        }
        if payload.target_role.is_some() {
            record.target_role = payload.target_role;
        }
        // Writes don't echo per-viewer state.
        let mut echoed = record.clone();
        echoed.has_seen = None;
        Ok(echoed)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(format!("delete:{}", id));
        if let Some(err) = state.fail_delete.take() {
            return Err(err);
        }
        state.records.retain(|r| r.id != id);
        Ok(())
    }

    async fn mark_seen(&self, id: &str) -> Result<SeenReceipt> {
        let gate = {
            let mut state = self.inner.lock().unwrap();
            state.calls.push(format!("seen:{}", id));
            state.seen_gate.clone()
        };

        self.seen_entered.notify_one();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.inner.lock().unwrap();
        if let Some(err) = state.fail_seen.take() {
            return Err(err);
        }
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| server_error("missing announcement"))?;
        let count = record.seen_count.unwrap_or(0) + 1;
        record.seen_count = Some(count);
        Ok(SeenReceipt { seen_count: count })
    }
}
