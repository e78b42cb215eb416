use async_trait::async_trait;
use serde::{de::IgnoredAny, Deserialize};

use crate::{
    api::client::{HttpClient, RequestOptions},
    domain::{AnnouncementPayload, AnnouncementRecord, Role, SeenReceipt},
    error::Result,
};

/// Remote operations the announcement store depends on.
#[async_trait]
pub trait AnnouncementApi: Send + Sync {
    /// Every announcement, paginated. Admin only.
    async fn list_all(&self, limit: u32) -> Result<Vec<AnnouncementRecord>>;
    /// Announcements visible to the given role.
    async fn list_for_role(&self, role: Role) -> Result<Vec<AnnouncementRecord>>;
    async fn create(&self, payload: AnnouncementPayload) -> Result<AnnouncementRecord>;
    async fn update(&self, id: &str, payload: AnnouncementPayload) -> Result<AnnouncementRecord>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn mark_seen(&self, id: &str) -> Result<SeenReceipt>;
}

/// The backend is not consistent about wrapping payloads, so accept the
/// bare value as well as the usual envelopes.
#[derive(Deserialize)]
#[serde(untagged)]
enum Wrapped<T> {
    Data { data: T },
    Announcements { announcements: T },
    Announcement { announcement: T },
    Bare(T),
}

impl<T> Wrapped<T> {
    fn into_inner(self) -> T {
        match self {
            Wrapped::Data { data } => data,
            Wrapped::Announcements { announcements } => announcements,
            Wrapped::Announcement { announcement } => announcement,
            Wrapped::Bare(value) => value,
        }
    }
}

pub struct RestAnnouncementApi {
    http: HttpClient,
}

impl RestAnnouncementApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    fn item_path(id: &str) -> String {
        format!("/announcements/{}", urlencoding::encode(id))
    }
}

#[async_trait]
impl AnnouncementApi for RestAnnouncementApi {
    async fn list_all(&self, limit: u32) -> Result<Vec<AnnouncementRecord>> {
        let options = RequestOptions::default().query("limit", limit);
        let response: Wrapped<Vec<AnnouncementRecord>> =
            self.http.get("/admin/announcements", Some(&options)).await?;
        Ok(response.into_inner())
    }

    async fn list_for_role(&self, role: Role) -> Result<Vec<AnnouncementRecord>> {
        let path = format!("/{}/announcements", role.as_str());
        let response: Wrapped<Vec<AnnouncementRecord>> = self.http.get(&path, None).await?;
        Ok(response.into_inner())
    }

    async fn create(&self, payload: AnnouncementPayload) -> Result<AnnouncementRecord> {
        let response: Wrapped<AnnouncementRecord> =
            self.http.post("/announcements", Some(&payload), None).await?;
        Ok(response.into_inner())
    }

    async fn update(&self, id: &str, payload: AnnouncementPayload) -> Result<AnnouncementRecord> {
        let response: Wrapped<AnnouncementRecord> =
            self.http.put(&Self::item_path(id), Some(&payload), None).await?;
        Ok(response.into_inner())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _: IgnoredAny = self.http.delete(&Self::item_path(id), None).await?;
        Ok(())
    }

    async fn mark_seen(&self, id: &str) -> Result<SeenReceipt> {
        let path = format!("{}/seen", Self::item_path(id));
        let response: Wrapped<SeenReceipt> = self.http.post::<(), _>(&path, None, None).await?;
        Ok(response.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_accepts_bare_and_wrapped() {
        let bare: Wrapped<Vec<AnnouncementRecord>> =
            serde_json::from_str(r#"[{"id": "1", "title": "A", "content": "B", "is_active": true}]"#).unwrap();
        assert_eq!(bare.into_inner().len(), 1);

        let wrapped: Wrapped<Vec<AnnouncementRecord>> = serde_json::from_str(
            r#"{"announcements": [{"id": "1"}, {"id": "2"}], "total": 2}"#,
        )
        .unwrap();
        assert_eq!(wrapped.into_inner().len(), 2);

        let data: Wrapped<Vec<AnnouncementRecord>> =
            serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(data.into_inner().is_empty());
    }

    #[test]
    fn test_seen_receipt_accepts_wrapped() {
        let bare: Wrapped<SeenReceipt> = serde_json::from_str(r#"{"seen_count": 4}"#).unwrap();
        assert_eq!(bare.into_inner().seen_count, 4);

        let wrapped: Wrapped<SeenReceipt> =
            serde_json::from_str(r#"{"data": {"seen_count": 9}}"#).unwrap();
        assert_eq!(wrapped.into_inner().seen_count, 9);
    }

    #[test]
    fn test_item_path_encodes_id() {
        assert_eq!(RestAnnouncementApi::item_path("a/b c"), "/announcements/a%2Fb%20c");
    }
}
