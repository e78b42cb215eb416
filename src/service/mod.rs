pub mod announcement_store;
pub mod form_builder;

use std::sync::Arc;

use crate::{
    api::{AnnouncementApi, HttpClient, RestAnnouncementApi},
    config::Settings,
    domain::Role,
    error::Result,
};

pub use announcement_store::{AnnouncementStore, SeenOutcome, StoreState};
pub use form_builder::{FormBuilder, FormLibrary};

/// Everything the views need, created once when the app mounts and handed
/// down explicitly instead of living in a global.
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub role: Role,
    pub announcements: Arc<AnnouncementStore>,
    pub forms: FormLibrary,
}

impl AppContext {
    /// Builds the HTTP client and stores for the configured backend.
    pub fn mount(settings: Settings) -> Result<Self> {
        let http = HttpClient::new(&settings.api)?;
        tracing::info!(
            "Mounting app context for {} against {}",
            settings.session.role,
            http.base_url()
        );
        let api: Arc<dyn AnnouncementApi> = Arc::new(RestAnnouncementApi::new(http));
        Ok(Self::with_api(settings, api))
    }

    /// Same as `mount` but with a caller-supplied backend.
    pub fn with_api(settings: Settings, api: Arc<dyn AnnouncementApi>) -> Self {
        let role = settings.session.role;
        let announcements = Arc::new(AnnouncementStore::new(
            api,
            role,
            settings.announcements.admin_page_limit,
        ));

        Self {
            settings: Arc::new(settings),
            role,
            announcements,
            forms: FormLibrary::new(),
        }
    }

    /// Tears the context down. Views holding a store handle keep a usable
    /// (but detached) store until they drop it.
    pub fn unmount(self) {
        let state = self.announcements.snapshot();
        tracing::info!(
            "Unmounting app context ({} announcements cached, {} forms published)",
            state.announcements.len(),
            self.forms.forms().len()
        );
    }
}
