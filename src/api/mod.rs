pub mod announcements;
pub mod client;

pub use announcements::{AnnouncementApi, RestAnnouncementApi};
pub use client::{HttpClient, RequestOptions};
