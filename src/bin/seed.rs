use clap::Parser;
use fake::{
    faker::lorem::en::{Paragraph, Sentence},
    Fake,
};
use sanctum::{
    config::Settings,
    domain::{AnnouncementKind, NewAnnouncement, Role},
    service::AppContext,
};

/// Fills a development backend with demo announcements.
#[derive(Parser)]
#[command(name = "seed")]
struct Args {
    /// How many generated announcements to publish on top of the fixed ones
    #[arg(long, default_value_t = 5)]
    count: usize,

    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    println!("🌱 Starting announcement seeding...");

    let mut settings = Settings::new().unwrap_or_default();
    // Publishing needs the admin endpoints.
    settings.session.role = Role::Admin;
    if let Some(base_url) = args.base_url {
        settings.api.base_url = base_url;
    }

    let context = AppContext::mount(settings)?;
    let store = context.announcements.clone();

    println!("📢 Creating fixed announcements...");
    let fixed = [
        (
            "Counselling drop-in hours",
            "Counsellors are available every weekday from 2pm to 4pm in the wellbeing centre.",
            AnnouncementKind::Info,
            None,
        ),
        (
            "Mindfulness workshop",
            "Join a guided mindfulness session this Thursday. No experience needed.",
            AnnouncementKind::Event,
            Some(7),
        ),
        (
            "Exam stress support",
            "Extra sessions are open during exam week. Book through your dashboard.",
            AnnouncementKind::Warning,
            Some(14),
        ),
        (
            "Crisis line",
            "If you need urgent help, contact the 24/7 crisis line listed on the support page.",
            AnnouncementKind::Urgent,
            None,
        ),
    ];

    for (title, content, kind, duration_days) in fixed {
        let created = store
            .create(NewAnnouncement {
                title: title.to_string(),
                content: content.to_string(),
                visible: true,
                kind: Some(kind),
                duration_days,
                target_role: None,
            })
            .await?;
        println!("  ✅ {} ({})", created.title, created.id);
    }

    println!("🎲 Creating {} generated announcements...", args.count);
    let kinds = [
        AnnouncementKind::Info,
        AnnouncementKind::Event,
        AnnouncementKind::Warning,
        AnnouncementKind::Urgent,
    ];
    for i in 0..args.count {
        let title: String = Sentence(3..7).fake();
        let content: String = Paragraph(2..4).fake();
        store
            .create(NewAnnouncement {
                title: title.trim_end_matches('.').to_string(),
                content,
                // Leave every third one hidden so the admin view has something to toggle.
                visible: i % 3 != 2,
                kind: Some(kinds[i % kinds.len()]),
                duration_days: None,
                target_role: if i % 2 == 0 { Some("student".to_string()) } else { None },
            })
            .await?;
    }

    println!("✨ Seeded {} announcements", store.snapshot().announcements.len());
    context.unmount();

    Ok(())
}
