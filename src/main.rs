use anyhow::{anyhow, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sanctum::{
    config::Settings,
    domain::{AnnouncementKind, AnnouncementPatch, NewAnnouncement, QuestionEdit, QuestionType, Role},
    service::{AppContext, FormBuilder},
    views::{render_form, AnnouncementBoard, AnnouncementComposer, Notice},
};

#[derive(Parser)]
#[command(name = "sanctum", about = "Announcements for the wellness platform")]
struct Cli {
    /// Act as this role instead of the configured one
    #[arg(long, global = true)]
    role: Option<Role>,

    /// Backend base URL, e.g. http://localhost:5000/api
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every announcement visible to the current role
    List,
    /// Show the newest visible announcements
    Recent {
        #[arg(long)]
        count: Option<usize>,
    },
    /// Open an announcement (records a view)
    Show { id: String },
    /// Publish a new announcement (admin)
    Publish {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Publish without showing it to students and counsellors
        #[arg(long)]
        hidden: bool,
        #[arg(long, value_parser = parse_kind)]
        kind: Option<AnnouncementKind>,
        #[arg(long)]
        duration_days: Option<u32>,
        #[arg(long)]
        target_role: Option<String>,
    },
    /// Change selected fields of an announcement (admin)
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        visible: Option<bool>,
        #[arg(long, value_parser = parse_kind)]
        kind: Option<AnnouncementKind>,
        #[arg(long)]
        duration_days: Option<u32>,
        #[arg(long)]
        target_role: Option<String>,
    },
    /// Flip an announcement between visible and hidden (admin)
    Toggle { id: String },
    /// Delete an announcement (admin)
    Delete { id: String },
    /// Build a form locally and print its preview (admin)
    Form {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// TYPE:TITLE[:OPTION|OPTION...]; prefix TYPE with `!` to make it required
        #[arg(long = "question", required = true)]
        questions: Vec<String>,
    },
}

fn parse_kind(s: &str) -> Result<AnnouncementKind, String> {
    AnnouncementKind::from_str(s)
        .ok_or_else(|| format!("unknown kind '{}' (expected info, event, warning or urgent)", s))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so rendered views stay clean on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sanctum=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });
    if let Some(role) = cli.role {
        settings.session.role = role;
    }
    if let Some(base_url) = cli.base_url {
        settings.api.base_url = base_url;
    }

    let mut context = AppContext::mount(settings)?;
    let result = run(cli.command, &mut context).await;
    context.unmount();

    result
}

async fn run(command: Command, context: &mut AppContext) -> anyhow::Result<()> {
    let store = context.announcements.clone();

    match command {
        Command::List => {
            let board = AnnouncementBoard::new(store);
            board.refresh().await;
            print!("{}", board.render()?);
        }
        Command::Recent { count } => {
            let board = AnnouncementBoard::new(store);
            board.refresh().await;
            let count = count.unwrap_or(context.settings.announcements.recent_count);
            print!("{}", board.render_recent(count)?);
        }
        Command::Show { id } => {
            let mut board = AnnouncementBoard::new(store);
            if let Some(notice) = board.refresh().await {
                return report(notice);
            }
            let opened = board.open(&id).await?;
            print!("{}", opened.detail);
            if let Some(notice) = opened.notice {
                eprintln!("{}", notice);
            }
        }
        Command::Publish { title, content, hidden, kind, duration_days, target_role } => {
            let composer = AnnouncementComposer::new(store);
            let input = NewAnnouncement {
                title,
                content,
                visible: !hidden,
                kind,
                duration_days,
                target_role,
            };
            return report(composer.publish(input).await);
        }
        Command::Edit { id, title, content, visible, kind, duration_days, target_role } => {
            let composer = AnnouncementComposer::new(store);
            let patch = AnnouncementPatch {
                title,
                content,
                visible,
                kind,
                duration_days,
                target_role,
            };
            return report(composer.edit(&id, patch).await);
        }
        Command::Toggle { id } => {
            let board = AnnouncementBoard::new(store.clone());
            if let Some(notice) = board.refresh().await {
                return report(notice);
            }
            let composer = AnnouncementComposer::new(store);
            return report(composer.toggle_visibility(&id).await);
        }
        Command::Delete { id } => {
            let composer = AnnouncementComposer::new(store);
            return report(composer.remove(&id).await);
        }
        Command::Form { title, description, questions } => {
            if !context.role.is_admin() {
                bail!("Only admins can build forms");
            }
            let mut builder = FormBuilder::new(title);
            if let Some(description) = description {
                builder.set_description(description);
            }
            for raw in &questions {
                add_question_from_arg(&mut builder, raw)?;
            }
            let form = context.forms.publish(&builder)?;
            print!("{}", render_form(&form)?);
        }
    }

    Ok(())
}

fn add_question_from_arg(builder: &mut FormBuilder, raw: &str) -> anyhow::Result<()> {
    let mut parts = raw.splitn(3, ':');
    let raw_type = parts.next().unwrap_or_default();
    let title = parts
        .next()
        .ok_or_else(|| anyhow!("question '{}' is missing a title", raw))?;
    let options = parts.next();

    let (required, raw_type) = match raw_type.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, raw_type),
    };
    let question_type = QuestionType::from_str(raw_type)
        .ok_or_else(|| anyhow!("unknown question type '{}'", raw_type))?;

    let id = builder.add_question(question_type);
    builder.update_question(id, QuestionEdit {
        title: Some(title.to_string()),
        required: Some(required),
        ..Default::default()
    })?;

    if let Some(options) = options {
        for (index, option) in options.split('|').enumerate() {
            if index == 0 {
                builder.update_option(id, 0, option)?;
            } else {
                builder.add_option(id, option)?;
            }
        }
    }

    Ok(())
}

fn report(notice: Notice) -> anyhow::Result<()> {
    if notice.is_error() {
        Err(anyhow!("{}", notice))
    } else {
        println!("{}", notice);
        Ok(())
    }
}
