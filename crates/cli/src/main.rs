mod config;
mod error;

use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use guidance::{Advisor, CareerPath, ChatContext, spawn_career_generation};
use llm::{Credentials, ImageAttachment, ProviderSelector};
use serde_json::Value;
use storage::{ChatRole, GenerationStatus, ProfileStore};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use config::Config;
use error::{Error, Result};

const CONFIG_FILE: &str = "waypoint.toml";
const DEFAULT_USER: &str = "local";
const DEFAULT_FOCUS: &str = "General career guidance";
const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Career guidance from your own profile", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Database file (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Profile to operate on
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store or show the onboarding profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Show career paths, generating them if needed
    Careers {
        /// Generate new paths even if some are saved
        #[arg(long)]
        regenerate: bool,
        /// Generate on a background task and poll its status
        #[arg(long)]
        background: bool,
    },
    /// Show the career generation status
    Status,
    /// Suggest answers to an onboarding question
    Suggest {
        question: String,
        /// Answers given so far
        #[arg(short, long, default_value = "")]
        context: String,
    },
    /// Preview life ten years into a career
    Story {
        /// Career title
        career: String,
    },
    /// Draw a storyboard sketch of a scene
    Sketch {
        description: String,
        /// Write the image here instead of printing a data URL
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Analyze an academic record against a career
    Analyze {
        /// Transcript or curriculum (PDF or image)
        file: PathBuf,
        /// Target career title
        #[arg(short, long)]
        career: String,
        /// MIME type, guessed from the extension when omitted
        #[arg(long)]
        mime: Option<String>,
    },
    /// Start an interactive chat session
    Chat {
        /// What the conversation is about
        #[arg(short, long, default_value = DEFAULT_FOCUS)]
        focus: String,
    },
    /// Manage journal reflections
    Reflect {
        #[command(subcommand)]
        action: ReflectAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Store a profile from a JSON file ('-' reads stdin). Clears saved careers.
    Set { file: PathBuf },
    /// Print the stored profile
    Show,
}

#[derive(Subcommand)]
enum ReflectAction {
    /// Add a journal entry
    Add { content: String },
    /// List journal entries, newest first
    List,
    /// Delete a journal entry
    Rm { id: String },
}

/// Shared state for one invocation.
struct App {
    store: Arc<ProfileStore>,
    advisor: Arc<Advisor<ProviderSelector>>,
    user: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_logging();

    if let Err(e) = run().await {
        tracing::error!(error = ?e, "command failed");
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let app = App::open(&cli)?;

    match cli.command {
        Commands::Profile { action } => match action {
            ProfileAction::Set { file } => cmd_profile_set(&app, &file),
            ProfileAction::Show => cmd_profile_show(&app),
        },
        Commands::Careers {
            regenerate,
            background,
        } => {
            if background {
                cmd_careers_background(&app).await
            } else {
                cmd_careers(&app, regenerate).await
            }
        }
        Commands::Status => cmd_status(&app),
        Commands::Suggest { question, context } => {
            for answer in app.advisor.suggest_answers(&question, &context).await {
                println!("- {answer}");
            }
            Ok(())
        }
        Commands::Story { career } => cmd_story(&app, &career).await,
        Commands::Sketch { description, out } => cmd_sketch(&app, &description, out).await,
        Commands::Analyze { file, career, mime } => {
            cmd_analyze(&app, &file, &career, mime.as_deref()).await
        }
        Commands::Chat { focus } => cmd_chat(&app, &focus).await,
        Commands::Reflect { action } => match action {
            ReflectAction::Add { content } => {
                let reflection = app.store.add_reflection(&app.user, &content)?;
                println!("Saved reflection {}", reflection.id);
                Ok(())
            }
            ReflectAction::List => cmd_reflect_list(&app),
            ReflectAction::Rm { id } => {
                let uuid = Uuid::parse_str(&id).map_err(|_| Error::InvalidId(id.clone()))?;
                if !app.store.delete_reflection(&app.user, uuid)? {
                    return Err(Error::ReflectionNotFound(id));
                }
                println!("Deleted reflection {id}");
                Ok(())
            }
        },
    }
}

impl App {
    fn open(cli: &Cli) -> Result<Self> {
        let config = Config::load_or_default(&cli.config)?;

        let db_path = match cli.db.clone().or_else(|| config.storage.path.clone()) {
            Some(path) => path,
            None => {
                let data_dir = dirs_data_dir().unwrap_or_else(|| ".waypoint".into());
                std::fs::create_dir_all(&data_dir)?;
                data_dir.join("waypoint.db")
            }
        };
        tracing::debug!(path = %db_path.display(), "opening store");

        let user = cli
            .user
            .clone()
            .or_else(|| config.storage.user.clone())
            .unwrap_or_else(|| DEFAULT_USER.to_string());

        Ok(Self {
            store: Arc::new(ProfileStore::open(&db_path)?),
            advisor: Arc::new(Advisor::new(config.selector(Credentials::from_env()))),
            user,
        })
    }

    fn profile(&self) -> Result<Value> {
        self.store
            .get_profile(&self.user)?
            .map(|record| record.data)
            .ok_or(Error::NoProfile)
    }
}

fn cmd_profile_set(app: &App, file: &Path) -> Result<()> {
    let content = if file == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)?
    };

    let invalid = |reason: String| Error::InvalidProfile {
        path: file.to_path_buf(),
        reason,
    };
    let data: Value = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
    if !data.is_object() {
        return Err(invalid("expected a JSON object".into()));
    }

    app.store.upsert_profile(&app.user, &data)?;
    println!("Profile saved for {}. Saved careers were cleared.", app.user);
    Ok(())
}

fn cmd_profile_show(app: &App) -> Result<()> {
    let record = app.store.get_profile(&app.user)?.ok_or(Error::NoProfile)?;
    let updated = Local
        .from_utc_datetime(&record.updated_at.naive_utc())
        .format("%Y-%m-%d %H:%M");

    println!("User:    {}", record.user_id);
    println!("Updated: {updated}");
    println!("Status:  {}", record.status);
    println!(
        "Careers: {}",
        record.careers().map_or(0, |careers| careers.len())
    );
    println!(
        "\n{}",
        serde_json::to_string_pretty(&record.data).unwrap_or_default()
    );
    Ok(())
}

async fn cmd_careers(app: &App, regenerate: bool) -> Result<()> {
    if regenerate {
        println!("Generating career paths...");
    }
    let careers = app
        .advisor
        .careers_for(app.store.as_ref(), &app.user, regenerate)
        .await?;
    print_careers(&careers);
    Ok(())
}

async fn cmd_careers_background(app: &App) -> Result<()> {
    let profile = app.profile()?;
    let job = spawn_career_generation(
        Arc::clone(&app.advisor),
        Arc::clone(&app.store),
        app.user.clone(),
        profile,
    )?;

    print!("Generating career paths in the background");
    io::stdout().flush()?;
    let status = await_generation(job, &app.store, &app.user, POLL_INTERVAL).await?;
    println!(" {status}");

    if status == GenerationStatus::Completed {
        let careers = app
            .advisor
            .careers_for(app.store.as_ref(), &app.user, false)
            .await?;
        print_careers(&careers);
    }
    Ok(())
}

/// Wait until the job finishes or the stored status turns terminal.
///
/// A task that died without recording its outcome is marked failed.
async fn await_generation(
    mut job: JoinHandle<GenerationStatus>,
    store: &ProfileStore,
    user: &str,
    interval: Duration,
) -> Result<GenerationStatus> {
    loop {
        tokio::select! {
            joined = &mut job => {
                let status = match joined {
                    Ok(status) => status,
                    Err(e) => {
                        tracing::error!(user, error = %e, "career generation task aborted");
                        GenerationStatus::Failed
                    }
                };
                if store.status(user)? != Some(status) {
                    store.set_status(user, status)?;
                }
                return Ok(status);
            }
            _ = tokio::time::sleep(interval) => {
                let status = store.status(user)?.unwrap_or_default();
                if status.is_terminal() {
                    return Ok(status);
                }
                print!(".");
                io::stdout().flush()?;
            }
        }
    }
}

fn cmd_status(app: &App) -> Result<()> {
    let status = app.store.status(&app.user)?.ok_or(Error::NoProfile)?;
    println!("{status}");
    Ok(())
}

async fn cmd_story(app: &App, career: &str) -> Result<()> {
    let scenes = app.advisor.life_story(&app.profile()?, career).await;
    if scenes.is_empty() {
        println!("No story could be written right now.");
        return Ok(());
    }
    for (i, scene) in scenes.iter().enumerate() {
        println!("Chapter {}: {}\n", i + 1, scene.title);
        println!("{}\n", scene.text);
        println!("  [sketch: {}]\n", scene.image_prompt);
    }
    Ok(())
}

async fn cmd_sketch(app: &App, description: &str, out: Option<PathBuf>) -> Result<()> {
    let Some(url) = app.advisor.sketch_scene(description).await else {
        println!("No sketch could be drawn right now.");
        return Ok(());
    };

    match out {
        Some(path) => {
            let image = ImageAttachment::from_data_url(&url, "image/png");
            let bytes = image.decode().map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidData, format!("bad image payload: {e}"))
            })?;
            std::fs::write(&path, bytes)?;
            println!("Saved {} sketch to {}", image.mime_type, path.display());
        }
        None => println!("{url}"),
    }
    Ok(())
}

async fn cmd_analyze(app: &App, file: &Path, career: &str, mime: Option<&str>) -> Result<()> {
    let bytes = std::fs::read(file)?;
    let mime = mime.unwrap_or_else(|| guess_mime(file));
    let record = ImageAttachment::from_bytes(&bytes, mime).to_data_url();

    let Some(analysis) = app
        .advisor
        .analyze_record(&app.profile()?, career, &record, mime)
        .await
    else {
        println!("The record could not be analyzed right now.");
        return Ok(());
    };

    println!("Key courses:");
    for course in &analysis.key_courses {
        println!("  {} ({:.0}%): {}", course.name, course.relevance, course.why);
    }
    println!("\nMaster's programs:");
    for program in &analysis.master_programs {
        println!("  {}: {}", program.program, program.description);
        if !program.universities.is_empty() {
            println!("    at {}", program.universities.join(", "));
        }
    }
    println!("\nAcademic insight:\n  {}", analysis.gpa_insight);
    Ok(())
}

async fn cmd_chat(app: &App, focus: &str) -> Result<()> {
    let profile = app
        .store
        .get_profile(&app.user)?
        .map_or_else(|| Value::Object(Default::default()), |record| record.data);
    let session = app.store.create_chat_session(&app.user, "New Chat")?;

    println!("waypoint v{}", env!("CARGO_PKG_VERSION"));
    println!("Session ID: {}", session.id);
    println!("Focus: {focus}");
    println!("Type 'quit' or Ctrl+D to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }

        app.store.add_chat_message(session.id, ChatRole::User, input)?;
        let context = ChatContext::new(profile.clone(), focus)
            .with_reflections(app.store.list_reflections(&app.user)?);
        let answer = app.advisor.chat(&context, input).await;
        app.store.add_chat_message(session.id, ChatRole::Model, &answer)?;

        println!("\n{answer}\n");
    }

    let count = app.store.load_chat_messages(session.id)?.len();
    println!("\nSession ended ({count} messages saved).");
    Ok(())
}

fn cmd_reflect_list(app: &App) -> Result<()> {
    let reflections = app.store.list_reflections(&app.user)?;
    if reflections.is_empty() {
        println!("No reflections yet.");
        return Ok(());
    }

    println!("{:<36}  {:<16}  ENTRY", "ID", "WRITTEN");
    println!("{}", "-".repeat(80));
    for reflection in reflections {
        let written = Local
            .from_utc_datetime(&reflection.created_at.naive_utc())
            .format("%Y-%m-%d %H:%M");
        println!("{:<36}  {written:<16}  {}", reflection.id, reflection.content);
    }
    Ok(())
}

fn print_careers(careers: &[CareerPath]) {
    if careers.is_empty() {
        println!("No career paths could be generated right now.");
        return;
    }
    for career in careers {
        println!(
            "{} ({:.0}% fit)  [{}]",
            career.title,
            career.confidence * 100.0,
            career.id
        );
        if !career.reason.is_empty() {
            println!("  {}", career.reason);
        }
        let outlook = &career.outlook;
        println!(
            "  Salary: {} / {} / {}   Demand: {}   Stability: {:.0}   Growth: {:.0}",
            outlook.entry_salary,
            outlook.mid_salary,
            outlook.senior_salary,
            outlook.demand,
            outlook.stability,
            outlook.growth
        );
        for milestone in &career.timeline {
            println!("    age {:>2.0}: {}", milestone.age, milestone.label);
        }
        println!();
    }
}

fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/pdf",
    }
}

fn dirs_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| PathBuf::from(h).join("Library/Application Support/waypoint"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))
            .map(|p| p.join("waypoint"))
    }
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|h| PathBuf::from(h).join("waypoint"))
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}
