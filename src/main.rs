use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use screenwell_lib::assessment;
use screenwell_lib::db::models::{AssessmentKind, NewUser};
use screenwell_lib::db::FrameInsert;
use screenwell_lib::{init_logging, App};

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "gif", "bmp"];

#[derive(Parser)]
#[command(name = "screenwell")]
#[command(about = "Screen-content wellness scoring and aggregation", long_about = None)]
struct Cli {
    /// Directory holding the database, settings and saved frames
    #[arg(long, global = true, default_value = "screenwell-data")]
    data_dir: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, database and default settings
    Init,
    /// Register a user
    AddUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        occupation: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Submit personality quiz answers (`--answer EXT1=4`, repeatable)
    Quiz {
        #[arg(long)]
        user: i64,
        #[arg(long = "answer", value_parser = parse_answer)]
        answers: Vec<(String, i64)>,
        /// JSON object of question id to answer
        #[arg(long)]
        answers_file: Option<PathBuf>,
        /// Clear the stored answers instead of submitting
        #[arg(long, conflicts_with_all = ["answers", "answers_file"])]
        retake: bool,
    },
    /// Open a recording session
    StartSession {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        name: Option<String>,
    },
    /// Analyse every image of a directory, in file name order, into a session
    Ingest {
        #[arg(long)]
        session: i64,
        #[arg(long)]
        frames: PathBuf,
        /// Transcript attached to every frame
        #[arg(long)]
        audio_transcript: Option<String>,
    },
    /// Close a session and compute its summary
    Complete {
        #[arg(long)]
        session: i64,
    },
    /// Print the user's dashboard as JSON
    Dashboard {
        #[arg(long)]
        user: i64,
        /// Also ask the oracle for written insights
        #[arg(long)]
        insights: bool,
        /// Per-app frame breakdown instead of the dashboard
        #[arg(long)]
        app: Option<String>,
    },
    /// Record a weekly or monthly check-in (`--answer W1=4`, repeatable)
    CheckIn {
        #[arg(long)]
        user: i64,
        #[arg(long, value_parser = parse_kind)]
        kind: AssessmentKind,
        #[arg(long = "answer", value_parser = parse_answer)]
        answers: Vec<(String, i64)>,
    },
    /// Print check-in history, trends and due flags
    History {
        #[arg(long)]
        user: i64,
    },
    /// Print the quiz, or a check-in questionnaire with `--kind`
    Questions {
        #[arg(long, value_parser = parse_kind)]
        kind: Option<AssessmentKind>,
    },
}

fn parse_answer(raw: &str) -> Result<(String, i64), String> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=VALUE, got `{raw}`"))?;
    let value = value
        .trim()
        .parse::<i64>()
        .map_err(|err| format!("invalid answer for {id}: {err}"))?;
    Ok((id.trim().to_string(), value))
}

fn parse_kind(raw: &str) -> Result<AssessmentKind, String> {
    AssessmentKind::parse(&raw.to_ascii_lowercase())
        .ok_or_else(|| format!("expected `weekly` or `monthly`, got `{raw}`"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_answers_file(path: &Path) -> Result<Vec<(String, i64)>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read answers from {}", path.display()))?;
    let answers: BTreeMap<String, i64> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON object of integer answers", path.display()))?;
    Ok(answers.into_iter().collect())
}

fn frame_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if path.is_file() && is_image {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

async fn ingest_directory(
    app: &App,
    session_id: i64,
    dir: &Path,
    audio_transcript: Option<String>,
) -> Result<()> {
    let files = frame_files(dir)?;
    if files.is_empty() {
        println!("No images found in {}.", dir.display());
        return Ok(());
    }

    let mut tickets = Vec::with_capacity(files.len());
    for (index, path) in files.iter().enumerate() {
        let image = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let frame_number = u32::try_from(index).context("too many frames")?;
        let mut upload = app.upload(session_id, frame_number, image);
        upload.audio_transcript = audio_transcript.clone();
        tickets.push((path, app.enqueue_frame(upload).await?));
    }

    let (mut stored, mut rejected, mut failed) = (0usize, 0usize, 0usize);
    for (path, ticket) in tickets {
        match ticket.outcome().await {
            Ok(FrameInsert::Inserted(frame)) => {
                stored += 1;
                println!(
                    "{}: {} / {} / {} ({})",
                    path.display(),
                    frame.app_detected,
                    frame.content_type.as_str(),
                    frame.wellness_impact.as_str(),
                    frame.source.as_str()
                );
            }
            Ok(outcome) => {
                rejected += 1;
                println!("{}: rejected ({outcome:?})", path.display());
            }
            Err(err) => {
                failed += 1;
                println!("{}: failed ({err:#})", path.display());
            }
        }
    }
    println!("Stored {stored} frames, rejected {rejected}, failed {failed}.");
    Ok(())
}

async fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Init => {
            app.settings().save()?;
            println!("Data directory ready at {}.", app.data_dir().display());
        }
        Commands::AddUser {
            email,
            name,
            age,
            gender,
            occupation,
            location,
        } => {
            let user = app
                .create_user(NewUser {
                    email,
                    name,
                    age,
                    gender,
                    occupation,
                    location,
                })
                .await?;
            print_json(&user)?;
        }
        Commands::Quiz {
            user,
            mut answers,
            answers_file,
            retake,
        } => {
            if retake {
                app.retake_quiz(user).await?;
                println!("Quiz answers cleared for user {user}.");
                return Ok(());
            }
            if let Some(path) = answers_file {
                answers.extend(read_answers_file(&path)?);
            }
            let profile = app.submit_quiz(user, answers).await?;
            print_json(&profile)?;
        }
        Commands::StartSession { user, name } => {
            let session = app.start_session(user, name).await?;
            print_json(&session)?;
        }
        Commands::Ingest {
            session,
            frames,
            audio_transcript,
        } => {
            ingest_directory(app, session, &frames, audio_transcript).await?;
        }
        Commands::Complete { session } => {
            let session = app.complete_session(session).await?;
            print_json(&session)?;
        }
        Commands::Dashboard {
            user,
            insights,
            app: app_name,
        } => {
            if let Some(app_name) = app_name {
                let detail = app
                    .app_detail(user, &app_name)
                    .await?
                    .ok_or_else(|| anyhow!("no frames recorded for {app_name}"))?;
                return print_json(&detail);
            }
            print_json(&app.dashboard(user).await?)?;
            if insights {
                print_json(&app.insights(user).await?)?;
            }
        }
        Commands::CheckIn {
            user,
            kind,
            answers,
        } => {
            let record = app.check_in(user, kind, answers).await?;
            print_json(&record)?;
        }
        Commands::History { user } => {
            print_json(&app.assessment_history(user).await?)?;
        }
        Commands::Questions { kind } => match kind {
            Some(kind) => print_json(assessment::questions(kind))?,
            None => print_json(&app.questions())?,
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let app = App::open(&cli.data_dir).await?;
    let result = run(&app, cli.command).await;
    app.shutdown().await?;
    result
}
