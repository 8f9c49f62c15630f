mod input;
mod render;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use assess_core::model::{Question, TestType, catalog};
use assess_core::session::Transition;
use services::{
    AttemptRunner, AttemptService, AttemptSnapshot, BackendConfig, Clock, HttpBackend,
    RunnerHandle, RunnerUpdate, session_settings_from_env,
};
use storage::raw::RawQuestion;
use storage::repository::{InMemoryRepository, QuestionSource, Storage, SubmissionSink};
use storage::seed::seed_catalog;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

use crate::input::{Input, parse_line};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingTestType,
    UnknownTestType { raw: String },
    InvalidAttemptSeconds { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingTestType => write!(f, "--test-type is required"),
            ArgsError::UnknownTestType { raw } => write!(f, "unknown --test-type value: {raw}"),
            ArgsError::InvalidAttemptSeconds { raw } => {
                write!(f, "invalid --attempt-seconds value: {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- run --test-type <slug> [--questions <file.json>] [--attempt-seconds <n>]"
    );
    eprintln!("  cargo run -p app -- catalog");
    eprintln!();
    eprintln!("Questions come from --questions, else the backend at ASSESS_API_BASE_URL,");
    eprintln!("else the built-in sample banks.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ASSESS_TEST_TYPE, ASSESS_API_BASE_URL, ASSESS_API_TOKEN,");
    eprintln!("  ASSESS_ATTEMPT_SECONDS, ASSESS_RECALL_SECONDS, RUST_LOG");
}

fn print_commands() {
    println!("select <n> | text <words> | slot <pair-word> <word>");
    println!("next | ready | back | Enter | ArrowRight | ArrowLeft | resubmit | quit");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Catalog,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "run" => Some(Self::Run),
            "catalog" => Some(Self::Catalog),
            _ => None,
        }
    }
}

struct RunArgs {
    test_type: TestType,
    questions: Option<PathBuf>,
    attempt_seconds: Option<u32>,
}

impl RunArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut slug = std::env::var("ASSESS_TEST_TYPE").ok();
        let mut questions = None;
        let mut attempt_seconds = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--test-type" => slug = Some(require_value(args, "--test-type")?),
                "--questions" => {
                    questions = Some(PathBuf::from(require_value(args, "--questions")?));
                }
                "--attempt-seconds" => {
                    let value = require_value(args, "--attempt-seconds")?;
                    let parsed: u32 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidAttemptSeconds { raw: value.clone() })?;
                    attempt_seconds = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let slug = slug.ok_or(ArgsError::MissingTestType)?;
        let test_type =
            TestType::lookup(slug.trim()).ok_or(ArgsError::UnknownTestType { raw: slug })?;
        Ok(Self {
            test_type,
            questions,
            attempt_seconds,
        })
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_storage(args: &RunArgs) -> Result<Storage, Box<dyn std::error::Error>> {
    if let Some(path) = &args.questions {
        let text = std::fs::read_to_string(path)?;
        let raws: Vec<RawQuestion> = serde_json::from_str(&text)?;
        let repo = InMemoryRepository::new();
        repo.insert_questions(args.test_type.id().clone(), raws)?;
        return Ok(Storage::from_repository(repo));
    }

    if let Some(config) = BackendConfig::from_env()? {
        tracing::info!(base_url = %config.base_url, "using remote backend");
        let backend = Arc::new(HttpBackend::new(config)?);
        let questions: Arc<dyn QuestionSource> = backend.clone();
        let submissions: Arc<dyn SubmissionSink> = backend;
        return Ok(Storage {
            questions,
            submissions,
        });
    }

    let repo = InMemoryRepository::new();
    seed_catalog(&repo)?;
    Ok(Storage::from_repository(repo))
}

fn show(questions: &[Question], snapshot: &AttemptSnapshot) {
    if let Some(question) = questions.get(snapshot.index) {
        println!("{}", render::question(question, snapshot));
    }
}

/// Print one runner update. Returns `true` once the attempt has been delivered.
fn report(questions: &[Question], update: RunnerUpdate) -> bool {
    match update {
        RunnerUpdate::Changed {
            transition,
            snapshot,
        } => match transition {
            Transition::Ticked | Transition::Idle => {}
            Transition::Answered { .. } => println!("{}", render::controls(&snapshot)),
            Transition::AwaitingSubmission { reason } => {
                println!("attempt over ({reason:?}), submitting...");
            }
            Transition::ForceAdvanced { .. } => {
                println!("recall time is up, moving on");
                show(questions, &snapshot);
            }
            Transition::Moved { .. } | Transition::EnteredRecall { .. } => {
                show(questions, &snapshot);
            }
        },
        RunnerUpdate::Refused(err) => eprintln!("not allowed: {err}"),
        RunnerUpdate::SubmitFailed(err) => {
            eprintln!("submission failed: {err}; type `resubmit` to retry");
        }
        RunnerUpdate::Submitted(receipt) => {
            println!(
                "submitted: {} answers accepted{}",
                receipt.accepted,
                receipt
                    .reference
                    .map(|r| format!(" (ref {r})"))
                    .unwrap_or_default()
            );
            return true;
        }
    }
    false
}

async fn drive(
    questions: &[Question],
    handle: &RunnerHandle,
    updates: &mut UnboundedReceiver<RunnerUpdate>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => match parse_line(&line) {
                    Ok(Input::Command(command)) => handle.send(command).await?,
                    Ok(Input::Help) => print_commands(),
                    Ok(Input::Quit) => return Ok(false),
                    Err(err) => eprintln!("{err}"),
                },
                // Input closed: the attempt runs out its clock and is delivered.
                None => return Ok(true),
            },
            update = updates.recv() => match update {
                Some(update) => {
                    if report(questions, update) {
                        return Ok(true);
                    }
                }
                None => return Ok(true),
            },
        }
    }
}

async fn run_attempt(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = session_settings_from_env()?;
    if let Some(seconds) = args.attempt_seconds {
        settings = settings.with_attempt_seconds(seconds)?;
    }
    let storage = open_storage(&args)?;
    let service = AttemptService::from_storage(Clock::default_clock(), &storage)
        .with_settings(settings);

    let session = service.start_attempt(args.test_type.clone()).await?;
    let questions = session.questions().to_vec();
    println!(
        "{}: {} questions, {}s",
        args.test_type.name(),
        questions.len(),
        settings.attempt_seconds()
    );
    show(&questions, &AttemptSnapshot::of(&session));

    let (handle, mut updates) = AttemptRunner::new(service, session).spawn();
    if !drive(&questions, &handle, &mut updates).await? {
        handle.abandon().await;
        println!("attempt abandoned");
        return Ok(());
    }

    let session = handle.finish().await?;
    while let Ok(update) = updates.try_recv() {
        report(&questions, update);
    }
    if let Some(payload) = session.payload() {
        println!("{}", serde_json::to_string_pretty(payload)?);
    }
    Ok(())
}

fn print_catalog() {
    for test_type in catalog() {
        println!(
            "{:<18} {:<18} {}",
            test_type.id().as_str(),
            test_type.name(),
            test_type.mode()
        );
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    match cmd {
        Command::Catalog => {
            print_catalog();
            Ok(())
        }
        Command::Run => {
            let args = RunArgs::parse(&mut argv).map_err(|e| {
                eprintln!("{e}");
                print_usage();
                e
            })?;
            run_attempt(args).await
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
