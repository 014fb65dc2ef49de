use clap::CommandFactory;
use clap::FromArgMatches;
use clap::Parser;
use client::OpenAiClassifier;
use config::Config;
use conversation::{Action, QuestionKind, Reply, Services, Session, State};
use error::{CompanionError, Result};
use log_store::LogStore;
use openai_api_rust::Auth;
use openai_api_rust::OpenAI;
use std::io::BufRead;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::exit;
use tables::ThreadRandom;
use tracing_subscriber::EnvFilter;
use types::MoodRecord;

mod client;
mod config;
mod conversation;
mod error;
mod log_store;
mod mood;
mod tables;
mod types;

static SPEAKER: &str = "companion";
const HISTORY_SIZE: usize = 10;

#[derive(Parser)]
#[command(version, about = "Spring wellness companion", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
    /// Directory holding config.json and the mood log
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Explicit config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Talk to the companion (default)
    Chat,
    /// Show the most recent mood entries
    Log {
        #[arg(long, short, default_value_t = HISTORY_SIZE)]
        limit: usize,
    },
    /// Write the whole mood log as CSV
    Export { path: PathBuf },
}

mod world {
    use std::path::PathBuf;

    use clap::Parser;

    #[derive(Parser)]
    #[command(version, about, long_about = None)]
    pub(crate) enum Command {
        /// Suggest a random spring activity
        Surprise,
        /// Start a new conversation
        Restart,
        /// Show the current step again
        Show,
        Log {
            #[clap(long, short, default_value_t = super::HISTORY_SIZE)]
            limit: usize,
        },
        Export {
            path: PathBuf,
        },
        Exit,
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) / 10;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(10 - filled),
        percent
    )
}

fn print_reply(reply: &Reply) {
    match reply {
        Reply::Ask { question, progress } => {
            println!("{} {}", SPEAKER, progress_bar(*progress));
            println!("{}: {}", SPEAKER, question.text);
            if let QuestionKind::Select(options) = question.kind {
                let options: Vec<String> = options
                    .iter()
                    .enumerate()
                    .map(|(i, option)| format!("{}) {}", i + 1, option))
                    .collect();
                println!("{}: {}", SPEAKER, options.join("  "));
            }
        }
        Reply::Warning(message) => println!("{}: ⚠️ {}", SPEAKER, message),
        Reply::Summary { answers, progress } => {
            println!("{} {}", SPEAKER, progress_bar(*progress));
            println!("{}: Here's what you shared:", SPEAKER);
            for (question, answer) in answers {
                println!("  - {} {}", question.text, answer);
            }
            println!("{}: Press enter to see your suggestions!", SPEAKER);
        }
        Reply::Results { outcome, notice } => {
            println!(
                "{}: Detected mood: {} ({:.2})",
                SPEAKER, outcome.mood, outcome.polarity
            );
            println!("🌼 Tip: {}", outcome.tip);
            println!("🌷 Personalized spring activity: {}", outcome.activity);
            println!(
                "🌱 Try this web activity: {} <{}>",
                outcome.web.label, outcome.web.url
            );
            println!("🌸 Spring quote: {}", outcome.quote);
            if let Some(notice) = notice {
                println!("{}: ⚠️ {}", SPEAKER, notice);
            }
            println!("{}: #surprise for a random idea, #restart to begin again", SPEAKER);
        }
        Reply::Surprise(activity) => println!("🌼 Try this: {}", activity),
        Reply::NotNow(message) => println!("{}: {}", SPEAKER, message),
    }
}

fn history_lines(records: &[MoodRecord], limit: usize) -> Vec<String> {
    if limit == 0 {
        return vec![format!("{}: No entries to show", SPEAKER)];
    }
    if records.is_empty() {
        return vec![format!("{}: No mood logs yet!", SPEAKER)];
    }
    let mut lines = vec!["🌱 Mood Log History".to_string()];
    lines.extend(records.iter().map(|record| {
        format!(
            "{}  {:<8} {:>5.2}  {}",
            record.timestamp, record.mood, record.polarity, record.text
        )
    }));
    lines
}

fn print_history(store: &LogStore, limit: usize) {
    match store.recent(limit) {
        Ok(records) => {
            for line in history_lines(&records, limit) {
                println!("{}", line);
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "mood log unreadable");
            println!("{}: ⚠️ {}", SPEAKER, err);
        }
    }
}

/// One line without its line ending, or `None` at end of input.
/// Bytes that are not UTF-8 are replaced rather than rejected.
fn read_input(reader: &mut impl BufRead) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).trim().to_owned()))
}

fn export(store: &LogStore, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let count = store.export_csv(file)?;
    println!("{}: {} entries exported to {:?}", SPEAKER, count, path);
    Ok(())
}

fn exec_chat(config: &Config, store: &LogStore) -> Result<()> {
    let user_name = whoami::username();
    let auth = Auth::from_env()
        .map_err(|e| CompanionError::Config(format!("OPENAI_API_KEY is not usable: {:?}", e)))?;
    let openai = OpenAI::new(auth, &config.api_base);
    let classifier = OpenAiClassifier::new(openai, config.model.clone(), config.max_tokens);
    let mut rng = ThreadRandom;

    if let Err(err) = ctrlc::set_handler(move || {
        println!("\n{}: Exiting.", SPEAKER);
        exit(0);
    }) {
        tracing::warn!(error = %err, "could not install Ctrl-C handler");
    }

    println!(
        "{}: Hi! I'm your spring wellness agent. Let's chat and I'll suggest something fun and uplifting! 🌱🌷",
        SPEAKER
    );
    match store.read_all() {
        Ok(records) if !records.is_empty() => println!(
            "{}: {} moods logged so far, #log shows the latest",
            SPEAKER,
            records.len()
        ),
        Ok(_) => {}
        Err(err) => {
            tracing::warn!(error = %err, "mood log unreadable");
            println!("{}: ⚠️ {}", SPEAKER, err);
        }
    }

    let mut session = Session::default();
    let mut services = Services {
        classifier: &classifier,
        store,
        rng: &mut rng,
    };
    print_reply(&session.apply(Action::Show, &mut services)?);

    loop {
        print!("{}: ", user_name);
        std::io::stdout().flush()?;

        let input = match read_input(&mut std::io::stdin().lock()) {
            Ok(Some(input)) => input,
            Ok(None) => {
                println!();
                break;
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not read input");
                println!("{}: ⚠️ could not read that line: {}", SPEAKER, err);
                continue;
            }
        };
        let input = input.as_str();

        let action = if let Some(command) = input.strip_prefix('#') {
            let mut sw = vec!["#".to_string()];
            match shellwords::split(command) {
                Ok(mut words) => sw.append(&mut words),
                Err(_) => {
                    println!("{}: mismatched quotes in command", SPEAKER);
                    continue;
                }
            }

            match <world::Command as CommandFactory>::command().try_get_matches_from(sw) {
                Ok(mut matches) => match world::Command::from_arg_matches_mut(&mut matches) {
                    Ok(world::Command::Surprise) => Action::Surprise,
                    Ok(world::Command::Restart) => Action::Restart,
                    Ok(world::Command::Show) => Action::Show,
                    Ok(world::Command::Log { limit }) => {
                        print_history(store, limit);
                        continue;
                    }
                    Ok(world::Command::Export { path }) => {
                        if let Err(err) = export(store, &path) {
                            println!("{}: {}", SPEAKER, err);
                        }
                        continue;
                    }
                    Ok(world::Command::Exit) => break,
                    Err(err) => {
                        println!("{}: {}", SPEAKER, err);
                        continue;
                    }
                },
                Err(err) => {
                    println!("{}: {}", SPEAKER, err);
                    continue;
                }
            }
        } else {
            match session.state() {
                State::Asking(_) => Action::Answer(input.to_owned()),
                State::Summary => Action::Proceed,
                State::Results(_) => Action::Show,
            }
        };

        match session.apply(action, &mut services) {
            Ok(reply) => print_reply(&reply),
            Err(err) => {
                tracing::warn!(error = %err, "conversation step failed");
                println!("{}: ⚠️ {}", SPEAKER, err);
            }
        }
    }

    println!("{}: Exiting.", SPEAKER);
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref(), args.data_dir)?;
    let store = LogStore::new(config.log_path());
    tracing::debug!(log = ?store.path(), "mood log location");

    match args.command.unwrap_or(Command::Chat) {
        Command::Chat => exec_chat(&config, &store),
        Command::Log { limit } => {
            print_history(&store, limit);
            Ok(())
        }
        Command::Export { path } => export(&store, &path),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("spring_mood_companion=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Args::parse()) {
        eprintln!("{}: {}", SPEAKER, err);
        exit(1);
    }
}
