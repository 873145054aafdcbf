use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use quiz_core::TRANSITION_DELAY;
use quiz_core::model::{CategoryId, QuestionBank};
use services::{QuizService, QuizSettings, SingleQuizService};
use storage::{KeyValueStore, SqliteStore};
use tokio::io::BufReader;

mod terminal;

/// Bank used when no `--bank` file is given.
const SAMPLE_BANK: &str = include_str!("../data/sample_bank.json");

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidCategory { raw: String },
    InvalidTransitionMs { raw: String },
    MissingCategory,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidCategory { raw } => write!(f, "invalid --category value: {raw:?}"),
            ArgsError::InvalidTransitionMs { raw } => {
                write!(f, "invalid --transition-ms value: {raw}")
            }
            ArgsError::MissingCategory => write!(f, "solo requires --category <id>"),
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
    eprintln!("  cargo run -p app -- play [--db <sqlite_url>] [--bank <file.json>] [-v|-q]");
    eprintln!("  cargo run -p app -- solo --category <id> [--db <sqlite_url>] [--bank <file.json>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <url>             SQLite database for saved progress (default quiz.sqlite3)");
    eprintln!("  --bank <path>          question bank JSON (default: bundled sample bank)");
    eprintln!("  --transition-ms <ms>   screen transition delay (default 300)");
    eprintln!("  -v, --verbose          debug logging");
    eprintln!("  -q, --quiet            errors only");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_BANK_PATH, QUIZ_TRANSITION_MS, QUIZ_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Solo,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "solo" => Some(Self::Solo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    db_url: String,
    bank_path: Option<PathBuf>,
    category: Option<CategoryId>,
    transition_delay: Duration,
    verbose: bool,
    quiet: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            db_url: normalize_sqlite_url("quiz.sqlite3".into()),
            bank_path: None,
            category: None,
            transition_delay: TRANSITION_DELAY,
            verbose: false,
            quiet: false,
        }
    }
}

impl Args {
    fn from_env() -> Self {
        let mut args = Self::default();
        if let Ok(url) = std::env::var("QUIZ_DB_URL") {
            args.db_url = normalize_sqlite_url(url);
        }
        if let Ok(path) = std::env::var("QUIZ_BANK_PATH") {
            args.bank_path = Some(PathBuf::from(path));
        }
        if let Some(ms) = std::env::var("QUIZ_TRANSITION_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
        {
            args.transition_delay = Duration::from_millis(ms);
        }
        args
    }

    fn apply_flags(
        mut self,
        command: Command,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    self.db_url = normalize_sqlite_url(value);
                }
                "--bank" => {
                    self.bank_path = Some(PathBuf::from(require_value(args, "--bank")?));
                }
                "--category" if command == Command::Solo => {
                    let value = require_value(args, "--category")?;
                    let id = value
                        .parse::<CategoryId>()
                        .map_err(|_| ArgsError::InvalidCategory { raw: value.clone() })?;
                    self.category = Some(id);
                }
                "--transition-ms" => {
                    let value = require_value(args, "--transition-ms")?;
                    let ms: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidTransitionMs { raw: value.clone() })?;
                    self.transition_delay = Duration::from_millis(ms);
                }
                "--verbose" | "-v" => self.verbose = true,
                "--quiet" | "-q" => self.quiet = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if command == Command::Solo && self.category.is_none() {
            return Err(ArgsError::MissingCategory);
        }
        Ok(self)
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("QUIZ_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Logs go to stderr so they never interleave with the quiz on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| format!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

async fn load_question_bank(path: Option<&Path>) -> Result<QuestionBank, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(services::load_bank(path).await?),
        None => Ok(QuestionBank::from_json(SAMPLE_BANK)?),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means the multi-category quiz.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with('-') => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with('-') {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::from_env().apply_flags(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing(parsed.quiet, parsed.verbose)?;

    let bank = load_question_bank(parsed.bank_path.as_deref()).await?;

    // Open + migrate SQLite at startup so services only see the store trait.
    prepare_sqlite_file(&parsed.db_url)?;
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open(&parsed.db_url).await?);
    tracing::debug!(db = %parsed.db_url, "store opened");

    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();

    match cmd {
        Command::Play => {
            let settings =
                QuizSettings::multi_category().with_transition_delay(parsed.transition_delay);
            let mut service = QuizService::load(Arc::new(bank), store, settings).await;
            terminal::play(&mut service, input, &mut output).await?;
        }
        Command::Solo => {
            let id = parsed.category.ok_or(ArgsError::MissingCategory)?;
            let category = services::single_category(&bank, &id)?;
            let settings =
                QuizSettings::single_category_for(&id).with_transition_delay(parsed.transition_delay);
            let mut service = SingleQuizService::load(category, store, settings).await;
            terminal::solo(&mut service, input, &mut output).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(command: Command, args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|a| (*a).to_owned());
        Args::default().apply_flags(command, &mut iter)
    }

    #[test]
    fn sample_bank_is_valid() {
        let bank = QuestionBank::from_json(SAMPLE_BANK).unwrap();
        assert_eq!(bank.categories().len(), 3);
    }

    #[test]
    fn play_accepts_common_flags() {
        let args = parse(
            Command::Play,
            &["--db", "sqlite://tmp/q.db", "--transition-ms", "0", "-v"],
        )
        .unwrap();
        assert_eq!(args.db_url, "sqlite://tmp/q.db");
        assert_eq!(args.transition_delay, Duration::ZERO);
        assert!(args.verbose);
        assert_eq!(args.category, None);
    }

    #[test]
    fn solo_requires_a_category() {
        assert!(matches!(
            parse(Command::Solo, &[]),
            Err(ArgsError::MissingCategory)
        ));
        let args = parse(Command::Solo, &["--category", "sql"]).unwrap();
        assert_eq!(args.category.unwrap().as_str(), "sql");
    }

    #[test]
    fn category_flag_is_solo_only() {
        assert!(matches!(
            parse(Command::Play, &["--category", "sql"]),
            Err(ArgsError::UnknownArg(arg)) if arg == "--category"
        ));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            parse(Command::Play, &["--transition-ms", "soon"]),
            Err(ArgsError::InvalidTransitionMs { .. })
        ));
        assert!(matches!(
            parse(Command::Play, &["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
    }

    #[test]
    fn normalizes_relative_sqlite_paths() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(normalize_sqlite_url("sqlite:///abs/q.db".into()), "sqlite:///abs/q.db");
        assert_eq!(normalize_sqlite_url("sqlite:/abs/q.db".into()), "sqlite:///abs/q.db");
        assert!(normalize_sqlite_url("rel.db".into()).ends_with("/rel.db"));
    }
}
