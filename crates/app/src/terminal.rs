//! Line-oriented terminal front end for the quiz services.

use std::fmt::{self, Write as _};
use std::io;

use quiz_core::model::{CategoryId, Screen};
use quiz_core::{CategoryOverview, Transition};
use services::{CategoryHeader, QuestionView, QuizService, QuizSnapshot, SingleQuizService};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const PLAY_HELP: &str = "\
Commands:
  list            show all categories
  open <id>       open a category from the home screen
  pick <n|text>   select an option by number or text
  next | prev     move between questions
  finish          show results (last question, option selected)
  restart         retake the open category from the results screen
  home            back to the category list
  clear <id>      forget saved progress for a category (home screen)
  show            redraw the current screen
  quit            exit";

const SOLO_HELP: &str = "\
Commands:
  start           begin the quiz
  pick <n|text>   select an option by number or text
  next | prev     move between questions
  finish          show results (last question, option selected)
  restart         retake the quiz and forget saved progress
  show            redraw the current screen
  quit            exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineCommand {
    Help,
    Show,
    List,
    Open(String),
    Pick(String),
    Next,
    Prev,
    Finish,
    Restart,
    Home,
    Clear(String),
    Start,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineError {
    Empty,
    Unknown(String),
    MissingArgument { command: &'static str },
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::Empty => write!(f, "empty command"),
            LineError::Unknown(word) => write!(f, "unknown command: {word} (try `help`)"),
            LineError::MissingArgument { command } => write!(f, "{command} requires an argument"),
        }
    }
}

impl LineCommand {
    pub(crate) fn parse(line: &str) -> Result<Self, LineError> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));
        let argument = |command: &'static str| {
            if rest.is_empty() {
                Err(LineError::MissingArgument { command })
            } else {
                Ok(rest.to_owned())
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(LineError::Empty),
            "help" | "?" => Ok(Self::Help),
            "show" => Ok(Self::Show),
            "list" => Ok(Self::List),
            "open" => argument("open").map(Self::Open),
            "pick" => argument("pick").map(Self::Pick),
            "next" | "n" => Ok(Self::Next),
            "prev" | "p" => Ok(Self::Prev),
            "finish" => Ok(Self::Finish),
            "restart" => Ok(Self::Restart),
            "home" => Ok(Self::Home),
            "clear" => argument("clear").map(Self::Clear),
            "start" => Ok(Self::Start),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            _ => Err(LineError::Unknown(word.to_owned())),
        }
    }
}

/// Map `pick` input to an option: a 1-based number or the option text itself.
pub(crate) fn resolve_pick(question: Option<&QuestionView>, raw: &str) -> String {
    let Some(question) = question else {
        return raw.to_owned();
    };
    raw.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| question.options.get(index))
        .cloned()
        .unwrap_or_else(|| raw.to_owned())
}

enum Outcome {
    Render(QuizSnapshot),
    Message(String),
    Quit,
}

/// Drive a multi-category quiz from `input` until EOF or `quit`.
pub(crate) async fn play<R, W>(service: &mut QuizService, input: R, output: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if service.is_persistence_degraded() {
        emit(output, "(storage unavailable: progress will not be saved)").await?;
    }
    emit(output, &render(&service.snapshot())).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = match LineCommand::parse(&line) {
            Ok(command) => command,
            Err(LineError::Empty) => continue,
            Err(error) => {
                emit(output, &error.to_string()).await?;
                continue;
            }
        };

        let outcome = match command {
            LineCommand::Quit => Outcome::Quit,
            LineCommand::Help => Outcome::Message(PLAY_HELP.to_owned()),
            LineCommand::Show => Outcome::Render(service.snapshot()),
            LineCommand::List => Outcome::Message(render_overview(&service.engine().overview())),
            LineCommand::Open(raw) => match raw.parse::<CategoryId>() {
                Ok(id) => match service.begin_select_category(&id) {
                    Ok(pending) => {
                        if pending {
                            pause(output, service.engine().pending_transition()).await?;
                            service.settle().await;
                        }
                        Outcome::Render(service.snapshot())
                    }
                    Err(error) => Outcome::Message(error.to_string()),
                },
                Err(error) => Outcome::Message(error.to_string()),
            },
            LineCommand::Pick(raw) => {
                let option = resolve_pick(service.snapshot().question.as_ref(), &raw);
                match service.select_option(&option).await {
                    Ok(snapshot) => Outcome::Render(snapshot),
                    Err(error) => Outcome::Message(error.to_string()),
                }
            }
            LineCommand::Next => Outcome::Render(service.next_question().await),
            LineCommand::Prev => Outcome::Render(service.prev_question().await),
            LineCommand::Finish => {
                if service.begin_finish() {
                    pause(output, service.engine().pending_transition()).await?;
                    service.settle().await;
                }
                Outcome::Render(service.snapshot())
            }
            LineCommand::Restart => {
                if service.begin_restart() {
                    pause(output, service.engine().pending_transition()).await?;
                    service.settle().await;
                }
                Outcome::Render(service.snapshot())
            }
            LineCommand::Home => {
                if service.begin_go_to_home() {
                    pause(output, service.engine().pending_transition()).await?;
                    service.settle().await;
                }
                Outcome::Render(service.snapshot())
            }
            LineCommand::Clear(raw) => match raw.parse::<CategoryId>() {
                Ok(id) => Outcome::Render(service.clear_category(&id).await),
                Err(error) => Outcome::Message(error.to_string()),
            },
            LineCommand::Start => Outcome::Message("`start` is for solo mode; use `open <id>`".into()),
        };

        if !apply(output, outcome).await? {
            break;
        }
    }
    Ok(())
}

/// Drive a single-category quiz from `input` until EOF or `quit`.
pub(crate) async fn solo<R, W>(
    service: &mut SingleQuizService,
    input: R,
    output: &mut W,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if service.is_persistence_degraded() {
        emit(output, "(storage unavailable: progress will not be saved)").await?;
    }
    emit(output, &render(&service.snapshot())).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = match LineCommand::parse(&line) {
            Ok(command) => command,
            Err(LineError::Empty) => continue,
            Err(error) => {
                emit(output, &error.to_string()).await?;
                continue;
            }
        };

        let outcome = match command {
            LineCommand::Quit => Outcome::Quit,
            LineCommand::Help => Outcome::Message(SOLO_HELP.to_owned()),
            LineCommand::Show => Outcome::Render(service.snapshot()),
            LineCommand::Start => {
                if service.begin_start() {
                    pause(output, service.engine().pending_transition()).await?;
                    service.settle().await;
                }
                Outcome::Render(service.snapshot())
            }
            LineCommand::Pick(raw) => {
                let option = resolve_pick(service.snapshot().question.as_ref(), &raw);
                match service.select_option(&option).await {
                    Ok(snapshot) => Outcome::Render(snapshot),
                    Err(error) => Outcome::Message(error.to_string()),
                }
            }
            LineCommand::Next => Outcome::Render(service.next_question().await),
            LineCommand::Prev => Outcome::Render(service.prev_question().await),
            LineCommand::Finish => {
                if service.begin_finish() {
                    pause(output, service.engine().pending_transition()).await?;
                    service.settle().await;
                }
                Outcome::Render(service.snapshot())
            }
            LineCommand::Restart => {
                if service.begin_restart() {
                    pause(output, service.engine().pending_transition()).await?;
                    service.settle().await;
                }
                Outcome::Render(service.snapshot())
            }
            LineCommand::List | LineCommand::Open(_) | LineCommand::Home | LineCommand::Clear(_) => {
                Outcome::Message("not available in solo mode (try `help`)".into())
            }
        };

        if !apply(output, outcome).await? {
            break;
        }
    }
    Ok(())
}

/// Write the outcome. Returns `false` when the loop should stop.
async fn apply<W: AsyncWrite + Unpin>(output: &mut W, outcome: Outcome) -> io::Result<bool> {
    match outcome {
        Outcome::Render(snapshot) => emit(output, &render(&snapshot)).await?,
        Outcome::Message(message) => emit(output, &message).await?,
        Outcome::Quit => return Ok(false),
    }
    Ok(true)
}

async fn emit<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> io::Result<()> {
    output.write_all(text.trim_end().as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}

async fn pause<W: AsyncWrite + Unpin>(
    output: &mut W,
    pending: Option<&Transition>,
) -> io::Result<()> {
    match pending {
        Some(transition) => emit(output, &format!("... {}", transition_label(transition))).await,
        None => emit(output, "...").await,
    }
}

fn transition_label(transition: &Transition) -> String {
    match transition {
        Transition::OpenCategory(id) => format!("opening {id}"),
        Transition::Start => "starting".to_owned(),
        Transition::Finish => "scoring".to_owned(),
        Transition::Restart => "restarting".to_owned(),
        Transition::Home => "going home".to_owned(),
    }
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

pub(crate) fn render(snapshot: &QuizSnapshot) -> String {
    match snapshot.screen {
        Screen::Home => render_home(snapshot),
        Screen::Quiz => render_question(snapshot),
        Screen::Results => render_results(snapshot),
    }
}

fn title(header: &CategoryHeader) -> String {
    match &header.display_name_localized {
        Some(localized) => format!("{} ({localized})", header.display_name),
        None => header.display_name.clone(),
    }
}

fn render_home(snapshot: &QuizSnapshot) -> String {
    if snapshot.categories.is_empty() {
        // Single-category start screen.
        return match &snapshot.category {
            Some(header) => format!("{}\nType `start` to begin.", title(header)),
            None => "Type `start` to begin.".to_owned(),
        };
    }
    format!("{}\nType `open <id>` to begin.", render_overview(&snapshot.categories))
}

fn render_overview(categories: &[CategoryOverview]) -> String {
    let mut out = String::from("Categories:\n");
    for category in categories {
        let name = match &category.display_name_localized {
            Some(localized) => format!("{} ({localized})", category.display_name),
            None => category.display_name.clone(),
        };
        let marker = if category.completed {
            "  done"
        } else if category.has_progress {
            "  in progress"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  {:<16}{:<32}{:>3}/{}{marker}",
            category.id.as_str(),
            name,
            category.answered,
            category.total,
        );
    }
    out
}

fn render_question(snapshot: &QuizSnapshot) -> String {
    let mut out = String::new();
    if let (Some(header), Some(progress)) = (&snapshot.category, &snapshot.progress) {
        let _ = writeln!(
            out,
            "[{}] Question {} ({}%)",
            title(header),
            progress.label(),
            progress.percent
        );
    }
    let Some(question) = &snapshot.question else {
        return out;
    };

    let _ = writeln!(out, "{}", question.text);
    for (i, option) in question.options.iter().enumerate() {
        let cursor = if question.selected.as_ref() == Some(option) { ">" } else { " " };
        let _ = writeln!(out, " {cursor} {}) {option}", i + 1);
    }

    let mut hints = vec!["pick <n>"];
    if question.can_go_prev {
        hints.push("prev");
    }
    if question.can_go_next {
        hints.push("next");
    }
    if question.can_finish {
        hints.push("finish");
    }
    let _ = writeln!(out, "({})", hints.join(", "));
    out
}

fn render_results(snapshot: &QuizSnapshot) -> String {
    let mut out = String::new();
    let Some(report) = &snapshot.results else {
        return out;
    };
    let name = snapshot.category.as_ref().map(title).unwrap_or_default();
    let _ = writeln!(
        out,
        "[{name}] Score {}/{} ({}%): {}",
        report.score, report.total, report.percentage, report.grade
    );
    for row in &report.review {
        let mark = if row.is_correct { "+" } else { "-" };
        let chosen = row.chosen.as_deref().unwrap_or("unanswered");
        if row.is_correct {
            let _ = writeln!(out, "  {mark} {}. {}: {chosen}", row.index + 1, row.question);
        } else {
            let _ = writeln!(
                out,
                "  {mark} {}. {}: {chosen} (correct: {})",
                row.index + 1,
                row.question,
                row.correct_answer
            );
        }
    }
    out
}
