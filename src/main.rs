//! Purpose: `hostel` CLI entry point.
//! Role: Binary crate root; parses args, resolves the store, runs the menu or a subcommand.
//! Invariants: With no subcommand the interactive menu runs and the process exits 0.
//! Invariants: Subcommand errors are emitted on stderr (text on a TTY, JSON otherwise).
//! Invariants: Process exit code is derived from `to_exit_code`.
//! Invariants: All record reads and writes go through `RecordStore`.
#![allow(clippy::result_large_err)]
use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod menu;
mod record_view;

use hostel::notice::{Notice, notice_json};
use hostel::store_paths::{StoreLocation, resolve_store_path};
use hostel::{Durability, Error, ErrorKind, RecordStore, StoreOptions, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    to_exit_code(ErrorKind::Usage)
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                let hint = clap_error_hint(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing();
    let color_mode = cli.color;
    let location = StoreLocation {
        file: cli.file,
        dir: cli.dir,
        name: cli.store_name,
    };
    let options = StoreOptions::new().with_durability(cli.durability.into());

    resolve_store_path(&location)
        .map(|path| RecordStore::with_options(path, options))
        .and_then(|store| {
            let command = cli.command.unwrap_or(Command::Menu);
            command_dispatch::dispatch_command(command, &store, color_mode)
        })
        .map_err(add_hints)
        .map_err(|err| (err, color_mode))
}

// Diagnostics go to stderr so they never interleave with menu or JSON output.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "hostel",
    version,
    about = "Student and hostel records kept in a plain text file",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Run without a command for the interactive menu.

Records are stored four lines each (roll no, name, phone, address)."#,
    after_help = r#"EXAMPLES
  $ hostel                                        # interactive menu
  $ hostel add R-101 --name "Asha Khan" --phone 555-0100 --address "12 Hill Road"
  $ hostel list
  $ hostel get R-101 --json
  $ hostel update R-101 --phone 555-0199
  $ hostel delete R-101

NOTES
  - Default store: ./hostel_data.txt (override with --file, HOSTEL_STORE, or --dir/--store-name)
  - Set RUST_LOG=debug to trace store operations on stderr"#,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "HOSTEL_STORE",
        help = "Record file to use (default: ./hostel_data.txt)",
        value_hint = ValueHint::FilePath
    )]
    file: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Directory holding the record file (see --store-name)",
        value_hint = ValueHint::DirPath
    )]
    dir: Option<PathBuf>,
    #[arg(
        long = "store-name",
        global = true,
        help = "Named record file inside --dir (stored as <name>.txt)"
    )]
    store_name: Option<String>,
    #[arg(
        long,
        global = true,
        default_value = "fast",
        value_enum,
        help = "Durability mode: fast|flush (flush fsyncs every write)"
    )]
    durability: DurabilityCli,
    #[arg(
        long,
        global = true,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum DurabilityCli {
    Fast,
    Flush,
}

impl From<DurabilityCli> for Durability {
    fn from(value: DurabilityCli) -> Self {
        match value {
            DurabilityCli::Fast => Durability::Fast,
            DurabilityCli::Flush => Durability::Flush,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run the interactive menu (default)")]
    Menu,
    #[command(
        arg_required_else_help = true,
        about = "Append a record",
        after_help = r#"EXAMPLES
  $ hostel add R-101 --name "Asha Khan" --phone 555-0100 --address "12 Hill Road"
  $ hostel add R-101 --name Ben --phone 555-0101 --address "Block B" --unique

NOTES
  - Duplicate roll numbers are allowed unless --unique is given (a notice is printed)"#
    )]
    Add {
        #[arg(help = "Roll number (single token)")]
        id: String,
        #[arg(long, help = "Student name")]
        name: String,
        #[arg(long, help = "Phone number")]
        phone: String,
        #[arg(long, help = "Postal address")]
        address: String,
        #[arg(long, help = "Fail if a record with this roll number already exists")]
        unique: bool,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(about = "List every record in file order")]
    List {
        #[arg(long, help = "Emit JSON instead of a table")]
        json: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "Show the first record with a roll number"
    )]
    Get {
        #[arg(help = "Roll number to look up")]
        id: String,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "Change fields of the first record with a roll number",
        after_help = r#"EXAMPLES
  $ hostel update R-101 --phone 555-0199
  $ hostel update R-101 --name "Asha K." --address "Block C"

NOTES
  - Fields not given keep their stored value; the roll number never changes"#
    )]
    Update {
        #[arg(help = "Roll number of the record to change")]
        id: String,
        #[arg(long, help = "New name")]
        name: Option<String>,
        #[arg(long, help = "New phone number")]
        phone: Option<String>,
        #[arg(long, help = "New address")]
        address: Option<String>,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "Remove the first record with a roll number"
    )]
    Delete {
        #[arg(help = "Roll number of the record to remove")]
        id: String,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(about = "Print how many records are stored")]
    Count {
        #[arg(long, help = "Emit JSON instead of a bare number")]
        json: bool,
    },
    #[command(about = "Print version info")]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        after_help = r#"EXAMPLES
  $ hostel completion bash > ~/.local/share/bash-completion/completions/hostel
  $ hostel completion zsh > ~/.zfunc/_hostel"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

pub(crate) fn add_hints(err: Error) -> Error {
    add_io_hint(add_corrupt_hint(err))
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Permission => err.with_hint(
            "Permission denied. Check file permissions or point --file at a writable location.",
        ),
        ErrorKind::Io => err.with_hint("I/O error. Check the path, filesystem, and disk space."),
        _ => err,
    }
}

fn add_corrupt_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Corrupt || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "The record file is malformed. Each record needs four lines: roll no, name, phone, address.",
    )
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_version_output() {
    println!("hostel {}", env!("CARGO_PKG_VERSION"));
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn notice_time_now() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let label = colorize_label("notice:", color_mode.use_color(is_tty), AnsiColor::Yellow);
        eprintln!("{label} {}", notice.message);
        return;
    }

    let value = notice_json(notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

pub(crate) fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::StoreMissing => "record file not found".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::AlreadyExists => "already exists".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Corrupt => "corrupt data".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(id) = err.id() {
        inner.insert("id".to_string(), json!(id));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(id) = err.id() {
        lines.push(format!(
            "{} {id}",
            colorize_label("roll no:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(line) = err.line() {
        lines.push(format!(
            "{} {line}",
            colorize_label("line:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

// Points at the subcommand's help when clap's usage line names one.
fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let subcommand = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: hostel "))
        .and_then(|rest| rest.split_whitespace().next())
        .filter(|token| !token.starts_with(['-', '<', '[']));
    match subcommand {
        Some(name) => format!("Try `hostel {name} --help`."),
        None => "Try `hostel --help`.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, add_hints, clap_error_hint, error_json, error_text};
    use clap::{CommandFactory, Parser};
    use hostel::{Error, ErrorKind};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["hostel", "--file", "/tmp/records.txt"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.file.as_deref().and_then(|p| p.to_str()), Some("/tmp/records.txt"));
    }

    #[test]
    fn update_requires_an_id() {
        assert!(Cli::try_parse_from(["hostel", "update"]).is_err());
        let cli = Cli::try_parse_from(["hostel", "update", "R-1", "--phone", "555"])
            .expect("parse");
        match cli.command {
            Some(Command::Update { id, phone, name, .. }) => {
                assert_eq!(id, "R-1");
                assert_eq!(phone.as_deref(), Some("555"));
                assert!(name.is_none());
            }
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn clap_hint_points_at_subcommand_help() {
        let err = Cli::try_parse_from(["hostel", "add", "R-1", "--name", "Asha"])
            .err()
            .expect("missing args");
        assert_eq!(clap_error_hint(&err), "Try `hostel add --help`.");

        let err = Cli::try_parse_from(["hostel", "--bogus"]).err().expect("unknown flag");
        assert_eq!(clap_error_hint(&err), "Try `hostel --help`.");
    }

    #[test]
    fn io_and_corrupt_errors_get_hints() {
        let io = add_hints(Error::new(ErrorKind::Io));
        assert!(io.hint().expect("hint").starts_with("I/O error."));
        let usage = add_hints(Error::new(ErrorKind::Usage));
        assert!(usage.hint().is_none());
    }

    #[test]
    fn error_json_carries_context() {
        let err = add_hints(
            Error::new(ErrorKind::Corrupt)
                .with_message("record is missing its phone line")
                .with_id("R-2")
                .with_line(5),
        );
        let value = error_json(&err);
        let inner = &value["error"];
        assert_eq!(inner["kind"], "Corrupt");
        assert_eq!(inner["id"], "R-2");
        assert_eq!(inner["line"], 5);
        assert!(inner["hint"].as_str().expect("hint").contains("four lines"));
    }

    #[test]
    fn error_text_without_color_has_no_escapes() {
        let err = Error::new(ErrorKind::NotFound)
            .with_message("record not found")
            .with_id("R-9");
        let text = error_text(&err, false);
        assert!(text.starts_with("error: record not found"));
        assert!(text.contains("roll no: R-9"));
        assert!(!text.contains('\u{1b}'));
    }
}
