#![forbid(unsafe_code)]

mod cmd;
mod output;
mod prompt;
mod session;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use focus_core::TaskStatus;
use focus_core::config::{self, UserConfig};
use focus_core::error::ErrorCode;
use output::{AlreadyReported, CliError, OutputMode, render_error};
use session::Session;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "focus: a daily task tracker that rolls unfinished work forward",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Task database to use instead of the configured one.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Day to operate on (YYYY-MM-DD); defaults to today.
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Resolve the output mode from flags, environment, config and TTY.
    fn output_mode(&self, config: &UserConfig) -> OutputMode {
        let flag = if self.json {
            Some(OutputMode::Json)
        } else {
            self.format
        };
        let env_format = env::var("FORMAT").ok();
        OutputMode::from_name(config::resolve_output(
            flag.map(OutputMode::as_str),
            env_format.as_deref(),
            config,
        ))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Create the config file and task database",
        after_help = "EXAMPLES:\n    # First run\n    focus init\n\n    \
                      # Point an existing config at a new database\n    \
                      focus --db ~/notes/focus.sqlite3 init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show today's tasks and progress",
        long_about = "Show the tasks of the day. The first run on a new day carries \
                      unfinished tasks over from the last recorded day.",
        after_help = "EXAMPLES:\n    # Today's tasks\n    focus status\n\n    \
                      # Include deleted tasks\n    focus status --all\n\n    \
                      # Another day\n    focus --date 2024-01-08 status"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Add a task to today",
        after_help = "EXAMPLES:\n    focus add \"Draft RFC\"\n    \
                      focus add \"Draft RFC\" --details \"sections 1-3\""
    )]
    Add(cmd::add::AddArgs),

    #[command(next_help_heading = "Lifecycle", about = "Mark tasks as done")]
    Done(cmd::update::UpdateArgs),

    #[command(next_help_heading = "Lifecycle", about = "Mark tasks as blocked")]
    Block(cmd::update::UpdateArgs),

    #[command(next_help_heading = "Lifecycle", about = "Reset tasks to todo")]
    Reset(cmd::update::UpdateArgs),

    #[command(next_help_heading = "Lifecycle", about = "Mark tasks as deleted")]
    Delete(cmd::update::UpdateArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one task with details and history",
        after_help = "EXAMPLES:\n    focus show 4\n\n    \
                      # Raw details only\n    focus show 4 --details | pbcopy\n\n    \
                      # Pick from today's tasks\n    focus show"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show the days a task was carried through"
    )]
    Log(cmd::log::LogArgs),

    #[command(next_help_heading = "Setup", about = "Print the effective configuration")]
    Config,

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    focus completions bash\n    focus completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("FOCUS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "focus=debug,info"
        } else {
            "focus=info,warn"
        })
    });

    let format = env::var("FOCUS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn builtin_commands() -> Vec<String> {
    Cli::command()
        .get_subcommands()
        .map(|sub| sub.get_name().to_string())
        .collect()
}

fn dispatch(command: Commands, session: &Session) -> anyhow::Result<()> {
    match command {
        Commands::Init(args) => cmd::init::run_init(&args, session),
        Commands::Status(args) => cmd::status::run_status(&args, session),
        Commands::Add(args) => cmd::add::run_add(&args, session),
        Commands::Done(args) => cmd::update::run_update(&args, TaskStatus::Done, session),
        Commands::Block(args) => cmd::update::run_update(&args, TaskStatus::Blocked, session),
        Commands::Reset(args) => cmd::update::run_update(&args, TaskStatus::Todo, session),
        Commands::Delete(args) => cmd::update::run_update(&args, TaskStatus::Deleted, session),
        Commands::Show(args) => cmd::show::run_show(&args, session),
        Commands::Log(args) => cmd::log::run_log(&args, session),
        Commands::Config => cmd::config::run_config(session),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn report(mode: OutputMode, err: &anyhow::Error) {
    if err.downcast_ref::<AlreadyReported>().is_some() {
        return;
    }
    tracing::debug!(error = ?err, "command failed");
    if render_error(mode, &CliError::from_anyhow(err)).is_err() {
        eprintln!("error: {err:#}");
    }
}

fn main() -> ExitCode {
    let raw: Vec<String> = env::args().collect();
    let verbose = raw.iter().any(|a| a == "-v" || a == "--verbose");
    init_tracing(verbose);

    let config_path = config::config_path(env::var_os(config::CONFIG_ENV).map(PathBuf::from));
    let user_config = match config::load_user_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            let fallback = OutputMode::from_name(config::resolve_output(
                None,
                env::var("FORMAT").ok().as_deref(),
                &UserConfig::default(),
            ));
            let cli_error = CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}"));
            if render_error(fallback, &cli_error).is_err() {
                eprintln!("error: {err:#}");
            }
            return ExitCode::FAILURE;
        }
    };

    let builtins = builtin_commands();
    let builtins: Vec<&str> = builtins.iter().map(String::as_str).collect();
    let args = config::expand_alias(raw, &user_config, &builtins);

    let cli = Cli::parse_from(args);
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode(&user_config);
    let session = Session::new(config_path, user_config, cli.db, cli.date, output);

    match dispatch(cli.command, &session) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(output, &err);
            ExitCode::FAILURE
        }
    }
}
