mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;

use bamboo::core::pomodoro::MAX_SESSION_CYCLES;
use commands::DateArgs;

#[derive(Parser)]
#[command(name = "bamboo")]
#[command(about = "Habits, tasks and pomodoro sessions kept as markdown in a vault", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "Use this vault instead of the configured one")]
    vault: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a vault (or repair its folders) and make it active
    Init {
        #[arg(long, help = "Vault name (default: folder name)")]
        name: Option<String>,
        #[arg(long, help = "Vault location (default: ~/BambooVault)")]
        path: Option<PathBuf>,
    },
    /// Overview of one day in the vault
    Status {
        #[command(flatten)]
        date: DateArgs,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    #[command(subcommand)]
    Habits(HabitCommands),
    #[command(subcommand)]
    Tasks(TaskCommands),
    #[command(subcommand)]
    Templates(TemplateCommands),
    #[command(subcommand)]
    Pomodoro(PomodoroCommands),
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Track daily habits and streaks
#[derive(Subcommand)]
enum HabitCommands {
    /// List habits with completion and streak for a day
    List {
        #[command(flatten)]
        date: DateArgs,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Start tracking a new habit
    Create { name: String },
    /// Mark a habit done with a quick log
    Done {
        name: String,
        #[command(flatten)]
        date: DateArgs,
    },
    /// Write a detailed log from a template
    Log {
        name: String,
        #[arg(long, help = "Template to fill in (default: the habit's own)")]
        template: Option<String>,
        #[command(flatten)]
        date: DateArgs,
    },
    /// Current and best streaks
    Stats {
        habit: Option<String>,
        #[command(flatten)]
        date: DateArgs,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
}

/// Manage the per-day task list
#[derive(Subcommand)]
enum TaskCommands {
    /// Show the tasks for a day
    Show {
        #[command(flatten)]
        date: DateArgs,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Append a task
    Add {
        text: String,
        #[command(flatten)]
        date: DateArgs,
    },
    /// Flip a task between done and open
    Toggle {
        number: usize,
        #[command(flatten)]
        date: DateArgs,
    },
    /// Nest a task one level deeper
    Indent {
        number: usize,
        #[command(flatten)]
        date: DateArgs,
    },
    /// Move a task one level up
    Unindent {
        number: usize,
        #[command(flatten)]
        date: DateArgs,
    },
    /// Remove a task
    Delete {
        number: usize,
        #[command(flatten)]
        date: DateArgs,
    },
    /// Replace the text of a task
    Edit {
        number: usize,
        text: String,
        #[command(flatten)]
        date: DateArgs,
    },
}

/// Design the fields of detailed habit logs
#[derive(Subcommand)]
enum TemplateCommands {
    List {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    Show { name: String },
    Create { name: String },
    Delete {
        name: String,
        #[arg(short, long, help = "Skip confirmation")]
        yes: bool,
    },
    /// Add a field to a template
    #[command(name = "add-field")]
    AddField {
        template: String,
        name: String,
        #[arg(long = "type", default_value = "notes", help = "time, pages, mood, notes or mcq")]
        kind: String,
        #[arg(long, help = "Unit shown next to the value")]
        unit: Option<String>,
        #[arg(long = "option", help = "Choice for mcq fields (repeatable)")]
        options: Vec<String>,
        #[arg(long, help = "Mark the field as required")]
        required: bool,
    },
    /// Remove a field by its number
    #[command(name = "remove-field")]
    RemoveField { template: String, number: usize },
    /// List available field types
    Types,
}

/// Plan and record focus sessions
#[derive(Subcommand)]
enum PomodoroCommands {
    /// Show the focus/break schedule for a number of cycles
    Plan {
        #[arg(long, default_value_t = 4, value_parser = cycles_range())]
        cycles: u32,
    },
    /// Record a finished session
    Log {
        name: String,
        #[arg(long, default_value_t = 4, value_parser = cycles_range())]
        cycles: u32,
        #[arg(long, help = "Start time (HH:MM, default: ends now)")]
        start: Option<String>,
    },
    /// List logged sessions
    History {
        #[arg(long, help = "Only sessions from the selected day")]
        day: bool,
        #[command(flatten)]
        date: DateArgs,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
}

/// Vault and timer settings
#[derive(Subcommand)]
enum ConfigCommands {
    Show {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Point Bamboo at an existing vault
    Switch { path: PathBuf },
    #[command(name = "set-focus")]
    SetFocus { minutes: u32 },
    #[command(name = "set-break")]
    SetBreak { minutes: u32 },
    /// Restore default timer settings
    Reset {
        #[arg(short, long, help = "Skip confirmation")]
        yes: bool,
    },
}

fn cycles_range() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(1..=MAX_SESSION_CYCLES as i64)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("BAMBOO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    if let Err(e) = run(Cli::parse()) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let vault = cli.vault;

    match cli.command {
        Commands::Init { name, path } => commands::init::run(vault, name, path),
        Commands::Status { date, json } => commands::status::run(vault, &date, json),

        Commands::Habits(cmd) => match cmd {
            HabitCommands::List { date, json } => commands::habits::list(vault, &date, json),
            HabitCommands::Create { name } => commands::habits::create(vault, &name),
            HabitCommands::Done { name, date } => commands::habits::done(vault, &name, &date),
            HabitCommands::Log {
                name,
                template,
                date,
            } => commands::habits::log(vault, &name, template.as_deref(), &date),
            HabitCommands::Stats { habit, date, json } => {
                commands::habits::stats(vault, habit.as_deref(), &date, json)
            }
        },

        Commands::Tasks(cmd) => match cmd {
            TaskCommands::Show { date, json } => commands::tasks::show(vault, &date, json),
            TaskCommands::Add { text, date } => commands::tasks::add(vault, &date, &text),
            TaskCommands::Toggle { number, date } => commands::tasks::toggle(vault, &date, number),
            TaskCommands::Indent { number, date } => commands::tasks::indent(vault, &date, number),
            TaskCommands::Unindent { number, date } => {
                commands::tasks::unindent(vault, &date, number)
            }
            TaskCommands::Delete { number, date } => commands::tasks::delete(vault, &date, number),
            TaskCommands::Edit { number, text, date } => {
                commands::tasks::edit(vault, &date, number, &text)
            }
        },

        Commands::Templates(cmd) => match cmd {
            TemplateCommands::List { json } => commands::templates::list(vault, json),
            TemplateCommands::Show { name } => commands::templates::show(vault, &name),
            TemplateCommands::Create { name } => commands::templates::create(vault, &name),
            TemplateCommands::Delete { name, yes } => commands::templates::delete(vault, &name, yes),
            TemplateCommands::AddField {
                template,
                name,
                kind,
                unit,
                options,
                required,
            } => commands::templates::add_field(
                vault,
                &template,
                commands::templates::NewField {
                    name: &name,
                    kind: &kind,
                    unit,
                    options,
                    required,
                },
            ),
            TemplateCommands::RemoveField { template, number } => {
                commands::templates::remove_field(vault, &template, number)
            }
            TemplateCommands::Types => commands::templates::types(),
        },

        Commands::Pomodoro(cmd) => match cmd {
            PomodoroCommands::Plan { cycles } => commands::pomodoro::plan(vault, cycles),
            PomodoroCommands::Log {
                name,
                cycles,
                start,
            } => commands::pomodoro::log(vault, &name, cycles, start.as_deref()),
            PomodoroCommands::History { day, date, json } => {
                let selected = day || date.date.is_some() || date.offset != 0;
                commands::pomodoro::history(vault, selected.then_some(&date), json)
            }
        },

        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { json } => commands::config::show(vault, json),
            ConfigCommands::Switch { path } => commands::config::switch(&path),
            ConfigCommands::SetFocus { minutes } => commands::config::set_focus(minutes),
            ConfigCommands::SetBreak { minutes } => commands::config::set_break(minutes),
            ConfigCommands::Reset { yes } => commands::config::reset(yes),
        },
    }
}
