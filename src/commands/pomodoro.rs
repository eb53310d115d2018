use std::path::PathBuf;

use anyhow::{bail, Result};
use bamboo::core::clock::{Clock, SystemClock};
use bamboo::core::pomodoro::{BreakKind, PomodoroLog, PomodoroSession, PomodoroSettings};
use chrono::{Duration, NaiveTime};
use colored::*;

use super::{date_heading, open_vault, print_title, resolver, DateArgs};

pub fn plan(vault: Option<PathBuf>, cycles: u32) -> Result<()> {
    let resolver = resolver(vault)?;
    let settings = PomodoroSettings::from(resolver.config());

    print_title("Pomodoro Plan");
    println!(
        "Focus {} min, break {} min, long break {} min every {} cycles",
        settings.focus_minutes,
        settings.break_minutes,
        settings.long_break_minutes,
        settings.cycles_before_long_break
    );
    println!();
    for cycle in 1..=cycles {
        println!("  {:>2}. {} {} min", cycle, "focus".green(), settings.focus_minutes);
        if cycle < cycles {
            let kind = settings.break_after(cycle);
            let label = match kind {
                BreakKind::Short => "break".cyan(),
                BreakKind::Long => "long break".blue(),
            };
            println!("      {} {} min", label, settings.break_minutes(kind));
        }
    }
    Ok(())
}

/// Records a finished session of `cycles` full focus blocks.
pub fn log(vault: Option<PathBuf>, name: &str, cycles: u32, start: Option<&str>) -> Result<()> {
    if cycles == 0 {
        bail!("A session needs at least one completed cycle");
    }
    let resolver = resolver(vault)?;
    let paths = resolver.open()?;
    let settings = PomodoroSettings::from(resolver.config());

    let draft = PomodoroSession::completed(name, SystemClock.now(), &settings, cycles);
    let started = match start {
        Some(time) => {
            let time = NaiveTime::parse_from_str(time, "%H:%M")
                .map_err(|_| anyhow::anyhow!("Invalid start time '{}', use HH:MM", time))?;
            SystemClock.today().and_time(time)
        }
        // default: the session ends now
        None => SystemClock.now() - Duration::seconds(draft.total_secs() as i64),
    };
    let session = PomodoroSession::completed(name, started, &settings, cycles);

    let path = PomodoroLog::new(&paths).save(&session)?;
    super::ok(&format!(
        "Logged {} ({} cycles, {} focused)",
        name,
        session.work_cycles,
        bamboo::core::pomodoro::format_duration(session.total_work_secs)
    ));
    println!("  {}", path.display());
    Ok(())
}

pub fn history(vault: Option<PathBuf>, date: Option<&DateArgs>, json: bool) -> Result<()> {
    let paths = open_vault(vault)?;
    let log = PomodoroLog::new(&paths);

    let (title, sessions) = match date {
        Some(date) => {
            let cursor = date.cursor()?;
            (
                format!("Pomodoro Sessions - {}", date_heading(&cursor)),
                log.sessions_on(cursor.current_date())?,
            )
        }
        None => ("Pomodoro History".to_string(), log.history()?),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    print_title(&title);
    if sessions.is_empty() {
        println!("{}", "No sessions logged.".dimmed());
        return Ok(());
    }
    for session in &sessions {
        println!("  {}  {}", session.date.to_string().dimmed(), session.name.cyan());
    }
    Ok(())
}
