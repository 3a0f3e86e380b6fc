//! `priorityplot-cli` – operator front-end for the goal memory.
//!
//! Exposes the engine's two operations from the command line:
//!
//! - `priorityplot match <name>`  – look up remembered estimates for a goal.
//! - `priorityplot remember <name> <value> <time>` – store/update a goal's
//!   estimates and persist.
//! - `priorityplot list` – show remembered goals, most recent first.
//!
//! The goal-memory file location comes from `~/.priorityplot/config.toml`
//! (or the `PRIORITYPLOT_MEMORY_PATH` environment variable), defaulting to
//! `~/.priorityplot/goal_memory.json`.

mod config;

use colored::Colorize;
use std::process::ExitCode;
use tracing::warn;

use priorityplot_memory::GoalMemory;
use priorityplot_types::Task;

fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    // Initialise tracing-subscriber using RUST_LOG (defaults to "warn" so
    // normal CLI output stays clean).  Set PRIORITYPLOT_LOG_FORMAT=json to
    // emit newline-delimited JSON logs.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    if std::env::var("PRIORITYPLOT_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "failed to load config; using defaults");
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        Some((cmd, rest)) if cmd == "match" => cmd_match(&cfg, rest),
        Some((cmd, rest)) if cmd == "remember" => cmd_remember(&cfg, rest),
        Some((cmd, _)) if cmd == "list" => cmd_list(&cfg),
        _ => {
            print_usage();
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_match(cfg: &config::Config, rest: &[String]) -> ExitCode {
    if rest.is_empty() {
        println!("{}", "Usage: priorityplot match <goal name>".yellow());
        return ExitCode::FAILURE;
    }
    let name = rest.join(" ");
    let memory = GoalMemory::open(cfg.resolved_memory_path());
    match memory.find_match(&name) {
        Some(hit) => {
            println!(
                "  {} {}  (value {}, time {}h, confidence {:.0}%)",
                "✓".green().bold(),
                hit.name.bold(),
                hit.value,
                hit.time,
                hit.score * 100.0
            );
            ExitCode::SUCCESS
        }
        None => {
            println!("  {} no remembered goal matches {}", "·".dimmed(), name.bold());
            ExitCode::SUCCESS
        }
    }
}

fn cmd_remember(cfg: &config::Config, rest: &[String]) -> ExitCode {
    let [name, value, time] = rest else {
        println!(
            "{}",
            "Usage: priorityplot remember <goal name> <value> <time>".yellow()
        );
        return ExitCode::FAILURE;
    };
    let (Ok(value), Ok(time)) = (value.parse::<f64>(), time.parse::<f64>()) else {
        println!("{}", "value and time must be numbers".red());
        return ExitCode::FAILURE;
    };

    let mut memory = GoalMemory::open(cfg.resolved_memory_path());
    let goal = Task::new(name.clone(), value, time);
    match memory.update_from_tasks(&[goal], true) {
        Ok(()) => {
            println!(
                "  {} remembered {} (value {}, time {}h)",
                "✓".green().bold(),
                name.bold(),
                value,
                time
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}: {}", "Failed to save goal memory".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_list(cfg: &config::Config) -> ExitCode {
    let memory = GoalMemory::open(cfg.resolved_memory_path());
    if memory.is_empty() {
        println!("  {} no goals remembered yet", "·".dimmed());
        return ExitCode::SUCCESS;
    }
    println!(
        "  {} remembered goal(s) in {}",
        memory.len().to_string().bold(),
        memory.storage_path().display().to_string().dimmed()
    );
    for entry in memory.entries_by_recency() {
        println!(
            "    • {}  value {}, time {}h  {}",
            entry.name.bold(),
            entry.value,
            entry.time,
            entry
                .updated_at
                .format("(updated %Y-%m-%d %H:%M UTC)")
                .to_string()
                .dimmed()
        );
    }
    ExitCode::SUCCESS
}

// ─────────────────────────────────────────────────────────────────────────────
// Usage
// ─────────────────────────────────────────────────────────────────────────────

fn print_usage() {
    println!();
    println!("  {} {}",
        "PriorityPlot".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Goal memory for value/time estimates");
    println!();
    println!("  {}", "Commands:".bold());
    println!("    priorityplot match <goal name>              look up remembered estimates");
    println!("    priorityplot remember <name> <value> <time> store a goal's estimates");
    println!("    priorityplot list                           show remembered goals");
    println!();
}
