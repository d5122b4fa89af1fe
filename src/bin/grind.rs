//! Grind CLI - gamified focus tracking from the terminal
//!
//! # Usage
//!
//! ```bash
//! # Show the profile: attributes, levels, recent sessions
//! grind profile
//!
//! # Manage attributes and skills
//! grind attr add Focus
//! grind attr rm <id>
//! grind skill add Guitar --attr strength
//! grind skill rm <id>
//! grind skills
//!
//! # Run a focus session in the foreground; Ctrl-C stops and records it
//! grind focus --skill <id> --attr strength --attr intelligence
//!
//! # Enable debug logging
//! RUST_LOG=grind=debug grind focus
//! ```

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use grind_core::timer::format_time;
use grind_core::{progression, AttributeId, SkillId, TimerPhase, XpAward};
use grind_engine::app::AppService;
use grind_engine::storage::{JsonFileStorage, Storage};
use grind_engine::timer::{spawn_timer, TimerEvent};

/// Grind - Pomodoro sessions that level up attributes and skills
#[derive(Parser, Debug)]
#[command(name = "grind", version, about)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the profile: attributes, levels, and session totals
    Profile,
    /// List skills with tiers and progress
    Skills,
    /// Manage attributes
    #[command(subcommand)]
    Attr(AttrCommand),
    /// Manage skills
    #[command(subcommand)]
    Skill(SkillCommand),
    /// Run a focus session in the foreground (Ctrl-C stops and records it)
    Focus {
        /// Skill credited with the focus hours
        #[arg(long)]
        skill: Option<String>,

        /// Attribute awarded the session XP (repeatable)
        #[arg(long = "attr")]
        attrs: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum AttrCommand {
    /// Create a new attribute
    Add {
        /// Display name
        name: String,
    },
    /// Delete an attribute (the defaults cannot be deleted)
    Rm {
        /// Attribute id
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum SkillCommand {
    /// Create a new skill
    Add {
        /// Display name
        name: String,

        /// Image reference shown by display layers
        #[arg(long, default_value = "")]
        image: String,

        /// Attribute linked to this skill (repeatable)
        #[arg(long = "attr")]
        attrs: Vec<String>,
    },
    /// Delete a skill
    Rm {
        /// Skill id
        id: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("grind=info".parse()?)
                .add_directive("grind_core=info".parse()?)
                .add_directive("grind_engine=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let storage = Arc::new(JsonFileStorage::default_location());
    debug!(dir = %storage.dir().display(), "Using storage directory");

    match args.command.unwrap_or(Command::Profile) {
        Command::Profile => show_profile(storage),
        Command::Skills => show_skills(storage),
        Command::Attr(cmd) => manage_attr(storage, cmd),
        Command::Skill(cmd) => manage_skill(storage, cmd),
        Command::Focus { skill, attrs } => run_focus(storage, skill, attrs),
    }
}

// ============================================================================
// Profile & Skill Views
// ============================================================================

fn show_profile(storage: Arc<JsonFileStorage>) -> Result<()> {
    let app = AppService::load(storage);
    let profile = app.profile();

    println!("{}", profile.name);
    println!();
    println!("Attributes:");
    for attribute in &profile.attributes {
        println!(
            "  {:<14} lvl {:>3}  {:>6.0}/{:<6.0} xp  [{}]",
            attribute.name,
            attribute.level,
            attribute.current_xp,
            attribute.current_xp + attribute.xp_to_next_level,
            attribute.id,
        );
    }

    let total_minutes: f64 = profile.sessions.iter().map(|s| s.focus_minutes_total).sum();
    let total_xp: f64 = profile.sessions.iter().map(|s| s.total_xp).sum();
    println!();
    println!(
        "Sessions: {}  |  Focus time: {:.1} h  |  XP earned: {:.0}",
        profile.sessions.len(),
        total_minutes / 60.0,
        total_xp,
    );

    Ok(())
}

fn show_skills(storage: Arc<JsonFileStorage>) -> Result<()> {
    let app = AppService::load(storage);
    let skills = &app.profile().skills;

    if skills.is_empty() {
        println!("No skills yet. Create one with: grind skill add <name>");
        return Ok(());
    }

    for skill in skills {
        let progress = match progression::tier_progress(skill.total_hours) {
            Some(p) => format!("{:.1}/{:.0} h to next tier", p.current, p.target),
            None => "mastered".to_string(),
        };
        println!(
            "  {:<14} {:<10} {:>7.1} h  ({progress})  [{}]",
            skill.name,
            skill.tier.label(),
            skill.total_hours,
            skill.id,
        );
    }

    Ok(())
}

// ============================================================================
// Mutations
// ============================================================================

fn manage_attr(storage: Arc<JsonFileStorage>, cmd: AttrCommand) -> Result<()> {
    let mut app = AppService::load(storage);
    match cmd {
        AttrCommand::Add { name } => {
            let id = app.create_attribute(name);
            println!("Created attribute [{id}]");
        }
        AttrCommand::Rm { id } => {
            let id = AttributeId::new(id);
            if app.delete_attribute(&id) {
                println!("Deleted attribute [{id}]");
            } else if id.is_protected() {
                println!("{id} is a permanent attribute and cannot be deleted.");
            } else {
                println!("No attribute with id [{id}]");
            }
        }
    }
    Ok(())
}

fn manage_skill(storage: Arc<JsonFileStorage>, cmd: SkillCommand) -> Result<()> {
    let mut app = AppService::load(storage);
    match cmd {
        SkillCommand::Add { name, image, attrs } => {
            let attribute_ids = attrs.into_iter().map(AttributeId::new).collect();
            let id = app.create_skill(name, image, attribute_ids);
            println!("Created skill [{id}]");
        }
        SkillCommand::Rm { id } => {
            let id = SkillId::new(id);
            if app.delete_skill(&id) {
                println!("Deleted skill [{id}]");
            } else {
                println!("No skill with id [{id}]");
            }
        }
    }
    Ok(())
}

// ============================================================================
// Focus Session
// ============================================================================

#[tokio::main]
async fn run_focus(
    storage: Arc<JsonFileStorage>,
    skill: Option<String>,
    attrs: Vec<String>,
) -> Result<()> {
    let storage: Arc<dyn Storage> = storage;
    let mut app = AppService::load(storage.clone());

    let skill_id = skill.map(SkillId::new);
    if let Some(id) = &skill_id {
        if app.profile().skill(id).is_none() {
            warn!(skill = %id, "Selected skill does not exist; hours will be dropped");
        }
    }
    let attribute_ids: Vec<AttributeId> = attrs.into_iter().map(AttributeId::new).collect();
    for id in &attribute_ids {
        if app.profile().attribute(id).is_none() {
            warn!(attribute = %id, "Selected attribute does not exist; its XP will be dropped");
        }
    }

    let handle = spawn_timer(storage);
    handle
        .set_selection(skill_id, attribute_ids)
        .await?;

    let mut events = handle.subscribe();
    handle.start().await?;
    info!("Focus session started");
    println!("Focus session running. Ctrl-C to stop and record.");

    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("Failed to listen for Ctrl-C");
        }
        shutdown_token.cancel();
    });

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,

            event = events.recv() => match event {
                Ok(TimerEvent::Tick { state }) => {
                    print!(
                        "\r[{}] {}  blocks: {}  focus: {:.1} min   ",
                        state.phase,
                        format_time(state.time_remaining),
                        state.focus_blocks_completed,
                        state.total_focus_minutes,
                    );
                    let _ = std::io::stdout().flush();
                }
                Ok(TimerEvent::PhaseChanged { phase }) => {
                    println!();
                    match phase {
                        TimerPhase::Focus => println!("Back to focus."),
                        TimerPhase::ShortBreak => println!("Short break - 5 minutes."),
                        TimerPhase::LongBreak => println!("Long break earned - 15 minutes."),
                    }
                }
                Ok(TimerEvent::SessionCompleted { .. }) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    println!();
    match handle.stop().await? {
        Some(session) => {
            let focus_minutes = session.focus_minutes_total;
            let skill_hours = session.skill_id.is_some().then(|| session.focus_hours());
            let award = app.complete_session(session);
            print_summary(focus_minutes, skill_hours, &award);
        }
        None => println!("No session to report."),
    }

    Ok(())
}

fn print_summary(focus_minutes: f64, skill_hours: Option<f64>, award: &XpAward) {
    println!("Session complete!");
    println!("  Focus time:  {focus_minutes:.1} min");
    if let Some(hours) = skill_hours {
        println!("  Skill hours: {hours:.1}");
    }
    println!("  Base XP:     {:.0}", award.breakdown.base_focus_xp);
    println!("  Streak XP:   {:.0}", award.breakdown.streak_bonus_xp);
    if award.breakdown.accelerated_bonus_xp > 0.0 {
        println!("  Streak XP+:  {:.0}", award.breakdown.accelerated_bonus_xp);
    }
    println!("  Total XP:    {:.0}", award.total_xp);
}
