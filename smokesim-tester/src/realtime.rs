use anyhow::{Context, Result};
use chrono::Utc;
use colored::{ColoredString, Colorize};
use log::info;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use smokesim_game::{
    BodyCondition, EffectCue, RunSummary, Severity, SimEngine, SimEvent, SimRules,
    SimSession,
};

use crate::logic::LifestylePolicy;
use crate::storage::FileStorage;

/// Settings for a wall-clock session.
#[derive(Debug, Clone)]
pub struct RealtimeOptions {
    pub policy: LifestylePolicy,
    pub seed: u64,
    /// Virtual milliseconds per real millisecond.
    pub speed: f64,
    /// Stop after this much real time; `None` runs until death or Ctrl-C.
    pub duration: Option<Duration>,
    pub save_dir: PathBuf,
    pub fresh: bool,
    pub frame: Duration,
}

/// Drive one persisted life on the wall clock, printing events as they happen.
///
/// The session is saved on every exit path, including Ctrl-C.
pub async fn run_realtime(
    rules: SimRules,
    options: &RealtimeOptions,
    out: &mut dyn Write,
) -> Result<RunSummary> {
    let engine = SimEngine::with_rules(FileStorage::new(&options.save_dir), rules);
    if options.fresh {
        engine
            .delete_state()
            .with_context(|| format!("clearing save in {}", options.save_dir.display()))?;
    }

    let origin_ms = Utc::now().timestamp_millis();
    let mut session = engine.resume_session(options.seed, origin_ms);
    let mut policy = options.policy.create_policy(options.seed);
    writeln!(
        out,
        "{} {} at {} (speed ×{})",
        "▶".bright_green(),
        options.policy.label().bold(),
        status_line(&session),
        options.speed
    )?;

    if session.state().is_terminal {
        writeln!(out, "This life already ended. Run with --fresh to start over.")?;
        return Ok(RunSummary::from_state(session.state()));
    }

    let started = tokio::time::Instant::now();
    let mut frame = tokio::time::interval(options.frame);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = frame.tick() => {}
            _ = &mut ctrl_c => {
                info!("interrupted, saving session");
                writeln!(out, "{}", "⏹ interrupted".yellow())?;
                break;
            }
        }

        let elapsed = started.elapsed();
        let now_ms = virtual_now_ms(origin_ms, elapsed, options.speed);
        for event in session.advance_to(now_ms) {
            print_event(out, &event)?;
        }
        if !session.state().is_terminal
            && let Some(intent) = policy.decide(session.state(), now_ms)
        {
            for event in session.dispatch(intent).events {
                print_event(out, &event)?;
            }
        }

        if session.state().is_terminal {
            break;
        }
        if options.duration.is_some_and(|limit| elapsed >= limit) {
            break;
        }
    }

    session.shutdown();
    engine
        .save_state(session.state())
        .context("persisting realtime session")?;
    writeln!(out, "{} {}", "■".bright_red(), status_line(&session))?;
    writeln!(out, "Saved to {}", engine.storage().dir().display())?;
    Ok(RunSummary::from_state(session.state()))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn virtual_elapsed_ms(elapsed: Duration, speed: f64) -> i64 {
    (elapsed.as_millis() as f64 * speed.max(0.0)).round() as i64
}

/// Session clock for a wall-clock offset; pins at `i64::MAX` instead of wrapping.
fn virtual_now_ms(origin_ms: i64, elapsed: Duration, speed: f64) -> i64 {
    origin_ms.saturating_add(virtual_elapsed_ms(elapsed, speed))
}

fn status_line(session: &SimSession) -> String {
    let state = session.state();
    format!(
        "real {}y bio {}y | stamina {:.0} toxicity {:.0} addiction {:.0} hunger {:.0} | {}",
        state.real_age_years(),
        state.bio_age_years(),
        state.stamina,
        state.toxicity_level,
        state.addiction_level,
        state.hunger_level,
        BodyCondition::of(state)
    )
}

fn describe(event: &SimEvent) -> Option<ColoredString> {
    let line = match event {
        SimEvent::Feedback(feedback) => {
            let text = format!("💬 {}", feedback.message.text);
            match feedback.severity {
                Severity::Info => text.normal(),
                Severity::Warning => text.yellow(),
            }
        }
        SimEvent::Effect(EffectCue::Vibrate { .. }) | SimEvent::FeedbackCleared => return None,
        SimEvent::Effect(cue) => format!("   ~ {cue:?}").dimmed(),
        SimEvent::Collapsed { recover_after_ms } => {
            format!("💫 Collapsed, recovering in {recover_after_ms}ms").red()
        }
        SimEvent::Recovered => "🌬  Recovered".green(),
        SimEvent::Died { cause } => format!("☠  {}: {}", cause.name, cause.description)
            .red()
            .bold(),
        SimEvent::Reset => "🌱 New life".cyan(),
    };
    Some(line)
}

fn print_event(out: &mut dyn Write, event: &SimEvent) -> std::io::Result<()> {
    match describe(event) {
        Some(line) => writeln!(out, "{line}"),
        None => Ok(()),
    }
}
