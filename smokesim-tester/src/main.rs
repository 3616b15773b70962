mod common;
mod logic;
mod realtime;
mod storage;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use common::{run_label, split_csv};
use logic::{LifeTester, LifestylePolicy, PolicyReport, SeedInfo, resolve_seed_inputs};
use realtime::{RealtimeOptions, run_realtime};
use smokesim_game::{SimConfig, SimRules};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Accelerated lives on a virtual clock (fast, deterministic)
    Batch,
    /// One persisted life on the wall clock
    Realtime,
}

#[derive(Debug, Parser)]
#[command(name = "smokesim-tester", version = "0.1.0")]
#[command(about = "Headless driver and balance QA for the Smokesim lifespan simulation")]
struct Args {
    /// Run mode: batch (virtual clock) or realtime (wall clock, persisted)
    #[arg(long, value_enum, default_value_t = RunMode::Batch)]
    mode: RunMode,

    /// Lifestyles to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    policies: String,

    /// List all available lifestyles and exit
    #[arg(long)]
    list_policies: bool,

    /// Seeds to run (comma-separated integers, "now", or any phrase)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Lives per lifestyle and seed (batch mode only)
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Abandon a batch life after this many virtual minutes
    #[arg(long)]
    limit_minutes: Option<u32>,

    /// Virtual milliseconds between two policy decisions (batch mode only)
    #[arg(long)]
    decision_ms: Option<i64>,

    /// JSON file overriding the simulation tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    // Realtime-specific options
    /// Virtual time multiplier - realtime mode only
    #[arg(long, default_value_t = 1.0, value_parser = parse_speed)]
    speed: f64,

    /// Stop the realtime session after this many seconds
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Directory holding the realtime save file
    #[arg(long, default_value = "target/smokesim-saves")]
    save_dir: PathBuf,

    /// Discard any saved life before starting
    #[arg(long)]
    fresh: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_policies(&args)? {
        return Ok(());
    }

    announce_banner();

    let rules = load_rules(args.config.as_ref())?;
    let policies = expand_policies(&args.policies)?;
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;

    match args.mode {
        RunMode::Batch => {
            let start_time = Instant::now();
            let reports = run_batch(&args, rules, &policies, &seed_infos);
            write_reports(&args, &reports, start_time)?;
            if reports.iter().any(|r| !r.passed) {
                std::process::exit(1);
            }
        }
        RunMode::Realtime => {
            let options = RealtimeOptions {
                policy: policies[0],
                seed: seed_infos[0].seed,
                speed: args.speed,
                duration: args.duration_secs.map(Duration::from_secs),
                save_dir: args.save_dir.clone(),
                fresh: args.fresh,
                frame: Duration::from_millis(100),
            };
            let mut output_target = OutputTarget::new(None)?;
            let summary = run_realtime(rules, &options, output_target.writer()).await?;
            writeln!(
                output_target.writer(),
                "{} real {}y, bio {}y, {} packs, cause: {}",
                summary.headline.bold(),
                summary.real_age_years,
                summary.bio_age_years,
                summary.packs_consumed,
                summary.cause_name()
            )?;
            output_target.flush_inner()?;
        }
    }

    Ok(())
}

fn maybe_list_policies(args: &Args) -> Result<bool> {
    if !args.list_policies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available lifestyles:")?;
    for policy in LifestylePolicy::ALL {
        writeln!(
            output_target.writer(),
            "  {:15} - {}",
            policy.key(),
            policy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🚬 Smokesim Lifestyle Tester".bright_cyan().bold());
    println!("{}", "============================".cyan());
}

fn load_rules(path: Option<&PathBuf>) -> Result<SimRules> {
    let Some(path) = path else {
        return Ok(SimRules::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = SimConfig::from_json(&raw)
        .with_context(|| format!("invalid simulation config in {}", path.display()))?;
    Ok(SimRules::new(config))
}

const MAX_SPEED: f64 = 1_000_000.0;

fn parse_speed(raw: &str) -> Result<f64, String> {
    let speed: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if !speed.is_finite() || speed <= 0.0 || speed > MAX_SPEED {
        return Err(format!("speed must be above 0 and at most {MAX_SPEED}"));
    }
    Ok(speed)
}

fn expand_policies(policies_arg: &str) -> Result<Vec<LifestylePolicy>> {
    let mut policies = Vec::new();
    for key in split_csv(policies_arg) {
        if key.eq_ignore_ascii_case("all") {
            policies.extend(LifestylePolicy::ALL);
            continue;
        }
        match LifestylePolicy::from_key(&key) {
            Some(policy) => policies.push(policy),
            None => bail!("Unknown lifestyle: {key}"),
        }
    }
    policies.sort();
    policies.dedup();
    if policies.is_empty() {
        bail!("No lifestyles selected");
    }
    Ok(policies)
}

fn run_batch(
    args: &Args,
    rules: SimRules,
    policies: &[LifestylePolicy],
    seed_infos: &[SeedInfo],
) -> Vec<PolicyReport> {
    println!(
        "{} {}",
        "🧠 Running Lifestyle Batch".bright_yellow().bold(),
        run_label(Utc::now())
    );
    println!("{}", "-".repeat(30).yellow());
    for info in seed_infos {
        match &info.label {
            Some(label) => println!("🌱 Seed {} (from {label:?})", info.seed),
            None => println!("🌱 Seed {}", info.seed),
        }
    }
    let seeds: Vec<u64> = seed_infos.iter().map(|s| s.seed).collect();

    let tester = LifeTester::new(rules, args.verbose)
        .with_decision_interval(args.decision_ms)
        .with_limit(args.limit_minutes.map(|m| i64::from(m) * 60_000));

    policies
        .iter()
        .map(|&policy| tester.run_policy(policy, &seeds, args.iterations).0)
        .collect()
}

fn write_reports(args: &Args, reports: &[PolicyReport], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, reports)?,
        "markdown" => logic::reports::generate_markdown_report(&mut output_target, reports)?,
        _ => {
            let duration = start_time.elapsed();
            logic::reports::generate_console_report(&mut output_target, reports, duration)?;
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
