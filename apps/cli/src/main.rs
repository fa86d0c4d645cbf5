#![deny(warnings)]

//! Headless CLI: plays one full game from a financial snapshot and a decision plan.

use anyhow::{bail, Context, Result};
use data_pipeline::MarketIndicators;
use serde::Deserialize;
use sim_core::{format_usd, FinancialSnapshot, Industry, Intensity, Mode, Role};
use sim_runtime::{GameSummary, Session, SessionConfig};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Normalized snapshot file: optional identity, the financial figures and
/// optional raw market indicators.
#[derive(Debug, Default, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    ticker: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(flatten)]
    financials: FinancialSnapshot,
    #[serde(default)]
    indicators: Option<MarketIndicators>,
}

/// Decision plan: per-turn list of actions, played in order.
#[derive(Debug, Default, Deserialize)]
struct Plan {
    #[serde(default)]
    mode: Option<Mode>,
    #[serde(default)]
    industry: Option<Industry>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    turns: Vec<PlannedTurn>,
}

#[derive(Debug, Default, Deserialize)]
struct PlannedTurn {
    #[serde(default)]
    actions: Vec<PlannedAction>,
}

#[derive(Debug, Deserialize)]
struct PlannedAction {
    role: String,
    action: String,
    #[serde(default = "default_intensity")]
    intensity: u8,
}

fn default_intensity() -> u8 {
    Intensity::DEFAULT.get()
}

#[derive(Debug, Default)]
struct Args {
    snapshot: Option<PathBuf>,
    plan: Option<PathBuf>,
    ticker: Option<String>,
    company: Option<String>,
    industry: Option<Industry>,
    mode: Option<Mode>,
    seed: Option<u64>,
    version: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--snapshot" => out.snapshot = Some(it.next().context("--snapshot needs a path")?.into()),
            "--plan" => out.plan = Some(it.next().context("--plan needs a path")?.into()),
            "--ticker" => out.ticker = Some(it.next().context("--ticker needs a value")?),
            "--company" => out.company = Some(it.next().context("--company needs a value")?),
            "--industry" => {
                let v = it.next().context("--industry needs a value")?;
                out.industry = Some(v.parse()?);
            }
            "--mode" => {
                let v = it.next().context("--mode needs a value")?;
                out.mode = Some(v.parse()?);
            }
            "--seed" => {
                let v = it.next().context("--seed needs a value")?;
                out.seed = Some(v.parse().with_context(|| format!("invalid --seed {v}"))?);
            }
            "--version" => out.version = true,
            other => bail!("unknown argument {other}"),
        }
    }
    Ok(out)
}

fn load_snapshot(path: &Path) -> Result<SnapshotFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing snapshot {}", path.display()))
}

fn load_plan(path: &Path) -> Result<Plan> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading plan {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing plan {}", path.display()))
}

/// Menu label of a named action, or the raw name when the pair is unknown.
fn action_label<'a>(role: &str, action: &'a str) -> &'a str {
    role.parse::<Role>()
        .and_then(|r| r.action(action))
        .map_or(action, |kind| kind.label())
}

/// Play the plan to the end of the game, printing one line per turn.
fn play(session: &mut Session, plan: &Plan) -> Result<GameSummary> {
    let mut planned = plan.turns.iter();
    loop {
        if let Some(turn) = planned.next() {
            for a in &turn.actions {
                let intensity = Intensity::new(a.intensity)
                    .with_context(|| format!("turn {}: {} {}", session.turn(), a.role, a.action))?;
                let msg = session.execute_named(&a.role, &a.action, intensity);
                println!(
                    "  [{}] {} {}: {}",
                    session.turn(),
                    a.role,
                    action_label(&a.role, &a.action),
                    msg
                );
            }
        }
        let k = session.kpis();
        println!(
            "Turn {:>2} | cash: {} | revenue: {} | eff: {} | sat: {} | share: {}% | agents: {}",
            session.turn(),
            format_usd(k.cash),
            format_usd(k.revenue),
            k.efficiency,
            k.satisfaction,
            k.market_share,
            k.ai_agents
        );
        let outcome = session.advance_turn();
        if outcome.game_over {
            break;
        }
        if let Some(event) = session
            .events()
            .last()
            .filter(|e| Some(e.turn + 1) == outcome.turn)
        {
            println!("  !! {}", event.description);
        }
    }
    Ok(session.summary())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.version {
        println!(
            "cli {} ({} built {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }

    let file = match &args.snapshot {
        Some(p) => load_snapshot(p)?,
        None => SnapshotFile::default(),
    };
    let plan = match &args.plan {
        Some(p) => load_plan(p)?,
        None => Plan::default(),
    };
    let config = SessionConfig {
        ticker: args.ticker.or(file.ticker).unwrap_or_else(|| "DEMO".to_string()),
        company_name: args
            .company
            .or(file.company_name)
            .unwrap_or_else(|| "Demo Corp".to_string()),
        industry: args.industry.or(plan.industry).unwrap_or(Industry::Tech),
        mode: args.mode.or(plan.mode).unwrap_or(Mode::Traditional),
    };
    let seed = args.seed.or(plan.seed).unwrap_or(42);
    info!(ticker = %config.ticker, mode = %config.mode, seed, "starting game");
    println!(
        "{} ({}) | {} | {}",
        config.company_name,
        config.ticker,
        config.industry.label(),
        config.mode
    );

    if let Some(ind) = &file.indicators {
        let profile = data_pipeline::profile(ind);
        println!(
            "Profile | size: {:?} | volatility: {:?} | health: {:?} | risk: {:.1}",
            profile.company_size,
            profile.market_volatility,
            profile.financial_health,
            profile.crisis_probability
        );
    }

    let mut session = Session::seeded(config, &file.financials, seed);
    let summary = play(&mut session, &plan)?;
    println!(
        "Summary | {} {} | turns: {} | cash: {} | efficiency: {}% | employees: {} | crises: {}",
        summary.ticker,
        summary.mode,
        summary.turns_completed,
        format_usd(summary.final_cash),
        summary.final_efficiency,
        summary.final_employees,
        summary.crises
    );
    Ok(())
}
