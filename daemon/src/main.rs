//! ballot: replay scripted elections and inspect election snapshots.

mod config;
mod error;
mod script;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;

use ballot_election::{
    ElectionEvent, ElectionLedger, ElectionSnapshot, EventBus, WhitelistPolicy,
};
use ballot_types::{AccountId, WorkflowStatus};
use ballot_utils::LogFormat;

use crate::config::DaemonConfig;
use crate::error::DaemonError;
use crate::script::{Script, StepOutcome};

#[derive(Parser)]
#[command(name = "ballot", about = "Single-authority election ledger")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "BALLOT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BALLOT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BALLOT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Print results as JSON lines instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a scripted election against a fresh ledger.
    Run {
        /// TOML script: `administrator` plus `[[step]]` tables.
        script: PathBuf,

        /// Write the final snapshot here (overrides `snapshot_path`).
        #[arg(long, env = "BALLOT_SNAPSHOT")]
        snapshot: Option<PathBuf>,

        /// Continue past rejected steps.
        #[arg(long)]
        keep_going: bool,

        /// Only accept whitelisting while registering voters.
        #[arg(long)]
        registration_only: bool,

        /// Print the full event journal after the step results.
        #[arg(long)]
        journal: bool,
    },
    /// Verify a snapshot file and print the election it holds.
    Inspect {
        snapshot: PathBuf,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DaemonConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    ballot_utils::init_logging(config.log_format, &config.log_level);

    match cli.command {
        Command::Run {
            script,
            snapshot,
            keep_going,
            registration_only,
            journal,
        } => {
            if registration_only {
                config.whitelist_policy = WhitelistPolicy::RegistrationOnly;
            }
            if keep_going {
                config.stop_on_error = false;
            }
            if snapshot.is_some() {
                config.snapshot_path = snapshot;
            }
            run(&script, &config, journal, cli.json)
        }
        Command::Inspect { snapshot } => inspect(&snapshot, cli.json),
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

// ── run ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StepLine<'a> {
    step: usize,
    caller: &'a AccountId,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<&'a ElectionEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct JournalLine<'a> {
    journal: usize,
    #[serde(flatten)]
    event: &'a ElectionEvent,
}

/// Bus for a replayed election: every journaled event is logged, and
/// printed too when `print` is set.
fn journal_bus(print: bool, json: bool) -> EventBus {
    let mut bus = EventBus::new();
    bus.subscribe(|event: &ElectionEvent| {
        tracing::debug!(event = event.name(), "journal");
    });
    if print {
        let position = std::sync::atomic::AtomicUsize::new(0);
        bus.subscribe(move |event: &ElectionEvent| {
            let n = position.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
            if json {
                match serde_json::to_string(&JournalLine { journal: n, event }) {
                    Ok(line) => println!("{line}"),
                    Err(error) => tracing::warn!(error = %error, "journal line not encoded"),
                }
            } else {
                println!("<{n:>3}> {}", describe(event));
            }
        });
    }
    bus
}

fn run(
    script_path: &Path,
    config: &DaemonConfig,
    journal: bool,
    json: bool,
) -> anyhow::Result<()> {
    let script = Script::from_toml_file(script_path)?;
    tracing::info!(
        script = %script_path.display(),
        administrator = %script.administrator,
        steps = script.steps.len(),
        policy = ?config.whitelist_policy,
        "replaying election script"
    );

    let mut ledger =
        ElectionLedger::with_policy(script.administrator.clone(), config.whitelist_policy);
    let outcomes = script.replay(&mut ledger, config.stop_on_error);
    for outcome in &outcomes {
        print_outcome(outcome, json)?;
    }
    let published = journal_bus(journal, json).drain_from(&mut ledger);
    tracing::info!(events = published, "journal published");

    if let Some(path) = &config.snapshot_path {
        let bytes = ledger.snapshot().to_bytes().map_err(DaemonError::from)?;
        std::fs::write(path, bytes)
            .map_err(DaemonError::from)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        tracing::info!(path = %path.display(), "snapshot written");
    }

    print_summary(&ledger.snapshot(), json)?;

    let first_rejection = outcomes
        .into_iter()
        .find_map(|o| o.result.err().map(|source| (o.step, source)));
    match first_rejection {
        Some((step, source)) if config.stop_on_error => {
            Err(DaemonError::StepRejected { step, source }.into())
        }
        _ => Ok(()),
    }
}

fn print_outcome(outcome: &StepOutcome, json: bool) -> anyhow::Result<()> {
    if json {
        let line = StepLine {
            step: outcome.step,
            caller: &outcome.caller,
            event: outcome.result.as_ref().ok(),
            error: outcome.result.as_ref().err().map(|e| e.to_string()),
        };
        println!("{}", serde_json::to_string(&line)?);
        return Ok(());
    }
    match &outcome.result {
        Ok(event) => println!("[{:>3}] {} -> {}", outcome.step, outcome.caller, describe(event)),
        Err(error) => println!("[{:>3}] {} -> REJECTED: {error}", outcome.step, outcome.caller),
    }
    Ok(())
}

fn describe(event: &ElectionEvent) -> String {
    match event {
        ElectionEvent::VoterRegistered { voter } => format!("VoterRegistered({voter})"),
        ElectionEvent::WorkflowStatusChange {
            previous_status,
            new_status,
        } => format!(
            "WorkflowStatusChange({} -> {})",
            previous_status.as_u8(),
            new_status.as_u8()
        ),
        ElectionEvent::ProposalsRegistrationStarted
        | ElectionEvent::ProposalsRegistrationEnded
        | ElectionEvent::VotingSessionStarted
        | ElectionEvent::VotingSessionEnded => event.name().to_string(),
        ElectionEvent::ProposalRegistered { proposal_id } => {
            format!("ProposalRegistered({proposal_id})")
        }
        ElectionEvent::Voted { voter, proposal_id } => format!("Voted({voter}, {proposal_id})"),
        ElectionEvent::VotesTallied {
            winning_proposal_id,
        } => format!("VotesTallied(winner {winning_proposal_id})"),
    }
}

// ── inspect ────────────────────────────────────────────────────────────

fn inspect(path: &Path, json: bool) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading snapshot {}", path.display()))?;
    let snapshot = ElectionSnapshot::from_bytes(&bytes).map_err(DaemonError::from)?;
    // Full validation, not just the hash.
    let ledger = ElectionLedger::restore(snapshot)
        .with_context(|| format!("validating snapshot {}", path.display()))?;
    print_summary(&ledger.snapshot(), json)
}

#[derive(Serialize)]
struct Summary<'a> {
    hash: String,
    administrator: &'a AccountId,
    status: WorkflowStatus,
    whitelist: Vec<&'a AccountId>,
    voted: usize,
    proposals: Vec<ProposalLine<'a>>,
    winning_proposal_id: Option<u32>,
}

#[derive(Serialize)]
struct ProposalLine<'a> {
    id: usize,
    description: &'a str,
    vote_count: u32,
}

fn print_summary(snapshot: &ElectionSnapshot, json: bool) -> anyhow::Result<()> {
    if !snapshot.verify() {
        bail!("snapshot hash mismatch");
    }
    let summary = Summary {
        hash: hex::encode(snapshot.hash),
        administrator: &snapshot.administrator,
        status: snapshot.status,
        whitelist: snapshot.voters.iter().map(|e| &e.account).collect(),
        voted: snapshot.voters.iter().filter(|e| e.voter.has_voted).count(),
        proposals: snapshot
            .proposals
            .iter()
            .enumerate()
            .map(|(id, p)| ProposalLine {
                id,
                description: &p.description,
                vote_count: p.vote_count,
            })
            .collect(),
        winning_proposal_id: (!snapshot.proposals.is_empty())
            .then_some(snapshot.winning_proposal_id),
    };

    if json {
        println!("{}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    println!("snapshot      {}", summary.hash);
    println!("administrator {}", summary.administrator);
    println!("status        {} ({})", summary.status, summary.status.as_u8());
    println!(
        "whitelist     {} voters, {} voted",
        summary.whitelist.len(),
        summary.voted
    );
    for account in &summary.whitelist {
        println!("  - {account}");
    }
    println!("proposals     {}", summary.proposals.len());
    for p in &summary.proposals {
        let marker = if Some(p.id as u32) == summary.winning_proposal_id {
            "*"
        } else {
            " "
        };
        println!("  {marker}[{}] {:>4} votes  {}", p.id, p.vote_count, p.description);
    }
    match summary.winning_proposal_id {
        Some(id) => println!("winner        {id}"),
        None => println!("winner        none"),
    }
    Ok(())
}
