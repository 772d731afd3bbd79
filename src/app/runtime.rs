use std::io::{self, BufRead, IsTerminal};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use plucker_core::{Config, Dispatcher, InboundMessage};
use tracing::{debug, info, warn};

use crate::ProcessExit;
use crate::app::directory_sink::DirectorySink;
use crate::app::exit_handler::RunTally;
use crate::app::terminal;
use crate::cli::Args;

pub(crate) async fn run() -> Result<ProcessExit> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // .env must be loaded before the subscriber reads RUST_LOG
    let dotenv = dotenvy::dotenv();
    terminal::init_tracing(terminal::default_log_level(args.verbose, args.quiet));
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => debug!("no .env file, using process environment"),
        Err(e) => warn!(error = %e, "failed to load .env, using process environment"),
    }

    debug!(?args, "CLI arguments parsed");
    info!("Plucker starting");

    let config = resolve_config(&args)?;

    let messages = read_messages(&args)?;
    if messages.is_empty() {
        info!("No input provided. Pass messages as arguments or pipe them via stdin.");
        info!("Example: echo 'https://www.tiktok.com/@x/video/1' | plucker");
        return Ok(ProcessExit::Success);
    }

    let sink = DirectorySink::new(&args.output_dir, !args.json)
        .await
        .with_context(|| format!("failed to create output directory {}", args.output_dir.display()))?;
    let dispatcher = Dispatcher::new(config, Arc::new(sink));
    dispatcher
        .prepare()
        .await
        .context("failed to prepare workspace")?;

    let mut tally = RunTally::default();
    for (index, content) in messages.iter().enumerate() {
        let message = InboundMessage::new(
            format!("{}-{}", args.message_id_prefix, index + 1),
            &args.channel_id,
            content,
        );
        let report = dispatcher.handle_message(&message).await;
        tally.record(&report);
        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        }
    }

    info!(
        delivered = tally.delivered,
        failed = tally.failed,
        skipped = tally.skipped,
        aborted = tally.aborted,
        messages = messages.len(),
        "Run complete"
    );
    Ok(tally.outcome())
}

/// Environment first, then CLI flags on top.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = Config::from_env();
    if let Some(max_size_mb) = args.max_size_mb {
        config.max_file_size_mb = max_size_mb;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.download_timeout = Duration::from_secs(timeout_secs);
    }
    if let Some(workspace) = &args.workspace {
        config.workspace_dir.clone_from(workspace);
    }
    if let Some(program) = &args.fetch_program {
        config.fetch_program.clone_from(program);
    }
    config.validate()?;
    debug!(?config, "configuration resolved");
    Ok(config)
}

/// Positional messages, or one message per non-empty stdin line.
fn read_messages(args: &Args) -> Result<Vec<String>> {
    if !args.messages.is_empty() {
        return Ok(args.messages.clone());
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(Vec::new());
    }
    let mut messages = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        if !line.trim().is_empty() {
            messages.push(line);
        }
    }
    Ok(messages)
}
