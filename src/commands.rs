use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{error, info, warn};

use filemerge::config::Config;
use filemerge::engine::TokioEngineRunner;
use filemerge::job::MergeJobSpec;
use filemerge::merge::{MergeError, MergeService, resolve_checked};
use filemerge::naming::NamingConvention;
use filemerge::selector::{Selector, SelectorKind};

use crate::cli::{MergeArgs, ResolveArgs, SelectorArgs};

type CommandResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn selector(args: &SelectorArgs) -> Result<Selector, MergeError> {
    let reference_date: NaiveDate = args
        .reference_date
        .unwrap_or_else(|| Local::now().date_naive());
    Ok(Selector::from_params(args.params(), reference_date)?)
}

pub async fn merge(config: &Config, args: MergeArgs) -> CommandResult {
    let selector = selector(&args.selector)?;
    let spec = MergeJobSpec::builder()
        .topic(args.topic)
        .input_prefix(args.input_prefix)
        .output_prefix(args.output_prefix)
        .queue(args.queue)
        .reducer_count(args.num_reducers.unwrap_or(config.job.default_reducers))
        .maybe_codec(args.codec)
        .dry_run(args.dry_run)
        .build();

    let service = MergeService::from_config(config, Arc::new(TokioEngineRunner::new()))?;

    let report = tokio::select! {
        report = service.execute_report(&selector, &spec, args.selector.validate_names) => report?,
        _ = shutdown_signal() => {
            return Err("merge interrupted; the in-flight engine run was killed".into());
        }
    };

    for outcome in report.outcomes() {
        match &outcome.result {
            Ok(result) if result.dry_run => {
                info!(directory = %outcome.directory, path = %result.script_path.display(), "Dry run");
            }
            Ok(_) => info!(directory = %outcome.directory, "Merged"),
            Err(err) => error!(directory = %outcome.directory, error = %err, "Failed"),
        }
    }

    if !report.is_success() {
        return Err(MergeError::JobsFailed {
            failed: report.failed(),
            total: report.total(),
        }
        .into());
    }

    // Dry-run documents go to stdout so they can be piped or diffed
    if spec.dry_run() {
        for outcome in report.outcomes() {
            if let Ok(result) = &outcome.result {
                println!("{}", result.script_path.display());
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct Resolved<'a> {
    kind: SelectorKind,
    directories: &'a [String],
}

pub fn resolve(config: &Config, args: ResolveArgs) -> CommandResult {
    let selector = selector(&args.selector)?;
    let convention = NamingConvention::from_config(&config.naming)?;
    let directories = resolve_checked(&selector, &convention, args.selector.validate_names)?;

    if directories.is_empty() {
        warn!("Selector resolved to no directories");
    }

    if args.json {
        let resolved = Resolved {
            kind: directories.kind(),
            directories: directories.names(),
        };
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else {
        for name in &directories {
            println!("{name}");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
