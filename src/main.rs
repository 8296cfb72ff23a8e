mod archive_client;
mod audio_asset;
mod cli;
mod front_matter;
mod post_discovery;
mod post_identifier;
mod post_pipeline;

use std::path::Path;

use clap::{CommandFactory, Parser};
use log::{error, info};

use archive_client::ArchiveClient;
use cli::Cli;
use post_pipeline::{process_post, PipelineOptions, PostOutcome};

fn write_report(outcomes: &[PostOutcome], report_path: &Path) {
    match serde_json::to_string_pretty(outcomes) {
        Ok(report_text) => {
            if let Err(err) = std::fs::write(report_path, report_text) {
                error!("Failed to write report to {}: {}", report_path.display(), err);
            } else {
                info!("Wrote report to {}", report_path.display());
            }
        }
        Err(err) => error!("Failed to serialize report: {}", err),
    }
}

fn main() {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Info);
    clog.init();

    let args = Cli::parse();

    let targets = if args.all {
        post_discovery::find_radioshow_posts(Path::new(post_discovery::POSTS_DIR))
    } else if let Some(post) = args.post.clone() {
        vec![post]
    } else {
        let _ = Cli::command().print_help();
        std::process::exit(2);
    };

    let client = ArchiveClient::new(args.timeout, args.retries);
    let options = PipelineOptions {
        identifier_override: args.id.clone(),
        dry_run: args.dry_run,
        backup: args.backup,
        head_fallback: args.head_fallback,
    };

    let mut all_succeeded = true;
    let mut outcomes = Vec::with_capacity(targets.len());
    for target in &targets {
        let outcome = process_post(target, &options, &client);
        if !outcome.success {
            all_succeeded = false;
        }
        outcomes.push(outcome);
    }

    if let Some(report_path) = &args.report {
        write_report(&outcomes, report_path);
    }

    std::process::exit(if all_succeeded { 0 } else { 1 });
}
