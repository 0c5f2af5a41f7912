//! CLI glue for tunnel-link: argument parsing, wiring the real GitHub client
//! and terminal prompter into [`tunnel_link_core::update::update_link`], and
//! turning the report into user-facing output.
//!
//! All domain logic lives in `tunnel-link-core`.
use crate::load_config::{env_credential, load_config};
use crate::prompt::TerminalPrompter;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tunnel_link_core::github::GitHubClient;
use tunnel_link_core::update::{update_link, Progress};

/// Publish the current Cloudflare quick-tunnel URL into a GitHub-hosted manifest.json.
#[derive(Parser, Debug)]
#[clap(
    name = "tunnel-link",
    version,
    about = "Find the live trycloudflare.com URL in the tunnel log and publish it as app_url"
)]
pub struct Cli {
    /// Optional YAML config file; environment variables override its values
    #[clap(long)]
    pub config: Option<PathBuf>,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    println!("== Update tunnel link -> GitHub manifest.json ==");
    let config = load_config(cli.config.as_deref())?;
    let api = GitHubClient::new(config.api_url.clone()).map_err(anyhow::Error::msg)?;

    let result = update_link(
        &config,
        &api,
        &TerminalPrompter,
        env_credential(),
        |step| match step {
            Progress::UrlDetected(url) => println!("Tunnel URL detected in log: {url}"),
            Progress::LocalManifestSaved(path) => {
                println!("Local file {} updated.", path.display())
            }
        },
    )
    .await;
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Update failed");
            return Err(anyhow::Error::new(e));
        }
    };

    if report.outcome.is_success() {
        println!("Remote manifest updated successfully.");
        println!(
            "Done: {}/{} now points at {}. Wait a few seconds and reload the app on the phone.",
            config.target.repo, config.target.path, report.url
        );
        Ok(())
    } else {
        // A rejected write still ends the run normally; only the message reports it.
        tracing::error!(outcome = %report.outcome, "Remote manifest not updated");
        eprintln!("Error updating the remote manifest: {}", report.outcome);
        Ok(())
    }
}
