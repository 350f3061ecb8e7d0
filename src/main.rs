//! sv-deck CLI
//!
//! Serve the deck resolution API, or resolve a single deck from the command line.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgGroup, Args, Parser, Subcommand};

use shadowverse_deck::{config, server, DeckParams, DeckResolver, Result};

#[derive(Parser)]
#[command(name = "sv-deck")]
#[command(about = "Resolve Shadowverse: Worlds Beyond deck URLs and deck codes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Upstream settings shared by every command.
#[derive(Args, Clone)]
struct UpstreamArgs {
    /// Base URL of the upstream site
    #[arg(long, env = "SV_DECK_UPSTREAM", default_value = config::UPSTREAM_BASE)]
    upstream: String,

    /// Upstream request timeout in seconds
    #[arg(
        long,
        env = "SV_DECK_TIMEOUT_SECS",
        default_value_t = config::DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: u64,
}

impl UpstreamArgs {
    fn resolver(&self) -> Result<DeckResolver> {
        DeckResolver::builder()
            .upstream_base(&self.upstream)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "SV_DECK_ADDR", default_value = config::DEFAULT_BIND_ADDR)]
        addr: String,

        #[command(flatten)]
        upstream: UpstreamArgs,
    },

    /// Resolve one deck and print its summary as JSON
    #[command(group(ArgGroup::new("source").required(true).multiple(false)))]
    Resolve {
        /// Deck URL (legacy deck pages are rewritten automatically)
        #[arg(long, group = "source")]
        url: Option<String>,

        /// Deck code
        #[arg(long, group = "source")]
        deck_code: Option<String>,

        /// Language code (cht, chs, en, ja, ko); overrides the URL's language
        #[arg(long)]
        lang: Option<String>,

        /// User-Agent header sent upstream
        #[arg(long, alias = "user-agent", default_value = config::DEFAULT_USER_AGENT)]
        ua: String,

        /// Write the summary to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        upstream: UpstreamArgs,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { addr, upstream } => run_serve(&addr, &upstream).await,
        Commands::Resolve {
            url,
            deck_code,
            lang,
            ua,
            output,
            upstream,
        } => {
            let params = DeckParams {
                url,
                deck_code,
                lang,
                ua: Some(ua),
            };
            run_resolve(params, output, &upstream).await
        }
    }
}

async fn run_serve(addr: &str, upstream: &UpstreamArgs) -> Result<()> {
    let resolver = upstream.resolver()?;
    log::info!("{resolver}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::serve(listener, resolver, shutdown_signal()).await?;
    Ok(())
}

async fn run_resolve(
    params: DeckParams,
    output: Option<PathBuf>,
    upstream: &UpstreamArgs,
) -> Result<()> {
    let request = params.resolve()?;
    let resolver = upstream.resolver()?;
    let deck = resolver.resolve(&request).await?;
    log::info!("resolved deck with {} cards", deck.card_count());
    let rendered = serde_json::to_string_pretty(&deck).map_err(std::io::Error::from)?;
    match output {
        Some(path) => {
            fs::write(&path, rendered + "\n")?;
            log::info!("wrote deck summary to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{spawn_upstream, StubResponse};
    use clap::error::ErrorKind;
    use serde_json::{json, Value};

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("sv-deck").chain(args.iter().copied()))
    }

    // -----------------------------------------------------------------------
    // Argument parsing
    // -----------------------------------------------------------------------

    #[test]
    fn resolve_requires_a_source() {
        let err = parse(&["resolve"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn resolve_rejects_url_and_deck_code_together() {
        let err = parse(&["resolve", "--url", "https://example.com", "--deck-code", "Ab1C"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn resolve_defaults_user_agent() {
        let cli = parse(&["resolve", "--deck-code", "Ab1C"]).unwrap();
        match cli.command {
            Commands::Resolve {
                deck_code, ua, output, ..
            } => {
                assert_eq!(deck_code.as_deref(), Some("Ab1C"));
                assert_eq!(ua, "Mozilla/5.0");
                assert!(output.is_none());
            }
            Commands::Serve { .. } => panic!("expected resolve"),
        }
    }

    #[test]
    fn user_agent_alias_is_accepted() {
        let cli = parse(&["resolve", "--url", "x", "--user-agent", "Agent/2"]).unwrap();
        assert!(matches!(cli.command, Commands::Resolve { ua, .. } if ua == "Agent/2"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(parse(&["resolve", "--deck-code", "Ab1C", "--timeout-secs", "0"]).is_err());
        assert!(parse(&["resolve", "--deck-code", "Ab1C", "--timeout-secs", "1"]).is_ok());
    }

    // -----------------------------------------------------------------------
    // resolve -o
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn resolve_writes_summary_to_output_file() {
        let stub = spawn_upstream(StubResponse::json(json!({
            "data": { "num_follower": 32, "deck_card_num": { "100": 3, "200": 2 } }
        })))
        .await;
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("deck.json");

        let cli = parse(&[
            "resolve",
            "--deck-code",
            "Ab1C",
            "-o",
            out.to_str().unwrap(),
            "--upstream",
            &stub.base,
        ])
        .unwrap();
        run(cli).await.unwrap();

        let written = fs::read_to_string(&out).unwrap();
        assert!(written.ends_with('\n'));
        let deck: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(deck["num_follower"], 32);
        assert_eq!(deck["class_id"], 5);
        assert_eq!(deck["deck_card_num"], json!({ "100": 3, "200": 2 }));

        let request = stub.only_request();
        assert_eq!(request.target, "/web/DeckCode/getDeck");
        assert_eq!(request.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[tokio::test]
    async fn resolve_failure_leaves_no_output_file() {
        let stub = spawn_upstream(StubResponse::json(json!([1, 2]))).await;
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("deck.json");

        let cli = parse(&[
            "resolve",
            "--deck-code",
            "Ab1C",
            "-o",
            out.to_str().unwrap(),
            "--upstream",
            &stub.base,
        ])
        .unwrap();
        assert!(run(cli).await.is_err());
        assert!(!out.exists());
    }
}
