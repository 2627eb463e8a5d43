//! Thin CLI entry point: wires a real terminal to the bijou-core TEA
//! runtime and runs a small demo application.
//!
//! This binary delegates all rendering and layout logic to
//! `bijou-core`; its own job is the crossterm-backed port
//! implementations and a handful of `clap` overrides layered in front
//! of the env-based `OutputMode`/theme detection.

mod backend;
mod demo;

use std::io::IsTerminal;

use bijou_core::runtime::{Context, EnvSnapshot};
use bijou_core::theme::Theme;
use clap::Parser;

use backend::{CrosstermIo, CrosstermRuntime, CrosstermStyle};
use demo::DemoApp;

/// A small TEA demo driving the bijou-core runtime against a real terminal.
#[derive(Parser, Debug)]
#[command(name = "bijou", version, about)]
struct Args {
    /// Override BIJOU_THEME for this run ("default", "high-contrast").
    #[arg(long, env = "BIJOU_THEME")]
    theme: Option<String>,

    /// Force accessible (screen-reader-friendly) output, as if
    /// BIJOU_ACCESSIBLE=1 were set.
    #[arg(long)]
    accessible: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut vars: std::collections::HashMap<String, String> = std::env::vars().collect();
    if let Some(theme) = &args.theme {
        vars.insert("BIJOU_THEME".to_string(), theme.clone());
    }
    if args.accessible {
        vars.insert("BIJOU_ACCESSIBLE".to_string(), "1".to_string());
    }
    let env = EnvSnapshot::from_map(vars);

    let theme = Theme::select(&env, |msg| tracing::warn!("{msg}"));
    let stdout_is_tty = std::io::stdout().is_terminal();
    let stdin_is_tty = std::io::stdin().is_terminal();

    let runtime = CrosstermRuntime::new(env, stdin_is_tty, stdout_is_tty)?;
    let ctx = Context::new(
        Box::new(runtime),
        Box::new(CrosstermIo::new()),
        Box::new(CrosstermStyle::new(stdout_is_tty)),
        Box::new(theme),
    );

    tracing::info!(mode = ?ctx.output_mode, "starting demo app");
    bijou_core::runtime::run(&DemoApp, ctx).await;
    Ok(())
}
