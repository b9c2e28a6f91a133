//! wakekey daemon and CLI
//!
//! `serve` runs the HTTP API and the HID dispatcher; the other
//! subcommands are one-shot equivalents of the network endpoints.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

mod cli;
use cli::{Cli, Commands, KeysArg, SshCommands, SshTargetArgs};

use wakekey::config::{Config, SshConfig};
use wakekey::dispatcher::Dispatcher;
use wakekey::http::{self, AppState};
use wakekey::indicator::{BusyIndicator, NoIndicator, SysfsLed};
use wakekey::macros;
use wakekey::wol::{self, MacAddr};
use wakekey::{ssh, UsbGadgetKeyboard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wakekey=info".parse()?),
        )
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => run_server(config, bind).await?,

        Commands::Wol { mac } => {
            let mac: MacAddr = mac.parse().context("invalid MAC address")?;
            wol::send_magic_packet(mac).await?;
            println!("magic packet sent to {mac}");
        }

        Commands::Ssh(ssh_cmd) => run_ssh(&config.ssh, ssh_cmd)?,

        Commands::Keys { command } => {
            let sequence = match command {
                KeysArg::RestartPc => macros::RESTART_PC,
                KeysArg::ShutdownPc => macros::SHUTDOWN_PC,
                KeysArg::Parsec => macros::RESTART_PARSEC,
                KeysArg::Anydesk => macros::RESTART_ANYDESK,
            };
            for action in sequence {
                println!("{action}");
            }
        }
    }

    Ok(())
}

async fn run_server(config: Config, bind: Option<String>) -> anyhow::Result<()> {
    let gadget = UsbGadgetKeyboard::open(
        &config.gadget.device,
        &config.gadget.udc_state,
        config.gadget.wakeup_attr.as_deref(),
    )
    .with_context(|| {
        format!(
            "opening HID gadget {}",
            config.gadget.device.display()
        )
    })?;

    let indicator: Arc<dyn BusyIndicator> = match &config.indicator.led {
        Some(led) => Arc::new(SysfsLed::new(led)),
        None => Arc::new(NoIndicator),
    };

    let dispatcher = Arc::new(Dispatcher::new(Arc::new(gadget), indicator));

    // The one long-lived consumer of the HID transport.
    let consumer = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.run().await })
    };

    let state = AppState {
        dispatcher,
        ssh: Arc::new(config.ssh),
    };
    let router = http::create_router(state);

    let addr = bind.unwrap_or(config.http.bind);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    consumer.abort();
    Ok(())
}

/// Merge CLI flags with configured defaults into a concrete target.
fn resolve_ssh_target(
    defaults: &SshConfig,
    target: &SshTargetArgs,
) -> anyhow::Result<(String, String, String)> {
    let host = target
        .host
        .clone()
        .or_else(|| (!defaults.host.is_empty()).then(|| defaults.host.clone()))
        .context("no SSH host given (use --host or the config file)")?;
    let username = target
        .username
        .clone()
        .or_else(|| (!defaults.username.is_empty()).then(|| defaults.username.clone()))
        .context("no SSH username given (use --username or the config file)")?;
    let password = target
        .password
        .clone()
        .unwrap_or_else(|| defaults.password.clone());
    Ok((host, username, password))
}

fn run_ssh(defaults: &SshConfig, command: SshCommands) -> anyhow::Result<()> {
    let exec = |target: &SshTargetArgs,
                op: fn(&str, &str, &str) -> Result<ssh::ExecOutput, ssh::SshError>|
     -> anyhow::Result<()> {
        let (host, username, password) = resolve_ssh_target(defaults, target)?;
        let output = op(&host, &username, &password)?;
        if !output.output.is_empty() {
            print!("{}", output.output);
        }
        println!("exit status: {}", output.exit_status);
        Ok(())
    };

    match command {
        SshCommands::Shutdown { target } => exec(&target, ssh::shutdown_pc),
        SshCommands::Restart { target } => exec(&target, ssh::restart_pc),
        SshCommands::Test { target } => {
            let (host, username, password) = resolve_ssh_target(defaults, &target)?;
            ssh::test_connection(&host, &username, &password)?;
            println!("connection and authentication succeeded");
            Ok(())
        }
    }
}
