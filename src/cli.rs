// CLI definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wakekey")]
#[command(author, version, about = "Remote wake/restart/shutdown bridge for a host PC")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (default: /etc/wakekey.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the daemon: HTTP API plus the HID dispatcher
    Serve {
        /// Listen address (overrides the config file)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Send a Wake-on-LAN magic packet
    Wol {
        /// Target MAC address (XX-XX-XX-XX-XX-XX)
        mac: String,
    },

    /// Execute a remote command over SSH
    #[command(subcommand)]
    Ssh(SshCommands),

    /// Print the keystroke sequence a host command would type
    Keys {
        /// Which command's sequence to print
        #[arg(value_enum)]
        command: KeysArg,
    },
}

#[derive(Subcommand)]
pub enum SshCommands {
    /// Shut the remote host down (shutdown /s /t 0)
    Shutdown {
        #[command(flatten)]
        target: SshTargetArgs,
    },
    /// Restart the remote host (shutdown /r /t 0)
    Restart {
        #[command(flatten)]
        target: SshTargetArgs,
    },
    /// Verify connectivity and credentials without executing anything
    Test {
        #[command(flatten)]
        target: SshTargetArgs,
    },
}

#[derive(clap::Args)]
pub struct SshTargetArgs {
    /// Remote host (overrides the config file)
    #[arg(long)]
    pub host: Option<String>,

    /// Remote username (overrides the config file)
    #[arg(long)]
    pub username: Option<String>,

    /// Password; omit to use the configured one (empty enables the
    /// empty-password and keyboard-interactive fallbacks)
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KeysArg {
    /// Run-dialog restart sequence
    RestartPc,
    /// Run-dialog shutdown sequence
    ShutdownPc,
    /// Parsec relaunch gesture
    Parsec,
    /// AnyDesk relaunch gesture
    Anydesk,
}
