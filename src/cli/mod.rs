//! Command-line interface definitions for the `rackspace-driver` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser};

/// Top-level CLI for the `rackspace-driver` binary.
#[derive(Debug, Parser)]
#[command(
    name = "rackspace-driver",
    about = "Provision and inspect Rackspace cloud servers",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Create a server and print its identifier.
    #[command(name = "create", about = "Create a server and print its identifier")]
    Create,
    /// Print the address of a server on the configured network.
    #[command(name = "ip", about = "Print the address of a server on the configured network")]
    Ip(MachineArgs),
    /// Print the provider status of a server.
    #[command(name = "state", about = "Print the provider status of a server")]
    State(MachineArgs),
    /// Delete a server.
    #[command(name = "rm", about = "Delete a server")]
    Remove(MachineArgs),
    /// Start a server.
    #[command(name = "start", about = "Start a server")]
    Start(MachineArgs),
    /// Stop a server.
    #[command(name = "stop", about = "Stop a server")]
    Stop(MachineArgs),
}

/// Arguments shared by commands that act on an existing server.
#[derive(Debug, Args)]
pub(crate) struct MachineArgs {
    /// Server identifier; overrides `OS_MACHINE_ID` and the configuration file.
    #[arg(long, value_name = "ID")]
    pub(crate) machine_id: Option<String>,
}
