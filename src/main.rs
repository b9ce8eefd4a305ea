//! Binary entry point for the Rackspace driver CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;

use rackspace_driver::{
    ComputeClient, DriverConfig, IpAddress, RackspaceClient, RackspaceConfig, RackspaceError,
    logging,
};

mod cli;

use cli::{Cli, MachineArgs};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Provider(#[from] RackspaceError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = logging::init() {
        writeln!(io::stderr(), "{err}").ok();
    }

    let exit_code = match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let client = RackspaceClient::http();
    match cli {
        Cli::Create => {
            let config = load_config(None)?;
            let server_id = client.create_instance(&config).await?;
            write_line(io::stdout(), &server_id)?;
        }
        Cli::Ip(args) => {
            let config = load_config(Some(&args))?;
            for address in client.get_instance_ip_addresses(&config).await? {
                write_line(io::stdout(), &render_address(&address))?;
            }
        }
        Cli::State(args) => {
            let config = load_config(Some(&args))?;
            let state = client.get_instance_state(&config).await?;
            write_line(io::stdout(), &state)?;
        }
        Cli::Remove(args) => {
            let config = load_config(Some(&args))?;
            client.delete_instance(&config).await?;
        }
        Cli::Start(args) => {
            let config = load_config(Some(&args))?;
            client.start_instance(&config).await?;
        }
        Cli::Stop(args) => {
            let config = load_config(Some(&args))?;
            client.stop_instance(&config).await?;
        }
    }
    Ok(())
}

fn load_config(machine: Option<&MachineArgs>) -> Result<DriverConfig, CliError> {
    let mut config =
        RackspaceConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    if let Some(machine_id) = machine.and_then(|args| args.machine_id.clone()) {
        config.machine_id = Some(machine_id);
    }
    config
        .as_driver_config()
        .map_err(|err| CliError::Config(err.to_string()))
}

fn render_address(address: &IpAddress) -> String {
    format!(
        "{}\t{}\t{}",
        address.network, address.address, address.address_type
    )
}

fn write_line(mut target: impl Write, line: &str) -> Result<(), CliError> {
    writeln!(target, "{line}")?;
    Ok(())
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
