use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Tasks for the project", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project
    Build,
    /// Run the test suite
    Test,
    /// Run the listener against an in-memory register window
    Run {
        /// UDP port to listen on
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn cargo(args: &[&str], what: &str) -> Result<()> {
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{} failed", what);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Build => {
            println!("Building project...");
            cargo(&["build"], "Build")?;
        }
        Commands::Test => {
            println!("Testing project...");
            cargo(&["test", "-p", "hexlink-core"], "Test")?;
        }
        Commands::Run { port } => {
            println!("Running listener on port {}...", port);
            let port = port.to_string();
            cargo(
                &[
                    "run",
                    "-p",
                    "hexlink-cli",
                    "--",
                    "--in-memory",
                    "--port",
                    &port,
                    "--verbose",
                ],
                "Run",
            )?;
        }
    }

    Ok(())
}
