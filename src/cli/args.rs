// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for stepwise

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stepwise")]
#[command(about = "Executes JSON-defined workflows one decision-routed step at a time")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a workflow graph from a JSON file
    Run {
        #[arg(help = "Path to workflow graph JSON file")]
        workflow: PathBuf,

        #[arg(short, long, help = "Path to the incoming payload JSON file")]
        payload: Option<PathBuf>,

        #[arg(short, long, help = "Step to resume at (defaults to the first step)")]
        step: Option<String>,

        #[arg(
            short = 'V',
            long = "set",
            help = "Set a payload field before running (key=value)"
        )]
        vars: Vec<String>,

        #[arg(
            short,
            long,
            help = "Activity thread file (JSON Lines); committed messages are appended"
        )]
        thread: Option<PathBuf>,

        #[arg(long, help = "Activity id stamped into the payload")]
        activity: Option<String>,

        #[arg(long, help = "Confirm every step interactively before it is committed")]
        debug: bool,

        #[arg(short, long, help = "Write the run result as JSON to this file")]
        output: Option<PathBuf>,
    },

    /// List the steps of a workflow graph
    Steps {
        #[arg(help = "Path to workflow graph JSON file")]
        workflow: PathBuf,
    },

    /// List the registered routes
    Routes {
        #[arg(long, help = "Print the route table as JSON")]
        json: bool,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse variables from key=value format
    pub fn parse_variables(
        vars: &[String],
    ) -> anyhow::Result<std::collections::HashMap<String, String>> {
        let mut variables = std::collections::HashMap::new();

        for var in vars {
            if let Some((key, value)) = var.split_once('=') {
                variables.insert(key.to_string(), value.to_string());
            } else {
                return Err(anyhow::anyhow!(
                    "Invalid variable format '{}'. Expected 'key=value'",
                    var
                ));
            }
        }

        Ok(variables)
    }
}
