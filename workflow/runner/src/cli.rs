// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use workflow_core::WorkflowConfig;

/// Parallel merge sort of generated names, driven by a resumable workflow.
#[derive(Parser, Debug)]
#[command(name = "merge-sort-runner", version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// JSON workflow configuration; defaults are used when it cannot be read
    #[arg(long, env = "MERGE_SORT_CONFIG", default_value = "config.json", global = true)]
    pub config: PathBuf,

    /// Where history and results are kept
    #[arg(
        long,
        env = "MERGE_SORT_BACKEND",
        value_enum,
        default_value_t = Backend::Sled,
        global = true
    )]
    pub backend: Backend,

    /// Directory for the flat-file and sled backends
    #[arg(long, env = "MERGE_SORT_DATA_DIR", default_value = "merge-sort-data", global = true)]
    pub data_dir: PathBuf,

    /// Overrides `parallelism` from the config file
    #[arg(long, env = "MERGE_SORT_PARALLELISM", global = true)]
    pub parallelism: Option<usize>,

    /// Overrides `max_items` from the config file
    #[arg(long, env = "MERGE_SORT_MAX_ITEMS", global = true)]
    pub max_items: Option<usize>,

    /// Seed for the name generator, for reproducible runs
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    InMemory,
    FlatFile,
    Sled,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a run and drive it to completion
    Run {
        #[arg(long, conflicts_with = "request_json")]
        number_of_items: Option<i64>,

        /// Raw trigger body, e.g. '{ "numberOfItems": 10 }'
        #[arg(long)]
        request_json: Option<String>,

        /// Print every sorted item instead of just the count
        #[arg(long)]
        show_items: bool,
    },
    /// Continue a run from its persisted history
    Resume {
        #[arg(long)]
        run_id: String,
    },
    /// Show the phase and result of a run
    Status {
        #[arg(long)]
        run_id: String,
    },
    /// List every known run with its phase
    Runs,
    /// Inspect or edit the result table
    Records {
        #[command(subcommand)]
        command: RecordsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum RecordsCommand {
    /// All records, or those of one partition
    List {
        #[arg(long)]
        partition: Option<String>,
    },
    Get {
        #[arg(long)]
        partition: String,
        #[arg(long)]
        row: String,
    },
    Count {
        #[arg(long)]
        partition: Option<String>,
    },
    /// Insert a value under a fresh key in the shared partition
    Insert { value: String },
}

impl CliArgs {
    /// Config file values with command line overrides applied
    pub fn workflow_config(&self) -> anyhow::Result<WorkflowConfig> {
        let mut config = match WorkflowConfig::load(&self.config) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "using default configuration");
                WorkflowConfig::default()
            }
        };

        if let Some(parallelism) = self.parallelism {
            config.parallelism = parallelism;
        }
        if let Some(max_items) = self.max_items {
            config.max_items = max_items;
        }
        config.validate()?;
        Ok(config)
    }
}
