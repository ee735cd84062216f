// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod backend;
mod cli;
mod telemetry;

use anyhow::{bail, Context};
use backend::open_stores;
use clap::Parser;
use cli::{CliArgs, Command, RecordsCommand};
use merge_sort_core::FakeNameGenerator;
use std::sync::Arc;
use workflow_core::{
    Coordinator, ResultStore, RunId, RunStatus, StoredRecord, TriggerRequest, AD_HOC_PARTITION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    telemetry::init_tracing()?;

    let config = args.workflow_config()?;
    let stores = open_stores(args.backend, &args.data_dir).await?;

    let mut coordinator = Coordinator::new(config.clone(), stores.history, stores.results);
    if let Some(seed) = args.seed {
        let generator = FakeNameGenerator::with_seed(config.max_items, seed);
        coordinator = coordinator.with_generator(Arc::new(generator));
    }

    let token = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Ctrl+C received, stopping at the next step boundary");
            token.cancel();
        }
    });

    match args.command {
        Command::Run {
            number_of_items,
            request_json,
            show_items,
        } => {
            let request = match (number_of_items, request_json) {
                (Some(n), _) => TriggerRequest::new(n),
                (None, Some(body)) => TriggerRequest::from_json(&body)?,
                (None, None) => bail!("either --number-of-items or --request-json is required"),
            };
            let ack = coordinator.start(&request).await?;
            println!("{}", serde_json::to_string_pretty(&ack)?);

            let status = coordinator.run(&ack.run_id).await?;
            print_status(&status, show_items)?;
        }
        Command::Resume { run_id } => {
            let status = coordinator.run(&RunId::new(run_id)).await?;
            print_status(&status, false)?;
        }
        Command::Status { run_id } => {
            let status = coordinator.status(&RunId::new(run_id)).await?;
            print_status(&status, false)?;
        }
        Command::Runs => {
            let runs = coordinator.list_runs().await?;
            if runs.is_empty() {
                println!("No runs recorded");
            }
            for status in runs {
                println!(
                    "{}  {:<13}  items={}  created={}",
                    status.run_id, status.phase, status.number_of_items, status.created_at
                );
            }
        }
        Command::Records { command } => records(coordinator.results().as_ref(), command).await?,
    }

    Ok(())
}

fn print_status(status: &RunStatus, show_items: bool) -> anyhow::Result<()> {
    if show_items {
        println!("{}", serde_json::to_string_pretty(status)?);
        return Ok(());
    }

    let mut summary = status.clone();
    summary.result = None;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn records(store: &dyn ResultStore, command: RecordsCommand) -> anyhow::Result<()> {
    match command {
        RecordsCommand::List { partition } => {
            let records = match partition {
                Some(partition) => store.scan_partition(&partition).await?,
                None => store.scan().await?,
            };
            for record in records {
                println!("{}/{}  {}", record.partition_key, record.row_key, record.value);
            }
        }
        RecordsCommand::Get { partition, row } => {
            let record = store
                .get(&partition, &row)
                .await
                .with_context(|| format!("looking up {}/{}", partition, row))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        RecordsCommand::Count { partition } => {
            let count = match partition {
                Some(partition) => store.count_partition(&partition).await?,
                None => store.count().await?,
            };
            println!("{}", count);
        }
        RecordsCommand::Insert { value } => {
            let record = StoredRecord::ad_hoc(&value);
            store.upsert(record.clone()).await?;
            tracing::info!(partition = AD_HOC_PARTITION, row = %record.row_key, "record inserted");
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }
    Ok(())
}
