#![allow(clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod command;
mod config;
mod console;
mod deployment;
mod error;
mod logger;
mod payload;
mod payload_deployer;
mod supervisor;

use crate::command::CommandDispatcher;
use crate::config::DeployerConfig;
use crate::console::ConsoleEndpoint;
use crate::deployment::MissionLink;
use crate::payload_deployer::PayloadDeployer;
use crate::supervisor::{DeployerParams, ParamSubscription, Supervisor};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() {
    let config = DeployerConfig::from_env();
    info!("Starting payload deployer with capacity {}.", config.max_items());

    let (link, link_rx) = MissionLink::new();
    let link = Arc::new(link);
    let planner = tokio::spawn(MissionLink::run_planner_stub(link_rx));
    let deployer = Arc::new(PayloadDeployer::with_link(config.max_items(), &link));
    drop(link);

    let c_tok = CancellationToken::new();
    let (param_tx, param_rx) = watch::channel(DeployerParams { max_items: config.max_items() });
    let supervisor = Arc::new(Supervisor::new(Arc::clone(&deployer), c_tok.clone()));
    supervisor.subscribe(Box::new(ParamSubscription::new(param_rx))).await;

    let endpoint = ConsoleEndpoint::bind(config.console_addr())
        .await
        .unwrap_or_else(|e| fatal!("Cannot open console on {}: {e}", config.console_addr()));
    let dispatcher = Arc::new(CommandDispatcher::new(Arc::clone(&deployer)));

    let tasks = vec![
        tokio::spawn(Arc::clone(&supervisor).run()),
        tokio::spawn(endpoint.serve(dispatcher, c_tok.clone())),
    ];

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested."),
        Err(e) => error!("Cannot listen for shutdown signal: {e}"),
    }
    c_tok.cancel();
    for res in futures::future::join_all(tasks).await {
        if let Err(e) = res {
            error!("Task ended abnormally: {e}");
        }
    }
    drop(param_tx);
    drop(supervisor);
    drop(deployer);
    if let Err(e) = planner.await {
        error!("Mission planner ended abnormally: {e}");
    }
}
