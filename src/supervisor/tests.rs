use super::parameter_source::ParameterUpdateSource;
use super::{DeployerParams, ParamSubscription, Supervisor};
use crate::deployment::tests::{RecordingLink, payload};
use crate::error::DeployerError;
use crate::payload_deployer::PayloadDeployer;
use std::sync::Arc;
use tokio::{sync::watch, time::Duration};
use tokio_util::sync::CancellationToken;

fn deployer() -> Arc<PayloadDeployer> {
    let link = Arc::new(RecordingLink::default());
    Arc::new(PayloadDeployer::new(8, link.clone(), link.clone(), link))
}

async fn supervisor_with_params(
    deployer: &Arc<PayloadDeployer>,
) -> (Arc<Supervisor>, watch::Sender<DeployerParams>, CancellationToken) {
    let c_tok = CancellationToken::new();
    let supervisor = Arc::new(Supervisor::new(Arc::clone(deployer), c_tok.clone()));
    let (tx, rx) = watch::channel(DeployerParams { max_items: 8 });
    supervisor.subscribe(Box::new(ParamSubscription::new(rx))).await;
    (supervisor, tx, c_tok)
}

#[test]
fn test_subscription_reports_each_change_once() {
    let (tx, rx) = watch::channel(DeployerParams::default());
    let mut sub = ParamSubscription::new(rx);
    assert!(!sub.updated());
    tx.send(DeployerParams { max_items: 3 }).unwrap();
    assert!(sub.updated());
    assert_eq!(sub.copy(), DeployerParams { max_items: 3 });
    assert!(!sub.updated());
    sub.unsubscribe();
    assert!(!sub.is_subscribed());
    tx.send_replace(DeployerParams { max_items: 5 });
    assert!(!sub.updated());
}

#[tokio::test(start_paused = true)]
async fn test_ticks_follow_fixed_interval() {
    let deployer = deployer();
    let (supervisor, _tx, c_tok) = supervisor_with_params(&deployer).await;
    let handle = tokio::spawn(Arc::clone(&supervisor).run());

    tokio::time::sleep(Supervisor::TICK_INTERVAL * 5 + Duration::from_millis(50)).await;
    let ticks = supervisor.ticks();
    assert!((5..=7).contains(&ticks), "unexpected tick count {ticks}");

    c_tok.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_parameter_change_is_forwarded() {
    let deployer = deployer();
    let (supervisor, tx, c_tok) = supervisor_with_params(&deployer).await;
    let handle = tokio::spawn(Arc::clone(&supervisor).run());

    tx.send(DeployerParams { max_items: 2 }).unwrap();
    tokio::time::sleep(Supervisor::TICK_INTERVAL * 2).await;
    assert_eq!(deployer.status().await.capacity, 2);

    deployer.add(payload(1)).await.unwrap();
    deployer.add(payload(2)).await.unwrap();
    assert_eq!(deployer.add(payload(3)).await, Err(DeployerError::Allocation { capacity: 2 }));

    c_tok.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_ticks_and_releases_subscriptions() {
    let deployer = deployer();
    let (supervisor, tx, c_tok) = supervisor_with_params(&deployer).await;
    let handle = tokio::spawn(Arc::clone(&supervisor).run());
    tokio::time::sleep(Supervisor::TICK_INTERVAL * 3).await;
    assert_eq!(tx.receiver_count(), 1);

    supervisor.stop();
    handle.await.unwrap();
    assert!(supervisor.is_stopped());
    assert_eq!(tx.receiver_count(), 0);

    let ticks = supervisor.ticks();
    tokio::time::sleep(Supervisor::TICK_INTERVAL * 10).await;
    supervisor.tick().await;
    assert_eq!(supervisor.ticks(), ticks);
    assert!(c_tok.is_cancelled());
}

#[tokio::test]
async fn test_shutdown_is_idempotent() {
    let deployer = deployer();
    let (supervisor, tx, _c_tok) = supervisor_with_params(&deployer).await;
    supervisor.tick().await;
    assert_eq!(supervisor.ticks(), 1);

    supervisor.shutdown().await;
    supervisor.shutdown().await;
    assert!(supervisor.is_stopped());
    assert_eq!(tx.receiver_count(), 0);

    let (_late_tx, late_rx) = watch::channel(DeployerParams::default());
    supervisor.subscribe(Box::new(ParamSubscription::new(late_rx))).await;
    supervisor.tick().await;
    assert_eq!(supervisor.ticks(), 1);
}
