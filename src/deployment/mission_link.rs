use crate::payload::PayloadDescriptor;
use crate::{deploy, info, log, warn};
use async_trait::async_trait;
use itertools::Itertools;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Turns a release sequence into a flight plan. The deployer never inspects
/// the outcome, a call only has to be accepted and must not wait on planning.
#[async_trait]
pub trait MissionGenerator: Send + Sync {
    async fn generate(&self, sequence: Vec<PayloadDescriptor>);
}

/// Stops a running release and holds the vehicle.
#[async_trait]
pub trait AbortCapability: Send + Sync {
    async fn abort(&self);
}

/// Cycles a payload servo open and closed.
#[async_trait]
pub trait ActuatorTest: Send + Sync {
    async fn test(&self, pwm_id: u32);
}

/// Request forwarded from the deployer to the planner side.
#[derive(Debug, Clone, PartialEq)]
pub enum MissionRequest {
    Generate(Vec<PayloadDescriptor>),
    Abort,
    TestServo(u32),
}

/// Channel-backed implementation of all collaborator traits.
///
/// Every call returns at once. A request that does not fit into the queue is
/// dropped with a warning; the planner task consuming
/// [`MissionLink::run_planner_stub`] works independently of the deployer.
#[derive(Clone)]
pub struct MissionLink {
    tx: mpsc::Sender<MissionRequest>,
}

impl MissionLink {
    /// Requests buffered before further ones are dropped.
    pub const QUEUE_DEPTH: usize = 16;

    pub fn new() -> (Self, mpsc::Receiver<MissionRequest>) {
        let (tx, rx) = mpsc::channel(Self::QUEUE_DEPTH);
        (Self { tx }, rx)
    }

    fn forward(&self, req: MissionRequest) {
        match self.tx.try_send(req) {
            Ok(()) => {}
            Err(TrySendError::Full(req)) => warn!("Mission planner is busy, dropping {req:?}"),
            Err(TrySendError::Closed(req)) => warn!("Mission planner is gone, dropping {req:?}"),
        }
    }

    /// Planner placeholder: logs every request until all links are dropped.
    /// Release point computation is not part of the deployer.
    pub async fn run_planner_stub(mut rx: mpsc::Receiver<MissionRequest>) {
        while let Some(req) = rx.recv().await {
            match req {
                MissionRequest::Generate(seq) => {
                    let order = seq.iter().map(|d| d.index).join(" -> ");
                    deploy!("Planner received release sequence [{order}].");
                    for d in &seq {
                        log!(
                            "  #{}: {} kg from {} m to ({}, {}) via pwm {}",
                            d.index,
                            d.aero.weight,
                            d.target.altitude,
                            d.target.lat,
                            d.target.lon,
                            d.actuator.pwm_id
                        );
                    }
                }
                MissionRequest::Abort => deploy!("Planner received abort, holding position."),
                MissionRequest::TestServo(pwm_id) => log!("Cycling servo on pwm channel {pwm_id}."),
            }
        }
        info!("Mission planner stub stopped.");
    }
}

#[async_trait]
impl MissionGenerator for MissionLink {
    async fn generate(&self, sequence: Vec<PayloadDescriptor>) {
        self.forward(MissionRequest::Generate(sequence));
    }
}

#[async_trait]
impl AbortCapability for MissionLink {
    async fn abort(&self) { self.forward(MissionRequest::Abort); }
}

#[async_trait]
impl ActuatorTest for MissionLink {
    async fn test(&self, pwm_id: u32) { self.forward(MissionRequest::TestServo(pwm_id)); }
}
