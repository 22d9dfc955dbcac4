use super::CommandDispatcher;
use super::command::{Command, CommandError, CommandName};
use crate::deployment::{DeploymentState, DeploymentTarget, MissionRequest, tests::RecordingLink};
use crate::error::{Conflict, DeployerError, Violation};
use crate::payload_deployer::PayloadDeployer;
use futures::future::join_all;
use std::sync::Arc;

const ADD_15: &str = "add 15 0.3 0.007 0.0022 0.42 200 35.14 42.55 14 1500 990";

fn dispatcher() -> (CommandDispatcher, Arc<PayloadDeployer>, Arc<RecordingLink>) {
    let link = Arc::new(RecordingLink::default());
    let deployer = Arc::new(PayloadDeployer::new(16, link.clone(), link.clone(), link.clone()));
    (CommandDispatcher::new(Arc::clone(&deployer)), deployer, link)
}

async fn run(dispatcher: &CommandDispatcher, line: &str) -> Result<Vec<String>, CommandError> {
    dispatcher.execute(Command::parse(line)?.expect("non-blank line")).await
}

#[test]
fn test_parse_commands() {
    assert_eq!(Command::parse("   ").unwrap(), None);
    assert_eq!(Command::parse("list").unwrap(), Some(Command::List));
    assert_eq!(Command::parse("launch").unwrap(), Some(Command::Launch(None)));
    assert_eq!(Command::parse("launch 7").unwrap(), Some(Command::Launch(Some(7))));
    assert_eq!(Command::parse("test_servo 1050").unwrap(), Some(Command::TestServo(1050)));
    assert_eq!(
        Command::parse("edit 1050 weight 1.35").unwrap(),
        Some(Command::Edit { index: 1050, field: "weight".into(), value: "1.35".into() })
    );
    let Some(Command::Add(p)) = Command::parse(ADD_15).unwrap() else {
        panic!("add did not parse");
    };
    assert_eq!(p.index(), 15);
}

#[test]
fn test_parse_rejections() {
    assert_eq!(Command::parse("fly"), Err(CommandError::Unrecognized("fly".into())));
    assert_eq!(
        Command::parse("remove"),
        Err(CommandError::Arity { command: CommandName::Remove, expected: (1, 1), got: 0 })
    );
    assert_eq!(
        Command::parse("launch 1 2"),
        Err(CommandError::Arity { command: CommandName::Launch, expected: (0, 1), got: 2 })
    );
    assert!(matches!(Command::parse("add 1 2 3"), Err(CommandError::Arity { got: 3, .. })));
    match Command::parse("remove zero") {
        Err(CommandError::Invalid(e)) => assert_eq!(e.violation(), Violation::Unparsable),
        other => panic!("unexpected {other:?}"),
    }
    match Command::parse("add 15 0 0.007 0.0022 0.42 200 35.14 42.55 14 1500 990") {
        Err(CommandError::Invalid(e)) => assert_eq!(e.violation(), Violation::Zero),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_add_list_remove_round_trip() {
    let (dispatcher, _, _) = dispatcher();
    run(&dispatcher, ADD_15).await.unwrap();

    let table = run(&dispatcher, "list").await.unwrap();
    assert_eq!(table.len(), 2);
    let cells: Vec<&str> = table[1].split_whitespace().collect();
    assert_eq!(
        cells,
        vec!["15", "0.3", "0.007", "0.0022", "0.42", "200", "35.14", "42.55", "14", "1500", "990"]
    );
    assert!(table[0].contains("drag_coef"));

    run(&dispatcher, "remove 15").await.unwrap();
    assert_eq!(run(&dispatcher, "list").await.unwrap(), vec!["no payloads registered"]);
    assert_eq!(
        run(&dispatcher, "remove 15").await,
        Err(CommandError::Deployer(DeployerError::NotFound(15)))
    );
}

#[tokio::test]
async fn test_reply_rendering() {
    let (dispatcher, _, _) = dispatcher();
    assert!(dispatcher.handle_line("").await.is_none());

    let ok = dispatcher.handle_line("cancel").await.unwrap();
    assert!(ok.ok);
    assert_eq!(ok.render(), vec!["no deployment in progress", "ok"]);

    let err = dispatcher.handle_line("edit 3 weight 2").await.unwrap();
    assert!(!err.ok);
    assert_eq!(err.render(), vec!["error: no payload with index 3"]);

    let warn = dispatcher.handle_line("launch").await.unwrap();
    assert!(warn.ok);
    assert!(warn.lines[0].starts_with("warning:"));
}

#[tokio::test]
async fn test_launch_scenario_through_commands() {
    let (dispatcher, deployer, link) = dispatcher();
    run(&dispatcher, "add 1 1.2 0.01 0.042 0.1 150 40.17 44.61 12 950 1450").await.unwrap();
    run(&dispatcher, "add 2 1.2 0.01 0.042 0.1 150 40.17 44.61 13 950 1450").await.unwrap();

    run(&dispatcher, "launch").await.unwrap();
    assert_eq!(*deployer.state_monitor().borrow(), DeploymentState::Active(DeploymentTarget::All));
    assert_eq!(
        run(&dispatcher, "launch 1").await,
        Err(CommandError::Deployer(DeployerError::StateConflict(Conflict::DeploymentActive)))
    );

    let committed = Err(CommandError::Deployer(DeployerError::StateConflict(
        Conflict::PayloadCommitted(2),
    )));
    assert_eq!(run(&dispatcher, "remove 2").await, committed);
    assert_eq!(run(&dispatcher, "edit 2 weight 3").await, committed);
    assert_eq!(run(&dispatcher, "test_servo 2").await, committed);
    run(&dispatcher, "add 3 1.2 0.01 0.042 0.1 150 40.17 44.61 14 950 1450").await.unwrap();

    let status = run(&dispatcher, "status").await.unwrap();
    assert_eq!(status[0], "payloads: 3/16");
    assert_eq!(status[1], "deployment: active (all payloads)");
    assert!(status[2].starts_with("since: "));

    run(&dispatcher, "cancel").await.unwrap();
    assert_eq!(*deployer.state_monitor().borrow(), DeploymentState::Idle);
    run(&dispatcher, "launch 1").await.unwrap();
    assert_eq!(
        *deployer.state_monitor().borrow(),
        DeploymentState::Active(DeploymentTarget::Single(1))
    );

    run(&dispatcher, "remove 2").await.unwrap();
    run(&dispatcher, "test_servo 3").await.unwrap();
    assert_eq!(link.requests().last(), Some(&MissionRequest::TestServo(14)));
    assert_eq!(link.requests().iter().filter(|r| **r == MissionRequest::Abort).count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_launches_start_one_session() {
    let (_, deployer, link) = dispatcher();
    for i in 1..=5 {
        deployer.add(crate::deployment::tests::payload(i)).await.unwrap();
    }
    let attempts = (0..32u16).map(|n| {
        let deployer = Arc::clone(&deployer);
        tokio::spawn(async move { deployer.launch(if n % 2 == 0 { None } else { Some(n % 5 + 1) }).await })
    });
    let results: Vec<_> = join_all(attempts).await.into_iter().map(Result::unwrap).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().filter(|r| r.is_err()).all(|r| {
        *r == Err(DeployerError::StateConflict(Conflict::DeploymentActive))
    }));
    let generated = link.requests().iter().filter(|r| matches!(r, MissionRequest::Generate(_))).count();
    assert_eq!(generated, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_listing_during_concurrent_edits_is_consistent() {
    let (_, deployer, _) = dispatcher();
    for i in 1..=8 {
        deployer.add(crate::deployment::tests::payload(i)).await.unwrap();
    }
    let writer = {
        let deployer = Arc::clone(&deployer);
        tokio::spawn(async move {
            for round in 0..50u16 {
                let from = if round % 2 == 0 { 1 } else { 100 };
                let to = if round % 2 == 0 { 100 } else { 1 };
                deployer.edit(from, "index", &to.to_string()).await.unwrap();
            }
        })
    };
    for _ in 0..50 {
        let listed: Vec<u16> = deployer.list().await.iter().map(|p| p.index()).collect();
        assert_eq!(listed.len(), 8);
        assert!(listed.windows(2).all(|w| w[0] < w[1]));
        tokio::task::yield_now().await;
    }
    writer.await.unwrap();
}
