use super::ConsoleEndpoint;
use crate::command::CommandDispatcher;
use crate::deployment::tests::RecordingLink;
use crate::payload_deployer::PayloadDeployer;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_console_executes_lines() {
    let link = Arc::new(RecordingLink::default());
    let deployer = Arc::new(PayloadDeployer::new(4, link.clone(), link.clone(), link));
    let dispatcher = Arc::new(CommandDispatcher::new(Arc::clone(&deployer)));
    let endpoint = ConsoleEndpoint::bind("127.0.0.1:0").await.unwrap();
    let addr = endpoint.local_addr().unwrap();
    let c_tok = CancellationToken::new();
    let server = tokio::spawn(endpoint.serve(dispatcher, c_tok.clone()));

    let stream = TcpStream::connect(addr).await.unwrap();
    let (rx, mut tx) = stream.into_split();
    let mut lines = BufReader::new(rx).lines();
    tx.write_all(b"add 1050 1.2 0.01 0.042 0.1 150 40.175885 44.612789 12 950 1450\n")
        .await
        .unwrap();
    assert_eq!(lines.next_line().await.unwrap().unwrap(), "payload 1050 added");
    assert_eq!(lines.next_line().await.unwrap().unwrap(), "ok");

    tx.write_all(b"\nremove 7\n").await.unwrap();
    assert_eq!(lines.next_line().await.unwrap().unwrap(), "error: no payload with index 7");

    tx.write_all(b"edit 1050 weight 1.35\n").await.unwrap();
    assert_eq!(lines.next_line().await.unwrap().unwrap(), "payload 1050: weight = 1.35");
    assert_eq!(lines.next_line().await.unwrap().unwrap(), "ok");
    assert_eq!(deployer.list().await[0].aero().weight, 1.35);

    c_tok.cancel();
    server.await.unwrap();
}

#[tokio::test]
async fn test_console_survives_malformed_lines() {
    let link = Arc::new(RecordingLink::default());
    let deployer = Arc::new(PayloadDeployer::new(4, link.clone(), link.clone(), link));
    let dispatcher = Arc::new(CommandDispatcher::new(deployer));
    let endpoint = ConsoleEndpoint::bind("127.0.0.1:0").await.unwrap();
    let addr = endpoint.local_addr().unwrap();
    let c_tok = CancellationToken::new();
    let server = tokio::spawn(endpoint.serve(dispatcher, c_tok.clone()));

    let stream = TcpStream::connect(addr).await.unwrap();
    let (rx, mut tx) = stream.into_split();
    let mut lines = BufReader::new(rx).lines();

    tx.write_all(b"list \xff\xfe\n").await.unwrap();
    assert_eq!(lines.next_line().await.unwrap().unwrap(), "error: line is not valid UTF-8");

    let mut long = vec![b'x'; ConsoleEndpoint::MAX_LINE_LEN * 3];
    long.push(b'\n');
    tx.write_all(&long).await.unwrap();
    assert_eq!(
        lines.next_line().await.unwrap().unwrap(),
        format!("error: line exceeds {} bytes", ConsoleEndpoint::MAX_LINE_LEN)
    );

    tx.write_all(b"list\n").await.unwrap();
    assert_eq!(lines.next_line().await.unwrap().unwrap(), "no payloads registered");
    assert_eq!(lines.next_line().await.unwrap().unwrap(), "ok");

    c_tok.cancel();
    server.await.unwrap();
}
