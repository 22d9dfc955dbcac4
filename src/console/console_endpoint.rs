use crate::command::CommandDispatcher;
use crate::{info, warn};
use std::{io::ErrorKind, net::SocketAddr, sync::Arc};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{
    TcpListener, TcpStream,
    tcp::{OwnedReadHalf, OwnedWriteHalf},
};
use tokio_util::sync::CancellationToken;

/// Line-based operator console on a TCP socket.
///
/// Every received line is one command; the reply lines are written back
/// followed by `ok` or prefixed with `error:`. Overlong or non UTF-8 lines are
/// answered with an error and the connection stays open. Each connection runs
/// in its own task, so commands from several operators arrive concurrently.
pub struct ConsoleEndpoint {
    listener: TcpListener,
}

impl ConsoleEndpoint {
    /// Longest accepted command line in bytes, newline excluded.
    pub const MAX_LINE_LEN: usize = 1024;

    pub async fn bind(addr: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> { self.listener.local_addr() }

    /// Accepts connections until `c_tok` is cancelled.
    pub async fn serve(self, dispatcher: Arc<CommandDispatcher>, c_tok: CancellationToken) {
        if let Ok(addr) = self.local_addr() {
            info!("Console listening on {addr}.");
        }
        loop {
            let accept = tokio::select! {
                accept = self.listener.accept() => accept,
                () = c_tok.cancelled() => break,
            };
            match accept {
                Ok((socket, peer)) => {
                    info!("Console connected from {peer}.");
                    let dispatcher_local = Arc::clone(&dispatcher);
                    let c_tok_local = c_tok.clone();
                    tokio::spawn(async move {
                        Self::handle_connection(socket, peer, &dispatcher_local, &c_tok_local).await;
                    });
                }
                Err(e) => warn!("Console accept failed: {e}"),
            }
        }
        info!("Console closed.");
    }

    async fn handle_connection(
        socket: TcpStream,
        peer: SocketAddr,
        dispatcher: &CommandDispatcher,
        c_tok: &CancellationToken,
    ) {
        let (rx, mut tx) = socket.into_split();
        let result = tokio::select! {
            res = Self::serve_lines(rx, &mut tx, dispatcher) => res,
            () = c_tok.cancelled() => Ok(()),
        };
        match result {
            Err(e)
                if e.kind() == ErrorKind::UnexpectedEof
                    || e.kind() == ErrorKind::ConnectionReset
                    || e.kind() == ErrorKind::ConnectionAborted =>
            {
                return;
            }
            Err(e) => warn!("Closing console connection to {peer} due to {e:?}"),
            Ok(()) => info!("Console {peer} disconnected."),
        }
        let _ = tx.shutdown().await;
    }

    async fn serve_lines(
        rx: OwnedReadHalf,
        tx: &mut OwnedWriteHalf,
        dispatcher: &CommandDispatcher,
    ) -> std::io::Result<()> {
        let mut reader = BufReader::new(rx);
        let mut buf = Vec::with_capacity(Self::MAX_LINE_LEN);
        loop {
            buf.clear();
            let limit = Self::MAX_LINE_LEN as u64 + 1;
            if (&mut reader).take(limit).read_until(b'\n', &mut buf).await? == 0 {
                return Ok(());
            }
            let out = if buf.last() != Some(&b'\n') && buf.len() > Self::MAX_LINE_LEN {
                Self::discard_line(&mut reader).await?;
                vec![format!("error: line exceeds {} bytes", Self::MAX_LINE_LEN)]
            } else if let Ok(line) = std::str::from_utf8(&buf) {
                let Some(reply) = dispatcher.handle_line(line.trim_end_matches(['\r', '\n'])).await
                else {
                    continue;
                };
                reply.render()
            } else {
                vec!["error: line is not valid UTF-8".to_string()]
            };
            for line in out {
                tx.write_all(line.as_bytes()).await?;
                tx.write_all(b"\n").await?;
            }
            tx.flush().await?;
        }
    }

    /// Skips input up to and including the next newline.
    async fn discard_line(reader: &mut BufReader<OwnedReadHalf>) -> std::io::Result<()> {
        loop {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(());
            }
            let (consumed, done) = match available.iter().position(|b| *b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), false),
            };
            reader.consume(consumed);
            if done {
                return Ok(());
            }
        }
    }
}
