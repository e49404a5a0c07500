//! Mock rover control endpoint for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use roverlink::Endpoint;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Something the mock rover should do on its current connection.
pub enum RoverAction {
    Text(String),
    Binary(Vec<u8>),
    Close,
}

/// A WebSocket server on 127.0.0.1 that records every text frame it gets.
///
/// Connections are served one at a time, in the order they arrive.
pub struct MockRover {
    port: u16,
    received: mpsc::UnboundedReceiver<String>,
    control: mpsc::UnboundedSender<RoverAction>,
    accepted: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl MockRover {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (received_tx, received) = mpsc::unbounded_channel();
        let (control, mut control_rx) = mpsc::unbounded_channel();
        let accepted = Arc::new(AtomicUsize::new(0));

        let task = tokio::spawn({
            let accepted = accepted.clone();
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let Ok(ws) = accept_async(stream).await else {
                        continue;
                    };
                    accepted.fetch_add(1, Ordering::SeqCst);
                    let (mut sink, mut source) = ws.split();

                    loop {
                        tokio::select! {
                            action = control_rx.recv() => match action {
                                Some(RoverAction::Text(text)) => {
                                    if sink.send(Message::text(text)).await.is_err() {
                                        break;
                                    }
                                }
                                Some(RoverAction::Binary(data)) => {
                                    if sink.send(Message::binary(data)).await.is_err() {
                                        break;
                                    }
                                }
                                Some(RoverAction::Close) => {
                                    let _ = sink.send(Message::Close(None)).await;
                                    break;
                                }
                                None => return,
                            },
                            frame = source.next() => match frame {
                                Some(Ok(Message::Text(text))) => {
                                    let _ = received_tx.send(text.as_str().to_string());
                                }
                                Some(Ok(_)) => {}
                                _ => break,
                            },
                        }
                    }
                }
            }
        });

        Self {
            port,
            received,
            control,
            accepted,
            task,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("127.0.0.1", self.port).unwrap()
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn send_text(&self, text: &str) {
        let _ = self.control.send(RoverAction::Text(text.to_string()));
    }

    pub fn send_binary(&self, data: &[u8]) {
        let _ = self.control.send(RoverAction::Binary(data.to_vec()));
    }

    pub fn close_connection(&self) {
        let _ = self.control.send(RoverAction::Close);
    }

    /// Next text frame the rover received, or `None` after five seconds.
    pub async fn next_received(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(5), self.received.recv())
            .await
            .ok()
            .flatten()
    }

    /// Whatever has arrived so far, without waiting.
    pub fn drain_received(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(text) = self.received.try_recv() {
            out.push(text);
        }
        out
    }
}

impl Drop for MockRover {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// An endpoint nothing is listening on.
pub fn closed_endpoint() -> Endpoint {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Endpoint::new("127.0.0.1", port).unwrap()
}

/// Poll `condition` every 10ms for up to five seconds.
pub async fn eventually(what: &str, condition: impl Fn() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}
