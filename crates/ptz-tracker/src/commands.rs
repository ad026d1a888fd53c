//! Operator input queue.
//!
//! Input arrives asynchronously (stdin lines, Ctrl-C) and is queued; the loop
//! drains the queue once per tick, before the control step.

use ptz_models::{OperatorCommand, OperatorEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const QUEUE_CAPACITY: usize = 64;

/// Receiving end of the operator queue.
pub struct CommandQueue {
    rx: mpsc::Receiver<OperatorEvent>,
}

impl CommandQueue {
    /// Create a queue and its sender.
    pub fn new() -> (mpsc::Sender<OperatorEvent>, Self) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        (tx, Self { rx })
    }

    /// Take everything queued so far without waiting.
    pub fn drain(&mut self) -> Vec<OperatorEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Read operator lines from `reader` until EOF.
pub fn spawn_line_reader<R>(reader: R, tx: mpsc::Sender<OperatorEvent>) -> JoinHandle<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = reader.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match line.parse::<OperatorEvent>() {
                    Ok(event) => {
                        debug!(?event, "Operator input");
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Ignoring input {:?}: {}", line, e),
                },
                Ok(None) => {
                    debug!("Operator input closed");
                    break;
                }
                Err(e) => {
                    warn!("Failed to read operator input: {}", e);
                    break;
                }
            }
        }
    })
}

/// Queue an exit when Ctrl-C arrives.
pub fn spawn_ctrl_c(tx: mpsc::Sender<OperatorEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            let _ = tx.send(OperatorCommand::Exit.into()).await;
        }
    })
}
