//! Agent task and handle
//!
//! `spawn_agent` moves an agent onto its own tokio task fed by a bounded
//! channel. Each request carries a oneshot reply, so callers await the
//! outcome of exactly their message. Delivery order is arrival order.

use crate::agent::Agent;
use crate::error::RuntimeError;
use crate::messages::{AgentMessage, Outcome};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

enum Command {
    Process {
        message: AgentMessage,
        reply_tx: oneshot::Sender<Result<Outcome, RuntimeError>>,
    },
    Shutdown,
}

/// Sending side of a spawned agent
#[derive(Clone)]
pub struct AgentHandle {
    id: String,
    tx: mpsc::Sender<Command>,
}

impl AgentHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Deliver a message and wait for its outcome
    pub async fn send(&self, message: AgentMessage) -> Result<Outcome, RuntimeError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Process { message, reply_tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;

        reply_rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Stop the agent after the messages already queued
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::ChannelClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Run `agent` on its own task
///
/// The task initializes the agent, then handles one message at a time until
/// a shutdown request or every handle being dropped. An agent that fails to
/// initialize never enters the loop: its channel is closed, so every send
/// reports `ChannelClosed`. Either way the task shuts the agent down and
/// hands it back through the join handle.
pub fn spawn_agent<A>(agent: A, buffer: usize) -> (AgentHandle, JoinHandle<A>)
where
    A: Agent + 'static,
{
    let (tx, mut rx) = mpsc::channel(buffer.max(1));
    let handle = AgentHandle {
        id: agent.id().to_string(),
        tx,
    };

    let task = tokio::spawn(async move {
        let mut agent = agent;
        if let Err(e) = agent.initialize().await {
            log::error!("[{}] Initialization failed, not starting: {}", agent.id(), e);
            rx.close();
            agent.shutdown().await;
            return agent;
        }

        while let Some(command) = rx.recv().await {
            match command {
                Command::Process { message, reply_tx } => {
                    let result = agent.process_message(message).await;
                    if let Err(e) = &result {
                        log::warn!("[{}] Message failed: {}", agent.id(), e);
                    }

                    // Sender may have stopped waiting
                    let _ = reply_tx.send(result);
                }
                Command::Shutdown => break,
            }
        }

        rx.close();
        agent.shutdown().await;
        agent
    });

    (handle, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentState, MomentumAgent};
    use crate::config::AgentConfig;
    use async_trait::async_trait;
    use serde_json::json;

    /// Agent whose initialization always fails
    struct Unstartable {
        initialized: bool,
        processed: usize,
        shut_down: bool,
    }

    #[async_trait]
    impl Agent for Unstartable {
        fn id(&self) -> &str {
            "unstartable"
        }

        async fn initialize(&mut self) -> Result<(), RuntimeError> {
            self.initialized = true;
            Err(RuntimeError::invalid_message("config", "missing risk engine"))
        }

        async fn process_message(&mut self, _: AgentMessage) -> Result<Outcome, RuntimeError> {
            self.processed += 1;
            Err(RuntimeError::NotRunning(AgentState::Initialized))
        }

        async fn shutdown(&mut self) {
            self.shut_down = true;
        }
    }

    #[tokio::test]
    async fn test_spawned_agent_round_trip() {
        let agent = MomentumAgent::momentum("spawned", AgentConfig::default()).unwrap();
        let (handle, task) = spawn_agent(agent, 8);
        assert_eq!(handle.id(), "spawned");

        let outcome = handle
            .send(AgentMessage::new("feed", "heartbeat", json!({})))
            .await
            .unwrap();
        assert_eq!(outcome.status(), "ignored");

        handle.shutdown().await.unwrap();
        let agent = task.await.unwrap();
        assert_eq!(agent.state(), AgentState::ShutDown);
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_dropping_handles_stops_agent() {
        let agent = MomentumAgent::momentum("dropped", AgentConfig::default()).unwrap();
        let (handle, task) = spawn_agent(agent, 8);
        drop(handle);

        let agent = task.await.unwrap();
        assert_eq!(agent.state(), AgentState::ShutDown);
    }

    #[tokio::test]
    async fn test_send_after_shutdown_fails() {
        let agent = MomentumAgent::momentum("closed", AgentConfig::default()).unwrap();
        let (handle, task) = spawn_agent(agent, 8);
        handle.shutdown().await.unwrap();
        task.await.unwrap();

        let err = handle
            .send(AgentMessage::new("feed", "heartbeat", json!({})))
            .await
            .unwrap_err();
        assert_eq!(err, RuntimeError::ChannelClosed);
    }

    #[tokio::test]
    async fn test_failed_initialize_stops_task() {
        let _ = env_logger::try_init();
        let agent = Unstartable {
            initialized: false,
            processed: 0,
            shut_down: false,
        };
        let (handle, task) = spawn_agent(agent, 8);

        let agent = task.await.unwrap();
        assert!(agent.initialized);
        assert!(agent.shut_down);
        assert_eq!(agent.processed, 0);
        assert!(handle.is_closed());

        let err = handle
            .send(AgentMessage::new("feed", "heartbeat", json!({})))
            .await
            .unwrap_err();
        assert_eq!(err, RuntimeError::ChannelClosed);
    }
}
