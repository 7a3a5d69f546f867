//! Agent Runtime Integration Test
//!
//! Drives momentum agents through their message state machine:
//! - Market data opening, stacking, adjusting and closing positions
//! - Risk updates replacing live limits
//! - Emergency stops clearing every position
//! - Spawned agents behind channel handles

use approx::assert_relative_eq;
use kestrel_core::{Direction, ExitReason};
use kestrel_risk_manager::{RiskConfig, RiskManager};
use kestrel_runner::{
    Agent, AgentConfig, AgentMessage, MarketDataPayload, MomentumAgent, Outcome, RuntimeError,
    TradeAction, spawn_agent,
};
use kestrel_strategy::RiskOverrides;
use serde_json::json;
use std::sync::Arc;

async fn running_agent(config: AgentConfig) -> MomentumAgent {
    let mut agent = MomentumAgent::momentum("test_momentum_agent", config).unwrap();
    agent.initialize().await.unwrap();
    agent
}

/// 25 prices climbing 0.5 per step from `start`
fn rising_from(start: f64) -> Vec<f64> {
    (0..25).map(|i| start + 0.5 * i as f64).collect()
}

fn market_data(prices: Vec<f64>) -> AgentMessage {
    let volumes = vec![1_000_000.0; prices.len()];
    AgentMessage::market_data("market_data_provider", &MarketDataPayload::new(prices, volumes))
}

fn closed_positions(outcome: &Outcome) -> &[kestrel_runner::ClosedPosition] {
    match outcome {
        Outcome::Processed {
            closed_positions, ..
        }
        | Outcome::EmergencyStopExecuted {
            closed_positions, ..
        } => closed_positions,
        _ => &[],
    }
}

#[tokio::test]
async fn test_process_raw_market_data_message() {
    let _ = env_logger::try_init();
    let mut agent = running_agent(AgentConfig::default()).await;

    let message: AgentMessage = serde_json::from_value(json!({
        "sender": "market_data_provider",
        "message_type": "market_data",
        "content": {
            "price": 100.0,
            "price_history": [95.0, 98.0, 100.0],
            "volume_history": [1000, 1200, 1100]
        },
        "priority": 1,
        "timestamp": "2024-01-01T00:00:00Z"
    }))
    .unwrap();

    let outcome = agent.process_message(message).await.unwrap();
    let value = outcome.to_json();
    assert_eq!(value["status"], "processed");
    assert_eq!(value["action"], "hold");
    assert!(agent.positions().is_empty());
}

#[tokio::test]
async fn test_risk_update_processing() {
    let mut agent = running_agent(AgentConfig::default()).await;

    let message = AgentMessage::new(
        "risk_manager",
        "risk_update",
        json!({
            "risk_limits": {
                "momentum_threshold": 0.03,
                "position_size": 0.15
            }
        }),
    )
    .with_priority(2);

    let outcome = agent.process_message(message).await.unwrap();
    assert_eq!(outcome.status(), "risk_updated");
    assert_eq!(
        outcome.to_json()["applied"],
        json!(["momentum_threshold", "position_size"])
    );
    assert_eq!(agent.limits().momentum_threshold, 0.03);
    assert_eq!(agent.limits().position_size, 0.15);
    assert_eq!(agent.strategy().momentum_threshold(), 0.03);
    assert_eq!(agent.strategy().base_position_size(), 0.15);
}

#[tokio::test]
async fn test_emergency_stop_clears_positions() {
    let _ = env_logger::try_init();
    let mut agent = running_agent(AgentConfig::default()).await;

    let outcome = agent.process_message(market_data(rising_from(100.0))).await.unwrap();
    assert!(outcome.action().is_some_and(TradeAction::is_opened));
    assert_eq!(agent.positions().len(), 1);

    let message = AgentMessage::new(
        "risk_manager",
        "emergency_stop",
        json!({"reason": "risk_limit_breach", "severity": "high"}),
    )
    .with_priority(3);
    let outcome = agent.process_message(message).await.unwrap();

    assert_eq!(outcome.status(), "emergency_stop_executed");
    assert!(agent.positions().is_empty());
    assert!(agent.is_emergency_stopped());
    let closed = closed_positions(&outcome);
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].reason, ExitReason::EmergencyStop);
    assert_eq!(agent.performance().closed_trades, 1);

    // No new positions until the agent is reinitialized
    let outcome = agent.process_message(market_data(rising_from(100.0))).await.unwrap();
    assert_eq!(
        outcome.action(),
        Some(&TradeAction::hold("emergency stop active"))
    );
    assert!(agent.positions().is_empty());

    agent.initialize().await.unwrap();
    assert!(!agent.is_emergency_stopped());
    let outcome = agent.process_message(market_data(rising_from(100.0))).await.unwrap();
    assert!(outcome.action().is_some_and(TradeAction::is_opened));
}

#[tokio::test]
async fn test_emergency_stop_closes_every_stacked_position() {
    let mut agent = running_agent(AgentConfig::default()).await;
    for _ in 0..3 {
        agent.process_message(market_data(rising_from(100.0))).await.unwrap();
    }
    let outcome = agent.process_message(market_data(rising_from(100.0))).await.unwrap();
    assert!(matches!(outcome.action(), Some(TradeAction::Adjusted { .. })));
    assert_eq!(agent.positions().len(), 3);
    assert_relative_eq!(agent.risk_metrics().total_exposure, 3.0 * 0.15 * 112.0, epsilon = 1e-9);

    let outcome = agent
        .process_message(AgentMessage::emergency_stop("risk_manager", "halt"))
        .await
        .unwrap();

    let closed = closed_positions(&outcome);
    assert_eq!(closed.len(), 3);
    assert!(closed.iter().all(|c| c.reason == ExitReason::EmergencyStop));
    assert_eq!(outcome.to_json()["unvalued_positions"], json!([]));
    assert!(agent.positions().is_empty());
    assert_eq!(agent.performance().total_trades, 3);
    assert_eq!(agent.performance().closed_trades, 3);
}

#[tokio::test]
async fn test_emergency_stop_with_malformed_payload() {
    let mut agent = running_agent(AgentConfig::default()).await;
    agent.process_message(market_data(rising_from(100.0))).await.unwrap();

    let message = AgentMessage::new("ops", "emergency_stop", json!("halt everything"));
    let outcome = agent.process_message(message).await.unwrap();
    assert_eq!(outcome.status(), "emergency_stop_executed");
    assert!(agent.positions().is_empty());
}

#[tokio::test]
async fn test_target_hit_counts_winning_trade() {
    let mut agent = running_agent(AgentConfig::default()).await;
    agent.process_message(market_data(rising_from(100.0))).await.unwrap();
    let entry = agent.positions()[0].entry_price;
    assert_relative_eq!(entry, 112.0);

    // Ends at 120, past the 116.48 target
    let outcome = agent.process_message(market_data(rising_from(108.0))).await.unwrap();

    let closed = closed_positions(&outcome);
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].reason, ExitReason::TargetReached);
    assert_relative_eq!(closed[0].pnl, 8.0 * 0.15, epsilon = 1e-9);

    let performance = agent.performance();
    assert_eq!(performance.closed_trades, 1);
    assert_eq!(performance.winning_trades, 1);
    assert_relative_eq!(performance.total_pnl, 1.2, epsilon = 1e-9);

    // Momentum is still up, so a fresh position opens at the new price
    assert!(outcome.action().is_some_and(TradeAction::is_opened));
    assert_eq!(performance.total_trades, 2);
    assert_relative_eq!(agent.positions()[0].entry_price, 120.0);
}

#[tokio::test]
async fn test_stop_loss_realizes_loss() {
    let mut agent = running_agent(AgentConfig::default()).await;
    agent.process_message(market_data(rising_from(100.0))).await.unwrap();

    // Falls from 117 to 105, through the 109.76 stop
    let prices = (0..25).map(|i| 117.0 - 0.5 * i as f64).collect();
    let outcome = agent.process_message(market_data(prices)).await.unwrap();

    let closed = closed_positions(&outcome);
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].reason, ExitReason::StopLoss);
    assert!(closed[0].pnl < 0.0);
    assert_eq!(agent.performance().winning_trades, 0);

    // The reversal is itself a short signal
    let Some(TradeAction::Opened { direction, .. }) = outcome.action() else {
        panic!("expected a short to open, got {outcome:?}");
    };
    assert_eq!(*direction, Direction::Short);
}

#[tokio::test]
async fn test_risk_engine_rejection() {
    let config = AgentConfig {
        risk: RiskConfig {
            max_position_size: 0.12,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut agent = running_agent(config).await;

    let outcome = agent.process_message(market_data(rising_from(100.0))).await.unwrap();
    let Some(TradeAction::Rejected { reason }) = outcome.action() else {
        panic!("expected a rejection, got {outcome:?}");
    };
    assert!(reason.contains("Position size exceeds limit"));
    assert!(agent.positions().is_empty());
    assert_eq!(agent.performance().total_trades, 0);
}

#[tokio::test]
async fn test_drawdown_blocks_new_positions() {
    let mut agent = running_agent(AgentConfig::default()).await;
    agent.process_message(market_data(rising_from(100.0))).await.unwrap();

    let update = AgentMessage::risk_update(
        "risk_manager",
        RiskOverrides {
            max_drawdown: Some(1e-9),
            ..Default::default()
        },
    );
    agent.process_message(update).await.unwrap();

    // Slips below entry without reaching the stop
    let mut prices = rising_from(100.0);
    prices[24] = 111.0;
    let outcome = agent.process_message(market_data(prices)).await.unwrap();

    assert_eq!(
        outcome.action(),
        Some(&TradeAction::hold("max drawdown exceeded"))
    );
    assert!(agent.risk_metrics().drawdown > 0.0);
    assert_eq!(agent.positions().len(), 1);
}

#[tokio::test]
async fn test_unknown_message_is_ignored() {
    let mut agent = running_agent(AgentConfig::default()).await;
    let message = AgentMessage::new("strategy", "strategy_signal", json!({"signal": 1.0}));

    let outcome = agent.process_message(message).await.unwrap();
    assert_eq!(outcome.status(), "ignored");
    assert_eq!(outcome.to_json()["message_type"], "strategy_signal");
}

#[tokio::test]
async fn test_invalid_market_data_is_reported() {
    let mut agent = running_agent(AgentConfig::default()).await;
    let message = AgentMessage::new(
        "feed",
        "market_data",
        json!({"price_history": [100.0, -1.0], "volume_history": [1.0, 1.0]}),
    );

    let err = agent.process_message(message).await.unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidMessage { .. }));
}

#[tokio::test]
async fn test_spawned_agents_share_risk_engine() {
    let _ = env_logger::try_init();
    let risk = Arc::new(RiskManager::new(AgentConfig::default().risk));

    let mut handles = Vec::new();
    let mut tasks = Vec::new();
    for i in 0..3 {
        let agent = MomentumAgent::momentum(format!("momentum-{i}"), AgentConfig::default())
            .unwrap()
            .with_risk_manager(Arc::clone(&risk));
        let (handle, task) = spawn_agent(agent, 16);
        handles.push(handle);
        tasks.push(task);
    }

    for handle in &handles {
        let outcome = handle.send(market_data(rising_from(100.0))).await.unwrap();
        assert!(outcome.action().is_some_and(TradeAction::is_opened));
    }
    for handle in &handles {
        let outcome = handle
            .send(AgentMessage::emergency_stop("ops", "end of session"))
            .await
            .unwrap();
        assert_eq!(outcome.status(), "emergency_stop_executed");
        handle.shutdown().await.unwrap();
    }

    for task in tasks {
        let agent = task.await.unwrap();
        assert!(agent.positions().is_empty());
        assert_eq!(agent.performance().total_trades, 1);
        assert_eq!(agent.performance().closed_trades, 1);
    }
}
