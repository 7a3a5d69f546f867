//! Risk Engine Integration Test
//!
//! Position scoring, portfolio aggregation, trade validation and the
//! risk score, against the default limits.

use approx::assert_relative_eq;
use kestrel_core::{Direction, Position, stats};
use kestrel_risk_manager::{
    LimitViolation, RiskConfig, RiskLimits, RiskManager, TradeProposal,
};

fn risk_manager() -> RiskManager {
    RiskManager::new(RiskConfig {
        max_position_size: 0.1,
        max_portfolio_var: 0.2,
        max_drawdown: 0.15,
        correlation_limit: 0.7,
        risk_limits: RiskLimits {
            max_exposure: 1_000_000.0,
            max_leverage: 2.0,
            account_balance: 100_000.0,
            available_margin: 100_000.0,
        },
    })
}

fn winning_position() -> Position {
    Position::new(Direction::Long, 100.0, 1.0).with_history(vec![98.0, 99.0, 100.0, 102.0, 105.0])
}

fn losing_position() -> Position {
    Position::new(Direction::Long, 50.0, 2.0).with_history(vec![50.0, 49.0, 48.0, 47.0, 48.0])
}

#[test]
fn test_position_risk_calculation() {
    let risk = risk_manager()
        .calculate_position_risk(&winning_position())
        .unwrap();

    assert_relative_eq!(risk.pnl, 5.0);
    assert_relative_eq!(
        risk.volatility,
        stats::return_volatility(&[98.0, 99.0, 100.0, 102.0, 105.0])
    );
    assert!(risk.volatility > 0.0);
    assert_relative_eq!(risk.notional, 105.0);
}

#[test]
fn test_portfolio_risk_calculation() {
    let positions = vec![winning_position(), losing_position()];
    let metrics = risk_manager().calculate_portfolio_risk(&positions).unwrap();

    assert_eq!(metrics.position_count, 2);
    // 105 * 1 + 48 * 2
    assert_relative_eq!(metrics.total_exposure, 201.0);
    assert_relative_eq!(metrics.unrealized_pnl, 1.0);

    let expected_volatility = (stats::return_volatility(&positions[0].price_history)
        + 2.0 * stats::return_volatility(&positions[1].price_history))
        / 3.0;
    assert_relative_eq!(metrics.volatility, expected_volatility, epsilon = 1e-12);

    // Combined PnL path: -2, -3, -4, -4, +1 on a 100k account
    assert_relative_eq!(metrics.drawdown, 2.0 / 99_998.0, epsilon = 1e-12);
    assert!(risk_manager().check_portfolio(&metrics).iter().all(|v| !matches!(
        v,
        LimitViolation::Drawdown { .. } | LimitViolation::PortfolioVariance { .. }
    )));
}

#[test]
fn test_trade_validation() {
    let manager = risk_manager();

    let decision = manager
        .validate_trade(&TradeProposal::new(0.05, 100.0))
        .unwrap();
    assert!(decision.accepted);

    let (accepted, reason) = manager
        .validate_trade(&TradeProposal::new(0.2, 100.0))
        .unwrap()
        .into_parts();
    assert!(!accepted);
    assert!(reason.contains("Position size exceeds limit"));
}

#[test]
fn test_trade_validation_rejects_malformed_input() {
    let manager = risk_manager();
    assert!(manager.validate_trade(&TradeProposal::new(f64::NAN, 100.0)).is_err());
    assert!(manager.validate_trade(&TradeProposal::new(0.05, -1.0)).is_err());
}

#[test]
fn test_risk_score_calculation() {
    let manager = risk_manager();
    let score = manager.risk_score(0.05, 0.1).unwrap();
    assert!((0.0..=1.0).contains(&score));
    assert_relative_eq!(score, 0.075, epsilon = 1e-12);
}

#[test]
fn test_risk_score_is_commutative() {
    let manager = risk_manager();
    let inputs = [0.0, 0.05, 0.1, 0.33, 0.7, 1.0];
    for a in inputs {
        for b in inputs {
            assert_eq!(
                manager.risk_score(a, b).unwrap(),
                manager.risk_score(b, a).unwrap()
            );
        }
    }
}

#[test]
fn test_shared_engine_across_threads() {
    let manager = std::sync::Arc::new(risk_manager());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let manager = manager.clone();
            std::thread::spawn(move || {
                let size = 0.04 * (i + 1) as f64;
                manager
                    .validate_trade(&TradeProposal::new(size, 100.0))
                    .unwrap()
                    .accepted
            })
        })
        .collect();

    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![true, true, false, false]);
}
