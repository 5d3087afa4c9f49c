//! Round-trip statistics over a backtest trade log.

use serde::Serialize;

use super::backtest::Trade;
use super::signal::SignalAction;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TradeStats {
    pub round_trips: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakeven: usize,
    /// Fraction of round trips closed at a profit, 0 when there are none.
    pub win_rate: f64,
    pub realized_pnl: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl TradeStats {
    /// Pairs each buy with the sell that follows it. A trailing buy without
    /// a sell is an open position and is not counted.
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut stats = TradeStats::default();
        let mut entry: Option<&Trade> = None;

        for trade in trades {
            match trade.action {
                SignalAction::Buy => entry = Some(trade),
                SignalAction::Sell => {
                    let Some(open) = entry.take() else {
                        continue;
                    };
                    let pnl = trade.value - open.value;
                    stats.round_trips += 1;
                    stats.realized_pnl += pnl;
                    if pnl > 0.0 {
                        stats.wins += 1;
                        stats.largest_win = stats.largest_win.max(pnl);
                    } else if pnl < 0.0 {
                        stats.losses += 1;
                        stats.largest_loss = stats.largest_loss.max(pnl.abs());
                    } else {
                        stats.breakeven += 1;
                    }
                }
            }
        }

        if stats.round_trips > 0 {
            stats.win_rate = stats.wins as f64 / stats.round_trips as f64;
        }
        stats
    }
}
