//! Journal performance statistics.

use crate::record::TradeRecord;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Aggregate metrics over a set of trades.
///
/// Rates are pre-formatted percentages with two decimal places.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub break_even_trades: usize,
    pub win_rate: String,
    pub lose_rate: String,
    pub largest_win: Decimal,
    pub largest_loss: Decimal,
    pub total_pl: Decimal,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            break_even_trades: 0,
            win_rate: "0.00".to_string(),
            lose_rate: "0.00".to_string(),
            largest_win: Decimal::ZERO,
            largest_loss: Decimal::ZERO,
            total_pl: Decimal::ZERO,
        }
    }
}

/// Computes summary statistics for the given trades.
///
/// A missing P/L counts as zero, i.e. as a break-even trade. The total
/// saturates at the bounds of [`Decimal`] instead of overflowing.
#[must_use]
pub fn summarize(records: &[TradeRecord]) -> Summary {
    if records.is_empty() {
        return Summary::default();
    }

    let mut summary = Summary {
        total_trades: records.len(),
        ..Summary::default()
    };

    for pl in records.iter().map(TradeRecord::pl_or_zero) {
        summary.total_pl = saturating_add(summary.total_pl, pl);

        if pl > Decimal::ZERO {
            summary.winning_trades += 1;
            summary.largest_win = summary.largest_win.max(pl);
        } else if pl < Decimal::ZERO {
            summary.losing_trades += 1;
            summary.largest_loss = summary.largest_loss.min(pl);
        } else {
            summary.break_even_trades += 1;
        }
    }

    summary.win_rate = percentage(summary.winning_trades, summary.total_trades);
    summary.lose_rate = percentage(summary.losing_trades, summary.total_trades);
    summary
}

fn saturating_add(total: Decimal, pl: Decimal) -> Decimal {
    total.checked_add(pl).unwrap_or(if pl.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

fn percentage(part: usize, total: usize) -> String {
    if total == 0 {
        return "0.00".to_string();
    }
    let rate = Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(total);
    let rounded = rate.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    format!("{rounded:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Direction, NewTrade, RuleCompliance};
    use rust_decimal_macros::dec;

    fn trade_with_pl(sl_no: u64, pl: Option<Decimal>) -> TradeRecord {
        TradeRecord::new(
            sl_no.to_string(),
            sl_no,
            NewTrade {
                script_name: "BANKNIFTY".to_string(),
                time: "09:30".to_string(),
                direction: Direction::Short,
                entry_price: Some(dec!(100)),
                stop_loss: None,
                quantity: Some(dec!(1)),
                account_risked: None,
                target_price: None,
                exit_price: Some(dec!(90)),
                exit_time: None,
                risk_reward: None,
                pl,
                followed_rules: RuleCompliance::Yes,
            },
        )
    }

    fn trades(pls: &[Option<Decimal>]) -> Vec<TradeRecord> {
        pls.iter()
            .enumerate()
            .map(|(i, pl)| trade_with_pl(i as u64 + 1, *pl))
            .collect()
    }

    #[test]
    fn test_empty_journal() {
        let summary = summarize(&[]);

        assert_eq!(summary.total_trades, 0);
        assert_eq!(summary.winning_trades, 0);
        assert_eq!(summary.losing_trades, 0);
        assert_eq!(summary.break_even_trades, 0);
        assert_eq!(summary.win_rate, "0.00");
        assert_eq!(summary.lose_rate, "0.00");
        assert_eq!(summary.largest_win, Decimal::ZERO);
        assert_eq!(summary.largest_loss, Decimal::ZERO);
        assert_eq!(summary.total_pl, Decimal::ZERO);
    }

    #[test]
    fn test_win_loss_breakeven_mix() {
        let summary = summarize(&trades(&[Some(dec!(100)), Some(dec!(-50)), Some(dec!(0))]));

        assert_eq!(summary.total_trades, 3);
        assert_eq!(summary.winning_trades, 1);
        assert_eq!(summary.losing_trades, 1);
        assert_eq!(summary.break_even_trades, 1);
        assert_eq!(summary.win_rate, "33.33");
        assert_eq!(summary.lose_rate, "33.33");
        assert_eq!(summary.total_pl, dec!(50));
        assert_eq!(summary.largest_win, dec!(100));
        assert_eq!(summary.largest_loss, dec!(-50));
    }

    #[test]
    fn test_missing_pl_counts_as_break_even() {
        let summary = summarize(&trades(&[None, Some(dec!(25.5)), None]));

        assert_eq!(summary.break_even_trades, 2);
        assert_eq!(summary.winning_trades, 1);
        assert_eq!(summary.total_pl, dec!(25.5));
        assert_eq!(summary.win_rate, "33.33");
        assert_eq!(summary.lose_rate, "0.00");
    }

    #[test]
    fn test_only_losses_keeps_largest_win_at_zero() {
        let summary = summarize(&trades(&[Some(dec!(-10)), Some(dec!(-250.75)), Some(dec!(-3))]));

        assert_eq!(summary.largest_win, Decimal::ZERO);
        assert_eq!(summary.largest_loss, dec!(-250.75));
        assert_eq!(summary.lose_rate, "100.00");
        assert_eq!(summary.win_rate, "0.00");
        assert_eq!(summary.total_pl, dec!(-263.75));
    }

    #[test]
    fn test_only_wins_keeps_largest_loss_at_zero() {
        let summary = summarize(&trades(&[Some(dec!(5)), Some(dec!(12))]));

        assert_eq!(summary.largest_win, dec!(12));
        assert_eq!(summary.largest_loss, Decimal::ZERO);
        assert_eq!(summary.win_rate, "100.00");
    }

    #[test]
    fn test_rate_rounding() {
        // 2 of 3 -> 66.666...
        let summary = summarize(&trades(&[Some(dec!(1)), Some(dec!(1)), Some(dec!(-1))]));
        assert_eq!(summary.win_rate, "66.67");
        assert_eq!(summary.lose_rate, "33.33");

        // 1 of 8 -> 12.5
        let mut pls = vec![Some(dec!(1))];
        pls.extend(std::iter::repeat(Some(dec!(-1))).take(7));
        let summary = summarize(&trades(&pls));
        assert_eq!(summary.win_rate, "12.50");
        assert_eq!(summary.lose_rate, "87.50");
    }

    #[test]
    fn test_huge_pl_saturates_total() {
        let huge = crate::record::parse_decimal_lenient("5e28").unwrap();
        let summary = summarize(&trades(&[Some(huge), Some(huge), Some(dec!(-1))]));

        assert_eq!(summary.total_pl, Decimal::MAX - Decimal::ONE);
        assert_eq!(summary.largest_win, huge);
        assert_eq!(summary.winning_trades, 2);

        let summary = summarize(&trades(&[Some(-huge), Some(-huge)]));
        assert_eq!(summary.total_pl, Decimal::MIN);
        assert_eq!(summary.lose_rate, "100.00");
    }

    #[test]
    fn test_counts_partition_total() {
        let pls = [
            Some(dec!(3)),
            Some(dec!(-7)),
            None,
            Some(dec!(0.01)),
            Some(dec!(-0.01)),
            Some(dec!(0)),
            Some(dec!(1000)),
        ];
        let records = trades(&pls);
        let summary = summarize(&records);

        assert_eq!(
            summary.winning_trades + summary.losing_trades + summary.break_even_trades,
            summary.total_trades
        );
        let expected: Decimal = pls.iter().map(|pl| pl.unwrap_or_default()).sum();
        assert_eq!(summary.total_pl, expected);
        assert!(summary.largest_win >= Decimal::ZERO);
        assert!(summary.largest_loss <= Decimal::ZERO);
    }
}
