#![allow(clippy::format_push_string)]

use crate::record::TradeRecord;
use crate::summary::Summary;

pub struct SummaryFormatter;

impl SummaryFormatter {
    #[must_use]
    pub fn format(summary: &Summary) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                    TRADING JOURNAL SUMMARY                    \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("Trades\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Total Trades:          {}\n", summary.total_trades));
        output.push_str(&format!("Winning Trades:        {}\n", summary.winning_trades));
        output.push_str(&format!("Losing Trades:         {}\n", summary.losing_trades));
        output.push_str(&format!("Break Even Trades:     {}\n", summary.break_even_trades));
        output.push_str(&format!("Win Rate:              {}%\n", summary.win_rate));
        output.push_str(&format!("Lose Rate:             {}%\n", summary.lose_rate));
        output.push('\n');

        output.push_str("Profit & Loss\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Largest Win:           {}\n", summary.largest_win));
        output.push_str(&format!("Largest Loss:          {}\n", summary.largest_loss));
        output.push_str(&format!("Total P/L:             {}\n", summary.total_pl));
        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");

        if summary.total_trades == 0 {
            output.push_str("\nNo trades recorded yet.\n\n");
        }

        output
    }

    /// Renders trades as a fixed-width table, one line per trade.
    #[must_use]
    pub fn format_trades(records: &[TradeRecord]) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{:>5}  {:<20} {:<8} {:<6} {:>10} {:>10} {:>10} {:>12}  {}\n",
            "Sl", "Script", "Time", "Side", "Entry", "Exit", "Qty", "P/L", "Rules"
        ));

        let cell = |value: Option<rust_decimal::Decimal>| {
            value.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
        };

        for record in records {
            let trade = &record.trade;
            output.push_str(&format!(
                "{:>5}  {:<20} {:<8} {:<6} {:>10} {:>10} {:>10} {:>12}  {}\n",
                record.sl_no,
                trade.script_name,
                trade.time,
                trade.direction,
                cell(trade.entry_price),
                cell(trade.exit_price),
                cell(trade.quantity),
                cell(trade.pl),
                trade.followed_rules,
            ));
        }

        output
    }
}
