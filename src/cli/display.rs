use crate::core::{Percent, Pool, TokenAmount, Trade, TradeType};
use crate::trade::{price_breakdown, slippage_adjusted_amounts, warning_severity};
use colored::*;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Display helpers for trades and pools.
pub struct SwapDisplay;

impl SwapDisplay {
    pub fn create_progress_bar(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Display a single trade candidate.
    pub fn display_trade(trade: &Trade, slippage_bps: u16, is_best: bool) {
        let best_marker = if is_best {
            " ★ BEST".bright_green().bold()
        } else {
            "".normal()
        };

        let path: Vec<&str> = trade
            .route
            .path
            .iter()
            .map(|token| token.symbol.as_str())
            .collect();
        println!(
            "{} {}{}",
            style("►").cyan(),
            path.join(" > ").bold(),
            best_marker
        );

        println!(
            "  {} {} -> {} {}",
            format_amount(&trade.input_amount),
            trade.input_amount.currency.symbol(),
            format_amount(&trade.output_amount),
            trade.output_amount.currency.symbol()
        );

        if let Ok(adjusted) = slippage_adjusted_amounts(trade, slippage_bps as u64) {
            match trade.trade_type {
                TradeType::ExactInput => println!(
                    "  Minimum received: {} {} ({} bps slippage)",
                    format_amount(&adjusted.minimum_output),
                    adjusted.minimum_output.currency.symbol(),
                    slippage_bps
                ),
                TradeType::ExactOutput => println!(
                    "  Maximum sold: {} {} ({} bps slippage)",
                    format_amount(&adjusted.maximum_input),
                    adjusted.maximum_input.currency.symbol(),
                    slippage_bps
                ),
            }
        }

        if let Ok(breakdown) = price_breakdown(trade) {
            println!(
                "  Price impact: {} | LP fee: {} {}",
                format_impact(breakdown.price_impact_without_fee.as_ref()),
                format_amount(&breakdown.realized_lp_fee_amount),
                breakdown.realized_lp_fee_amount.currency.symbol()
            );
        }
    }

    pub fn display_pool(pool: &Pool, detailed: bool) {
        println!(
            "{} {}/{} pool {:?}",
            style("►").cyan(),
            pool.token0.symbol.bold(),
            pool.token1.symbol.bold(),
            pool.address
        );
        println!(
            "  Reserves: {} {} / {} {}",
            pool.reserve0,
            pool.token0.symbol,
            pool.reserve1,
            pool.token1.symbol
        );
        if detailed {
            println!(
                "  Fee: {} bps | Snapshot block: {}",
                pool.fee_bips, pool.block_number
            );
        }
    }
}

/// Human-friendly amount: scaled by decimals, trimmed to 6 places.
pub fn format_amount(amount: &TokenAmount) -> String {
    let exact = amount.to_decimal_string(amount.currency.decimals() as usize);
    match Decimal::from_str(&exact) {
        Ok(decimal) => decimal.round_dp(6).normalize().to_string(),
        Err(_) => exact,
    }
}

/// Price impact colored by warning severity.
pub fn format_impact(impact: Option<&Percent>) -> ColoredString {
    let text = match impact {
        Some(impact) => format!("{}%", impact.to_percent_string(2)),
        None => "unknown".to_string(),
    };
    match warning_severity(impact) {
        0 => text.green(),
        1 => text.normal(),
        2 => text.yellow(),
        3 => text.bright_red(),
        _ => text.red().bold(),
    }
}
