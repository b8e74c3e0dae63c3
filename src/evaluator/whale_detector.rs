use std::collections::HashSet;

use crate::scanners::models::IndexedTransaction;
use crate::types::WhaleSwap;

pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Rough SOL price used to value swaps. There is no live price oracle, so
/// USD figures drift with the market.
pub const APPROX_SOL_PRICE_USD: f64 = 150.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Extracts swaps worth at least `min_usd` from a wallet's recent
/// transactions, skipping signatures already in `seen`.
pub fn extract_large_swaps(
    wallet: &str,
    transactions: &[IndexedTransaction],
    min_usd: f64,
    seen: &HashSet<String>,
) -> Vec<WhaleSwap> {
    transactions
        .iter()
        .filter(|tx| !seen.contains(&tx.signature))
        .filter_map(|tx| {
            let swap = tx.events.as_ref()?.swap.as_ref()?;

            let lamports = swap.native_input.as_ref().and_then(|n| n.amount).unwrap_or(0.0)
                + swap.native_output.as_ref().and_then(|n| n.amount).unwrap_or(0.0);
            let sol_amount = lamports / LAMPORTS_PER_SOL;
            let usd_estimate = sol_amount * APPROX_SOL_PRICE_USD;

            if usd_estimate < min_usd {
                return None;
            }

            Some(WhaleSwap {
                signature: tx.signature.clone(),
                wallet: wallet.to_string(),
                sol_amount: round2(sol_amount),
                usd_estimate: round2(usd_estimate),
                token_inputs: WhaleSwap::leg_mints(&swap.token_inputs),
                token_outputs: WhaleSwap::leg_mints(&swap.token_outputs),
                timestamp: tx.timestamp.unwrap_or(0),
                url: format!("https://solscan.io/tx/{}", tx.signature),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanners::models::{NativeAmount, SwapEvent, TokenLeg, TransactionEvents};

    fn swap_tx(signature: &str, input_lamports: f64, output_lamports: f64) -> IndexedTransaction {
        IndexedTransaction {
            signature: signature.to_string(),
            timestamp: Some(1_700_000_000),
            events: Some(TransactionEvents {
                swap: Some(SwapEvent {
                    native_input: Some(NativeAmount { account: None, amount: Some(input_lamports) }),
                    native_output: Some(NativeAmount { account: None, amount: Some(output_lamports) }),
                    token_inputs: vec![],
                    token_outputs: vec![TokenLeg { mint: "Mint111".to_string(), ..Default::default() }],
                }),
            }),
        }
    }

    #[test]
    fn test_one_sol_swap_against_floor() {
        let txs = vec![swap_tx("sig1", 600_000_000.0, 400_000_000.0)];
        let seen = HashSet::new();

        assert!(extract_large_swaps("wallet", &txs, 10_000.0, &seen).is_empty());

        let swaps = extract_large_swaps("wallet", &txs, 150.0, &seen);
        assert_eq!(swaps.len(), 1);
        assert_eq!(swaps[0].sol_amount, 1.0);
        assert_eq!(swaps[0].usd_estimate, 150.0);
        assert_eq!(swaps[0].token_outputs, vec!["Mint111"]);
        assert_eq!(swaps[0].url, "https://solscan.io/tx/sig1");
    }

    #[test]
    fn test_large_swap_included() {
        // 100 SOL ~ $15,000
        let txs = vec![swap_tx("big", 100.0 * LAMPORTS_PER_SOL, 0.0)];
        let swaps = extract_large_swaps("wallet", &txs, 10_000.0, &HashSet::new());
        assert_eq!(swaps.len(), 1);
        assert_eq!(swaps[0].sol_amount, 100.0);
    }

    #[test]
    fn test_non_swap_and_seen_transactions_skipped() {
        let transfer = IndexedTransaction {
            signature: "transfer".to_string(),
            ..Default::default()
        };
        let txs = vec![transfer, swap_tx("seen", 1e12, 0.0), swap_tx("fresh", 1e12, 0.0)];
        let seen: HashSet<String> = ["seen".to_string()].into_iter().collect();

        let swaps = extract_large_swaps("wallet", &txs, 10_000.0, &seen);
        assert_eq!(swaps.len(), 1);
        assert_eq!(swaps[0].signature, "fresh");
    }
}
