pub mod call_builder;
pub mod permit;
pub mod registry;

pub use call_builder::{
    build_swap_calls, resolve_recipient, RecipientState, SwapCall, SwapCallOptions,
};
pub use permit::{PermitSigner, PermitState, SignatureData};
pub use registry::TransactionRegistry;

use crate::core::{
    constants::{BIPS_BASE, GAS_ESTIMATE_MARGIN_BPS, USER_REJECTED_REQUEST_CODE},
    error::SwapResult,
    SwapError, Trade,
};
use ethers::providers::{Middleware, MiddlewareError};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, TransactionRequest, TxHash, U256};
use futures::future::join_all;
use log::{debug, error, info};
use std::sync::Arc;

/// Whether a swap submission can be offered at all. Downstream estimation
/// failures do not gate this; they surface at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapCallbackState {
    Invalid(String),
    Loading,
    Valid,
}

pub fn swap_callback_state(
    trade: Option<&Trade>,
    account: Option<Address>,
    chain_id: Option<u64>,
    recipient: &RecipientState,
) -> SwapCallbackState {
    if trade.is_none() {
        return SwapCallbackState::Invalid("missing trade".to_string());
    }
    if account.is_none() || chain_id.is_none() {
        return SwapCallbackState::Invalid("wallet not connected".to_string());
    }
    match recipient {
        RecipientState::Invalid(reason) => {
            SwapCallbackState::Invalid(format!("could not resolve recipient: {}", reason))
        }
        RecipientState::Pending => SwapCallbackState::Loading,
        RecipientState::Resolved(_) => SwapCallbackState::Valid,
    }
}

/// Per-candidate result of the estimation fan-out.
#[derive(Debug)]
pub enum EstimateOutcome {
    Estimated { call: SwapCall, gas: U256 },
    Failed { call: SwapCall, error: SwapError },
}

/// Maps a revert reason onto the message shown to the user. Slippage-family
/// reverts get the friendly explanation; anything else carries the raw
/// reason.
pub fn swap_error_to_user_message(reason: &str) -> String {
    if reason.contains("INSUFFICIENT_OUTPUT_AMOUNT") || reason.contains("EXCESSIVE_INPUT_AMOUNT")
    {
        "This transaction will not succeed either due to price movement or fee on transfer. \
         Try increasing your slippage tolerance."
            .to_string()
    } else if reason.contains("TRANSFER_FROM_FAILED") {
        "The input token cannot be transferred. There may be an issue with the input token."
            .to_string()
    } else if reason.contains("TRANSFER_FAILED") {
        "The output token cannot be transferred. There may be an issue with the output token."
            .to_string()
    } else {
        format!(
            "The transaction cannot succeed due to error: {}. \
             This is probably an issue with one of the tokens you are swapping.",
            reason
        )
    }
}

fn extract_revert_reason(message: &str) -> String {
    if let Some(idx) = message.find("execution reverted") {
        let rest = message[idx + "execution reverted".len()..]
            .trim_start_matches(':')
            .trim();
        // reasons are frequently followed by provider boilerplate
        let rest = rest.split(&['\n', '"'][..]).next().unwrap_or(rest).trim();
        if !rest.is_empty() {
            return rest.trim_end_matches(',').to_string();
        }
    }
    message.trim().to_string()
}

/// Picks the winning candidate from the fan-out outcomes: the last
/// candidate whose estimation succeeded. With the fee-on-transfer variant
/// listed after the standard call, this prefers it whenever it also
/// succeeds. With no success at all, the last captured failure is
/// surfaced; a missing failure is a defensive branch that should be
/// unreachable.
pub fn select_estimated(outcomes: Vec<EstimateOutcome>) -> SwapResult<(SwapCall, U256)> {
    let mut selected: Option<(SwapCall, U256)> = None;
    let mut last_failure: Option<SwapError> = None;

    for outcome in outcomes {
        match outcome {
            EstimateOutcome::Estimated { call, gas } => selected = Some((call, gas)),
            EstimateOutcome::Failed { call, error } => {
                debug!("Estimation failed for {}: {}", call.method, error);
                last_failure = Some(error);
            }
        }
    }

    match selected {
        Some(winner) => Ok(winner),
        None => Err(last_failure.unwrap_or_else(|| {
            SwapError::EstimationFailed(
                "Unexpected error. Could not estimate gas for the swap.".to_string(),
            )
        })),
    }
}

/// Gas limit actually submitted: the estimate plus a fixed safety margin.
pub fn with_gas_margin(gas: U256) -> U256 {
    gas * U256::from(BIPS_BASE + GAS_ESTIMATE_MARGIN_BPS) / U256::from(BIPS_BASE)
}

fn is_user_rejection<E: MiddlewareError>(error: &E) -> bool {
    error
        .as_error_response()
        .map(|response| response.code == USER_REJECTED_REQUEST_CODE)
        .unwrap_or(false)
}

fn shorten_address(address: Address) -> String {
    let full = format!("{:?}", address);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

/// Human-readable record of the submitted swap, e.g.
/// "Swap 1.2300 TKA for 4.5600 TKB to 0x1234…abcd".
pub fn swap_summary(trade: &Trade, recipient: Option<Address>) -> String {
    let base = format!(
        "Swap {} {} for {} {}",
        trade.input_amount.to_decimal_string(4),
        trade.input_amount.currency.symbol(),
        trade.output_amount.to_decimal_string(4),
        trade.output_amount.currency.symbol(),
    );
    match recipient {
        Some(address) => format!("{} to {}", base, shorten_address(address)),
        None => base,
    }
}

pub struct SubmittedSwap {
    pub tx_hash: TxHash,
    pub summary: String,
}

/// Runs the submission protocol for one trade: estimate every candidate in
/// parallel, probe failures for their revert reason, pick the winner, and
/// send it with a gas safety margin.
pub struct SwapExecutor<M> {
    client: Arc<M>,
    account: Address,
    registry: Arc<TransactionRegistry>,
}

impl<M: Middleware> SwapExecutor<M> {
    pub fn new(client: Arc<M>, account: Address, registry: Arc<TransactionRegistry>) -> Self {
        Self {
            client,
            account,
            registry,
        }
    }

    fn call_to_tx(&self, call: &SwapCall) -> TypedTransaction {
        let mut tx = TransactionRequest::new()
            .from(self.account)
            .to(call.target)
            .data(call.calldata.clone());
        if !call.value.is_zero() {
            tx = tx.value(call.value);
        }
        tx.into()
    }

    async fn estimate_one(&self, call: SwapCall) -> EstimateOutcome {
        let tx = self.call_to_tx(&call);
        match self.client.estimate_gas(&tx, None).await {
            Ok(gas) => {
                debug!("Estimated {} at {} gas", call.method, gas);
                EstimateOutcome::Estimated { call, gas }
            }
            Err(estimate_err) => {
                debug!(
                    "Gas estimation failed for {}, probing with a static call: {}",
                    call.method, estimate_err
                );
                // re-issue the identical call read-only to pull out the
                // revert reason
                let error = match self.client.call(&tx, None).await {
                    Ok(_) => SwapError::EstimationFailed(
                        "Unexpected issue with estimating the gas. Please try again."
                            .to_string(),
                    ),
                    Err(call_err) => {
                        let reason = extract_revert_reason(&call_err.to_string());
                        SwapError::EstimationFailed(swap_error_to_user_message(&reason))
                    }
                };
                EstimateOutcome::Failed { call, error }
            }
        }
    }

    /// Fan-out/fan-in: every candidate is estimated concurrently and all
    /// outcomes are collected before selection.
    pub async fn estimate_calls(&self, calls: Vec<SwapCall>) -> Vec<EstimateOutcome> {
        join_all(calls.into_iter().map(|call| self.estimate_one(call))).await
    }

    pub async fn execute(
        &self,
        trade: &Trade,
        calls: Vec<SwapCall>,
        recipient: Address,
    ) -> SwapResult<SubmittedSwap> {
        if calls.is_empty() {
            return Err(SwapError::SwapFailed(
                "no swap calls to execute".to_string(),
            ));
        }

        let outcomes = self.estimate_calls(calls).await;
        let (call, gas) = select_estimated(outcomes)?;
        let gas_limit = with_gas_margin(gas);
        info!(
            "Submitting {} with gas limit {} (estimated {})",
            call.method, gas_limit, gas
        );

        let mut request = TransactionRequest::new()
            .from(self.account)
            .to(call.target)
            .data(call.calldata.clone())
            .gas(gas_limit);
        if !call.value.is_zero() {
            request = request.value(call.value);
        }
        let tx: TypedTransaction = request.into();

        let pending = match self.client.send_transaction(tx, None).await {
            Ok(pending) => pending,
            Err(e) => {
                if is_user_rejection(&e) {
                    info!("Transaction rejected by the user");
                    return Err(SwapError::TransactionRejected);
                }
                error!(
                    "Swap failed for method {} args {:?} value {}: {}",
                    call.method, call.args, call.value, e
                );
                return Err(SwapError::SwapFailed(e.to_string()));
            }
        };

        let tx_hash = *pending;
        let summary = swap_summary(
            trade,
            (recipient != self.account).then_some(recipient),
        );
        self.registry.record(tx_hash, summary.clone());
        info!("Submitted swap {:?}: {}", tx_hash, summary);

        Ok(SubmittedSwap { tx_hash, summary })
    }
}
