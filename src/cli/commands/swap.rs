use crate::cli::{display::SwapDisplay, SwapArgs};
use crate::core::{
    constants::*, Config, Currency, QuoteRequest, SwapError, SwapResult, TokenAmount,
    TradeState, TradeType,
};
use crate::discovery::{PoolCache, RouteDiscovery, V2PairFinder};
use crate::quotes::QuoteEngine;
use crate::trade::{best_trade, slippage_adjusted_amounts};
use crate::transaction::{
    build_swap_calls, resolve_recipient, swap_callback_state, PermitSigner, PermitState,
    RecipientState, SwapCallOptions, SwapCallbackState, SwapExecutor, TransactionRegistry,
};
use crate::transaction::permit::PermitContext;
use crate::utils::{load_currency, mainnet_bases};
use chrono::Utc;
use colored::*;
use dialoguer::Confirm;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::U256;
use log::{info, warn};
use std::str::FromStr;
use std::sync::Arc;

pub async fn execute(args: SwapArgs) -> SwapResult<()> {
    println!("{}", "Swaprouter Swap".bold().cyan());

    let config = Config::from_env()?;
    config.validate()?;

    let private_key = config.private_key.clone().ok_or_else(|| {
        SwapError::ConfigError("PRIVATE_KEY is required to submit a swap".to_string())
    })?;

    let pb = SwapDisplay::create_progress_bar("Connecting...");

    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
        .map_err(|e| SwapError::ConfigError(e.to_string()))?;
    let wallet = LocalWallet::from_str(private_key.trim_start_matches("0x"))
        .map_err(|e| SwapError::ConfigError(format!("invalid private key: {}", e)))?
        .with_chain_id(config.chain_id);
    let client = Arc::new(SignerMiddleware::new(provider, wallet));
    let account = client.address();

    let currency_in = load_currency(client.as_ref(), &args.token_in, config.chain_id).await?;
    let currency_out = match &args.token_out {
        Some(token) => load_currency(client.as_ref(), token, config.chain_id).await?,
        None => Currency::Native {
            chain_id: config.chain_id,
        },
    };
    let trade_type = if args.exact_out {
        TradeType::ExactOutput
    } else {
        TradeType::ExactInput
    };
    let fixed_currency = match trade_type {
        TradeType::ExactInput => currency_in.clone(),
        TradeType::ExactOutput => currency_out.clone(),
    };
    let amount = TokenAmount::from_decimal_str(fixed_currency, &args.amount)?;

    pb.set_message("Finding the best route...");

    let discovery = RouteDiscovery::new(
        vec![Box::new(V2PairFinder::new(client.clone(), *V2_FACTORY))],
        PoolCache::new(config.max_pool_block_age, config.pool_cache_ttl_secs),
        *WETH,
        mainnet_bases(),
    );
    let engine = QuoteEngine::new(&config, *WETH)?;

    let latest_block = client
        .get_block_number()
        .await
        .map_err(SwapError::provider)?
        .as_u64();
    engine.note_latest_block(latest_block);

    let routes = discovery
        .discover_routes(&currency_in, &currency_out, latest_block)
        .await?;
    let request = QuoteRequest {
        currency_in: currency_in.clone(),
        currency_out,
        amount: amount.raw,
        trade_type,
    };
    let trade = match best_trade(&engine, &routes, &request).await {
        TradeState::Valid(trade) => trade,
        TradeState::NoRouteFound => {
            pb.finish_and_clear();
            println!("{}", "No route found for this pair".red().bold());
            return Ok(());
        }
        TradeState::Invalid | TradeState::Loading => {
            pb.finish_and_clear();
            println!("{}", "Inputs incomplete".yellow().bold());
            return Ok(());
        }
    };

    pb.set_message("Resolving recipient...");
    let recipient_state =
        resolve_recipient(client.as_ref(), args.recipient.as_deref(), account).await;

    match swap_callback_state(
        Some(&trade),
        Some(account),
        Some(config.chain_id),
        &recipient_state,
    ) {
        SwapCallbackState::Valid => {}
        SwapCallbackState::Invalid(reason) => {
            pb.finish_and_clear();
            println!("{} {}", "Cannot swap:".red().bold(), reason);
            return Ok(());
        }
        SwapCallbackState::Loading => {
            pb.finish_and_clear();
            println!("{}", "Recipient resolution still pending".yellow());
            return Ok(());
        }
    }
    let recipient = match recipient_state {
        RecipientState::Resolved(address) => address,
        _ => unreachable!("callback state is valid"),
    };

    let deadline = Utc::now().timestamp() as u64 + config.deadline_secs;

    // Permit-capable input tokens can skip the separate approval
    // transaction with an off-chain signature.
    if let Currency::Token(token) = &currency_in {
        let adjusted = slippage_adjusted_amounts(&trade, args.slippage as u64)?;
        let mut permit_signer = PermitSigner::new(client.clone());
        let mut permit_context = PermitContext {
            owner: account,
            token_address: token.address,
            spender: *V2_ROUTER,
            chain_id: config.chain_id,
            required_amount: adjusted.maximum_input.raw,
            transaction_deadline: deadline,
            nonce: None,
            wallet_supports_signing: true,
            override_info: None,
        };
        if permit_signer.state(&permit_context) == PermitState::Loading {
            pb.set_message("Loading permit nonce...");
            match permit_signer.load_nonce(token.address, account).await {
                Ok(nonce) => permit_context.nonce = Some(nonce),
                Err(e) => warn!("Could not load permit nonce: {}", e),
            }
        }
        if permit_signer.state(&permit_context) == PermitState::NotSigned {
            pb.set_message("Gathering permit signature...");
            match permit_signer.gather_permit_signature(&permit_context).await {
                Ok(signature) => info!(
                    "Permit signed for {} (deadline {})",
                    token.symbol, signature.deadline
                ),
                Err(e) => warn!("Permit signing failed, falling back to approval: {}", e),
            }
        }
    }

    pb.finish_and_clear();

    println!();
    SwapDisplay::display_trade(&trade, args.slippage, true);
    println!();

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt("Submit this swap?")
            .default(false)
            .interact()
            .map_err(|e| SwapError::Other(e.to_string()))?;
        if !confirmed {
            println!("{}", "Aborted".yellow());
            return Ok(());
        }
    }

    let calls = build_swap_calls(
        &trade,
        *V2_ROUTER,
        &SwapCallOptions {
            allowed_slippage_bips: args.slippage as u64,
            recipient,
            deadline: Some(U256::from(deadline)),
        },
    )?;

    let registry = Arc::new(TransactionRegistry::new());
    let executor = SwapExecutor::new(client, account, registry);

    let pb = SwapDisplay::create_progress_bar("Submitting swap...");
    match executor.execute(&trade, calls, recipient).await {
        Ok(submitted) => {
            pb.finish_and_clear();
            println!("{}", "Swap submitted".green().bold());
            println!("  {}", submitted.summary);
            println!("  Transaction: {:?}", submitted.tx_hash);
        }
        Err(SwapError::TransactionRejected) => {
            pb.finish_and_clear();
            println!("{}", "Transaction rejected".yellow());
        }
        Err(e) => {
            pb.finish_and_clear();
            println!("{} {}", "Swap failed:".red().bold(), e);
        }
    }

    Ok(())
}
