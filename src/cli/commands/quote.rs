use crate::cli::{display::SwapDisplay, QuoteArgs};
use crate::core::{constants::*, Config, QuoteRequest, SwapResult, TokenAmount, TradeState, TradeType};
use crate::discovery::{PoolCache, RouteDiscovery, V2PairFinder};
use crate::quotes::QuoteEngine;
use crate::trade::{best_trade, candidate_trades};
use crate::utils::{load_currency, mainnet_bases};
use colored::*;
use console::style;
use ethers::providers::{Http, Middleware, Provider};
use log::info;
use std::sync::Arc;

pub async fn execute(args: QuoteArgs) -> SwapResult<()> {
    println!("{}", "Swaprouter Quote".bold().cyan());

    let config = Config::from_env()?;
    config.validate()?;

    let pb = SwapDisplay::create_progress_bar("Connecting...");

    let provider = Arc::new(
        Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| crate::core::SwapError::ConfigError(e.to_string()))?,
    );

    let currency_in = load_currency(provider.as_ref(), &args.token_in, config.chain_id).await?;
    let currency_out = match &args.token_out {
        Some(token) => load_currency(provider.as_ref(), token, config.chain_id).await?,
        None => crate::core::Currency::Native {
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

    if currency_in == currency_out {
        pb.finish_and_clear();
        println!("{}", "Cannot swap a currency for itself".red().bold());
        return Ok(());
    }

    pb.set_message("Discovering routes...");

    let discovery = RouteDiscovery::new(
        vec![Box::new(V2PairFinder::new(provider.clone(), *V2_FACTORY))],
        PoolCache::new(config.max_pool_block_age, config.pool_cache_ttl_secs),
        *WETH,
        mainnet_bases(),
    );
    let engine = QuoteEngine::new(&config, *WETH)?;

    let latest_block = provider.get_block_number().await?.as_u64();
    engine.note_latest_block(latest_block);

    info!(
        "Quoting {} {} -> {} ({}, {} bps slippage)",
        args.amount,
        currency_in.symbol(),
        currency_out.symbol(),
        trade_type,
        args.slippage
    );

    let routes = discovery
        .discover_routes(&currency_in, &currency_out, latest_block)
        .await?;
    if routes.is_empty() {
        pb.finish_and_clear();
        println!("{}", "No route found for this pair".red().bold());
        return Ok(());
    }

    let request = QuoteRequest {
        currency_in,
        currency_out,
        amount: amount.raw,
        trade_type,
    };

    if args.watch {
        pb.finish_and_clear();
        return watch_quotes(provider, discovery, engine, request, &config, args.slippage).await;
    }

    if args.all {
        pb.set_message("Quoting all routes...");
        let trades = candidate_trades(&engine, &routes, &request).await;
        pb.finish_and_clear();

        if trades.is_empty() {
            println!("{}", "No route found for this pair".red().bold());
            return Ok(());
        }
        println!(
            "\n{} candidate route(s) at block {}\n",
            trades.len(),
            latest_block
        );
        for trade in &trades {
            SwapDisplay::display_trade(trade, args.slippage, false);
        }
    } else {
        pb.set_message("Finding the best route...");
        let state = best_trade(&engine, &routes, &request).await;
        pb.finish_and_clear();

        match state {
            TradeState::Valid(trade) => {
                println!("\n{}", "Best route".bold().green());
                SwapDisplay::display_trade(&trade, args.slippage, true);
            }
            TradeState::NoRouteFound => {
                println!("{}", "No route found for this pair".red().bold());
            }
            TradeState::Invalid | TradeState::Loading => {
                println!("{}", "Inputs incomplete".yellow().bold());
            }
        }
    }

    println!(
        "{}",
        style("Tip: use --all to see every candidate route").dim()
    );

    Ok(())
}

/// Re-derives the trade at the configured interval and prints each update
/// until interrupted. A change of inputs mid-flight would supersede the
/// running derivation; here the inputs are fixed, so the poller's
/// generation check guards against ticks overlapping a slow node.
async fn watch_quotes(
    provider: Arc<Provider<Http>>,
    discovery: RouteDiscovery,
    engine: QuoteEngine,
    request: QuoteRequest,
    config: &Config,
    slippage_bps: u16,
) -> SwapResult<()> {
    use crate::quotes::QuotePoller;
    use crate::trade::derive_trade;
    use std::time::Duration;

    let discovery = Arc::new(discovery);
    let engine = Arc::new(engine);

    let (poller, mut state_rx) = QuotePoller::new();
    poller.set_request(Some(request)).await;

    let derive_provider = provider.clone();
    let poll_handle = tokio::spawn(Arc::clone(&poller).run(
        Duration::from_secs(config.quote_poll_interval_secs),
        move |req: QuoteRequest| {
            let discovery = discovery.clone();
            let engine = engine.clone();
            let provider = derive_provider.clone();
            async move {
                let latest_block = match provider.get_block_number().await {
                    Ok(block) => block.as_u64(),
                    Err(e) => {
                        log::warn!("Could not fetch latest block: {}", e);
                        return TradeState::Invalid;
                    }
                };
                derive_trade(
                    &discovery,
                    &engine,
                    Some(&req.currency_in),
                    Some(&req.currency_out),
                    Some(req.amount),
                    req.trade_type,
                    latest_block,
                )
                .await
            }
        },
    ));

    println!(
        "{}",
        style("Watching quotes; press Ctrl-C to stop").dim()
    );
    loop {
        if state_rx.changed().await.is_err() {
            break;
        }
        let state = state_rx.borrow().clone();
        match state {
            TradeState::Valid(trade) => {
                println!();
                SwapDisplay::display_trade(&trade, slippage_bps, true);
            }
            TradeState::NoRouteFound => {
                println!("{}", "No route found for this pair".red());
            }
            TradeState::Loading => {}
            TradeState::Invalid => {
                println!("{}", "Inputs incomplete".yellow());
            }
        }
    }

    poll_handle.abort();
    Ok(())
}
