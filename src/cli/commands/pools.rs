use crate::cli::{display::SwapDisplay, PoolsArgs};
use crate::core::{constants::*, Config, Currency, SwapError, SwapResult};
use crate::discovery::{PairFinder, V2PairFinder};
use crate::utils::load_currency;
use colored::*;
use ethers::providers::{Http, Provider};
use std::sync::Arc;

pub async fn execute(args: PoolsArgs) -> SwapResult<()> {
    println!("{}", "Swaprouter Pools".bold().cyan());

    let config = Config::from_env()?;
    config.validate()?;

    let pb = SwapDisplay::create_progress_bar("Discovering pools...");

    let provider = Arc::new(
        Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| SwapError::ConfigError(e.to_string()))?,
    );

    let currency_a = load_currency(provider.as_ref(), &args.token_a, config.chain_id).await?;
    let currency_b = load_currency(provider.as_ref(), &args.token_b, config.chain_id).await?;
    let (token_a, token_b) = match (&currency_a, &currency_b) {
        (Currency::Token(a), Currency::Token(b)) => (a.clone(), b.clone()),
        _ => {
            pb.finish_and_clear();
            println!(
                "{}",
                "Pools are listed by token pair; use WETH for the native asset"
                    .yellow()
                    .bold()
            );
            return Ok(());
        }
    };

    let finder = V2PairFinder::new(provider, *V2_FACTORY);
    let pools = finder.find_pools(&token_a, &token_b).await?;
    pb.finish_and_clear();

    if pools.is_empty() {
        println!("{}", "No pools found for this pair".red().bold());
        return Ok(());
    }

    println!("\nFound {} pool(s)\n", pools.len());
    for pool in &pools {
        SwapDisplay::display_pool(pool, args.detailed);
    }

    Ok(())
}
