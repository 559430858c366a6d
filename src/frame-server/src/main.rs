use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use common::{reqwest::Url, utility::create_shutdown_channel};
use frame_server::{
    entrypoint::{serve, FrameConfig},
    model::internal::ContractConfig,
    service::chain::{ChainReader, EvmChainReader, StaticChainReader},
};
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(version, about = "Rock, Paper, Scissors wagering frame")]
struct Args {
    /// Address to bind the http listener to
    #[arg(long, env = "FRAME_LISTEN_ADDRESS", default_value = "0.0.0.0:3000")]
    listen_address: String,

    /// Public base url frame clients reach this server on
    #[arg(long, env = "FRAME_PUBLIC_URL", default_value = "http://localhost:3000/")]
    public_url: String,

    /// BetGame contract address
    #[arg(
        long,
        env = "BET_CONTRACT_ADDRESS",
        default_value = "0x54310319A12986cb7e988087f3cF1D68eB6Df94C"
    )]
    contract_address: String,

    /// CAIP-2 chain id of the contract (Base Sepolia by default)
    #[arg(long, env = "BET_CHAIN_ID", default_value = "eip155:84532")]
    chain_id: String,

    /// Stake sent with every bet, in ETH
    #[arg(long, env = "BET_STAKE_ETH", default_value = "0.0001")]
    stake: String,

    /// JSON-RPC endpoint used to read results
    #[arg(long, env = "CHAIN_RPC_URL", default_value = "https://sepolia.base.org")]
    rpc_url: String,

    /// Bearer credential for the RPC endpoint
    #[arg(long, env = "CHAIN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Serve without a chain; every lookup reports no finished game
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_line_number(true)
        .with_file(true)
        .with_max_level(Level::DEBUG)
        .init();
    let args = Args::parse();

    // Config
    let contract = ContractConfig::new(&args.contract_address, &args.chain_id, &args.stake)
        .context("invalid contract configuration")?;
    let public_url = Url::parse(&args.public_url).context("invalid public url")?;
    let config = FrameConfig {
        listen_address: args.listen_address,
        public_url,
        contract,
    };

    let reader: Arc<dyn ChainReader> = if args.offline {
        warn!("Running offline, results are never read from chain");
        Arc::new(StaticChainReader::new())
    } else {
        info!("Reading results from {}", args.rpc_url);
        Arc::new(
            EvmChainReader::connect(&args.rpc_url, args.api_key.as_deref())
                .context("failed to set up chain reader")?,
        )
    };

    let (_shutdown_sender, shutdown_receiver) = create_shutdown_channel();
    serve(config, reader, shutdown_receiver, None)
        .await
        .context("frame server failed")?;
    Ok(())
}
