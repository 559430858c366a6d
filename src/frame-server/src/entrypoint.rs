use std::sync::Arc;

use common::{
    reqwest::Url,
    utility::{random_address, url},
};
use tokio::sync::{broadcast, oneshot};
use tracing::{info, Level};

use crate::{
    model::internal::ContractConfig,
    service::{
        bet_transaction::BetTransactionBuilder,
        chain::ChainReader,
        frame_api::{router, FrameApiState},
        frame_flow::FrameFlowController,
        game_result::GameResultResolver,
        render::Links,
    },
};

#[derive(Clone, Debug)]
pub struct FrameConfig {
    pub listen_address: String,
    /// Base url frame clients reach us on; every link in a frame hangs off it
    pub public_url: Url,
    pub contract: ContractConfig,
}

pub async fn serve(
    config: FrameConfig,
    reader: Arc<dyn ChainReader>,
    mut shutdown_receiver: broadcast::Receiver<()>,
    ready_signal: Option<oneshot::Sender<()>>,
) -> std::io::Result<()> {
    let state = FrameApiState {
        flow: FrameFlowController::new(GameResultResolver::new(config.contract.clone(), reader)),
        bets: BetTransactionBuilder::new(config.contract.clone()),
        links: Links::new(config.public_url.clone()),
    };

    let listener = tokio::net::TcpListener::bind(&config.listen_address).await?;
    info!(
        "Frame server listening on {} (public url {}, contract {:?} on {})",
        config.listen_address,
        config.public_url,
        config.contract.contract_address,
        config.contract.chain_id
    );

    // Signal that the server is ready
    if let Some(ready_signal) = ready_signal {
        info!("Sent ready");
        let _ = ready_signal.send(());
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown_receiver.recv().await;
        })
        .await?;
    info!("Frame server stopped");
    Ok(())
}

/// In-process server on a random port, for tests and local clients.
pub struct FrameServer {
    pub config: FrameConfig,
    shutdown_sender: broadcast::Sender<()>,
}

impl FrameServer {
    pub async fn new(contract: ContractConfig, reader: Arc<dyn ChainReader>) -> Self {
        // Init logging, ignore error if already set
        let _ = tracing_subscriber::fmt()
            .with_line_number(true)
            .with_file(true)
            .with_max_level(Level::DEBUG)
            .try_init();

        let listen_address = random_address().await.expect("Failed to get random port");
        let public_url = Url::parse(&url("http", &listen_address, "")).expect("Invalid local url");
        let config = FrameConfig {
            listen_address,
            public_url,
            contract,
        };

        // Create server
        let (shutdown_sender, shutdown_receiver) = broadcast::channel(1);
        let (ready_sender, ready_receiver) = oneshot::channel::<()>();
        let moved_cfg = config.clone();
        tokio::spawn(async move {
            serve(moved_cfg, reader, shutdown_receiver, Some(ready_sender))
                .await
                .expect("Frame server exited non-gracefully")
        });

        // Wait for server to be ready
        ready_receiver.await.expect("Server failed to start");

        FrameServer {
            config,
            shutdown_sender,
        }
    }

    /// `http://host:port` without a trailing slash.
    pub fn base_url(&self) -> String {
        self.config
            .public_url
            .as_str()
            .trim_end_matches('/')
            .to_owned()
    }

    pub async fn shutdown(&self) {
        let _ = self.shutdown_sender.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::internal::LastBet, service::chain::StaticChainReader};
    use common::{model::choice::Choice, test::TestCase};
    use ethers::types::U256;
    use serde_json::Value;

    fn contract() -> ContractConfig {
        ContractConfig::new(
            "0x54310319A12986cb7e988087f3cF1D68eB6Df94C",
            "eip155:84532",
            "0.0001",
        )
        .unwrap()
    }

    fn scenario(name: &str) -> String {
        format!("{}/test/data/{}.json", env!("CARGO_MANIFEST_DIR"), name)
    }

    #[tokio::test]
    async fn play_and_check_result() {
        let bet = LastBet {
            player1: "0xABC".to_owned(),
            player1_choice: 0,
            player2: "0xDEF".to_owned(),
            player2_choice: 1,
            winner: "0xDEF".to_owned(),
            reward_wei: U256::from(2_000_000_000_000_000u64),
        };
        let reader = Arc::new(StaticChainReader::new().with_bet("0xABC", bet));
        let server = FrameServer::new(contract(), reader.clone()).await;
        let rock_calldata = BetTransactionBuilder::new(contract())
            .build_for(Choice::Rock)
            .calldata
            .to_string();

        let test_case = TestCase::<Value, Value>::load(
            scenario("play_and_check_result"),
            vec![("player", "0xABC".to_owned()), ("rock_calldata", rock_calldata)],
        );
        test_case.run(&server.base_url()).await;

        // Only the show-result step touches the chain
        assert_eq!(reader.lookups(), vec!["0xABC"]);
        server.shutdown().await;
    }

    #[tokio::test]
    async fn degraded_paths_still_render() {
        let server = FrameServer::new(contract(), Arc::new(StaticChainReader::new())).await;
        let test_case = TestCase::<Value, Value>::load(
            scenario("degraded_paths"),
            Vec::<(String, String)>::new(),
        );
        test_case.run(&server.base_url()).await;
        server.shutdown().await;
    }

    #[tokio::test]
    async fn serves_frame_document() {
        let server = FrameServer::new(contract(), Arc::new(StaticChainReader::new())).await;
        let base_url = server.base_url();
        let response = reqwest_get(&format!("{}/api/frame/start", base_url)).await;
        assert!(response.contains(r#"<meta property="fc:frame" content="vNext">"#));
        assert!(response.contains(&format!(
            r#"<meta property="fc:frame:button:1:target" content="{}/api/bet/rock">"#,
            base_url
        )));
        assert!(response.contains(&format!(
            r#"<meta property="fc:frame:button:4:target" content="{}/api/frame/collect-address">"#,
            base_url
        )));

        let image = reqwest_get(&format!(
            "{}/api/image?headline=Game%20Result&details=Winner%3A%200xDEF&tone=highlight",
            base_url
        ))
        .await;
        assert!(image.starts_with("<svg"));
        assert!(image.contains("Winner: 0xDEF"));

        // Any query still draws a card
        let bare = reqwest_get(&format!("{}/api/image?tone=warning", base_url)).await;
        assert!(bare.starts_with("<svg"));
        assert!(bare.contains(r##"fill="#4a1414""##));
        let empty = reqwest_get(&format!("{}/api/image", base_url)).await;
        assert!(empty.contains(r#"fill="black""#));
        server.shutdown().await;
    }

    async fn reqwest_get(url: &str) -> String {
        let response = common::reqwest::get(url).await.expect("Request failed");
        assert!(response.status().is_success());
        response.text().await.expect("Failed to read body")
    }
}
