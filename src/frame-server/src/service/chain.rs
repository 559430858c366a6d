use std::{
    collections::HashMap,
    str::FromStr,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use common::reqwest::Url;
use ethers::{
    prelude::abigen,
    providers::{Authorization, Http, Middleware, Provider},
    types::Address,
    utils::to_checksum,
};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::{
    error::ChainError,
    model::internal::{ContractConfig, LastBet},
};

abigen!(
    BetGame,
    r#"[
        function placeBet(uint8 choice) external payable
        function getLastBet(address player) external view returns (address, uint8, address, uint8, address, uint256)
    ]"#
);

/// Read side of the chain-access collaborator.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Last bet recorded by `contract` for `player`.
    async fn fetch_last_bet(
        &self,
        contract: &ContractConfig,
        player: &str,
    ) -> Result<LastBet, ChainError>;
}

/// Reads the BetGame contract over JSON-RPC. One provider (and its pooled
/// http client) is shared by all requests.
pub struct EvmChainReader {
    provider: Arc<Provider<Http>>,
    connected_chain: OnceCell<u64>,
}

impl EvmChainReader {
    pub fn connect(rpc_url: &str, api_key: Option<&str>) -> Result<Self, ChainError> {
        let url = Url::parse(rpc_url)
            .map_err(|e| ChainError::Connect(format!("{:?}: {}", rpc_url, e)))?;
        let http = match api_key {
            Some(key) => Http::new_with_auth(url, Authorization::bearer(key))
                .map_err(|e| ChainError::Connect(e.to_string()))?,
            None => Http::new(url),
        };
        Ok(EvmChainReader {
            provider: Arc::new(Provider::new(http)),
            connected_chain: OnceCell::new(),
        })
    }

    async fn connected_chain(&self) -> Result<u64, ChainError> {
        self.connected_chain
            .get_or_try_init(|| async {
                let chain_id = self
                    .provider
                    .get_chainid()
                    .await
                    .map_err(|e| ChainError::Connect(e.to_string()))?;
                debug!("Connected to chain {}", chain_id);
                // as_u64 panics on wider values
                if chain_id.bits() > 64 {
                    return Err(ChainError::Call(format!(
                        "chain id {} out of range",
                        chain_id
                    )));
                }
                Ok::<u64, ChainError>(chain_id.low_u64())
            })
            .await
            .copied()
    }
}

#[async_trait]
impl ChainReader for EvmChainReader {
    async fn fetch_last_bet(
        &self,
        contract: &ContractConfig,
        player: &str,
    ) -> Result<LastBet, ChainError> {
        let player_address =
            Address::from_str(player).map_err(|_| ChainError::InvalidAddress(player.to_owned()))?;

        let expected = contract.chain_reference()?;
        let actual = self.connected_chain().await?;
        if expected != actual {
            return Err(ChainError::WrongChain { expected, actual });
        }

        let bet_game = BetGame::new(contract.contract_address, self.provider.clone());
        let (player1, player1_choice, player2, player2_choice, winner, reward_wei) = bet_game
            .get_last_bet(player_address)
            .call()
            .await
            .map_err(|e| ChainError::Call(e.to_string()))?;

        Ok(LastBet {
            player1: display_address(player1),
            player1_choice,
            player2: display_address(player2),
            player2_choice,
            winner: display_address(winner),
            reward_wei,
        })
    }
}

// The contract stores the zero address for "nobody"
fn display_address(address: Address) -> String {
    if address.is_zero() {
        String::new()
    } else {
        to_checksum(&address, None)
    }
}

/// Table-backed reader. Serves `--offline` mode and tests, and records every
/// lookup it receives.
#[derive(Default)]
pub struct StaticChainReader {
    bets: HashMap<String, Result<LastBet, ChainError>>,
    lookups: Mutex<Vec<String>>,
}

impl StaticChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bet(mut self, player: &str, bet: LastBet) -> Self {
        self.bets.insert(player.to_lowercase(), Ok(bet));
        self
    }

    pub fn with_failure(mut self, player: &str, error: ChainError) -> Self {
        self.bets.insert(player.to_lowercase(), Err(error));
        self
    }

    /// Players looked up so far, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ChainReader for StaticChainReader {
    async fn fetch_last_bet(
        &self,
        _contract: &ContractConfig,
        player: &str,
    ) -> Result<LastBet, ChainError> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(player.to_owned());
        // Unknown players simply have no bet yet
        self.bets
            .get(&player.to_lowercase())
            .cloned()
            .unwrap_or_else(|| Ok(LastBet::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::game_result::GameResultResolver;
    use axum::{routing::post, Json, Router};
    use ethers::{
        abi::{encode, Token},
        types::U256,
        utils::hex,
    };
    use serde_json::{json, Value};

    const BASE_SEPOLIA: &str = "0x14a34";

    /// JSON-RPC node answering `eth_chainId` and `eth_call` with fixed values.
    async fn rpc_node(chain_id: &'static str, call_result: String) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let app = Router::new().route(
            "/",
            post(move |Json(request): Json<Value>| {
                let call_result = call_result.clone();
                async move {
                    let result = match request["method"].as_str() {
                        Some("eth_chainId") => json!(chain_id),
                        Some("eth_call") => json!(call_result),
                        _ => Value::Null,
                    };
                    Json(json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }))
                }
            }),
        );
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", address)
    }

    fn encoded_last_bet(
        player1: Address,
        player2: Address,
        winner: Address,
        reward_wei: U256,
    ) -> String {
        let tokens = [
            Token::Address(player1),
            Token::Uint(U256::zero()),
            Token::Address(player2),
            Token::Uint(U256::one()),
            Token::Address(winner),
            Token::Uint(reward_wei),
        ];
        format!("0x{}", hex::encode(encode(&tokens)))
    }

    fn contract() -> ContractConfig {
        ContractConfig::new(
            "0x54310319A12986cb7e988087f3cF1D68eB6Df94C",
            "eip155:84532",
            "0.0001",
        )
        .unwrap()
    }

    #[test]
    fn zero_address_displays_empty() {
        assert_eq!(display_address(Address::zero()), "");
        let address =
            Address::from_str("0x54310319a12986cb7e988087f3cf1d68eb6df94c").unwrap();
        assert_eq!(
            display_address(address),
            "0x54310319A12986cb7e988087f3cF1D68eB6Df94C"
        );
    }

    #[tokio::test]
    async fn static_reader_records_lookups() {
        let bet = LastBet {
            player1: "0xABC".to_owned(),
            winner: "0xABC".to_owned(),
            reward_wei: U256::from(5u64),
            ..Default::default()
        };
        let reader = StaticChainReader::new()
            .with_bet("0xABC", bet.clone())
            .with_failure("0xBAD", ChainError::Call("reverted".to_owned()));

        assert_eq!(reader.fetch_last_bet(&contract(), "0xabc").await, Ok(bet));
        assert_eq!(
            reader.fetch_last_bet(&contract(), "0xBAD").await,
            Err(ChainError::Call("reverted".to_owned()))
        );
        assert_eq!(
            reader.fetch_last_bet(&contract(), "0xNEW").await,
            Ok(LastBet::default())
        );
        assert_eq!(reader.lookups(), vec!["0xabc", "0xBAD", "0xNEW"]);
    }

    #[tokio::test]
    async fn evm_reader_rejects_malformed_address_before_rpc() {
        // Nothing listens here; the address check must fail first
        let reader = EvmChainReader::connect("http://127.0.0.1:9", None).unwrap();
        assert_eq!(
            reader.fetch_last_bet(&contract(), "not-an-address").await,
            Err(ChainError::InvalidAddress("not-an-address".to_owned()))
        );
    }

    #[test]
    fn evm_reader_rejects_bad_rpc_url() {
        assert!(matches!(
            EvmChainReader::connect("not a url", None),
            Err(ChainError::Connect(_))
        ));
    }

    #[tokio::test]
    async fn evm_reader_decodes_last_bet() {
        let player1 = Address::from_low_u64_be(0xAA);
        let player2 = Address::from_low_u64_be(0xBB);
        let reward = U256::from(2_000_000_000_000_000u64);
        let url = rpc_node(
            BASE_SEPOLIA,
            encoded_last_bet(player1, player2, Address::zero(), reward),
        )
        .await;
        let reader = EvmChainReader::connect(&url, None).unwrap();

        let bet = reader
            .fetch_last_bet(&contract(), &to_checksum(&player1, None))
            .await
            .unwrap();
        assert_eq!(
            bet,
            LastBet {
                player1: to_checksum(&player1, None),
                player1_choice: 0,
                player2: to_checksum(&player2, None),
                player2_choice: 1,
                // Zero address means the game has no winner yet
                winner: String::new(),
                reward_wei: reward,
            }
        );
    }

    #[tokio::test]
    async fn evm_reader_rejects_wrong_chain() {
        let url = rpc_node("0x1", String::new()).await;
        let reader = EvmChainReader::connect(&url, None).unwrap();
        assert_eq!(
            reader
                .fetch_last_bet(&contract(), "0x54310319A12986cb7e988087f3cF1D68eB6Df94C")
                .await,
            Err(ChainError::WrongChain {
                expected: 84532,
                actual: 1
            })
        );
    }

    #[tokio::test]
    async fn oversized_chain_id_becomes_failed_result() {
        let url = rpc_node("0x1ffffffffffffffffff", String::new()).await;
        let reader = Arc::new(EvmChainReader::connect(&url, None).unwrap());
        assert!(matches!(
            reader
                .fetch_last_bet(&contract(), "0x54310319A12986cb7e988087f3cF1D68eB6Df94C")
                .await,
            Err(ChainError::Call(_))
        ));

        let resolver = GameResultResolver::new(contract(), reader);
        let result = tokio::spawn(async move {
            resolver
                .resolve("0x54310319A12986cb7e988087f3cF1D68eB6Df94C")
                .await
        })
        .await
        .expect("resolve must not panic");
        assert_eq!(result.reward, "0");
        assert!(result.error.unwrap().contains("out of range"));
    }
}
