use std::sync::Arc;

use common::model::choice::ChoiceLabel;
use tracing::{debug, warn};

use crate::{
    model::internal::{format_reward, ContractConfig, GameResult, LastBet},
    service::chain::ChainReader,
};

pub const MISSING_ADDRESS: &str = "no player address provided";

/// Looks up a player's last game. Never fails: chain faults come back as a
/// `GameResult` with `error` set.
#[derive(Clone)]
pub struct GameResultResolver {
    contract: ContractConfig,
    reader: Arc<dyn ChainReader>,
}

impl GameResultResolver {
    pub fn new(contract: ContractConfig, reader: Arc<dyn ChainReader>) -> Self {
        GameResultResolver { contract, reader }
    }

    pub async fn resolve(&self, player_address: &str) -> GameResult {
        let player_address = player_address.trim();
        if player_address.is_empty() {
            warn!("Result lookup without a player address");
            return GameResult::failed(MISSING_ADDRESS);
        }

        match self
            .reader
            .fetch_last_bet(&self.contract, player_address)
            .await
        {
            Ok(bet) => {
                let result = Self::normalize(bet);
                if result.is_pending() {
                    debug!("No finished game for {} yet", player_address);
                }
                result
            }
            Err(e) => {
                warn!("Failed to read last bet for {}: {}", player_address, e);
                GameResult::failed(e)
            }
        }
    }

    // Both players' codes go through the same table; see DESIGN.md
    fn normalize(bet: LastBet) -> GameResult {
        GameResult {
            player1: bet.player1,
            player1_choice: ChoiceLabel::from_code(bet.player1_choice).to_string(),
            player2: bet.player2,
            player2_choice: ChoiceLabel::from_code(bet.player2_choice).to_string(),
            winner: bet.winner,
            reward: format_reward(bet.reward_wei),
            error: None,
        }
    }
}
