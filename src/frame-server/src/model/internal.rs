use std::str::FromStr;

use ethers::{
    types::{Address, Bytes, U256},
    utils::{format_ether, parse_ether},
};

use crate::error::{ChainError, FrameError, Result};

pub const PLACE_BET: &str = "placeBet";

/// Deployment-fixed contract settings, shared by the bet builder and the
/// result resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractConfig {
    pub contract_address: Address,
    /// CAIP-2 chain id, e.g. `eip155:84532`
    pub chain_id: String,
    pub stake_wei: U256,
}

impl ContractConfig {
    pub fn new(contract_address: &str, chain_id: &str, stake_eth: &str) -> Result<Self> {
        let contract_address = Address::from_str(contract_address).map_err(|e| {
            FrameError::Config(format!("contract address {:?}: {}", contract_address, e))
        })?;
        let stake_wei = parse_ether(stake_eth)
            .map_err(|e| FrameError::Config(format!("stake {:?}: {}", stake_eth, e)))?;
        let config = ContractConfig {
            contract_address,
            chain_id: chain_id.to_owned(),
            stake_wei,
        };
        config.chain_reference()?;
        Ok(config)
    }

    /// Numeric EVM chain id from the CAIP-2 string.
    pub fn chain_reference(&self) -> std::result::Result<u64, ChainError> {
        self.chain_id
            .strip_prefix("eip155:")
            .and_then(|reference| reference.parse().ok())
            .ok_or_else(|| ChainError::InvalidChainId(self.chain_id.clone()))
    }
}

/// Unsigned `placeBet` invocation. Handed to the wallet for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedBetCall {
    pub contract_address: Address,
    pub chain_id: String,
    pub function_name: &'static str,
    pub args: Vec<u8>,
    pub value: U256,
    pub calldata: Bytes,
}

/// Raw `getLastBet` record as the chain reports it. Addresses are strings,
/// empty when the contract holds the zero address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastBet {
    pub player1: String,
    pub player1_choice: u8,
    pub player2: String,
    pub player2_choice: u8,
    pub winner: String,
    pub reward_wei: U256,
}

/// Display-ready result. `error` is set iff the chain read failed, an empty
/// `winner` without error means no finished game yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub player1: String,
    pub player1_choice: String,
    pub player2: String,
    pub player2_choice: String,
    pub winner: String,
    pub reward: String,
    pub error: Option<String>,
}

impl GameResult {
    pub fn failed(cause: impl ToString) -> Self {
        GameResult {
            player1: String::new(),
            player1_choice: String::new(),
            player2: String::new(),
            player2_choice: String::new(),
            winner: String::new(),
            reward: "0".to_owned(),
            error: Some(cause.to_string()),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.error.is_none() && self.winner.is_empty()
    }
}

/// Wei to an ETH decimal without trailing zeros: 2000000000000000 -> "0.002".
pub fn format_reward(wei: U256) -> String {
    let ether = format_ether(wei);
    if !ether.contains('.') {
        return ether;
    }
    ether
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_owned()
}
