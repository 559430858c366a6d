use common::model::choice::Choice;
use ethers::abi::AbiEncode;

use crate::{
    error::{FrameError, Result},
    model::internal::{ContractConfig, UnsignedBetCall, PLACE_BET},
    service::chain::PlaceBetCall,
};

/// Describes `placeBet` calls. Never signs or submits anything.
#[derive(Debug, Clone)]
pub struct BetTransactionBuilder {
    contract: ContractConfig,
}

impl BetTransactionBuilder {
    pub fn new(contract: ContractConfig) -> Self {
        BetTransactionBuilder { contract }
    }

    /// Builds the call for a choice named by a route or button.
    pub fn build(&self, choice: &str) -> Result<UnsignedBetCall> {
        let choice = choice
            .parse::<Choice>()
            .map_err(|e| FrameError::InvalidChoice(e.0))?;
        Ok(self.build_for(choice))
    }

    pub fn build_for(&self, choice: Choice) -> UnsignedBetCall {
        let code = choice.code_of();
        UnsignedBetCall {
            contract_address: self.contract.contract_address,
            chain_id: self.contract.chain_id.clone(),
            function_name: PLACE_BET,
            args: vec![code],
            value: self.contract.stake_wei,
            calldata: PlaceBetCall { choice: code }.encode().into(),
        }
    }
}
