//! User Registry Contract
//!
//! The chain stores only a content identifier per wallet; the profile
//! document itself lives on IPFS (see [`crate::profile`]).

use ethers::abi::{parse_abi, Abi};
use ethers::contract::Contract;
use ethers::providers::{Http, Provider};
use ethers::types::Address;
use std::sync::Arc;

use super::client::{
    contract_err, parse_address, read_contract, simulate_and_send, write_contract, ChainClient,
    SignerClient,
};
use super::error::{ChainError, ChainResult};
use super::types::TxOutcome;

const USERS_ABI: &[&str] = &[
    "function profileOf(address account) view returns (string)",
    "function registerProfile(string cid)",
];

/// Typed access to the user-registry contract
pub struct UserRegistry {
    client: Arc<ChainClient>,
    address: Address,
    abi: Abi,
}

impl UserRegistry {
    pub fn new(client: Arc<ChainClient>, address: &str) -> ChainResult<Self> {
        Ok(Self {
            address: parse_address(address)?,
            abi: parse_abi(USERS_ABI).map_err(|e| ChainError::Abi(e.to_string()))?,
            client,
        })
    }

    fn read(&self) -> Contract<Provider<Http>> {
        read_contract(&self.client, self.address, &self.abi)
    }

    fn write(&self) -> ChainResult<Contract<SignerClient>> {
        write_contract(&self.client, self.address, &self.abi)
    }

    /// CID of a wallet's pinned profile document; empty when unregistered
    pub async fn profile_cid(&self, account: Address) -> ChainResult<String> {
        self.read()
            .method("profileOf", account)
            .map_err(|e| ChainError::Abi(e.to_string()))?
            .call()
            .await
            .map_err(contract_err)
    }

    /// Point the signer's wallet at a freshly pinned profile document
    pub async fn register_profile(&self, cid: &str) -> ChainResult<TxOutcome> {
        let call = self
            .write()?
            .method::<_, ()>("registerProfile", cid.to_string())
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        simulate_and_send(call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_abi_parses() {
        let abi = parse_abi(USERS_ABI).unwrap();
        assert!(abi.function("profileOf").is_ok());
        assert!(abi.function("registerProfile").is_ok());
    }
}
