//! Chain Client
//!
//! Connection to the JSON-RPC node plus the shared plumbing every
//! contract wrapper uses: address parsing, read/write contract binding,
//! and the simulate-then-send write path.
//!
//! Writes are simulated with `eth_call` before submission so revert
//! reasons surface without spending gas. Submitted transactions are
//! tracked to a receipt; there is no automatic retry.

use ethers::abi::{Abi, Detokenize};
use ethers::contract::{Contract, ContractCall, ContractError};
use ethers::prelude::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use std::str::FromStr;
use std::sync::Arc;

use super::error::{ChainError, ChainResult};
use super::types::TxOutcome;

/// Middleware stack used for writes: provider + local signing key
pub type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Configuration for the chain client
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// JSON-RPC endpoint (e.g., "http://localhost:8545")
    pub rpc_url: String,
    /// Chain id for transaction signing; queried from the node when None
    pub chain_id: Option<u64>,
    /// Land registry contract address
    pub registry_address: String,
    /// Marketplace (ownership transfer) contract address
    pub market_address: String,
    /// User registry contract address
    pub users_address: String,
    /// The single authoritative admin wallet address
    pub admin_address: String,
    /// Hex private key for submitting transactions; reads-only when None
    pub signer_key: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: None,
            registry_address: String::new(),
            market_address: String::new(),
            users_address: String::new(),
            admin_address: String::new(),
            signer_key: None,
        }
    }
}

/// Shared connection to the chain
pub struct ChainClient {
    provider: Arc<Provider<Http>>,
    signer: Option<Arc<SignerClient>>,
    admin: Address,
}

impl ChainClient {
    /// Connect to the node and, when a key is configured, set up the signer.
    pub async fn connect(config: &ChainConfig) -> ChainResult<Self> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        let provider = Arc::new(provider);

        let admin = parse_address(&config.admin_address)?;

        let signer = match &config.signer_key {
            Some(key) => {
                let wallet: LocalWallet = key
                    .parse()
                    .map_err(|e| ChainError::InvalidAddress(format!("signer key: {e}")))?;

                let chain_id = match config.chain_id {
                    Some(id) => id,
                    None => provider
                        .get_chainid()
                        .await
                        .map_err(|e| ChainError::Rpc(e.to_string()))?
                        .as_u64(),
                };

                let wallet = wallet.with_chain_id(chain_id);
                tracing::info!(address = %format!("{:#x}", wallet.address()), chain_id, "Signer configured");

                Some(Arc::new(SignerMiddleware::new(
                    provider.as_ref().clone(),
                    wallet,
                )))
            }
            None => {
                tracing::info!("No signer key set; chain access is read-only");
                None
            }
        };

        Ok(Self {
            provider,
            signer,
            admin,
        })
    }

    /// Provider handle for read-only contract binding
    pub fn provider(&self) -> Arc<Provider<Http>> {
        Arc::clone(&self.provider)
    }

    /// Signer handle, or `NoSigner` when only reads are configured
    pub fn signer(&self) -> ChainResult<Arc<SignerClient>> {
        self.signer.clone().ok_or(ChainError::NoSigner)
    }

    /// Address of the wallet used for writes, when configured
    pub fn signer_address(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.signer().address())
    }

    /// The configured admin wallet
    pub fn admin_address(&self) -> Address {
        self.admin
    }

    /// Lightweight node reachability probe
    pub async fn ping(&self) -> ChainResult<u64> {
        self.provider
            .get_block_number()
            .await
            .map(|n| n.as_u64())
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }
}

/// Bind a contract for reads
pub(crate) fn read_contract(
    client: &ChainClient,
    address: Address,
    abi: &Abi,
) -> Contract<Provider<Http>> {
    Contract::new(address, abi.clone(), client.provider())
}

/// Bind a contract for writes; fails without a signer
pub(crate) fn write_contract(
    client: &ChainClient,
    address: Address,
    abi: &Abi,
) -> ChainResult<Contract<SignerClient>> {
    Ok(Contract::new(address, abi.clone(), client.signer()?))
}

/// Parse a 0x-prefixed address string
pub fn parse_address(s: &str) -> ChainResult<Address> {
    Address::from_str(s.trim()).map_err(|_| ChainError::InvalidAddress(s.to_string()))
}

/// Classify a contract error, decoding the revert reason when present
pub(crate) fn contract_err<M: Middleware>(e: ContractError<M>) -> ChainError {
    if let Some(reason) = e.decode_revert::<String>() {
        ChainError::Revert { reason }
    } else if e.is_revert() {
        ChainError::Revert {
            reason: "execution reverted".to_string(),
        }
    } else {
        ChainError::Rpc(e.to_string())
    }
}

/// Simulate a state-changing call, then send it and wait for the receipt.
pub(crate) async fn simulate_and_send<D>(
    call: ContractCall<SignerClient, D>,
) -> ChainResult<TxOutcome>
where
    D: Detokenize + Send + Sync,
{
    // eth_call first: reverts surface here, gas-free
    call.call().await.map_err(contract_err)?;

    let pending = call.send().await.map_err(contract_err)?;
    let tx_hash = format!("{:#x}", pending.tx_hash());

    tracing::debug!(tx_hash = %tx_hash, "Transaction submitted, awaiting receipt");

    let receipt = pending
        .await
        .map_err(|e| ChainError::Rpc(e.to_string()))?
        .ok_or(ChainError::Dropped {
            tx_hash: tx_hash.clone(),
        })?;

    tracing::info!(
        tx_hash = %tx_hash,
        block = receipt.block_number.map(|b| b.as_u64()).unwrap_or_default(),
        "Transaction mined"
    );

    Ok(TxOutcome {
        tx_hash,
        block_number: receipt.block_number.map(|b| b.as_u64()),
        gas_used: receipt.gas_used.map(|g| g.as_u64()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_checksummed_and_lowercase_addresses() {
        let a = parse_address("0x52908400098527886E0F7030069857D2E4169EE7").unwrap();
        let b = parse_address("0x52908400098527886e0f7030069857d2e4169ee7").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(parse_address("not-an-address").is_err());
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("").is_err());
    }
}
