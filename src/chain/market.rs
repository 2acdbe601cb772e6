//! Marketplace Contract
//!
//! Typed wrapper over the ownership-transfer contract: sale listings and
//! the purchase requests buyers raise against them. Acceptance and
//! payment logic is on-chain; this layer only reads state and submits
//! transition transactions.

use ethers::abi::{parse_abi, Abi};
use ethers::contract::Contract;
use ethers::providers::{Http, Provider};
use ethers::types::{Address, U256};
use std::sync::Arc;

use super::client::{
    contract_err, parse_address, read_contract, simulate_and_send, write_contract, ChainClient,
    SignerClient,
};
use super::error::{ChainError, ChainResult};
use super::types::{PurchaseRequest, RequestTuple, Sale, SaleTuple, TxOutcome};

const MARKET_ABI: &[&str] = &[
    "function getSale(uint256 id) view returns (uint256, uint256, address, uint256, address, uint256, uint256, uint8)",
    "function saleCount() view returns (uint256)",
    "function getRequest(uint256 id) view returns (uint256, uint256, address, uint256, uint8)",
    "function requestsOfSale(uint256 saleId) view returns (uint256[])",
    "function putOnSale(uint256 propertyId, uint256 price)",
    "function cancelSale(uint256 saleId)",
    "function submitRequest(uint256 saleId, uint256 price)",
    "function cancelRequest(uint256 requestId)",
    "function acceptRequest(uint256 requestId)",
    "function completePurchase(uint256 saleId) payable",
];

/// Typed access to the marketplace contract
pub struct Marketplace {
    client: Arc<ChainClient>,
    address: Address,
    abi: Abi,
}

impl Marketplace {
    pub fn new(client: Arc<ChainClient>, address: &str) -> ChainResult<Self> {
        Ok(Self {
            address: parse_address(address)?,
            abi: parse_abi(MARKET_ABI).map_err(|e| ChainError::Abi(e.to_string()))?,
            client,
        })
    }

    fn read(&self) -> Contract<Provider<Http>> {
        read_contract(&self.client, self.address, &self.abi)
    }

    fn write(&self) -> ChainResult<Contract<SignerClient>> {
        write_contract(&self.client, self.address, &self.abi)
    }

    // ==================== Reads ====================

    /// Fetch a single sale
    pub async fn get_sale(&self, id: u64) -> ChainResult<Sale> {
        let tuple: SaleTuple = self
            .read()
            .method("getSale", U256::from(id))
            .map_err(|e| ChainError::Abi(e.to_string()))?
            .call()
            .await
            .map_err(contract_err)?;

        Sale::try_from(tuple)
    }

    /// Total number of sales ever listed
    pub async fn sale_count(&self) -> ChainResult<u64> {
        let count: U256 = self
            .read()
            .method("saleCount", ())
            .map_err(|e| ChainError::Abi(e.to_string()))?
            .call()
            .await
            .map_err(contract_err)?;

        Ok(count.as_u64())
    }

    /// All sales, in listing order. Sale ids are 1-based on-chain.
    pub async fn all_sales(&self) -> ChainResult<Vec<Sale>> {
        let count = self.sale_count().await?;
        let mut sales = Vec::with_capacity(count as usize);
        for id in 1..=count {
            sales.push(self.get_sale(id).await?);
        }
        Ok(sales)
    }

    /// Purchase requests against a sale, in on-chain insertion order.
    ///
    /// Insertion order matters: bid ranking uses it both to pick each
    /// buyer's latest offer and to break price ties.
    pub async fn requests_for_sale(&self, sale_id: u64) -> ChainResult<Vec<PurchaseRequest>> {
        let ids: Vec<U256> = self
            .read()
            .method("requestsOfSale", U256::from(sale_id))
            .map_err(|e| ChainError::Abi(e.to_string()))?
            .call()
            .await
            .map_err(contract_err)?;

        let mut requests = Vec::with_capacity(ids.len());
        for id in ids {
            requests.push(self.get_request(id.as_u64()).await?);
        }
        Ok(requests)
    }

    /// Fetch a single purchase request
    pub async fn get_request(&self, id: u64) -> ChainResult<PurchaseRequest> {
        let tuple: RequestTuple = self
            .read()
            .method("getRequest", U256::from(id))
            .map_err(|e| ChainError::Abi(e.to_string()))?
            .call()
            .await
            .map_err(contract_err)?;

        PurchaseRequest::try_from(tuple)
    }

    // ==================== Writes ====================

    /// List a verified property for sale (owner)
    pub async fn put_on_sale(&self, property_id: u64, price: U256) -> ChainResult<TxOutcome> {
        let call = self
            .write()?
            .method::<_, ()>("putOnSale", (U256::from(property_id), price))
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        simulate_and_send(call).await
    }

    /// Cancel an active sale (seller)
    pub async fn cancel_sale(&self, sale_id: u64) -> ChainResult<TxOutcome> {
        let call = self
            .write()?
            .method::<_, ()>("cancelSale", U256::from(sale_id))
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        simulate_and_send(call).await
    }

    /// Submit a purchase request with an offered price (buyer)
    pub async fn submit_request(&self, sale_id: u64, price: U256) -> ChainResult<TxOutcome> {
        let call = self
            .write()?
            .method::<_, ()>("submitRequest", (U256::from(sale_id), price))
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        simulate_and_send(call).await
    }

    /// Withdraw a purchase request (buyer)
    pub async fn cancel_request(&self, request_id: u64) -> ChainResult<TxOutcome> {
        let call = self
            .write()?
            .method::<_, ()>("cancelRequest", U256::from(request_id))
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        simulate_and_send(call).await
    }

    /// Accept a purchase request, starting the payment deadline (seller)
    pub async fn accept_request(&self, request_id: u64) -> ChainResult<TxOutcome> {
        let call = self
            .write()?
            .method::<_, ()>("acceptRequest", U256::from(request_id))
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        simulate_and_send(call).await
    }

    /// Pay the accepted price and complete the purchase (accepted buyer)
    pub async fn complete_purchase(&self, sale_id: u64, value: U256) -> ChainResult<TxOutcome> {
        let call = self
            .write()?
            .method::<_, ()>("completePurchase", U256::from(sale_id))
            .map_err(|e| ChainError::Abi(e.to_string()))?
            .value(value);

        simulate_and_send(call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_abi_parses() {
        let abi = parse_abi(MARKET_ABI).unwrap();
        assert!(abi.function("getSale").is_ok());
        assert!(abi.function("submitRequest").is_ok());
        assert!(abi.function("completePurchase").is_ok());
    }
}
