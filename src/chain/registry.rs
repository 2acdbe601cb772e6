//! Land Registry Contract
//!
//! Typed wrapper over the deployed land-registry contract: property
//! records, their lifecycle transitions, and staff assignments. The
//! ABI fragments below are the fixed external protocol this service
//! binds to; transition rules are enforced by the contract itself.

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
use super::types::{Property, PropertyTuple, TxOutcome};

const REGISTRY_ABI: &[&str] = &[
    "function getProperty(uint256 id) view returns (uint256, uint256, uint256, uint256, string, address, uint256, string, uint8, string)",
    "function propertyCount() view returns (uint256)",
    "function propertiesOf(address owner) view returns (uint256[])",
    "function inspectorLocation(address account) view returns (uint256)",
    "function employeeDepartment(address account) view returns (uint256)",
    "function registerProperty(uint256 area, uint256 locationId, uint256 revenueDeptId, string surveyNumber, uint256 marketValue, string docCid)",
    "function scheduleInspection(uint256 id)",
    "function verifyProperty(uint256 id)",
    "function rejectProperty(uint256 id, string reason)",
    "function assignInspector(address account, uint256 locationId)",
    "function assignEmployee(address account, uint256 departmentId)",
];

/// Typed access to the land-registry contract
pub struct LandRegistry {
    client: Arc<ChainClient>,
    address: Address,
    abi: Abi,
}

impl LandRegistry {
    pub fn new(client: Arc<ChainClient>, address: &str) -> ChainResult<Self> {
        Ok(Self {
            address: parse_address(address)?,
            abi: parse_abi(REGISTRY_ABI).map_err(|e| ChainError::Abi(e.to_string()))?,
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

    /// Fetch a single property record
    pub async fn get_property(&self, id: u64) -> ChainResult<Property> {
        let tuple: PropertyTuple = self
            .read()
            .method("getProperty", U256::from(id))
            .map_err(|e| ChainError::Abi(e.to_string()))?
            .call()
            .await
            .map_err(contract_err)?;

        Property::try_from(tuple)
    }

    /// Total number of registered properties
    pub async fn property_count(&self) -> ChainResult<u64> {
        let count: U256 = self
            .read()
            .method("propertyCount", ())
            .map_err(|e| ChainError::Abi(e.to_string()))?
            .call()
            .await
            .map_err(contract_err)?;

        Ok(count.as_u64())
    }

    /// All properties owned by a wallet
    pub async fn properties_of(&self, owner: Address) -> ChainResult<Vec<Property>> {
        let ids: Vec<U256> = self
            .read()
            .method("propertiesOf", owner)
            .map_err(|e| ChainError::Abi(e.to_string()))?
            .call()
            .await
            .map_err(contract_err)?;

        let mut properties = Vec::with_capacity(ids.len());
        for id in ids {
            properties.push(self.get_property(id.as_u64()).await?);
        }
        Ok(properties)
    }

    /// Location id assigned to a land inspector; zero means not assigned
    pub async fn inspector_location(&self, account: Address) -> ChainResult<u64> {
        let loc: U256 = self
            .read()
            .method("inspectorLocation", account)
            .map_err(|e| ChainError::Abi(e.to_string()))?
            .call()
            .await
            .map_err(contract_err)?;

        Ok(loc.as_u64())
    }

    /// Department id assigned to a revenue employee; zero means not assigned
    pub async fn employee_department(&self, account: Address) -> ChainResult<u64> {
        let dept: U256 = self
            .read()
            .method("employeeDepartment", account)
            .map_err(|e| ChainError::Abi(e.to_string()))?
            .call()
            .await
            .map_err(contract_err)?;

        Ok(dept.as_u64())
    }

    // ==================== Writes ====================

    /// Register a new property owned by the signer
    #[allow(clippy::too_many_arguments)]
    pub async fn register_property(
        &self,
        area: u64,
        location_id: u64,
        revenue_department_id: u64,
        survey_number: &str,
        market_value: U256,
        document_cid: &str,
    ) -> ChainResult<TxOutcome> {
        let call = self
            .write()?
            .method::<_, ()>(
                "registerProperty",
                (
                    U256::from(area),
                    U256::from(location_id),
                    U256::from(revenue_department_id),
                    survey_number.to_string(),
                    market_value,
                    document_cid.to_string(),
                ),
            )
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        simulate_and_send(call).await
    }

    /// Schedule an inspection (revenue employee)
    pub async fn schedule_inspection(&self, id: u64) -> ChainResult<TxOutcome> {
        let call = self
            .write()?
            .method::<_, ()>("scheduleInspection", U256::from(id))
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        simulate_and_send(call).await
    }

    /// Mark a property verified (land inspector)
    pub async fn verify_property(&self, id: u64) -> ChainResult<TxOutcome> {
        let call = self
            .write()?
            .method::<_, ()>("verifyProperty", U256::from(id))
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        simulate_and_send(call).await
    }

    /// Reject a property with a reason (land inspector)
    pub async fn reject_property(&self, id: u64, reason: &str) -> ChainResult<TxOutcome> {
        let call = self
            .write()?
            .method::<_, ()>("rejectProperty", (U256::from(id), reason.to_string()))
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        simulate_and_send(call).await
    }

    /// Assign a land inspector to a location (admin)
    pub async fn assign_inspector(
        &self,
        account: Address,
        location_id: u64,
    ) -> ChainResult<TxOutcome> {
        let call = self
            .write()?
            .method::<_, ()>("assignInspector", (account, U256::from(location_id)))
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        simulate_and_send(call).await
    }

    /// Assign a revenue employee to a department (admin)
    pub async fn assign_employee(
        &self,
        account: Address,
        department_id: u64,
    ) -> ChainResult<TxOutcome> {
        let call = self
            .write()?
            .method::<_, ()>("assignEmployee", (account, U256::from(department_id)))
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        simulate_and_send(call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_abi_parses() {
        let abi = parse_abi(REGISTRY_ABI).unwrap();
        assert!(abi.function("getProperty").is_ok());
        assert!(abi.function("rejectProperty").is_ok());
        assert!(abi.function("assignInspector").is_ok());
    }
}
