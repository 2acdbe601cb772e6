//! On-Chain Record Types
//!
//! Rust views of the records the deployed contracts store. The lifecycle
//! state machines live entirely on-chain; these types only decode and
//! display what the contracts return.

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use super::error::ChainError;

/// Lifecycle state of a registered property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyState {
    /// Registered, waiting for an inspection to be scheduled
    Created,
    /// Inspection scheduled by a revenue employee
    Scheduled,
    /// Verified by the land inspector
    Verified,
    /// Rejected by the land inspector (see rejection reason)
    Rejected,
    /// Listed on the marketplace
    OnSale,
    /// Purchased; ownership transferred
    Bought,
    /// Sale accepted, payment pending
    SalePending,
}

impl TryFrom<u8> for PropertyState {
    type Error = ChainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Created),
            1 => Ok(Self::Scheduled),
            2 => Ok(Self::Verified),
            3 => Ok(Self::Rejected),
            4 => Ok(Self::OnSale),
            5 => Ok(Self::Bought),
            6 => Ok(Self::SalePending),
            other => Err(ChainError::Decode(format!(
                "unknown property state {other}"
            ))),
        }
    }
}

impl std::fmt::Display for PropertyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Scheduled => "scheduled",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::OnSale => "on_sale",
            Self::Bought => "bought",
            Self::SalePending => "sale_pending",
        };
        write!(f, "{s}")
    }
}

/// State of a marketplace sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleState {
    /// Open for purchase requests
    Active,
    /// Seller accepted a buyer; payment deadline running
    AcceptedToBuyer,
    /// Cancelled by the seller
    Cancelled,
    /// Payment completed, ownership transferred
    Success,
}

impl TryFrom<u8> for SaleState {
    type Error = ChainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Active),
            1 => Ok(Self::AcceptedToBuyer),
            2 => Ok(Self::Cancelled),
            3 => Ok(Self::Success),
            other => Err(ChainError::Decode(format!("unknown sale state {other}"))),
        }
    }
}

/// State of a buyer's purchase request against a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// Submitted, awaiting seller action
    Sent,
    /// Withdrawn by the buyer
    Cancelled,
    /// Accepted by the seller
    Accepted,
    /// Rejected by the seller
    Rejected,
    /// Re-submitted after a rejection
    ReRequested,
    /// Payment done, property transferred
    Transferred,
}

impl RequestState {
    /// A request still counts toward bid ranking unless the buyer
    /// withdrew it or the seller turned it down.
    pub fn is_active_offer(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::Rejected)
    }
}

impl TryFrom<u8> for RequestState {
    type Error = ChainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Sent),
            1 => Ok(Self::Cancelled),
            2 => Ok(Self::Accepted),
            3 => Ok(Self::Rejected),
            4 => Ok(Self::ReRequested),
            5 => Ok(Self::Transferred),
            other => Err(ChainError::Decode(format!(
                "unknown request state {other}"
            ))),
        }
    }
}

/// On-chain property record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: u64,
    /// Area in square metres
    pub area: u64,
    /// Village/taluk location identifier assigned by the registry
    pub location_id: u64,
    /// Revenue department the property reports to
    pub revenue_department_id: u64,
    /// Government survey number
    pub survey_number: String,
    /// Current owner wallet
    pub owner: Address,
    /// Asking/market value in wei
    pub market_value: U256,
    /// CID of the pinned property documents
    pub document_cid: String,
    pub state: PropertyState,
    /// Populated only when state == Rejected
    pub rejection_reason: String,
}

/// Raw tuple layout of `getProperty` as the deployed contract returns it.
/// State enums arrive as uint8 on the wire but decode through `U256`.
pub type PropertyTuple = (
    U256,    // id
    U256,    // area
    U256,    // locationId
    U256,    // revenueDeptId
    String,  // surveyNumber
    Address, // owner
    U256,    // marketValue
    String,  // docCid
    U256,    // state
    String,  // rejectionReason
);

/// Narrow an on-chain enum value to a state byte
fn state_byte(value: U256) -> Result<u8, ChainError> {
    if value > U256::from(u8::MAX) {
        return Err(ChainError::Decode(format!("state value {value} out of range")));
    }
    Ok(value.low_u64() as u8)
}

impl TryFrom<PropertyTuple> for Property {
    type Error = ChainError;

    fn try_from(t: PropertyTuple) -> Result<Self, Self::Error> {
        Ok(Self {
            id: t.0.as_u64(),
            area: t.1.as_u64(),
            location_id: t.2.as_u64(),
            revenue_department_id: t.3.as_u64(),
            survey_number: t.4,
            owner: t.5,
            market_value: t.6,
            document_cid: t.7,
            state: PropertyState::try_from(state_byte(t.8)?)?,
            rejection_reason: t.9,
        })
    }
}

/// On-chain sale listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: u64,
    pub property_id: u64,
    pub seller: Address,
    /// Asking price in wei
    pub price: U256,
    /// Zero address until a request is accepted
    pub accepted_buyer: Address,
    pub accepted_price: U256,
    /// Unix seconds; zero until a request is accepted
    pub payment_deadline: u64,
    pub state: SaleState,
}

/// Raw tuple layout of `getSale`.
pub type SaleTuple = (U256, U256, Address, U256, Address, U256, U256, U256);

impl TryFrom<SaleTuple> for Sale {
    type Error = ChainError;

    fn try_from(t: SaleTuple) -> Result<Self, Self::Error> {
        Ok(Self {
            id: t.0.as_u64(),
            property_id: t.1.as_u64(),
            seller: t.2,
            price: t.3,
            accepted_buyer: t.4,
            accepted_price: t.5,
            payment_deadline: t.6.as_u64(),
            state: SaleState::try_from(state_byte(t.7)?)?,
        })
    }
}

/// A buyer's purchase request (bid) against a sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub id: u64,
    pub sale_id: u64,
    pub buyer: Address,
    /// Offered price in wei
    pub price: U256,
    pub state: RequestState,
}

/// Raw tuple layout of `getRequest`.
pub type RequestTuple = (U256, U256, Address, U256, U256);

impl TryFrom<RequestTuple> for PurchaseRequest {
    type Error = ChainError;

    fn try_from(t: RequestTuple) -> Result<Self, Self::Error> {
        Ok(Self {
            id: t.0.as_u64(),
            sale_id: t.1.as_u64(),
            buyer: t.2,
            price: t.3,
            state: RequestState::try_from(state_byte(t.4)?)?,
        })
    }
}

/// Outcome of a submitted transaction
#[derive(Debug, Clone, Serialize)]
pub struct TxOutcome {
    /// Transaction hash as 0x-prefixed hex
    pub tx_hash: String,
    /// Block the transaction was mined in
    pub block_number: Option<u64>,
    /// Gas actually used
    pub gas_used: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_state_round_trip() {
        for v in 0u8..=6 {
            let state = PropertyState::try_from(v).unwrap();
            // Display strings stay stable; dashboards key off them
            assert!(!state.to_string().is_empty());
        }
        assert!(PropertyState::try_from(7).is_err());
    }

    #[test]
    fn request_state_active_offer() {
        assert!(RequestState::Sent.is_active_offer());
        assert!(RequestState::ReRequested.is_active_offer());
        assert!(RequestState::Accepted.is_active_offer());
        assert!(!RequestState::Cancelled.is_active_offer());
        assert!(!RequestState::Rejected.is_active_offer());
    }

    #[test]
    fn property_tuple_decodes() {
        let owner = Address::random();
        let t: PropertyTuple = (
            U256::from(7),
            U256::from(1200),
            U256::from(3),
            U256::from(12),
            "SRV-1024/4".to_string(),
            owner,
            U256::from(5_000_000u64),
            "bafybeidocs".to_string(),
            U256::from(2),
            String::new(),
        );

        let p = Property::try_from(t).unwrap();
        assert_eq!(p.id, 7);
        assert_eq!(p.survey_number, "SRV-1024/4");
        assert_eq!(p.owner, owner);
        assert_eq!(p.state, PropertyState::Verified);
    }

    #[test]
    fn bad_state_is_decode_error() {
        let t: SaleTuple = (
            U256::one(),
            U256::one(),
            Address::zero(),
            U256::zero(),
            Address::zero(),
            U256::zero(),
            U256::zero(),
            U256::from(99),
        );
        assert!(matches!(Sale::try_from(t), Err(ChainError::Decode(_))));

        let oversized = state_byte(U256::from(1_000));
        assert!(oversized.is_err());
    }
}
