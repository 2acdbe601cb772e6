//! Data Transfer Objects
//!
//! Request and response types for the API endpoints. Chain values
//! (addresses, wei amounts) cross the wire as strings: addresses as
//! 0x-hex, amounts as decimal.

use serde::{Deserialize, Serialize};

use crate::bids::RankedBid;
use crate::chain::{Property, PurchaseRequest, Sale};
use crate::roles::RoleFlags;

// ============================================
// PROPERTY DTOs
// ============================================

/// Property record as served to dashboards
#[derive(Debug, Serialize)]
pub struct PropertyDto {
    pub id: u64,
    pub area: u64,
    pub location_id: u64,
    pub revenue_department_id: u64,
    pub survey_number: String,
    pub owner: String,
    /// Wei, decimal string
    pub market_value: String,
    pub document_cid: String,
    pub state: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rejection_reason: String,
}

impl From<Property> for PropertyDto {
    fn from(p: Property) -> Self {
        Self {
            id: p.id,
            area: p.area,
            location_id: p.location_id,
            revenue_department_id: p.revenue_department_id,
            survey_number: p.survey_number,
            owner: format!("{:#x}", p.owner),
            market_value: p.market_value.to_string(),
            document_cid: p.document_cid,
            state: p.state.to_string(),
            rejection_reason: p.rejection_reason,
        }
    }
}

/// Register a new property
#[derive(Debug, Deserialize)]
pub struct RegisterPropertyRequest {
    pub area: u64,
    pub location_id: u64,
    pub revenue_department_id: u64,
    pub survey_number: String,
    /// Wei, decimal string
    pub market_value: String,
    pub document_cid: String,
}

/// Reject a property with a reason
#[derive(Debug, Deserialize)]
pub struct RejectPropertyRequest {
    pub reason: String,
}

// ============================================
// SALE / BID DTOs
// ============================================

/// Sale listing as served to dashboards
#[derive(Debug, Serialize)]
pub struct SaleDto {
    pub id: u64,
    pub property_id: u64,
    pub seller: String,
    pub price: String,
    pub accepted_buyer: String,
    pub accepted_price: String,
    pub payment_deadline: u64,
    pub state: crate::chain::SaleState,
}

impl From<Sale> for SaleDto {
    fn from(s: Sale) -> Self {
        Self {
            id: s.id,
            property_id: s.property_id,
            seller: format!("{:#x}", s.seller),
            price: s.price.to_string(),
            accepted_buyer: format!("{:#x}", s.accepted_buyer),
            accepted_price: s.accepted_price.to_string(),
            payment_deadline: s.payment_deadline,
            state: s.state,
        }
    }
}

/// A raw purchase request
#[derive(Debug, Serialize)]
pub struct RequestDto {
    pub id: u64,
    pub sale_id: u64,
    pub buyer: String,
    pub price: String,
    pub state: crate::chain::RequestState,
}

impl From<PurchaseRequest> for RequestDto {
    fn from(r: PurchaseRequest) -> Self {
        Self {
            id: r.id,
            sale_id: r.sale_id,
            buyer: format!("{:#x}", r.buyer),
            price: r.price.to_string(),
            state: r.state,
        }
    }
}

/// One entry of the ranked-bid view
#[derive(Debug, Serialize)]
pub struct RankedBidDto {
    pub request_id: u64,
    pub buyer: String,
    pub price: String,
    pub state: crate::chain::RequestState,
    pub highest: bool,
}

impl From<RankedBid> for RankedBidDto {
    fn from(b: RankedBid) -> Self {
        Self {
            request_id: b.request_id,
            buyer: format!("{:#x}", b.buyer),
            price: b.price.to_string(),
            state: b.state,
            highest: b.highest,
        }
    }
}

/// List a property for sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub property_id: u64,
    /// Wei, decimal string
    pub price: String,
}

/// Submit a purchase request
#[derive(Debug, Deserialize)]
pub struct SubmitBidRequest {
    /// Offered price in wei, decimal string
    pub price: String,
}

// ============================================
// ROLE DTOs
// ============================================

/// Derived authorization view of a wallet
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub address: String,
    pub role: String,
    pub admin: bool,
    pub inspector: bool,
    pub employee: bool,
    pub inspector_location: u64,
    pub employee_department: u64,
}

impl RoleResponse {
    pub fn from_flags(address: &str, flags: RoleFlags) -> Self {
        Self {
            address: address.to_lowercase(),
            role: flags.primary().to_string(),
            admin: flags.admin,
            inspector: flags.inspector,
            employee: flags.employee,
            inspector_location: flags.inspector_location,
            employee_department: flags.employee_department,
        }
    }
}

/// Assign a staff wallet (inspector or employee)
#[derive(Debug, Deserialize)]
pub struct AssignStaffRequest {
    pub address: String,
    /// Location id for inspectors, department id for employees
    pub assignment_id: u64,
}

// ============================================
// CHAT DTOs
// ============================================

/// Send a chat message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub from: String,
    pub to: String,
    pub content: String,
}

/// Conversation view
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub conversation: String,
    pub messages: Vec<crate::chat::ChatMessage>,
}

/// Mark a conversation read
#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    /// Which side of the conversation is reading
    pub owner: String,
}

// ============================================
// PINNING DTOs
// ============================================

/// Pin an arbitrary JSON document
#[derive(Debug, Deserialize)]
pub struct PinJsonRequest {
    /// Metadata name the pin is filed under
    pub name: String,
    pub content: serde_json::Value,
}

/// Result of a pin operation
#[derive(Debug, Serialize)]
pub struct PinResponse {
    pub cid: String,
}

// ============================================
// USER DTOs
// ============================================

/// Result of registering a profile
#[derive(Debug, Serialize)]
pub struct RegisterProfileResponse {
    pub cid: String,
    pub tx_hash: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub chain: String,
    pub pinning: String,
    pub chat: crate::chat::SyncStatus,
    pub uptime_seconds: u64,
    pub version: String,
}
