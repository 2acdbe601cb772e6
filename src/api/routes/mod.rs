//! API Route Handlers

pub mod chat;
pub mod geocode;
pub mod health;
pub mod pinning;
pub mod properties;
pub mod roles;
pub mod sales;
pub mod users;

use ethers::types::{Address, U256};

use crate::api::error::{ApiError, ApiResult};

/// Parse an address supplied by a client, rejecting with 400 on junk
pub(crate) fn parse_addr(s: &str) -> ApiResult<Address> {
    crate::chain::parse_address(s)
        .map_err(|_| ApiError::Validation(format!("Invalid address: {s}")))
}

/// Parse a decimal wei amount, rejecting zero and junk
pub(crate) fn parse_amount(s: &str) -> ApiResult<U256> {
    let value = U256::from_dec_str(s.trim())
        .map_err(|_| ApiError::Validation(format!("Invalid amount: {s}")))?;
    if value.is_zero() {
        return Err(ApiError::Validation("Amount must be greater than zero".to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_parsing_rejects_zero_and_junk() {
        assert!(parse_amount("1000000000000000000").is_ok());
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("1.5").is_err());
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn address_parsing_rejects_junk() {
        assert!(parse_addr("0x52908400098527886E0F7030069857D2E4169EE7").is_ok());
        assert!(parse_addr("not-an-address").is_err());
        assert!(parse_addr("0x123").is_err());
    }
}
