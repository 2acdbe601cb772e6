//! Bid Ranking
//!
//! A seller's view of a sale must show, per buyer, only that buyer's most
//! recent still-standing offer, ranked by offered price with the top one
//! flagged. Cancelled and rejected requests drop out entirely; a buyer
//! who re-requests replaces their earlier entry.
//!
//! Input order is on-chain insertion order. It decides both which request
//! is "most recent" per buyer and how equal prices tie-break (stable, so
//! the earlier bidder keeps the higher rank).

use ethers::types::{Address, U256};
use serde::Serialize;

use crate::chain::{PurchaseRequest, RequestState};

/// One buyer's effective offer in the ranked view
#[derive(Debug, Clone, Serialize)]
pub struct RankedBid {
    /// Id of the request that is this buyer's effective offer
    pub request_id: u64,
    pub buyer: Address,
    /// Offered price in wei
    pub price: U256,
    pub state: RequestState,
    /// True only for the top-ranked entry
    pub highest: bool,
}

/// Collapse requests to one effective bid per buyer and rank by price
/// descending. Returns an empty vector when no offer is standing.
pub fn rank_bids(requests: &[PurchaseRequest]) -> Vec<RankedBid> {
    // Latest non-cancelled, non-rejected request per buyer, preserving the
    // order in which each buyer first appeared (for stable ties).
    let mut order: Vec<Address> = Vec::new();
    let mut effective: Vec<Option<&PurchaseRequest>> = Vec::new();

    for request in requests {
        let slot = match order.iter().position(|b| *b == request.buyer) {
            Some(i) => i,
            None => {
                order.push(request.buyer);
                effective.push(None);
                order.len() - 1
            }
        };

        if request.state.is_active_offer() {
            effective[slot] = Some(request);
        } else {
            // A later cancel/reject voids the buyer's earlier offer too:
            // on-chain, re-requesting is the only way back in.
            effective[slot] = None;
        }
    }

    let mut ranked: Vec<RankedBid> = effective
        .into_iter()
        .flatten()
        .map(|r| RankedBid {
            request_id: r.id,
            buyer: r.buyer,
            price: r.price,
            state: r.state,
            highest: false,
        })
        .collect();

    ranked.sort_by(|a, b| b.price.cmp(&a.price));

    if let Some(top) = ranked.first_mut() {
        top.highest = true;
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn request(id: u64, buyer: Address, price: u64, state: RequestState) -> PurchaseRequest {
        PurchaseRequest {
            id,
            sale_id: 1,
            buyer,
            price: U256::from(price),
            state,
        }
    }

    #[test]
    fn latest_offer_per_buyer_ranked_by_price() {
        let a = addr(0xaa);
        let b = addr(0xbb);
        let requests = vec![
            request(1, a, 10, RequestState::Sent),
            request(2, a, 15, RequestState::ReRequested),
            request(3, b, 12, RequestState::Sent),
        ];

        let ranked = rank_bids(&requests);
        assert_eq!(ranked.len(), 2);

        assert_eq!(ranked[0].buyer, a);
        assert_eq!(ranked[0].price, U256::from(15));
        assert!(ranked[0].highest);

        assert_eq!(ranked[1].buyer, b);
        assert_eq!(ranked[1].price, U256::from(12));
        assert!(!ranked[1].highest);
    }

    #[test]
    fn cancelled_and_rejected_drop_out() {
        let a = addr(0xaa);
        let b = addr(0xbb);
        let requests = vec![
            request(1, a, 20, RequestState::Cancelled),
            request(2, b, 5, RequestState::Rejected),
        ];

        assert!(rank_bids(&requests).is_empty());
    }

    #[test]
    fn later_cancel_voids_earlier_offer() {
        let a = addr(0xaa);
        let requests = vec![
            request(1, a, 20, RequestState::Sent),
            request(2, a, 25, RequestState::Cancelled),
        ];

        assert!(rank_bids(&requests).is_empty());
    }

    #[test]
    fn equal_prices_keep_insertion_order() {
        let a = addr(0xaa);
        let b = addr(0xbb);
        let c = addr(0xcc);
        let requests = vec![
            request(1, a, 10, RequestState::Sent),
            request(2, b, 10, RequestState::Sent),
            request(3, c, 8, RequestState::Sent),
        ];

        let ranked = rank_bids(&requests);
        assert_eq!(ranked[0].buyer, a);
        assert!(ranked[0].highest);
        assert_eq!(ranked[1].buyer, b);
        assert_eq!(ranked[2].buyer, c);
    }

    #[test]
    fn accepted_offer_still_listed() {
        let a = addr(0xaa);
        let ranked = rank_bids(&[request(1, a, 30, RequestState::Accepted)]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].state, RequestState::Accepted);
        assert!(ranked[0].highest);
    }

    #[test]
    fn empty_input_empty_output() {
        assert!(rank_bids(&[]).is_empty());
    }
}
