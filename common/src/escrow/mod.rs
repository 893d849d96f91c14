use near_sdk::json_types::{U128, U64};
use near_sdk::near;

mod configuration;
pub use configuration::*;
mod external;
pub use external::*;
mod r#impl;
pub use r#impl::*;

/// Escrow totals are related as follows:
///
/// ```text
/// total_escrowed = sum(collateral of every active guarantee)
/// total_unclaimed_refunds = sum(refunds whose transfer failed)
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[near(serializers = [json])]
pub struct EscrowMetrics {
    pub loan_count: U64,
    pub total_escrowed: U128,
    pub total_unclaimed_refunds: U128,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[near(serializers = [borsh, json])]
pub struct OfferGuaranteeMsg {
    pub loan_id: U64,
    pub guarantor_interest: U128,
}

/// `msg` payload accepted by `ft_on_transfer` when the guarantee asset is a
/// NEP-141 token.
#[derive(Clone, Debug, PartialEq, Eq)]
#[near(serializers = [borsh, json])]
pub enum Nep141EscrowDepositMessage {
    OfferGuarantee(OfferGuaranteeMsg),
}
