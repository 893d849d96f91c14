use near_sdk::near;

use crate::asset::FungibleAsset;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[near(serializers = [json, borsh])]
pub struct EscrowConfiguration {
    /// Collateral asset guarantors escrow. Native NEAR is attached to
    /// `offer_guarantee`; a NEP-141 token is sent with `ft_transfer_call`.
    pub guarantee_asset: FungibleAsset,
}

impl EscrowConfiguration {
    pub fn native() -> Self {
        Self {
            guarantee_asset: FungibleAsset::Native,
        }
    }
}
