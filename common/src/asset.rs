use near_contract_standards::fungible_token::core::ext_ft_core;
use near_sdk::{near, AccountId, NearToken, Promise};

/// The asset a guarantor escrows as collateral.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[near(serializers = [json, borsh])]
pub enum FungibleAsset {
    #[default]
    Native,
    Nep141(AccountId),
}

impl FungibleAsset {
    pub fn nep141(contract_id: AccountId) -> Self {
        Self::Nep141(contract_id)
    }

    pub fn transfer(&self, receiver_id: AccountId, amount: u128) -> Promise {
        match self {
            FungibleAsset::Native => {
                Promise::new(receiver_id).transfer(NearToken::from_yoctonear(amount))
            }
            FungibleAsset::Nep141(ref contract_id) => ext_ft_core::ext(contract_id.clone())
                .with_attached_deposit(NearToken::from_yoctonear(1))
                .ft_transfer(receiver_id, amount.into(), None),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// Whether this asset is the NEP-141 token deployed at `account_id`.
    pub fn is_nep141(&self, account_id: &AccountId) -> bool {
        matches!(self, Self::Nep141(ref contract_id) if contract_id == account_id)
    }
}
