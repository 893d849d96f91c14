use guarantee_escrow_common::escrow::{Nep141EscrowDepositMessage, OfferGuaranteeMsg};
use near_contract_standards::fungible_token::receiver::FungibleTokenReceiver;
use near_sdk::{env, json_types::U128, near, AccountId, PromiseOrValue};

use crate::{Contract, ContractExt};

#[near]
impl FungibleTokenReceiver for Contract {
    /// Any panic here makes the token contract return the whole transfer to
    /// the sender, so a rejected offer never leaves tokens behind.
    fn ft_on_transfer(
        &mut self,
        sender_id: AccountId,
        amount: U128,
        msg: String,
    ) -> PromiseOrValue<U128> {
        let msg = near_sdk::serde_json::from_str::<Nep141EscrowDepositMessage>(&msg)
            .unwrap_or_else(|_| env::panic_str("Invalid ft_on_transfer msg"));

        let asset_id = env::predecessor_account_id();

        if !self.configuration.guarantee_asset.is_nep141(&asset_id) {
            env::panic_str("Unsupported guarantee asset");
        }

        match msg {
            Nep141EscrowDepositMessage::OfferGuarantee(OfferGuaranteeMsg {
                loan_id,
                guarantor_interest,
            }) => {
                self.execute_offer_guarantee(sender_id, loan_id.0, guarantor_interest.0, amount.0);

                PromiseOrValue::Value(U128(0))
            }
        }
    }
}
