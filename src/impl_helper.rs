use near_sdk::{env, json_types::U128, near, require, AccountId, Promise, PromiseResult};

use crate::{Contract, ContractExt};

/// Internal helpers.
impl Contract {
    pub(crate) fn execute_offer_guarantee(
        &mut self,
        guarantor: AccountId,
        loan_id: u64,
        guarantor_interest: u128,
        attached: u128,
    ) {
        self.escrow
            .offer_guarantee(guarantor, loan_id, guarantor_interest, attached)
            .unwrap_or_else(|e| env::panic_str(&e.to_string()));

        self.require_storage_covered();
    }

    /// Storage is paid from the contract's own balance. Panics if, after the
    /// writes of the current call, the storage stake would eat into the
    /// native NEAR held for guarantors.
    pub(crate) fn require_storage_covered(&self) {
        let storage_stake = env::storage_byte_cost()
            .as_yoctonear()
            .saturating_mul(u128::from(env::storage_usage()));

        require!(
            env::account_balance().as_yoctonear()
                >= storage_stake.saturating_add(self.native_reserve()),
            "Insufficient contract balance to cover storage",
        );
    }

    /// Sends `amount` of the guarantee asset back to `account_id` and checks
    /// the outcome in [`Contract::after_refund_transfer`].
    pub(crate) fn transfer_refund(&self, account_id: AccountId, amount: u128) -> Promise {
        self.configuration
            .guarantee_asset
            .transfer(account_id.clone(), amount)
            .then(
                Self::ext(env::current_account_id())
                    .after_refund_transfer(account_id, U128(amount)),
            )
    }
}

#[near]
impl Contract {
    /// Called after a refund transfer. A failed transfer leaves the funds
    /// with this contract, so they are credited to the recipient's
    /// unclaimed refund balance.
    #[private]
    pub fn after_refund_transfer(&mut self, account_id: AccountId, amount: U128) {
        require!(env::promise_results_count() == 1);

        match env::promise_result(0) {
            PromiseResult::Successful(_) => {}
            PromiseResult::Failed => {
                env::log_str(&format!(
                    "Refund of {} to {account_id} failed. It can be claimed with claim_refund.",
                    amount.0,
                ));
                self.record_unclaimed_refund(&account_id, amount.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use guarantee_escrow_common::escrow::EscrowConfiguration;
    use near_sdk::{
        json_types::U128, test_utils::VMContextBuilder, testing_env, AccountId, PromiseResult,
        RuntimeFeesConfig,
    };

    use crate::Contract;

    fn callback_context(promise_result: PromiseResult) -> Contract {
        let contract_id: AccountId = "escrow.near".parse().unwrap();
        testing_env!(
            VMContextBuilder::new()
                .current_account_id(contract_id.clone())
                .predecessor_account_id(contract_id)
                .build(),
            near_sdk::test_vm_config(),
            RuntimeFeesConfig::test(),
            Default::default(),
            vec![promise_result],
        );
        Contract::new(EscrowConfiguration::native())
    }

    #[test]
    fn successful_refund_is_not_credited() {
        let mut contract = callback_context(PromiseResult::Successful(vec![]));
        let guarantor: AccountId = "guarantor.near".parse().unwrap();

        contract.after_refund_transfer(guarantor.clone(), U128(12));

        assert_eq!(contract.escrow.get_unclaimed_refund(&guarantor), 0);
        assert_eq!(contract.metrics().total_unclaimed_refunds.0, 0);
    }

    #[test]
    fn failed_refund_is_credited() {
        let mut contract = callback_context(PromiseResult::Failed);
        let guarantor: AccountId = "guarantor.near".parse().unwrap();

        contract.after_refund_transfer(guarantor.clone(), U128(12));
        contract.after_refund_transfer(guarantor.clone(), U128(30));

        assert_eq!(contract.escrow.get_unclaimed_refund(&guarantor), 42);
        assert_eq!(contract.metrics().total_unclaimed_refunds.0, 42);
        assert!(near_sdk::test_utils::get_logs()
            .iter()
            .any(|log| log.contains("claim_refund")));
    }
}
