use guarantee_escrow_common::{
    escrow::{EscrowConfiguration, EscrowExternalInterface, EscrowMetrics, MAX_LIST_LOANS},
    loan::{LoanRecord, LoanStatus},
};
use near_sdk::{
    env,
    json_types::{U128, U64},
    near, require, AccountId, Promise,
};

use crate::{Contract, ContractExt};

#[near]
impl EscrowExternalInterface for Contract {
    fn get_configuration(&self) -> EscrowConfiguration {
        self.configuration.clone()
    }

    fn get_escrow_metrics(&self) -> EscrowMetrics {
        self.metrics()
    }

    fn get_loan(&self, loan_id: U64) -> Option<LoanRecord> {
        self.get_loan_record(loan_id.0)
    }

    fn get_loan_status(&self, loan_id: U64) -> Option<LoanStatus> {
        self.escrow.get_loan(loan_id.0).map(|loan| loan.status())
    }

    fn list_loans(&self, offset: Option<u32>, count: Option<u32>) -> Vec<LoanRecord> {
        let offset = offset.map_or(0, u64::from);
        let count = count.map_or(MAX_LIST_LOANS, u64::from);
        self.escrow.list_loans(offset, count)
    }

    fn get_unclaimed_refund(&self, account_id: AccountId) -> U128 {
        self.escrow.get_unclaimed_refund(&account_id).into()
    }

    fn create_new_loan(&mut self, due_date: U64, amount: U128, interest: U128) -> U64 {
        let borrower = env::predecessor_account_id();

        let loan_id = self.create_loan(borrower, due_date.0, amount.0, interest.0);
        self.require_storage_covered();

        loan_id.into()
    }

    fn deny_guarantee(&mut self, loan_id: U64) -> Promise {
        let guarantee = self
            .escrow
            .deny_guarantee(&env::predecessor_account_id(), loan_id.0)
            .unwrap_or_else(|e| env::panic_str(&e.to_string()));

        self.transfer_refund(guarantee.guarantor, guarantee.collateral.0)
    }

    #[payable]
    fn offer_guarantee(&mut self, loan_id: U64, guarantor_interest: U128) {
        require!(
            self.configuration.guarantee_asset.is_native(),
            "Unsupported guarantee asset",
        );

        let attached = env::attached_deposit().as_yoctonear();

        self.execute_offer_guarantee(
            env::predecessor_account_id(),
            loan_id.0,
            guarantor_interest.0,
            attached,
        );
    }

    fn claim_refund(&mut self) -> Promise {
        let predecessor = env::predecessor_account_id();

        let amount = self
            .take_unclaimed_refund(&predecessor)
            .unwrap_or_else(|e| env::panic_str(&e.to_string()));

        self.transfer_refund(predecessor, amount)
    }
}
