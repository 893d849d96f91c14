use near_sdk::{
    json_types::{U128, U64},
    AccountId, Promise,
};

use crate::loan::{LoanRecord, LoanStatus};

use super::{EscrowConfiguration, EscrowMetrics};

pub trait EscrowExternalInterface {
    // ==============
    // VIEW FUNCTIONS
    // ==============

    fn get_configuration(&self) -> EscrowConfiguration;
    fn get_escrow_metrics(&self) -> EscrowMetrics;
    fn get_loan(&self, loan_id: U64) -> Option<LoanRecord>;
    fn get_loan_status(&self, loan_id: U64) -> Option<LoanStatus>;
    /// Loans in creation order.
    fn list_loans(&self, offset: Option<u32>, count: Option<u32>) -> Vec<LoanRecord>;
    fn get_unclaimed_refund(&self, account_id: AccountId) -> U128;

    // ===============
    // LOAN FUNCTIONS
    // ===============

    /// The predecessor becomes the borrower.
    fn create_new_loan(&mut self, due_date: U64, amount: U128, interest: U128) -> U64;
    /// Only the borrower may deny. Refunds the escrowed collateral to the
    /// guarantor.
    fn deny_guarantee(&mut self, loan_id: U64) -> Promise;

    // ===================
    // GUARANTOR FUNCTIONS
    // ===================

    // Required to implement NEP-141 FT token receiver to receive local fungible tokens.
    // ft_on_transfer :: where msg = OfferGuarantee

    /// The attached deposit must be exactly
    /// `amount + interest - guarantor_interest`.
    fn offer_guarantee(&mut self, loan_id: U64, guarantor_interest: U128);
    /// Withdraws refunds whose original transfer failed.
    fn claim_refund(&mut self) -> Promise;
}
