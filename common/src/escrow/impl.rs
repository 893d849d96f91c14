use near_sdk::{collections::LookupMap, env, near, AccountId, BorshStorageKey, IntoStorageKey};

use crate::{
    escrow::{EscrowConfiguration, EscrowMetrics},
    event::EscrowEvent,
    loan::{Guarantee, Loan, LoanId, LoanRecord},
};

use self::error::{
    ClaimRefundError, DenyGuaranteeError, LoanNotFoundError, OfferGuaranteeError,
};

/// Upper bound on the number of records a single `list_loans` page returns.
pub const MAX_LIST_LOANS: u64 = 100;

#[derive(BorshStorageKey)]
#[near]
enum StorageKey {
    Loans,
    UnclaimedRefunds,
}

#[near]
pub struct GuaranteeEscrow {
    pub configuration: EscrowConfiguration,
    next_loan_id: LoanId,
    loans: LookupMap<LoanId, Loan>,
    /// Collateral held for active guarantees.
    total_escrowed: u128,
    /// Refunds whose transfer failed, waiting to be claimed.
    unclaimed_refunds: LookupMap<AccountId, u128>,
    total_unclaimed_refunds: u128,
}

impl GuaranteeEscrow {
    pub fn new(prefix: impl IntoStorageKey, configuration: EscrowConfiguration) -> Self {
        let prefix = prefix.into_storage_key();
        macro_rules! key {
            ($key: ident) => {
                [
                    prefix.as_slice(),
                    StorageKey::$key.into_storage_key().as_slice(),
                ]
                .concat()
            };
        }
        Self {
            configuration,
            next_loan_id: 0,
            loans: LookupMap::new(key!(Loans)),
            total_escrowed: 0,
            unclaimed_refunds: LookupMap::new(key!(UnclaimedRefunds)),
            total_unclaimed_refunds: 0,
        }
    }

    /// Number of loans ever created. Ids are `0..loan_count()`.
    pub fn loan_count(&self) -> u64 {
        self.next_loan_id
    }

    pub fn get_loan(&self, loan_id: LoanId) -> Option<Loan> {
        self.loans.get(&loan_id)
    }

    pub fn get_loan_record(&self, loan_id: LoanId) -> Option<LoanRecord> {
        self.loans.get(&loan_id).map(|loan| loan.to_record(loan_id))
    }

    /// Records of loans `offset..offset + count`, at most [`MAX_LIST_LOANS`]
    /// of them.
    pub fn list_loans(&self, offset: u64, count: u64) -> Vec<LoanRecord> {
        let end = offset
            .saturating_add(count.min(MAX_LIST_LOANS))
            .min(self.next_loan_id);
        (offset..end)
            .filter_map(|loan_id| self.get_loan_record(loan_id))
            .collect()
    }

    pub fn metrics(&self) -> EscrowMetrics {
        EscrowMetrics {
            loan_count: self.next_loan_id.into(),
            total_escrowed: self.total_escrowed.into(),
            total_unclaimed_refunds: self.total_unclaimed_refunds.into(),
        }
    }

    /// Native NEAR this contract holds on behalf of guarantors: escrowed
    /// collateral plus unclaimed refunds. Zero for a NEP-141 escrow, whose
    /// collateral lives on the token contract.
    pub fn native_reserve(&self) -> u128 {
        if self.configuration.guarantee_asset.is_native() {
            self.total_escrowed
                .saturating_add(self.total_unclaimed_refunds)
        } else {
            0
        }
    }

    pub fn get_unclaimed_refund(&self, account_id: &AccountId) -> u128 {
        self.unclaimed_refunds.get(account_id).unwrap_or(0)
    }

    fn require_loan(&self, loan_id: LoanId) -> Result<Loan, LoanNotFoundError> {
        self.loans.get(&loan_id).ok_or(LoanNotFoundError { loan_id })
    }

    /// Registers a new loan on behalf of `borrower`. Creation inputs are not
    /// validated: any due date, amount and interest are accepted.
    pub fn create_loan(
        &mut self,
        borrower: AccountId,
        due_date: u64,
        amount: u128,
        interest: u128,
    ) -> LoanId {
        let loan_id = self.next_loan_id;
        self.next_loan_id = loan_id
            .checked_add(1)
            .unwrap_or_else(|| env::panic_str("Loan id overflow"));

        self.loans
            .insert(&loan_id, &Loan::new(borrower, due_date, amount, interest));

        EscrowEvent::LoanCreated {
            loan_id: loan_id.into(),
        }
        .emit();

        loan_id
    }

    /// Escrows `attached` as the guarantee for `loan_id`. Every check runs
    /// before the first write, so an error leaves the escrow untouched and
    /// the caller is responsible for returning `attached` (which the host
    /// does when the call panics).
    ///
    /// # Errors
    ///
    /// - If the loan does not exist or already has a guarantee.
    /// - If `guarantor_interest` is zero. A guaranteed loan always carries a
    ///   nonzero guarantor interest, so zero stays reserved for "no
    ///   guarantor".
    /// - If `guarantor_interest` is not below `amount + interest`.
    /// - If `attached` is not exactly `amount + interest - guarantor_interest`.
    pub fn offer_guarantee(
        &mut self,
        guarantor: AccountId,
        loan_id: LoanId,
        guarantor_interest: u128,
        attached: u128,
    ) -> Result<(), OfferGuaranteeError> {
        let mut loan = self.require_loan(loan_id)?;

        if loan.guarantee().is_some() {
            return Err(OfferGuaranteeError::AlreadyGuaranteed { loan_id });
        }

        if guarantor_interest == 0 {
            return Err(OfferGuaranteeError::ZeroGuarantorInterest);
        }

        let total_obligation = loan
            .total_obligation()
            .ok_or(OfferGuaranteeError::ObligationOverflow)?;

        let required = loan
            .required_collateral(guarantor_interest)
            .ok_or(OfferGuaranteeError::GuarantorInterestTooHigh {
                guarantor_interest,
                total_obligation,
            })?;

        if attached != required {
            return Err(OfferGuaranteeError::IncorrectGuaranteeAmount { required, attached });
        }

        let total_escrowed = self
            .total_escrowed
            .checked_add(required)
            .ok_or(OfferGuaranteeError::EscrowOverflow)?;

        loan.set_guarantee(Guarantee {
            guarantor: guarantor.clone(),
            guarantor_interest: guarantor_interest.into(),
            collateral: required.into(),
        });
        self.loans.insert(&loan_id, &loan);
        self.total_escrowed = total_escrowed;

        EscrowEvent::GuaranteeOffered {
            loan_id: loan_id.into(),
            guarantor,
        }
        .emit();

        Ok(())
    }

    /// Clears the active guarantee of `loan_id` and releases its collateral
    /// from the escrow. The returned guarantee carries the guarantor and the
    /// exact amount that must be transferred back to them.
    ///
    /// # Errors
    ///
    /// - If the loan does not exist.
    /// - If `caller` is not the borrower.
    /// - If the loan has no active guarantee.
    pub fn deny_guarantee(
        &mut self,
        caller: &AccountId,
        loan_id: LoanId,
    ) -> Result<Guarantee, DenyGuaranteeError> {
        let mut loan = self.require_loan(loan_id)?;

        if &loan.borrower != caller {
            return Err(DenyGuaranteeError::Unauthorized { loan_id });
        }

        let guarantee = loan
            .take_guarantee()
            .ok_or(DenyGuaranteeError::NoActiveGuarantee { loan_id })?;

        self.total_escrowed = self
            .total_escrowed
            .checked_sub(guarantee.collateral.0)
            .unwrap_or_else(|| env::panic_str("Invariant violation: escrow underflow"));
        self.loans.insert(&loan_id, &loan);

        EscrowEvent::GuaranteeDenied {
            loan_id: loan_id.into(),
        }
        .emit();

        Ok(guarantee)
    }

    /// Credits a refund that could not be delivered.
    pub fn record_unclaimed_refund(&mut self, account_id: &AccountId, amount: u128) {
        let balance = self
            .get_unclaimed_refund(account_id)
            .checked_add(amount)
            .unwrap_or_else(|| env::panic_str("Unclaimed refund overflow"));
        self.total_unclaimed_refunds = self
            .total_unclaimed_refunds
            .checked_add(amount)
            .unwrap_or_else(|| env::panic_str("Unclaimed refund total overflow"));
        self.unclaimed_refunds.insert(account_id, &balance);
    }

    /// Removes and returns the whole unclaimed refund balance of
    /// `account_id`.
    ///
    /// # Errors
    ///
    /// - If there is nothing to claim.
    pub fn take_unclaimed_refund(
        &mut self,
        account_id: &AccountId,
    ) -> Result<u128, ClaimRefundError> {
        let amount = self
            .unclaimed_refunds
            .remove(account_id)
            .filter(|amount| *amount > 0)
            .ok_or(ClaimRefundError)?;

        self.total_unclaimed_refunds = self
            .total_unclaimed_refunds
            .checked_sub(amount)
            .unwrap_or_else(|| env::panic_str("Invariant violation: unclaimed refund underflow"));

        Ok(amount)
    }
}

pub mod error {
    use thiserror::Error;

    use crate::loan::LoanId;

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    #[error("Loan does not exist: {loan_id}")]
    pub struct LoanNotFoundError {
        pub loan_id: LoanId,
    }

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum OfferGuaranteeError {
        #[error(transparent)]
        LoanNotFound(#[from] LoanNotFoundError),
        #[error("Loan already has an active guarantee: {loan_id}")]
        AlreadyGuaranteed { loan_id: LoanId },
        #[error("Guarantor interest must be greater than zero")]
        ZeroGuarantorInterest,
        #[error("Guarantor interest must be less than loan amount plus interest: {guarantor_interest} >= {total_obligation}")]
        GuarantorInterestTooHigh {
            guarantor_interest: u128,
            total_obligation: u128,
        },
        #[error("Incorrect guarantee amount: required {required}, attached {attached}")]
        IncorrectGuaranteeAmount { required: u128, attached: u128 },
        #[error("Loan obligation overflow")]
        ObligationOverflow,
        #[error("Escrow total overflow")]
        EscrowOverflow,
    }

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum DenyGuaranteeError {
        #[error(transparent)]
        LoanNotFound(#[from] LoanNotFoundError),
        #[error("Only the borrower may deny a guarantee: {loan_id}")]
        Unauthorized { loan_id: LoanId },
        #[error("Loan has no active guarantee: {loan_id}")]
        NoActiveGuarantee { loan_id: LoanId },
    }

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    #[error("No refund to claim")]
    pub struct ClaimRefundError;
}
