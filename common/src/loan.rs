use near_sdk::{
    json_types::{U128, U64},
    near, AccountId,
};

pub type LoanId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[near(serializers = [borsh, json])]
pub enum LoanStatus {
    /// No guarantee is attached; the loan accepts offers.
    Open,
    Guaranteed,
}

/// An accepted guarantee offer and the collateral escrowed for it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[near(serializers = [borsh, json])]
pub struct Guarantee {
    pub guarantor: AccountId,
    pub guarantor_interest: U128,
    pub collateral: U128,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[near(serializers = [borsh, json])]
pub struct Loan {
    pub due_date: U64,
    pub amount: U128,
    pub interest: U128,
    pub borrower: AccountId,
    guarantee: Option<Guarantee>,
}

impl Loan {
    pub fn new(borrower: AccountId, due_date: u64, amount: u128, interest: u128) -> Self {
        Self {
            due_date: due_date.into(),
            amount: amount.into(),
            interest: interest.into(),
            borrower,
            guarantee: None,
        }
    }

    pub fn guarantee(&self) -> Option<&Guarantee> {
        self.guarantee.as_ref()
    }

    pub fn guarantor(&self) -> Option<&AccountId> {
        self.guarantee.as_ref().map(|g| &g.guarantor)
    }

    /// Zero when no guarantee is active.
    pub fn guarantor_interest(&self) -> u128 {
        self.guarantee.as_ref().map_or(0, |g| g.guarantor_interest.0)
    }

    pub fn escrowed_collateral(&self) -> u128 {
        self.guarantee.as_ref().map_or(0, |g| g.collateral.0)
    }

    pub fn status(&self) -> LoanStatus {
        if self.guarantee.is_some() {
            LoanStatus::Guaranteed
        } else {
            LoanStatus::Open
        }
    }

    /// `amount + interest`, or `None` on overflow.
    pub fn total_obligation(&self) -> Option<u128> {
        self.amount.0.checked_add(self.interest.0)
    }

    /// Collateral a guarantor must escrow when offering `guarantor_interest`:
    /// `amount + interest - guarantor_interest`. `None` on overflow or when
    /// the guarantor interest is not below the total obligation.
    pub fn required_collateral(&self, guarantor_interest: u128) -> Option<u128> {
        self.total_obligation()?
            .checked_sub(guarantor_interest)
            .filter(|collateral| *collateral > 0)
    }

    /// MUST only be called after the offer has been validated.
    pub(crate) fn set_guarantee(&mut self, guarantee: Guarantee) {
        debug_assert!(self.guarantee.is_none());
        self.guarantee = Some(guarantee);
    }

    pub(crate) fn take_guarantee(&mut self) -> Option<Guarantee> {
        self.guarantee.take()
    }

    pub fn to_record(&self, id: LoanId) -> LoanRecord {
        LoanRecord {
            id: id.into(),
            due_date: self.due_date,
            amount: self.amount,
            interest: self.interest,
            borrower: self.borrower.clone(),
            guarantor: self.guarantor().cloned(),
            guarantor_interest: self.guarantor_interest().into(),
            escrowed_collateral: self.escrowed_collateral().into(),
            status: self.status(),
        }
    }
}

/// Flat view of a loan, as returned by the contract's view methods.
#[derive(Clone, Debug, PartialEq, Eq)]
#[near(serializers = [json])]
pub struct LoanRecord {
    pub id: U64,
    pub due_date: U64,
    pub amount: U128,
    pub interest: U128,
    pub borrower: AccountId,
    pub guarantor: Option<AccountId>,
    pub guarantor_interest: U128,
    pub escrowed_collateral: U128,
    pub status: LoanStatus,
}
