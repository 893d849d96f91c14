use near_sdk::{json_types::U64, near, AccountId};

/// Audit trail of the escrow, logged as NEP-297 `EVENT_JSON:` lines.
#[near(event_json(standard = "guarantee-escrow"))]
pub enum EscrowEvent {
    #[event_version("1.0.0")]
    LoanCreated { loan_id: U64 },
    #[event_version("1.0.0")]
    GuaranteeOffered { loan_id: U64, guarantor: AccountId },
    #[event_version("1.0.0")]
    GuaranteeDenied { loan_id: U64 },
}
