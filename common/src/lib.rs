pub mod asset;
pub mod escrow;
pub mod event;
pub mod loan;
