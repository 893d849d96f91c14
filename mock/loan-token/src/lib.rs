//! Fixed-supply fungible token used as the companion loan asset in tests.
//! The whole supply is minted to the owner in `new`, and the contract exposes
//! no mint method afterwards.

use near_sdk::{env, json_types::U128, near, AccountId, PanicOnDefault};
use near_sdk_contract_tools::ft::*;

pub const NAME: &str = "Loan Token";
pub const SYMBOL: &str = "LOAN";
pub const DECIMALS: u8 = 18;

#[derive(PanicOnDefault, FungibleToken)]
#[near(contract_state)]
pub struct Contract {}

#[near]
impl Contract {
    /// Attached deposit covers the owner's storage registration.
    #[payable]
    #[init]
    pub fn new(owner_id: AccountId, total_supply: U128) -> Self {
        let mut contract = Self {};

        Nep148Controller::set_metadata(
            &mut contract,
            &ContractMetadata::new(NAME.to_string(), SYMBOL.to_string(), DECIMALS),
        );
        Nep145Controller::deposit_to_storage_account(
            &mut contract,
            &owner_id,
            env::attached_deposit(),
        )
        .unwrap_or_else(|e| env::panic_str(&e.to_string()));
        Nep141Controller::mint(&mut contract, &Nep141Mint::new(total_supply.0, owner_id))
            .unwrap_or_else(|e| env::panic_str(&e.to_string()));

        contract
    }
}
