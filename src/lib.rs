#![allow(clippy::needless_pass_by_value)]

use std::ops::{Deref, DerefMut};

use guarantee_escrow_common::escrow::{EscrowConfiguration, GuaranteeEscrow};
use near_sdk::{near, BorshStorageKey, PanicOnDefault};

#[derive(BorshStorageKey)]
#[near(serializers = [borsh])]
enum StorageKey {
    Escrow,
}

#[derive(PanicOnDefault)]
#[near(contract_state)]
pub struct Contract {
    pub escrow: GuaranteeEscrow,
}

#[near]
impl Contract {
    #[init]
    pub fn new(configuration: EscrowConfiguration) -> Self {
        Self {
            escrow: GuaranteeEscrow::new(StorageKey::Escrow, configuration),
        }
    }
}

impl Deref for Contract {
    type Target = GuaranteeEscrow;

    fn deref(&self) -> &Self::Target {
        &self.escrow
    }
}

impl DerefMut for Contract {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.escrow
    }
}

mod impl_escrow_external;
mod impl_ft_receiver;
mod impl_helper;

#[cfg(target_arch = "wasm32")]
mod custom_getrandom {
    #![allow(clippy::no_mangle_with_rust_abi)]

    use getrandom::{register_custom_getrandom, Error};
    use near_sdk::env;

    register_custom_getrandom!(custom_getrandom);

    #[allow(clippy::unnecessary_wraps)]
    pub fn custom_getrandom(buf: &mut [u8]) -> Result<(), Error> {
        buf.copy_from_slice(&env::random_seed_array());
        Ok(())
    }
}
