//! Prints init args for `new`. Set `GUARANTEE_ASSET_ACCOUNT_ID` to escrow a
//! NEP-141 token instead of native NEAR.

use near_sdk::{serde_json, AccountId};
use test_utils::escrow_configuration;

pub fn main() {
    let guarantee_asset_id = std::env::var("GUARANTEE_ASSET_ACCOUNT_ID")
        .ok()
        .map(|id| id.parse::<AccountId>().unwrap());

    println!(
        "{{\"configuration\":{}}}",
        serde_json::to_string(&escrow_configuration(guarantee_asset_id)).unwrap(),
    );
}
