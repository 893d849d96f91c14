use guarantee_escrow_common::{
    asset::FungibleAsset,
    escrow::{EscrowConfiguration, EscrowMetrics, Nep141EscrowDepositMessage, OfferGuaranteeMsg},
    loan::{LoanRecord, LoanStatus},
};
use near_sdk::{
    json_types::{U128, U64},
    serde_json::{self, json},
    AccountId, AccountIdRef, NearToken,
};
use near_workspaces::{
    network::Sandbox,
    prelude::*,
    result::{ExecutionFinalResult, ExecutionSuccess},
    Account, Contract, DevNetwork, Worker,
};
use tokio::sync::OnceCell;

pub const DUE_DATE: u64 = 1_659_322_222;

pub enum TestAsset {
    Native,
    Nep141(Contract),
}

impl TestAsset {
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    pub fn nep141_id(&self) -> Option<&AccountId> {
        if let Self::Nep141(ref contract) = self {
            Some(contract.id())
        } else {
            None
        }
    }
}

pub struct TestController {
    pub worker: Worker<Sandbox>,
    pub contract: Contract,
    pub guarantee_asset: TestAsset,
}

impl TestController {
    pub async fn storage_deposits(&self, account: &Account) {
        if let TestAsset::Nep141(ref guarantee_asset) = self.guarantee_asset {
            println!("Performing storage deposit for {}...", account.id());
            account
                .call(guarantee_asset.id(), "storage_deposit")
                .args_json(json!({}))
                .deposit(NearToken::from_near(1))
                .transact()
                .await
                .unwrap()
                .unwrap();
        }
    }

    /// Force-unregisters `account` from the NEP-141 guarantee asset. Any
    /// remaining token balance is burned.
    pub async fn storage_unregister(&self, account: &Account) {
        let TestAsset::Nep141(ref guarantee_asset) = self.guarantee_asset else {
            panic!("Cannot unregister from a native asset");
        };
        println!("Unregistering {} from {}...", account.id(), guarantee_asset.id());
        let unregistered = account
            .call(guarantee_asset.id(), "storage_unregister")
            .args_json(json!({
                "force": true,
            }))
            .deposit(NearToken::from_yoctonear(1))
            .transact()
            .await
            .unwrap()
            .json::<bool>()
            .unwrap();
        assert!(unregistered, "{} was not registered", account.id());
    }

    pub async fn get_configuration(&self) -> EscrowConfiguration {
        self.contract
            .view("get_configuration")
            .args_json(json!({}))
            .await
            .unwrap()
            .json::<EscrowConfiguration>()
            .unwrap()
    }

    pub async fn get_escrow_metrics(&self) -> EscrowMetrics {
        self.contract
            .view("get_escrow_metrics")
            .args_json(json!({}))
            .await
            .unwrap()
            .json::<EscrowMetrics>()
            .unwrap()
    }

    pub async fn create_new_loan(
        &self,
        borrower: &Account,
        due_date: u64,
        amount: u128,
        interest: u128,
    ) -> (u64, ExecutionSuccess) {
        println!(
            "{} creating loan of {amount} with interest {interest} due {due_date}...",
            borrower.id(),
        );
        let result = borrower
            .call(self.contract.id(), "create_new_loan")
            .args_json(json!({
                "due_date": U64(due_date),
                "amount": U128(amount),
                "interest": U128(interest),
            }))
            .transact()
            .await
            .unwrap()
            .unwrap();
        let U64(loan_id) = result.json::<U64>().unwrap();
        (loan_id, result)
    }

    pub async fn get_loan(&self, loan_id: u64) -> Option<LoanRecord> {
        self.contract
            .view("get_loan")
            .args_json(json!({
                "loan_id": U64(loan_id),
            }))
            .await
            .unwrap()
            .json::<Option<LoanRecord>>()
            .unwrap()
    }

    pub async fn get_loan_status(&self, loan_id: u64) -> Option<LoanStatus> {
        self.contract
            .view("get_loan_status")
            .args_json(json!({
                "loan_id": U64(loan_id),
            }))
            .await
            .unwrap()
            .json::<Option<LoanStatus>>()
            .unwrap()
    }

    pub async fn list_loans(&self, offset: Option<u32>, count: Option<u32>) -> Vec<LoanRecord> {
        self.contract
            .view("list_loans")
            .args_json(json!({
                "offset": offset,
                "count": count,
            }))
            .await
            .unwrap()
            .json::<Vec<LoanRecord>>()
            .unwrap()
    }

    /// Does not unwrap the outcome, so failed offers can be inspected.
    pub async fn try_offer_guarantee_native(
        &self,
        guarantor: &Account,
        loan_id: u64,
        guarantor_interest: u128,
        attached: u128,
    ) -> ExecutionFinalResult {
        guarantor
            .call(self.contract.id(), "offer_guarantee")
            .args_json(json!({
                "loan_id": U64(loan_id),
                "guarantor_interest": U128(guarantor_interest),
            }))
            .deposit(NearToken::from_yoctonear(attached))
            .transact()
            .await
            .unwrap()
    }

    pub async fn offer_guarantee_native(
        &self,
        guarantor: &Account,
        loan_id: u64,
        guarantor_interest: u128,
        attached: u128,
    ) -> ExecutionSuccess {
        self.try_offer_guarantee_native(guarantor, loan_id, guarantor_interest, attached)
            .await
            .unwrap()
    }

    pub async fn offer_guarantee(
        &self,
        guarantor: &Account,
        loan_id: u64,
        guarantor_interest: u128,
        attached: u128,
    ) -> ExecutionSuccess {
        println!(
            "{} offering guarantee on loan {loan_id} at interest {guarantor_interest} with {attached} attached...",
            guarantor.id(),
        );
        match self.guarantee_asset {
            TestAsset::Native => {
                self.offer_guarantee_native(guarantor, loan_id, guarantor_interest, attached)
                    .await
            }
            TestAsset::Nep141(_) => {
                self.guarantee_asset_transfer_call(
                    guarantor,
                    self.contract.id(),
                    attached,
                    &serde_json::to_string(&Nep141EscrowDepositMessage::OfferGuarantee(
                        OfferGuaranteeMsg {
                            loan_id: loan_id.into(),
                            guarantor_interest: guarantor_interest.into(),
                        },
                    ))
                    .unwrap(),
                )
                .await
            }
        }
    }

    pub async fn deny_guarantee(&self, borrower: &Account, loan_id: u64) -> ExecutionSuccess {
        println!("{} denying guarantee on loan {loan_id}...", borrower.id());
        borrower
            .call(self.contract.id(), "deny_guarantee")
            .args_json(json!({
                "loan_id": U64(loan_id),
            }))
            .max_gas()
            .transact()
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn get_unclaimed_refund(&self, account_id: &AccountId) -> u128 {
        self.contract
            .view("get_unclaimed_refund")
            .args_json(json!({
                "account_id": account_id,
            }))
            .await
            .unwrap()
            .json::<U128>()
            .unwrap()
            .0
    }

    pub async fn claim_refund(&self, account: &Account) -> ExecutionSuccess {
        println!("{} claiming refund...", account.id());
        account
            .call(self.contract.id(), "claim_refund")
            .args_json(json!({}))
            .max_gas()
            .transact()
            .await
            .unwrap()
            .unwrap()
    }

    /// Spendable balance of `account_id` in the guarantee asset.
    pub async fn guarantee_asset_balance_of(&self, account_id: &AccountId) -> u128 {
        match self.guarantee_asset {
            TestAsset::Native => self
                .worker
                .view_account(account_id)
                .await
                .map(|v| v.balance.as_yoctonear() - v.locked.as_yoctonear())
                .unwrap(),
            TestAsset::Nep141(ref guarantee_asset) => {
                guarantee_asset
                    .view("ft_balance_of")
                    .args_json(json!({
                        "account_id": account_id,
                    }))
                    .await
                    .unwrap()
                    .json::<U128>()
                    .unwrap()
                    .0
            }
        }
    }

    pub async fn guarantee_asset_total_supply(&self) -> u128 {
        let TestAsset::Nep141(ref guarantee_asset) = self.guarantee_asset else {
            panic!("Native NEAR has no token supply");
        };
        guarantee_asset
            .view("ft_total_supply")
            .args_json(json!({}))
            .await
            .unwrap()
            .json::<U128>()
            .unwrap()
            .0
    }

    pub async fn guarantee_asset_transfer(
        &self,
        sender: &Account,
        receiver_id: &AccountId,
        amount: u128,
    ) {
        println!(
            "{} sending {amount} guarantee asset to {receiver_id}...",
            sender.id(),
        );
        match self.guarantee_asset {
            TestAsset::Native => {
                sender
                    .transfer_near(receiver_id, NearToken::from_yoctonear(amount))
                    .await
                    .unwrap()
                    .unwrap();
            }
            TestAsset::Nep141(ref contract) => {
                sender
                    .call(contract.id(), "ft_transfer")
                    .args_json(json!({
                        "receiver_id": receiver_id,
                        "amount": U128(amount),
                    }))
                    .deposit(NearToken::from_yoctonear(1))
                    .transact()
                    .await
                    .unwrap()
                    .unwrap();
            }
        }
    }

    pub async fn guarantee_asset_transfer_call(
        &self,
        sender: &Account,
        receiver_id: &AccountId,
        amount: u128,
        msg: &str,
    ) -> ExecutionSuccess {
        let TestAsset::Nep141(ref guarantee_asset) = self.guarantee_asset else {
            panic!("Cannot perform an ft_transfer_call with a native asset");
        };
        println!(
            "{} sending {amount} tokens of {} to {receiver_id} with msg {msg}...",
            sender.id(),
            guarantee_asset.id(),
        );
        sender
            .call(guarantee_asset.id(), "ft_transfer_call")
            .args_json(json!({
                "receiver_id": receiver_id,
                "amount": U128(amount),
                "msg": msg,
            }))
            .deposit(NearToken::from_yoctonear(1))
            .max_gas()
            .transact()
            .await
            .unwrap()
            .unwrap()
    }
}

/// NEP-297 events logged by the escrow during `result`.
pub fn escrow_events(result: &ExecutionSuccess) -> Vec<serde_json::Value> {
    result
        .logs()
        .iter()
        .filter_map(|log| log.strip_prefix("EVENT_JSON:"))
        .map(|json| serde_json::from_str::<serde_json::Value>(json).unwrap())
        .filter(|event| event["standard"] == "guarantee-escrow")
        .collect()
}

pub async fn create_prefixed_account<T: DevNetwork + TopLevelAccountCreator + 'static>(
    prefix: &str,
    worker: &near_workspaces::Worker<T>,
) -> Account {
    let (genid, sk) = worker.dev_generate().await;
    let new_id: AccountId = format!("{prefix}{}", &genid.as_str()[prefix.len()..])
        .parse()
        .unwrap();
    worker.create_tla(new_id, sk).await.unwrap().unwrap()
}

macro_rules! accounts {
    ($w: ident, $($n:ident),*) => {
        let ($($n,)*) = tokio::join!( $(create_prefixed_account(stringify!($n), &$w)),* );
    };
}

pub fn escrow_configuration(guarantee_asset_id: Option<AccountId>) -> EscrowConfiguration {
    EscrowConfiguration {
        guarantee_asset: guarantee_asset_id.map_or(FungibleAsset::Native, FungibleAsset::nep141),
    }
}

pub static WASM_ESCROW: OnceCell<Vec<u8>> = OnceCell::const_new();
pub static WASM_MOCK_LOAN_TOKEN: OnceCell<Vec<u8>> = OnceCell::const_new();

pub async fn setup_escrow(
    worker: &Worker<Sandbox>,
    configuration: &EscrowConfiguration,
) -> Contract {
    let wasm = WASM_ESCROW
        .get_or_init(|| async { near_workspaces::compile_project("./").await.unwrap() })
        .await;

    let contract = worker.dev_deploy(wasm).await.unwrap();
    contract
        .call("new")
        .args_json(json!({
            "configuration": configuration,
        }))
        .transact()
        .await
        .unwrap()
        .unwrap();

    contract
}

pub async fn deploy_loan_token(
    account: Account,
    owner_id: &AccountIdRef,
    supply: u128,
) -> Contract {
    let wasm = WASM_MOCK_LOAN_TOKEN
        .get_or_init(|| async {
            near_workspaces::compile_project("./mock/loan-token/")
                .await
                .unwrap()
        })
        .await;

    let contract = account.deploy(wasm).await.unwrap().unwrap();
    contract
        .call("new")
        .args_json(json!({
            "owner_id": owner_id,
            "total_supply": U128(supply),
        }))
        .deposit(NearToken::from_near(1))
        .transact()
        .await
        .unwrap()
        .unwrap();

    contract
}

pub struct SetupEverything {
    pub c: TestController,
    pub borrower_user: Account,
    pub guarantor_user: Account,
    pub other_user: Account,
}

/// Deploys the escrow. With `nep141 == true` a fixed-supply loan token is
/// deployed as the guarantee asset, its supply is split between the
/// guarantor and other user, and everyone is registered with it.
pub async fn setup_everything(nep141: bool) -> SetupEverything {
    let worker = near_workspaces::sandbox().await.unwrap();
    accounts!(worker, borrower_user, guarantor_user, other_user, loan_token);

    let config = escrow_configuration(nep141.then(|| loan_token.id().clone()));

    let (contract, guarantee_asset) = if nep141 {
        let (contract, loan_token) = tokio::join!(
            setup_escrow(&worker, &config),
            deploy_loan_token(loan_token, guarantor_user.id(), 1_000_000),
        );
        (contract, TestAsset::Nep141(loan_token))
    } else {
        (setup_escrow(&worker, &config).await, TestAsset::Native)
    };

    let c = TestController {
        worker,
        contract,
        guarantee_asset,
    };

    // Asset opt-ins.
    tokio::join!(
        c.storage_deposits(c.contract.as_account()),
        c.storage_deposits(&borrower_user),
        c.storage_deposits(&other_user),
    );

    if !c.guarantee_asset.is_native() {
        c.guarantee_asset_transfer(&guarantor_user, other_user.id(), 500_000)
            .await;
    }

    SetupEverything {
        c,
        borrower_user,
        guarantor_user,
        other_user,
    }
}
