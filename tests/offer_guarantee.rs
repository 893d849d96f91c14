use guarantee_escrow_common::{asset::FungibleAsset, loan::LoanStatus};
use rstest::rstest;
use test_utils::*;

#[rstest]
#[case(false)]
#[case(true)]
#[tokio::test]
async fn offer_guarantee(#[case] nep141: bool) {
    let SetupEverything {
        c,
        borrower_user,
        guarantor_user,
        ..
    } = setup_everything(nep141).await;

    let configuration = c.get_configuration().await;
    assert_eq!(
        configuration.guarantee_asset,
        c.guarantee_asset
            .nep141_id()
            .map_or(FungibleAsset::Native, |id| FungibleAsset::nep141(id.clone())),
    );

    let (loan_id, _) = c.create_new_loan(&borrower_user, DUE_DATE, 1000, 5).await;

    let escrow_balance_before = c.guarantee_asset_balance_of(c.contract.id()).await;

    let result = c.offer_guarantee(&guarantor_user, loan_id, 3, 1002).await;

    let events = escrow_events(&result);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "guarantee_offered");
    assert_eq!(events[0]["data"]["loan_id"], "0");
    assert_eq!(events[0]["data"]["guarantor"], guarantor_user.id().as_str());

    let loan = c.get_loan(loan_id).await.unwrap();
    assert_eq!(loan.guarantor.as_ref(), Some(guarantor_user.id()));
    assert_eq!(loan.guarantor_interest.0, 3);
    assert_eq!(loan.escrowed_collateral.0, 1002);
    assert_eq!(loan.status, LoanStatus::Guaranteed);

    assert_eq!(c.get_escrow_metrics().await.total_escrowed.0, 1002);

    if nep141 {
        let escrow_balance_after = c.guarantee_asset_balance_of(c.contract.id()).await;
        assert_eq!(
            escrow_balance_after - escrow_balance_before,
            1002,
            "Escrow should hold exactly the guarantee amount",
        );
    }
}

#[tokio::test]
#[should_panic = "Smart contract panicked: Incorrect guarantee amount"]
async fn offer_guarantee_zero_value() {
    let SetupEverything {
        c,
        borrower_user,
        guarantor_user,
        ..
    } = setup_everything(false).await;

    let (loan_id, _) = c.create_new_loan(&borrower_user, DUE_DATE, 1000, 5).await;

    c.offer_guarantee(&guarantor_user, loan_id, 3, 0).await;
}

#[rstest]
#[case(0)]
#[case(1001)]
#[case(1003)]
#[tokio::test]
async fn offer_guarantee_incorrect_amount_native(#[case] attached: u128) {
    let SetupEverything {
        c,
        borrower_user,
        guarantor_user,
        ..
    } = setup_everything(false).await;

    let (loan_id, _) = c.create_new_loan(&borrower_user, DUE_DATE, 1000, 5).await;

    let result = c
        .try_offer_guarantee_native(&guarantor_user, loan_id, 3, attached)
        .await;

    assert!(result.is_failure());
    assert!(
        format!("{:?}", result.into_result().unwrap_err()).contains("Incorrect guarantee amount"),
    );

    let loan = c.get_loan(loan_id).await.unwrap();
    assert_eq!(loan.guarantor, None);
    assert_eq!(loan.guarantor_interest.0, 0);
    assert_eq!(c.get_escrow_metrics().await.total_escrowed.0, 0);
}

#[tokio::test]
async fn offer_guarantee_incorrect_amount_nep141() {
    let SetupEverything {
        c,
        borrower_user,
        guarantor_user,
        ..
    } = setup_everything(true).await;

    let (loan_id, _) = c.create_new_loan(&borrower_user, DUE_DATE, 1000, 5).await;

    let guarantor_balance_before = c.guarantee_asset_balance_of(guarantor_user.id()).await;
    let escrow_balance_before = c.guarantee_asset_balance_of(c.contract.id()).await;

    let result = c.offer_guarantee(&guarantor_user, loan_id, 3, 1000).await;
    assert!(escrow_events(&result).is_empty());

    assert_eq!(
        c.guarantee_asset_balance_of(guarantor_user.id()).await,
        guarantor_balance_before,
        "Rejected offer should be returned in full",
    );
    assert_eq!(
        c.guarantee_asset_balance_of(c.contract.id()).await,
        escrow_balance_before,
        "Escrow must not retain value from a rejected offer",
    );

    let loan = c.get_loan(loan_id).await.unwrap();
    assert_eq!(loan.guarantor, None);
    assert_eq!(loan.guarantor_interest.0, 0);
}

#[tokio::test]
#[should_panic = "Smart contract panicked: Unsupported guarantee asset"]
async fn native_offer_rejected_for_nep141_escrow() {
    let SetupEverything {
        c,
        borrower_user,
        guarantor_user,
        ..
    } = setup_everything(true).await;

    let (loan_id, _) = c.create_new_loan(&borrower_user, DUE_DATE, 10, 5).await;

    c.offer_guarantee_native(&guarantor_user, loan_id, 3, 12).await;
}

#[tokio::test]
#[should_panic = "Smart contract panicked: Loan already has an active guarantee"]
async fn second_offer_rejected() {
    let SetupEverything {
        c,
        borrower_user,
        guarantor_user,
        other_user,
    } = setup_everything(false).await;

    let (loan_id, _) = c.create_new_loan(&borrower_user, DUE_DATE, 10, 5).await;

    c.offer_guarantee(&guarantor_user, loan_id, 3, 12).await;
    c.offer_guarantee(&other_user, loan_id, 4, 11).await;
}

#[tokio::test]
async fn borrower_guarantees_own_loan() {
    let SetupEverything {
        c, borrower_user, ..
    } = setup_everything(false).await;

    let (loan_id, _) = c.create_new_loan(&borrower_user, DUE_DATE, 10, 5).await;

    let result = c.offer_guarantee(&borrower_user, loan_id, 3, 12).await;

    let events = escrow_events(&result);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "guarantee_offered");
    assert_eq!(events[0]["data"]["guarantor"], borrower_user.id().as_str());

    let loan = c.get_loan(loan_id).await.unwrap();
    assert_eq!(loan.guarantor.as_ref(), Some(borrower_user.id()));
    assert_eq!(loan.escrowed_collateral.0, 12);
    assert_eq!(c.get_escrow_metrics().await.total_escrowed.0, 12);

    c.deny_guarantee(&borrower_user, loan_id).await;

    let loan = c.get_loan(loan_id).await.unwrap();
    assert_eq!(loan.guarantor, None);
    assert_eq!(loan.status, LoanStatus::Open);
    assert_eq!(c.get_escrow_metrics().await.total_escrowed.0, 0);
    assert_eq!(c.get_unclaimed_refund(borrower_user.id()).await, 0);
}

#[tokio::test]
#[should_panic = "Smart contract panicked: Loan does not exist"]
async fn offer_guarantee_unknown_loan() {
    let SetupEverything {
        c, guarantor_user, ..
    } = setup_everything(false).await;

    c.offer_guarantee(&guarantor_user, 0, 3, 12).await;
}

#[rstest]
#[case(0, "Guarantor interest must be greater than zero")]
#[case(15, "Guarantor interest must be less than loan amount plus interest")]
#[tokio::test]
async fn offer_guarantee_invalid_interest(#[case] guarantor_interest: u128, #[case] message: &str) {
    let SetupEverything {
        c,
        borrower_user,
        guarantor_user,
        ..
    } = setup_everything(false).await;

    let (loan_id, _) = c.create_new_loan(&borrower_user, DUE_DATE, 10, 5).await;

    let result = c
        .try_offer_guarantee_native(&guarantor_user, loan_id, guarantor_interest, 1)
        .await;

    assert!(format!("{:?}", result.into_result().unwrap_err()).contains(message));
    assert_eq!(c.get_loan_status(loan_id).await, Some(LoanStatus::Open));
}
