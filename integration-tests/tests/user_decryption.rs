//! Access control of the decryption service against real ledger state.

use std::sync::Arc;

use anyhow::Result;
use fhe_gateway::{clock::ManualClock, eval::EvalError, service::ServiceError, GatewayError};
use integration_tests::{
    helpers::{gateway, sync, Chain},
    runtime::{ASSET_A, GENESIS_SECS},
    test_accounts,
};
use parity_scale_codec::Encode;

#[tokio::test]
async fn only_the_holder_can_read_a_balance() -> Result<()> {
    let chain = Chain::new()?;
    let alice = test_accounts::alice();
    let bob = test_accounts::bob();
    chain.mint(ASSET_A, &alice.account, 42)?;

    let gw = gateway(&chain, Arc::new(ManualClock::new(GENESIS_SECS)))?;
    let handle = chain.balance_handle(ASSET_A, &alice.account);
    let ledger = Chain::ledger(ASSET_A).encode();

    let own = gw.user_decrypt(&alice.signer, &ledger, handle).await?;
    assert_eq!(own.value(), Some(42));

    let err = gw.user_decrypt(&bob.signer, &ledger, handle).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::ServiceRejected(ServiceError::NotAllowed("user"))
    ));
    assert!(!err.is_on_chain());
    Ok(())
}

#[tokio::test]
async fn contract_must_be_on_the_access_list() -> Result<()> {
    let chain = Chain::new()?;
    let alice = test_accounts::alice();
    chain.mint(ASSET_A, &alice.account, 42)?;

    let gw = gateway(&chain, Arc::new(ManualClock::new(GENESIS_SECS)))?;
    let handle = chain.balance_handle(ASSET_A, &alice.account);

    // the engine never computed or received this balance
    let err = gw
        .user_decrypt(&alice.signer, &Chain::engine().encode(), handle)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::ServiceRejected(ServiceError::NotAllowed("contract"))
    ));
    Ok(())
}

#[tokio::test]
async fn stale_snapshot_does_not_know_new_handles() -> Result<()> {
    let chain = Chain::new()?;
    let alice = test_accounts::alice();
    let gw = gateway(&chain, Arc::new(ManualClock::new(GENESIS_SECS)))?;

    chain.mint(ASSET_A, &alice.account, 5)?;
    let handle = chain.balance_handle(ASSET_A, &alice.account);
    let ledger = Chain::ledger(ASSET_A).encode();

    // the service was built before the mint
    let err = gw.user_decrypt(&alice.signer, &ledger, handle).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::ServiceRejected(ServiceError::NotAllowed("user"))
            | GatewayError::ServiceRejected(ServiceError::Eval(EvalError::UnknownHandle(_)))
    ));

    sync(&gw, &chain);
    let outcome = gw.user_decrypt(&alice.signer, &ledger, handle).await?;
    assert_eq!(outcome.value(), Some(5));
    Ok(())
}

#[tokio::test]
async fn repeated_mints_accumulate() -> Result<()> {
    let chain = Chain::new()?;
    let alice = test_accounts::alice();
    for amount in [1, 2, 3, 4] {
        chain.mint(ASSET_A, &alice.account, amount)?;
    }
    let gw = gateway(&chain, Arc::new(ManualClock::new(GENESIS_SECS)))?;
    let handle = chain.balance_handle(ASSET_A, &alice.account);
    let outcome = gw
        .user_decrypt(&alice.signer, &Chain::ledger(ASSET_A).encode(), handle)
        .await?;
    assert_eq!(outcome.value(), Some(10));
    Ok(())
}
