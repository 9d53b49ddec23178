use super::*;
use crate::mock::*;
use frame_support::{assert_noop, assert_ok};
use proptest::prelude::*;
use sp_runtime::traits::BadOrigin;

fn last_event() -> RuntimeEvent {
    frame_system::Pallet::<Runtime>::events()
        .pop()
        .expect("event")
        .event
}

#[test]
fn set_operator_stores_grant_and_emits() {
    new_test_ext().execute_with(|| {
        assert_ok!(Operators::set_operator(
            RuntimeOrigin::signed(ALICE),
            ASSET,
            ENGINE,
            1_000
        ));
        assert_eq!(
            pallet::Grants::<Runtime>::get((ALICE, ASSET, ENGINE)),
            Some(1_000)
        );
        match last_event() {
            RuntimeEvent::Operators(pallet::Event::OperatorSet {
                asset,
                holder,
                operator,
                until,
            }) => {
                assert_eq!(asset, ASSET);
                assert_eq!(holder, ALICE);
                assert_eq!(operator, ENGINE);
                assert_eq!(until, 1_000);
            }
            e => panic!("unexpected event: {e:?}"),
        }
    });
}

#[test]
fn expiry_is_exclusive() {
    new_test_ext().execute_with(|| {
        assert_ok!(Operators::set_operator(
            RuntimeOrigin::signed(ALICE),
            ASSET,
            ENGINE,
            1_000
        ));
        assert!(Operators::is_operator(&ALICE, &ASSET, &ENGINE, 999));
        assert!(!Operators::is_operator(&ALICE, &ASSET, &ENGINE, 1_000));
        assert!(!Operators::is_operator(&ALICE, &ASSET, &ENGINE, 1_001));
    });
}

#[test]
fn later_grant_overwrites_earlier() {
    new_test_ext().execute_with(|| {
        assert_ok!(Operators::set_operator(
            RuntimeOrigin::signed(ALICE),
            ASSET,
            ENGINE,
            5_000
        ));
        // shortening to the past acts as a revoke
        assert_ok!(Operators::set_operator(
            RuntimeOrigin::signed(ALICE),
            ASSET,
            ENGINE,
            10
        ));
        assert!(!Operators::is_operator(&ALICE, &ASSET, &ENGINE, 100));
    });
}

#[test]
fn grants_are_scoped_to_holder_asset_and_operator() {
    new_test_ext().execute_with(|| {
        assert_ok!(Operators::set_operator(
            RuntimeOrigin::signed(ALICE),
            ASSET,
            ENGINE,
            1_000
        ));
        assert!(!Operators::is_operator(&BOB, &ASSET, &ENGINE, 0));
        assert!(!Operators::is_operator(&ALICE, &(ASSET + 1), &ENGINE, 0));
        assert!(!Operators::is_operator(&ALICE, &ASSET, &BOB, 0));
    });
}

#[test]
fn expiry_must_fit_48_bits() {
    new_test_ext().execute_with(|| {
        assert_ok!(Operators::set_operator(
            RuntimeOrigin::signed(ALICE),
            ASSET,
            ENGINE,
            MAX_EXPIRY
        ));
        assert_noop!(
            Operators::set_operator(RuntimeOrigin::signed(ALICE), ASSET, ENGINE, MAX_EXPIRY + 1),
            Error::<Runtime>::ExpiryOutOfRange
        );
    });
}

#[test]
fn only_signed_holders_set_grants() {
    new_test_ext().execute_with(|| {
        assert_noop!(
            Operators::set_operator(RuntimeOrigin::root(), ASSET, ENGINE, 1_000),
            BadOrigin
        );
    });
}

#[test]
fn unit_registry_denies_everything() {
    assert!(!<() as OperatorRegistry<AccountId, AssetId, u64>>::is_operator(
        &ALICE, &ASSET, &ENGINE, 0
    ));
}

proptest! {
    #[test]
    fn prop_active_iff_now_before_until(until in 0u64..=MAX_EXPIRY, now in any::<u64>()) {
        new_test_ext().execute_with(|| {
            assert_ok!(Operators::set_operator(
                RuntimeOrigin::signed(ALICE),
                ASSET,
                ENGINE,
                until
            ));
            prop_assert_eq!(
                <Operators as OperatorRegistry<_, _, _>>::is_operator(&ALICE, &ASSET, &ENGINE, now),
                now < until
            );
            Ok(())
        })?;
    }
}
