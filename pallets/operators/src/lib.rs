//! Operators pallet
//!
//! A holder lets an operator move their balance of one asset until a unix
//! timestamp. Grants are checked by value at the time of use: an operator is
//! active while `now < until`. There is no revoke call; a holder overwrites the
//! grant with a past timestamp instead.
#![cfg_attr(not(feature = "std"), no_std)]

use confidential_assets_primitives::OperatorRegistry;
use frame_support::{pallet_prelude::*, Blake2_128Concat};
use frame_system::pallet_prelude::*;

pub use pallet::*;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod tests;

/// Largest accepted expiry, in seconds (48-bit timestamps).
pub const MAX_EXPIRY: u64 = (1 << 48) - 1;

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// Asset identifier used by the consuming pallets.
        type AssetId: Parameter + Member + Copy + Ord + MaxEncodedLen;

        type WeightInfo: WeightData;
    }

    pub trait WeightData {
        fn set_operator() -> Weight;
    }
    impl WeightData for () {
        fn set_operator() -> Weight {
            Weight::from_parts(10_000, 0)
        }
    }

    /// (holder, asset, operator) -> until (unix seconds, exclusive)
    #[pallet::storage]
    pub type Grants<T: Config> = StorageNMap<
        _,
        (
            NMapKey<Blake2_128Concat, T::AccountId>,
            NMapKey<Blake2_128Concat, T::AssetId>,
            NMapKey<Blake2_128Concat, T::AccountId>,
        ),
        u64,
        OptionQuery,
    >;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        OperatorSet {
            asset: T::AssetId,
            holder: T::AccountId,
            operator: T::AccountId,
            until: u64,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// `until` does not fit in 48 bits.
        ExpiryOutOfRange,
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    impl<T: Config> Pallet<T> {
        /// Public helper for other pallets.
        pub fn is_operator(
            holder: &T::AccountId,
            asset: &T::AssetId,
            operator: &T::AccountId,
            now: u64,
        ) -> bool {
            match Grants::<T>::get((holder, asset, operator)) {
                Some(until) => now < until,
                None => false,
            }
        }
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Holder grants, extends or shortens an operator for `asset` until `until`.
        /// Replaces any earlier grant to the same operator.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::set_operator())]
        pub fn set_operator(
            origin: OriginFor<T>,
            asset: T::AssetId,
            operator: T::AccountId,
            until: u64,
        ) -> DispatchResult {
            let holder = ensure_signed(origin)?;
            ensure!(until <= MAX_EXPIRY, Error::<T>::ExpiryOutOfRange);
            Grants::<T>::insert((holder.clone(), asset, operator.clone()), until);
            Self::deposit_event(Event::OperatorSet {
                asset,
                holder,
                operator,
                until,
            });
            Ok(())
        }
    }
}

/// Implement the trait so other pallets can depend only on `OperatorRegistry`.
impl<T: pallet::Config> OperatorRegistry<T::AccountId, T::AssetId, u64> for pallet::Pallet<T> {
    fn is_operator(
        holder: &T::AccountId,
        asset: &T::AssetId,
        operator: &T::AccountId,
        now: u64,
    ) -> bool {
        <pallet::Pallet<T>>::is_operator(holder, asset, operator, now)
    }
}
