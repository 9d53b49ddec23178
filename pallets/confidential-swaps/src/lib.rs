//! pallet-confidential-swaps — fixed-rate swap between two confidential assets.
//!
//! `swap_forward` takes asset A and pays `amount * RATE` of asset B;
//! `swap_reverse` takes asset B and pays `amount / RATE` of asset A. The
//! engine pulls the input with `confidential_transfer_from`, so the user must
//! first make the engine account an operator on the input asset.
//!
//! The output is computed from the *requested* input, not from the clamped
//! amount the ledger actually pulled. Both ledger transfers clamp on their
//! own, so a swap never fails for lack of funds; it fails only on missing
//! authorization or a bad input, and then leaves no state behind.

#![cfg_attr(not(feature = "std"), no_std)]

use confidential_assets_primitives::{
    ConfidentialLedger, ConfidentialSwap, EncryptedAmount, FheExecutor, InputProof, SwapDirection,
};
use frame_support::{pallet_prelude::*, transactional, PalletId};
use frame_system::pallet_prelude::*;
use sp_runtime::traits::AccountIdConversion;

pub use pallet::*;

#[cfg(test)]
mod mock;

const LOG_TARGET: &str = "runtime::confidential-swaps";

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// `Default` is the null asset.
        type AssetId: Parameter
            + Member
            + Copy
            + Ord
            + MaxEncodedLen
            + Default
            + MaybeSerializeDeserialize;

        type Ledger: ConfidentialLedger<Self::AccountId, Self::AssetId>;

        type Fhe: FheExecutor<Self::AccountId>;

        /// Derives the engine account that holds swap liquidity.
        #[pallet::constant]
        type PalletId: Get<PalletId>;

        type WeightInfo: WeightInfo;
    }

    pub trait WeightInfo {
        fn configure() -> Weight;
        fn swap_forward() -> Weight;
        fn swap_reverse() -> Weight;
    }

    impl WeightInfo for () {
        fn configure() -> Weight {
            Weight::from_parts(5_000, 0)
        }
        fn swap_forward() -> Weight {
            Weight::from_parts(120_000, 0)
        }
        fn swap_reverse() -> Weight {
            Weight::from_parts(120_000, 0)
        }
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    /// (asset A, asset B)
    #[pallet::storage]
    pub type AssetPair<T: Config> = StorageValue<_, (T::AssetId, T::AssetId), OptionQuery>;

    #[pallet::genesis_config]
    #[derive(frame_support::DefaultNoBound)]
    pub struct GenesisConfig<T: Config> {
        pub assets: Option<(T::AssetId, T::AssetId)>,
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            if let Some((asset_a, asset_b)) = self.assets {
                if let Err(e) = Pallet::<T>::check_pair(&asset_a, &asset_b) {
                    panic!("invalid swap asset pair in genesis: {e:?}");
                }
                AssetPair::<T>::put((asset_a, asset_b));
            }
        }
    }

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        Configured {
            asset_a: T::AssetId,
            asset_b: T::AssetId,
        },
        /// A in, B out. Handles of the amounts actually moved.
        SwapForward {
            user: T::AccountId,
            amount_in: EncryptedAmount,
            amount_out: EncryptedAmount,
        },
        /// B in, A out. Handles of the amounts actually moved.
        SwapReverse {
            user: T::AccountId,
            amount_in: EncryptedAmount,
            amount_out: EncryptedAmount,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// An asset of the pair is the null asset.
        NullAsset,
        IdenticalAssets,
        AlreadyConfigured,
        NotConfigured,
        /// The engine may not use the input handle.
        AmountNotAllowed,
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Set the asset pair once.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::configure())]
        pub fn configure(
            origin: OriginFor<T>,
            asset_a: T::AssetId,
            asset_b: T::AssetId,
        ) -> DispatchResult {
            ensure_root(origin)?;
            ensure!(!AssetPair::<T>::exists(), Error::<T>::AlreadyConfigured);
            Self::check_pair(&asset_a, &asset_b)?;
            AssetPair::<T>::put((asset_a, asset_b));
            Self::deposit_event(Event::Configured { asset_a, asset_b });
            Ok(())
        }

        /// Swap asset A for `amount_in * RATE` of asset B.
        ///
        /// `proof` must bind `amount_in` to the engine account and the signer.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::swap_forward())]
        pub fn swap_forward(
            origin: OriginFor<T>,
            amount_in: EncryptedAmount,
            proof: InputProof,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;
            let amount_in = T::Fhe::verify_input(&Self::engine_account(), &who, amount_in, &proof)?;
            Self::do_swap(&who, SwapDirection::Forward, amount_in)?;
            Ok(())
        }

        /// Swap asset B for `amount_in / RATE` of asset A.
        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::swap_reverse())]
        pub fn swap_reverse(
            origin: OriginFor<T>,
            amount_in: EncryptedAmount,
            proof: InputProof,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;
            let amount_in = T::Fhe::verify_input(&Self::engine_account(), &who, amount_in, &proof)?;
            Self::do_swap(&who, SwapDirection::Reverse, amount_in)?;
            Ok(())
        }
    }

    impl<T: Config> Pallet<T> {
        #[inline]
        pub fn engine_account() -> T::AccountId {
            T::PalletId::get().into_account_truncating()
        }

        /// Configured `(asset A, asset B)`.
        pub fn asset_addresses() -> Option<(T::AssetId, T::AssetId)> {
            AssetPair::<T>::get()
        }

        pub(crate) fn check_pair(asset_a: &T::AssetId, asset_b: &T::AssetId) -> DispatchResult {
            let null = T::AssetId::default();
            ensure!(*asset_a != null && *asset_b != null, Error::<T>::NullAsset);
            ensure!(asset_a != asset_b, Error::<T>::IdenticalAssets);
            Ok(())
        }

        /// Run one swap. The engine must already be allowed on `amount_in`.
        pub(crate) fn do_swap(
            who: &T::AccountId,
            direction: SwapDirection,
            amount_in: EncryptedAmount,
        ) -> Result<EncryptedAmount, DispatchError> {
            let (asset_a, asset_b) = AssetPair::<T>::get().ok_or(Error::<T>::NotConfigured)?;
            let (asset_in, asset_out) = match direction {
                SwapDirection::Forward => (asset_a, asset_b),
                SwapDirection::Reverse => (asset_b, asset_a),
            };
            let engine = Self::engine_account();

            let transferred_in =
                T::Ledger::confidential_transfer_from(&asset_in, &engine, who, &engine, amount_in)?;
            // Converted from the requested amount, even if `transferred_in` was clamped.
            let amount_out = direction.convert::<T::AccountId, T::Fhe>(&engine, amount_in)?;
            let transferred_out =
                T::Ledger::confidential_transfer(&asset_out, &engine, who, amount_out)?;

            log::debug!(target: LOG_TARGET, "{direction:?} swap for {who:?}");
            let (user, amount_in, amount_out) = (who.clone(), transferred_in, transferred_out);
            Self::deposit_event(match direction {
                SwapDirection::Forward => Event::SwapForward {
                    user,
                    amount_in,
                    amount_out,
                },
                SwapDirection::Reverse => Event::SwapReverse {
                    user,
                    amount_in,
                    amount_out,
                },
            });
            Ok(transferred_out)
        }
    }
}

impl<T: Config> ConfidentialSwap<T::AccountId> for Pallet<T> {
    #[transactional]
    fn swap(
        who: &T::AccountId,
        direction: SwapDirection,
        amount_in: EncryptedAmount,
    ) -> Result<EncryptedAmount, DispatchError> {
        ensure!(
            T::Fhe::is_allowed(&amount_in, &Self::engine_account()),
            Error::<T>::AmountNotAllowed
        );
        Self::do_swap(who, direction, amount_in)
    }
}
