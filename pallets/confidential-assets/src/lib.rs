//! pallet-confidential-assets — encrypted balances per (asset, account).
//!
//! Balances are handles into the executor (`T::Fhe`). A transfer never fails
//! for lack of funds: the moved amount is `select(amount <= balance, amount, 0)`,
//! so observers cannot tell whether the balance covered it. Callers read the
//! returned handle to learn (by decryption) what actually moved.
//!
//! Moving funds on behalf of another account requires a live grant in
//! `T::Operators`, checked against `T::Time` at the moment of the call.

#![cfg_attr(not(feature = "std"), no_std)]

use confidential_assets_primitives::{
    ConfidentialLedger, EncryptedAmount, FheExecutor, InputProof, OperatorRegistry, ZERO_HANDLE,
};
use frame_support::{pallet_prelude::*, traits::UnixTime, PalletId};
use frame_system::pallet_prelude::*;
use sp_runtime::traits::AccountIdConversion;

pub use pallet::*;

#[cfg(test)]
mod mock;

const LOG_TARGET: &str = "runtime::confidential-assets";

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// `Default` is the null asset.
        type AssetId: Parameter + Member + Copy + Ord + MaxEncodedLen + Default;

        /// Executor holding the encrypted values behind balance handles.
        type Fhe: FheExecutor<Self::AccountId>;

        type Operators: OperatorRegistry<Self::AccountId, Self::AssetId, u64>;

        /// Clock used to check operator expiry.
        type Time: UnixTime;

        /// Parent of the per-asset ledger accounts.
        #[pallet::constant]
        type PalletId: Get<PalletId>;

        /// Origin allowed to mint test balances.
        type MintOrigin: EnsureOrigin<Self::RuntimeOrigin>;

        type WeightInfo: WeightInfo;
    }

    pub trait WeightInfo {
        fn confidential_transfer() -> Weight;
        fn confidential_transfer_from() -> Weight;
        fn mint() -> Weight;
    }

    impl WeightInfo for () {
        fn confidential_transfer() -> Weight {
            Weight::from_parts(50_000, 0)
        }
        fn confidential_transfer_from() -> Weight {
            Weight::from_parts(55_000, 0)
        }
        fn mint() -> Weight {
            Weight::from_parts(20_000, 0)
        }
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    /// (asset, account) -> balance handle
    #[pallet::storage]
    pub type Balances<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        T::AssetId,
        Blake2_128Concat,
        T::AccountId,
        EncryptedAmount,
        ValueQuery,
    >;

    #[pallet::storage]
    pub type TotalSupply<T: Config> =
        StorageMap<_, Blake2_128Concat, T::AssetId, EncryptedAmount, ValueQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// `amount` is the handle of what actually moved.
        ConfidentialTransfer {
            asset: T::AssetId,
            from: T::AccountId,
            to: T::AccountId,
            amount: EncryptedAmount,
        },
        /// `amount` as requested. Nothing is credited if the supply would overflow.
        Minted {
            asset: T::AssetId,
            to: T::AccountId,
            amount: u64,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Caller is neither the owner nor an active operator.
        NotAuthorized,
        /// Caller may not use the amount handle.
        AmountNotAllowed,
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Move an encrypted amount from the signer to `to`.
        ///
        /// `proof` must bind `amount` to this asset's ledger account and the signer.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::confidential_transfer())]
        pub fn confidential_transfer(
            origin: OriginFor<T>,
            asset: T::AssetId,
            to: T::AccountId,
            amount: EncryptedAmount,
            proof: InputProof,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;
            let ledger = Self::asset_account(&asset);
            let amount = T::Fhe::verify_input(&ledger, &who, amount, &proof)?;
            Self::do_transfer(&asset, &ledger, &who, &who, &to, amount)?;
            Ok(())
        }

        /// Move an encrypted amount from `from` to `to` as `from` or one of its operators.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::confidential_transfer_from())]
        pub fn confidential_transfer_from(
            origin: OriginFor<T>,
            asset: T::AssetId,
            from: T::AccountId,
            to: T::AccountId,
            amount: EncryptedAmount,
            proof: InputProof,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_self_or_operator(&asset, &from, &who)?;
            let ledger = Self::asset_account(&asset);
            let amount = T::Fhe::verify_input(&ledger, &who, amount, &proof)?;
            Self::do_transfer(&asset, &ledger, &who, &from, &to, amount)?;
            Ok(())
        }

        /// Credit a public amount. Test faucet, not part of the swap protocol.
        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::mint())]
        pub fn mint(
            origin: OriginFor<T>,
            asset: T::AssetId,
            to: T::AccountId,
            amount: u64,
        ) -> DispatchResult {
            T::MintOrigin::ensure_origin(origin)?;
            let ledger = Self::asset_account(&asset);

            // Credits nothing if the supply would wrap. Balances never exceed
            // the supply, so they cannot wrap either.
            let supply = TotalSupply::<T>::get(asset);
            let minted = T::Fhe::trivial_encrypt(&ledger, amount)?;
            let raised = T::Fhe::add(&ledger, supply, minted)?;
            let fits = T::Fhe::le(&ledger, supply, raised)?;
            let zero = T::Fhe::trivial_encrypt(&ledger, 0)?;
            let credited = T::Fhe::select(&ledger, fits, minted, zero)?;

            let balance = T::Fhe::add(&ledger, Balances::<T>::get(asset, &to), credited)?;
            let supply = T::Fhe::add(&ledger, supply, credited)?;
            Balances::<T>::insert(asset, &to, balance);
            TotalSupply::<T>::insert(asset, supply);
            T::Fhe::allow(&ledger, balance, &to)?;

            Self::deposit_event(Event::Minted { asset, to, amount });
            Ok(())
        }
    }

    impl<T: Config> Pallet<T> {
        #[inline]
        pub fn asset_account(asset: &T::AssetId) -> T::AccountId {
            T::PalletId::get().into_sub_account_truncating(asset)
        }

        fn now_secs() -> u64 {
            T::Time::now().as_secs()
        }

        pub(crate) fn ensure_self_or_operator(
            asset: &T::AssetId,
            from: &T::AccountId,
            caller: &T::AccountId,
        ) -> DispatchResult {
            ensure!(
                caller == from || T::Operators::is_operator(from, asset, caller, Self::now_secs()),
                Error::<T>::NotAuthorized
            );
            Ok(())
        }

        /// Clamped transfer. `ledger` must already be allowed on `amount`.
        ///
        /// The sender's balance is written before the receiver's is read, so
        /// `from == to` leaves the balance unchanged.
        pub(crate) fn do_transfer(
            asset: &T::AssetId,
            ledger: &T::AccountId,
            caller: &T::AccountId,
            from: &T::AccountId,
            to: &T::AccountId,
            amount: EncryptedAmount,
        ) -> Result<EncryptedAmount, DispatchError> {
            let from_balance = Balances::<T>::get(asset, from);
            let covered = T::Fhe::le(ledger, amount, from_balance)?;
            let zero = T::Fhe::trivial_encrypt(ledger, 0)?;
            let transferred = T::Fhe::select(ledger, covered, amount, zero)?;

            let from_new = T::Fhe::sub(ledger, from_balance, transferred)?;
            Balances::<T>::insert(asset, from, from_new);

            let to_new = T::Fhe::add(ledger, Balances::<T>::get(asset, to), transferred)?;
            Balances::<T>::insert(asset, to, to_new);

            T::Fhe::allow(ledger, from_new, from)?;
            T::Fhe::allow(ledger, to_new, to)?;
            for account in [from, to, caller] {
                T::Fhe::allow(ledger, transferred, account)?;
            }

            log::debug!(
                target: LOG_TARGET,
                "confidential transfer of {asset:?} from {from:?} to {to:?} by {caller:?}"
            );
            Self::deposit_event(Event::ConfidentialTransfer {
                asset: *asset,
                from: from.clone(),
                to: to.clone(),
                amount: transferred,
            });
            Ok(transferred)
        }
    }
}

impl<T: Config> ConfidentialLedger<T::AccountId, T::AssetId> for Pallet<T> {
    fn ledger_account(asset: &T::AssetId) -> T::AccountId {
        Self::asset_account(asset)
    }

    fn balance_of(asset: &T::AssetId, who: &T::AccountId) -> EncryptedAmount {
        Balances::<T>::get(asset, who)
    }

    fn total_supply(asset: &T::AssetId) -> EncryptedAmount {
        TotalSupply::<T>::get(asset)
    }

    fn is_operator(asset: &T::AssetId, holder: &T::AccountId, spender: &T::AccountId) -> bool {
        T::Operators::is_operator(holder, asset, spender, Self::now_secs())
    }

    fn confidential_transfer(
        asset: &T::AssetId,
        caller: &T::AccountId,
        to: &T::AccountId,
        amount: EncryptedAmount,
    ) -> Result<EncryptedAmount, DispatchError> {
        let ledger = Self::adopt_amount(asset, caller, amount)?;
        Self::do_transfer(asset, &ledger, caller, caller, to, amount)
    }

    fn confidential_transfer_from(
        asset: &T::AssetId,
        caller: &T::AccountId,
        from: &T::AccountId,
        to: &T::AccountId,
        amount: EncryptedAmount,
    ) -> Result<EncryptedAmount, DispatchError> {
        Self::ensure_self_or_operator(asset, from, caller)?;
        let ledger = Self::adopt_amount(asset, caller, amount)?;
        Self::do_transfer(asset, &ledger, caller, from, to, amount)
    }
}

impl<T: Config> Pallet<T> {
    /// Check `caller` may spend the handle and let the ledger operate on it.
    fn adopt_amount(
        asset: &T::AssetId,
        caller: &T::AccountId,
        amount: EncryptedAmount,
    ) -> Result<T::AccountId, DispatchError> {
        ensure!(
            amount == ZERO_HANDLE || T::Fhe::is_allowed(&amount, caller),
            Error::<T>::AmountNotAllowed
        );
        let ledger = Self::asset_account(asset);
        T::Fhe::allow(caller, amount, &ledger)?;
        Ok(ledger)
    }
}
