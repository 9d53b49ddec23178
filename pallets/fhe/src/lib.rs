//! pallet-fhe — executor for operations over encrypted `u64` values.
//!
//! The pallet never sees a plaintext. Each operation stores a computation
//! record ([`FheOp`]) under a fresh handle and grants the calling account
//! access to it. The decryption service evaluates the records off-chain and
//! only reveals a handle to an account present in [`Acl`].
//!
//! External inputs are accepted through [`FheExecutor::verify_input`], which
//! checks the Schnorr proof, recomputes the handle from the
//! `(contract, user)` binding and consumes the input so it cannot be replayed.

#![cfg_attr(not(feature = "std"), no_std)]

use confidential_assets_primitives::FheExecutor;
use fhe_primitives::{FheOp, Handle, InputError, ZERO_HANDLE};
use frame_support::pallet_prelude::*;
use frame_system::pallet_prelude::*;

pub use pallet::*;

#[cfg(test)]
mod mock;

const LOG_TARGET: &str = "runtime::fhe";

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// Chain identifier mixed into every handle and input proof.
        #[pallet::constant]
        type ChainId: Get<u64>;

        /// Compressed Ristretto public key of the decryption network.
        #[pallet::constant]
        type NetworkKey: Get<[u8; 32]>;

        type WeightInfo: WeightInfo;
    }

    pub trait WeightInfo {
        fn allow() -> Weight;
    }

    impl WeightInfo for () {
        fn allow() -> Weight {
            Weight::from_parts(10_000, 0)
        }
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    /// handle -> computation that produced it
    #[pallet::storage]
    pub type Computations<T> = StorageMap<_, Blake2_128Concat, Handle, FheOp, OptionQuery>;

    /// (handle, account) -> account may operate on or decrypt handle
    #[pallet::storage]
    pub type Acl<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        Handle,
        Blake2_128Concat,
        T::AccountId,
        (),
        OptionQuery,
    >;

    /// Monotonic counter making result handles unique.
    #[pallet::storage]
    pub type Nonce<T> = StorageValue<_, u64, ValueQuery>;

    /// Input handles already ingested.
    #[pallet::storage]
    pub type ConsumedInputs<T> = StorageMap<_, Blake2_128Concat, Handle, (), OptionQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        InputAccepted {
            handle: Handle,
            contract: T::AccountId,
            user: T::AccountId,
        },
        Allowed {
            handle: Handle,
            by: T::AccountId,
            account: T::AccountId,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Proof bytes have the wrong layout or encode an invalid point/scalar.
        MalformedProof,
        /// Proof does not verify for this contract and user.
        InvalidProof,
        /// Claimed handle differs from the one the proof binds.
        HandleMismatch,
        /// Input was already consumed.
        InputAlreadyUsed,
        /// Account is not allowed on an operand.
        NotAllowed,
        DivisionByZero,
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Share access to a handle the signer is already allowed on.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::allow())]
        pub fn allow(origin: OriginFor<T>, handle: Handle, account: T::AccountId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            <Self as FheExecutor<T::AccountId>>::allow(&who, handle, &account)?;
            Self::deposit_event(Event::Allowed { handle, by: who, account });
            Ok(())
        }
    }

    impl<T: Config> Pallet<T> {
        pub fn computation(handle: &Handle) -> Option<FheOp> {
            Computations::<T>::get(handle)
        }

        fn ensure_allowed(who: &T::AccountId, handle: &Handle) -> DispatchResult {
            ensure!(
                *handle == ZERO_HANDLE || Acl::<T>::contains_key(handle, who),
                Error::<T>::NotAllowed
            );
            Ok(())
        }

        fn record(who: &T::AccountId, op: FheOp) -> Result<Handle, DispatchError> {
            for operand in op.operands() {
                Self::ensure_allowed(who, &operand)?;
            }
            let nonce = Nonce::<T>::mutate(|n| {
                let current = *n;
                *n = n.wrapping_add(1);
                current
            });
            let handle = fhe_primitives::result_handle(T::ChainId::get(), &op, nonce);
            Computations::<T>::insert(handle, op);
            Acl::<T>::insert(handle, who, ());
            log::trace!(target: LOG_TARGET, "recorded computation #{nonce}: {op:?}");
            Ok(handle)
        }
    }
}

impl<T: Config> FheExecutor<T::AccountId> for Pallet<T> {
    fn verify_input(
        contract: &T::AccountId,
        user: &T::AccountId,
        handle: Handle,
        proof: &[u8],
    ) -> Result<Handle, DispatchError> {
        let contract_bytes = contract.encode();
        let user_bytes = user.encode();
        let chain_id = T::ChainId::get();

        let ciphertext = fhe_primitives::verify_input_proof(
            proof,
            chain_id,
            &T::NetworkKey::get(),
            &contract_bytes,
            &user_bytes,
        )
        .map_err(|e| match e {
            InputError::BadProof => Error::<T>::InvalidProof,
            _ => Error::<T>::MalformedProof,
        })?;

        let expected =
            fhe_primitives::input_handle(chain_id, &contract_bytes, &user_bytes, &ciphertext);
        ensure!(expected == handle, Error::<T>::HandleMismatch);
        ensure!(
            !ConsumedInputs::<T>::contains_key(handle),
            Error::<T>::InputAlreadyUsed
        );

        ConsumedInputs::<T>::insert(handle, ());
        Computations::<T>::insert(handle, FheOp::Input(ciphertext));
        Acl::<T>::insert(handle, contract, ());
        log::debug!(target: LOG_TARGET, "input accepted for contract {contract:?} from {user:?}");

        Self::deposit_event(Event::InputAccepted {
            handle,
            contract: contract.clone(),
            user: user.clone(),
        });
        Ok(handle)
    }

    fn trivial_encrypt(who: &T::AccountId, value: u64) -> Result<Handle, DispatchError> {
        Self::record(who, FheOp::Trivial(value))
    }

    fn add(who: &T::AccountId, lhs: Handle, rhs: Handle) -> Result<Handle, DispatchError> {
        Self::record(who, FheOp::Add(lhs, rhs))
    }

    fn sub(who: &T::AccountId, lhs: Handle, rhs: Handle) -> Result<Handle, DispatchError> {
        Self::record(who, FheOp::Sub(lhs, rhs))
    }

    fn le(who: &T::AccountId, lhs: Handle, rhs: Handle) -> Result<Handle, DispatchError> {
        Self::record(who, FheOp::Le(lhs, rhs))
    }

    fn select(
        who: &T::AccountId,
        cond: Handle,
        if_true: Handle,
        if_false: Handle,
    ) -> Result<Handle, DispatchError> {
        Self::record(who, FheOp::Select(cond, if_true, if_false))
    }

    fn mul_scalar(who: &T::AccountId, lhs: Handle, rhs: u64) -> Result<Handle, DispatchError> {
        Self::record(who, FheOp::MulScalar(lhs, rhs))
    }

    fn div_scalar(who: &T::AccountId, lhs: Handle, rhs: u64) -> Result<Handle, DispatchError> {
        ensure!(rhs != 0, Error::<T>::DivisionByZero);
        Self::record(who, FheOp::DivScalar(lhs, rhs))
    }

    fn allow(who: &T::AccountId, handle: Handle, account: &T::AccountId) -> DispatchResult {
        Self::ensure_allowed(who, &handle)?;
        if handle != ZERO_HANDLE {
            Acl::<T>::insert(handle, account, ());
        }
        Ok(())
    }

    fn is_allowed(handle: &Handle, account: &T::AccountId) -> bool {
        *handle == ZERO_HANDLE || Acl::<T>::contains_key(handle, account)
    }
}
