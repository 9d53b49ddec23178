use crate::pallet as pallet_fhe;
use fhe_gateway::{
    encrypt::{encrypt_for_submission, EncryptedInput, SubmissionInput},
    eval::{evaluate, SnapshotStore},
    keys::NetworkSecretKey,
};
use fhe_primitives::Handle;
use frame_support::{construct_runtime, derive_impl, parameter_types};
use parity_scale_codec::Encode;
use sp_runtime::BuildStorage;

pub type AccountId = u64;
pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const CONTRACT: AccountId = 100;
pub const CHAIN_ID: u64 = 42;

pub fn network_secret() -> NetworkSecretKey {
    NetworkSecretKey::from_seed([7u8; 32])
}

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Runtime {
    type Block = frame_system::mocking::MockBlock<Runtime>;
}

parameter_types! {
    pub const ChainId: u64 = CHAIN_ID;
    pub NetworkKey: [u8; 32] = network_secret().public().to_bytes();
}

impl pallet_fhe::Config for Runtime {
    type RuntimeEvent = RuntimeEvent;
    type ChainId = ChainId;
    type NetworkKey = NetworkKey;
    type WeightInfo = ();
}

construct_runtime!(
    pub enum Runtime {
        System: frame_system,
        Fhe: pallet_fhe,
    }
);

// Build a fresh externalities for each test.
pub fn new_test_ext() -> sp_io::TestExternalities {
    let t = frame_system::GenesisConfig::<Runtime>::default()
        .build_storage()
        .unwrap();
    let mut ext = sp_io::TestExternalities::new(t);
    ext.execute_with(|| System::set_block_number(1));
    ext
}

/// Client-side encryption of `amount` for `contract`, submitted by `user`.
pub fn encrypt(contract: AccountId, user: AccountId, amount: u64, seed: u8) -> EncryptedInput {
    encrypt_for_submission(&SubmissionInput {
        chain_id: CHAIN_ID,
        network_key: &network_secret().public(),
        contract: &contract.encode(),
        user: &user.encode(),
        amount,
        rng_seed: [seed; 32],
    })
}

/// Evaluate `handle` against the current computation records.
pub fn reveal(handle: &Handle) -> u64 {
    let mut store = SnapshotStore::default();
    for (h, op) in crate::Computations::<Runtime>::iter() {
        store.insert(h, op);
    }
    evaluate(&store, &network_secret(), handle).expect("evaluates")
}
