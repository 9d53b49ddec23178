use crate::pallet as pallet_confidential_assets;
use fhe_gateway::{
    encrypt::{encrypt_for_submission, EncryptedInput, SubmissionInput},
    eval::{evaluate, SnapshotStore},
    keys::NetworkSecretKey,
};
use fhe_primitives::Handle;
use frame_support::{construct_runtime, derive_impl, parameter_types, traits::ConstU64, PalletId};
use frame_system::EnsureRoot;
use parity_scale_codec::Encode;
use sp_runtime::BuildStorage;

pub type AccountId = u64;
pub type AssetId = u32;
pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const CHARLIE: AccountId = 3;
pub const ASSET: AssetId = 7;
pub const CHAIN_ID: u64 = 42;

pub fn network_secret() -> NetworkSecretKey {
    NetworkSecretKey::from_seed([7u8; 32])
}

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Runtime {
    type Block = frame_system::mocking::MockBlock<Runtime>;
}

impl pallet_timestamp::Config for Runtime {
    type Moment = u64;
    type OnTimestampSet = ();
    type MinimumPeriod = ConstU64<1>;
    type WeightInfo = ();
}

parameter_types! {
    pub const ChainId: u64 = CHAIN_ID;
    pub NetworkKey: [u8; 32] = network_secret().public().to_bytes();
    pub const LedgerPalletId: PalletId = PalletId(*b"ca/ledgr");
}

impl pallet_fhe::Config for Runtime {
    type RuntimeEvent = RuntimeEvent;
    type ChainId = ChainId;
    type NetworkKey = NetworkKey;
    type WeightInfo = ();
}

impl pallet_operators::Config for Runtime {
    type RuntimeEvent = RuntimeEvent;
    type AssetId = AssetId;
    type WeightInfo = ();
}

impl pallet_confidential_assets::Config for Runtime {
    type RuntimeEvent = RuntimeEvent;
    type AssetId = AssetId;
    type Fhe = Fhe;
    type Operators = Operators;
    type Time = Timestamp;
    type PalletId = LedgerPalletId;
    type MintOrigin = EnsureRoot<AccountId>;
    type WeightInfo = ();
}

construct_runtime!(
    pub enum Runtime {
        System: frame_system,
        Timestamp: pallet_timestamp,
        Fhe: pallet_fhe,
        Operators: pallet_operators,
        ConfidentialAssets: pallet_confidential_assets,
    }
);

// Build a fresh externalities for each test.
pub fn new_test_ext() -> sp_io::TestExternalities {
    let t = frame_system::GenesisConfig::<Runtime>::default()
        .build_storage()
        .unwrap();
    let mut ext = sp_io::TestExternalities::new(t);
    ext.execute_with(|| {
        System::set_block_number(1);
        set_now(1_000);
    });
    ext
}

/// Set the chain clock, in unix seconds.
pub fn set_now(secs: u64) {
    Timestamp::set_timestamp(secs * 1_000);
}

/// Encrypt `amount` for this asset's ledger extrinsics, as submitted by `user`.
pub fn encrypt(user: AccountId, amount: u64, seed: u8) -> EncryptedInput {
    let ledger = ConfidentialAssets::asset_account(&ASSET);
    encrypt_for_submission(&SubmissionInput {
        chain_id: CHAIN_ID,
        network_key: &network_secret().public(),
        contract: &ledger.encode(),
        user: &user.encode(),
        amount,
        rng_seed: [seed; 32],
    })
}

pub fn proof(input: &EncryptedInput) -> confidential_assets_primitives::InputProof {
    input.proof.clone().try_into().expect("bounded vec")
}

/// Evaluate `handle` against the executor's current records.
pub fn reveal(handle: &Handle) -> u64 {
    let mut store = SnapshotStore::default();
    for (h, op) in pallet_fhe::Computations::<Runtime>::iter() {
        store.insert(h, op);
    }
    evaluate(&store, &network_secret(), handle).expect("evaluates")
}

pub fn balance(who: AccountId) -> u64 {
    reveal(&crate::Balances::<Runtime>::get(ASSET, who))
}
