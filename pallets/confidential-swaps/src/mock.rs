use crate::pallet as pallet_confidential_swaps;
use confidential_assets_primitives::ConfidentialLedger;
use fhe_gateway::{
    encrypt::{encrypt_for_submission, EncryptedInput, SubmissionInput},
    eval::{evaluate, SnapshotStore},
    keys::NetworkSecretKey,
};
use fhe_primitives::Handle;
use frame_support::{
    assert_ok, construct_runtime, derive_impl, parameter_types, traits::ConstU64, PalletId,
};
use frame_system::EnsureRoot;
use parity_scale_codec::Encode;
use sp_runtime::BuildStorage;

// Wide enough that each asset gets its own ledger sub-account.
pub type AccountId = u128;
pub type AssetId = u32;
pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const ASSET_A: AssetId = 1;
pub const ASSET_B: AssetId = 2;
pub const CHAIN_ID: u64 = 42;
/// Genesis clock, unix seconds.
pub const NOW: u64 = 1_700_000_000;

pub fn network_secret() -> NetworkSecretKey {
    NetworkSecretKey::from_seed([7u8; 32])
}

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Runtime {
    type AccountId = AccountId;
    type Lookup = sp_runtime::traits::IdentityLookup<AccountId>;
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
    pub const SwapPalletId: PalletId = PalletId(*b"swp/engn");
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

impl pallet_confidential_swaps::Config for Runtime {
    type RuntimeEvent = RuntimeEvent;
    type AssetId = AssetId;
    type Ledger = ConfidentialAssets;
    type Fhe = Fhe;
    type PalletId = SwapPalletId;
    type WeightInfo = ();
}

construct_runtime!(
    pub enum Runtime {
        System: frame_system,
        Timestamp: pallet_timestamp,
        Fhe: pallet_fhe,
        Operators: pallet_operators,
        ConfidentialAssets: pallet_confidential_assets,
        ConfidentialSwaps: pallet_confidential_swaps,
    }
);

pub fn ext_with_pair(assets: Option<(AssetId, AssetId)>) -> sp_io::TestExternalities {
    let t = RuntimeGenesisConfig {
        system: Default::default(),
        confidential_swaps: pallet_confidential_swaps::GenesisConfig { assets },
        ..Default::default()
    }
    .build_storage()
    .unwrap();
    let mut ext = sp_io::TestExternalities::new(t);
    ext.execute_with(|| {
        System::set_block_number(1);
        Timestamp::set_timestamp(NOW * 1_000);
    });
    ext
}

// Build a fresh externalities for each test, with the A/B pair configured.
pub fn new_test_ext() -> sp_io::TestExternalities {
    ext_with_pair(Some((ASSET_A, ASSET_B)))
}

pub fn engine() -> AccountId {
    ConfidentialSwaps::engine_account()
}

pub fn mint(asset: AssetId, to: AccountId, amount: u64) {
    assert_ok!(ConfidentialAssets::mint(
        RuntimeOrigin::root(),
        asset,
        to,
        amount
    ));
}

/// Let the engine pull `who`'s `asset` for the next hour.
pub fn grant_engine(who: AccountId, asset: AssetId) {
    assert_ok!(Operators::set_operator(
        RuntimeOrigin::signed(who),
        asset,
        engine(),
        NOW + 3_600
    ));
}

/// Encrypt a swap input bound to the engine and `user`.
pub fn encrypt(user: AccountId, amount: u64, seed: u8) -> EncryptedInput {
    encrypt_for(engine(), user, amount, seed)
}

pub fn encrypt_for(contract: AccountId, user: AccountId, amount: u64, seed: u8) -> EncryptedInput {
    encrypt_for_submission(&SubmissionInput {
        chain_id: CHAIN_ID,
        network_key: &network_secret().public(),
        contract: &contract.encode(),
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

pub fn balance(asset: AssetId, who: AccountId) -> u64 {
    reveal(&ConfidentialAssets::balance_of(&asset, &who))
}

pub fn supply(asset: AssetId) -> u64 {
    reveal(&ConfidentialAssets::total_supply(&asset))
}
