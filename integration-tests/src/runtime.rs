//! Test runtime with real account ids.

use fhe_gateway::keys::NetworkSecretKey;
use frame_support::{
    construct_runtime, derive_impl, parameter_types, traits::ConstU64, PalletId,
};
use frame_system::EnsureRoot;
use sp_runtime::{traits::IdentityLookup, AccountId32, BuildStorage};

pub type AccountId = AccountId32;
pub type AssetId = u32;

pub const CHAIN_ID: u64 = 1_000;
pub const ASSET_A: AssetId = 1;
pub const ASSET_B: AssetId = 2;
/// Genesis clock, unix seconds.
pub const GENESIS_SECS: u64 = 1_700_000_000;

/// Held by the decryption service only.
pub fn network_secret() -> NetworkSecretKey {
    NetworkSecretKey::from_seed(*b"integration-tests-network-key!!!")
}

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Runtime {
    type Block = frame_system::mocking::MockBlock<Runtime>;
    type AccountId = AccountId;
    type Lookup = IdentityLookup<AccountId>;
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

pub fn genesis_ext() -> anyhow::Result<sp_io::TestExternalities> {
    let storage = RuntimeGenesisConfig {
        system: Default::default(),
        confidential_swaps: pallet_confidential_swaps::GenesisConfig {
            assets: Some((ASSET_A, ASSET_B)),
        },
        ..Default::default()
    }
    .build_storage()
    .map_err(anyhow::Error::msg)?;

    let mut ext = sp_io::TestExternalities::new(storage);
    ext.execute_with(|| {
        System::set_block_number(1);
        Timestamp::set_timestamp(GENESIS_SECS * 1_000);
    });
    Ok(ext)
}
