use crate::pallet as pallet_operators;
use frame_support::{construct_runtime, derive_impl};
use sp_runtime::BuildStorage;

pub type AccountId = u64;
pub type AssetId = u32;
pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const ENGINE: AccountId = 3;
pub const ASSET: AssetId = 7;

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Runtime {
    type Block = frame_system::mocking::MockBlock<Runtime>;
}

impl pallet_operators::Config for Runtime {
    type RuntimeEvent = RuntimeEvent;
    type AssetId = AssetId;
    type WeightInfo = ();
}

construct_runtime!(
    pub enum Runtime {
        System: frame_system,
        Operators: pallet_operators,
    }
);

pub fn new_test_ext() -> sp_io::TestExternalities {
    let t = frame_system::GenesisConfig::<Runtime>::default()
        .build_storage()
        .unwrap();
    let mut ext = sp_io::TestExternalities::new(t);
    ext.execute_with(|| System::set_block_number(1));
    ext
}
