//! Helpers for driving the test runtime like a client would.

use std::{cell::RefCell, sync::Arc};

use anyhow::{anyhow, Result};
use confidential_assets_primitives::{InputProof, SwapDirection};
use fhe_gateway::{
    clock::ManualClock,
    config::GatewayConfig,
    encrypt::EncryptedInput,
    eval::SnapshotStore,
    service::LocalDecryptionService,
    Gateway, SubmitError, SwapSubmitter,
};
use fhe_primitives::Handle;
use parity_scale_codec::{Decode, Encode};

use crate::runtime::*;

pub type TestService = LocalDecryptionService<SnapshotStore, Arc<ManualClock>>;
pub type TestGateway = Gateway<TestService, Arc<ManualClock>>;

/// The chain under test, one block at a time.
pub struct Chain {
    ext: RefCell<sp_io::TestExternalities>,
}

impl Chain {
    pub fn new() -> Result<Self> {
        Ok(Self {
            ext: RefCell::new(genesis_ext()?),
        })
    }

    pub fn execute_with<R>(&self, f: impl FnOnce() -> R) -> R {
        self.ext.borrow_mut().execute_with(f)
    }

    pub fn engine() -> AccountId {
        ConfidentialSwaps::engine_account()
    }

    pub fn ledger(asset: AssetId) -> AccountId {
        ConfidentialAssets::asset_account(&asset)
    }

    pub fn mint(&self, asset: AssetId, to: &AccountId, amount: u64) -> Result<()> {
        self.execute_with(|| {
            ConfidentialAssets::mint(RuntimeOrigin::root(), asset, to.clone(), amount)
        })
        .map_err(|e| anyhow!("mint failed: {e:?}"))
    }

    /// Make the swap engine an operator on `who`'s `asset` until `until`.
    pub fn approve_engine(&self, who: &AccountId, asset: AssetId, until: u64) -> Result<()> {
        self.execute_with(|| {
            Operators::set_operator(RuntimeOrigin::signed(who.clone()), asset, Self::engine(), until)
        })
        .map_err(|e| anyhow!("set_operator failed: {e:?}"))
    }

    pub fn balance_handle(&self, asset: AssetId, who: &AccountId) -> Handle {
        self.execute_with(|| pallet_confidential_assets::Balances::<Runtime>::get(asset, who))
    }

    /// Move to the next block at `secs`.
    pub fn advance_to(&self, secs: u64) {
        self.execute_with(|| {
            System::set_block_number(System::block_number() + 1);
            Timestamp::set_timestamp(secs * 1_000);
        });
    }

    /// What an indexer would hand the decryption service: every computation
    /// record and access grant in executor storage.
    pub fn snapshot(&self) -> SnapshotStore {
        self.execute_with(|| {
            let mut store = SnapshotStore::default();
            for (handle, op) in pallet_fhe::Computations::<Runtime>::iter() {
                store.insert(handle, op);
            }
            for (handle, account, ()) in pallet_fhe::Acl::<Runtime>::iter() {
                store.allow(handle, account.encode());
            }
            store
        })
    }

    fn dispatch_swap(
        &self,
        who: AccountId,
        direction: SwapDirection,
        input: EncryptedInput,
    ) -> Result<Handle, SubmitError> {
        let proof: InputProof = input
            .proof
            .try_into()
            .map_err(|_| SubmitError::Transport("proof exceeds the size limit".into()))?;

        self.execute_with(|| {
            System::reset_events();
            let origin = RuntimeOrigin::signed(who);
            match direction {
                SwapDirection::Forward => ConfidentialSwaps::swap_forward(origin, input.handle, proof),
                SwapDirection::Reverse => ConfidentialSwaps::swap_reverse(origin, input.handle, proof),
            }
            .map_err(|e| SubmitError::Rejected(format!("{e:?}")))?;

            System::events()
                .into_iter()
                .rev()
                .find_map(|record| match record.event {
                    RuntimeEvent::ConfidentialSwaps(
                        pallet_confidential_swaps::Event::SwapForward { amount_out, .. }
                        | pallet_confidential_swaps::Event::SwapReverse { amount_out, .. },
                    ) => Some(amount_out),
                    _ => None,
                })
                .ok_or_else(|| SubmitError::Transport("swap event missing".into()))
        })
    }
}

impl SwapSubmitter for Chain {
    fn engine_account(&self) -> Vec<u8> {
        Self::engine().encode()
    }

    async fn submit(
        &self,
        user: &[u8],
        direction: SwapDirection,
        input: EncryptedInput,
    ) -> Result<Handle, SubmitError> {
        let who = AccountId::decode(&mut &user[..])
            .map_err(|e| SubmitError::Transport(format!("bad account: {e}")))?;
        self.dispatch_swap(who, direction, input)
    }
}

/// Gateway plus a local decryption service over the chain's current state.
pub fn gateway(chain: &Chain, clock: Arc<ManualClock>) -> Result<TestGateway> {
    let config = GatewayConfig::from_json(
        &serde_json::json!({
            "chainId": CHAIN_ID,
            "networkKey": hex::encode(network_secret().public().to_bytes()),
            "domainName": "Decryption",
            "domainVersion": "1",
            "verifyingContract": "6b6d73",
        })
        .to_string(),
    )?;
    let service = LocalDecryptionService::new(
        network_secret(),
        config.domain(),
        chain.snapshot(),
        clock.clone(),
    );
    Ok(Gateway::new(config, service, clock)?)
}

/// Point the decryption service at the latest chain state.
pub fn sync(gateway: &TestGateway, chain: &Chain) {
    gateway.service().replace_store(chain.snapshot());
}
