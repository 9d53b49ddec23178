//! At most one decryption per (account, contract) at a time.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use crate::error::GatewayError;

type Key = (Vec<u8>, Vec<u8>);

#[derive(Clone, Debug, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<Key>>>,
}

impl InFlight {
    /// Claim the key, or fail with [`GatewayError::Busy`]. The claim ends when
    /// the guard drops.
    pub fn try_acquire(&self, account: &[u8], contract: &[u8]) -> Result<InFlightGuard, GatewayError> {
        let key = (account.to_vec(), contract.to_vec());
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            return Err(GatewayError::Busy);
        }
        Ok(InFlightGuard {
            keys: self.keys.clone(),
            key,
        })
    }

    pub fn is_busy(&self, account: &[u8], contract: &[u8]) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(account.to_vec(), contract.to_vec()))
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<Key>>>,
    key: Key,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
