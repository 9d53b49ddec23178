//! Off-chain evaluation of computation records.
//!
//! The executor pallet only stores what each handle was computed from. The
//! decryption service walks that graph down to the verified inputs, decrypts
//! them with the network secret and replays the arithmetic.

use std::collections::{HashMap, HashSet};

use fhe_primitives::{FheOp, Handle, ZERO_HANDLE};
use thiserror::Error;

use crate::keys::NetworkSecretKey;

/// Read-only view of the executor's records and access list.
pub trait CiphertextStore {
    fn computation(&self, handle: &Handle) -> Option<FheOp>;

    /// `account` is the SCALE encoding of the on-chain account id.
    fn is_allowed(&self, handle: &Handle, account: &[u8]) -> bool;
}

/// In-memory copy of the executor state, refreshed from chain storage.
#[derive(Clone, Debug, Default)]
pub struct SnapshotStore {
    computations: HashMap<Handle, FheOp>,
    acl: HashSet<(Handle, Vec<u8>)>,
}

impl SnapshotStore {
    pub fn insert(&mut self, handle: Handle, op: FheOp) {
        self.computations.insert(handle, op);
    }

    pub fn allow(&mut self, handle: Handle, account: impl Into<Vec<u8>>) {
        self.acl.insert((handle, account.into()));
    }
}

impl CiphertextStore for SnapshotStore {
    fn computation(&self, handle: &Handle) -> Option<FheOp> {
        self.computations.get(handle).copied()
    }

    fn is_allowed(&self, handle: &Handle, account: &[u8]) -> bool {
        self.acl.contains(&(*handle, account.to_vec()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("no computation record for handle 0x{0}")]
    UnknownHandle(String),
    #[error("input ciphertext does not decrypt")]
    InvalidCiphertext,
    #[error("division by zero")]
    DivisionByZero,
}

fn unknown(handle: &Handle) -> EvalError {
    EvalError::UnknownHandle(hex::encode(handle))
}

/// Evaluate `handle` to its plaintext. [`ZERO_HANDLE`] is zero.
///
/// Iterative, so deep chains of balance updates do not grow the call stack.
pub fn evaluate<S: CiphertextStore + ?Sized>(
    store: &S,
    key: &NetworkSecretKey,
    handle: &Handle,
) -> Result<u64, EvalError> {
    let mut memo: HashMap<Handle, u64> = HashMap::new();
    memo.insert(ZERO_HANDLE, 0);

    // (handle, operands already scheduled)
    let mut stack = vec![(*handle, false)];
    while let Some((h, expanded)) = stack.pop() {
        if memo.contains_key(&h) {
            continue;
        }
        let op = store.computation(&h).ok_or_else(|| unknown(&h))?;

        if !expanded {
            stack.push((h, true));
            for operand in op.operands() {
                if !memo.contains_key(&operand) {
                    stack.push((operand, false));
                }
            }
            continue;
        }

        let get = |x: &Handle| memo.get(x).copied().ok_or_else(|| unknown(x));
        let value = match op {
            FheOp::Input(ct) => key
                .open_input(&ct)
                .map_err(|_| EvalError::InvalidCiphertext)?,
            FheOp::Trivial(v) => v,
            FheOp::Add(a, b) => get(&a)?.wrapping_add(get(&b)?),
            FheOp::Sub(a, b) => get(&a)?.wrapping_sub(get(&b)?),
            FheOp::Le(a, b) => u64::from(get(&a)? <= get(&b)?),
            FheOp::Select(c, t, f) => {
                if get(&c)? != 0 {
                    get(&t)?
                } else {
                    get(&f)?
                }
            }
            FheOp::MulScalar(a, k) => get(&a)?.wrapping_mul(k),
            FheOp::DivScalar(a, k) => get(&a)?
                .checked_div(k)
                .ok_or(EvalError::DivisionByZero)?,
        };
        memo.insert(h, value);
    }

    memo.get(handle).copied().ok_or_else(|| unknown(handle))
}
