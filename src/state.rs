//! The state capability set consumed by the engine.

use primitive_types::{H160, H256, U256};

use crate::error::StateResult;

/// Handle identifying a point in the mutation history of a [`StateView`].
///
/// Handles are strictly increasing within one execution.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Snapshot(pub usize);

/// A log record emitted by contract code.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Log {
	pub address: H160,
	pub topics: Vec<H256>,
	pub data: Vec<u8>,
}

/// Account and storage access required by the engine.
///
/// Operations that reach the backing store return [`StateResult`]; a
/// [`StateFault`](crate::StateFault) aborts the whole execution.
/// Snapshot, log and refund bookkeeping never touch the store and are
/// infallible.
///
/// Implementations must reproduce these semantics exactly, since balance,
/// nonce and storage results are consensus critical.
#[auto_impl::auto_impl(&mut, Box)]
pub trait StateView {
	/// Materialize an account at `address`. If one already exists its
	/// balance is carried over while nonce, code and storage are reset.
	fn create_account(&mut self, address: H160) -> StateResult<()>;

	fn balance(&self, address: H160) -> StateResult<U256>;
	fn add_balance(&mut self, address: H160, amount: U256) -> StateResult<()>;
	fn sub_balance(&mut self, address: H160, amount: U256) -> StateResult<()>;

	fn nonce(&self, address: H160) -> StateResult<u64>;
	fn set_nonce(&mut self, address: H160, nonce: u64) -> StateResult<()>;

	/// Code hash of the account, or zero when the account does not exist.
	fn code_hash(&self, address: H160) -> StateResult<H256>;
	fn code(&self, address: H160) -> StateResult<Vec<u8>>;
	fn code_size(&self, address: H160) -> StateResult<usize> {
		Ok(self.code(address)?.len())
	}
	fn set_code(&mut self, address: H160, code: Vec<u8>) -> StateResult<()>;

	fn storage(&self, address: H160, key: H256) -> StateResult<H256>;
	fn set_storage(&mut self, address: H160, key: H256, value: H256) -> StateResult<()>;

	/// Mark the account for removal at the end of the transaction and
	/// clear its balance. Returns false if the account does not exist.
	fn suicide(&mut self, address: H160) -> StateResult<bool>;
	fn has_suicided(&self, address: H160) -> StateResult<bool>;

	/// Whether the account exists. Also true for suicided accounts.
	fn exists(&self, address: H160) -> StateResult<bool>;
	/// Whether the account is empty according to EIP-161
	/// (balance = nonce = code = 0).
	fn is_empty(&self, address: H160) -> StateResult<bool> {
		Ok(self.balance(address)?.is_zero()
			&& self.nonce(address)? == 0
			&& self.code_size(address)? == 0)
	}

	fn snapshot(&mut self) -> Snapshot;
	/// Undo every mutation performed after `snapshot` was taken. Reverting
	/// twice to the same handle is a no-op the second time.
	fn revert_to_snapshot(&mut self, snapshot: Snapshot);
	/// Keep the mutations performed after `snapshot` and release the
	/// handle. Handles taken after `snapshot` become invalid.
	fn commit_snapshot(&mut self, _snapshot: Snapshot) {}

	fn add_refund(&mut self, gas: u64);
	fn refund(&self) -> u64;

	fn log(&mut self, log: Log);
	fn add_preimage(&mut self, hash: H256, preimage: Vec<u8>);

	/// Visit the storage of `address` until `f` returns false. For
	/// diagnostics only.
	fn for_each_storage(
		&self,
		address: H160,
		f: &mut dyn FnMut(H256, H256) -> bool,
	) -> StateResult<()>;
}
