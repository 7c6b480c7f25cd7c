use std::fmt;

use primitive_types::{H160, H256, U256};

use crate::{error::StateResult, state::StateView};

/// Whether `address` holds enough to transfer `amount`.
pub type CanTransferFn = fn(&dyn StateView, H160, U256) -> StateResult<bool>;
/// Move `amount` from the first address to the second.
pub type TransferFn = fn(&mut dyn StateView, H160, H160, U256) -> StateResult<()>;
/// Hash of the block with the given number.
pub type GetHashFn = Box<dyn Fn(u64) -> H256>;

/// Block and transaction parameters of one execution. Not modified once
/// handed to the engine.
pub struct ExecutionContext {
	pub can_transfer: CanTransferFn,
	pub transfer: TransferFn,
	/// Must return the same hash for the same number within one execution.
	pub get_hash: GetHashFn,

	/// Transaction origin.
	pub origin: H160,
	pub gas_price: U256,

	pub coinbase: H160,
	pub gas_limit: U256,
	pub block_number: U256,
	pub time: U256,
	pub difficulty: U256,
}

impl ExecutionContext {
	/// Context with the standard transfer rules and no block hashes.
	pub fn new(origin: H160, block_number: U256) -> Self {
		Self {
			can_transfer,
			transfer,
			get_hash: Box::new(|_| H256::zero()),
			origin,
			gas_price: U256::zero(),
			coinbase: H160::zero(),
			gas_limit: U256::zero(),
			block_number,
			time: U256::zero(),
			difficulty: U256::zero(),
		}
	}

	pub fn block_hash(&self, number: u64) -> H256 {
		(self.get_hash)(number)
	}
}

impl fmt::Debug for ExecutionContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ExecutionContext")
			.field("origin", &self.origin)
			.field("gas_price", &self.gas_price)
			.field("coinbase", &self.coinbase)
			.field("gas_limit", &self.gas_limit)
			.field("block_number", &self.block_number)
			.field("time", &self.time)
			.field("difficulty", &self.difficulty)
			.finish_non_exhaustive()
	}
}

pub fn can_transfer(state: &dyn StateView, address: H160, amount: U256) -> StateResult<bool> {
	Ok(state.balance(address)? >= amount)
}

pub fn transfer(state: &mut dyn StateView, from: H160, to: H160, amount: U256) -> StateResult<()> {
	state.sub_balance(from, amount)?;
	state.add_balance(to, amount)
}

/// Always allows the transfer.
pub fn noop_can_transfer(_state: &dyn StateView, _address: H160, _amount: U256) -> StateResult<bool> {
	Ok(true)
}

/// Leaves balances untouched.
pub fn noop_transfer(
	_state: &mut dyn StateView,
	_from: H160,
	_to: H160,
	_amount: U256,
) -> StateResult<()> {
	Ok(())
}
