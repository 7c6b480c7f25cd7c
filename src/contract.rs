use std::rc::Rc;

use primitive_types::{H160, H256, U256};

use crate::{error::ExitException, utils::keccak256};

/// Anything that can act as the caller of a frame.
pub trait ContractRef {
	fn address(&self) -> H160;
}

impl ContractRef for H160 {
	fn address(&self) -> H160 {
		*self
	}
}

impl ContractRef for Contract {
	fn address(&self) -> H160 {
		self.address
	}
}

/// One call frame: the code being run, who runs it on behalf of whom, and
/// the gas left to do so.
#[derive(Clone, Debug)]
pub struct Contract {
	caller_address: H160,
	address: H160,
	value: U256,
	gas: u64,
	delegate: bool,

	/// Address the code was loaded from. `None` for code that has not been
	/// stored yet.
	pub code_address: Option<H160>,
	pub code: Rc<Vec<u8>>,
	pub code_hash: H256,
	pub input: Vec<u8>,
}

impl Contract {
	/// New frame at `address` called by `caller`, carrying `value` and
	/// `gas`. Code is attached separately.
	pub fn new(caller: &dyn ContractRef, address: H160, value: U256, gas: u64) -> Self {
		Self {
			caller_address: caller.address(),
			address,
			value,
			gas,
			delegate: false,
			code_address: None,
			code: Rc::new(Vec::new()),
			code_hash: H256::zero(),
			input: Vec::new(),
		}
	}

	/// Turn the frame into a delegate frame of `parent`: caller and value
	/// are inherited from the parent instead of the parent being the caller.
	pub fn as_delegate(mut self, parent: &Contract) -> Self {
		self.delegate = true;
		self.caller_address = parent.caller_address;
		self.value = parent.value;
		self
	}

	pub fn with_input(mut self, input: Vec<u8>) -> Self {
		self.input = input;
		self
	}

	/// Attach code loaded from `code_address`.
	pub fn set_call_code(&mut self, code_address: H160, code_hash: H256, code: Vec<u8>) {
		self.code_address = Some(code_address);
		self.code_hash = code_hash;
		self.code = Rc::new(code);
	}

	/// Attach init code of a contract that is being created.
	pub fn set_init_code(&mut self, code: Vec<u8>) {
		self.code_address = None;
		self.code_hash = keccak256(&code);
		self.code = Rc::new(code);
	}

	pub fn caller(&self) -> H160 {
		self.caller_address
	}

	pub fn address(&self) -> H160 {
		self.address
	}

	pub fn value(&self) -> U256 {
		self.value
	}

	pub fn gas(&self) -> u64 {
		self.gas
	}

	pub fn is_delegate(&self) -> bool {
		self.delegate
	}

	/// Byte `n` of the code, zero past the end.
	pub fn get_op(&self, n: usize) -> u8 {
		self.code.get(n).copied().unwrap_or(0)
	}

	/// Deduct `gas`. If the frame cannot pay, its gas drops to zero.
	pub fn use_gas(&mut self, gas: u64) -> Result<(), ExitException> {
		match self.gas.checked_sub(gas) {
			Some(left) => {
				self.gas = left;
				Ok(())
			}
			None => {
				self.gas = 0;
				Err(ExitException::OutOfGas)
			}
		}
	}

	/// Forfeit all remaining gas.
	pub fn use_all_gas(&mut self) {
		self.gas = 0;
	}

	/// Return gas left over by a child frame.
	pub fn refund_gas(&mut self, gas: u64) {
		self.gas = self.gas.saturating_add(gas);
	}
}
