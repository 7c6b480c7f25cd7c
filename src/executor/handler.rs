use primitive_types::{H160, H256, U256};

use crate::{
	config::Rules,
	context::ExecutionContext,
	contract::Contract,
	error::{ExitError, ExitResult},
	state::{Log, StateView},
};

/// How a call frame was entered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallScheme {
	/// Run the target's code on the target's account.
	Call,
	/// Run the target's code on the caller's account.
	CallCode,
	/// Like `CallCode`, inheriting caller and value from the parent frame.
	DelegateCall,
	/// `Call` without value, with every nested mutation rejected.
	StaticCall,
}

/// Outcome of a nested call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallOutput {
	pub result: ExitResult,
	/// Return data on success, revert data on an explicit revert, empty
	/// otherwise.
	pub output: Vec<u8>,
	/// Gas handed back to the calling frame.
	pub gas_left: u64,
}

/// Outcome of a contract creation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateOutput {
	pub result: ExitResult,
	pub output: Vec<u8>,
	/// The derived contract address. Set as soon as the address is known,
	/// even if the creation failed afterwards.
	pub address: Option<H160>,
	pub gas_left: u64,
}

/// Capabilities the engine hands to an interpreter while one of its frames
/// runs.
///
/// Nested calls and creations must go through this trait so that they are
/// subject to the same depth, snapshot and read-only rules as top-level
/// messages.
pub trait CallContext {
	/// State reads. Mutations go through the methods below.
	fn state(&self) -> &dyn StateView;
	fn context(&self) -> &ExecutionContext;
	fn rules(&self) -> &Rules;
	/// Number of frames currently running.
	fn depth(&self) -> usize;
	fn is_read_only(&self) -> bool;
	/// Interpreters must poll this at safe points and unwind with
	/// [`ExitException::Aborted`](crate::ExitException::Aborted) once it is set.
	fn is_aborted(&self) -> bool;

	fn set_storage(&mut self, address: H160, key: H256, value: H256) -> Result<(), ExitError>;
	fn log(&mut self, log: Log) -> Result<(), ExitError>;
	/// Move the balance of `address` to `beneficiary` and mark `address`
	/// for deletion.
	fn mark_delete(&mut self, address: H160, beneficiary: H160) -> Result<(), ExitError>;
	fn add_refund(&mut self, gas: u64);
	fn add_preimage(&mut self, hash: H256, preimage: Vec<u8>);

	fn call(
		&mut self,
		caller: &Contract,
		address: H160,
		input: Vec<u8>,
		gas: u64,
		value: U256,
	) -> CallOutput;
	fn call_code(
		&mut self,
		caller: &Contract,
		address: H160,
		input: Vec<u8>,
		gas: u64,
		value: U256,
	) -> CallOutput;
	fn delegate_call(&mut self, caller: &Contract, address: H160, input: Vec<u8>, gas: u64) -> CallOutput;
	fn static_call(&mut self, caller: &Contract, address: H160, input: Vec<u8>, gas: u64) -> CallOutput;
	fn create(&mut self, caller: &Contract, init_code: Vec<u8>, gas: u64, value: U256) -> CreateOutput;
}

/// Executes the bytecode of a frame.
///
/// The returned result decides the fate of the frame: `Ok` keeps its state
/// changes, `Err(Reverted)` undoes them but keeps the unused gas, any other
/// error undoes them and consumes all gas of the frame.
#[auto_impl::auto_impl(&, Box)]
pub trait Interpreter {
	fn run(&self, handler: &mut dyn CallContext, contract: &mut Contract) -> (ExitResult, Vec<u8>);
}
