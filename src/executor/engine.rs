use std::sync::{
	atomic::{AtomicBool, Ordering},
	Arc,
};

use primitive_types::{H160, H256, U256};

use super::handler::{CallContext, CallOutput, CallScheme, CreateOutput, Interpreter};
use crate::{
	config::{ChainConfig, Config, Rules},
	context::ExecutionContext,
	contract::{Contract, ContractRef},
	error::{ExitError, ExitException, ExitFatal, ExitResult, ExitSucceed, StateFault},
	gas::code_deposit_cost,
	precompile::{run_precompiled, PrecompileSet},
	state::{Log, Snapshot, StateView},
	utils::{create_address, keccak256, EMPTY_CODE_HASH},
};

/// Cancels a running engine from another thread.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}

/// Dispatcher for one message.
///
/// The engine owns the state view for the duration of the message and runs
/// the whole call tree synchronously, one native stack frame per call frame.
/// It must not be reused for another message; [`transact_call`] and
/// [`transact_create`] consume it.
///
/// [`transact_call`]: Engine::transact_call
/// [`transact_create`]: Engine::transact_create
pub struct Engine<'config, 'a, S, P, I> {
	context: ExecutionContext,
	state: S,
	chain_config: &'config ChainConfig,
	rules: Rules,
	config: &'config Config,
	precompile_set: &'a P,
	interpreter: &'a I,
	depth: usize,
	read_only: bool,
	abort: AbortHandle,
	fault: Option<StateFault>,
}

impl<'config, 'a, S: StateView, P: PrecompileSet, I: Interpreter> Engine<'config, 'a, S, P, I> {
	/// Create a new engine. Fork rules are fixed from the block number of
	/// `context`.
	pub fn new(
		context: ExecutionContext,
		state: S,
		chain_config: &'config ChainConfig,
		config: &'config Config,
		precompile_set: &'a P,
		interpreter: &'a I,
	) -> Self {
		let rules = chain_config.rules(context.block_number);

		Self {
			context,
			state,
			chain_config,
			rules,
			config,
			precompile_set,
			interpreter,
			depth: 0,
			read_only: false,
			abort: AbortHandle::default(),
			fault: None,
		}
	}

	pub fn context(&self) -> &ExecutionContext {
		&self.context
	}

	pub fn chain_config(&self) -> &'config ChainConfig {
		self.chain_config
	}

	pub fn rules(&self) -> &Rules {
		&self.rules
	}

	pub fn config(&self) -> &'config Config {
		self.config
	}

	pub fn state(&self) -> &S {
		&self.state
	}

	pub fn state_mut(&mut self) -> &mut S {
		&mut self.state
	}

	pub fn into_state(self) -> S {
		self.state
	}

	/// Handle to cancel this engine, usable from any thread.
	pub fn abort_handle(&self) -> AbortHandle {
		self.abort.clone()
	}

	pub fn cancel(&self) {
		self.abort.cancel();
	}

	/// Run a top-level call and return its outcome together with the state.
	pub fn transact_call(
		mut self,
		caller: H160,
		address: H160,
		input: Vec<u8>,
		gas: u64,
		value: U256,
	) -> (CallOutput, S) {
		let mut output = self.call(&caller, address, input, gas, value);
		if let Some(fault) = self.fault.take() {
			output = CallOutput {
				result: Err(ExitFatal::StateFault(fault).into()),
				output: Vec::new(),
				gas_left: 0,
			};
		}
		(output, self.state)
	}

	/// Run a top-level creation and return its outcome together with the
	/// state.
	pub fn transact_create(
		mut self,
		caller: H160,
		init_code: Vec<u8>,
		gas: u64,
		value: U256,
	) -> (CreateOutput, S) {
		let mut output = self.create(&caller, init_code, gas, value);
		if let Some(fault) = self.fault.take() {
			output.result = Err(ExitFatal::StateFault(fault).into());
			output.output = Vec::new();
			output.gas_left = 0;
		}
		(output, self.state)
	}

	/// Execute the code at `address` on behalf of `caller`, transferring
	/// `value` to it first.
	pub fn call(
		&mut self,
		caller: &dyn ContractRef,
		address: H160,
		input: Vec<u8>,
		gas: u64,
		value: U256,
	) -> CallOutput {
		self.call_inner(CallScheme::Call, caller, address, input, gas, value)
	}

	/// Execute the code at `address` on the account of `caller`.
	pub fn call_code(
		&mut self,
		caller: &dyn ContractRef,
		address: H160,
		input: Vec<u8>,
		gas: u64,
		value: U256,
	) -> CallOutput {
		self.call_inner(CallScheme::CallCode, caller, address, input, gas, value)
	}

	/// Execute the code at `address` in the frame of `caller`: same account,
	/// same caller and same value.
	pub fn delegate_call(
		&mut self,
		caller: &Contract,
		address: H160,
		input: Vec<u8>,
		gas: u64,
	) -> CallOutput {
		event!(Call {
			scheme: CallScheme::DelegateCall,
			caller: caller.address(),
			address,
			value: caller.value(),
			input: &input,
			gas,
			is_static: self.read_only,
		});

		if let Some((result, gas_left)) = self.check_entry(gas) {
			return self.exit_call(result, Vec::new(), gas_left);
		}
		if self.config.no_recursion && self.depth > 0 {
			return self.exit_call(Ok(ExitSucceed::Stopped), Vec::new(), gas);
		}

		let snapshot = self.state.snapshot();
		let mut contract = Contract::new(caller, caller.address(), U256::zero(), gas)
			.as_delegate(caller)
			.with_input(input);
		if let Err(e) = self.load_code(&mut contract, address) {
			self.state.revert_to_snapshot(snapshot);
			let e = self.fail(e.into());
			return self.exit_call(Err(e), Vec::new(), 0);
		}

		self.execute(snapshot, contract)
	}

	/// `call` without value. Any state mutation attempted below this frame
	/// fails with [`ExitException::WriteProtection`].
	pub fn static_call(
		&mut self,
		caller: &dyn ContractRef,
		address: H160,
		input: Vec<u8>,
		gas: u64,
	) -> CallOutput {
		// Only the frame that switched to read-only mode switches back.
		let entered_read_only = !self.read_only;
		self.read_only = true;

		let output = self.call_inner(
			CallScheme::StaticCall,
			caller,
			address,
			input,
			gas,
			U256::zero(),
		);

		if entered_read_only {
			self.read_only = false;
		}
		output
	}

	/// Deploy a new contract running `init_code`. Its address derives from
	/// the caller and the caller's nonce, which is bumped even if the
	/// creation fails.
	pub fn create(
		&mut self,
		caller: &dyn ContractRef,
		init_code: Vec<u8>,
		gas: u64,
		value: U256,
	) -> CreateOutput {
		let caller_address = caller.address();

		if let Some((result, gas_left)) = self.check_entry(gas) {
			return self.exit_create(result, Vec::new(), None, gas_left);
		}
		if self.read_only {
			return self.exit_create(
				Err(ExitException::WriteProtection.into()),
				Vec::new(),
				None,
				0,
			);
		}
		match self.can_transfer(caller_address, value) {
			Ok(()) => (),
			Err(e) => {
				let gas_left = if e.is_fatal() { 0 } else { gas };
				return self.exit_create(Err(e), Vec::new(), None, gas_left);
			}
		}

		let address = match self.bump_nonce(caller_address) {
			Ok(address) => address,
			Err(e) => {
				let e = self.fail(e);
				let gas_left = if e.is_fatal() { 0 } else { gas };
				return self.exit_create(Err(e), Vec::new(), None, gas_left);
			}
		};

		event!(Create {
			caller: caller_address,
			address,
			value,
			init_code: &init_code,
			gas,
		});

		match self.is_occupied(address) {
			Ok(false) => (),
			Ok(true) => {
				return self.exit_create(
					Err(ExitException::CreateCollision.into()),
					Vec::new(),
					Some(address),
					0,
				)
			}
			Err(fault) => {
				let e = self.fail(fault.into());
				return self.exit_create(Err(e), Vec::new(), Some(address), 0);
			}
		}

		let snapshot = self.state.snapshot();
		if let Err(fault) = self.enter_create(caller_address, address, value) {
			self.state.revert_to_snapshot(snapshot);
			let e = self.fail(fault.into());
			return self.exit_create(Err(e), Vec::new(), Some(address), 0);
		}

		if self.config.no_recursion && self.depth > 0 {
			self.state.commit_snapshot(snapshot);
			return self.exit_create(Ok(ExitSucceed::Stopped), Vec::new(), Some(address), gas);
		}

		let mut contract = Contract::new(caller, address, value, gas);
		contract.set_init_code(init_code);

		let (mut result, output) = self.run(&mut contract);
		if result.is_ok() {
			if let Err(e) = self.deposit_code(&mut contract, &output) {
				result = Err(e);
			}
		}

		log::debug!(target: "zvm", "Create execution using address {:?} at depth {}: {:?}", address, self.depth, result);

		let output = match &result {
			// Before Homestead the account stays, without code, and the
			// frame keeps its gas.
			Err(ExitError::Exception(ExitException::CodeStoreOutOfGas))
				if !self.rules.eip2_code_deposit_failure =>
			{
				self.state.commit_snapshot(snapshot);
				output
			}
			_ => self.settle(snapshot, &mut contract, &result, output),
		};

		self.exit_create(result, output, Some(address), contract.gas())
	}

	fn call_inner(
		&mut self,
		scheme: CallScheme,
		caller: &dyn ContractRef,
		address: H160,
		input: Vec<u8>,
		gas: u64,
		value: U256,
	) -> CallOutput {
		let caller_address = caller.address();

		event!(Call {
			scheme,
			caller: caller_address,
			address,
			value,
			input: &input,
			gas,
			is_static: self.read_only,
		});

		if let Some((result, gas_left)) = self.check_entry(gas) {
			return self.exit_call(result, Vec::new(), gas_left);
		}
		if self.config.no_recursion && self.depth > 0 {
			return self.exit_call(Ok(ExitSucceed::Stopped), Vec::new(), gas);
		}
		// CallCode moves value from the caller to itself.
		if self.read_only && scheme == CallScheme::Call && !value.is_zero() {
			return self.exit_call(Err(ExitException::WriteProtection.into()), Vec::new(), 0);
		}
		if let Err(e) = self.can_transfer(caller_address, value) {
			let gas_left = if e.is_fatal() { 0 } else { gas };
			return self.exit_call(Err(e), Vec::new(), gas_left);
		}

		let snapshot = self.state.snapshot();
		let contract = match self.enter_call(scheme, caller, address, value, gas) {
			Ok(Some(contract)) => contract.with_input(input),
			// Valueless call to a missing account.
			Ok(None) => {
				self.state.commit_snapshot(snapshot);
				return self.exit_call(Ok(ExitSucceed::Stopped), Vec::new(), gas);
			}
			Err(fault) => {
				self.state.revert_to_snapshot(snapshot);
				let e = self.fail(fault.into());
				return self.exit_call(Err(e), Vec::new(), 0);
			}
		};

		self.execute(snapshot, contract)
	}

	/// A latched fault or an exceeded depth rejects a frame before anything
	/// else happens.
	fn check_entry(&self, gas: u64) -> Option<(ExitResult, u64)> {
		if let Some(fault) = &self.fault {
			return Some((Err(ExitFatal::StateFault(fault.clone()).into()), 0));
		}
		if self.depth > self.config.call_stack_limit {
			return Some((Err(ExitException::CallTooDeep.into()), gas));
		}
		None
	}

	fn can_transfer(&mut self, from: H160, value: U256) -> Result<(), ExitError> {
		let can_transfer = self.context.can_transfer;
		match can_transfer(&self.state, from, value) {
			Ok(true) => Ok(()),
			Ok(false) => Err(ExitException::OutOfFund.into()),
			Err(fault) => Err(self.fail(fault.into())),
		}
	}

	/// Materialize the target if needed, move the value and build the
	/// frame. `None` means there is nothing to run.
	fn enter_call(
		&mut self,
		scheme: CallScheme,
		caller: &dyn ContractRef,
		address: H160,
		value: U256,
		gas: u64,
	) -> Result<Option<Contract>, StateFault> {
		let caller_address = caller.address();
		let target = match scheme {
			CallScheme::CallCode => caller_address,
			_ => address,
		};

		if scheme != CallScheme::CallCode && !self.state.exists(address)? {
			if !self.precompile_set.is_precompile(&self.rules, address)
				&& self.rules.is_eip158
				&& value.is_zero()
			{
				return Ok(None);
			}
			self.state.create_account(address)?;
		}

		let transfer = self.context.transfer;
		transfer(&mut self.state, caller_address, target, value)?;

		let mut contract = Contract::new(caller, target, value, gas);
		self.load_code(&mut contract, address)?;
		Ok(Some(contract))
	}

	fn load_code(&self, contract: &mut Contract, address: H160) -> Result<(), StateFault> {
		let code_hash = self.state.code_hash(address)?;
		let code = self.state.code(address)?;
		contract.set_call_code(address, code_hash, code);
		Ok(())
	}

	/// Derive the address of a new contract and bump the creator's nonce.
	fn bump_nonce(&mut self, caller: H160) -> Result<H160, ExitError> {
		let nonce = self.state.nonce(caller)?;
		if nonce == u64::MAX {
			return Err(ExitException::MaxNonce.into());
		}
		self.state.set_nonce(caller, nonce + 1)?;
		Ok(create_address(caller, nonce))
	}

	fn is_occupied(&self, address: H160) -> Result<bool, StateFault> {
		let code_hash = self.state.code_hash(address)?;
		Ok(self.state.nonce(address)? != 0
			|| (code_hash != H256::zero() && code_hash != EMPTY_CODE_HASH))
	}

	fn enter_create(&mut self, caller: H160, address: H160, value: U256) -> Result<(), StateFault> {
		self.state.create_account(address)?;
		if self.rules.is_eip158 {
			self.state.set_nonce(address, 1)?;
		}
		let transfer = self.context.transfer;
		transfer(&mut self.state, caller, address, value)
	}

	/// Check the size of the deployed code, charge for it and store it.
	fn deposit_code(&mut self, contract: &mut Contract, code: &[u8]) -> Result<(), ExitError> {
		if let Some(limit) = self.rules.max_code_size {
			if code.len() > limit {
				return Err(ExitException::CreateContractLimit.into());
			}
		}

		let cost = code_deposit_cost(code.len());
		if contract.gas() < cost {
			return Err(ExitException::CodeStoreOutOfGas.into());
		}
		contract.use_gas(cost)?;
		self.state.set_code(contract.address(), code.to_vec())?;
		Ok(())
	}

	/// Run the frame on its precompile if there is one, on the interpreter
	/// otherwise.
	fn run(&mut self, contract: &mut Contract) -> (ExitResult, Vec<u8>) {
		let precompile_set = self.precompile_set;
		if let Some(code_address) = contract.code_address {
			if let Some(precompile) = precompile_set.get(&self.rules, code_address) {
				return run_precompiled(precompile, contract);
			}
		}
		if contract.code.is_empty() {
			return (Ok(ExitSucceed::Stopped), Vec::new());
		}

		let interpreter = self.interpreter;
		self.depth += 1;
		let (result, output) = interpreter.run(self, contract);
		self.depth -= 1;

		// A fault below this frame fails it even if the interpreter went on.
		match (&self.fault, result) {
			(Some(fault), Ok(_)) => (Err(ExitFatal::StateFault(fault.clone()).into()), output),
			(_, result) => (result, output),
		}
	}

	fn execute(&mut self, snapshot: Snapshot, mut contract: Contract) -> CallOutput {
		let (result, output) = self.run(&mut contract);

		log::debug!(target: "zvm", "Call execution using address {:?} at depth {}: {:?}", contract.address(), self.depth, result);

		let output = self.settle(snapshot, &mut contract, &result, output);
		self.exit_call(result, output, contract.gas())
	}

	/// Commit a successful frame, undo a failed one. Everything but an
	/// explicit revert also takes the remaining gas.
	fn settle(
		&mut self,
		snapshot: Snapshot,
		contract: &mut Contract,
		result: &ExitResult,
		output: Vec<u8>,
	) -> Vec<u8> {
		match result {
			Ok(_) => {
				self.state.commit_snapshot(snapshot);
				output
			}
			Err(ExitError::Reverted) => {
				self.state.revert_to_snapshot(snapshot);
				output
			}
			Err(e) => {
				self.state.revert_to_snapshot(snapshot);
				contract.use_all_gas();
				self.fail(e.clone());
				Vec::new()
			}
		}
	}

	/// Latch state faults; every later frame fails with the first one.
	fn fail(&mut self, error: ExitError) -> ExitError {
		if let ExitError::Fatal(ExitFatal::StateFault(fault)) = &error {
			if self.fault.is_none() {
				log::warn!(target: "zvm", "Aborting execution at depth {}: {}", self.depth, fault);
				self.fault = Some(fault.clone());
			}
		}
		error
	}

	fn exit_call(&self, result: ExitResult, output: Vec<u8>, gas_left: u64) -> CallOutput {
		event!(Exit {
			depth: self.depth,
			result: &result,
			output: &output,
			gas_left,
		});

		CallOutput {
			result,
			output,
			gas_left,
		}
	}

	fn exit_create(
		&self,
		result: ExitResult,
		output: Vec<u8>,
		address: Option<H160>,
		gas_left: u64,
	) -> CreateOutput {
		event!(Exit {
			depth: self.depth,
			result: &result,
			output: &output,
			gas_left,
		});

		CreateOutput {
			result,
			output,
			address,
			gas_left,
		}
	}

	fn guard_write(&self) -> Result<(), ExitError> {
		if self.read_only {
			return Err(ExitException::WriteProtection.into());
		}
		Ok(())
	}
}

impl<'config, 'a, S: StateView, P: PrecompileSet, I: Interpreter> CallContext
	for Engine<'config, 'a, S, P, I>
{
	fn state(&self) -> &dyn StateView {
		&self.state
	}

	fn context(&self) -> &ExecutionContext {
		&self.context
	}

	fn rules(&self) -> &Rules {
		&self.rules
	}

	fn depth(&self) -> usize {
		self.depth
	}

	fn is_read_only(&self) -> bool {
		self.read_only
	}

	fn is_aborted(&self) -> bool {
		self.fault.is_some() || self.abort.is_cancelled()
	}

	fn set_storage(&mut self, address: H160, key: H256, value: H256) -> Result<(), ExitError> {
		self.guard_write()?;
		match self.state.set_storage(address, key, value) {
			Ok(()) => Ok(()),
			Err(fault) => Err(self.fail(fault.into())),
		}
	}

	fn log(&mut self, log: Log) -> Result<(), ExitError> {
		self.guard_write()?;
		self.state.log(log);
		Ok(())
	}

	fn mark_delete(&mut self, address: H160, beneficiary: H160) -> Result<(), ExitError> {
		self.guard_write()?;

		let result = self.state.balance(address).and_then(|balance| {
			event!(Suicide {
				address,
				beneficiary,
				balance,
			});
			self.state.add_balance(beneficiary, balance)?;
			self.state.suicide(address).map(|_| ())
		});
		match result {
			Ok(()) => Ok(()),
			Err(fault) => Err(self.fail(fault.into())),
		}
	}

	fn add_refund(&mut self, gas: u64) {
		self.state.add_refund(gas);
	}

	fn add_preimage(&mut self, hash: H256, preimage: Vec<u8>) {
		if self.config.enable_preimage_recording {
			debug_assert_eq!(keccak256(&preimage), hash);
			self.state.add_preimage(hash, preimage);
		}
	}

	fn call(
		&mut self,
		caller: &Contract,
		address: H160,
		input: Vec<u8>,
		gas: u64,
		value: U256,
	) -> CallOutput {
		Self::call(self, caller, address, input, gas, value)
	}

	fn call_code(
		&mut self,
		caller: &Contract,
		address: H160,
		input: Vec<u8>,
		gas: u64,
		value: U256,
	) -> CallOutput {
		Self::call_code(self, caller, address, input, gas, value)
	}

	fn delegate_call(&mut self, caller: &Contract, address: H160, input: Vec<u8>, gas: u64) -> CallOutput {
		Self::delegate_call(self, caller, address, input, gas)
	}

	fn static_call(&mut self, caller: &Contract, address: H160, input: Vec<u8>, gas: u64) -> CallOutput {
		Self::static_call(self, caller, address, input, gas)
	}

	fn create(&mut self, caller: &Contract, init_code: Vec<u8>, gas: u64, value: U256) -> CreateOutput {
		Self::create(self, caller, init_code, gas, value)
	}
}
