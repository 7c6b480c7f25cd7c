//! Run code against a throwaway in-memory state.
//!
//! Meant for tests and command line tools: every helper sets up a fresh
//! engine with the standard precompiles and the standard transfer rules.

use std::time::{SystemTime, UNIX_EPOCH};

use primitive_types::{H160, U256};

use crate::{
	backend::MemoryState,
	config::{self, ChainConfig},
	context::ExecutionContext,
	error::ExitResult,
	executor::{CallOutput, CreateOutput, Engine, Interpreter},
	precompile::StandardPrecompileSet,
	state::StateView,
};

/// Address `execute` installs its code at: "contract", right-aligned.
pub const CONTRACT_ADDRESS: H160 = H160([
	0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, b'c', b'o', b'n', b't', b'r', b'a', b'c', b't',
]);

/// Environment of the runtime helpers.
#[derive(Clone, Debug)]
pub struct Config {
	pub chain_config: ChainConfig,
	pub difficulty: U256,
	pub origin: H160,
	pub coinbase: H160,
	pub block_number: U256,
	pub time: U256,
	pub gas_limit: u64,
	pub gas_price: U256,
	pub value: U256,
	pub engine: config::Config,
}

impl Default for Config {
	fn default() -> Self {
		let time = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_secs())
			.unwrap_or_default();

		Self {
			chain_config: ChainConfig::byzantium(),
			difficulty: U256::zero(),
			origin: H160::zero(),
			coinbase: H160::zero(),
			block_number: U256::zero(),
			time: U256::from(time),
			gas_limit: u64::MAX,
			gas_price: U256::zero(),
			value: U256::zero(),
			engine: config::Config::default(),
		}
	}
}

/// Execution context described by `config`.
pub fn new_context(config: &Config) -> ExecutionContext {
	let mut context = ExecutionContext::new(config.origin, config.block_number);
	context.coinbase = config.coinbase;
	context.time = config.time;
	context.difficulty = config.difficulty;
	context.gas_limit = U256::from(config.gas_limit);
	context.gas_price = config.gas_price;
	context
}

/// Engine over `state` configured by `config`.
pub fn new_env<'a, I: Interpreter>(
	config: &'a Config,
	state: MemoryState,
	precompile_set: &'a StandardPrecompileSet,
	interpreter: &'a I,
) -> Engine<'a, 'a, MemoryState, StandardPrecompileSet, I> {
	Engine::new(
		new_context(config),
		state,
		&config.chain_config,
		&config.engine,
		precompile_set,
		interpreter,
	)
}

/// Install `code` at [`CONTRACT_ADDRESS`] in a fresh state and call it with
/// `input`. Returns the state afterwards.
pub fn execute<I: Interpreter>(
	config: &Config,
	interpreter: &I,
	code: Vec<u8>,
	input: Vec<u8>,
) -> (ExitResult, Vec<u8>, MemoryState) {
	let mut state = MemoryState::default();
	let prepared = state
		.create_account(CONTRACT_ADDRESS)
		.and_then(|()| state.set_code(CONTRACT_ADDRESS, code));
	if let Err(fault) = prepared {
		return (Err(fault.into()), Vec::new(), state);
	}

	let precompile_set = StandardPrecompileSet::new();
	let engine = new_env(config, state, &precompile_set, interpreter);
	let (output, state) = engine.transact_call(
		config.origin,
		CONTRACT_ADDRESS,
		input,
		config.gas_limit,
		config.value,
	);

	(output.result, output.output, state)
}

/// Run `init_code` as a creation by the configured origin.
pub fn create<I: Interpreter>(
	config: &Config,
	interpreter: &I,
	state: MemoryState,
	init_code: Vec<u8>,
) -> (CreateOutput, MemoryState) {
	let precompile_set = StandardPrecompileSet::new();
	let engine = new_env(config, state, &precompile_set, interpreter);
	engine.transact_create(config.origin, init_code, config.gas_limit, config.value)
}

/// Call the code at `address` as the configured origin.
pub fn call<I: Interpreter>(
	config: &Config,
	interpreter: &I,
	state: MemoryState,
	address: H160,
	input: Vec<u8>,
) -> (CallOutput, MemoryState) {
	let precompile_set = StandardPrecompileSet::new();
	let engine = new_env(config, state, &precompile_set, interpreter);
	engine.transact_call(config.origin, address, input, config.gas_limit, config.value)
}
