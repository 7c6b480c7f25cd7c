//! Contract execution engine for an Ethereum-family node.
//!
//! The [`Engine`] dispatches `CALL`, `CALLCODE`, `DELEGATECALL`,
//! `STATICCALL` and `CREATE`: it limits the call depth, moves value,
//! snapshots and reverts the [`StateView`] around every frame and settles
//! gas. Bytecode is run by a pluggable [`Interpreter`]; precompiled
//! contracts are looked up in a fork-dependent [`PrecompileSet`].

#![forbid(unsafe_code)]

#[cfg(feature = "tracing")]
pub mod tracing;

#[cfg(feature = "tracing")]
macro_rules! event {
	($x:expr) => {{
		use crate::tracing::Event::*;
		$x.emit();
	}};
}

#[cfg(not(feature = "tracing"))]
macro_rules! event {
	($x:expr) => {};
}

pub mod backend;
pub mod config;
pub mod context;
pub mod contract;
pub mod error;
pub mod executor;
pub mod gas;
pub mod precompile;
pub mod runtime;
pub mod state;
pub mod utils;

pub use crate::{
	backend::{MemoryAccount, MemoryState},
	config::{ChainConfig, Config, Rules},
	context::ExecutionContext,
	contract::{Contract, ContractRef},
	error::{ExitError, ExitException, ExitFatal, ExitResult, ExitSucceed, StateFault, StateResult},
	executor::{
		AbortHandle, CallContext, CallOutput, CallScheme, CreateOutput, Engine, Interpreter,
	},
	precompile::{Precompile, PrecompileSet, StandardPrecompileSet},
	state::{Log, Snapshot, StateView},
};
