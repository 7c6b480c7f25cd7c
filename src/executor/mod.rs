//! # Engine
//!
//! The engine dispatches calls and creations: it enforces the call depth,
//! moves value, takes and reverts state snapshots and settles gas. Bytecode
//! is run by an [`Interpreter`], which reaches back into the engine through
//! [`CallContext`] for nested calls and state mutations.

mod engine;
mod handler;

pub use self::engine::{AbortHandle, Engine};
pub use self::handler::{CallContext, CallOutput, CallScheme, CreateOutput, Interpreter};
