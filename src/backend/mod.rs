//! # State backends
//!
//! Backends implement [`StateView`](crate::StateView) on top of a concrete
//! store. The trie-backed store of a full node lives outside this crate;
//! [`MemoryState`] keeps everything in memory and is used by the runtime
//! helpers and by tests.

mod memory;

pub use self::memory::{MemoryAccount, MemoryState};
