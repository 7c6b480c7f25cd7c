//! Allows to listen to engine events.

use primitive_types::{H160, U256};

use crate::{error::ExitResult, executor::CallScheme};

environmental::environmental!(listener: dyn EventListener + 'static);

pub trait EventListener {
	fn event(&mut self, event: Event);
}

#[derive(Debug, Copy, Clone)]
pub enum Event<'a> {
	Call {
		scheme: CallScheme,
		caller: H160,
		address: H160,
		value: U256,
		input: &'a [u8],
		gas: u64,
		is_static: bool,
	},
	Create {
		caller: H160,
		address: H160,
		value: U256,
		init_code: &'a [u8],
		gas: u64,
	},
	Suicide {
		address: H160,
		beneficiary: H160,
		balance: U256,
	},
	Exit {
		depth: usize,
		result: &'a ExitResult,
		output: &'a [u8],
		gas_left: u64,
	},
}

impl<'a> Event<'a> {
	pub(crate) fn emit(self) {
		listener::with(|listener| listener.event(self));
	}
}

/// Run closure with provided listener.
pub fn using<R, F: FnOnce() -> R>(new: &mut (dyn EventListener + 'static), f: F) -> R {
	listener::using(new, f)
}
