//! Gas constants shared by the engine and interpreters.

use crate::{config::Rules, error::ExitException};

/// Maximum depth of call/create stack.
pub const CALL_CREATE_DEPTH: usize = 1024;
/// Maximum bytecode to permit for a contract (EIP-170).
pub const MAX_CODE_SIZE: usize = 24576;
/// Gas paid per byte of deployed code.
pub const CREATE_DATA_GAS: u64 = 200;
/// Free gas given at the beginning of a call with value.
pub const CALL_STIPEND: u64 = 2300;

/// All but one 64th of `gas`.
fn l64(gas: u64) -> u64 {
	gas - gas / 64
}

/// Gas forwarded to a child call.
///
/// `available` is the frame's gas before the call, `base` the already
/// computed cost of the call itself and `requested` the gas argument of the
/// call. From EIP-150 on the forwarded gas is capped at all but one 64th of
/// what remains after `base`; before that the full request must be
/// affordable.
pub fn call_gas(
	rules: &Rules,
	available: u64,
	base: u64,
	requested: u64,
) -> Result<u64, ExitException> {
	if rules.is_eip150 {
		let available = available.checked_sub(base).ok_or(ExitException::OutOfGas)?;
		return Ok(requested.min(l64(available)));
	}

	if requested > available.saturating_sub(base) {
		return Err(ExitException::OutOfGas);
	}
	Ok(requested)
}

/// Cost of storing `len` bytes of deployed code.
pub fn code_deposit_cost(len: usize) -> u64 {
	(len as u64).saturating_mul(CREATE_DATA_GAS)
}
