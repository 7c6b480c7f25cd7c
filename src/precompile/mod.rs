//! # Precompiled contracts
//!
//! Native implementations of the contracts at the low addresses. Which
//! addresses are active depends on the fork: Homestead knows 1 to 4,
//! Byzantium adds 5 to 8.

mod bn128;
mod modexp;
mod simple;

use std::borrow::Cow;
use std::collections::BTreeMap;

use primitive_types::H160;

use crate::{
	config::Rules,
	contract::Contract,
	error::{ExitError, ExitException, ExitResult, ExitSucceed},
};

pub use self::{
	bn128::{Bn128Add, Bn128Mul, Bn128Pairing},
	modexp::Modexp,
	simple::{ECRecover, Identity, Ripemd160, Sha256},
};

/// A natively implemented contract.
pub trait Precompile {
	/// Gas charged for running on `input`. Pure function of the input.
	fn required_gas(&self, input: &[u8]) -> u64;
	/// Compute the output. Errors consume all gas of the frame.
	fn run(&self, input: &[u8]) -> Result<Vec<u8>, ExitError>;
}

/// Lookup of precompiled contracts by address.
pub trait PrecompileSet {
	fn get(&self, rules: &Rules, address: H160) -> Option<&dyn Precompile>;

	fn is_precompile(&self, rules: &Rules, address: H160) -> bool {
		self.get(rules, address).is_some()
	}
}

impl PrecompileSet for () {
	fn get(&self, _rules: &Rules, _address: H160) -> Option<&dyn Precompile> {
		None
	}
}

/// Charge the gas `precompile` requires on `contract.input` and run it.
pub fn run_precompiled(precompile: &dyn Precompile, contract: &mut Contract) -> (ExitResult, Vec<u8>) {
	let gas = precompile.required_gas(&contract.input);
	if let Err(e) = contract.use_gas(gas) {
		return (Err(e.into()), Vec::new());
	}

	match precompile.run(&contract.input) {
		Ok(output) => (Ok(ExitSucceed::Returned), output),
		Err(e) => (Err(e), Vec::new()),
	}
}

/// The standard precompile tables of Homestead and Byzantium.
pub struct StandardPrecompileSet {
	homestead: BTreeMap<H160, Box<dyn Precompile + Send + Sync>>,
	byzantium: BTreeMap<H160, Box<dyn Precompile + Send + Sync>>,
}

impl Default for StandardPrecompileSet {
	fn default() -> Self {
		Self::new()
	}
}

impl StandardPrecompileSet {
	pub fn new() -> Self {
		let mut homestead: BTreeMap<H160, Box<dyn Precompile + Send + Sync>> = BTreeMap::new();
		homestead.insert(address(1), Box::new(ECRecover));
		homestead.insert(address(2), Box::new(Sha256));
		homestead.insert(address(3), Box::new(Ripemd160));
		homestead.insert(address(4), Box::new(Identity));

		let mut byzantium: BTreeMap<H160, Box<dyn Precompile + Send + Sync>> = BTreeMap::new();
		byzantium.insert(address(1), Box::new(ECRecover));
		byzantium.insert(address(2), Box::new(Sha256));
		byzantium.insert(address(3), Box::new(Ripemd160));
		byzantium.insert(address(4), Box::new(Identity));
		byzantium.insert(address(5), Box::new(Modexp));
		byzantium.insert(address(6), Box::new(Bn128Add));
		byzantium.insert(address(7), Box::new(Bn128Mul));
		byzantium.insert(address(8), Box::new(Bn128Pairing));

		Self {
			homestead,
			byzantium,
		}
	}

	/// Addresses active under `rules`.
	pub fn addresses(&self, rules: &Rules) -> Vec<H160> {
		self.table(rules).keys().copied().collect()
	}

	fn table(&self, rules: &Rules) -> &BTreeMap<H160, Box<dyn Precompile + Send + Sync>> {
		if rules.is_byzantium {
			&self.byzantium
		} else {
			&self.homestead
		}
	}
}

impl PrecompileSet for StandardPrecompileSet {
	fn get(&self, rules: &Rules, address: H160) -> Option<&dyn Precompile> {
		self.table(rules)
			.get(&address)
			.map(|p| p.as_ref() as &dyn Precompile)
	}
}

/// `base + word * ceil(len / 32)`, saturating.
fn linear_cost(len: usize, base: u64, word: u64) -> u64 {
	let words = (len as u64).saturating_add(31) / 32;
	base.saturating_add(word.saturating_mul(words))
}

fn invalid_input(msg: &'static str) -> ExitError {
	ExitException::Other(Cow::Borrowed(msg)).into()
}

/// Right-pads `data` with zeroes to `LEN` bytes, truncating longer input.
fn right_pad<const LEN: usize>(data: &[u8]) -> Cow<'_, [u8; LEN]> {
	match data.get(..LEN).and_then(|data| <&[u8; LEN]>::try_from(data).ok()) {
		Some(data) => Cow::Borrowed(data),
		None => {
			let mut padded = [0; LEN];
			padded[..data.len()].copy_from_slice(data);
			Cow::Owned(padded)
		}
	}
}

const fn address(last: u8) -> H160 {
	H160([
		0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, last,
	])
}
