//! Fork schedule, per-block rules and engine options.

use primitive_types::U256;

use crate::gas::{CALL_CREATE_DEPTH, MAX_CODE_SIZE};

/// Fork activation schedule of a chain. `None` means never activated.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
pub struct ChainConfig {
	/// Chain ID used for replay protection.
	pub chain_id: u64,
	/// Homestead switch block.
	pub homestead_block: Option<u64>,
	/// EIP-150 (gas repricing) switch block.
	pub eip150_block: Option<u64>,
	/// EIP-155 (replay protection) switch block.
	pub eip155_block: Option<u64>,
	/// EIP-158 (state clearing) switch block.
	pub eip158_block: Option<u64>,
	/// Byzantium switch block.
	pub byzantium_block: Option<u64>,
}

fn is_forked(fork: Option<u64>, number: U256) -> bool {
	match fork {
		Some(fork) => number >= U256::from(fork),
		None => false,
	}
}

impl ChainConfig {
	/// Frontier rules only.
	pub const fn frontier() -> ChainConfig {
		ChainConfig {
			chain_id: 1,
			homestead_block: None,
			eip150_block: None,
			eip155_block: None,
			eip158_block: None,
			byzantium_block: None,
		}
	}

	/// Homestead from genesis.
	pub const fn homestead() -> ChainConfig {
		let mut config = Self::frontier();
		config.homestead_block = Some(0);
		config
	}

	/// Every known fork from genesis.
	pub const fn byzantium() -> ChainConfig {
		let mut config = Self::homestead();
		config.eip150_block = Some(0);
		config.eip155_block = Some(0);
		config.eip158_block = Some(0);
		config.byzantium_block = Some(0);
		config
	}

	/// Ethereum mainnet schedule.
	pub const fn mainnet() -> ChainConfig {
		ChainConfig {
			chain_id: 1,
			homestead_block: Some(1_150_000),
			eip150_block: Some(2_463_000),
			eip155_block: Some(2_675_000),
			eip158_block: Some(2_675_000),
			byzantium_block: Some(4_370_000),
		}
	}

	/// Parse a chain config from a YAML document.
	#[cfg(feature = "with-serde")]
	pub fn from_yaml(source: &str) -> Result<ChainConfig, serde_yaml::Error> {
		serde_yaml::from_str(source)
	}

	pub fn is_homestead(&self, number: U256) -> bool {
		is_forked(self.homestead_block, number)
	}

	pub fn is_eip150(&self, number: U256) -> bool {
		is_forked(self.eip150_block, number)
	}

	pub fn is_eip155(&self, number: U256) -> bool {
		is_forked(self.eip155_block, number)
	}

	pub fn is_eip158(&self, number: U256) -> bool {
		is_forked(self.eip158_block, number)
	}

	pub fn is_byzantium(&self, number: U256) -> bool {
		is_forked(self.byzantium_block, number)
	}

	/// Switches active at block `number`.
	pub fn rules(&self, number: U256) -> Rules {
		let is_homestead = self.is_homestead(number);
		let is_eip158 = self.is_eip158(number);

		Rules {
			chain_id: self.chain_id,
			is_homestead,
			is_eip150: self.is_eip150(number),
			is_eip155: self.is_eip155(number),
			is_eip158,
			is_byzantium: self.is_byzantium(number),
			max_code_size: if is_eip158 { Some(MAX_CODE_SIZE) } else { None },
			eip2_code_deposit_failure: is_homestead,
		}
	}
}

/// Protocol switches for one execution. Computed once from the chain
/// config and the block number, read-only afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rules {
	pub chain_id: u64,
	pub is_homestead: bool,
	/// All-but-one-64th call gas.
	pub is_eip150: bool,
	pub is_eip155: bool,
	/// Empty accounts are pruned. Calls without value to missing accounts
	/// are free and created contracts start at nonce 1.
	pub is_eip158: bool,
	/// Selects the Byzantium precompile table.
	pub is_byzantium: bool,
	/// Maximum size of deployed code (EIP-170).
	pub max_code_size: Option<usize>,
	/// Running out of gas while paying for deployed code fails the
	/// creation (revert, consume gas). Otherwise the account is kept without
	/// code and the remaining gas is returned.
	pub eip2_code_deposit_failure: bool,
}

/// Engine options.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
pub struct Config {
	/// Debugging aid: nested calls and creates return immediately without
	/// running code.
	pub no_recursion: bool,
	/// Maximum call depth.
	pub call_stack_limit: usize,
	/// Record SHA3 preimages in the state.
	pub enable_preimage_recording: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			no_recursion: false,
			call_stack_limit: CALL_CREATE_DEPTH,
			enable_preimage_recording: false,
		}
	}
}
