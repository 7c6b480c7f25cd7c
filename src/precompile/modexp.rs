use std::borrow::Cow;
use std::cmp::{max, min};

use primitive_types::U256;

use super::{right_pad, Precompile};
use crate::error::ExitError;

/// Big integer modular exponentiation at address 5 (EIP-198).
///
/// The input is `<len(B)> <len(E)> <len(M)> <B> <E> <M>`, every length a
/// 32-byte big-endian word. Missing bytes read as zero.
pub struct Modexp;

const HEADER_LENGTH: usize = 96;
const GAS_DIVISOR: u64 = 20;

struct Header {
	base_len: U256,
	exp_len: U256,
	mod_len: U256,
}

impl Header {
	fn parse(input: &[u8]) -> Self {
		Self {
			base_len: word_at(input, 0),
			exp_len: word_at(input, 32),
			mod_len: word_at(input, 64),
		}
	}
}

fn word_at(input: &[u8], offset: usize) -> U256 {
	U256::from_big_endian(&right_pad::<32>(input.get(offset..).unwrap_or_default())[..])
}

/// Complexity of multiplying two numbers of `x` bytes.
fn mult_complexity(x: u64) -> U256 {
	if x <= 64 {
		U256::from(x * x)
	} else if x <= 1_024 {
		U256::from(x * x / 4 + 96 * x - 3_072)
	} else {
		let x = U256::from(x);
		x * x / U256::from(16) + U256::from(480) * x - U256::from(199_680)
	}
}

/// Number of squarings, from the exponent length and its leading word.
fn adjusted_exp_len(exp_len: u64, exp_head: &U256) -> u64 {
	let head_bits = exp_head.bits() as u64;
	if exp_len <= 32 {
		head_bits.saturating_sub(1)
	} else {
		8u64.saturating_mul(exp_len - 32)
			.saturating_add(head_bits.saturating_sub(1))
	}
}

fn modexp(base: &[u8], exponent: &[u8], modulus: &[u8]) -> Vec<u8> {
	aurora_engine_modexp::modexp(base, exponent, modulus)
}

/// Right-pads `data` with zeroes to `len` bytes, truncating longer input.
fn right_pad_vec(data: &[u8], len: usize) -> Cow<'_, [u8]> {
	if let Some(data) = data.get(..len) {
		Cow::Borrowed(data)
	} else {
		let mut padded = vec![0; len];
		padded[..data.len()].copy_from_slice(data);
		Cow::Owned(padded)
	}
}

fn left_pad_vec(data: &[u8], len: usize) -> Vec<u8> {
	if data.len() >= len {
		return data[data.len() - len..].to_vec();
	}
	let mut padded = vec![0; len];
	padded[len - data.len()..].copy_from_slice(data);
	padded
}

impl Precompile for Modexp {
	fn required_gas(&self, input: &[u8]) -> u64 {
		let header = Header::parse(input);

		if header.base_len > U256::from(u64::MAX) || header.mod_len > U256::from(u64::MAX) {
			return u64::MAX;
		}
		let base_len = header.base_len.as_u64();
		let mod_len = header.mod_len.as_u64();
		let exp_len = if header.exp_len > U256::from(u64::MAX) {
			u64::MAX
		} else {
			header.exp_len.as_u64()
		};

		// Leading word of the exponent, or less if the exponent is shorter.
		let exp_head = {
			let body = input.get(HEADER_LENGTH..).unwrap_or_default();
			let start = usize::try_from(base_len).unwrap_or(usize::MAX);
			let head_len = min(exp_len, 32) as usize;
			let padded = right_pad::<32>(body.get(start..).unwrap_or_default());
			let mut word = [0u8; 32];
			word[32 - head_len..].copy_from_slice(&padded[..head_len]);
			U256::from_big_endian(&word)
		};

		let complexity = mult_complexity(max(base_len, mod_len));
		let iterations = max(adjusted_exp_len(exp_len, &exp_head), 1);
		let gas = complexity.saturating_mul(U256::from(iterations)) / U256::from(GAS_DIVISOR);

		if gas > U256::from(u64::MAX) {
			u64::MAX
		} else {
			gas.as_u64()
		}
	}

	fn run(&self, input: &[u8]) -> Result<Vec<u8>, ExitError> {
		let header = Header::parse(input);
		let too_large = || super::invalid_input("modexp: input too large");

		let base_len = usize::try_from(header.base_len).map_err(|_| too_large())?;
		let mod_len = usize::try_from(header.mod_len).map_err(|_| too_large())?;
		if base_len == 0 && mod_len == 0 {
			return Ok(Vec::new());
		}
		let exp_len = usize::try_from(header.exp_len).map_err(|_| too_large())?;

		let body = input.get(HEADER_LENGTH..).unwrap_or_default();
		let body_len = base_len
			.checked_add(exp_len)
			.and_then(|len| len.checked_add(mod_len))
			.ok_or_else(too_large)?;
		let body = right_pad_vec(body, body_len);
		let (base, rest) = body.split_at(base_len);
		let (exponent, modulus) = rest.split_at(exp_len);

		Ok(left_pad_vec(&modexp(base, exponent, modulus), mod_len))
	}
}
