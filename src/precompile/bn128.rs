use bn::{AffineG1, AffineG2, Fq, Fq2, Group, Gt, G1, G2};

use super::{invalid_input, right_pad, Precompile};
use crate::error::ExitError;

/// Number of bytes of an Fq element.
const FQ_LEN: usize = 32;
/// Number of bytes of an Fr element.
const SCALAR_LEN: usize = 32;
/// An Fq2 element is two Fq elements.
const FQ2_LEN: usize = 2 * FQ_LEN;
/// A G1 point is two Fq elements.
const G1_LEN: usize = 2 * FQ_LEN;
/// A G2 point is two Fq2 elements.
const G2_LEN: usize = 2 * FQ2_LEN;

/// `ADD` takes two uncompressed G1 points.
const ADD_INPUT_LEN: usize = 2 * G1_LEN;
/// `MUL` takes an uncompressed G1 point and a scalar.
const MUL_INPUT_LEN: usize = G1_LEN + SCALAR_LEN;
/// `PAIR` elements are a G1 point followed by a G2 point.
const PAIR_ELEMENT_LEN: usize = G1_LEN + G2_LEN;

const ADD_GAS: u64 = 500;
const MUL_GAS: u64 = 40_000;
const PAIR_BASE_GAS: u64 = 100_000;
const PAIR_PER_POINT_GAS: u64 = 80_000;

/// Point addition on alt_bn128 at address 6 (EIP-196).
pub struct Bn128Add;

impl Precompile for Bn128Add {
	fn required_gas(&self, _input: &[u8]) -> u64 {
		ADD_GAS
	}

	fn run(&self, input: &[u8]) -> Result<Vec<u8>, ExitError> {
		let input = right_pad::<ADD_INPUT_LEN>(input);

		let p1 = read_g1_point(&input[..G1_LEN])?;
		let p2 = read_g1_point(&input[G1_LEN..])?;
		encode_g1_point(p1 + p2)
	}
}

/// Scalar multiplication on alt_bn128 at address 7 (EIP-196).
pub struct Bn128Mul;

impl Precompile for Bn128Mul {
	fn required_gas(&self, _input: &[u8]) -> u64 {
		MUL_GAS
	}

	fn run(&self, input: &[u8]) -> Result<Vec<u8>, ExitError> {
		let input = right_pad::<MUL_INPUT_LEN>(input);

		let p = read_g1_point(&input[..G1_LEN])?;
		// Scalars need not be canonical.
		let fr = bn::Fr::from_slice(&input[G1_LEN..G1_LEN + SCALAR_LEN])
			.map_err(|_| invalid_input("bn256: invalid scalar"))?;
		encode_g1_point(p * fr)
	}
}

/// Pairing check on alt_bn128 at address 8 (EIP-197).
pub struct Bn128Pairing;

impl Precompile for Bn128Pairing {
	fn required_gas(&self, input: &[u8]) -> u64 {
		let pairs = (input.len() / PAIR_ELEMENT_LEN) as u64;
		PAIR_BASE_GAS.saturating_add(PAIR_PER_POINT_GAS.saturating_mul(pairs))
	}

	fn run(&self, input: &[u8]) -> Result<Vec<u8>, ExitError> {
		if input.len() % PAIR_ELEMENT_LEN != 0 {
			return Err(invalid_input("bn256: bad pairing input"));
		}

		let mut pairs = Vec::with_capacity(input.len() / PAIR_ELEMENT_LEN);
		for element in input.chunks_exact(PAIR_ELEMENT_LEN) {
			let g1 = read_g1_point(&element[..G1_LEN])?;
			let g2 = read_g2_point(&element[G1_LEN..])?;

			// Pairs with the point at infinity do not change the product.
			if !g1.is_zero() && !g2.is_zero() {
				pairs.push((g1, g2));
			}
		}

		let success = pairs.is_empty() || bn::pairing_batch(&pairs) == Gt::one();

		let mut output = vec![0u8; 32];
		if success {
			output[31] = 1;
		}
		Ok(output)
	}
}

fn read_fq(input: &[u8]) -> Result<Fq, ExitError> {
	Fq::from_slice(&input[..FQ_LEN]).map_err(|_| invalid_input("bn256: invalid field element"))
}

/// The imaginary part comes first in the encoding.
fn read_fq2(input: &[u8]) -> Result<Fq2, ExitError> {
	let y = read_fq(&input[..FQ_LEN])?;
	let x = read_fq(&input[FQ_LEN..2 * FQ_LEN])?;
	Ok(Fq2::new(x, y))
}

/// (0, 0) encodes the point at infinity, which `AffineG1` cannot hold.
fn read_g1_point(input: &[u8]) -> Result<G1, ExitError> {
	let px = read_fq(&input[0..FQ_LEN])?;
	let py = read_fq(&input[FQ_LEN..2 * FQ_LEN])?;

	if px == Fq::zero() && py == Fq::zero() {
		Ok(G1::zero())
	} else {
		AffineG1::new(px, py)
			.map(Into::into)
			.map_err(|_| invalid_input("bn256: point not on curve"))
	}
}

fn read_g2_point(input: &[u8]) -> Result<G2, ExitError> {
	let x = read_fq2(&input[0..FQ2_LEN])?;
	let y = read_fq2(&input[FQ2_LEN..2 * FQ2_LEN])?;

	if x.is_zero() && y.is_zero() {
		Ok(G2::zero())
	} else {
		AffineG2::new(x, y)
			.map(Into::into)
			.map_err(|_| invalid_input("bn256: point not on curve"))
	}
}

/// Affine big-endian encoding; all zeroes for the point at infinity.
fn encode_g1_point(point: G1) -> Result<Vec<u8>, ExitError> {
	let mut output = vec![0u8; G1_LEN];

	if let Some(affine) = AffineG1::from_jacobian(point) {
		affine
			.x()
			.to_big_endian(&mut output[..FQ_LEN])
			.map_err(|_| invalid_input("bn256: cannot encode point"))?;
		affine
			.y()
			.to_big_endian(&mut output[FQ_LEN..])
			.map_err(|_| invalid_input("bn256: cannot encode point"))?;
	}

	Ok(output)
}
