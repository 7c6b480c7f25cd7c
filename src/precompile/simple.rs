use std::cmp::min;

use k256::{
	ecdsa::{RecoveryId, Signature, VerifyingKey},
	elliptic_curve::sec1::ToEncodedPoint,
};
use primitive_types::H256;
use sha3::{Digest, Keccak256};

use super::{linear_cost, Precompile};
use crate::error::ExitError;

/// Signer recovery at address 1.
pub struct ECRecover;

impl ECRecover {
	fn recover(input: &[u8; 128]) -> Option<H256> {
		let msg = &input[0..32];
		let recid = RecoveryId::from_byte(input[63] - 27)?;
		let sig = Signature::from_slice(&input[64..128]).ok()?;

		// High s values are valid here. Recover with the mirrored signature,
		// which flips the parity of the point.
		let (sig, recid) = match sig.normalize_s() {
			Some(normalized) => (
				normalized,
				RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced()),
			),
			None => (sig, recid),
		};

		let pubkey = VerifyingKey::recover_from_prehash(msg, &sig, recid).ok()?;
		let encoded = pubkey.as_affine().to_encoded_point(false);
		let mut address = H256::from_slice(Keccak256::digest(&encoded.as_bytes()[1..]).as_slice());
		address.0[0..12].copy_from_slice(&[0u8; 12]);
		Some(address)
	}
}

impl Precompile for ECRecover {
	fn required_gas(&self, _input: &[u8]) -> u64 {
		3000
	}

	fn run(&self, i: &[u8]) -> Result<Vec<u8>, ExitError> {
		let mut input = [0u8; 128];
		input[..min(i.len(), 128)].copy_from_slice(&i[..min(i.len(), 128)]);

		// v is a full word that must be 27 or 28.
		if input[32..63] != [0u8; 31] || ![27, 28].contains(&input[63]) {
			return Ok(Vec::new());
		}

		Ok(Self::recover(&input)
			.map(|address| address.0.to_vec())
			.unwrap_or_default())
	}
}

/// SHA-256 at address 2.
pub struct Sha256;

impl Precompile for Sha256 {
	fn required_gas(&self, input: &[u8]) -> u64 {
		linear_cost(input.len(), 60, 12)
	}

	fn run(&self, input: &[u8]) -> Result<Vec<u8>, ExitError> {
		Ok(sha2::Sha256::digest(input).to_vec())
	}
}

/// RIPEMD-160 at address 3. The digest is left-padded to a full word.
pub struct Ripemd160;

impl Precompile for Ripemd160 {
	fn required_gas(&self, input: &[u8]) -> u64 {
		linear_cost(input.len(), 600, 120)
	}

	fn run(&self, input: &[u8]) -> Result<Vec<u8>, ExitError> {
		let mut ret = [0u8; 32];
		let hash = ripemd::Ripemd160::digest(input);
		ret[12..32].copy_from_slice(&hash);
		Ok(ret.to_vec())
	}
}

/// Data copy at address 4.
pub struct Identity;

impl Precompile for Identity {
	fn required_gas(&self, input: &[u8]) -> u64 {
		linear_cost(input.len(), 15, 3)
	}

	fn run(&self, input: &[u8]) -> Result<Vec<u8>, ExitError> {
		Ok(input.to_vec())
	}
}
