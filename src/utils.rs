use primitive_types::{H160, H256};
use sha3::{Digest, Keccak256};

/// Keccak-256 of the empty byte string, the code hash of accounts without code.
pub const EMPTY_CODE_HASH: H256 = H256([
	0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
	0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
]);

pub fn keccak256(data: &[u8]) -> H256 {
	H256::from_slice(Keccak256::digest(data).as_slice())
}

/// Address of a contract created by `caller` at `nonce`:
/// the last 20 bytes of `keccak(rlp([caller, nonce]))`.
pub fn create_address(caller: H160, nonce: u64) -> H160 {
	let mut stream = rlp::RlpStream::new_list(2);
	stream.append(&caller);
	stream.append(&nonce);
	keccak256(&stream.out()).into()
}
