//! Execution-layer requests (EIP-7685): collecting deposit requests from
//! transaction logs and hashing the block's request lists.

use alloc::vec::Vec;

use primitive_types::{H160, H256, U256};
use sha2::{Digest, Sha256};

/// The deposit contract address on mainnet.
pub const DEPOSIT_CONTRACT_ADDRESS: H160 = H160([
	0x00, 0x00, 0x00, 0x00, 0x21, 0x9a, 0xb5, 0x40, 0x35, 0x6c, 0xbb, 0x83, 0x9c, 0xbe, 0x05,
	0x30, 0x3d, 0x77, 0x05, 0xfa,
]);

/// `keccak256("DepositEvent(bytes,bytes,bytes,bytes,bytes)")`.
pub const DEPOSIT_EVENT_SIGNATURE_HASH: H256 = H256([
	0x64, 0x9b, 0xbc, 0x62, 0xd0, 0xe3, 0x13, 0x42, 0xaf, 0xea, 0x4e, 0x5c, 0xd8, 0x2d, 0x40,
	0x49, 0xe7, 0xe1, 0xee, 0x91, 0x2f, 0xc0, 0x88, 0x9a, 0xa7, 0x90, 0x80, 0x3b, 0xe3, 0x90,
	0x38, 0xc5,
]);

/// A log emitted during execution.
#[derive(Clone, Debug, Default)]
pub struct Log {
	pub address: H160,
	pub topics: Vec<H256>,
	pub data: Vec<u8>,
}

/// The receipt of one executed transaction, reduced to what request
/// collection needs.
#[derive(Clone, Debug, Default)]
pub struct TransactionReceipt {
	pub logs: Vec<Log>,
}

/// Request types defined by the protocol.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RequestType {
	Deposit = 0x00,
	Withdrawal = 0x01,
	Consolidation = 0x02,
}

/// A typed list of request payloads, flattened into bytes.
#[derive(Clone, Debug)]
pub struct Requests {
	ty: RequestType,
	data: Vec<u8>,
}

impl Requests {
	#[must_use]
	pub fn new(ty: RequestType) -> Self {
		Self {
			ty,
			data: Vec::new(),
		}
	}

	#[must_use]
	pub fn request_type(&self) -> RequestType {
		self.ty
	}

	/// The concatenated request payloads, without the type byte.
	#[must_use]
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	pub fn append(&mut self, bytes: &[u8]) {
		self.data.extend_from_slice(bytes);
	}

	/// The type byte followed by the payloads, the form that is hashed.
	#[must_use]
	pub fn raw_data(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(1 + self.data.len());
		out.push(self.ty as u8);
		out.extend_from_slice(&self.data);
		out
	}
}

const WORD: usize = 32;

const fn pad_to_words(size: usize) -> usize {
	(size + 31) / 32 * 32
}

const PUBKEY_SIZE: usize = 48;
const WITHDRAWAL_SIZE: usize = 32;
const AMOUNT_SIZE: usize = 8;
const SIGNATURE_SIZE: usize = 96;
const INDEX_SIZE: usize = 8;

// Offsets of the five length-prefixed dynamic fields, hard-coded from the
// deposit contract event ABI. The head points at each field's length word.
const PUBKEY_OFFSET: usize = WORD * 5;
const WITHDRAWAL_OFFSET: usize = PUBKEY_OFFSET + WORD + pad_to_words(PUBKEY_SIZE);
const AMOUNT_OFFSET: usize = WITHDRAWAL_OFFSET + WORD + pad_to_words(WITHDRAWAL_SIZE);
const SIGNATURE_OFFSET: usize = AMOUNT_OFFSET + WORD + pad_to_words(AMOUNT_SIZE);
const INDEX_OFFSET: usize = SIGNATURE_OFFSET + WORD + pad_to_words(SIGNATURE_SIZE);

const DEPOSIT_LOG_DATA_SIZE: usize = INDEX_OFFSET + WORD + pad_to_words(INDEX_SIZE);

fn read_word_as_size(data: &[u8], position: usize) -> Option<usize> {
	let value = U256::from_big_endian(&data[position..position + WORD]);
	if value > U256::from(u32::MAX) {
		return None;
	}
	Some(value.as_usize())
}

/// Collect the deposit requests from the ordered transaction receipts,
/// following the EIP-6110 block validity rules.
///
/// Logs from other contracts or with a different first topic are skipped;
/// a matching log whose data does not follow the deposit event ABI fails
/// the whole collection.
#[must_use]
pub fn collect_deposit_requests(receipts: &[TransactionReceipt]) -> Option<Requests> {
	let mut requests = Requests::new(RequestType::Deposit);

	for receipt in receipts {
		for log in &receipt.logs {
			if log.address != DEPOSIT_CONTRACT_ADDRESS {
				continue;
			}
			if log.topics.first() != Some(&DEPOSIT_EVENT_SIGNATURE_HASH) {
				continue;
			}

			if log.data.len() != DEPOSIT_LOG_DATA_SIZE {
				return None;
			}

			// The five head words must point at the expected offsets.
			const EXPECTED_OFFSETS: [usize; 5] = [
				PUBKEY_OFFSET,
				WITHDRAWAL_OFFSET,
				AMOUNT_OFFSET,
				SIGNATURE_OFFSET,
				INDEX_OFFSET,
			];
			for (i, expected) in EXPECTED_OFFSETS.iter().enumerate() {
				if read_word_as_size(&log.data, i * WORD)? != *expected {
					return None;
				}
			}

			// Each field's length word must match the ABI layout.
			const FIELDS: [(usize, usize); 5] = [
				(PUBKEY_OFFSET, PUBKEY_SIZE),
				(WITHDRAWAL_OFFSET, WITHDRAWAL_SIZE),
				(AMOUNT_OFFSET, AMOUNT_SIZE),
				(SIGNATURE_OFFSET, SIGNATURE_SIZE),
				(INDEX_OFFSET, INDEX_SIZE),
			];
			for (offset, size) in FIELDS {
				if read_word_as_size(&log.data, offset)? != size {
					return None;
				}
			}

			for (offset, size) in FIELDS {
				requests.append(&log.data[offset + WORD..offset + WORD + size]);
			}
		}
	}

	Some(requests)
}

/// The block requests hash (EIP-7685): the SHA-256 of the concatenated
/// per-list SHA-256 hashes, with empty lists omitted.
#[must_use]
pub fn calculate_requests_hash(block_requests: &[Requests]) -> H256 {
	let mut hash_list = Vec::with_capacity(32 * block_requests.len());

	for requests in block_requests {
		if requests.data().is_empty() {
			continue;
		}
		hash_list.extend_from_slice(&Sha256::digest(requests.raw_data()));
	}

	H256::from_slice(&Sha256::digest(&hash_list))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn deposit_log(data: Vec<u8>) -> TransactionReceipt {
		TransactionReceipt {
			logs: alloc::vec![Log {
				address: DEPOSIT_CONTRACT_ADDRESS,
				topics: alloc::vec![DEPOSIT_EVENT_SIGNATURE_HASH],
				data,
			}],
		}
	}

	fn well_formed_log_data() -> Vec<u8> {
		let mut data = alloc::vec![0u8; 576];
		// Head offsets: 0xA0, 0x100, 0x140, 0x180, 0x200.
		data[31] = 0xa0;
		data[62] = 0x01;
		data[94] = 0x01;
		data[95] = 0x40;
		data[126] = 0x01;
		data[127] = 0x80;
		data[158] = 0x02;

		// Length words and filler payloads.
		data[5 * 32 + 31] = 48;
		data[6 * 32..6 * 32 + 48].fill(0x01);
		data[8 * 32 + 31] = 32;
		data[9 * 32..9 * 32 + 32].fill(0x02);
		data[10 * 32 + 31] = 8;
		data[11 * 32..11 * 32 + 8].fill(0x03);
		data[12 * 32 + 31] = 96;
		data[13 * 32..13 * 32 + 96].fill(0x04);
		data[16 * 32 + 31] = 8;
		data[17 * 32..17 * 32 + 8].fill(0x05);

		data
	}

	#[test]
	fn decode_well_formed_deposit() {
		let receipts = [deposit_log(well_formed_log_data())];
		let requests = collect_deposit_requests(&receipts).unwrap();
		assert_eq!(requests.request_type(), RequestType::Deposit);

		let mut expected = Vec::new();
		expected.extend_from_slice(&[0x01; 48]);
		expected.extend_from_slice(&[0x02; 32]);
		expected.extend_from_slice(&[0x03; 8]);
		expected.extend_from_slice(&[0x04; 96]);
		expected.extend_from_slice(&[0x05; 8]);
		assert_eq!(requests.data(), &expected[..]);
	}

	#[test]
	fn wrong_data_length_fails_collection() {
		let receipts = [deposit_log(alloc::vec![0xfe; 576])];
		// Correct length but garbage offsets.
		assert!(collect_deposit_requests(&receipts).is_none());

		let receipts = [deposit_log(alloc::vec![0u8; 575])];
		assert!(collect_deposit_requests(&receipts).is_none());
	}

	#[test]
	fn foreign_logs_are_skipped() {
		// Wrong topic: skipped, collection succeeds with no payload.
		let receipts = [TransactionReceipt {
			logs: alloc::vec![Log {
				address: DEPOSIT_CONTRACT_ADDRESS,
				topics: alloc::vec![H256::from_low_u64_be(0xdeadbeef)],
				data: alloc::vec![1, 2, 3],
			}],
		}];
		let requests = collect_deposit_requests(&receipts).unwrap();
		assert!(requests.data().is_empty());

		// Wrong address: skipped as well.
		let receipts = [TransactionReceipt {
			logs: alloc::vec![Log {
				address: H160::from_low_u64_be(0x99),
				topics: alloc::vec![DEPOSIT_EVENT_SIGNATURE_HASH],
				data: alloc::vec![1, 2, 3],
			}],
		}];
		assert!(collect_deposit_requests(&receipts).unwrap().data().is_empty());
	}

	#[test]
	fn requests_hash_chains_sha256() {
		let mut deposits = Requests::new(RequestType::Deposit);
		deposits.append(&[0xaa, 0xbb]);
		let mut withdrawals = Requests::new(RequestType::Withdrawal);
		withdrawals.append(&[0xcc]);
		let empty = Requests::new(RequestType::Consolidation);

		let hash = calculate_requests_hash(&[deposits.clone(), withdrawals.clone(), empty]);

		// Empty lists are omitted from the outer hash.
		let mut expected_input = Vec::new();
		expected_input.extend_from_slice(&Sha256::digest([0x00, 0xaa, 0xbb]));
		expected_input.extend_from_slice(&Sha256::digest([0x01, 0xcc]));
		assert_eq!(hash, H256::from_slice(&Sha256::digest(&expected_input)));

		// All-empty request lists hash the empty string.
		let empty_hash = calculate_requests_hash(&[]);
		assert_eq!(empty_hash, H256::from_slice(&Sha256::digest([])));
	}
}
