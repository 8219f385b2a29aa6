//! The host-side interface: everything the interpreter needs from the
//! world outside the current frame.

use alloc::vec::Vec;

use primitive_types::{H160, H256, U256};

use crate::error::ExitResult;

/// The kind of a call-like message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallKind {
	/// `CALL`
	Call,
	/// `DELEGATECALL`
	DelegateCall,
	/// `CALLCODE`
	CallCode,
	/// `CREATE`
	Create,
	/// `CREATE2`
	Create2,
}

/// A message describing one call or create frame, built by the interpreter
/// and handed to the host.
#[derive(Clone, Debug)]
pub struct Message {
	pub kind: CallKind,
	/// Whether the child frame must run in static mode.
	pub is_static: bool,
	/// Call depth of the child frame.
	pub depth: u32,
	/// Gas forwarded to the child frame.
	pub gas: i64,
	/// Account that receives the execution (and value, except for
	/// delegate calls).
	pub recipient: H160,
	/// Account the message originates from.
	pub sender: H160,
	/// Input data.
	pub input: Vec<u8>,
	/// Value transferred with the message (or the apparent value for
	/// delegate calls).
	pub value: U256,
	/// Salt for `CREATE2`.
	pub create2_salt: H256,
	/// Account whose code runs; differs from `recipient` for
	/// `CALLCODE`/`DELEGATECALL`.
	pub code_address: H160,
}

/// The result a host reports for a call-like message.
#[derive(Clone, Debug)]
pub struct CallOutcome {
	pub result: ExitResult,
	/// Gas left unconsumed in the child frame.
	pub gas_left: i64,
	/// Gas refund accumulated by the child frame.
	pub gas_refund: i64,
	/// Return data of the child frame.
	pub output: Vec<u8>,
	/// Address of the created contract, for create messages.
	pub create_address: Option<H160>,
}

/// Transaction and block environment, provided once per frame.
#[derive(Clone, Debug, Default)]
pub struct TxContext {
	pub origin: H160,
	pub gas_price: U256,
	pub block_number: u64,
	pub block_timestamp: u64,
	pub block_coinbase: H160,
	/// Block difficulty, reinterpreted as the randomness beacon
	/// (PREVRANDAO) from the Merge fork on.
	pub block_difficulty: U256,
	pub block_gas_limit: u64,
	pub chain_id: U256,
	pub base_fee: U256,
	pub blob_base_fee: U256,
	pub blob_hashes: Vec<H256>,
}

/// Result of accessing an account or a storage slot, per EIP-2929.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessStatus {
	Cold,
	Warm,
}

/// Effect of a storage write, combining the original, current and new
/// value of the slot. The interpreter derives the gas and refund schedule
/// from this status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StorageStatus {
	/// The value of a storage item has been left unchanged: 0 -> 0 and
	/// X -> X, or a dirty slot was assigned a new distinct value.
	Assigned,
	/// A new storage item is added: 0 -> 0 -> Z.
	Added,
	/// A storage item is deleted: X -> X -> 0.
	Deleted,
	/// A storage item is modified: X -> X -> Z.
	Modified,
	/// An earlier-deleted item is assigned: X -> 0 -> Z.
	DeletedAdded,
	/// An earlier-modified item is deleted: X -> Y -> 0.
	ModifiedDeleted,
	/// An earlier-deleted item is restored: X -> 0 -> X.
	DeletedRestored,
	/// An earlier-added item is deleted: 0 -> Y -> 0.
	AddedDeleted,
	/// An earlier-modified item is restored: X -> Y -> X.
	ModifiedRestored,
}

/// The capability set the interpreter invokes on its embedder. The host
/// owns all state and the access lists; the interpreter never mutates
/// state directly.
pub trait Host {
	/// Check whether an account exists.
	fn account_exists(&self, address: H160) -> bool;
	/// Get balance of address.
	fn balance(&self, address: H160) -> U256;
	/// Get code size of address.
	fn code_size(&self, address: H160) -> U256;
	/// Get code hash of address.
	fn code_hash(&self, address: H160) -> H256;
	/// Copy a slice of the account code into `buffer`, returning the
	/// number of bytes copied.
	fn copy_code(&self, address: H160, offset: usize, buffer: &mut [u8]) -> usize;

	/// Get storage value of address at key.
	fn storage(&self, address: H160, key: H256) -> H256;
	/// Set storage value of address at key.
	fn set_storage(&mut self, address: H160, key: H256, value: H256) -> StorageStatus;
	/// Get transient storage value of address at key.
	fn transient_storage(&self, address: H160, key: H256) -> H256;
	/// Set transient storage value of address at key.
	fn set_transient_storage(&mut self, address: H160, key: H256, value: H256);

	/// Create a log owned by address with given topics and data.
	fn log(&mut self, address: H160, topics: &[H256], data: &[u8]);

	/// Execute a message in a child frame.
	fn call(&mut self, msg: Message) -> CallOutcome;

	/// Mark the account for destruction, sending its balance to the
	/// beneficiary. Returns whether this is the first self destruct of
	/// the account in the transaction.
	fn selfdestruct(&mut self, address: H160, beneficiary: H160) -> bool;

	/// Record an account access, returning its previous status.
	fn access_account(&mut self, address: H160) -> AccessStatus;
	/// Record a storage slot access, returning its previous status.
	fn access_storage(&mut self, address: H160, key: H256) -> AccessStatus;

	/// The transaction and block environment.
	fn tx_context(&self) -> TxContext;
	/// Hash of a recent block by number.
	fn block_hash(&self, number: u64) -> H256;
}
