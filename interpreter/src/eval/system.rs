use alloc::vec::Vec;
use core::cmp::min;

use primitive_types::{H256, U256};
use sha3::{Digest, Keccak256};

use crate::error::{ExitError, ExitException, ExitSucceed};
use crate::etable::Control;
use crate::machine::{Machine, CALL_DEPTH_LIMIT};
use crate::runtime::{AccessStatus, CallKind, Host, Message, StorageStatus};
use crate::utils::{h160_to_u256, h256_to_u256, num_words, u256_to_h160};
use crate::{Fork, Opcode};

/// EIP-2929 access costs. The warm cost is the constant part already in
/// the cost tables; the cold surcharges are dynamic.
const WARM_ACCESS_COST: i64 = 100;
const COLD_ACCOUNT_ACCESS_COST: i64 = 2600;
const COLD_SLOAD_COST: i64 = 2100;

const KECCAK_WORD_COST: i64 = 6;
const LOG_DATA_BYTE_COST: i64 = 8;
const CALL_VALUE_COST: i64 = 9000;
const CALL_STIPEND: i64 = 2300;
const NEW_ACCOUNT_COST: i64 = 25000;
const SELFDESTRUCT_REFUND: i64 = 24000;
const INITCODE_WORD_COST: i64 = 2;
const MAX_INITCODE_SIZE: usize = 2 * 24576;

/// Charge the cold surcharge when the account has not been touched yet in
/// this transaction.
fn charge_account_access<H: Host>(
	machine: &mut Machine,
	handler: &mut H,
	fork: Fork,
	address: primitive_types::H160,
) -> Result<(), ExitException> {
	if fork >= Fork::BERLIN && handler.access_account(address) == AccessStatus::Cold {
		machine.charge_gas(COLD_ACCOUNT_ACCESS_COST - WARM_ACCESS_COST)?;
	}
	Ok(())
}

pub fn keccak256(machine: &mut Machine) -> Control {
	pop_u256!(machine, from, len);

	let from = try_or_fail!(machine.resize_memory(from, len));
	try_or_fail!(machine.charge_gas(num_words(len.as_u64()) as i64 * KECCAK_WORD_COST));

	let ret = if len.is_zero() {
		Keccak256::digest([0u8; 0])
	} else {
		Keccak256::digest(machine.memory.slice(from, len.as_usize()))
	};
	push_h256!(machine, H256::from_slice(ret.as_slice()));

	Control::Continue(1)
}

pub fn address(machine: &mut Machine) -> Control {
	let ret = h160_to_u256(machine.context.address);
	push_u256!(machine, ret);
	Control::Continue(1)
}

pub fn balance<H: Host>(machine: &mut Machine, handler: &mut H, fork: Fork) -> Control {
	pop_u256!(machine, address);
	let address = u256_to_h160(address);
	try_or_fail!(charge_account_access(machine, handler, fork, address));
	push_u256!(machine, handler.balance(address));

	Control::Continue(1)
}

pub fn selfbalance<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	push_u256!(machine, handler.balance(machine.context.address));
	Control::Continue(1)
}

pub fn origin<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	let ret = h160_to_u256(handler.tx_context().origin);
	push_u256!(machine, ret);
	Control::Continue(1)
}

pub fn caller(machine: &mut Machine) -> Control {
	let ret = h160_to_u256(machine.context.caller);
	push_u256!(machine, ret);
	Control::Continue(1)
}

pub fn callvalue(machine: &mut Machine) -> Control {
	push_u256!(machine, machine.context.apparent_value);
	Control::Continue(1)
}

pub fn gasprice<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	push_u256!(machine, handler.tx_context().gas_price);
	Control::Continue(1)
}

pub fn basefee<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	push_u256!(machine, handler.tx_context().base_fee);
	Control::Continue(1)
}

pub fn blobbasefee<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	push_u256!(machine, handler.tx_context().blob_base_fee);
	Control::Continue(1)
}

pub fn blobhash<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	pop_u256!(machine, index);
	let hashes = handler.tx_context().blob_hashes;
	let ret = if index < U256::from(hashes.len()) {
		h256_to_u256(hashes[index.as_usize()])
	} else {
		U256::zero()
	};
	push_u256!(machine, ret);
	Control::Continue(1)
}

pub fn extcodesize<H: Host>(machine: &mut Machine, handler: &mut H, fork: Fork) -> Control {
	pop_u256!(machine, address);
	let address = u256_to_h160(address);
	try_or_fail!(charge_account_access(machine, handler, fork, address));
	push_u256!(machine, handler.code_size(address));

	Control::Continue(1)
}

pub fn extcodehash<H: Host>(machine: &mut Machine, handler: &mut H, fork: Fork) -> Control {
	pop_u256!(machine, address);
	let address = u256_to_h160(address);
	try_or_fail!(charge_account_access(machine, handler, fork, address));
	push_h256!(machine, handler.code_hash(address));

	Control::Continue(1)
}

pub fn extcodecopy<H: Host>(machine: &mut Machine, handler: &mut H, fork: Fork) -> Control {
	pop_u256!(machine, address);
	pop_u256!(machine, memory_offset, code_offset, len);
	let address = u256_to_h160(address);

	try_or_fail!(charge_account_access(machine, handler, fork, address));
	let memory_offset = try_or_fail!(machine.resize_memory(memory_offset, len));
	try_or_fail!(machine.charge_gas(num_words(len.as_u64()) as i64 * 3));

	if len.is_zero() {
		return Control::Continue(1);
	}

	let len = len.as_usize();
	let mut buffer = alloc::vec![0u8; len];
	let code_offset = if code_offset > U256::from(usize::MAX) {
		usize::MAX
	} else {
		code_offset.as_usize()
	};
	let copied = handler.copy_code(address, code_offset, &mut buffer);
	for byte in &mut buffer[copied..] {
		*byte = 0;
	}

	match machine.memory.set(memory_offset, &buffer, Some(len)) {
		Ok(()) => Control::Continue(1),
		Err(e) => Control::Exit(e.into()),
	}
}

pub fn blockhash<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	pop_u256!(machine, number);

	let current = handler.tx_context().block_number;
	let ret = if number >= U256::from(current)
		|| U256::from(current) - number > U256::from(256u64)
	{
		H256::default()
	} else {
		handler.block_hash(number.as_u64())
	};
	push_h256!(machine, ret);

	Control::Continue(1)
}

pub fn coinbase<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	push_u256!(machine, h160_to_u256(handler.tx_context().block_coinbase));
	Control::Continue(1)
}

pub fn timestamp<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	push_u256!(machine, U256::from(handler.tx_context().block_timestamp));
	Control::Continue(1)
}

pub fn number<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	push_u256!(machine, U256::from(handler.tx_context().block_number));
	Control::Continue(1)
}

pub fn difficulty<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	push_u256!(machine, handler.tx_context().block_difficulty);
	Control::Continue(1)
}

pub fn gaslimit<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	push_u256!(machine, U256::from(handler.tx_context().block_gas_limit));
	Control::Continue(1)
}

pub fn chainid<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	push_u256!(machine, handler.tx_context().chain_id);
	Control::Continue(1)
}

pub fn sload<H: Host>(machine: &mut Machine, handler: &mut H, fork: Fork) -> Control {
	pop_h256!(machine, key);

	if fork >= Fork::BERLIN
		&& handler.access_storage(machine.context.address, key) == AccessStatus::Cold
	{
		try_or_fail!(machine.charge_gas(COLD_SLOAD_COST - WARM_ACCESS_COST));
	}

	let value = handler.storage(machine.context.address, key);
	push_h256!(machine, value);

	Control::Continue(1)
}

/// Cost and refund for one storage write, derived from the host's storage
/// status.
fn sstore_cost_refund(fork: Fork, status: StorageStatus) -> (i64, i64) {
	// Net gas metering applies at Constantinople (EIP-1283), is reverted
	// at Petersburg and returns from Istanbul on (EIP-2200).
	let net = fork == Fork::CONSTANTINOPLE || fork >= Fork::ISTANBUL;

	let (sload_gas, set_gas, reset_gas, clear_refund) = if fork >= Fork::LONDON {
		(100, 20000, 2900, 4800)
	} else if fork >= Fork::BERLIN {
		(100, 20000, 2900, 15000)
	} else if fork >= Fork::ISTANBUL {
		(800, 20000, 5000, 15000)
	} else if fork == Fork::CONSTANTINOPLE {
		(200, 20000, 5000, 15000)
	} else {
		(0, 20000, 5000, 15000)
	};

	if net {
		match status {
			StorageStatus::Assigned => (sload_gas, 0),
			StorageStatus::Added => (set_gas, 0),
			StorageStatus::Deleted => (reset_gas, clear_refund),
			StorageStatus::Modified => (reset_gas, 0),
			StorageStatus::DeletedAdded => (sload_gas, -clear_refund),
			StorageStatus::ModifiedDeleted => (sload_gas, clear_refund),
			StorageStatus::DeletedRestored => {
				(sload_gas, reset_gas - sload_gas - clear_refund)
			}
			StorageStatus::AddedDeleted => (sload_gas, set_gas - sload_gas),
			StorageStatus::ModifiedRestored => (sload_gas, reset_gas - sload_gas),
		}
	} else {
		// Legacy metering looks only at the current and the new value.
		match status {
			StorageStatus::Added
			| StorageStatus::DeletedAdded
			| StorageStatus::DeletedRestored => (set_gas, 0),
			StorageStatus::Deleted
			| StorageStatus::ModifiedDeleted
			| StorageStatus::AddedDeleted => (reset_gas, 15000),
			_ => (reset_gas, 0),
		}
	}
}

pub fn sstore<H: Host>(machine: &mut Machine, handler: &mut H, fork: Fork) -> Control {
	if machine.context.is_static {
		return Control::Exit(ExitException::StaticModeViolation.into());
	}

	// EIP-2200 sentry: a write must leave more than the stipend behind.
	if fork >= Fork::ISTANBUL && machine.gas_left <= CALL_STIPEND {
		return Control::Exit(ExitException::OutOfGas.into());
	}

	pop_h256!(machine, key, value);

	if fork >= Fork::BERLIN
		&& handler.access_storage(machine.context.address, key) == AccessStatus::Cold
	{
		try_or_fail!(machine.charge_gas(COLD_SLOAD_COST));
	}

	let status = handler.set_storage(machine.context.address, key, value);
	let (cost, refund) = sstore_cost_refund(fork, status);
	try_or_fail!(machine.charge_gas(cost));
	machine.refunded_gas += refund;

	Control::Continue(1)
}

pub fn tload<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	pop_h256!(machine, key);
	let value = handler.transient_storage(machine.context.address, key);
	push_h256!(machine, value);
	Control::Continue(1)
}

pub fn tstore<H: Host>(machine: &mut Machine, handler: &mut H) -> Control {
	if machine.context.is_static {
		return Control::Exit(ExitException::StaticModeViolation.into());
	}

	pop_h256!(machine, key, value);
	handler.set_transient_storage(machine.context.address, key, value);
	Control::Continue(1)
}

pub fn log<H: Host>(machine: &mut Machine, handler: &mut H, n: usize) -> Control {
	if machine.context.is_static {
		return Control::Exit(ExitException::StaticModeViolation.into());
	}

	pop_u256!(machine, offset, len);
	let offset = try_or_fail!(machine.resize_memory(offset, len));
	try_or_fail!(machine.charge_gas(len.as_u64() as i64 * LOG_DATA_BYTE_COST));

	let mut topics = Vec::with_capacity(n);
	for _ in 0..n {
		pop_h256!(machine, topic);
		topics.push(topic);
	}

	let data = if len.is_zero() {
		Vec::new()
	} else {
		machine.memory.slice(offset, len.as_usize()).to_vec()
	};
	handler.log(machine.context.address, &topics, &data);

	Control::Continue(1)
}

pub fn selfdestruct<H: Host>(machine: &mut Machine, handler: &mut H, fork: Fork) -> Control {
	if machine.context.is_static {
		return Control::Exit(ExitException::StaticModeViolation.into());
	}

	pop_u256!(machine, beneficiary);
	let beneficiary = u256_to_h160(beneficiary);

	if fork >= Fork::BERLIN && handler.access_account(beneficiary) == AccessStatus::Cold {
		try_or_fail!(machine.charge_gas(COLD_ACCOUNT_ACCESS_COST));
	}

	// Account creation surcharge for sending funds into the void.
	if fork >= Fork::SPURIOUS {
		if !handler.balance(machine.context.address).is_zero()
			&& !handler.account_exists(beneficiary)
		{
			try_or_fail!(machine.charge_gas(NEW_ACCOUNT_COST));
		}
	} else if fork >= Fork::TANGERINE && !handler.account_exists(beneficiary) {
		try_or_fail!(machine.charge_gas(NEW_ACCOUNT_COST));
	}

	if handler.selfdestruct(machine.context.address, beneficiary) && fork < Fork::LONDON {
		machine.refunded_gas += SELFDESTRUCT_REFUND;
	}

	Control::Exit(ExitSucceed::Suicided.into())
}

fn fetch_input(machine: &mut Machine, offset: U256, len: U256) -> Vec<u8> {
	if len.is_zero() {
		Vec::new()
	} else {
		machine
			.memory
			.slice(offset.as_usize(), len.as_usize())
			.to_vec()
	}
}

pub fn create<H: Host>(
	machine: &mut Machine,
	handler: &mut H,
	fork: Fork,
	opcode: Opcode,
) -> Control {
	if machine.context.is_static {
		return Control::Exit(ExitException::StaticModeViolation.into());
	}

	let is_create2 = opcode == Opcode::CREATE2;
	pop_u256!(machine, value, offset, len);
	let salt = if is_create2 {
		pop_h256!(machine, salt);
		salt
	} else {
		H256::default()
	};

	let offset_usize = try_or_fail!(machine.resize_memory(offset, len));

	// EIP-3860: bounded, word-charged initcode.
	if fork >= Fork::SHANGHAI {
		if len > U256::from(MAX_INITCODE_SIZE) {
			return Control::Exit(ExitException::OutOfGas.into());
		}
		try_or_fail!(machine.charge_gas(num_words(len.as_u64()) as i64 * INITCODE_WORD_COST));
	}
	if is_create2 {
		// Hashing the initcode for the address derivation.
		try_or_fail!(machine.charge_gas(num_words(len.as_u64()) as i64 * KECCAK_WORD_COST));
	}

	machine.retbuf = Vec::new();

	if machine.context.depth >= CALL_DEPTH_LIMIT
		|| handler.balance(machine.context.address) < value
	{
		push_u256!(machine, U256::zero());
		return Control::Continue(1);
	}

	// All but one 64th of the remaining gas goes to the child.
	let child_gas = if fork >= Fork::TANGERINE {
		machine.gas_left - machine.gas_left / 64
	} else {
		machine.gas_left
	};
	try_or_fail!(machine.charge_gas(child_gas));

	let input = fetch_input(machine, U256::from(offset_usize), len);
	let message = Message {
		kind: if is_create2 {
			CallKind::Create2
		} else {
			CallKind::Create
		},
		is_static: false,
		depth: machine.context.depth + 1,
		gas: child_gas,
		recipient: primitive_types::H160::default(),
		sender: machine.context.address,
		input,
		value,
		create2_salt: salt,
		code_address: primitive_types::H160::default(),
	};

	let outcome = handler.call(message);
	machine.gas_left += outcome.gas_left;
	machine.refunded_gas += outcome.gas_refund;

	// Create frames expose their output only when they revert.
	if outcome.result == Err(ExitError::Reverted) {
		machine.retbuf = outcome.output;
	}

	match outcome.result {
		Ok(_) => {
			let address = outcome.create_address.unwrap_or_default();
			push_u256!(machine, h160_to_u256(address));
		}
		Err(_) => {
			push_u256!(machine, U256::zero());
		}
	}

	Control::Continue(1)
}

pub fn call<H: Host>(
	machine: &mut Machine,
	handler: &mut H,
	fork: Fork,
	opcode: Opcode,
) -> Control {
	pop_u256!(machine, gas_limit, target);
	let target = u256_to_h160(target);

	let value = if opcode == Opcode::CALL || opcode == Opcode::CALLCODE {
		pop_u256!(machine, value);
		value
	} else {
		U256::zero()
	};
	pop_u256!(machine, in_offset, in_len, out_offset, out_len);

	let has_value = !value.is_zero();
	if machine.context.is_static && has_value && opcode == Opcode::CALL {
		return Control::Exit(ExitException::StaticModeViolation.into());
	}

	let in_offset_usize = try_or_fail!(machine.resize_memory(in_offset, in_len));
	try_or_fail!(machine.resize_memory(out_offset, out_len));

	try_or_fail!(charge_account_access(machine, handler, fork, target));

	if has_value {
		try_or_fail!(machine.charge_gas(CALL_VALUE_COST));
	}

	// Account creation surcharge for value-bearing calls into the void.
	if opcode == Opcode::CALL {
		let charge_new_account = if fork >= Fork::SPURIOUS {
			has_value && !handler.account_exists(target)
		} else {
			!handler.account_exists(target)
		};
		if charge_new_account {
			try_or_fail!(machine.charge_gas(NEW_ACCOUNT_COST));
		}
	}

	// Gas forwarding: capped at all-but-one-64th from Tangerine on,
	// demanded in full before.
	let gas = if fork >= Fork::TANGERINE {
		let cap = machine.gas_left - machine.gas_left / 64;
		if gas_limit > U256::from(cap as u64) {
			cap
		} else {
			gas_limit.as_u64() as i64
		}
	} else {
		if gas_limit > U256::from(machine.gas_left as u64) {
			return Control::Exit(ExitException::OutOfGas.into());
		}
		gas_limit.as_u64() as i64
	};
	try_or_fail!(machine.charge_gas(gas));

	let child_gas = gas + if has_value { CALL_STIPEND } else { 0 };

	machine.retbuf = Vec::new();

	// Fail fast on depth or balance without entering a child frame. The
	// forwarded gas, stipend included, goes back to this frame.
	if machine.context.depth >= CALL_DEPTH_LIMIT
		|| (has_value && handler.balance(machine.context.address) < value)
	{
		machine.gas_left += child_gas;
		push_u256!(machine, U256::zero());
		return Control::Continue(1);
	}

	let input = fetch_input(machine, U256::from(in_offset_usize), in_len);
	let message = match opcode {
		Opcode::CALL => Message {
			kind: CallKind::Call,
			is_static: machine.context.is_static,
			depth: machine.context.depth + 1,
			gas: child_gas,
			recipient: target,
			sender: machine.context.address,
			input,
			value,
			create2_salt: H256::default(),
			code_address: target,
		},
		Opcode::CALLCODE => Message {
			kind: CallKind::CallCode,
			is_static: machine.context.is_static,
			depth: machine.context.depth + 1,
			gas: child_gas,
			recipient: machine.context.address,
			sender: machine.context.address,
			input,
			value,
			create2_salt: H256::default(),
			code_address: target,
		},
		Opcode::DELEGATECALL => Message {
			kind: CallKind::DelegateCall,
			is_static: machine.context.is_static,
			depth: machine.context.depth + 1,
			gas: child_gas,
			recipient: machine.context.address,
			sender: machine.context.caller,
			input,
			value: machine.context.apparent_value,
			create2_salt: H256::default(),
			code_address: target,
		},
		_ => Message {
			// STATICCALL
			kind: CallKind::Call,
			is_static: true,
			depth: machine.context.depth + 1,
			gas: child_gas,
			recipient: target,
			sender: machine.context.address,
			input,
			value: U256::zero(),
			create2_salt: H256::default(),
			code_address: target,
		},
	};

	let outcome = handler.call(message);
	machine.gas_left += outcome.gas_left;
	machine.refunded_gas += outcome.gas_refund;
	machine.retbuf = outcome.output;

	// Copy what fits of the return data into the requested region.
	if !machine.retbuf.is_empty() && !out_len.is_zero() {
		let target_len = min(out_len, U256::from(machine.retbuf.len()));
		let data = core::mem::take(&mut machine.retbuf);
		let copy = machine
			.memory
			.copy_large(out_offset, U256::zero(), target_len, &data);
		machine.retbuf = data;
		try_or_fail!(copy);
	}

	push_u256!(
		machine,
		if outcome.result.is_ok() {
			U256::one()
		} else {
			U256::zero()
		}
	);

	Control::Continue(1)
}
