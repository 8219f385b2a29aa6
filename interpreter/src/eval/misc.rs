use primitive_types::U256;

use crate::error::{ExitError, ExitException, ExitSucceed};
use crate::etable::Control;
use crate::machine::Machine;
use crate::utils::num_words;

/// Per-word cost of the copy opcodes.
const COPY_WORD_COST: i64 = 3;

fn charge_copy_cost(machine: &mut Machine, len: U256) -> Result<(), ExitError> {
	// The copy length was already bounded by the memory resize.
	let words = num_words(len.as_u64());
	machine
		.charge_gas(words as i64 * COPY_WORD_COST)
		.map_err(Into::into)
}

#[inline]
pub fn codesize(machine: &mut Machine) -> Control {
	let size = U256::from(machine.code().len());
	push_u256!(machine, size);
	Control::Continue(1)
}

#[inline]
pub fn codecopy(machine: &mut Machine) -> Control {
	pop_u256!(machine, memory_offset, code_offset, len);

	try_or_fail!(machine.resize_memory(memory_offset, len));
	try_or_fail!(charge_copy_cost(machine, len));
	let code = machine.analysis.clone();
	match machine
		.memory
		.copy_large(memory_offset, code_offset, len, code.raw_code())
	{
		Ok(()) => Control::Continue(1),
		Err(e) => Control::Exit(e.into()),
	}
}

#[inline]
pub fn calldataload(machine: &mut Machine) -> Control {
	pop_u256!(machine, index);

	let mut load = [0u8; 32];
	#[allow(clippy::needless_range_loop)]
	for i in 0..32 {
		if let Some(p) = index.checked_add(U256::from(i)) {
			if p <= U256::from(usize::MAX) {
				let p = p.as_usize();
				if p < machine.data.len() {
					load[i] = machine.data[p];
				}
			}
		}
	}

	push_u256!(machine, U256::from_big_endian(&load));
	Control::Continue(1)
}

#[inline]
pub fn calldatasize(machine: &mut Machine) -> Control {
	let len = U256::from(machine.data.len());
	push_u256!(machine, len);
	Control::Continue(1)
}

#[inline]
pub fn calldatacopy(machine: &mut Machine) -> Control {
	pop_u256!(machine, memory_offset, data_offset, len);

	try_or_fail!(machine.resize_memory(memory_offset, len));
	try_or_fail!(charge_copy_cost(machine, len));
	if len.is_zero() {
		return Control::Continue(1);
	}

	let data = machine.data.clone();
	match machine
		.memory
		.copy_large(memory_offset, data_offset, len, &data)
	{
		Ok(()) => Control::Continue(1),
		Err(e) => Control::Exit(e.into()),
	}
}

#[inline]
pub fn returndatasize(machine: &mut Machine) -> Control {
	let size = U256::from(machine.retbuf.len());
	push_u256!(machine, size);
	Control::Continue(1)
}

#[inline]
pub fn returndatacopy(machine: &mut Machine) -> Control {
	pop_u256!(machine, memory_offset, data_offset, len);

	try_or_fail!(machine.resize_memory(memory_offset, len));
	try_or_fail!(charge_copy_cost(machine, len));

	// Unlike the other copy opcodes, reading past the end of the return
	// buffer is a hard failure.
	if data_offset
		.checked_add(len)
		.map(|end| end > U256::from(machine.retbuf.len()))
		.unwrap_or(true)
	{
		return Control::Exit(ExitException::InvalidMemoryAccess.into());
	}

	if len.is_zero() {
		return Control::Continue(1);
	}

	let data = core::mem::take(&mut machine.retbuf);
	let result = machine
		.memory
		.copy_large(memory_offset, data_offset, len, &data);
	machine.retbuf = data;

	match result {
		Ok(()) => Control::Continue(1),
		Err(e) => Control::Exit(e.into()),
	}
}

#[inline]
pub fn pop(machine: &mut Machine) -> Control {
	pop_u256!(machine, _val);
	Control::Continue(1)
}

#[inline]
pub fn mload(machine: &mut Machine) -> Control {
	pop_u256!(machine, index);
	let index = try_or_fail!(machine.resize_memory(index, U256::from(32)));
	let value = U256::from_big_endian(machine.memory.slice(index, 32));
	push_u256!(machine, value);
	Control::Continue(1)
}

#[inline]
pub fn mstore(machine: &mut Machine) -> Control {
	pop_u256!(machine, index, value);
	let index = try_or_fail!(machine.resize_memory(index, U256::from(32)));
	let mut bytes = [0u8; 32];
	value.to_big_endian(&mut bytes);
	match machine.memory.set(index, &bytes, Some(32)) {
		Ok(()) => Control::Continue(1),
		Err(e) => Control::Exit(e.into()),
	}
}

#[inline]
pub fn mstore8(machine: &mut Machine) -> Control {
	pop_u256!(machine, index, value);
	let index = try_or_fail!(machine.resize_memory(index, U256::one()));
	let value = (value.low_u32() & 0xff) as u8;
	match machine.memory.set(index, &[value], Some(1)) {
		Ok(()) => Control::Continue(1),
		Err(e) => Control::Exit(e.into()),
	}
}

#[inline]
pub fn mcopy(machine: &mut Machine) -> Control {
	pop_u256!(machine, destination, source, len);

	// Both the source and the destination region must be paid for.
	try_or_fail!(machine.resize_memory(destination, len));
	try_or_fail!(machine.resize_memory(source, len));
	try_or_fail!(charge_copy_cost(machine, len));

	if len.is_zero() {
		return Control::Continue(1);
	}

	let destination = destination.as_usize();
	let source = source.as_usize();
	machine.memory.copy_within(destination, source, len.as_usize());
	Control::Continue(1)
}

#[inline]
pub fn jump(machine: &mut Machine) -> Control {
	pop_u256!(machine, dest);
	let dest = as_usize_or_fail!(dest, ExitException::BadJumpDestination);

	Control::Jump(dest)
}

#[inline]
pub fn jumpi(machine: &mut Machine) -> Control {
	pop_u256!(machine, dest, value);

	if value.is_zero() {
		Control::Continue(1)
	} else {
		let dest = as_usize_or_fail!(dest, ExitException::BadJumpDestination);
		Control::Jump(dest)
	}
}

#[inline]
pub fn pc(machine: &mut Machine, position: usize) -> Control {
	push_u256!(machine, U256::from(position));
	Control::Continue(1)
}

#[inline]
pub fn msize(machine: &mut Machine) -> Control {
	push_u256!(machine, U256::from(machine.memory.len()));
	Control::Continue(1)
}

#[inline]
pub fn gas(machine: &mut Machine) -> Control {
	push_u256!(machine, U256::from(machine.gas_left as u64));
	Control::Continue(1)
}

#[inline]
pub fn push0(machine: &mut Machine) -> Control {
	push_u256!(machine, U256::zero());
	Control::Continue(1)
}

/// `PUSHn`: the immediate is read from the padded executable code, so a
/// push truncated by the end of code loads zero bytes.
#[inline]
pub fn push(machine: &mut Machine, n: usize, position: usize) -> Control {
	let code = machine.analysis.executable_code();
	let slice = &code[position + 1..position + 1 + n];
	let mut value = [0u8; 32];
	value[32 - n..].copy_from_slice(slice);

	push_u256!(machine, U256::from_big_endian(&value));
	Control::Continue(1 + n)
}

#[inline]
pub fn dup(machine: &mut Machine, n: usize) -> Control {
	let value = match machine.stack.peek(n - 1) {
		Ok(value) => value,
		Err(e) => return Control::Exit(e.into()),
	};
	push_u256!(machine, value);
	Control::Continue(1)
}

#[inline]
pub fn swap(machine: &mut Machine, n: usize) -> Control {
	let val1 = match machine.stack.peek(0) {
		Ok(value) => value,
		Err(e) => return Control::Exit(e.into()),
	};
	let val2 = match machine.stack.peek(n) {
		Ok(value) => value,
		Err(e) => return Control::Exit(e.into()),
	};
	try_or_fail!(machine.stack.set(0, val2));
	try_or_fail!(machine.stack.set(n, val1));
	Control::Continue(1)
}

#[inline]
pub fn ret(machine: &mut Machine) -> Control {
	pop_u256!(machine, start, len);
	let start = try_or_fail!(machine.resize_memory(start, len));

	machine.retval = if len.is_zero() {
		alloc::vec::Vec::new()
	} else {
		machine.memory.slice(start, len.as_usize()).to_vec()
	};
	Control::Exit(ExitSucceed::Returned.into())
}

#[inline]
pub fn revert(machine: &mut Machine) -> Control {
	pop_u256!(machine, start, len);
	let start = try_or_fail!(machine.resize_memory(start, len));

	machine.retval = if len.is_zero() {
		alloc::vec::Vec::new()
	} else {
		machine.memory.slice(start, len.as_usize()).to_vec()
	};
	Control::Exit(ExitError::Reverted.into())
}
