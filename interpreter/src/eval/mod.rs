//! Actual opcode evaluation implementations.

#[macro_use]
mod macros;
pub mod arithmetic;
pub mod bitwise;
mod misc;
mod system;

use core::ops::{BitAnd, BitOr, BitXor};

use primitive_types::U256;

use crate::error::{ExitException, ExitSucceed};
use crate::etable::Control;
use crate::machine::Machine;
use crate::runtime::Host;
use crate::{Fork, Opcode};

pub fn eval_unknown<H: Host>(
	_machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	opcode: Opcode,
	_position: usize,
) -> Control {
	Control::Exit(ExitException::InvalidInstruction(opcode).into())
}

pub fn eval_stop<H: Host>(
	_machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	_opcode: Opcode,
	_position: usize,
) -> Control {
	Control::Exit(ExitSucceed::Stopped.into())
}

macro_rules! eval_op2 {
	( $name:ident, $op:ident ) => {
		pub fn $name<H: Host>(
			machine: &mut Machine,
			_handler: &mut H,
			_fork: Fork,
			_opcode: Opcode,
			_position: usize,
		) -> Control {
			pop_u256!(machine, op1, op2);
			let ret = op1.$op(op2);
			push_u256!(machine, ret);
			Control::Continue(1)
		}
	};
}

macro_rules! eval_fn2 {
	( $name:ident, $f:path ) => {
		pub fn $name<H: Host>(
			machine: &mut Machine,
			_handler: &mut H,
			_fork: Fork,
			_opcode: Opcode,
			_position: usize,
		) -> Control {
			op2_u256_fn!(machine, $f)
		}
	};
}

macro_rules! eval_fn3 {
	( $name:ident, $f:path ) => {
		pub fn $name<H: Host>(
			machine: &mut Machine,
			_handler: &mut H,
			_fork: Fork,
			_opcode: Opcode,
			_position: usize,
		) -> Control {
			op3_u256_fn!(machine, $f)
		}
	};
}

macro_rules! eval_machine {
	( $name:ident, $f:path ) => {
		pub fn $name<H: Host>(
			machine: &mut Machine,
			_handler: &mut H,
			_fork: Fork,
			_opcode: Opcode,
			_position: usize,
		) -> Control {
			$f(machine)
		}
	};
}

macro_rules! eval_host {
	( $name:ident, $f:path ) => {
		pub fn $name<H: Host>(
			machine: &mut Machine,
			handler: &mut H,
			_fork: Fork,
			_opcode: Opcode,
			_position: usize,
		) -> Control {
			$f(machine, handler)
		}
	};
}

macro_rules! eval_host_fork {
	( $name:ident, $f:path ) => {
		pub fn $name<H: Host>(
			machine: &mut Machine,
			handler: &mut H,
			fork: Fork,
			_opcode: Opcode,
			_position: usize,
		) -> Control {
			$f(machine, handler, fork)
		}
	};
}

pub fn eval_add<H: Host>(
	machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	_opcode: Opcode,
	_position: usize,
) -> Control {
	pop_u256!(machine, op1, op2);
	push_u256!(machine, op1.overflowing_add(op2).0);
	Control::Continue(1)
}

pub fn eval_mul<H: Host>(
	machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	_opcode: Opcode,
	_position: usize,
) -> Control {
	pop_u256!(machine, op1, op2);
	push_u256!(machine, op1.overflowing_mul(op2).0);
	Control::Continue(1)
}

pub fn eval_sub<H: Host>(
	machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	_opcode: Opcode,
	_position: usize,
) -> Control {
	pop_u256!(machine, op1, op2);
	push_u256!(machine, op1.overflowing_sub(op2).0);
	Control::Continue(1)
}

eval_fn2!(eval_div, self::arithmetic::div);
eval_fn2!(eval_sdiv, self::arithmetic::sdiv);
eval_fn2!(eval_mod, self::arithmetic::rem);
eval_fn2!(eval_smod, self::arithmetic::srem);
eval_fn3!(eval_addmod, self::arithmetic::addmod);
eval_fn3!(eval_mulmod, self::arithmetic::mulmod);
eval_fn2!(eval_signextend, self::arithmetic::signextend);

/// `EXP`: the dynamic cost is per significant exponent byte.
pub fn eval_exp<H: Host>(
	machine: &mut Machine,
	_handler: &mut H,
	fork: Fork,
	_opcode: Opcode,
	_position: usize,
) -> Control {
	pop_u256!(machine, base, power);

	let byte_cost = if fork >= Fork::SPURIOUS { 50 } else { 10 };
	let bytes = (power.bits() as i64 + 7) / 8;
	try_or_fail!(machine.charge_gas(byte_cost * bytes));

	push_u256!(machine, self::arithmetic::exp(base, power));
	Control::Continue(1)
}

pub fn eval_lt<H: Host>(
	machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	_opcode: Opcode,
	_position: usize,
) -> Control {
	op2_u256_bool!(machine, <)
}

pub fn eval_gt<H: Host>(
	machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	_opcode: Opcode,
	_position: usize,
) -> Control {
	op2_u256_bool!(machine, >)
}

pub fn eval_eq<H: Host>(
	machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	_opcode: Opcode,
	_position: usize,
) -> Control {
	op2_u256_bool!(machine, ==)
}

eval_fn2!(eval_slt, self::arithmetic::slt);
eval_fn2!(eval_sgt, self::arithmetic::sgt);
eval_op2!(eval_and, bitand);
eval_op2!(eval_or, bitor);
eval_op2!(eval_xor, bitxor);
eval_fn2!(eval_byte, self::bitwise::byte);
eval_fn2!(eval_shl, self::bitwise::shl);
eval_fn2!(eval_shr, self::bitwise::shr);
eval_fn2!(eval_sar, self::arithmetic::sar);

pub fn eval_iszero<H: Host>(
	machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	_opcode: Opcode,
	_position: usize,
) -> Control {
	pop_u256!(machine, op1);
	push_u256!(machine, self::bitwise::iszero(op1));
	Control::Continue(1)
}

pub fn eval_not<H: Host>(
	machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	_opcode: Opcode,
	_position: usize,
) -> Control {
	pop_u256!(machine, op1);
	push_u256!(machine, self::bitwise::not(op1));
	Control::Continue(1)
}

eval_machine!(eval_keccak256, self::system::keccak256);
eval_machine!(eval_address, self::system::address);
eval_host_fork!(eval_balance, self::system::balance);
eval_host!(eval_origin, self::system::origin);
eval_machine!(eval_caller, self::system::caller);
eval_machine!(eval_callvalue, self::system::callvalue);
eval_machine!(eval_calldataload, self::misc::calldataload);
eval_machine!(eval_calldatasize, self::misc::calldatasize);
eval_machine!(eval_calldatacopy, self::misc::calldatacopy);
eval_machine!(eval_codesize, self::misc::codesize);
eval_machine!(eval_codecopy, self::misc::codecopy);
eval_host!(eval_gasprice, self::system::gasprice);
eval_host_fork!(eval_extcodesize, self::system::extcodesize);
eval_host_fork!(eval_extcodecopy, self::system::extcodecopy);
eval_machine!(eval_returndatasize, self::misc::returndatasize);
eval_machine!(eval_returndatacopy, self::misc::returndatacopy);
eval_host_fork!(eval_extcodehash, self::system::extcodehash);
eval_host!(eval_blockhash, self::system::blockhash);
eval_host!(eval_coinbase, self::system::coinbase);
eval_host!(eval_timestamp, self::system::timestamp);
eval_host!(eval_number, self::system::number);
eval_host!(eval_difficulty, self::system::difficulty);
eval_host!(eval_gaslimit, self::system::gaslimit);
eval_host!(eval_chainid, self::system::chainid);
eval_host!(eval_selfbalance, self::system::selfbalance);
eval_host!(eval_basefee, self::system::basefee);
eval_host!(eval_blobhash, self::system::blobhash);
eval_host!(eval_blobbasefee, self::system::blobbasefee);

eval_machine!(eval_pop, self::misc::pop);
eval_machine!(eval_mload, self::misc::mload);
eval_machine!(eval_mstore, self::misc::mstore);
eval_machine!(eval_mstore8, self::misc::mstore8);
eval_host_fork!(eval_sload, self::system::sload);
eval_host_fork!(eval_sstore, self::system::sstore);
eval_machine!(eval_jump, self::misc::jump);
eval_machine!(eval_jumpi, self::misc::jumpi);
eval_machine!(eval_msize, self::misc::msize);
eval_machine!(eval_gas, self::misc::gas);
eval_host!(eval_tload, self::system::tload);
eval_host!(eval_tstore, self::system::tstore);
eval_machine!(eval_mcopy, self::misc::mcopy);
eval_machine!(eval_push0, self::misc::push0);

pub fn eval_pc<H: Host>(
	machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	_opcode: Opcode,
	position: usize,
) -> Control {
	self::misc::pc(machine, position)
}

pub fn eval_jumpdest<H: Host>(
	_machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	_opcode: Opcode,
	_position: usize,
) -> Control {
	Control::Continue(1)
}

pub fn eval_push<H: Host>(
	machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	opcode: Opcode,
	position: usize,
) -> Control {
	let n = (opcode.as_u8() - Opcode::PUSH1.as_u8() + 1) as usize;
	self::misc::push(machine, n, position)
}

pub fn eval_dup<H: Host>(
	machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	opcode: Opcode,
	_position: usize,
) -> Control {
	let n = (opcode.as_u8() - Opcode::DUP1.as_u8() + 1) as usize;
	self::misc::dup(machine, n)
}

pub fn eval_swap<H: Host>(
	machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	opcode: Opcode,
	_position: usize,
) -> Control {
	let n = (opcode.as_u8() - Opcode::SWAP1.as_u8() + 1) as usize;
	self::misc::swap(machine, n)
}

pub fn eval_log<H: Host>(
	machine: &mut Machine,
	handler: &mut H,
	_fork: Fork,
	opcode: Opcode,
	_position: usize,
) -> Control {
	let n = (opcode.as_u8() - Opcode::LOG0.as_u8()) as usize;
	self::system::log(machine, handler, n)
}

eval_machine!(eval_return, self::misc::ret);
eval_machine!(eval_revert, self::misc::revert);

pub fn eval_invalid<H: Host>(
	_machine: &mut Machine,
	_handler: &mut H,
	_fork: Fork,
	opcode: Opcode,
	_position: usize,
) -> Control {
	Control::Exit(ExitException::InvalidInstruction(opcode).into())
}

pub fn eval_create<H: Host>(
	machine: &mut Machine,
	handler: &mut H,
	fork: Fork,
	opcode: Opcode,
	_position: usize,
) -> Control {
	self::system::create(machine, handler, fork, opcode)
}

pub fn eval_call<H: Host>(
	machine: &mut Machine,
	handler: &mut H,
	fork: Fork,
	opcode: Opcode,
	_position: usize,
) -> Control {
	self::system::call(machine, handler, fork, opcode)
}

eval_host_fork!(eval_selfdestruct, self::system::selfdestruct);
