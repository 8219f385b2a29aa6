//! The per-opcode dispatch table.

use core::marker::PhantomData;
use core::ops::Deref;

use crate::error::ExitResult;
use crate::eval::*;
use crate::machine::Machine;
use crate::runtime::Host;
use crate::{Fork, Opcode};

/// Control flow directive returned by an opcode implementation.
#[derive(Debug)]
pub enum Control {
	/// Advance the program counter by the given byte count.
	Continue(usize),
	/// Set the program counter to a jump destination, to be validated
	/// against the analysis.
	Jump(usize),
	/// The frame has finished.
	Exit(ExitResult),
}

/// Evaluation function type.
pub type Efn<H> = fn(&mut Machine, &mut H, Fork, Opcode, usize) -> Control;

/// The evaluation table for the EVM.
pub struct Etable<H>([Efn<H>; 256], PhantomData<H>);

impl<H> Deref for Etable<H> {
	type Target = [Efn<H>; 256];

	fn deref(&self) -> &[Efn<H>; 256] {
		&self.0
	}
}

impl<H: Host> Etable<H> {
	/// The full instruction set.
	#[must_use]
	pub fn core() -> Self {
		let mut table: [Efn<H>; 256] = [eval_unknown as _; 256];

		table[Opcode::STOP.as_usize()] = eval_stop as _;
		table[Opcode::ADD.as_usize()] = eval_add as _;
		table[Opcode::MUL.as_usize()] = eval_mul as _;
		table[Opcode::SUB.as_usize()] = eval_sub as _;
		table[Opcode::DIV.as_usize()] = eval_div as _;
		table[Opcode::SDIV.as_usize()] = eval_sdiv as _;
		table[Opcode::MOD.as_usize()] = eval_mod as _;
		table[Opcode::SMOD.as_usize()] = eval_smod as _;
		table[Opcode::ADDMOD.as_usize()] = eval_addmod as _;
		table[Opcode::MULMOD.as_usize()] = eval_mulmod as _;
		table[Opcode::EXP.as_usize()] = eval_exp as _;
		table[Opcode::SIGNEXTEND.as_usize()] = eval_signextend as _;

		table[Opcode::LT.as_usize()] = eval_lt as _;
		table[Opcode::GT.as_usize()] = eval_gt as _;
		table[Opcode::SLT.as_usize()] = eval_slt as _;
		table[Opcode::SGT.as_usize()] = eval_sgt as _;
		table[Opcode::EQ.as_usize()] = eval_eq as _;
		table[Opcode::ISZERO.as_usize()] = eval_iszero as _;
		table[Opcode::AND.as_usize()] = eval_and as _;
		table[Opcode::OR.as_usize()] = eval_or as _;
		table[Opcode::XOR.as_usize()] = eval_xor as _;
		table[Opcode::NOT.as_usize()] = eval_not as _;
		table[Opcode::BYTE.as_usize()] = eval_byte as _;
		table[Opcode::SHL.as_usize()] = eval_shl as _;
		table[Opcode::SHR.as_usize()] = eval_shr as _;
		table[Opcode::SAR.as_usize()] = eval_sar as _;

		table[Opcode::KECCAK256.as_usize()] = eval_keccak256 as _;

		table[Opcode::ADDRESS.as_usize()] = eval_address as _;
		table[Opcode::BALANCE.as_usize()] = eval_balance as _;
		table[Opcode::ORIGIN.as_usize()] = eval_origin as _;
		table[Opcode::CALLER.as_usize()] = eval_caller as _;
		table[Opcode::CALLVALUE.as_usize()] = eval_callvalue as _;
		table[Opcode::CALLDATALOAD.as_usize()] = eval_calldataload as _;
		table[Opcode::CALLDATASIZE.as_usize()] = eval_calldatasize as _;
		table[Opcode::CALLDATACOPY.as_usize()] = eval_calldatacopy as _;
		table[Opcode::CODESIZE.as_usize()] = eval_codesize as _;
		table[Opcode::CODECOPY.as_usize()] = eval_codecopy as _;
		table[Opcode::GASPRICE.as_usize()] = eval_gasprice as _;
		table[Opcode::EXTCODESIZE.as_usize()] = eval_extcodesize as _;
		table[Opcode::EXTCODECOPY.as_usize()] = eval_extcodecopy as _;
		table[Opcode::RETURNDATASIZE.as_usize()] = eval_returndatasize as _;
		table[Opcode::RETURNDATACOPY.as_usize()] = eval_returndatacopy as _;
		table[Opcode::EXTCODEHASH.as_usize()] = eval_extcodehash as _;

		table[Opcode::BLOCKHASH.as_usize()] = eval_blockhash as _;
		table[Opcode::COINBASE.as_usize()] = eval_coinbase as _;
		table[Opcode::TIMESTAMP.as_usize()] = eval_timestamp as _;
		table[Opcode::NUMBER.as_usize()] = eval_number as _;
		table[Opcode::DIFFICULTY.as_usize()] = eval_difficulty as _;
		table[Opcode::GASLIMIT.as_usize()] = eval_gaslimit as _;
		table[Opcode::CHAINID.as_usize()] = eval_chainid as _;
		table[Opcode::SELFBALANCE.as_usize()] = eval_selfbalance as _;
		table[Opcode::BASEFEE.as_usize()] = eval_basefee as _;
		table[Opcode::BLOBHASH.as_usize()] = eval_blobhash as _;
		table[Opcode::BLOBBASEFEE.as_usize()] = eval_blobbasefee as _;

		table[Opcode::POP.as_usize()] = eval_pop as _;
		table[Opcode::MLOAD.as_usize()] = eval_mload as _;
		table[Opcode::MSTORE.as_usize()] = eval_mstore as _;
		table[Opcode::MSTORE8.as_usize()] = eval_mstore8 as _;
		table[Opcode::SLOAD.as_usize()] = eval_sload as _;
		table[Opcode::SSTORE.as_usize()] = eval_sstore as _;
		table[Opcode::JUMP.as_usize()] = eval_jump as _;
		table[Opcode::JUMPI.as_usize()] = eval_jumpi as _;
		table[Opcode::PC.as_usize()] = eval_pc as _;
		table[Opcode::MSIZE.as_usize()] = eval_msize as _;
		table[Opcode::GAS.as_usize()] = eval_gas as _;
		table[Opcode::JUMPDEST.as_usize()] = eval_jumpdest as _;
		table[Opcode::TLOAD.as_usize()] = eval_tload as _;
		table[Opcode::TSTORE.as_usize()] = eval_tstore as _;
		table[Opcode::MCOPY.as_usize()] = eval_mcopy as _;

		table[Opcode::PUSH0.as_usize()] = eval_push0 as _;
		let mut op = Opcode::PUSH1.as_usize();
		while op <= Opcode::PUSH32.as_usize() {
			table[op] = eval_push as _;
			op += 1;
		}
		let mut op = Opcode::DUP1.as_usize();
		while op <= Opcode::DUP16.as_usize() {
			table[op] = eval_dup as _;
			op += 1;
		}
		let mut op = Opcode::SWAP1.as_usize();
		while op <= Opcode::SWAP16.as_usize() {
			table[op] = eval_swap as _;
			op += 1;
		}
		let mut op = Opcode::LOG0.as_usize();
		while op <= Opcode::LOG4.as_usize() {
			table[op] = eval_log as _;
			op += 1;
		}

		table[Opcode::CREATE.as_usize()] = eval_create as _;
		table[Opcode::CALL.as_usize()] = eval_call as _;
		table[Opcode::CALLCODE.as_usize()] = eval_call as _;
		table[Opcode::RETURN.as_usize()] = eval_return as _;
		table[Opcode::DELEGATECALL.as_usize()] = eval_call as _;
		table[Opcode::CREATE2.as_usize()] = eval_create as _;
		table[Opcode::STATICCALL.as_usize()] = eval_call as _;
		table[Opcode::REVERT.as_usize()] = eval_revert as _;
		table[Opcode::INVALID.as_usize()] = eval_invalid as _;
		table[Opcode::SELFDESTRUCT.as_usize()] = eval_selfdestruct as _;

		Self(table, PhantomData)
	}
}
