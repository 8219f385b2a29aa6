//! Standard EVM precompiles.

// #![deny(warnings)]
#![cfg_attr(not(feature = "std"), no_std)]

macro_rules! try_some {
	($e:expr) => {
		match $e {
			Ok(v) => v,
			Err(err) => return (Err(err.into()), Vec::new()),
		}
	};
}

extern crate alloc;

mod blake2;
mod bn254;
mod modexp;
mod p256;
mod simple;

use alloc::vec::Vec;

use basalt_interpreter::{ExitError, ExitException, ExitResult, Fork};
use primitive_types::{H160, U256};

pub use crate::blake2::Blake2F;
pub use crate::bn254::{Bn254Add, Bn254Mul, Bn254Pairing};
pub use crate::modexp::Modexp;
pub use crate::p256::P256Verify;
pub use crate::simple::{ECRecover, Identity, Ripemd160, Sha256};

/// Gas accounting surface a precompile draws from.
pub trait GasMutState {
	fn record_gas(&mut self, gas: U256) -> Result<(), ExitError>;
}

/// A plain gasometer for one precompile frame.
#[derive(Clone, Debug)]
pub struct Gasometer {
	gas_left: i64,
}

impl Gasometer {
	#[must_use]
	pub fn new(gas_limit: i64) -> Self {
		Self { gas_left: gas_limit }
	}

	#[must_use]
	pub fn gas_left(&self) -> i64 {
		self.gas_left
	}
}

impl GasMutState for Gasometer {
	fn record_gas(&mut self, gas: U256) -> Result<(), ExitError> {
		if gas > U256::from(self.gas_left as u64) {
			return Err(ExitException::OutOfGas.into());
		}
		self.gas_left -= gas.as_u64() as i64;
		Ok(())
	}
}

/// A precompiled contract: pure input-to-output function plus gas.
pub trait PurePrecompile<G> {
	fn execute(&self, input: &[u8], gasometer: &mut G) -> (ExitResult, Vec<u8>);
}

/// The standard precompile set, keyed by the active fork.
pub struct StandardPrecompileSet;

impl StandardPrecompileSet {
	/// Whether the address is a precompiled contract at the fork.
	#[must_use]
	pub fn is_precompile(fork: Fork, code_address: H160) -> bool {
		if code_address == address(0x100) {
			return fork >= Fork::PRAGUE;
		}

		let last = match fork {
			f if f >= Fork::ISTANBUL => 9,
			f if f >= Fork::BYZANTIUM => 8,
			_ => 4,
		};
		(1..=last).any(|n| code_address == address(n))
	}

	/// Execute the precompile at the address, or `None` when the address
	/// is not a precompile at the fork.
	pub fn execute<G: GasMutState>(
		fork: Fork,
		code_address: H160,
		input: &[u8],
		gasometer: &mut G,
	) -> Option<(ExitResult, Vec<u8>)> {
		if !Self::is_precompile(fork, code_address) {
			return None;
		}

		if code_address == address(1) {
			Some(ECRecover.execute(input, gasometer))
		} else if code_address == address(2) {
			Some(Sha256.execute(input, gasometer))
		} else if code_address == address(3) {
			Some(Ripemd160.execute(input, gasometer))
		} else if code_address == address(4) {
			Some(Identity.execute(input, gasometer))
		} else if code_address == address(5) {
			Some(Modexp::for_fork(fork).execute(input, gasometer))
		} else if code_address == address(6) {
			Some(Bn254Add::for_fork(fork).execute(input, gasometer))
		} else if code_address == address(7) {
			Some(Bn254Mul::for_fork(fork).execute(input, gasometer))
		} else if code_address == address(8) {
			Some(Bn254Pairing::for_fork(fork).execute(input, gasometer))
		} else if code_address == address(9) {
			Some(Blake2F.execute(input, gasometer))
		} else if code_address == address(0x100) {
			Some(P256Verify.execute(input, gasometer))
		} else {
			None
		}
	}
}

fn linear_cost(len: u64, base: u64, word: u64) -> Result<u64, ExitError> {
	let cost = base
		.checked_add(
			word.checked_mul(len.saturating_add(31) / 32)
				.ok_or(ExitException::OutOfGas)?,
		)
		.ok_or(ExitException::OutOfGas)?;

	Ok(cost)
}

const fn address(last: u16) -> H160 {
	let bytes = last.to_be_bytes();
	H160([
		0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, bytes[0], bytes[1],
	])
}
