mod memory;
mod stack;

use alloc::rc::Rc;
use alloc::vec::Vec;

use primitive_types::{H160, U256};

pub use self::memory::Memory;
pub use self::stack::Stack;

use crate::analysis::CodeAnalysis;
use crate::error::{ExitError, ExitException};

/// Hard limit on the stack depth.
pub const STACK_LIMIT: usize = 1024;

/// Hard limit on call nesting.
pub const CALL_DEPTH_LIMIT: u32 = 1024;

/// Memory offsets and sizes are bounded well below this before any memory
/// is touched; the expansion gas makes larger regions unreachable anyway.
const MAX_BUFFER_SIZE: u64 = u32::MAX as u64;

/// Context of the executing frame.
#[derive(Clone, Debug)]
pub struct Context {
	/// Execution address.
	pub address: H160,
	/// Caller of the EVM.
	pub caller: H160,
	/// Apparent value of the EVM.
	pub apparent_value: U256,
	/// Whether the frame disallows state mutation.
	pub is_static: bool,
	/// Call nesting depth of this frame.
	pub depth: u32,
}

/// Core execution state of one call frame.
pub struct Machine {
	/// Analyzed program code.
	pub analysis: Rc<CodeAnalysis>,
	/// Call input data.
	pub data: Rc<Vec<u8>>,
	/// Return value of this frame, set by `RETURN` or `REVERT`.
	pub retval: Vec<u8>,
	/// Buffer holding the return data of the last sub-call.
	pub retbuf: Vec<u8>,
	/// Memory.
	pub memory: Memory,
	/// Stack.
	pub stack: Stack,
	/// Gas remaining for this frame; any negative intermediate result is
	/// out-of-gas.
	pub gas_left: i64,
	/// Accumulated gas refund.
	pub refunded_gas: i64,
	/// Frame context.
	pub context: Context,
}

impl Machine {
	/// Create a new machine for one frame.
	#[must_use]
	pub fn new(analysis: Rc<CodeAnalysis>, data: Rc<Vec<u8>>, gas: i64, context: Context) -> Self {
		Self {
			analysis,
			data,
			retval: Vec::new(),
			retbuf: Vec::new(),
			memory: Memory::new(),
			stack: Stack::new(STACK_LIMIT),
			gas_left: gas,
			refunded_gas: 0,
			context,
		}
	}

	/// The raw code of this frame.
	#[must_use]
	pub fn code(&self) -> &[u8] {
		self.analysis.raw_code()
	}

	/// Charge an amount of gas.
	#[inline]
	pub fn charge_gas(&mut self, cost: i64) -> Result<(), ExitException> {
		self.gas_left -= cost;
		if self.gas_left < 0 {
			return Err(ExitException::OutOfGas);
		}
		Ok(())
	}

	/// Grow memory to cover `offset..offset + len`, charging the word
	/// growth gas first. A zero `len` never grows memory regardless of the
	/// offset. Returns the offset as `usize`.
	pub fn resize_memory(&mut self, offset: U256, len: U256) -> Result<usize, ExitError> {
		if len.is_zero() {
			return Ok(0);
		}

		let end = offset
			.checked_add(len)
			.ok_or(ExitException::OutOfGas)?;
		if end > U256::from(MAX_BUFFER_SIZE) {
			return Err(ExitException::OutOfGas.into());
		}
		let end = end.as_u64();

		let new_words = (end + 31) / 32;
		let current_words = self.memory.num_words();
		if new_words > current_words {
			let cost = Self::memory_cost(new_words) - Self::memory_cost(current_words);
			self.charge_gas(cost)?;
			self.memory.grow(new_words as usize * 32);
		}

		Ok(offset.as_usize())
	}

	/// Total memory cost at a word count: `words² / 512 + 3 * words`.
	fn memory_cost(words: u64) -> i64 {
		(words * words / 512 + 3 * words) as i64
	}
}
