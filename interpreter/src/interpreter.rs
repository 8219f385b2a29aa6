//! The fetch–decode–execute loop.

use core::ops::{Deref, DerefMut};

use crate::error::{ExitError, ExitException, ExitResult, ExitSucceed};
use crate::etable::{Control, Etable};
use crate::machine::{Machine, Stack};
use crate::runtime::Host;
use crate::traits;
use crate::{Fork, Opcode};

/// Interpreter for one call frame.
///
/// Every step checks, in order: that the opcode is defined at the active
/// fork, that the stack can satisfy it, and that the constant gas is
/// payable. Only then is the opcode dispatched.
pub struct Interpreter<'etable, H> {
	fork: Fork,
	position: usize,
	machine: Machine,
	etable: &'etable Etable<H>,
}

impl<'etable, H> Deref for Interpreter<'etable, H> {
	type Target = Machine;

	fn deref(&self) -> &Machine {
		&self.machine
	}
}

impl<'etable, H> DerefMut for Interpreter<'etable, H> {
	fn deref_mut(&mut self) -> &mut Machine {
		&mut self.machine
	}
}

impl<'etable, H: Host> Interpreter<'etable, H> {
	pub fn new(machine: Machine, fork: Fork, etable: &'etable Etable<H>) -> Self {
		Self {
			fork,
			position: 0,
			machine,
			etable,
		}
	}

	/// The current program counter.
	#[must_use]
	pub const fn position(&self) -> usize {
		self.position
	}

	#[must_use]
	pub fn machine(&self) -> &Machine {
		&self.machine
	}

	pub fn machine_mut(&mut self) -> &mut Machine {
		&mut self.machine
	}

	pub fn deconstruct(self) -> Machine {
		self.machine
	}

	/// Inspect the machine's next opcode and current stack.
	#[must_use]
	pub fn inspect(&self) -> Option<(Opcode, &Stack)> {
		self.machine
			.analysis
			.executable_code()
			.get(self.position)
			.map(|v| (Opcode(*v), &self.machine.stack))
	}

	/// Execute one instruction.
	#[inline]
	pub fn step(&mut self, handler: &mut H) -> Result<(), ExitResult> {
		let position = self.position;
		let code = self.machine.analysis.executable_code();
		if position >= code.len() {
			return Err(ExitSucceed::Stopped.into());
		}
		let opcode = Opcode(code[position]);

		let cost = traits::cost_table(self.fork)[opcode.as_usize()];
		if cost < 0 {
			return Err(ExitException::UndefinedInstruction.into());
		}

		let tr = traits::traits(opcode);
		let height = self.machine.stack.len();
		if height < tr.stack_required as usize {
			return Err(ExitException::StackUnderflow.into());
		}
		if tr.stack_change > 0 && height >= self.machine.stack.limit() {
			return Err(ExitException::StackOverflow.into());
		}

		self.machine.gas_left -= i64::from(cost);
		if self.machine.gas_left < 0 {
			return Err(ExitException::OutOfGas.into());
		}

		let control = self.etable[opcode.as_usize()](
			&mut self.machine,
			handler,
			self.fork,
			opcode,
			position,
		);

		match control {
			Control::Continue(p) => {
				self.position = position + p;
				Ok(())
			}
			Control::Jump(p) => {
				if self.machine.analysis.is_jumpdest(p) {
					self.position = p;
					Ok(())
				} else {
					Err(ExitException::BadJumpDestination.into())
				}
			}
			Control::Exit(e) => Err(e),
		}
	}

	/// Run the frame to completion. A failing exit consumes all of the
	/// frame's remaining gas; a revert keeps the unconsumed gas.
	pub fn run(&mut self, handler: &mut H) -> ExitResult {
		loop {
			match self.step(handler) {
				Ok(()) => (),
				Err(result) => {
					match &result {
						Err(ExitError::Exception(_)) | Err(ExitError::Fatal(_)) => {
							self.machine.gas_left = 0;
							self.machine.refunded_gas = 0;
						}
						_ => (),
					}
					return result;
				}
			}
		}
	}
}

/// Run a machine to completion against a handler.
pub fn execute<H: Host>(
	machine: Machine,
	handler: &mut H,
	fork: Fork,
	etable: &Etable<H>,
) -> (ExitResult, Machine) {
	let mut interpreter = Interpreter::new(machine, fork, etable);
	let result = interpreter.run(handler);
	(result, interpreter.deconstruct())
}
