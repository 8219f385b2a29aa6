use alloc::borrow::Cow;

use crate::Opcode;

/// Exit result.
pub type ExitResult = Result<ExitSucceed, ExitError>;

/// Exit reason.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExitError {
	/// Machine returns a normal EVM error.
	Exception(ExitException),
	/// Machine encountered an explicit revert.
	Reverted,
	/// Machine encountered an error that is not supposed to be a normal
	/// EVM error, such as requiring too much memory to execute.
	Fatal(ExitFatal),
}

impl From<ExitError> for ExitResult {
	fn from(s: ExitError) -> Self {
		Err(s)
	}
}

#[cfg(feature = "std")]
impl std::error::Error for ExitError {}

#[cfg(feature = "std")]
impl std::fmt::Display for ExitError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self)
	}
}

/// Exit succeed reason.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExitSucceed {
	/// Machine encountered an explicit stop.
	Stopped,
	/// Machine encountered an explicit return.
	Returned,
	/// Machine encountered an explicit self destruct.
	Suicided,
}

impl From<ExitSucceed> for ExitResult {
	fn from(s: ExitSucceed) -> Self {
		Ok(s)
	}
}

/// Exit error reason. Fatal to the current frame and consumes all of its
/// remaining gas.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExitException {
	/// Trying to pop from an empty stack.
	StackUnderflow,
	/// Trying to push into a stack over the stack limit.
	StackOverflow,
	/// Jump destination is invalid.
	BadJumpDestination,
	/// An opcode accesses a memory region, but the region is invalid.
	InvalidMemoryAccess,
	/// The opcode is not defined at the active fork.
	UndefinedInstruction,
	/// Encountered the designated invalid opcode.
	InvalidInstruction(Opcode),
	/// Execution runs out of gas.
	OutOfGas,
	/// Not enough fund to start the execution.
	OutOfFund,
	/// Call stack is deeper than the 1024 limit.
	StackLimitExceeded,
	/// A state-mutating opcode was executed in a static frame.
	StaticModeViolation,
	/// A precompiled contract rejected its input.
	PrecompileFailure,

	/// Other normal errors.
	Other(Cow<'static, str>),
}

impl From<ExitException> for ExitResult {
	fn from(s: ExitException) -> Self {
		Err(ExitError::Exception(s))
	}
}

impl From<ExitException> for ExitError {
	fn from(s: ExitException) -> Self {
		Self::Exception(s)
	}
}

/// Exit fatal reason.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExitFatal {
	/// The operation is not supported.
	NotSupported,
	/// Already exited.
	AlreadyExited,

	/// Other fatal errors.
	Other(Cow<'static, str>),
}

impl From<ExitFatal> for ExitResult {
	fn from(s: ExitFatal) -> Self {
		Err(ExitError::Fatal(s))
	}
}

impl From<ExitFatal> for ExitError {
	fn from(s: ExitFatal) -> Self {
		Self::Fatal(s)
	}
}
