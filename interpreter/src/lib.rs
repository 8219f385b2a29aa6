//! Baseline interpreter layer for the EVM.
//!
//! A revision-parameterised stack machine: per-fork constant gas tables
//! and instruction traits gate every step, code is pre-analyzed into a
//! JUMPDEST bitmap with padded executable bytes, and all side effects go
//! through the [`Host`] capability trait.

// #![deny(warnings)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod analysis;
mod error;
mod etable;
pub mod eval;
mod fork;
mod interpreter;
mod machine;
mod opcode;
pub mod runtime;
pub mod traits;
pub mod utils;

pub use crate::analysis::CodeAnalysis;
pub use crate::error::{ExitError, ExitException, ExitFatal, ExitResult, ExitSucceed};
pub use crate::etable::{Control, Efn, Etable};
pub use crate::fork::Fork;
pub use crate::interpreter::{execute, Interpreter};
pub use crate::machine::{Context, Machine, Memory, Stack, CALL_DEPTH_LIMIT, STACK_LIMIT};
pub use crate::opcode::Opcode;
pub use crate::runtime::{
	AccessStatus, CallKind, CallOutcome, Host, Message, StorageStatus, TxContext,
};
