//! basalt: a baseline Ethereum Virtual Machine.
//!
//! The workspace splits into three layers, re-exported here:
//!
//! - [`interpreter`]: the revision-parameterised bytecode interpreter
//!   with gas tables, code analysis, machine state and the host interface.
//! - [`evmmax`]: fixed-width Montgomery arithmetic, variable-width
//!   modular exponentiation and the short-Weierstrass curve engine.
//! - [`precompile`]: the standard precompiled contracts built on both.
//!
//! This crate adds the consensus glue that sits next to the interpreter:
//! the deposit-request decoding and the requests hash.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod requests;

pub use basalt_evmmax as evmmax;
pub use basalt_interpreter as interpreter;
pub use basalt_precompile as precompile;

pub use basalt_interpreter::{
	execute, CodeAnalysis, Context, Etable, ExitError, ExitException, ExitResult, ExitSucceed,
	Fork, Host, Interpreter, Machine, Opcode,
};
