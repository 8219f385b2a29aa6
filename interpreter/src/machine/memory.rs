use alloc::vec::Vec;
use core::cmp::min;

use primitive_types::U256;

use crate::error::{ExitException, ExitFatal};

/// A sequential byte-addressable memory. Growth happens in 32-byte words
/// and is paid for by the owning frame before any access.
#[derive(Clone, Debug, Default)]
pub struct Memory {
	data: Vec<u8>,
}

impl Memory {
	#[must_use]
	pub fn new() -> Self {
		Self { data: Vec::new() }
	}

	/// The length of the current effective memory range.
	#[must_use]
	pub fn len(&self) -> usize {
		self.data.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Number of 32-byte words currently allocated.
	#[must_use]
	pub fn num_words(&self) -> u64 {
		(self.data.len() as u64 + 31) / 32
	}

	/// Resize to hold at least `size` bytes, rounded up to the next word.
	/// The caller has already charged the expansion gas.
	pub(crate) fn grow(&mut self, size: usize) {
		if size <= self.data.len() {
			return;
		}
		let size = (size + 31) / 32 * 32;
		self.data.resize(size, 0);
	}

	/// Copy of the memory region; the region must be in bounds.
	#[must_use]
	pub fn get(&self, offset: usize, size: usize) -> Vec<u8> {
		let mut ret = Vec::new();
		ret.resize(size, 0);

		for (index, byte) in ret.iter_mut().enumerate() {
			let position = offset + index;
			if position >= self.data.len() {
				break;
			}
			*byte = self.data[position];
		}

		ret
	}

	/// Borrow of the memory region; the region must be in bounds.
	#[must_use]
	pub fn slice(&self, offset: usize, size: usize) -> &[u8] {
		&self.data[offset..offset + size]
	}

	/// Set a memory region from `value`, zero-filling up to `target_size`
	/// when the value is shorter. The region must be in bounds.
	pub fn set(
		&mut self,
		offset: usize,
		value: &[u8],
		target_size: Option<usize>,
	) -> Result<(), ExitFatal> {
		let target_size = target_size.unwrap_or(value.len());
		if target_size == 0 {
			return Ok(());
		}

		if offset
			.checked_add(target_size)
			.map(|end| end > self.data.len())
			.unwrap_or(true)
		{
			return Err(ExitFatal::NotSupported);
		}

		let copy_len = min(value.len(), target_size);
		self.data[offset..offset + copy_len].copy_from_slice(&value[..copy_len]);
		for byte in &mut self.data[offset + copy_len..offset + target_size] {
			*byte = 0;
		}

		Ok(())
	}

	/// Copy within memory, as `MCOPY` does. The regions must be in bounds;
	/// they may overlap.
	pub fn copy_within(&mut self, destination: usize, source: usize, len: usize) {
		if len == 0 {
			return;
		}
		self.data.copy_within(source..source + len, destination);
	}

	/// Copy from a data buffer into memory with the EVM copy semantics:
	/// bytes past the end of `data` read as zero.
	pub fn copy_large(
		&mut self,
		memory_offset: U256,
		data_offset: U256,
		len: U256,
		data: &[u8],
	) -> Result<(), ExitException> {
		if len.is_zero() {
			return Ok(());
		}

		let memory_offset = if memory_offset > U256::from(usize::MAX) {
			return Err(ExitException::InvalidMemoryAccess);
		} else {
			memory_offset.as_usize()
		};
		let ulen = if len > U256::from(usize::MAX) {
			return Err(ExitException::InvalidMemoryAccess);
		} else {
			len.as_usize()
		};

		let data = if let Some(end) = data_offset.checked_add(len) {
			if data_offset > U256::from(usize::MAX) {
				&[]
			} else {
				let data_offset = data_offset.as_usize();
				let end = min(end, U256::from(data.len())).as_usize();
				if data_offset > data.len() {
					&[]
				} else {
					&data[data_offset..end]
				}
			}
		} else {
			&[]
		};

		self.set(memory_offset, data, Some(ulen))
			.map_err(|_| ExitException::InvalidMemoryAccess)
	}
}
