/// EVM supported forks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Fork {
	FRONTIER,
	HOMESTEAD,
	TANGERINE,
	SPURIOUS,
	BYZANTIUM,
	CONSTANTINOPLE,
	PETERSBURG,
	ISTANBUL,
	BERLIN,
	LONDON,
	MERGE,
	SHANGHAI,
	CANCUN,
	PRAGUE,
}

impl Fork {
	/// Number of known forks.
	pub const COUNT: usize = 14;

	/// The newest supported fork.
	pub const LATEST: Fork = Fork::PRAGUE;

	/// All forks, oldest first.
	pub const ALL: [Fork; Fork::COUNT] = [
		Fork::FRONTIER,
		Fork::HOMESTEAD,
		Fork::TANGERINE,
		Fork::SPURIOUS,
		Fork::BYZANTIUM,
		Fork::CONSTANTINOPLE,
		Fork::PETERSBURG,
		Fork::ISTANBUL,
		Fork::BERLIN,
		Fork::LONDON,
		Fork::MERGE,
		Fork::SHANGHAI,
		Fork::CANCUN,
		Fork::PRAGUE,
	];

	#[must_use]
	pub const fn index(self) -> usize {
		self as usize
	}
}
