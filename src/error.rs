use std::borrow::Cow;
use std::fmt;

/// Exit result of a call frame.
pub type ExitResult = Result<ExitSucceed, ExitError>;

/// Result of an operation against the backing state.
pub type StateResult<T> = Result<T, StateFault>;

/// Exit succeed reason.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExitSucceed {
	/// Machine encountered an explicit stop.
	Stopped,
	/// Machine encountered an explicit return.
	Returned,
	/// Machine encountered an explicit suicide.
	Suicided,
}

impl From<ExitSucceed> for ExitResult {
	fn from(s: ExitSucceed) -> Self {
		Ok(s)
	}
}

/// Exit reason of a failed frame.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExitError {
	/// Normal failure. State is reverted and remaining gas is consumed.
	Exception(ExitException),
	/// Explicit revert. State is reverted but unused gas is returned.
	Reverted,
	/// Failure that must abort the whole execution.
	Fatal(ExitFatal),
}

impl ExitError {
	/// Whether the frame keeps its unused gas on this failure.
	pub fn is_reverted(&self) -> bool {
		matches!(self, Self::Reverted)
	}

	pub fn is_fatal(&self) -> bool {
		matches!(self, Self::Fatal(_))
	}
}

impl From<ExitError> for ExitResult {
	fn from(s: ExitError) -> Self {
		Err(s)
	}
}

impl std::error::Error for ExitError {}

impl fmt::Display for ExitError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Exception(e) => write!(f, "{}", e),
			Self::Reverted => write!(f, "execution reverted"),
			Self::Fatal(e) => write!(f, "fatal: {}", e),
		}
	}
}

/// Exceptional halt of a frame.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExitException {
	/// Call stack is deeper than the configured limit.
	CallTooDeep,
	/// Caller cannot cover the transferred value.
	OutOfFund,
	/// Create target is already occupied.
	CreateCollision,
	/// Execution runs out of gas.
	OutOfGas,
	/// Not enough gas left to pay for storing the deployed code.
	CodeStoreOutOfGas,
	/// Deployed code exceeds the maximum code size.
	CreateContractLimit,
	/// A state mutation was attempted in read-only mode.
	WriteProtection,
	/// Nonce reached maximum value of 2^64-1.
	MaxNonce,
	/// Execution was cancelled through the abort flag.
	Aborted,

	/// Trying to pop from an empty stack.
	StackUnderflow,
	/// Trying to push into a stack over stack limit.
	StackOverflow,
	/// Jump destination is invalid.
	InvalidJump,
	/// An opcode accesses memory region, but the region is invalid.
	InvalidRange,
	/// Invalid opcode during execution.
	InvalidOpcode(u8),
	/// Encountered the designated invalid opcode.
	DesignatedInvalid,

	/// Other normal errors.
	Other(Cow<'static, str>),
}

impl From<ExitException> for ExitError {
	fn from(s: ExitException) -> Self {
		Self::Exception(s)
	}
}

impl From<ExitException> for ExitResult {
	fn from(s: ExitException) -> Self {
		Err(ExitError::Exception(s))
	}
}

impl fmt::Display for ExitException {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::CallTooDeep => write!(f, "max call depth exceeded"),
			Self::OutOfFund => write!(f, "insufficient balance for transfer"),
			Self::CreateCollision => write!(f, "contract address collision"),
			Self::OutOfGas => write!(f, "out of gas"),
			Self::CodeStoreOutOfGas => write!(f, "contract creation code storage out of gas"),
			Self::CreateContractLimit => write!(f, "max code size exceeded"),
			Self::WriteProtection => write!(f, "write protection"),
			Self::MaxNonce => write!(f, "nonce uint64 overflow"),
			Self::Aborted => write!(f, "execution aborted"),
			Self::InvalidOpcode(op) => write!(f, "invalid opcode 0x{:02x}", op),
			Self::Other(msg) => write!(f, "{}", msg),
			other => write!(f, "{:?}", other),
		}
	}
}

/// Exit fatal reason.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExitFatal {
	/// The backing state failed.
	StateFault(StateFault),
	/// The operation is not supported.
	NotSupported,
	/// Other fatal errors.
	Other(Cow<'static, str>),
}

impl From<ExitFatal> for ExitError {
	fn from(s: ExitFatal) -> Self {
		Self::Fatal(s)
	}
}

impl From<ExitFatal> for ExitResult {
	fn from(s: ExitFatal) -> Self {
		Err(ExitError::Fatal(s))
	}
}

impl fmt::Display for ExitFatal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::StateFault(fault) => write!(f, "{}", fault),
			Self::NotSupported => write!(f, "operation not supported"),
			Self::Other(msg) => write!(f, "{}", msg),
		}
	}
}

/// Failure of the backing store. Unrecoverable for the current execution.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateFault {
	/// Stored data is inconsistent, e.g. a missing trie node.
	Corrupted(Cow<'static, str>),
	/// The store cannot be reached.
	Unavailable(Cow<'static, str>),
}

impl std::error::Error for StateFault {}

impl fmt::Display for StateFault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Corrupted(msg) => write!(f, "state corrupted: {}", msg),
			Self::Unavailable(msg) => write!(f, "state unavailable: {}", msg),
		}
	}
}

impl From<StateFault> for ExitFatal {
	fn from(fault: StateFault) -> Self {
		Self::StateFault(fault)
	}
}

impl From<StateFault> for ExitError {
	fn from(fault: StateFault) -> Self {
		Self::Fatal(ExitFatal::StateFault(fault))
	}
}
