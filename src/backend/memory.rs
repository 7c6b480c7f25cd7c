use std::collections::{BTreeMap, BTreeSet};

use primitive_types::{H160, H256, U256};

use crate::{
	error::{StateFault, StateResult},
	state::{Log, Snapshot, StateView},
	utils::keccak256,
};

/// Account information of a memory backend.
#[derive(Default, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryAccount {
	/// Account nonce.
	pub nonce: u64,
	/// Account balance.
	pub balance: U256,
	/// Full account storage.
	pub storage: BTreeMap<H256, H256>,
	/// Account code.
	pub code: Vec<u8>,
}

impl MemoryAccount {
	fn is_empty(&self) -> bool {
		self.balance.is_zero() && self.nonce == 0 && self.code.is_empty()
	}
}

/// Changes made after one snapshot. Within a substate, (re)creation of an
/// account is applied before the other writes recorded for it.
#[derive(Clone, Debug, Default)]
struct Substate {
	snapshot: Option<Snapshot>,
	logs: Vec<Log>,
	preimages: BTreeMap<H256, Vec<u8>>,
	balances: BTreeMap<H160, U256>,
	nonces: BTreeMap<H160, u64>,
	codes: BTreeMap<H160, Vec<u8>>,
	storages: BTreeMap<(H160, H256), H256>,
	creates: BTreeSet<H160>,
	suicides: BTreeSet<H160>,
	refund: Option<u64>,
}

impl Substate {
	fn new(snapshot: Option<Snapshot>) -> Self {
		Self {
			snapshot,
			..Default::default()
		}
	}

	/// Fold the changes of `exited`, taken after this substate, into it.
	fn absorb(&mut self, mut exited: Substate) {
		for address in &exited.creates {
			self.nonces.remove(address);
			self.codes.remove(address);
			self.storages.retain(|(a, _), _| a != address);
			self.suicides.remove(address);
		}
		self.creates.append(&mut exited.creates);
		self.suicides.append(&mut exited.suicides);
		self.balances.append(&mut exited.balances);
		self.nonces.append(&mut exited.nonces);
		self.codes.append(&mut exited.codes);
		self.storages.append(&mut exited.storages);
		self.logs.append(&mut exited.logs);
		for (hash, preimage) in exited.preimages {
			self.preimages.entry(hash).or_insert(preimage);
		}
		if exited.refund.is_some() {
			self.refund = exited.refund;
		}
	}
}

/// In-memory state with snapshot support.
///
/// Every snapshot opens a substate on top of the committed accounts;
/// reverting drops the substate together with everything above it and
/// committing folds them into the substate below. Lookups walk the open
/// substates, so their cost grows with the number of uncommitted
/// snapshots, which the engine keeps at the current call depth.
#[derive(Clone, Debug)]
pub struct MemoryState {
	accounts: BTreeMap<H160, MemoryAccount>,
	substates: Vec<Substate>,
	next_snapshot: usize,
}

impl Default for MemoryState {
	fn default() -> Self {
		Self::new(BTreeMap::new())
	}
}

impl MemoryState {
	pub fn new(accounts: BTreeMap<H160, MemoryAccount>) -> Self {
		Self {
			accounts,
			substates: vec![Substate::new(None)],
			next_snapshot: 0,
		}
	}

	/// Accounts as of the last [`finalise`](Self::finalise).
	pub fn accounts(&self) -> &BTreeMap<H160, MemoryAccount> {
		&self.accounts
	}

	/// Logs recorded since the last finalisation, in emission order.
	pub fn logs(&self) -> Vec<Log> {
		self.substates
			.iter()
			.flat_map(|substate| substate.logs.iter().cloned())
			.collect()
	}

	pub fn preimages(&self) -> BTreeMap<H256, Vec<u8>> {
		let mut preimages = BTreeMap::new();
		for substate in &self.substates {
			preimages.extend(substate.preimages.clone());
		}
		preimages
	}

	/// Fold all substates into the accounts, drop suicided accounts and,
	/// if `delete_empty`, empty accounts touched by the transaction. The
	/// refund counter is reset. Returns the logs of the transaction.
	///
	/// Must only be called between transactions.
	pub fn finalise(&mut self, delete_empty: bool) -> Vec<Log> {
		let substates = std::mem::replace(&mut self.substates, vec![Substate::new(None)]);
		let mut touched = BTreeSet::new();
		let mut suicides = BTreeSet::new();
		let mut logs = Vec::new();

		for substate in substates {
			for address in &substate.creates {
				let account = self.accounts.entry(*address).or_default();
				account.nonce = 0;
				account.code = Vec::new();
				account.storage = BTreeMap::new();
				// Re-created after an earlier self-destruct.
				suicides.remove(address);
				touched.insert(*address);
			}
			for (address, balance) in substate.balances {
				self.accounts.entry(address).or_default().balance = balance;
				touched.insert(address);
			}
			for (address, nonce) in substate.nonces {
				self.accounts.entry(address).or_default().nonce = nonce;
				touched.insert(address);
			}
			for (address, code) in substate.codes {
				self.accounts.entry(address).or_default().code = code;
				touched.insert(address);
			}
			for ((address, key), value) in substate.storages {
				let account = self.accounts.entry(address).or_default();
				if value == H256::zero() {
					account.storage.remove(&key);
				} else {
					account.storage.insert(key, value);
				}
				touched.insert(address);
			}
			suicides.extend(substate.suicides);
			logs.extend(substate.logs);
		}

		for address in suicides {
			self.accounts.remove(&address);
		}
		if delete_empty {
			for address in touched {
				if self.accounts.get(&address).map_or(false, MemoryAccount::is_empty) {
					self.accounts.remove(&address);
				}
			}
		}

		logs
	}

	fn current(&mut self) -> &mut Substate {
		let last = self.substates.len() - 1;
		&mut self.substates[last]
	}

	fn known_exists(&self, address: H160) -> bool {
		self.substates
			.iter()
			.any(|substate| substate.creates.contains(&address))
			|| self.accounts.contains_key(&address)
	}

	fn known_balance(&self, address: H160) -> U256 {
		for substate in self.substates.iter().rev() {
			if let Some(balance) = substate.balances.get(&address) {
				return *balance;
			}
		}
		self.accounts
			.get(&address)
			.map(|account| account.balance)
			.unwrap_or_default()
	}

	fn known_nonce(&self, address: H160) -> u64 {
		for substate in self.substates.iter().rev() {
			if let Some(nonce) = substate.nonces.get(&address) {
				return *nonce;
			}
			if substate.creates.contains(&address) {
				return 0;
			}
		}
		self.accounts
			.get(&address)
			.map(|account| account.nonce)
			.unwrap_or_default()
	}

	fn known_code(&self, address: H160) -> Vec<u8> {
		for substate in self.substates.iter().rev() {
			if let Some(code) = substate.codes.get(&address) {
				return code.clone();
			}
			if substate.creates.contains(&address) {
				return Vec::new();
			}
		}
		self.accounts
			.get(&address)
			.map(|account| account.code.clone())
			.unwrap_or_default()
	}

	fn known_storage(&self, address: H160, key: H256) -> H256 {
		for substate in self.substates.iter().rev() {
			if let Some(value) = substate.storages.get(&(address, key)) {
				return *value;
			}
			if substate.creates.contains(&address) {
				return H256::zero();
			}
		}
		self.accounts
			.get(&address)
			.and_then(|account| account.storage.get(&key).copied())
			.unwrap_or_default()
	}

	/// Writes to a missing account bring it into existence.
	fn ensure_exists(&mut self, address: H160) {
		if !self.known_exists(address) {
			self.current().creates.insert(address);
		}
	}
}

impl StateView for MemoryState {
	fn create_account(&mut self, address: H160) -> StateResult<()> {
		let balance = self.known_balance(address);
		let current = self.current();
		current.nonces.remove(&address);
		current.codes.remove(&address);
		current.storages.retain(|(a, _), _| *a != address);
		current.suicides.remove(&address);
		current.creates.insert(address);
		current.balances.insert(address, balance);
		Ok(())
	}

	fn balance(&self, address: H160) -> StateResult<U256> {
		Ok(self.known_balance(address))
	}

	fn add_balance(&mut self, address: H160, amount: U256) -> StateResult<()> {
		self.ensure_exists(address);
		let balance = self.known_balance(address).saturating_add(amount);
		self.current().balances.insert(address, balance);
		Ok(())
	}

	fn sub_balance(&mut self, address: H160, amount: U256) -> StateResult<()> {
		let balance = self
			.known_balance(address)
			.checked_sub(amount)
			.ok_or(StateFault::Corrupted("balance underflow".into()))?;
		self.ensure_exists(address);
		self.current().balances.insert(address, balance);
		Ok(())
	}

	fn nonce(&self, address: H160) -> StateResult<u64> {
		Ok(self.known_nonce(address))
	}

	fn set_nonce(&mut self, address: H160, nonce: u64) -> StateResult<()> {
		self.ensure_exists(address);
		self.current().nonces.insert(address, nonce);
		Ok(())
	}

	fn code_hash(&self, address: H160) -> StateResult<H256> {
		if !self.known_exists(address) {
			return Ok(H256::zero());
		}
		Ok(keccak256(&self.known_code(address)))
	}

	fn code(&self, address: H160) -> StateResult<Vec<u8>> {
		Ok(self.known_code(address))
	}

	fn set_code(&mut self, address: H160, code: Vec<u8>) -> StateResult<()> {
		self.ensure_exists(address);
		self.current().codes.insert(address, code);
		Ok(())
	}

	fn storage(&self, address: H160, key: H256) -> StateResult<H256> {
		Ok(self.known_storage(address, key))
	}

	fn set_storage(&mut self, address: H160, key: H256, value: H256) -> StateResult<()> {
		self.ensure_exists(address);
		self.current().storages.insert((address, key), value);
		Ok(())
	}

	fn suicide(&mut self, address: H160) -> StateResult<bool> {
		if !self.known_exists(address) {
			return Ok(false);
		}
		let current = self.current();
		current.suicides.insert(address);
		current.balances.insert(address, U256::zero());
		Ok(true)
	}

	fn has_suicided(&self, address: H160) -> StateResult<bool> {
		for substate in self.substates.iter().rev() {
			if substate.suicides.contains(&address) {
				return Ok(true);
			}
			if substate.creates.contains(&address) {
				return Ok(false);
			}
		}
		Ok(false)
	}

	fn exists(&self, address: H160) -> StateResult<bool> {
		Ok(self.known_exists(address))
	}

	fn is_empty(&self, address: H160) -> StateResult<bool> {
		Ok(self.known_balance(address).is_zero()
			&& self.known_nonce(address) == 0
			&& self.known_code(address).is_empty())
	}

	fn snapshot(&mut self) -> Snapshot {
		let snapshot = Snapshot(self.next_snapshot);
		self.next_snapshot += 1;
		self.substates.push(Substate::new(Some(snapshot)));
		snapshot
	}

	fn commit_snapshot(&mut self, snapshot: Snapshot) {
		if let Some(position) = self
			.substates
			.iter()
			.position(|substate| substate.snapshot == Some(snapshot))
		{
			// Position 0 is the base substate, never a snapshot.
			let exited = self.substates.split_off(position);
			let parent = self.current();
			for substate in exited {
				parent.absorb(substate);
			}
		}
	}

	fn revert_to_snapshot(&mut self, snapshot: Snapshot) {
		if let Some(position) = self
			.substates
			.iter()
			.position(|substate| substate.snapshot == Some(snapshot))
		{
			log::trace!(target: "zvm", "revert to snapshot {} dropping {} substates", snapshot.0, self.substates.len() - position);
			self.substates.truncate(position);
		}
	}

	fn add_refund(&mut self, gas: u64) {
		let refund = self.refund().saturating_add(gas);
		self.current().refund = Some(refund);
	}

	fn refund(&self) -> u64 {
		self.substates
			.iter()
			.rev()
			.find_map(|substate| substate.refund)
			.unwrap_or_default()
	}

	fn log(&mut self, log: Log) {
		self.current().logs.push(log);
	}

	fn add_preimage(&mut self, hash: H256, preimage: Vec<u8>) {
		self.current().preimages.entry(hash).or_insert(preimage);
	}

	fn for_each_storage(
		&self,
		address: H160,
		f: &mut dyn FnMut(H256, H256) -> bool,
	) -> StateResult<()> {
		let mut storage = self
			.accounts
			.get(&address)
			.map(|account| account.storage.clone())
			.unwrap_or_default();
		for substate in &self.substates {
			if substate.creates.contains(&address) {
				storage.clear();
			}
			for ((a, key), value) in &substate.storages {
				if *a == address {
					storage.insert(*key, *value);
				}
			}
		}

		for (key, value) in storage {
			if value != H256::zero() && !f(key, value) {
				break;
			}
		}
		Ok(())
	}
}
