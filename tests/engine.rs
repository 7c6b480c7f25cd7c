
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use mock::*;
use primitive_types::{H160, U256};
use zvm::{
	CallContext, ChainConfig, Config, Engine, ExitError, ExitException, ExitFatal, ExitSucceed,
	StandardPrecompileSet, StateFault, StateView,
};

const GAS: u64 = 1_000_000;

fn identity() -> H160 {
	H160::from_low_u64_be(4)
}

#[test]
fn call_transfers_value() {
	let (a, b) = (address(0xa), address(0xb));
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let interpreter = MockInterpreter::new();

	let engine = Engine::new(
		context(),
		state(vec![(a, account(100, &[])), (b, account(0, &[]))]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, state) = engine.transact_call(a, b, Vec::new(), GAS, U256::from(30));

	assert_eq!(output.result, Ok(ExitSucceed::Stopped));
	assert_eq!(output.gas_left, GAS);
	assert_eq!(state.balance(a).unwrap(), U256::from(70));
	assert_eq!(state.balance(b).unwrap(), U256::from(30));
}

#[test]
fn call_without_funds_fails_before_mutation() {
	let (a, b) = (address(0xa), address(0xb));
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let interpreter = MockInterpreter::new();

	let engine = Engine::new(
		context(),
		state(vec![(a, account(100, &[]))]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, state) = engine.transact_call(a, b, Vec::new(), GAS, U256::from(101));

	assert_eq!(output.result, Err(ExitException::OutOfFund.into()));
	assert_eq!(output.gas_left, GAS);
	assert_eq!(state.balance(a).unwrap(), U256::from(100));
	assert!(!state.exists(b).unwrap());
}

#[test]
fn valueless_call_to_missing_account_is_free() {
	let (a, b) = (address(0xa), address(0xb));
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let interpreter = MockInterpreter::new();

	let engine = Engine::new(
		context(),
		state(vec![(a, account(100, &[]))]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, state) = engine.transact_call(a, b, Vec::new(), GAS, U256::zero());

	assert_eq!(output.result, Ok(ExitSucceed::Stopped));
	assert_eq!(output.gas_left, GAS);
	assert!(!state.exists(b).unwrap());
}

#[test]
fn valueless_call_creates_account_before_eip158() {
	let (a, b) = (address(0xa), address(0xb));
	let chain = ChainConfig::homestead();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let interpreter = MockInterpreter::new();

	let engine = Engine::new(
		context(),
		state(vec![(a, account(100, &[]))]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, state) = engine.transact_call(a, b, Vec::new(), GAS, U256::zero());

	assert_eq!(output.result, Ok(ExitSucceed::Stopped));
	assert!(state.exists(b).unwrap());
}

#[test]
fn exception_reverts_and_forfeits_gas() {
	let (a, b) = (address(0xa), address(0xb));
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let interpreter = MockInterpreter::new().with(&[0x01], |ctx, contract| {
		ctx.set_storage(contract.address(), key(1), key(1)).unwrap();
		(Err(ExitException::OutOfGas.into()), vec![0xff])
	});

	let engine = Engine::new(
		context(),
		state(vec![(a, account(100, &[])), (b, account(0, &[0x01]))]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, state) = engine.transact_call(a, b, Vec::new(), GAS, U256::from(10));

	assert_eq!(output.result, Err(ExitException::OutOfGas.into()));
	assert_eq!(output.gas_left, 0);
	assert!(output.output.is_empty());
	assert_eq!(state.balance(a).unwrap(), U256::from(100));
	assert_eq!(state.balance(b).unwrap(), U256::zero());
	assert_eq!(state.storage(b, key(1)).unwrap(), key(0));
}

#[test]
fn revert_keeps_unused_gas() {
	let (a, b) = (address(0xa), address(0xb));
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let interpreter = MockInterpreter::new().with(&[0x01], |ctx, contract| {
		ctx.set_storage(contract.address(), key(1), key(1)).unwrap();
		contract.use_gas(300).unwrap();
		(Err(ExitError::Reverted), b"nope".to_vec())
	});

	let engine = Engine::new(
		context(),
		state(vec![(a, account(100, &[])), (b, account(0, &[0x01]))]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, state) = engine.transact_call(a, b, Vec::new(), GAS, U256::from(10));

	assert_eq!(output.result, Err(ExitError::Reverted));
	assert_eq!(output.gas_left, GAS - 300);
	assert_eq!(output.output, b"nope".to_vec());
	assert_eq!(state.balance(a).unwrap(), U256::from(100));
	assert_eq!(state.storage(b, key(1)).unwrap(), key(0));
}

#[test]
fn nested_failure_stays_in_its_frame() {
	let (a, b, c) = (address(0xa), address(0xb), address(0xc));
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let child = Rc::new(RefCell::new(None));
	let seen = child.clone();

	let interpreter = MockInterpreter::new()
		.with(&[0x01], move |ctx, contract| {
			ctx.set_storage(contract.address(), key(1), key(1)).unwrap();
			let output = ctx.call(contract, address(0xc), Vec::new(), 5_000, U256::from(3));
			contract.use_gas(5_000 - output.gas_left).unwrap();
			*seen.borrow_mut() = Some(output);
			(Ok(ExitSucceed::Returned), Vec::new())
		})
		.with(&[0x02], |ctx, contract| {
			ctx.set_storage(contract.address(), key(2), key(2)).unwrap();
			(Err(ExitException::InvalidJump.into()), Vec::new())
		});

	let engine = Engine::new(
		context(),
		state(vec![
			(a, account(100, &[])),
			(b, account(50, &[0x01])),
			(c, account(0, &[0x02])),
		]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, state) = engine.transact_call(a, b, Vec::new(), GAS, U256::zero());

	assert_eq!(output.result, Ok(ExitSucceed::Returned));
	assert_eq!(output.gas_left, GAS - 5_000);

	let child = child.borrow().clone().unwrap();
	assert_eq!(child.result, Err(ExitException::InvalidJump.into()));
	assert_eq!(child.gas_left, 0);

	assert_eq!(state.storage(b, key(1)).unwrap(), key(1));
	assert_eq!(state.storage(c, key(2)).unwrap(), key(0));
	assert_eq!(state.balance(b).unwrap(), U256::from(50));
	assert_eq!(state.balance(c).unwrap(), U256::zero());
}

#[test]
fn outer_revert_undoes_successful_inner_frame() {
	let (a, b, c) = (address(0xa), address(0xb), address(0xc));
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();

	let interpreter = MockInterpreter::new()
		.with(&[0x01], |ctx, contract| {
			let output = ctx.call(contract, address(0xc), Vec::new(), 5_000, U256::from(3));
			assert_eq!(output.result, Ok(ExitSucceed::Stopped));
			assert_eq!(ctx.state().storage(address(0xc), key(2)).unwrap(), key(2));
			(Err(ExitError::Reverted), Vec::new())
		})
		.with(&[0x02], |ctx, contract| {
			ctx.set_storage(contract.address(), key(2), key(2)).unwrap();
			(Ok(ExitSucceed::Stopped), Vec::new())
		});

	let engine = Engine::new(
		context(),
		state(vec![
			(a, account(0, &[])),
			(b, account(50, &[0x01])),
			(c, account(0, &[0x02])),
		]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, state) = engine.transact_call(a, b, Vec::new(), GAS, U256::zero());

	assert_eq!(output.result, Err(ExitError::Reverted));
	assert_eq!(state.storage(c, key(2)).unwrap(), key(0));
	assert_eq!(state.balance(b).unwrap(), U256::from(50));
	assert_eq!(state.balance(c).unwrap(), U256::zero());
}

#[test]
fn call_depth_is_bounded() {
	let handle = thread::Builder::new()
		.stack_size(256 * 1024 * 1024)
		.spawn(|| {
			let (a, b) = (address(0xa), address(0xb));
			let chain = ChainConfig::byzantium();
			let config = Config::default();
			let precompiles = StandardPrecompileSet::new();
			let rejected = Rc::new(RefCell::new(Vec::new()));
			let seen = rejected.clone();

			let interpreter = MockInterpreter::new().with(&[0x01], move |ctx, contract| {
				let depth = ctx.depth();
				ctx.set_storage(contract.address(), key(depth as u64), key(1))
					.unwrap();
				let output = ctx.call(contract, contract.address(), Vec::new(), contract.gas(), U256::zero());
				if output.result == Err(ExitException::CallTooDeep.into()) {
					assert_eq!(output.gas_left, contract.gas());
					seen.borrow_mut().push(depth);
				}
				(Ok(ExitSucceed::Returned), Vec::new())
			});

			let engine = Engine::new(
				context(),
				state(vec![(a, account(0, &[])), (b, account(0, &[0x01]))]),
				&chain,
				&config,
				&precompiles,
				&interpreter,
			);
			let (output, state) = engine.transact_call(a, b, Vec::new(), GAS, U256::zero());

			assert_eq!(output.result, Ok(ExitSucceed::Returned));
			// The call made at depth 1024 runs, the one made at depth 1025 is rejected.
			assert_eq!(*rejected.borrow(), vec![1025]);
			assert_eq!(state.storage(b, key(1025)).unwrap(), key(1));
			assert_eq!(state.storage(b, key(1026)).unwrap(), key(0));
		})
		.unwrap();

	handle.join().unwrap();
}

#[test]
fn delegate_call_keeps_parent_frame() {
	let (origin, a, lib) = (address(0xee), address(0xa), address(0x1b));
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let observed = Rc::new(RefCell::new(None));
	let seen = observed.clone();

	let interpreter = MockInterpreter::new()
		.with(&[0x01], move |ctx, contract| {
			let output = ctx.delegate_call(contract, lib, Vec::new(), 10_000);
			(output.result, output.output)
		})
		.with(&[0x02], move |ctx, contract| {
			*seen.borrow_mut() = Some((contract.caller(), contract.address(), contract.value()));
			assert!(contract.is_delegate());
			ctx.set_storage(contract.address(), key(1), key(7)).unwrap();
			(Ok(ExitSucceed::Stopped), Vec::new())
		});

	let engine = Engine::new(
		context(),
		state(vec![
			(origin, account(100, &[])),
			(a, account(0, &[0x01])),
			(lib, account(0, &[0x02])),
		]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, state) = engine.transact_call(origin, a, Vec::new(), GAS, U256::from(7));

	assert_eq!(output.result, Ok(ExitSucceed::Stopped));
	assert_eq!(*observed.borrow(), Some((origin, a, U256::from(7))));
	assert_eq!(state.storage(a, key(1)).unwrap(), key(7));
	assert_eq!(state.storage(lib, key(1)).unwrap(), key(0));
	assert_eq!(state.balance(a).unwrap(), U256::from(7));
	assert_eq!(state.balance(lib).unwrap(), U256::zero());
}

#[test]
fn call_code_runs_on_callers_account() {
	let (origin, a, lib) = (address(0xee), address(0xa), address(0x1b));
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let observed = Rc::new(RefCell::new(None));
	let seen = observed.clone();

	let interpreter = MockInterpreter::new()
		.with(&[0x01], move |ctx, contract| {
			let output = ctx.call_code(contract, lib, Vec::new(), 10_000, U256::from(5));
			(output.result, output.output)
		})
		.with(&[0x02], move |ctx, contract| {
			*seen.borrow_mut() = Some((contract.caller(), contract.address(), contract.value()));
			ctx.set_storage(contract.address(), key(1), key(9)).unwrap();
			(Ok(ExitSucceed::Stopped), Vec::new())
		});

	let engine = Engine::new(
		context(),
		state(vec![
			(origin, account(0, &[])),
			(a, account(20, &[0x01])),
			(lib, account(0, &[0x02])),
		]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, state) = engine.transact_call(origin, a, Vec::new(), GAS, U256::zero());

	assert_eq!(output.result, Ok(ExitSucceed::Stopped));
	assert_eq!(*observed.borrow(), Some((a, a, U256::from(5))));
	assert_eq!(state.storage(a, key(1)).unwrap(), key(9));
	assert_eq!(state.storage(lib, key(1)).unwrap(), key(0));
	assert_eq!(state.balance(a).unwrap(), U256::from(20));
	assert_eq!(state.balance(lib).unwrap(), U256::zero());
}

#[test]
fn call_code_needs_funds() {
	let (origin, a, lib) = (address(0xee), address(0xa), address(0x1b));
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let interpreter = MockInterpreter::new().with(&[0x01], |ctx, contract| {
		let output = ctx.call_code(contract, address(0x1b), Vec::new(), 10_000, U256::from(21));
		assert_eq!(output.gas_left, 10_000);
		(output.result, output.output)
	});

	let engine = Engine::new(
		context(),
		state(vec![(a, account(20, &[0x01])), (lib, account(0, &[0x02]))]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, _) = engine.transact_call(origin, a, Vec::new(), GAS, U256::zero());

	assert_eq!(output.result, Err(ExitException::OutOfFund.into()));
}

#[test]
fn precompile_charges_and_receives_value() {
	let a = address(0xa);
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let interpreter = MockInterpreter::new();

	let engine = Engine::new(
		context(),
		state(vec![(a, account(100, &[]))]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, state) = engine.transact_call(a, identity(), vec![1, 2, 3], 100, U256::one());

	assert_eq!(output.result, Ok(ExitSucceed::Returned));
	assert_eq!(output.output, vec![1, 2, 3]);
	assert_eq!(output.gas_left, 82);
	assert_eq!(state.balance(identity()).unwrap(), U256::one());
	assert_eq!(state.balance(a).unwrap(), U256::from(99));
}

#[test]
fn precompile_out_of_gas_reverts_value() {
	let a = address(0xa);
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let interpreter = MockInterpreter::new();

	let engine = Engine::new(
		context(),
		state(vec![(a, account(100, &[]))]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, state) = engine.transact_call(a, identity(), vec![1, 2, 3], 10, U256::one());

	assert_eq!(output.result, Err(ExitException::OutOfGas.into()));
	assert_eq!(output.gas_left, 0);
	assert_eq!(state.balance(a).unwrap(), U256::from(100));
	assert!(!state.exists(identity()).unwrap());
}

#[test]
fn precompile_table_follows_fork() {
	let a = address(0xa);
	let modexp = H160::from_low_u64_be(5);
	let chain = ChainConfig::homestead();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let interpreter = MockInterpreter::new();

	let engine = Engine::new(
		context(),
		state(vec![(a, account(100, &[]))]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, _) = engine.transact_call(a, modexp, vec![0; 96], 100, U256::zero());

	// No modexp before Byzantium: an empty account, nothing to run.
	assert_eq!(output.result, Ok(ExitSucceed::Stopped));
	assert_eq!(output.gas_left, 100);
}

#[test]
fn abort_from_another_thread_unwinds() {
	let (a, b) = (address(0xa), address(0xb));
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let interpreter = MockInterpreter::new().with(&[0x01], |ctx, contract| {
		ctx.set_storage(contract.address(), key(1), key(1)).unwrap();
		while !ctx.is_aborted() {
			thread::sleep(Duration::from_millis(1));
		}
		(Err(ExitException::Aborted.into()), Vec::new())
	});

	let engine = Engine::new(
		context(),
		state(vec![(a, account(100, &[])), (b, account(0, &[0x01]))]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);

	let handle = engine.abort_handle();
	let watchdog = thread::spawn(move || {
		thread::sleep(Duration::from_millis(20));
		handle.cancel();
	});

	let (output, state) = engine.transact_call(a, b, Vec::new(), GAS, U256::from(10));
	watchdog.join().unwrap();

	assert_eq!(output.result, Err(ExitException::Aborted.into()));
	assert_eq!(output.gas_left, 0);
	assert_eq!(state.storage(b, key(1)).unwrap(), key(0));
	assert_eq!(state.balance(a).unwrap(), U256::from(100));
}

#[test]
fn abort_handle_is_shared() {
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let interpreter = MockInterpreter::new();
	let engine = Engine::new(
		context(),
		state(Vec::new()),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);

	let handle = engine.abort_handle();
	assert!(!CallContext::is_aborted(&engine));
	handle.clone().cancel();
	assert!(handle.is_cancelled());
	assert!(CallContext::is_aborted(&engine));
}

#[test]
fn state_fault_aborts_execution() {
	let (a, b, poisoned, c) = (address(0xa), address(0xb), address(0xdd), address(0xc));
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let ran = Rc::new(Cell::new(false));
	let ran_c = ran.clone();
	let observed = Rc::new(RefCell::new(Vec::new()));
	let seen = observed.clone();

	let interpreter = MockInterpreter::new()
		.with(&[0x01], move |ctx, contract| {
			let first = ctx.call(contract, poisoned, Vec::new(), 1_000, U256::zero());
			let aborted = ctx.is_aborted();
			let second = ctx.call(contract, c, Vec::new(), 1_000, U256::zero());
			seen.borrow_mut().push((first, aborted, second));
			// Carry on as if nothing happened.
			(Ok(ExitSucceed::Returned), Vec::new())
		})
		.with(&[0x03], move |_, _| {
			ran_c.set(true);
			(Ok(ExitSucceed::Stopped), Vec::new())
		});

	let faulty = FaultyState {
		inner: state(vec![
			(a, account(100, &[])),
			(b, account(0, &[0x01])),
			(poisoned, account(0, &[0x02])),
			(c, account(0, &[0x03])),
		]),
		poisoned,
	};
	let engine = Engine::new(context(), faulty, &chain, &config, &precompiles, &interpreter);
	let (output, _) = engine.transact_call(a, b, Vec::new(), GAS, U256::zero());

	let fault = ExitError::Fatal(ExitFatal::StateFault(StateFault::Unavailable(
		"missing trie node".into(),
	)));
	assert_eq!(output.result, Err(fault.clone()));
	assert_eq!(output.gas_left, 0);

	let observed = observed.borrow();
	let (first, aborted, second) = &observed[0];
	assert_eq!(first.result, Err(fault.clone()));
	assert_eq!(first.gas_left, 0);
	assert!(*aborted);
	assert_eq!(second.result, Err(fault));
	assert!(!ran.get());
}

#[test]
fn no_recursion_skips_nested_frames() {
	let (a, b, c) = (address(0xa), address(0xb), address(0xc));
	let chain = ChainConfig::byzantium();
	let config = Config {
		no_recursion: true,
		..Config::default()
	};
	let precompiles = StandardPrecompileSet::new();
	let ran = Rc::new(Cell::new(false));
	let ran_c = ran.clone();

	let interpreter = MockInterpreter::new()
		.with(&[0x01], |ctx, contract| {
			let output = ctx.call(contract, address(0xc), Vec::new(), 1_000, U256::zero());
			assert_eq!(output.result, Ok(ExitSucceed::Stopped));
			assert_eq!(output.gas_left, 1_000);
			(Ok(ExitSucceed::Returned), vec![1])
		})
		.with(&[0x03], move |_, _| {
			ran_c.set(true);
			(Ok(ExitSucceed::Stopped), Vec::new())
		});

	let engine = Engine::new(
		context(),
		state(vec![
			(a, account(0, &[])),
			(b, account(0, &[0x01])),
			(c, account(0, &[0x03])),
		]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, _) = engine.transact_call(a, b, Vec::new(), GAS, U256::zero());

	assert_eq!(output.result, Ok(ExitSucceed::Returned));
	assert_eq!(output.output, vec![1]);
	assert!(!ran.get());
}

#[test]
fn suicide_moves_balance() {
	let (a, b, heir) = (address(0xa), address(0xb), address(0x77));
	let chain = ChainConfig::byzantium();
	let config = Config::default();
	let precompiles = StandardPrecompileSet::new();
	let interpreter = MockInterpreter::new().with(&[0x01], move |ctx, contract| {
		ctx.mark_delete(contract.address(), heir).unwrap();
		(Ok(ExitSucceed::Suicided), Vec::new())
	});

	let engine = Engine::new(
		context(),
		state(vec![(a, account(0, &[])), (b, account(40, &[0x01]))]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, mut state) = engine.transact_call(a, b, Vec::new(), GAS, U256::zero());

	assert_eq!(output.result, Ok(ExitSucceed::Suicided));
	assert!(state.has_suicided(b).unwrap());
	assert!(state.exists(b).unwrap());
	assert_eq!(state.balance(heir).unwrap(), U256::from(40));

	state.finalise(true);
	assert!(!state.exists(b).unwrap());
	assert_eq!(state.balance(heir).unwrap(), U256::from(40));
}

#[test]
fn logs_refunds_and_preimages() {
	let (a, b) = (address(0xa), address(0xb));
	let chain = ChainConfig::byzantium();
	let config = Config {
		enable_preimage_recording: true,
		..Config::default()
	};
	let precompiles = StandardPrecompileSet::new();
	let interpreter = MockInterpreter::new().with(&[0x01], |ctx, contract| {
		ctx.log(zvm::Log {
			address: contract.address(),
			topics: vec![key(1)],
			data: vec![0xab],
		})
		.unwrap();
		ctx.add_refund(4_800);
		ctx.add_preimage(zvm::utils::keccak256(b"zvm"), b"zvm".to_vec());
		(Ok(ExitSucceed::Stopped), Vec::new())
	});

	let engine = Engine::new(
		context(),
		state(vec![(a, account(0, &[])), (b, account(0, &[0x01]))]),
		&chain,
		&config,
		&precompiles,
		&interpreter,
	);
	let (output, state) = engine.transact_call(a, b, Vec::new(), GAS, U256::zero());

	assert_eq!(output.result, Ok(ExitSucceed::Stopped));
	assert_eq!(state.logs().len(), 1);
	assert_eq!(state.logs()[0].address, b);
	assert_eq!(state.refund(), 4_800);
	assert_eq!(
		state.preimages().get(&zvm::utils::keccak256(b"zvm")),
		Some(&b"zvm".to_vec())
	);
}

#[cfg(feature = "tracing")]
mod tracing {
	use super::*;
	use zvm::tracing::{Event, EventListener};

	#[derive(Default)]
	struct Counter {
		calls: usize,
		exits: usize,
	}

	impl EventListener for Counter {
		fn event(&mut self, event: Event) {
			match event {
				Event::Call { .. } => self.calls += 1,
				Event::Exit { .. } => self.exits += 1,
				_ => (),
			}
		}
	}

	#[test]
	fn emits_call_and_exit() {
		let (a, b) = (address(0xa), address(0xb));
		let chain = ChainConfig::byzantium();
		let config = Config::default();
		let precompiles = StandardPrecompileSet::new();
		let interpreter = MockInterpreter::new();
		let engine = Engine::new(
			context(),
			state(vec![(a, account(100, &[]))]),
			&chain,
			&config,
			&precompiles,
			&interpreter,
		);

		let mut counter = Counter::default();
		zvm::tracing::using(&mut counter, || {
			engine.transact_call(a, b, Vec::new(), GAS, U256::one())
		});

		assert_eq!(counter.calls, 1);
		assert_eq!(counter.exits, 1);
	}
}
