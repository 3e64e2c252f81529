//! Transaction-scoped reentrancy lock.
//!
//! The lock lives in temporary storage and is released explicitly once the
//! guarded section returns. If the transaction fails the host discards the
//! write together with everything else, so a failed call never leaves the
//! lock held.

use soroban_sdk::{symbol_short, Env, Symbol};

use crate::CommonError;

const LOCK: Symbol = symbol_short!("RE_LOCK");

/// Acquire the lock, failing with `ReentrantCall` if it is already held.
pub fn enter(env: &Env) -> Result<(), CommonError> {
    let held: bool = env.storage().temporary().get(&LOCK).unwrap_or(false);
    if held {
        return Err(CommonError::ReentrantCall);
    }
    env.storage().temporary().set(&LOCK, &true);
    Ok(())
}

/// Release the lock.
pub fn exit(env: &Env) {
    env.storage().temporary().remove(&LOCK);
}

pub fn is_locked(env: &Env) -> bool {
    env.storage().temporary().get(&LOCK).unwrap_or(false)
}

/// Run `f` while holding the lock. The lock is released only when `f`
/// returns `Ok`; an `Err` aborts the transaction anyway.
pub fn guarded<T, E, F>(env: &Env, f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: From<CommonError>,
{
    enter(env)?;
    let out = f()?;
    exit(env);
    Ok(out)
}
