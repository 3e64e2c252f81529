#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::CommonError;

const PAUSED: Symbol = symbol_short!("PAUSED");
const UNPAUSED: Symbol = symbol_short!("UNPAUSED");

/// Sets the pause flag without any auth check. Use [`pause`] / [`unpause`]
/// from entry points.
pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&PAUSED, &paused);
}

/// Returns `true` when the contract is paused.
pub fn is_paused(env: &Env) -> bool {
    env.storage().instance().get(&PAUSED).unwrap_or(false)
}

/// Returns `CommonError::Paused` when the contract is paused.
///
/// Place this at the top of every state-mutating function that must honour
/// the pause. View-only functions should **not** call this.
pub fn require_not_paused(env: &Env) -> Result<(), CommonError> {
    if is_paused(env) {
        return Err(CommonError::Paused);
    }
    Ok(())
}

/// Authenticates `caller` and checks it is the registry admin.
fn require_admin(caller: &Address, admin: &Address) -> Result<(), CommonError> {
    caller.require_auth();
    if caller != admin {
        return Err(CommonError::AccessDenied);
    }
    Ok(())
}

/// Pause the contract on behalf of `caller`, who must be `admin`.
///
/// Emits a `("PAUSED", caller)` event carrying the ledger timestamp.
pub fn pause(env: &Env, caller: &Address, admin: &Address) -> Result<(), CommonError> {
    require_admin(caller, admin)?;
    set_paused(env, true);
    env.events()
        .publish((PAUSED, caller.clone()), env.ledger().timestamp());
    Ok(())
}

/// Unpause the contract on behalf of `caller`, who must be `admin`.
///
/// Emits an `("UNPAUSED", caller)` event carrying the ledger timestamp.
pub fn unpause(env: &Env, caller: &Address, admin: &Address) -> Result<(), CommonError> {
    require_admin(caller, admin)?;
    set_paused(env, false);
    env.events()
        .publish((UNPAUSED, caller.clone()), env.ledger().timestamp());
    Ok(())
}
