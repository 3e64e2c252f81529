use soroban_sdk::{Env, IntoVal, Val};

/// Remaining-ledger threshold below which a persistent entry is extended.
pub const TTL_THRESHOLD: u32 = 518_400;
/// Ledger count a persistent entry is extended to.
pub const TTL_EXTEND_TO: u32 = 3_110_400;

/// Extends the time-to-live of a persistent storage entry.
/// The key must already exist.
pub fn extend_persistent<K>(env: &Env, key: &K)
where
    K: IntoVal<Env, Val>,
{
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Extends the time-to-live of the contract instance and its instance storage.
pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}
