//! A provider that compiles missing contracts on demand.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use super::provider::{ContractProvider, ImmutableContractProvider};
use super::{ContractEntry, TypeKey};

/// Produces contracts for keys that were not registered up front.
pub trait ContractCompiler: Send + Sync {
    /// Builds an entry for `key`, or `None` if this compiler cannot.
    /// The returned entry must carry `key`.
    fn compile(&self, key: &TypeKey) -> Option<ContractEntry>;
}

/// Wraps an [`ImmutableContractProvider`] and extends it on lookup misses.
///
/// Readers always see a complete map: a miss compiles outside any lock and
/// publishes a new map through an atomic read-copy-update. When two threads
/// miss on the same key concurrently both may compile, but the first entry
/// published is kept and returned to every caller.
pub struct DynamicContractProvider<C> {
    current: ArcSwap<ImmutableContractProvider>,
    compiler: C,
    compiled: AtomicUsize,
}

impl<C: ContractCompiler> DynamicContractProvider<C> {
    pub fn new(initial: ImmutableContractProvider, compiler: C) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
            compiler,
            compiled: AtomicUsize::new(0),
        }
    }

    /// The current generation of the map.
    pub fn snapshot(&self) -> Arc<ImmutableContractProvider> {
        self.current.load_full()
    }

    /// How many times the compiler has run, redundant races included.
    pub fn compiled_count(&self) -> usize {
        self.compiled.load(Ordering::Relaxed)
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    fn compile_and_publish(&self, key: &TypeKey) -> Option<Arc<ContractEntry>> {
        let compiled = Arc::new(self.compiler.compile(key)?);
        self.compiled.fetch_add(1, Ordering::Relaxed);
        if compiled.key() != key {
            tracing::warn!(
                %key,
                compiled = %compiled.key(),
                "compiler returned an entry for another key"
            );
            return None;
        }
        tracing::debug!(%key, "compiled contract");

        let mut winner = None;
        self.current.rcu(|current| {
            if let Some(existing) = current.try_get_entry(key) {
                winner = Some(existing);
                return Arc::clone(current);
            }
            winner = Some(Arc::clone(&compiled));
            match current.with_entry(Arc::clone(&compiled)) {
                Ok(next) => Arc::new(next),
                Err(err) => {
                    tracing::warn!(%key, %err, "could not publish compiled contract");
                    Arc::clone(current)
                }
            }
        });
        if let Some(entry) = &winner {
            if Arc::ptr_eq(entry, &compiled) {
                tracing::debug!(%key, "published contract");
            }
        }
        winner
    }
}

impl<C: ContractCompiler> ContractProvider for DynamicContractProvider<C> {
    fn try_get_entry(&self, key: &TypeKey) -> Option<Arc<ContractEntry>> {
        if let Some(entry) = self.current.load().try_get_entry(key) {
            return Some(entry);
        }
        self.compile_and_publish(key)
    }
}
