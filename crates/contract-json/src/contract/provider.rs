//! Contract providers: resolve a [`TypeKey`] to a [`ContractEntry`].

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use super::builtin::{
    BoolContract, F64Contract, I32Contract, I64Contract, StringContract, U32Contract, U64Contract,
};
use super::{ContractEntry, DeserializeContract, SerializeContract, TypeKey};
use crate::error::{JsonError, Result};

/// Resolves keys to registered contracts.
///
/// Implementations must be safe for concurrent lookups without external
/// locking.
pub trait ContractProvider: Send + Sync {
    fn try_get_entry(&self, key: &TypeKey) -> Option<Arc<ContractEntry>>;
}

impl<P: ContractProvider + ?Sized> ContractProvider for Arc<P> {
    fn try_get_entry(&self, key: &TypeKey) -> Option<Arc<ContractEntry>> {
        (**self).try_get_entry(key)
    }
}

/// Typed lookups available on every provider.
pub trait ContractProviderExt: ContractProvider {
    /// The typed contract registered under `key`, if it is a `C`.
    fn try_get_contract<C: Any + Send + Sync>(&self, key: &TypeKey) -> Option<Arc<C>> {
        self.try_get_entry(key)?.contract::<C>()
    }

    fn try_get_contract_for<T: 'static, C: Any + Send + Sync>(&self) -> Option<Arc<C>> {
        self.try_get_contract(&TypeKey::of::<T>())
    }

    fn try_get_contract_keyed<T: 'static, C: Any + Send + Sync>(
        &self,
        discriminator: impl Into<Cow<'static, str>>,
    ) -> Option<Arc<C>> {
        self.try_get_contract(&TypeKey::keyed::<T>(discriminator))
    }

    /// Resolves by the runtime type of `value`.
    fn try_get_contract_for_value<C: Any + Send + Sync>(&self, value: &dyn Any) -> Option<Arc<C>> {
        self.try_get_contract(&TypeKey::of_val(value))
    }

    fn entry_for_value(&self, value: &dyn Any) -> Option<Arc<ContractEntry>> {
        self.try_get_entry(&TypeKey::of_val(value))
    }

    /// Like [`ContractProvider::try_get_entry`], but a miss is an error.
    fn require_entry(&self, key: &TypeKey) -> Result<Arc<ContractEntry>> {
        self.try_get_entry(key).ok_or_else(|| {
            tracing::debug!(%key, "no contract registered");
            JsonError::ContractNotFound {
                key: key.to_string(),
            }
        })
    }
}

impl<P: ContractProvider + ?Sized> ContractProviderExt for P {}

/// A fixed key-to-contract map, built once and then only read.
#[derive(Clone, Default)]
pub struct ImmutableContractProvider {
    entries: HashMap<TypeKey, Arc<ContractEntry>>,
}

impl ImmutableContractProvider {
    pub fn builder() -> ImmutableContractProviderBuilder {
        ImmutableContractProviderBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.entries.keys()
    }

    /// A copy of this map extended by `entry`. `self` is left untouched.
    pub fn with_entry(&self, entry: Arc<ContractEntry>) -> Result<Self> {
        if self.entries.contains_key(entry.key()) {
            return Err(JsonError::DuplicateContract {
                key: entry.key().to_string(),
            });
        }
        let mut entries = self.entries.clone();
        entries.insert(entry.key().clone(), entry);
        Ok(Self { entries })
    }
}

impl ContractProvider for ImmutableContractProvider {
    fn try_get_entry(&self, key: &TypeKey) -> Option<Arc<ContractEntry>> {
        self.entries.get(key).cloned()
    }
}

impl std::fmt::Debug for ImmutableContractProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Collects contracts for an [`ImmutableContractProvider`].
///
/// A duplicate key is reported by [`build`](Self::build).
///
/// ```
/// use contract_json::{ContractProviderExt, I32Contract, ImmutableContractProvider};
///
/// let provider = ImmutableContractProvider::builder()
///     .with_builtin_contracts()
///     .build()
///     .unwrap();
/// assert!(provider.try_get_contract_for::<i32, I32Contract>().is_some());
/// ```
#[derive(Default)]
pub struct ImmutableContractProviderBuilder {
    entries: HashMap<TypeKey, Arc<ContractEntry>>,
    duplicate: Option<TypeKey>,
}

impl ImmutableContractProviderBuilder {
    pub fn entry(mut self, entry: ContractEntry) -> Self {
        let key = entry.key().clone();
        if self.entries.contains_key(&key) {
            self.duplicate.get_or_insert(key);
        } else {
            self.entries.insert(key, Arc::new(entry));
        }
        self
    }

    pub fn two_way<T, C>(self, contract: C) -> Self
    where
        T: 'static,
        C: SerializeContract<T> + DeserializeContract<T>,
    {
        self.entry(ContractEntry::two_way::<T, C>(TypeKey::of::<T>(), contract))
    }

    pub fn two_way_keyed<T, C>(
        self,
        discriminator: impl Into<Cow<'static, str>>,
        contract: C,
    ) -> Self
    where
        T: 'static,
        C: SerializeContract<T> + DeserializeContract<T>,
    {
        let key = TypeKey::keyed::<T>(discriminator);
        self.entry(ContractEntry::two_way::<T, C>(key, contract))
    }

    pub fn serialize_only<T, C>(self, contract: C) -> Self
    where
        T: 'static,
        C: SerializeContract<T>,
    {
        self.entry(ContractEntry::serialize_only::<T, C>(TypeKey::of::<T>(), contract))
    }

    pub fn serialize_only_keyed<T, C>(
        self,
        discriminator: impl Into<Cow<'static, str>>,
        contract: C,
    ) -> Self
    where
        T: 'static,
        C: SerializeContract<T>,
    {
        let key = TypeKey::keyed::<T>(discriminator);
        self.entry(ContractEntry::serialize_only::<T, C>(key, contract))
    }

    pub fn deserialize_only<T, C>(self, contract: C) -> Self
    where
        T: 'static,
        C: DeserializeContract<T>,
    {
        self.entry(ContractEntry::deserialize_only::<T, C>(TypeKey::of::<T>(), contract))
    }

    pub fn deserialize_only_keyed<T, C>(
        self,
        discriminator: impl Into<Cow<'static, str>>,
        contract: C,
    ) -> Self
    where
        T: 'static,
        C: DeserializeContract<T>,
    {
        let key = TypeKey::keyed::<T>(discriminator);
        self.entry(ContractEntry::deserialize_only::<T, C>(key, contract))
    }

    /// Registers two-way contracts for `i32`, `i64`, `u32`, `u64`, `f64`,
    /// `bool` and `String`.
    pub fn with_builtin_contracts(self) -> Self {
        self.two_way::<i32, _>(I32Contract)
            .two_way::<i64, _>(I64Contract)
            .two_way::<u32, _>(U32Contract)
            .two_way::<u64, _>(U64Contract)
            .two_way::<f64, _>(F64Contract)
            .two_way::<bool, _>(BoolContract)
            .two_way::<String, _>(StringContract)
    }

    pub fn build(self) -> Result<ImmutableContractProvider> {
        if let Some(key) = self.duplicate {
            return Err(JsonError::DuplicateContract {
                key: key.to_string(),
            });
        }
        Ok(ImmutableContractProvider {
            entries: self.entries,
        })
    }
}
