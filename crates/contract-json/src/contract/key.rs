//! Registry keys.

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies a contract: a Rust type plus an optional discriminator.
///
/// Two keys are equal when both the type and the discriminator match, so
/// one type can have several keyed contracts next to its default one.
/// The type name is carried for messages only.
#[derive(Clone)]
pub struct TypeKey {
    id: TypeId,
    type_name: Option<&'static str>,
    discriminator: Option<Cow<'static, str>>,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: Some(std::any::type_name::<T>()),
            discriminator: None,
        }
    }

    pub fn keyed<T: ?Sized + 'static>(discriminator: impl Into<Cow<'static, str>>) -> Self {
        Self::of::<T>().with_discriminator(discriminator)
    }

    /// Key of the runtime type behind `value`.
    ///
    /// The type name is not recoverable from `dyn Any`, so the key prints
    /// its `TypeId` instead.
    pub fn of_val(value: &dyn Any) -> Self {
        Self {
            id: value.type_id(),
            type_name: None,
            discriminator: None,
        }
    }

    pub fn with_discriminator(mut self, discriminator: impl Into<Cow<'static, str>>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn type_name(&self) -> Option<&'static str> {
        self.type_name
    }

    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.discriminator == other.discriminator
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.discriminator.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_name {
            Some(name) => f.write_str(name)?,
            None => write!(f, "{:?}", self.id)?,
        }
        if let Some(discriminator) = &self.discriminator {
            write!(f, " [{discriminator}]")?;
        }
        Ok(())
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn discriminator_separates_keys() {
        let plain = TypeKey::of::<u32>();
        let keyed = TypeKey::keyed::<u32>("hex");
        assert_ne!(plain, keyed);
        assert_eq!(keyed, TypeKey::keyed::<u32>(String::from("hex")));
        let set: HashSet<_> = [plain.clone(), keyed, TypeKey::of::<u32>()].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn runtime_key_matches_static_key() {
        let value: Box<dyn Any> = Box::new(7u64);
        let key = TypeKey::of_val(value.as_ref());
        assert_eq!(key, TypeKey::of::<u64>());
        assert_eq!(key.type_name(), None);
    }

    #[test]
    fn display_includes_discriminator() {
        assert_eq!(TypeKey::keyed::<bool>("flag").to_string(), "bool [flag]");
        assert_eq!(TypeKey::of::<i32>().to_string(), "i32");
    }
}
