//! Driver registry.

use std::collections::BTreeMap;

use crate::driver::DriverDescriptor;
use crate::error::{DriverError, Result};

/// Immutable table of known drivers, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct DriverRegistry {
    drivers: BTreeMap<String, DriverDescriptor>,
}

impl DriverRegistry {
    /// Build a registry from a list of descriptors.
    ///
    /// A later descriptor replaces an earlier one with the same identifier.
    pub fn new(drivers: impl IntoIterator<Item = DriverDescriptor>) -> Self {
        Self {
            drivers: drivers.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }

    /// The registry of drivers shipped with kbconf.
    pub fn builtin() -> Self {
        Self::new([
            DriverDescriptor::stm32f446xx(),
            DriverDescriptor::at32f405xx(),
        ])
    }

    /// Look up a driver by identifier.
    pub fn lookup(&self, id: &str) -> Result<&DriverDescriptor> {
        self.drivers
            .get(id)
            .ok_or_else(|| DriverError::UnknownDriver { id: id.to_string() })
    }

    /// Iterate drivers in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &DriverDescriptor> {
        self.drivers.values()
    }

    /// Number of registered drivers.
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_drivers_resolve() {
        let registry = DriverRegistry::builtin();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("stm32f446xx").unwrap().id, "stm32f446xx");
        assert_eq!(registry.lookup("at32f405xx").unwrap().id, "at32f405xx");
    }

    #[test]
    fn unknown_driver() {
        let registry = DriverRegistry::builtin();
        assert_eq!(
            registry.lookup("rp2040").unwrap_err(),
            DriverError::UnknownDriver {
                id: "rp2040".into()
            }
        );
    }

    #[test]
    fn iteration_is_sorted() {
        let registry = DriverRegistry::builtin();
        let ids: Vec<_> = registry.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["at32f405xx", "stm32f446xx"]);
    }

    #[test]
    fn empty_registry() {
        let registry = DriverRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.lookup("stm32f446xx").is_err());
    }
}
