//! Tool Catalog
//!
//! The [`ToolCatalog`] is the in-memory registry of known tools. It is filled
//! once at startup from discovery and is read-mostly afterward; explicit
//! [`register`](ToolCatalog::register) / [`unregister`](ToolCatalog::unregister)
//! calls take the write lock, lookups share the read lock.
//!
//! Listing order is insertion order.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use super::entities::{ToolCategory, ToolDescriptor};

/// Errors raised by catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// A writer panicked while holding the lock.
    #[error("tool catalog lock poisoned")]
    Poisoned,
}

#[derive(Debug, Default)]
struct CatalogInner {
    order: Vec<String>,
    tools: HashMap<String, Arc<ToolDescriptor>>,
}

/// Registry of tool descriptors keyed by identifier.
#[derive(Debug, Default)]
pub struct ToolCatalog {
    inner: RwLock<CatalogInner>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a sequence of descriptors, stopping at the
    /// first duplicate or malformed entry.
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = ToolDescriptor>,
    {
        let catalog = Self::new();
        for descriptor in descriptors {
            catalog.register(descriptor)?;
        }
        Ok(catalog)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogInner>, CatalogError> {
        self.inner.read().map_err(|_| CatalogError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CatalogInner>, CatalogError> {
        self.inner.write().map_err(|_| CatalogError::Poisoned)
    }

    /// Add a descriptor. Fails without touching the catalog if the
    /// identifier is taken or the descriptor's own schema is inconsistent.
    pub fn register(&self, descriptor: ToolDescriptor) -> Result<(), CatalogError> {
        descriptor
            .check_schema()
            .map_err(CatalogError::InvalidDescriptor)?;

        let mut inner = self.write()?;
        if inner.tools.contains_key(&descriptor.id) {
            tracing::debug!(tool = %descriptor.id, "Rejected duplicate tool registration");
            return Err(CatalogError::DuplicateTool(descriptor.id));
        }
        tracing::debug!(
            tool = %descriptor.id,
            category = %descriptor.category,
            "Registered tool"
        );
        inner.order.push(descriptor.id.clone());
        inner.tools.insert(descriptor.id.clone(), Arc::new(descriptor));
        Ok(())
    }

    pub fn lookup(&self, id: &str) -> Result<Arc<ToolDescriptor>, CatalogError> {
        self.read()?
            .tools
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownTool(id.to_string()))
    }

    pub fn unregister(&self, id: &str) -> Result<Arc<ToolDescriptor>, CatalogError> {
        let mut inner = self.write()?;
        let removed = inner
            .tools
            .remove(id)
            .ok_or_else(|| CatalogError::UnknownTool(id.to_string()))?;
        inner.order.retain(|existing| existing != id);
        tracing::debug!(tool = %id, "Unregistered tool");
        Ok(removed)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().map(|inner| inner.tools.contains_key(id)).unwrap_or(false)
    }

    /// All descriptors of one category, in insertion order.
    pub fn list_by_category(
        &self,
        category: ToolCategory,
    ) -> Result<Vec<Arc<ToolDescriptor>>, CatalogError> {
        let inner = self.read()?;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.tools.get(id))
            .filter(|d| d.category == category)
            .cloned()
            .collect())
    }

    /// All descriptors, in insertion order.
    pub fn list(&self) -> Result<Vec<Arc<ToolDescriptor>>, CatalogError> {
        let inner = self.read()?;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.tools.get(id))
            .cloned()
            .collect())
    }

    /// Categories that have at least one registered tool, in declaration order.
    pub fn categories(&self) -> Result<Vec<ToolCategory>, CatalogError> {
        let inner = self.read()?;
        Ok(ToolCategory::ALL
            .into_iter()
            .filter(|c| inner.tools.values().any(|d| d.category == *c))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.read().map(|inner| inner.order.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ParameterSpec;

    fn descriptor(id: &str, category: ToolCategory) -> ToolDescriptor {
        ToolDescriptor::new(id, category, format!("{id} tool"))
            .with_parameter(ParameterSpec::required("target", "Target"))
    }

    #[test]
    fn test_lookup_after_register_returns_equal_descriptor() {
        let catalog = ToolCatalog::new();
        let d = descriptor("nmap", ToolCategory::NetworkScan);
        catalog.register(d.clone()).unwrap();
        assert_eq!(*catalog.lookup("nmap").unwrap(), d);
    }

    #[test]
    fn test_duplicate_register_leaves_catalog_unchanged() {
        let catalog = ToolCatalog::new();
        let original = descriptor("dig", ToolCategory::Dns);
        catalog.register(original.clone()).unwrap();

        let replacement = ToolDescriptor::new("dig", ToolCategory::Utilities, "other");
        let err = catalog.register(replacement).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateTool("dig".into()));
        assert_eq!(catalog.len(), 1);
        assert_eq!(*catalog.lookup("dig").unwrap(), original);
    }

    #[test]
    fn test_lookup_unknown() {
        let catalog = ToolCatalog::new();
        assert_eq!(
            catalog.lookup("nope").unwrap_err(),
            CatalogError::UnknownTool("nope".into())
        );
    }

    #[test]
    fn test_unregister() {
        let catalog = ToolCatalog::new();
        catalog.register(descriptor("whois", ToolCategory::InfoGathering)).unwrap();
        catalog.unregister("whois").unwrap();
        assert!(!catalog.contains("whois"));
        assert!(catalog.is_empty());
        assert!(matches!(
            catalog.unregister("whois"),
            Err(CatalogError::UnknownTool(_))
        ));
    }

    #[test]
    fn test_list_by_category_keeps_insertion_order() {
        let catalog = ToolCatalog::from_descriptors([
            descriptor("nmap", ToolCategory::NetworkScan),
            descriptor("dig", ToolCategory::Dns),
            descriptor("traceroute", ToolCategory::NetworkScan),
            descriptor("masscan", ToolCategory::NetworkScan),
        ])
        .unwrap();

        let ids: Vec<String> = catalog
            .list_by_category(ToolCategory::NetworkScan)
            .unwrap()
            .iter()
            .map(|d| d.id.clone())
            .collect();
        assert_eq!(ids, ["nmap", "traceroute", "masscan"]);

        catalog.unregister("traceroute").unwrap();
        catalog.register(descriptor("traceroute", ToolCategory::NetworkScan)).unwrap();
        let ids: Vec<String> = catalog
            .list_by_category(ToolCategory::NetworkScan)
            .unwrap()
            .iter()
            .map(|d| d.id.clone())
            .collect();
        assert_eq!(ids, ["nmap", "masscan", "traceroute"]);
        assert_eq!(
            catalog.categories().unwrap(),
            vec![ToolCategory::NetworkScan, ToolCategory::Dns]
        );
    }

    #[test]
    fn test_register_rejects_bad_schema() {
        let catalog = ToolCatalog::new();
        let bad = ToolDescriptor::new("t", ToolCategory::Utilities, "t")
            .with_parameter(ParameterSpec::required("a", "a"))
            .with_parameter(ParameterSpec::required("a", "again"));
        assert!(matches!(
            catalog.register(bad),
            Err(CatalogError::InvalidDescriptor(_))
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_concurrent_lookups() {
        let catalog = Arc::new(
            ToolCatalog::from_descriptors([descriptor("dig", ToolCategory::Dns)]).unwrap(),
        );
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let catalog = Arc::clone(&catalog);
                std::thread::spawn(move || catalog.lookup("dig").map(|d| d.id.clone()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), "dig");
        }
    }
}
