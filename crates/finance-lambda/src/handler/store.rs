//! Item storage seam.
//!
//! Handlers talk to storage through [`ItemStore`] using the tagged attribute
//! wire form, so a store only ever sees what a real key-value service would.
//! [`MemoryStore`] is the in-process implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use serde_json::Value as Json;

use crate::codec::AttributeMap;
use crate::config::Config;
use crate::error::StoreError;

/// Key-value item storage.
pub trait ItemStore {
    /// Fetches the item whose key attributes match `key`.
    fn get_item(&self, table: &str, key: &AttributeMap) -> Result<Option<AttributeMap>, StoreError>;

    /// Inserts or replaces an item.
    fn put_item(&self, table: &str, item: AttributeMap) -> Result<(), StoreError>;

    /// Returns every item whose partition key attribute equals `value`
    /// (a tagged attribute, e.g. `{"S": "user-1"}`), in sort key order.
    fn query(&self, table: &str, key_attribute: &str, value: &Json) -> Result<Vec<AttributeMap>, StoreError>;
}

/// Key attributes of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    pub partition_key: String,
    pub sort_key: Option<String>,
}

impl KeySchema {
    pub fn partition(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: None,
        }
    }

    pub fn composite(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: Some(sort_key.into()),
        }
    }

    /// Extracts the storage key of `item`: the JSON text of each key attribute.
    fn key_of(&self, table: &str, item: &AttributeMap) -> Result<(String, String), StoreError> {
        let text_of = |attribute: &str| {
            item.get(attribute)
                .map(Json::to_string)
                .ok_or_else(|| StoreError::MissingKey {
                    table: table.to_string(),
                    attribute: attribute.to_string(),
                })
        };
        let partition = text_of(&self.partition_key)?;
        let sort = match &self.sort_key {
            Some(sort_key) => text_of(sort_key)?,
            None => String::new(),
        };
        Ok((partition, sort))
    }
}

#[derive(Debug)]
struct Table {
    schema: KeySchema,
    items: BTreeMap<(String, String), AttributeMap>,
}

impl Table {
    fn new(schema: KeySchema) -> Self {
        Self {
            schema,
            items: BTreeMap::new(),
        }
    }
}

/// In-memory [`ItemStore`].
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<FxHashMap<String, Table>>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("memory store lock poisoned".to_string())
}

impl MemoryStore {
    /// Create a store with no tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the tables named by `config`: transactions
    /// keyed by (`userId`, `id`) and user settings keyed by `userId`.
    pub fn for_config(config: &Config) -> Self {
        Self::new()
            .with_table(&config.transactions_table, KeySchema::composite("userId", "id"))
            .with_table(&config.user_settings_table, KeySchema::partition("userId"))
    }

    /// Builder form of [`create_table`](Self::create_table).
    ///
    /// A poisoned lock is recovered, since the insert leaves the map whole.
    pub fn with_table(self, name: impl Into<String>, schema: KeySchema) -> Self {
        {
            let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
            tables.insert(name.into(), Table::new(schema));
        }
        self
    }

    /// Registers a table. An existing table of the same name is replaced.
    pub fn create_table(&self, name: impl Into<String>, schema: KeySchema) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        tables.insert(name.into(), Table::new(schema));
        Ok(())
    }

    /// Number of items in a table.
    pub fn item_count(&self, table: &str) -> Result<usize, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(lookup(&tables, table)?.items.len())
    }
}

fn lookup<'a>(tables: &'a FxHashMap<String, Table>, table: &str) -> Result<&'a Table, StoreError> {
    tables.get(table).ok_or_else(|| StoreError::TableNotFound {
        table: table.to_string(),
    })
}

impl ItemStore for MemoryStore {
    fn get_item(&self, table: &str, key: &AttributeMap) -> Result<Option<AttributeMap>, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        let t = lookup(&tables, table)?;
        let key = t.schema.key_of(table, key)?;
        Ok(t.items.get(&key).cloned())
    }

    fn put_item(&self, table: &str, item: AttributeMap) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let t = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound {
                table: table.to_string(),
            })?;
        let key = t.schema.key_of(table, &item)?;
        t.items.insert(key, item);
        Ok(())
    }

    fn query(&self, table: &str, key_attribute: &str, value: &Json) -> Result<Vec<AttributeMap>, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        let t = lookup(&tables, table)?;
        if key_attribute != t.schema.partition_key {
            return Err(StoreError::Backend(format!(
                "query on {table} must use partition key {}, not {key_attribute}",
                t.schema.partition_key
            )));
        }
        let partition = value.to_string();
        Ok(t.items
            .iter()
            .filter(|((pk, _), _)| *pk == partition)
            .map(|(_, item)| item.clone())
            .collect())
    }
}
