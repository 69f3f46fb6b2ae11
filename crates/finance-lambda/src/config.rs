//! Handler configuration.
//!
//! Defaults suit a local deployment; `from_env` overrides them from the
//! function's environment, and the `with_*` methods override them in code.
//!
//! # Environment Variables
//! - `TRANSACTIONS_TABLE`: table holding transactions (default: `Transactions`)
//! - `USER_SETTINGS_TABLE`: table holding user profiles (default: `UserSettings`)
//! - `FALLBACK_USER_ID`: when set, requests without identity claims are served
//!   as the test user with this id instead of being rejected

use std::env;

use crate::handler::identity::Identity;

/// Default transactions table name.
pub const DEFAULT_TRANSACTIONS_TABLE: &str = "Transactions";

/// Default user settings table name.
pub const DEFAULT_USER_SETTINGS_TABLE: &str = "UserSettings";

/// Configuration shared by all handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Table holding transaction records, partitioned by `userId`.
    pub transactions_table: String,

    /// Table holding user profiles, keyed by `userId`.
    pub user_settings_table: String,

    /// Identity used when a request carries no claims. `None` rejects such
    /// requests with 401.
    pub fallback_identity: Option<Identity>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transactions_table: DEFAULT_TRANSACTIONS_TABLE.to_string(),
            user_settings_table: DEFAULT_USER_SETTINGS_TABLE.to_string(),
            fallback_identity: None,
        }
    }
}

impl Config {
    /// Creates a configuration with default table names and no fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset or empty.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(table) = non_empty("TRANSACTIONS_TABLE") {
            config.transactions_table = table;
        }
        if let Some(table) = non_empty("USER_SETTINGS_TABLE") {
            config.user_settings_table = table;
        }
        config.fallback_identity = non_empty("FALLBACK_USER_ID").map(|user_id| Identity {
            user_id,
            ..Identity::test_user()
        });
        config
    }

    /// Set the transactions table name
    pub fn with_transactions_table(mut self, table: impl Into<String>) -> Self {
        self.transactions_table = table.into();
        self
    }

    /// Set the user settings table name
    pub fn with_user_settings_table(mut self, table: impl Into<String>) -> Self {
        self.user_settings_table = table.into();
        self
    }

    /// Serve claim-less requests as the given identity
    pub fn with_fallback_identity(mut self, identity: Identity) -> Self {
        self.fallback_identity = Some(identity);
        self
    }

    /// Serve claim-less requests as the built-in test user
    pub fn with_test_user(self) -> Self {
        self.with_fallback_identity(Identity::test_user())
    }
}
