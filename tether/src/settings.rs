//! Store settings handed to registrations and factories

use serde::Deserialize;
use std::{
    fmt::{Display, Formatter},
    path::Path,
};

const DEFAULT_CONNECTION_STRING: &str = "mongodb://localhost";
const DEFAULT_DATABASE: &str = "identityserver";
const DEFAULT_CLIENT_COLLECTION: &str = "clients";
const DEFAULT_SCOPE_COLLECTION: &str = "scopes";
const DEFAULT_CONSENT_COLLECTION: &str = "consents";
const DEFAULT_AUTHORIZATION_CODE_COLLECTION: &str = "authorizationCodes";
const DEFAULT_REFRESH_TOKEN_COLLECTION: &str = "refreshtokens";
const DEFAULT_TOKEN_HANDLE_COLLECTION: &str = "tokenhandles";

/// Environment variable that overrides [`StoreSettings::connection_string`]
pub const CONNECTION_STRING_ENV: &str = "TETHER_CONNECTION_STRING";

/// Environment variable that overrides [`StoreSettings::database`]
pub const DATABASE_ENV: &str = "TETHER_DATABASE";

/// Represents the settings of a persistent store.
///
/// The container never reads these values; they are registered as an instance
/// and factories resolve them like any other dependency.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct StoreSettings {
    /// Store connection string
    ///
    /// Default: `mongodb://localhost`
    connection_string: String,

    /// Database name
    ///
    /// Default: `identityserver`
    database: String,

    /// Default: `clients`
    client_collection: String,

    /// Default: `scopes`
    scope_collection: String,

    /// Default: `consents`
    consent_collection: String,

    /// Default: `authorizationCodes`
    authorization_code_collection: String,

    /// Default: `refreshtokens`
    refresh_token_collection: String,

    /// Default: `tokenhandles`
    token_handle_collection: String,
}

impl Default for StoreSettings {
    #[inline]
    fn default() -> Self {
        Self {
            connection_string: DEFAULT_CONNECTION_STRING.into(),
            database: DEFAULT_DATABASE.into(),
            client_collection: DEFAULT_CLIENT_COLLECTION.into(),
            scope_collection: DEFAULT_SCOPE_COLLECTION.into(),
            consent_collection: DEFAULT_CONSENT_COLLECTION.into(),
            authorization_code_collection: DEFAULT_AUTHORIZATION_CODE_COLLECTION.into(),
            refresh_token_collection: DEFAULT_REFRESH_TOKEN_COLLECTION.into(),
            token_handle_collection: DEFAULT_TOKEN_HANDLE_COLLECTION.into(),
        }
    }
}

/// Errors that occur while loading [`StoreSettings`]
#[derive(Debug)]
pub enum SettingsError {
    /// The settings file could not be read
    Io(std::io::Error),

    /// The settings document is not valid JSON or has unknown fields
    Json(serde_json::Error),

    /// A required value is empty
    Empty(&'static str),
}

impl Display for SettingsError {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(err) => write!(f, "Settings Error: unable to read settings: {err}"),
            SettingsError::Json(err) => write!(f, "Settings Error: invalid settings: {err}"),
            SettingsError::Empty(field) => write!(f, "Settings Error: `{field}` must not be empty"),
        }
    }
}

impl std::error::Error for SettingsError {
    #[inline]
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(err) => Some(err),
            SettingsError::Json(err) => Some(err),
            SettingsError::Empty(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        SettingsError::Io(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    #[inline]
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Json(err)
    }
}

impl StoreSettings {
    /// Creates default store settings
    ///
    /// Defaults:
    /// - connection_string: `mongodb://localhost`
    /// - database: `identityserver`
    /// - collections: `clients`, `scopes`, `consents`, `authorizationCodes`,
    ///   `refreshtokens`, `tokenhandles`
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses settings from a JSON document with camelCase keys.
    ///
    /// Missing keys keep their default values.
    ///
    /// # Example
    /// ```
    /// use tether::StoreSettings;
    ///
    /// let settings = StoreSettings::from_json(r#"{ "database": "tests" }"#).unwrap();
    ///
    /// assert_eq!(settings.database(), "tests");
    /// assert_eq!(settings.client_collection(), "clients");
    /// ```
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()
    }

    /// Reads and parses settings from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Creates default settings overridden by the `TETHER_CONNECTION_STRING`
    /// and `TETHER_DATABASE` environment variables
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::default().with_env()
    }

    /// Overrides the connection string and the database name with the
    /// `TETHER_CONNECTION_STRING` and `TETHER_DATABASE` environment variables if set
    pub fn with_env(self) -> Result<Self, SettingsError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        if let Some(connection_string) = lookup(CONNECTION_STRING_ENV) {
            self.connection_string = connection_string;
        }
        if let Some(database) = lookup(DATABASE_ENV) {
            self.database = database;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self, SettingsError> {
        if self.connection_string.trim().is_empty() {
            return Err(SettingsError::Empty("connectionString"));
        }
        if self.database.trim().is_empty() {
            return Err(SettingsError::Empty("database"));
        }
        Ok(self)
    }

    /// Sets the store connection string
    ///
    /// Default: `mongodb://localhost`
    pub fn with_connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = connection_string.into();
        self
    }

    /// Sets the database name
    ///
    /// Default: `identityserver`
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Sets the collection that stores clients
    ///
    /// Default: `clients`
    pub fn with_client_collection(mut self, name: impl Into<String>) -> Self {
        self.client_collection = name.into();
        self
    }

    /// Sets the collection that stores scopes
    ///
    /// Default: `scopes`
    pub fn with_scope_collection(mut self, name: impl Into<String>) -> Self {
        self.scope_collection = name.into();
        self
    }

    /// Sets the collection that stores consents
    ///
    /// Default: `consents`
    pub fn with_consent_collection(mut self, name: impl Into<String>) -> Self {
        self.consent_collection = name.into();
        self
    }

    /// Sets the collection that stores authorization codes
    ///
    /// Default: `authorizationCodes`
    pub fn with_authorization_code_collection(mut self, name: impl Into<String>) -> Self {
        self.authorization_code_collection = name.into();
        self
    }

    /// Sets the collection that stores refresh tokens
    ///
    /// Default: `refreshtokens`
    pub fn with_refresh_token_collection(mut self, name: impl Into<String>) -> Self {
        self.refresh_token_collection = name.into();
        self
    }

    /// Sets the collection that stores token handles
    ///
    /// Default: `tokenhandles`
    pub fn with_token_handle_collection(mut self, name: impl Into<String>) -> Self {
        self.token_handle_collection = name.into();
        self
    }

    /// Returns the store connection string
    #[inline]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Returns the database name
    #[inline]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Returns the collection that stores clients
    #[inline]
    pub fn client_collection(&self) -> &str {
        &self.client_collection
    }

    /// Returns the collection that stores scopes
    #[inline]
    pub fn scope_collection(&self) -> &str {
        &self.scope_collection
    }

    /// Returns the collection that stores consents
    #[inline]
    pub fn consent_collection(&self) -> &str {
        &self.consent_collection
    }

    /// Returns the collection that stores authorization codes
    #[inline]
    pub fn authorization_code_collection(&self) -> &str {
        &self.authorization_code_collection
    }

    /// Returns the collection that stores refresh tokens
    #[inline]
    pub fn refresh_token_collection(&self) -> &str {
        &self.refresh_token_collection
    }

    /// Returns the collection that stores token handles
    #[inline]
    pub fn token_handle_collection(&self) -> &str {
        &self.token_handle_collection
    }
}
