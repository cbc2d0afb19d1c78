//! Prisma schema descriptors.

use serde::{Deserialize, Serialize};

/// Database provider of a Prisma datasource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceProvider {
    Postgresql,
    Mysql,
    Sqlite,
    Sqlserver,
    Mongodb,
}

/// Environment variable holding the datasource URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceUrl {
    /// Variable name, e.g. `DB_URL`.
    pub name: String,
}

/// The `datasource` block of a Prisma schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrismaDataSource {
    /// Block name.
    pub name: String,
    /// Database provider.
    pub provider: DataSourceProvider,
    /// URL source.
    pub url: DataSourceUrl,
}

/// The `generator` block of a Prisma schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrismaClientGenerator {
    /// Block name.
    pub name: String,
    /// Generator provider, e.g. `prisma-client-js`.
    pub provider: String,
    /// Enabled preview features.
    #[serde(default)]
    pub preview_features: Vec<String>,
}

impl Default for PrismaClientGenerator {
    fn default() -> Self {
        Self {
            name: "client".to_string(),
            provider: "prisma-client-js".to_string(),
            preview_features: Vec::new(),
        }
    }
}
