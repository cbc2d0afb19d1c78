//! Shared domain types handed to plugins and stage executors.

pub mod entity;
pub mod installation;
pub mod module;
pub mod prisma;

pub use entity::{Entity, EntityField, EnumDataType};
pub use installation::{PluginInstallation, PluginSettings, PluginSource};
pub use module::{GeneratedModule, GeneratedModules};
pub use prisma::{DataSourceProvider, DataSourceUrl, PrismaClientGenerator, PrismaDataSource};
