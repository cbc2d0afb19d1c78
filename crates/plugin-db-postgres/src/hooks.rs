//! Hook implementations for the PostgreSQL plugin.

use serde_json::{Map, Value, json};
use tracing::debug;

use dsg_core::types::{DataSourceProvider, DataSourceUrl, PrismaDataSource};
use dsg_plugin::hooks::catalog::{
    CreatePrismaSchemaBefore, CreateServerDockerComposeDbBefore, CreateServerDotEnvBefore,
    CreateServerPackageJsonBefore,
};
use dsg_plugin::{EventContext, GenerationContext, HookError, HookResult};

use crate::settings::{PostgresSettings, SettingsError};

/// Environment variable holding the connection URL.
pub const URL_VARIABLE: &str = "DB_URL";

/// Docker image used for the development database.
pub const POSTGRES_IMAGE: &str = "postgres:16";

/// Version range of the `pg` driver added to the server.
pub const PG_VERSION: &str = "^8.11.3";

fn settings(ctx: &GenerationContext) -> HookResult<PostgresSettings> {
    PostgresSettings::from_context(ctx)
        .map_err(|e: SettingsError| HookError::with_source(e.to_string(), e))
}

/// `createServerDotEnv` before: appends the connection variables.
pub fn create_server_dot_env(
    ctx: &GenerationContext,
    mut params: EventContext<CreateServerDotEnvBefore>,
) -> HookResult<EventContext<CreateServerDotEnvBefore>> {
    let settings = settings(ctx)?;
    let env = &mut params.before;

    env.push("DB_USER", &settings.user);
    env.push("DB_PASSWORD", &settings.password);
    env.push("DB_PORT", settings.port.to_string());
    env.push("DB_NAME", &settings.db_name);
    env.push(URL_VARIABLE, settings.url());

    debug!(app = %ctx.app_name(), "PostgreSQL variables added to .env");
    Ok(params)
}

/// `createServerDockerComposeDB` before: adds the `db` service and its volume.
pub fn create_server_docker_compose_db(
    ctx: &GenerationContext,
    mut params: EventContext<CreateServerDockerComposeDbBefore>,
) -> HookResult<EventContext<CreateServerDockerComposeDbBefore>> {
    let settings = settings(ctx)?;

    let service = json!({
        "image": POSTGRES_IMAGE,
        "ports": ["${DB_PORT}:5432"],
        "environment": {
            "POSTGRES_USER": "${DB_USER}",
            "POSTGRES_PASSWORD": "${DB_PASSWORD}",
            "POSTGRES_DB": "${DB_NAME}",
        },
        "volumes": ["postgres:/var/lib/postgresql/data"],
        "healthcheck": {
            "test": ["CMD-SHELL", format!("pg_isready -d {} -U {}", settings.db_name, settings.user)],
            "timeout": "45s",
            "interval": "10s",
            "retries": 10,
        },
    });

    let updates = &mut params.before.update_properties;
    updates.push(property_update(&["services", "db"], service));
    updates.push(property_update(&["volumes", "postgres"], Value::Null));

    Ok(params)
}

fn property_update(path: &[&str], value: Value) -> Map<String, Value> {
    let mut update = Map::new();
    update.insert("path".to_string(), json!(path));
    update.insert("value".to_string(), value);
    update
}

/// `createPrismaSchema` before: points the datasource at PostgreSQL.
pub async fn create_prisma_schema(
    mut params: EventContext<CreatePrismaSchemaBefore>,
) -> HookResult<EventContext<CreatePrismaSchemaBefore>> {
    params.before.data_source = PrismaDataSource {
        name: "postgres".to_string(),
        provider: DataSourceProvider::Postgresql,
        url: DataSourceUrl {
            name: URL_VARIABLE.to_string(),
        },
    };
    Ok(params)
}

/// `createServerPackageJson` before: adds the `pg` driver dependency.
pub fn create_server_package_json(
    _ctx: &GenerationContext,
    mut params: EventContext<CreateServerPackageJsonBefore>,
) -> HookResult<EventContext<CreateServerPackageJsonBefore>> {
    let dependencies = params
        .before
        .update_values
        .entry("dependencies")
        .or_insert_with(|| Value::Object(Map::new()));

    match dependencies.as_object_mut() {
        Some(dependencies) => {
            dependencies.insert("pg".to_string(), json!(PG_VERSION));
            Ok(params)
        }
        None => Err(HookError::new("updateValues.dependencies is not an object")),
    }
}
