//! PostgreSQL plugin entry point.

use dsg_plugin::exports::{PluginEntry, RegistrationBuilder, RegistrationValue};
use dsg_plugin::hooks::catalog::CreatePrismaSchemaBefore;
use dsg_plugin::{EventContext, EventName, Hook};

use crate::hooks;

/// PostgreSQL database plugin.
#[derive(Debug, Default)]
pub struct PostgresPlugin;

impl PluginEntry for PostgresPlugin {
    fn register(&self) -> Option<RegistrationValue> {
        Some(
            RegistrationBuilder::new()
                .before(
                    EventName::CreateServerDotEnv,
                    Hook::sync_typed(hooks::create_server_dot_env),
                )
                .before(
                    EventName::CreateServerDockerComposeDb,
                    Hook::sync_typed(hooks::create_server_docker_compose_db),
                )
                .before(
                    EventName::CreatePrismaSchema,
                    Hook::async_typed(|_, params: EventContext<CreatePrismaSchemaBefore>| {
                        hooks::create_prisma_schema(params)
                    }),
                )
                .before(
                    EventName::CreateServerPackageJson,
                    Hook::sync_typed(hooks::create_server_package_json),
                )
                .build(),
        )
    }
}
