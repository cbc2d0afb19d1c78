//! Integration tests for registry construction and the invocation pipeline.

mod helpers;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::json;

use dsg_core::types::{
    DataSourceProvider, DataSourceUrl, Entity, EntityField, EnumDataType, GeneratedModule,
    GeneratedModules, PrismaClientGenerator, PrismaDataSource,
};
use dsg_plugin::exports::{RegistrationBuilder, RegistrationValue};
use dsg_plugin::hooks::catalog::{
    CreateEntityControllerBefore, CreatePrismaSchemaBefore, CreateServerDotEnvBefore, Identifier,
    TemplateMapping,
};
use dsg_plugin::{
    EventContext, EventName, Hook, HookDispatcher, HookError, HookPhase, PluginError,
};

use helpers::{LatencyResolver, Trace, build, context, installations, module};

fn prisma_before() -> CreatePrismaSchemaBefore {
    CreatePrismaSchemaBefore {
        entities: vec![Entity::new("Customer").with_field(EntityField::new("id", EnumDataType::Id))],
        data_source: PrismaDataSource {
            name: "sqlite".to_string(),
            provider: DataSourceProvider::Sqlite,
            url: DataSourceUrl {
                name: "DB_URL".to_string(),
            },
        },
        client_generator: PrismaClientGenerator::default(),
    }
}

fn controller_before() -> CreateEntityControllerBefore {
    CreateEntityControllerBefore {
        template_path: "controller/controller.template.ts".to_string(),
        entity_name: "customer".to_string(),
        entity_service_module: "./customer.service".to_string(),
        template_mapping: TemplateMapping::new(),
        controller_base_id: Identifier::new("CustomerControllerBase"),
        service_id: Identifier::new("CustomerService"),
    }
}

#[tokio::test]
async fn test_scenario_a_before_base_after_order() {
    let trace = Trace::default();

    let p1_trace = trace.clone();
    let p1 = module(move || {
        let trace = p1_trace.clone();
        Some(
            RegistrationBuilder::new()
                .before(
                    EventName::CreatePrismaSchema,
                    Hook::sync_typed(move |_, mut params: EventContext<CreatePrismaSchemaBefore>| {
                        trace.push("p1:before");
                        params.before.entities[0]
                            .fields
                            .push(EntityField::new("createdAt", EnumDataType::CreatedAt));
                        Ok(params)
                    }),
                )
                .build(),
        )
    });

    let p2_trace = trace.clone();
    let p2 = module(move || {
        let trace = p2_trace.clone();
        Some(
            RegistrationBuilder::new()
                .after(
                    EventName::CreatePrismaSchema,
                    Hook::sync_typed(move |_, mut modules: GeneratedModules| {
                        trace.push("p2:after");
                        modules.set(GeneratedModule::new("prisma/seed.ts", "// seed"));
                        Ok(modules)
                    }),
                )
                .build(),
        )
    });

    let resolver = LatencyResolver::new().with("p1", 5, p1).with("p2", 1, p2);
    let (registry, report) = build(Arc::new(resolver), &installations(&["p1", "p2"])).await;
    assert!(!report.has_diagnostics());

    let ctx = context();
    let base_trace = trace.clone();
    let modules = HookDispatcher::new(&registry, &ctx)
        .run_stage(prisma_before(), |params| async move {
            base_trace.push("base");
            let customer = &params.before.entities[0];
            assert!(customer.field("createdAt").is_some());
            Ok::<_, HookError>(GeneratedModules::from(vec![GeneratedModule::new(
                "prisma/schema.prisma",
                format!("model {} {{}}", customer.name),
            )]))
        })
        .await
        .unwrap();

    assert_eq!(trace.steps(), vec!["p1:before", "base", "p2:after"]);
    assert_eq!(modules.len(), 2);
    assert_eq!(
        modules.get("prisma/schema.prisma").map(|m| m.code.as_str()),
        Some("model Customer {}")
    );
}

#[tokio::test]
async fn test_scenario_b_unresolvable_plugin_is_isolated() {
    let good = module(|| {
        Some(
            RegistrationBuilder::new()
                .before(
                    EventName::CreateServerDotEnv,
                    Hook::sync_typed(|_, mut params: EventContext<CreateServerDotEnvBefore>| {
                        params.before.push("GOOD", "yes");
                        Ok(params)
                    }),
                )
                .build(),
        )
    });
    let resolver = LatencyResolver::new().with("good", 1, good);

    let (registry, report) =
        build(Arc::new(resolver), &installations(&["broken", "good"])).await;

    assert_eq!(registry.events().collect::<Vec<_>>(), vec!["createServerDotEnv"]);
    let owners = registry.summary().events[0].before.clone();
    assert_eq!(owners, vec!["good".to_string()]);
    assert_eq!(registry.hook_count(), 1);

    assert_eq!(report.diagnostics.len(), 1);
    assert!(matches!(
        &report.diagnostics[0],
        PluginError::Load { plugin, .. } if plugin == "broken"
    ));
}

#[tokio::test]
async fn test_scenario_c_failing_before_hook_aborts_stage() {
    let trace = Trace::default();

    let failing = module(|| {
        Some(
            RegistrationBuilder::new()
                .before(
                    EventName::CreateEntityController,
                    Hook::sync(|_, _| Err(HookError::new("template mapping rejected"))),
                )
                .build(),
        )
    });
    let after_trace = trace.clone();
    let observer = module(move || {
        let trace = after_trace.clone();
        Some(
            RegistrationBuilder::new()
                .after(
                    EventName::CreateEntityController,
                    Hook::sync(move |_, value| {
                        trace.push("after");
                        Ok(value)
                    }),
                )
                .build(),
        )
    });

    let resolver = LatencyResolver::new()
        .with("failing", 1, failing)
        .with("observer", 1, observer);
    let (registry, _) =
        build(Arc::new(resolver), &installations(&["failing", "observer"])).await;

    let ctx = context();
    let base_trace = trace.clone();
    let err = HookDispatcher::new(&registry, &ctx)
        .run_stage(controller_before(), |_| async move {
            base_trace.push("base");
            Ok::<_, HookError>(GeneratedModules::new())
        })
        .await
        .unwrap_err();

    match &err {
        PluginError::HookExecution {
            event,
            phase,
            plugin,
            source,
        } => {
            assert_eq!(event, "createEntityController");
            assert_eq!(*phase, HookPhase::Before);
            assert_eq!(plugin, "failing");
            assert_eq!(source.message(), "template mapping rejected");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_fatal());
    assert!(trace.steps().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hook_order_follows_installation_order_not_latency() {
    let trace = Trace::default();
    let latencies = [("slow", 40), ("fast", 1), ("medium", 20), ("instant", 0)];

    let mut resolver = LatencyResolver::new();
    for (name, millis) in latencies {
        let trace = trace.clone();
        resolver = resolver.with(
            name,
            millis,
            module(move || {
                let trace = trace.clone();
                Some(
                    RegistrationBuilder::new()
                        .before(
                            EventName::CreateServerDotEnv,
                            Hook::asynchronous(move |_, value| {
                                let trace = trace.clone();
                                async move {
                                    trace.push(name);
                                    Ok(value)
                                }
                            }),
                        )
                        .build(),
                )
            }),
        );
    }

    let (registry, _) = build(
        Arc::new(resolver),
        &installations(&["slow", "fast", "medium", "instant"]),
    )
    .await;

    let ctx = context();
    HookDispatcher::new(&registry, &ctx)
        .run_before(CreateServerDotEnvBefore::default())
        .await
        .unwrap();

    assert_eq!(trace.steps(), vec!["slow", "fast", "medium", "instant"]);
}

#[tokio::test(start_paused = true)]
async fn test_registry_build_is_deterministic() {
    let resolver: Arc<LatencyResolver> = Arc::new(
        LatencyResolver::new()
            .with(
                "a",
                30,
                module(|| {
                    Some(
                        RegistrationBuilder::new()
                            .before(EventName::CreateAuthModules, Hook::sync(|_, v| Ok(v)))
                            .after(EventName::CreateAdminModules, Hook::sync(|_, v| Ok(v)))
                            .build(),
                    )
                }),
            )
            .with(
                "b",
                10,
                module(|| {
                    Some(
                        RegistrationBuilder::new()
                            .before(EventName::CreateAdminModules, Hook::sync(|_, v| Ok(v)))
                            .before(EventName::CreateAuthModules, Hook::sync(|_, v| Ok(v)))
                            .build(),
                    )
                }),
            ),
    );
    let list = installations(&["a", "b", "missing"]);

    let (first, _) = build(resolver.clone(), &list).await;
    let (second, _) = build(resolver.clone(), &list).await;
    let (sequential, _) = dsg_plugin::PluginManager::with_loader(
        dsg_plugin::PluginLoader::new(resolver).concurrent(false),
    )
    .build_hook_registry(&list)
    .await;

    assert_eq!(first.summary(), second.summary());
    assert_eq!(first.summary(), sequential.summary());
    assert_eq!(
        first.events().collect::<Vec<_>>(),
        vec!["createAuthModules", "createAdminModules"]
    );
}

#[tokio::test]
async fn test_non_object_registrations_contribute_nothing() {
    let resolver = LatencyResolver::new()
        .with(
            "list",
            1,
            module(|| {
                Some(RegistrationValue::List(vec![
                    RegistrationBuilder::new()
                        .before(EventName::CreateServerDotEnv, Hook::sync(|_, v| Ok(v)))
                        .build(),
                ]))
            }),
        )
        .with("number", 1, module(|| Some(RegistrationValue::Data(json!(42)))))
        .with(
            "function",
            1,
            module(|| Some(RegistrationValue::Function(Hook::sync(|_, v| Ok(v))))),
        )
        .with("setup-only", 1, module(|| None))
        .with(
            "valid",
            1,
            module(|| {
                Some(
                    RegistrationBuilder::new()
                        .after(EventName::CreateMessageBroker, Hook::sync(|_, v| Ok(v)))
                        .build(),
                )
            }),
        );

    let (registry, report) = build(
        Arc::new(resolver),
        &installations(&["list", "number", "function", "setup-only", "valid"]),
    )
    .await;

    assert_eq!(registry.events().collect::<Vec<_>>(), vec!["createMessageBroker"]);
    assert_eq!(registry.hook_count(), 1);
    assert_eq!(report.diagnostics.len(), 4);
    assert!(
        report
            .diagnostics
            .iter()
            .all(|d| matches!(d, PluginError::Shape { .. }))
    );
}

#[tokio::test]
async fn test_event_keys_are_union_of_registrations() {
    let declared: Vec<(&str, Vec<EventName>)> = vec![
        ("one", vec![EventName::CreateEntityService, EventName::CreateServerDotEnv]),
        ("two", vec![EventName::CreateServerDotEnv, EventName::CreateMessageBrokerService]),
        ("three", vec![EventName::CreateServerPackageJson]),
    ];

    let mut resolver = LatencyResolver::new();
    for (name, events) in &declared {
        let events = events.clone();
        resolver = resolver.with(
            name,
            1,
            module(move || {
                let builder = events.iter().fold(RegistrationBuilder::new(), |builder, event| {
                    builder.before(*event, Hook::sync(|_, v| Ok(v)))
                });
                Some(builder.build())
            }),
        );
    }

    let names: Vec<&str> = declared.iter().map(|(name, _)| *name).collect();
    let (registry, _) = build(Arc::new(resolver), &installations(&names)).await;

    let expected: BTreeSet<&str> = declared
        .iter()
        .flat_map(|(_, events)| events.iter().map(EventName::as_str))
        .collect();
    let actual: BTreeSet<&str> = registry.events().collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_untyped_dispatch_for_unknown_event() {
    let resolver = LatencyResolver::new().with(
        "future",
        1,
        module(|| {
            Some(
                RegistrationBuilder::new()
                    .on_before("createGraphQLSchema", Hook::sync(|_, mut v| {
                        v["touched"] = json!(true);
                        Ok(v)
                    }))
                    .build(),
            )
        }),
    );
    let (registry, _) = build(Arc::new(resolver), &installations(&["future"])).await;

    let ctx = context();
    let out = HookDispatcher::new(&registry, &ctx)
        .dispatch("createGraphQLSchema", HookPhase::Before, json!({}))
        .await
        .unwrap();
    assert_eq!(out, json!({ "touched": true }));
}
