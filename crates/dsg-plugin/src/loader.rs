//! Plugin loader: resolves installations to modules in installation order.
//!
//! Each installation yields exactly one [`LoadOutcome`] at the same index as
//! its descriptor. Resolution may run concurrently, but outcomes are always
//! returned in input order, which is the order hooks are later merged in.

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::join_all;
use tracing::{debug, info, warn};

use dsg_core::config::PluginConfig;
use dsg_core::types::{PluginInstallation, PluginSource};

use crate::error::{PluginError, panic_message};
use crate::exports::PluginModule;
use crate::resolver::{ModuleRequest, ModuleResolver};

/// A module resolved for one installation.
pub struct LoadedPlugin {
    /// Position of the installation in the input list.
    pub index: usize,
    /// Display name of the plugin.
    pub plugin: Arc<str>,
    /// The resolved module.
    pub module: Arc<dyn PluginModule>,
}

impl std::fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("index", &self.index)
            .field("plugin", &self.plugin)
            .finish_non_exhaustive()
    }
}

/// Result of loading one installation.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The module was resolved.
    Loaded(LoadedPlugin),
    /// The installation is disabled.
    Skipped {
        /// Display name of the plugin.
        plugin: String,
    },
    /// The module could not be resolved.
    Failed(PluginError),
}

/// Resolves plugin installations through a [`ModuleResolver`].
#[derive(Clone)]
pub struct PluginLoader {
    resolver: Arc<dyn ModuleResolver>,
    installation_dir: Option<PathBuf>,
    local_base_dir: PathBuf,
    concurrent: bool,
}

impl PluginLoader {
    /// Creates a loader that resolves packages by name and local plugins
    /// relative to the working directory.
    pub fn new(resolver: Arc<dyn ModuleResolver>) -> Self {
        Self {
            resolver,
            installation_dir: None,
            local_base_dir: PathBuf::from("."),
            concurrent: true,
        }
    }

    /// Creates a loader from the plugin configuration section.
    pub fn from_config(resolver: Arc<dyn ModuleResolver>, config: &PluginConfig) -> Self {
        Self::new(resolver)
            .installation_dir(config.installation_dir.as_ref().map(PathBuf::from))
            .local_base_dir(&config.local_base_dir)
            .concurrent(config.concurrent_loading)
    }

    /// Roots published packages under `dir`.
    pub fn installation_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.installation_dir = dir;
        self
    }

    /// Sets the base directory local destination paths are joined onto.
    pub fn local_base_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.local_base_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Sets whether modules are resolved concurrently.
    pub fn concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Builds the resolution request for an installation.
    pub fn request_for(&self, installation: &PluginInstallation) -> ModuleRequest {
        match installation.source() {
            PluginSource::Local { dest_path } => ModuleRequest::Local {
                path: self.local_base_dir.join(dest_path),
            },
            PluginSource::Package(name) => ModuleRequest::Package {
                path: self.installation_dir.as_ref().map(|dir| dir.join(&name)),
                name,
            },
        }
    }

    /// Loads every installation, returning one outcome per input in order.
    pub async fn load_all(&self, installations: &[PluginInstallation]) -> Vec<LoadOutcome> {
        let outcomes = if self.concurrent {
            join_all(
                installations
                    .iter()
                    .enumerate()
                    .map(|(index, installation)| self.load(index, installation)),
            )
            .await
        } else {
            let mut outcomes = Vec::with_capacity(installations.len());
            for (index, installation) in installations.iter().enumerate() {
                outcomes.push(self.load(index, installation).await);
            }
            outcomes
        };

        let loaded = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, LoadOutcome::Loaded(_)))
            .count();
        info!(
            total = installations.len(),
            loaded,
            concurrent = self.concurrent,
            "Plugin modules resolved"
        );

        outcomes
    }

    /// Loads a single installation.
    pub async fn load(&self, index: usize, installation: &PluginInstallation) -> LoadOutcome {
        let plugin = installation.display_name().to_string();

        if !installation.enabled {
            debug!(plugin = %plugin, "Plugin disabled, skipping");
            return LoadOutcome::Skipped { plugin };
        }

        let request = self.request_for(installation);
        let resolved = AssertUnwindSafe(self.resolver.resolve(&request))
            .catch_unwind()
            .await;

        let reason = match resolved {
            Ok(Ok(module)) => {
                debug!(plugin = %plugin, request = %request, "Plugin module resolved");
                return LoadOutcome::Loaded(LoadedPlugin {
                    index,
                    plugin: plugin.into(),
                    module,
                });
            }
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("resolver panicked: {}", panic_message(payload.as_ref())),
        };

        warn!(plugin = %plugin, request = %request, error = %reason, "Plugin could not be loaded");
        LoadOutcome::Failed(PluginError::Load { plugin, reason })
    }
}

impl std::fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLoader")
            .field("installation_dir", &self.installation_dir)
            .field("local_base_dir", &self.local_base_dir)
            .field("concurrent", &self.concurrent)
            .finish_non_exhaustive()
    }
}

/// Shared-library resolver using `libloading` (feature-gated).
#[cfg(feature = "dynamic")]
pub mod dynamic_loader {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tracing::info;

    use crate::error::ResolveError;
    use crate::exports::PluginModule;
    use crate::resolver::{ModuleRequest, ModuleResolver};

    /// Name of the symbol dynamic plugins must export.
    pub const MODULE_SYMBOL: &[u8] = b"dsg_plugin_module";

    /// Type of the module factory exported by dynamic plugins.
    ///
    /// Dynamic plugins must export:
    /// `extern "C" fn dsg_plugin_module() -> *mut Arc<dyn PluginModule>`
    /// returning a pointer obtained from `Box::into_raw`.
    pub type PluginModuleFn = unsafe extern "C" fn() -> *mut Arc<dyn PluginModule>;

    /// Resolves modules from shared libraries (.so / .dll / .dylib).
    ///
    /// Loaded libraries are never unloaded: hooks registered by a library
    /// point into its code for the rest of the process.
    #[derive(Debug)]
    pub struct DylibResolver {
        loaded: AtomicUsize,
    }

    impl DylibResolver {
        /// Creates a new resolver.
        ///
        /// # Safety
        /// Resolving a module runs arbitrary code from a shared library,
        /// which must be built against this crate with the same compiler.
        /// Only resolve trusted plugins.
        pub unsafe fn new() -> Self {
            Self {
                loaded: AtomicUsize::new(0),
            }
        }

        /// Returns how many libraries this resolver has loaded.
        pub fn loaded_count(&self) -> usize {
            self.loaded.load(Ordering::Relaxed)
        }

        /// Returns the library file for a requested path.
        ///
        /// A directory resolves to the platform library named after it,
        /// e.g. `plugins/plugin-db-postgres/libplugin_db_postgres.so`.
        pub fn library_path(path: &Path) -> PathBuf {
            if !path.is_dir() {
                return path.to_path_buf();
            }
            let stem = path
                .file_name()
                .map(|name| name.to_string_lossy().replace('-', "_"))
                .unwrap_or_default();
            path.join(libloading::library_filename(stem))
        }

        fn load(&self, target: String, path: &Path) -> Result<Arc<dyn PluginModule>, ResolveError> {
            let failed = |reason: String| ResolveError::Failed {
                target: target.clone(),
                reason,
            };

            // SAFETY: the caller of `DylibResolver::new` vouched for the plugins.
            let library = unsafe { libloading::Library::new(path) }
                .map_err(|e| failed(format!("library could not be opened: {e}")))?;

            // SAFETY: the symbol type is the documented plugin ABI.
            let module = unsafe {
                let factory: libloading::Symbol<PluginModuleFn> = library
                    .get(MODULE_SYMBOL)
                    .map_err(|e| failed(format!("missing 'dsg_plugin_module' symbol: {e}")))?;
                let raw = factory();
                if raw.is_null() {
                    return Err(failed("module factory returned null".to_string()));
                }
                *Box::from_raw(raw)
            };

            std::mem::forget(library);
            self.loaded.fetch_add(1, Ordering::Relaxed);
            info!(path = %path.display(), "Dynamic plugin module loaded");

            Ok(module)
        }
    }

    #[async_trait]
    impl ModuleResolver for DylibResolver {
        async fn resolve(
            &self,
            request: &ModuleRequest,
        ) -> Result<Arc<dyn PluginModule>, ResolveError> {
            let target = request.target();
            let path = match request.path() {
                Some(path) => Self::library_path(path),
                None => return Err(ResolveError::NotFound(target)),
            };
            if !path.exists() {
                return Err(ResolveError::NotFound(target));
            }
            self.load(target, &path)
        }
    }
}

#[cfg(feature = "dynamic")]
pub use dynamic_loader::DylibResolver;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::ResolveError;
    use crate::exports::{DefaultExport, PluginEntry};
    use crate::resolver::StaticResolver;

    #[derive(Default)]
    struct Noop;

    impl PluginEntry for Noop {}

    /// Resolves any package after a delay encoded in its name.
    struct Slow;

    #[async_trait]
    impl ModuleResolver for Slow {
        async fn resolve(
            &self,
            request: &ModuleRequest,
        ) -> Result<Arc<dyn PluginModule>, ResolveError> {
            let target = request.target();
            let millis = target
                .rsplit('-')
                .next()
                .and_then(|ms| ms.parse::<u64>().ok())
                .ok_or_else(|| ResolveError::NotFound(target.clone()))?;
            tokio::time::sleep(Duration::from_millis(millis)).await;
            Ok(DefaultExport::<Noop>::module())
        }
    }

    struct Panicking;

    #[async_trait]
    impl ModuleResolver for Panicking {
        async fn resolve(
            &self,
            _request: &ModuleRequest,
        ) -> Result<Arc<dyn PluginModule>, ResolveError> {
            panic!("resolver bug")
        }
    }

    fn names(outcomes: &[LoadOutcome]) -> Vec<String> {
        outcomes
            .iter()
            .map(|outcome| match outcome {
                LoadOutcome::Loaded(loaded) => format!("{}:{}", loaded.index, loaded.plugin),
                LoadOutcome::Skipped { plugin } => format!("skipped:{plugin}"),
                LoadOutcome::Failed(err) => format!("failed:{}", err.plugin().unwrap_or("?")),
            })
            .collect()
    }

    #[test]
    fn test_request_for_local_and_package() {
        let loader = PluginLoader::new(Arc::new(StaticResolver::new()))
            .installation_dir(Some(PathBuf::from("/opt/dsg/plugins")))
            .local_base_dir("/work/app");

        let local = PluginInstallation::local("auth", "plugins/auth");
        assert_eq!(
            loader.request_for(&local),
            ModuleRequest::Local {
                path: PathBuf::from("/work/app/plugins/auth")
            }
        );

        let package = PluginInstallation::package("@dsg/plugin-db-postgres");
        assert_eq!(
            loader.request_for(&package),
            ModuleRequest::Package {
                name: "@dsg/plugin-db-postgres".to_string(),
                path: Some(PathBuf::from("/opt/dsg/plugins/@dsg/plugin-db-postgres")),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_load_preserves_order() {
        let loader = PluginLoader::new(Arc::new(Slow));
        let installations = vec![
            PluginInstallation::package("slow-30"),
            PluginInstallation::package("fast-1"),
            PluginInstallation::package("mid-10"),
        ];

        let outcomes = loader.load_all(&installations).await;
        assert_eq!(names(&outcomes), vec!["0:slow-30", "1:fast-1", "2:mid-10"]);
    }

    #[tokio::test]
    async fn test_failures_and_disabled_are_isolated() {
        let resolver = StaticResolver::new().with_package("good", DefaultExport::<Noop>::module());
        let loader = PluginLoader::new(Arc::new(resolver)).concurrent(false);

        let mut disabled = PluginInstallation::package("good");
        disabled.enabled = false;
        let installations = vec![
            PluginInstallation::package("missing"),
            disabled,
            PluginInstallation::package("good"),
        ];

        let outcomes = loader.load_all(&installations).await;
        assert_eq!(
            names(&outcomes),
            vec!["failed:missing", "skipped:good", "2:good"]
        );
    }

    #[tokio::test]
    async fn test_resolver_panic_is_load_failure() {
        let loader = PluginLoader::new(Arc::new(Panicking));
        let outcome = loader
            .load(0, &PluginInstallation::package("boom"))
            .await;
        match outcome {
            LoadOutcome::Failed(PluginError::Load { plugin, reason }) => {
                assert_eq!(plugin, "boom");
                assert!(reason.contains("resolver bug"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
