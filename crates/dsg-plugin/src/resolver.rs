//! Module resolution capability.
//!
//! The loader never imports code itself; it asks a [`ModuleResolver`] to turn
//! a [`ModuleRequest`] into a [`PluginModule`]. Compiled-in plugins are served
//! by [`StaticResolver`], shared libraries by
//! [`DylibResolver`](crate::loader::DylibResolver) (feature `dynamic`), and
//! tests inject their own fakes.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ResolveError;
use crate::exports::PluginModule;

/// What the loader asks a resolver for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleRequest {
    /// A published package.
    Package {
        /// Package identifier.
        name: String,
        /// Installed location when an installation directory is configured.
        path: Option<PathBuf>,
    },
    /// A local module at a filesystem path.
    Local {
        /// Base directory joined with the destination path.
        path: PathBuf,
    },
}

impl ModuleRequest {
    /// Returns the identifier or path being requested, for diagnostics.
    pub fn target(&self) -> String {
        match self {
            Self::Package { name, .. } => name.clone(),
            Self::Local { path } => path.display().to_string(),
        }
    }

    /// Returns the filesystem location of the module, if known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Package { path, .. } => path.as_deref(),
            Self::Local { path } => Some(path),
        }
    }
}

impl fmt::Display for ModuleRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package { name, .. } => write!(f, "package '{name}'"),
            Self::Local { path } => write!(f, "local '{}'", path.display()),
        }
    }
}

/// Resolves module requests to executable plugin modules.
#[async_trait]
pub trait ModuleResolver: Send + Sync {
    /// Resolves one request.
    async fn resolve(&self, request: &ModuleRequest) -> Result<Arc<dyn PluginModule>, ResolveError>;
}

/// Resolver over modules compiled into the binary.
#[derive(Default)]
pub struct StaticResolver {
    /// Package identifier → module.
    packages: HashMap<String, Arc<dyn PluginModule>>,
    /// Local path → module.
    locals: HashMap<PathBuf, Arc<dyn PluginModule>>,
}

impl StaticResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `module` for the published package `name`.
    pub fn with_package(mut self, name: impl Into<String>, module: Arc<dyn PluginModule>) -> Self {
        self.packages.insert(name.into(), module);
        self
    }

    /// Serves `module` for the local path `path`.
    pub fn with_local(mut self, path: impl Into<PathBuf>, module: Arc<dyn PluginModule>) -> Self {
        self.locals.insert(path.into(), module);
        self
    }

    /// Returns the registered package identifiers, sorted.
    pub fn package_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.packages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for StaticResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticResolver")
            .field("packages", &self.package_names())
            .field("locals", &self.locals.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl ModuleResolver for StaticResolver {
    async fn resolve(&self, request: &ModuleRequest) -> Result<Arc<dyn PluginModule>, ResolveError> {
        let found = match request {
            ModuleRequest::Package { name, .. } => self.packages.get(name),
            ModuleRequest::Local { path } => self.locals.get(path),
        };

        match found {
            Some(module) => {
                debug!(request = %request, "Resolved compiled-in module");
                Ok(module.clone())
            }
            None => Err(ResolveError::NotFound(request.target())),
        }
    }
}

/// Tries several resolvers in order.
///
/// A `NotFound` from one resolver falls through to the next; any other
/// failure is returned immediately.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Arc<dyn ModuleResolver>>,
}

impl ResolverChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resolver to the chain.
    pub fn with(mut self, resolver: Arc<dyn ModuleResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Returns the number of resolvers in the chain.
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Returns whether the chain has no resolvers.
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverChain")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

#[async_trait]
impl ModuleResolver for ResolverChain {
    async fn resolve(&self, request: &ModuleRequest) -> Result<Arc<dyn PluginModule>, ResolveError> {
        for resolver in &self.resolvers {
            match resolver.resolve(request).await {
                Err(ResolveError::NotFound(_)) => continue,
                result => return result,
            }
        }
        Err(ResolveError::NotFound(request.target()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exports::{DefaultExport, PluginEntry};

    #[derive(Default)]
    struct Noop;

    impl PluginEntry for Noop {}

    struct Failing;

    #[async_trait]
    impl ModuleResolver for Failing {
        async fn resolve(
            &self,
            request: &ModuleRequest,
        ) -> Result<Arc<dyn PluginModule>, ResolveError> {
            Err(ResolveError::Failed {
                target: request.target(),
                reason: "corrupt".to_string(),
            })
        }
    }

    fn package(name: &str) -> ModuleRequest {
        ModuleRequest::Package {
            name: name.to_string(),
            path: None,
        }
    }

    #[tokio::test]
    async fn test_static_resolver_by_package_and_path() {
        let resolver = StaticResolver::new()
            .with_package("@dsg/plugin-a", DefaultExport::<Noop>::module())
            .with_local("plugins/b", DefaultExport::<Noop>::module());

        assert!(resolver.resolve(&package("@dsg/plugin-a")).await.is_ok());
        assert!(
            resolver
                .resolve(&ModuleRequest::Local {
                    path: PathBuf::from("plugins/b")
                })
                .await
                .is_ok()
        );

        let err = resolver.resolve(&package("@dsg/missing")).await.err();
        assert!(matches!(err, Some(ResolveError::NotFound(name)) if name == "@dsg/missing"));
    }

    #[tokio::test]
    async fn test_chain_falls_through_not_found() {
        let chain = ResolverChain::new()
            .with(Arc::new(StaticResolver::new()))
            .with(Arc::new(
                StaticResolver::new().with_package("p", DefaultExport::<Noop>::module()),
            ));
        assert!(chain.resolve(&package("p")).await.is_ok());
        assert!(matches!(
            chain.resolve(&package("q")).await.err(),
            Some(ResolveError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_chain_stops_on_failure() {
        let chain = ResolverChain::new()
            .with(Arc::new(Failing))
            .with(Arc::new(
                StaticResolver::new().with_package("p", DefaultExport::<Noop>::module()),
            ));
        assert!(matches!(
            chain.resolve(&package("p")).await.err(),
            Some(ResolveError::Failed { .. })
        ));
    }

    #[test]
    fn test_request_target_and_display() {
        let request = ModuleRequest::Package {
            name: "@dsg/x".to_string(),
            path: Some(PathBuf::from("/opt/plugins/@dsg/x")),
        };
        assert_eq!(request.target(), "@dsg/x");
        assert_eq!(request.to_string(), "package '@dsg/x'");
        assert_eq!(request.path(), Some(Path::new("/opt/plugins/@dsg/x")));
    }
}
