//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::Method;
use tempfile::TempDir;
use tokio::net::TcpListener;

use thunder_dispatch::config::DispatchConfig;
use thunder_dispatch::dispatch::Dispatcher;
use thunder_dispatch::hooks::{HookCatalog, HookLoader};
use thunder_dispatch::http::{HttpServer, Request, Response};
use thunder_dispatch::lifecycle::Shutdown;
use thunder_dispatch::modules::{ModuleCatalog, ModuleRegistry};
use thunder_dispatch::resolve::PathResolver;

/// Temporary `api/` and `hooks/` trees.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("api")).unwrap();
        std::fs::create_dir_all(dir.path().join("hooks")).unwrap();
        Self { dir }
    }

    pub fn api_root(&self) -> PathBuf {
        self.dir.path().join("api")
    }

    pub fn hooks_root(&self) -> PathBuf {
        self.dir.path().join("hooks")
    }

    /// Create `api/<module>.rs`, with parent directories.
    pub fn module(&self, module: &str) -> &Self {
        touch(&self.api_root(), module);
        self
    }

    /// Create `hooks/<module>.rs`, with parent directories.
    pub fn hook(&self, module: &str) -> &Self {
        touch(&self.hooks_root(), module);
        self
    }

    /// Config pointing at this fixture, listening on an ephemeral port.
    pub fn config(&self) -> DispatchConfig {
        let mut config = DispatchConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config.routes.api_root = self.api_root();
        config.hooks.root = self.hooks_root();
        config
    }

    pub async fn dispatcher(&self, modules: &ModuleCatalog, hooks: HookCatalog) -> Dispatcher {
        let registry = ModuleRegistry::discover(modules, &self.api_root(), "rs").await.unwrap();
        let resolver = PathResolver::new(self.api_root(), "api", "rs");
        let hooks = HookLoader::new(self.hooks_root(), "rs", hooks);
        Dispatcher::new(resolver, Arc::new(registry), hooks)
    }
}

fn touch(root: &Path, module: &str) {
    let file = root.join(format!("{module}.rs"));
    if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(file, "").unwrap();
}

pub fn request(method: Method, uri: &str) -> Request {
    axum::http::Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

pub fn get(uri: &str) -> Request {
    request(Method::GET, uri)
}

pub async fn body_text(res: Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(res: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serve `dispatcher` on an ephemeral port until the returned coordinator
/// is triggered.
pub async fn start_server(
    config: DispatchConfig,
    dispatcher: Dispatcher,
) -> (SocketAddr, Shutdown, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    let server = HttpServer::new(config, Arc::new(dispatcher));
    let handle = tokio::spawn(async move {
        server.run(listener, stop).await.unwrap();
    });

    (addr, shutdown, handle)
}
