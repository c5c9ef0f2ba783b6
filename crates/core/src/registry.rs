use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::capability::{CallShape, Capability};
use crate::declaration::AdapterDeclaration;

/// One live adapter together with everything resolved at load time: its
/// catalog description and the call shape the dispatcher will invoke.
pub struct Provider {
    pub name: String,
    pub description: String,
    pub entrypoint: CallShape,
    adapter: Arc<dyn Capability>,
}

impl Provider {
    pub fn adapter(&self) -> Arc<dyn Capability> {
        Arc::clone(&self.adapter)
    }
}

/// The live adapter set, materialized once at boot and read-only afterwards.
///
/// Loading is failure-isolated: a constructor that errors or panics only
/// removes its own adapter from the catalog. There are no retries; a fresh
/// process is the only recovery path.
pub struct AdapterRegistry {
    providers: Vec<Provider>,
    index: HashMap<String, usize>,
    attempted: usize,
    failed: Vec<String>,
}

impl AdapterRegistry {
    /// Instantiate every declared adapter, in declaration order, skipping
    /// (and recording) any that fail to construct or that expose none of
    /// the declaration's required call shapes.
    pub fn load_all(declarations: &[AdapterDeclaration]) -> Self {
        let mut providers: Vec<Provider> = Vec::with_capacity(declarations.len());
        let mut index = HashMap::new();
        let mut failed = Vec::new();

        for decl in declarations {
            debug!("Loading adapter: {}", decl.name);

            let adapter = match catch_unwind(AssertUnwindSafe(|| decl.construct())) {
                Ok(Ok(adapter)) => adapter,
                Ok(Err(e)) => {
                    warn!("Adapter '{}' failed to initialize: {}", decl.name, e);
                    failed.push(decl.name.to_string());
                    continue;
                }
                Err(panic) => {
                    warn!(
                        "Adapter '{}' constructor panicked: {}",
                        decl.name,
                        panic_message(panic.as_ref())
                    );
                    failed.push(decl.name.to_string());
                    continue;
                }
            };

            let shapes = adapter.shapes();
            if !shapes.intersects(&decl.required) {
                warn!(
                    "Adapter '{}' exposes none of the required call shapes, skipping",
                    decl.name
                );
                failed.push(decl.name.to_string());
                continue;
            }
            let Some(entrypoint) = shapes.preferred() else {
                warn!("Adapter '{}' exposes no call shape, skipping", decl.name);
                failed.push(decl.name.to_string());
                continue;
            };

            let description = adapter
                .description()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| format!("{} capability adapter", decl.name));

            index.insert(decl.name.to_string(), providers.len());
            providers.push(Provider {
                name: decl.name.to_string(),
                description,
                entrypoint,
                adapter,
            });
        }

        info!(
            "Adapter load complete: {}/{} available",
            providers.len(),
            declarations.len()
        );

        Self {
            providers,
            index,
            attempted: declarations.len(),
            failed,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Provider> {
        self.index.get(name).map(|&i| &self.providers[i])
    }

    /// Providers in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// Names of declarations that did not load. Diagnostic only.
    pub fn failed_names(&self) -> &[String] {
        &self.failed
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
