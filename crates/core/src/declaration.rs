use std::sync::Arc;

use crate::capability::{CallShapes, Capability};
use crate::error::AdapterError;

pub type AdapterConstructor =
    Box<dyn Fn() -> Result<Arc<dyn Capability>, AdapterError> + Send + Sync>;

/// Static, compiled-in description of one adapter: the catalog name, the
/// call shapes the loader must find (at least one of the set), and the
/// fallible constructor.
pub struct AdapterDeclaration {
    pub name: &'static str,
    pub required: CallShapes,
    constructor: AdapterConstructor,
}

impl AdapterDeclaration {
    pub fn new<F>(name: &'static str, required: CallShapes, constructor: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Capability>, AdapterError> + Send + Sync + 'static,
    {
        Self {
            name,
            required,
            constructor: Box::new(constructor),
        }
    }

    pub(crate) fn construct(&self) -> Result<Arc<dyn Capability>, AdapterError> {
        (self.constructor)()
    }
}

impl std::fmt::Debug for AdapterDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterDeclaration")
            .field("name", &self.name)
            .field("required", &self.required)
            .finish()
    }
}
