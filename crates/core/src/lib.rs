pub mod capability;
pub mod catalog;
pub mod declaration;
pub mod dispatcher;
pub mod error;
pub mod registry;

pub use capability::{CallShape, CallShapes, Capability, ProviderResult};
pub use catalog::{describe, FieldSpec, FieldType, SchemaTable, ToolDescriptor, ToolSchema};
pub use declaration::AdapterDeclaration;
pub use dispatcher::{Dispatcher, ToolResponse};
pub use error::{AdapterError, CatalogError, DispatchError};
pub use registry::{AdapterRegistry, Provider};
