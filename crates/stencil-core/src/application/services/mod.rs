//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "update a module" or "regenerate type headers".

pub mod context;
pub mod generation_service;
pub mod interface_resolver;
pub mod model_resolver;
pub mod regeneration;
pub mod template_data;
pub mod type_resolver;

pub use context::RunContext;
pub use generation_service::{GenerationService, ModuleRequest, RunOptions};
pub use interface_resolver::{InterfaceChainResolver, LoadedInterface};
pub use model_resolver::{InterfaceModel, ModelResolver, ModuleModel, NamespaceModel};
pub use regeneration::{
    ArtifactAction, ArtifactReport, RegenerationOrchestrator, RunReport, SkippedItem,
};
pub use template_data::{TemplateDataBuilder, to_value};
pub use type_resolver::{TypeDependencyResolver, TypeReferenceResolver, VerifiedType};
