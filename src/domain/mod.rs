pub mod descriptor;
pub mod plan;
pub mod types;

pub use descriptor::{
    Descriptor, DescriptorContent, DescriptorMetadata, Index, IndexError, RESOURCE_REF_CONTENT,
    ResourceType, WORKFLOW_STEPS_CONTENT,
};
pub use plan::{Plan, PlanItem, StepTarget, WorkflowStep};
pub use types::{ChatMessage, MessageRole, WorkflowReference};
