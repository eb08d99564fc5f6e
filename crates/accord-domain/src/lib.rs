pub mod error;
pub mod flatmap;
pub mod schema;
pub mod types;


pub use error::DomainError;
pub use flatmap::flatten;
pub use schema::{
    AttrValue, AttributeSchema, AttributeType, AttributeValues, ChangeKind, Mutability, Presence,
    ResourceSchema,
};
pub use types::{InstanceState, LifecycleState, ResourceAddress, ResourceMode, StateSnapshot};
