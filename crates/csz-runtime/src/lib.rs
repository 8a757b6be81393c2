//! Runtime type and reflection model for csz-emitted programs.
//!
//! Emitted code keeps casts, type tests, `typeof` and generic dispatch
//! dynamic; this crate is the model those operations run against:
//!
//! - [`TypeRegistry`]: type records addressed by [`TypeHandle`], loaded from
//!   the [`TypeMetadata`] blocks the emitter produces
//! - Generic-instance identity: structurally equal applications share one handle
//! - Variance-aware assignability (`is_assignable_from`)
//! - Member lookup by kind, binding, name and exact signature
//! - Attribute inspection and method invocation through registered invokers

mod assignability;
pub mod attributes;
mod error;
pub mod members;
pub mod metadata;
mod registry;
pub mod value;

pub use attributes::{Attribute, AttributeKind, AttributeValue};
pub use error::ReflectionError;
pub use members::{BindingFlags, MemberInfo, MemberTypes};
pub use metadata::{
    GenericParameterMetadata, MemberKind, MemberMetadata, RuntimeTypeKind, TypeMetadata,
    TypeRefMetadata, Variance,
};
pub use registry::{TypeHandle, TypeRecord, TypeRegistry};
pub use value::{Invoker, RuntimeValue};
