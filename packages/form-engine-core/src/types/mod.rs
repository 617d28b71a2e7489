//! Field type registry: the closed set of field types and their constraint shapes.

mod constraints;
mod field_type;
mod type_registry;

pub use constraints::{
    EnumConstraints, EnumOption, FieldKind, IdStrategy, IdentifierConstraints, NumberConstraints,
    StringConstraints, TemporalConstraints, TimeFormat,
};
pub use field_type::{FieldType, TypeDescriptor};
pub use type_registry::{ResolvedType, TypeRegistry};
