//! Runtime values and the dynamic type operations emitted code calls
//! (`Csz.is`, `Csz.as`, `Csz.cast`).

use std::sync::Arc;

use crate::error::ReflectionError;
use crate::registry::{TypeHandle, TypeRegistry};

/// Implementation bound to a reflected method: receives the target (absent
/// for static members) and the argument list.
pub type Invoker = Arc<
    dyn Fn(Option<&RuntimeValue>, &[RuntimeValue]) -> Result<RuntimeValue, ReflectionError>
        + Send
        + Sync,
>;

#[derive(Clone, Debug, PartialEq)]
pub enum RuntimeValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Decimal(String),
    Str(String),
    /// Instance of a registered reference or value type.
    Object(TypeHandle),
}

impl RuntimeValue {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl TypeRegistry {
    pub fn type_of_value(&self, value: &RuntimeValue) -> Option<TypeHandle> {
        match value {
            RuntimeValue::Null => None,
            RuntimeValue::Bool(_) => Some(TypeHandle::BOOLEAN),
            RuntimeValue::Int32(_) => Some(TypeHandle::INT32),
            RuntimeValue::Int64(_) => Some(TypeHandle::INT64),
            RuntimeValue::Double(_) => Some(TypeHandle::DOUBLE),
            RuntimeValue::Decimal(_) => Some(TypeHandle::DECIMAL),
            RuntimeValue::Str(_) => Some(TypeHandle::STRING),
            RuntimeValue::Object(ty) => Some(*ty),
        }
    }

    /// `value is T`. Null is never an instance.
    pub fn is_instance_of(&self, value: &RuntimeValue, ty: TypeHandle) -> bool {
        self.is_assignable_from(ty, self.type_of_value(value))
    }

    /// `value as T`: the value itself when it is an instance, otherwise null.
    pub fn as_type(&self, value: &RuntimeValue, ty: TypeHandle) -> RuntimeValue {
        if self.is_instance_of(value, ty) {
            value.clone()
        } else {
            RuntimeValue::Null
        }
    }

    /// `(T)value`. Null converts to any reference or nullable type.
    pub fn cast(&self, value: &RuntimeValue, ty: TypeHandle) -> Result<RuntimeValue, ReflectionError> {
        if value.is_null() {
            if !self.is_value_type(ty) || self.generic_definition(ty) == Some(TypeHandle::NULLABLE) {
                return Ok(RuntimeValue::Null);
            }
        } else if self.is_instance_of(value, ty) {
            return Ok(value.clone());
        }
        Err(ReflectionError::InvalidCast {
            from: self
                .type_of_value(value)
                .map(|t| self.type_name(t))
                .unwrap_or_else(|| "null".to_string()),
            to: self.type_name(ty),
        })
    }
}
