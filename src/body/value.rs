// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Type tags and type-erased values
//!
//! Ports and bodies describe the data they carry with a [`DataType`] tag.
//! Values flowing between nodes are [`Value`]s: a shared, type-erased box
//! that can be downcast back to the concrete type.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::errors::{PipelineError, PipelineResult};

/// Logical data type of a port or body slot
#[derive(Clone, Copy)]
pub struct DataType {
    id: TypeId,
    name: &'static str,
}

impl DataType {
    /// Tag for the Rust type `T`
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Full type name, for diagnostics only
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this tag describes `T`
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DataType {}

impl Hash for DataType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataType({})", self.name)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Strip module paths from every segment, generic arguments included:
        // `alloc::vec::Vec<alloc::string::String>` -> `Vec<String>`
        for piece in self.name.split_inclusive(is_type_delimiter) {
            let (path, delimiter) = match piece.char_indices().last() {
                Some((at, c)) if is_type_delimiter(c) => piece.split_at(at),
                _ => (piece, ""),
            };
            f.write_str(path.rsplit("::").next().unwrap_or(path))?;
            f.write_str(delimiter)?;
        }
        Ok(())
    }
}

fn is_type_delimiter(c: char) -> bool {
    matches!(c, '<' | '>' | ',' | '(' | ')' | '[' | ']' | '&' | ';' | '*' | ' ')
}

trait ErasedValue: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug> ErasedValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A type-erased value produced by a node body
#[derive(Clone)]
pub struct Value {
    inner: Rc<dyn ErasedValue>,
    data_type: DataType,
}

impl Value {
    /// Wrap a concrete value
    pub fn new<T: Any + fmt::Debug>(value: T) -> Self {
        Self {
            inner: Rc::new(value),
            data_type: DataType::of::<T>(),
        }
    }

    /// Type tag of the wrapped value
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Borrow the wrapped value as `T`
    pub fn downcast_ref<T: Any>(&self) -> PipelineResult<&T> {
        // Deref first so the call dispatches through the vtable, not on the Rc
        (*self.inner)
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| PipelineError::TypeMismatch {
                expected: DataType::of::<T>(),
                found: self.data_type,
            })
    }

    /// Clone the wrapped value out as `T`
    pub fn downcast<T: Any + Clone>(&self) -> PipelineResult<T> {
        self.downcast_ref::<T>().cloned()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_equality() {
        assert_eq!(DataType::of::<i64>(), DataType::of::<i64>());
        assert_ne!(DataType::of::<i64>(), DataType::of::<i32>());
        assert!(DataType::of::<String>().is::<String>());
    }

    #[test]
    fn test_data_type_display_is_short() {
        assert_eq!(DataType::of::<String>().to_string(), "String");
        assert_eq!(DataType::of::<i64>().to_string(), "i64");
    }

    #[test]
    fn test_data_type_display_keeps_generics() {
        assert_eq!(DataType::of::<Vec<String>>().to_string(), "Vec<String>");
        assert_eq!(
            DataType::of::<Result<Vec<i64>, String>>().to_string(),
            "Result<Vec<i64>, String>"
        );
        assert_eq!(DataType::of::<Option<(i64, String)>>().to_string(), "Option<(i64, String)>");
        assert_eq!(DataType::of::<[u8; 4]>().to_string(), "[u8; 4]");
    }

    #[test]
    fn test_downcast() {
        let value = Value::new(42i64);
        assert_eq!(value.downcast::<i64>().unwrap(), 42);
        assert_eq!(value.data_type(), DataType::of::<i64>());
    }

    #[test]
    fn test_downcast_mismatch() {
        let value = Value::new("text".to_string());
        let err = value.downcast::<i64>().unwrap_err();
        assert!(matches!(err, PipelineError::TypeMismatch { .. }));
    }

    #[test]
    fn test_debug_delegates() {
        assert_eq!(format!("{:?}", Value::new(7i64)), "7");
    }
}
