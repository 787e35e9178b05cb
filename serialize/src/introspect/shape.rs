//! Static classification of a member's declared type.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Coarse classification of a declared type.
///
/// Numeric kinds are width-exact so that default values can be coerced
/// to the member's representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    /// Plain value aggregate, copied on assignment.
    Struct,
    Enum,
    /// Shared, reference-like object.
    Class,
    /// Trait object.
    Interface,
    Collection,
    /// Callable (function pointer or boxed closure). Never serialized.
    Delegate,
}

impl ShapeKind {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::F32
                | Self::F64
        )
    }

    /// Value types: numbers, `bool`, `char`, structs and enums.
    pub fn is_value_type(self) -> bool {
        self.is_numeric() || matches!(self, Self::Bool | Self::Char | Self::Struct | Self::Enum)
    }
}

/// Declared type of a member: display name plus [`ShapeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeShape {
    name: &'static str,
    kind: ShapeKind,
}

impl TypeShape {
    pub const fn new(name: &'static str, kind: ShapeKind) -> Self {
        Self { name, kind }
    }

    /// Shape of a type implementing [`Shaped`].
    pub fn of<T: Shaped + ?Sized>() -> Self {
        Self::new(std::any::type_name::<T>(), T::KIND)
    }

    /// Shape of any type with an explicit kind.
    pub fn with_kind<T: ?Sized>(kind: ShapeKind) -> Self {
        Self::new(std::any::type_name::<T>(), kind)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn is_value_type(&self) -> bool {
        self.kind.is_value_type()
    }

    pub fn is_string(&self) -> bool {
        self.kind == ShapeKind::String
    }

    pub fn is_delegate(&self) -> bool {
        self.kind == ShapeKind::Delegate
    }
}

/// Types with a statically known [`ShapeKind`].
pub trait Shaped {
    const KIND: ShapeKind;
}

macro_rules! shaped {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(impl Shaped for $ty { const KIND: ShapeKind = ShapeKind::$kind; })*
    };
}

shaped! {
    bool => Bool, char => Char,
    i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => U64,
    f32 => F32, f64 => F64,
    String => String, str => String,
}

impl<T> Shaped for Vec<T> {
    const KIND: ShapeKind = ShapeKind::Collection;
}

impl<K, V, S> Shaped for HashMap<K, V, S> {
    const KIND: ShapeKind = ShapeKind::Collection;
}

impl<K, V> Shaped for BTreeMap<K, V> {
    const KIND: ShapeKind = ShapeKind::Collection;
}

/// `Option<T>` is classified by its payload.
impl<T: Shaped> Shaped for Option<T> {
    const KIND: ShapeKind = T::KIND;
}

impl<T: ?Sized> Shaped for Arc<T> {
    const KIND: ShapeKind = ShapeKind::Class;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_type_classification() {
        assert!(TypeShape::of::<f32>().is_value_type());
        assert!(TypeShape::of::<Option<u8>>().is_value_type());
        assert!(!TypeShape::of::<String>().is_value_type());
        assert!(TypeShape::of::<String>().is_string());
        assert!(!TypeShape::of::<Vec<u32>>().is_value_type());
        assert!(!TypeShape::of::<Arc<u32>>().is_value_type());
        assert!(TypeShape::with_kind::<fn()>(ShapeKind::Delegate).is_delegate());
    }
}
