use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Anything that can travel through a slot as an opaque reference.
pub trait ValueObject: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

impl<T> ValueObject for T
where
    T: Any + Send + Sync + fmt::Debug,
{
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A dynamically typed slot value.
///
/// Values are copied between slots on every read; references only copy the handle.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Empty,
    Float(f32),
    Int(i64),
    Bool(bool),
    Reference(Arc<dyn ValueObject>),
}

impl Value {
    pub fn reference<T>(value: T) -> Self
    where
        T: ValueObject,
    {
        Self::Reference(Arc::new(value))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Float(_) | Self::Int(_) | Self::Bool(_))
    }

    /// Reads the value as `T`, falling back to `T`'s zero value on mismatch.
    #[inline]
    pub fn coerce<T: FromValue>(&self) -> T {
        T::from_value(self)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Reference(obj) => ValueObject::as_any(&**obj).downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Reference(_) => "reference",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Reference(a), Self::Reference(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "<empty>"),
            Self::Float(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Reference(obj) => write!(f, "{:?}", obj),
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

/// Total conversion out of a [`Value`].
///
/// Implementations never fail: an empty cell or a representation that cannot be
/// read as `Self` produces the zero value of `Self`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Self;
}

/// Free-function form of [`Value::coerce`], handy as a `map` argument.
#[inline]
pub fn coerce<T: FromValue>(value: &Value) -> T {
    T::from_value(value)
}

macro_rules! impl_numeric_from_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl FromValue for $t {
                #[inline]
                fn from_value(value: &Value) -> Self {
                    match *value {
                        Value::Float(v) => v as $t,
                        Value::Int(v) => v as $t,
                        Value::Bool(v) => {
                            if v {
                                1 as $t
                            } else {
                                0 as $t
                            }
                        }
                        Value::Empty | Value::Reference(_) => 0 as $t,
                    }
                }
            }
        )*
    };
}

impl_numeric_from_value!(f32, f64, i32, i64, u32, usize);

impl FromValue for bool {
    fn from_value(value: &Value) -> Self {
        match *value {
            Value::Bool(v) => v,
            Value::Float(v) => v != 0.0,
            Value::Int(v) => v != 0,
            Value::Empty | Value::Reference(_) => false,
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Self {
        value.clone()
    }
}
