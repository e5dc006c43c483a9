use std::{any::Any, fmt, rc::Rc};

/// A dynamically-typed value produced and consumed by expression evaluation.
///
/// Values are immutable once produced; operations always build new values.
///
/// # Examples
///
/// ```
/// use elx_lang::{Kind, Value};
///
/// let null = Value::Null;
/// let boolean = Value::Boolean(true);
/// let integer = Value::Integer(42);
/// let double = Value::Double(3.5);
/// let string = Value::String("hello".to_string());
///
/// // Host objects travel opaquely
/// let json = Value::other(serde_json::json!({"a": 1}));
/// assert_eq!(json.kind(), Kind::Other);
/// assert!(json.downcast_ref::<serde_json::Value>().is_some());
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// Absence of a value. Never carries a payload.
    Null,

    Boolean(bool),

    /// 64-bit signed integer
    Integer(i64),

    /// Floating point number
    Double(f64),

    String(String),

    /// Constant of a host-declared enumeration
    Enum(EnumValue),

    /// Opaque host object (for example a JSON array handed out by a resolver)
    Other(Rc<dyn Object>),
}

/// Classification of a [`Value`] used by coercion and operator dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Integer,
    Double,
    String,
    Enum,
    Other,
}

/// Host object that can be carried inside [`Value::Other`].
///
/// Implemented automatically for every `'static` type that is `Debug`,
/// `Display` and `PartialEq`.
pub trait Object: Any + fmt::Debug + fmt::Display {
    fn as_any(&self) -> &dyn Any;

    /// Equality against another opaque object (false across types).
    fn equals(&self, other: &dyn Object) -> bool;

    fn type_name(&self) -> &'static str;
}

impl<T> Object for T
where
    T: Any + fmt::Debug + fmt::Display + PartialEq,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equals(&self, other: &dyn Object) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|o| self == o)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl Value {
    /// Wraps a host object.
    pub fn other<T: Object>(object: T) -> Self {
        Value::Other(Rc::new(object))
    }

    /// Classifies the value. Enum-like values classify by their own tag.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Boolean(_) => Kind::Boolean,
            Value::Integer(_) => Kind::Integer,
            Value::Double(_) => Kind::Double,
            Value::String(_) => Kind::String,
            Value::Enum(_) => Kind::Enum,
            Value::Other(_) => Kind::Other,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrows the host object if this is an `Other` of type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Other(object) => (**object).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Identity test: same enum constant, same host object, or both null.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Other(a), Value::Other(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            (Value::Enum(a), Value::Enum(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Other(a), Value::Other(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)) || (**a).equals(&**b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::coercion::coerce_to_string(self))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Double => "double",
            Kind::String => "string",
            Kind::Enum => "enum",
            Kind::Other => "object",
        };
        f.write_str(name)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<EnumValue> for Value {
    fn from(e: EnumValue) -> Self {
        Value::Enum(e)
    }
}

/// A host-declared enumeration: a name and its constants in ordinal order.
///
/// ```
/// use elx_lang::EnumType;
///
/// let color = EnumType::new("Color", ["RED", "GREEN", "BLUE"]);
/// let green = color.value_of("GREEN").unwrap();
/// assert_eq!(green.ordinal(), 1);
/// assert_eq!(green.name(), "GREEN");
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct EnumType {
    name: String,
    constants: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, constants: I) -> Rc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rc::new(EnumType {
            name: name.into(),
            constants: constants.into_iter().map(Into::into).collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constants(&self) -> &[String] {
        &self.constants
    }

    /// Looks a constant up by its exact name.
    pub fn value_of(self: &Rc<Self>, name: &str) -> Option<EnumValue> {
        self.constants
            .iter()
            .position(|c| c == name)
            .map(|ordinal| EnumValue {
                ty: Rc::clone(self),
                ordinal,
            })
    }

    pub fn constant(self: &Rc<Self>, ordinal: usize) -> Option<EnumValue> {
        (ordinal < self.constants.len()).then(|| EnumValue {
            ty: Rc::clone(self),
            ordinal,
        })
    }
}

/// One constant of an [`EnumType`].
#[derive(Debug, Clone)]
pub struct EnumValue {
    ty: Rc<EnumType>,
    ordinal: usize,
}

impl EnumValue {
    pub fn enum_type(&self) -> &Rc<EnumType> {
        &self.ty
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn name(&self) -> &str {
        self.ty.constants.get(self.ordinal).map_or("", String::as_str)
    }

    pub fn same_type(&self, other: &EnumValue) -> bool {
        Rc::ptr_eq(&self.ty, &other.ty) || self.ty == other.ty
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.same_type(other) && self.ordinal == other.ordinal
    }
}
