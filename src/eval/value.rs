use crate::{
    eval::environment::Env,
    parser::ast::{Block, Ident},
};
use std::{
    collections::BTreeMap,
    fmt::{self, Debug, Display},
    rc::Rc,
};

pub type BuiltinFn = fn(&[Value]) -> Value;

#[derive(Clone)]
pub enum Value {
    Int(i64),
    Str(Rc<str>),
    Bool(bool),
    Null,
    /// Wraps the operand of a `return` until the enclosing call or program unwraps it.
    Return(Box<Value>),
    Fn(Rc<Function>),
    Vector(Rc<Vec<Value>>),
    Dict(Rc<BTreeMap<DictKey, Value>>),
    Builtin(Builtin),
    Error(String),
}

/// A function literal closed over the environment it was evaluated in.
pub struct Function {
    pub params: Vec<Ident>,
    pub body: Block,
    pub env: Env,
}

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

/// Dictionary key: the variant tag plus the value, so `4` and `"4"` never collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DictKey {
    Int(i64),
    Str(Rc<str>),
    Bool(bool),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Return(_) => "return",
            Value::Fn(_) => "fn",
            Value::Vector(_) => "vector",
            Value::Dict(_) => "dict",
            Value::Builtin(_) => "builtin",
            Value::Error(_) => "error",
        }
    }

    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn vector(elements: Vec<Value>) -> Self {
        Value::Vector(Rc::new(elements))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// `Error` and `Return` both unwind to the nearest call or program boundary.
    pub fn is_abrupt(&self) -> bool {
        self.is_error() || matches!(self, Value::Return(_))
    }

    /// `null` and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn dict_key(&self) -> Option<DictKey> {
        match self {
            Value::Int(i) => Some(DictKey::Int(*i)),
            Value::Str(s) => Some(DictKey::Str(s.clone())),
            Value::Bool(b) => Some(DictKey::Bool(*b)),
            _ => None,
        }
    }

    /// Identity comparison backing `==` for operands that are not both ints or both strings.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Fn(a), Value::Fn(b)) => Rc::ptr_eq(a, b),
            (Value::Vector(a), Value::Vector(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl Display for DictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictKey::Int(i) => write!(f, "{}", i),
            DictKey::Str(s) => write!(f, "{}", s),
            DictKey::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(int) => write!(f, "{}", int),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::Return(value) => write!(f, "{}", value),
            Value::Fn(function) => {
                if function.body.statements.is_empty() {
                    write!(f, "fn({}) {{}}", function.params.join(", "))
                } else {
                    write!(f, "fn({}) {{ {} }}", function.params.join(", "), function.body)
                }
            }
            Value::Vector(elements) => write!(
                f,
                "[{}]",
                elements
                    .iter()
                    .map(|value| value.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            Value::Dict(pairs) => write!(
                f,
                "{{{}}}",
                pairs
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            Value::Builtin(builtin) => write!(f, "builtin function: {}", builtin.name),
            Value::Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(int) => write!(f, "Value::Int({})", int),
            Value::Str(s) => write!(f, "Value::Str({:?})", s),
            Value::Bool(b) => write!(f, "Value::Bool({})", b),
            Value::Null => write!(f, "Value::Null"),
            Value::Return(value) => write!(f, "Value::Return({:?})", value),
            // the captured environment may contain this very function
            Value::Fn(_) => write!(f, "Value::Fn({})", self),
            Value::Vector(elements) => write!(f, "Value::Vector({:?})", elements),
            Value::Dict(pairs) => write!(f, "Value::Dict({:?})", pairs),
            Value::Builtin(builtin) => write!(f, "Value::Builtin({})", builtin.name),
            Value::Error(message) => write!(f, "Value::Error({:?})", message),
        }
    }
}

/// Structural equality for hosts and tests; functions compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Return(a), Value::Return(b)) => a == b,
            (Value::Fn(a), Value::Fn(b)) => Rc::ptr_eq(a, b),
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}
