use crate::eval::{
    runtime_error,
    value::{Builtin, BuiltinFn, Value},
};

const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("len", len),
    ("first", first),
    ("last", last),
    ("rest", rest),
    ("push", push),
];

/// Resolves a builtin by name. Consulted only after the environment chain misses.
pub fn lookup(name: &str) -> Option<Value> {
    BUILTINS
        .iter()
        .find(|(builtin_name, _)| *builtin_name == name)
        .map(|&(name, func)| Value::Builtin(Builtin { name, func }))
}

fn check_arity(args: &[Value], want: usize) -> Result<(), Value> {
    if args.len() == want {
        Ok(())
    } else {
        Err(runtime_error(format!(
            "wrong number of arguments. expected={}, got={}",
            want,
            args.len()
        )))
    }
}

fn vector_arg<'a>(name: &str, arg: &'a Value) -> Result<&'a [Value], Value> {
    match arg {
        Value::Vector(elements) => Ok(elements),
        other => Err(runtime_error(format!(
            "argument to `{}` must be vector, got={}",
            name,
            other.type_name()
        ))),
    }
}

fn len(args: &[Value]) -> Value {
    if let Err(error) = check_arity(args, 1) {
        return error;
    }

    match &args[0] {
        Value::Str(s) => Value::Int(s.chars().count() as i64),
        Value::Vector(elements) => Value::Int(elements.len() as i64),
        Value::Dict(pairs) => Value::Int(pairs.len() as i64),
        other => runtime_error(format!(
            "argument to `len` not supported, got={}",
            other.type_name()
        )),
    }
}

fn first(args: &[Value]) -> Value {
    let elements = match check_arity(args, 1).and_then(|_| vector_arg("first", &args[0])) {
        Ok(elements) => elements,
        Err(error) => return error,
    };

    elements.first().cloned().unwrap_or(Value::Null)
}

fn last(args: &[Value]) -> Value {
    let elements = match check_arity(args, 1).and_then(|_| vector_arg("last", &args[0])) {
        Ok(elements) => elements,
        Err(error) => return error,
    };

    elements.last().cloned().unwrap_or(Value::Null)
}

fn rest(args: &[Value]) -> Value {
    let elements = match check_arity(args, 1).and_then(|_| vector_arg("rest", &args[0])) {
        Ok(elements) => elements,
        Err(error) => return error,
    };

    match elements.split_first() {
        Some((_, tail)) => Value::vector(tail.to_vec()),
        None => Value::Null,
    }
}

fn push(args: &[Value]) -> Value {
    let elements = match check_arity(args, 2).and_then(|_| vector_arg("push", &args[0])) {
        Ok(elements) => elements,
        Err(error) => return error,
    };

    let mut pushed = elements.to_vec();
    pushed.push(args[1].clone());
    Value::vector(pushed)
}
