use crate::{
    eval::{
        environment::{Env, Environment},
        value::{Function, Value},
    },
    parser::ast::{Block, Expr, Infix, Literal, Prefix, Program, Statement},
};
use std::{collections::BTreeMap, rc::Rc};
use tracing::{debug, trace};

pub mod builtins;
pub mod environment;
pub mod value;

/// A node that can be evaluated against an environment.
///
/// Evaluation is total: runtime failures come back as `Value::Error`. Errors
/// and `return` markers short-circuit every enclosing expression and statement
/// sequence until a call or the program unwraps them.
pub trait Evaluate {
    fn evaluate(&self, env: &Env) -> Value;
}

pub fn evaluate<N: Evaluate + ?Sized>(node: &N, env: &Env) -> Value {
    node.evaluate(env)
}

/// Keeps one root environment alive across programs, so bindings made by one
/// REPL line are visible to the next.
pub struct Evaluator {
    environment: Env,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            environment: Environment::root(),
        }
    }

    pub fn eval(&mut self, program: &Program) -> Value {
        program.evaluate(&self.environment)
    }

    pub fn environment(&self) -> &Env {
        &self.environment
    }
}

impl Evaluate for Program {
    fn evaluate(&self, env: &Env) -> Value {
        returned(eval_block(&self.statements, env))
    }
}

impl Evaluate for Block {
    fn evaluate(&self, env: &Env) -> Value {
        eval_block(&self.statements, env)
    }
}

impl Evaluate for Statement {
    fn evaluate(&self, env: &Env) -> Value {
        match self {
            Statement::Let(ident, expr) => {
                let val = expr.evaluate(env);
                if val.is_abrupt() {
                    return val;
                }

                env.borrow_mut().set(ident, val);

                Value::Null
            }
            Statement::Return(expr) => {
                let val = expr.evaluate(env);
                if val.is_abrupt() {
                    return val;
                }
                Value::Return(Box::new(val))
            }
            Statement::Expression(expr) => expr.evaluate(env),
        }
    }
}

impl Evaluate for Expr {
    fn evaluate(&self, env: &Env) -> Value {
        match self {
            Expr::Ident(ident) => eval_ident(ident, env),
            Expr::Literal(lit) => eval_literal(lit),
            Expr::Prefix(prefix_op, right) => {
                let right = right.evaluate(env);
                if right.is_abrupt() {
                    return right;
                }
                eval_prefix_expr(*prefix_op, right)
            }
            Expr::Infix(infix_op, left, right) => {
                let left = left.evaluate(env);
                if left.is_abrupt() {
                    return left;
                }
                let right = right.evaluate(env);
                if right.is_abrupt() {
                    return right;
                }
                eval_infix_expr(*infix_op, left, right)
            }
            Expr::If {
                condition,
                consequence,
                alternative,
            } => eval_if_expr(condition, consequence, alternative.as_ref(), env),
            Expr::Function { params, body } => Value::Fn(Rc::new(Function {
                params: params.clone(),
                body: body.clone(),
                env: env.clone(),
            })),
            Expr::Call {
                function,
                arguments,
            } => {
                let func_value = function.evaluate(env);
                if func_value.is_abrupt() {
                    return func_value;
                }
                match eval_expressions(arguments, env) {
                    Ok(args) => eval_func_application(func_value, args),
                    Err(error) => error,
                }
            }
            Expr::Vector(elements) => match eval_expressions(elements, env) {
                Ok(elements) => Value::vector(elements),
                Err(error) => error,
            },
            Expr::Dict(pairs) => eval_dict_literal(pairs, env),
            Expr::Index(left, index) => {
                let left = left.evaluate(env);
                if left.is_abrupt() {
                    return left;
                }
                let index = index.evaluate(env);
                if index.is_abrupt() {
                    return index;
                }
                eval_index_expr(left, index)
            }
        }
    }
}

pub(crate) fn runtime_error(message: String) -> Value {
    debug!(error = %message, "runtime error");
    Value::Error(message)
}

fn eval_block(statements: &[Statement], env: &Env) -> Value {
    let mut result = Value::Null;
    for statement in statements {
        result = statement.evaluate(env);
        if result.is_abrupt() {
            return result;
        }
    }
    result
}

fn returned(maybe_returned: Value) -> Value {
    match maybe_returned {
        Value::Return(value) => *value,
        _ => maybe_returned,
    }
}

fn eval_ident(ident: &str, env: &Env) -> Value {
    let bound = env.borrow().get(ident);
    match bound.or_else(|| builtins::lookup(ident)) {
        Some(value) => value,
        None => runtime_error(format!("identifier not found: {}", ident)),
    }
}

fn eval_literal(lit: &Literal) -> Value {
    match lit {
        Literal::Int(i) => Value::Int(*i),
        Literal::Str(s) => Value::str(s),
        Literal::Bool(b) => Value::Bool(*b),
    }
}

/// Evaluates left to right, stopping at the first error or `return`.
fn eval_expressions(exprs: &[Expr], env: &Env) -> Result<Vec<Value>, Value> {
    let mut values = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let value = expr.evaluate(env);
        if value.is_abrupt() {
            return Err(value);
        }
        values.push(value);
    }
    Ok(values)
}

fn eval_prefix_expr(prefix: Prefix, right: Value) -> Value {
    match prefix {
        Prefix::Bang => eval_bang_op_expression(right),
        Prefix::Minus => eval_minus_op_expression(right),
    }
}

fn eval_bang_op_expression(value: Value) -> Value {
    Value::Bool(!value.is_truthy())
}

fn eval_minus_op_expression(value: Value) -> Value {
    match value {
        Value::Int(i) => match i.checked_neg() {
            Some(negated) => Value::Int(negated),
            None => runtime_error(format!("integer overflow: -{}", i)),
        },
        _ => runtime_error(format!("unknown operator: -{}", value.type_name())),
    }
}

fn eval_infix_expr(operator: Infix, left: Value, right: Value) -> Value {
    match (&left, &right) {
        (Value::Int(l), Value::Int(r)) => eval_integer_infix_expr(operator, *l, *r),
        (Value::Str(l), Value::Str(r)) => eval_string_infix_expr(operator, l, r),
        _ => match operator {
            Infix::Equal => Value::Bool(left.is_identical(&right)),
            Infix::NotEqual => Value::Bool(!left.is_identical(&right)),
            _ if left.type_name() != right.type_name() => runtime_error(format!(
                "type mismatch: {} {} {}",
                left.type_name(),
                operator,
                right.type_name()
            )),
            _ => runtime_error(format!(
                "unknown operator: {} {} {}",
                left.type_name(),
                operator,
                right.type_name()
            )),
        },
    }
}

fn eval_integer_infix_expr(operator: Infix, left: i64, right: i64) -> Value {
    let checked = match operator {
        Infix::Plus => left.checked_add(right),
        Infix::Minus => left.checked_sub(right),
        Infix::Multiply => left.checked_mul(right),
        Infix::Divide if right == 0 => {
            return runtime_error(format!("division by zero: {} / 0", left))
        }
        Infix::Divide => left.checked_div(right),
        Infix::LessThan => return Value::Bool(left < right),
        Infix::GreaterThan => return Value::Bool(left > right),
        Infix::Equal => return Value::Bool(left == right),
        Infix::NotEqual => return Value::Bool(left != right),
    };

    match checked {
        Some(result) => Value::Int(result),
        None => runtime_error(format!(
            "integer overflow: {} {} {}",
            left, operator, right
        )),
    }
}

fn eval_string_infix_expr(operator: Infix, left: &str, right: &str) -> Value {
    match operator {
        Infix::Plus => Value::str(&[left, right].concat()),
        Infix::Equal => Value::Bool(left == right),
        Infix::NotEqual => Value::Bool(left != right),
        _ => runtime_error(format!("unknown operator: str {} str", operator)),
    }
}

fn eval_if_expr(
    condition: &Expr,
    consequence: &Block,
    alternative: Option<&Block>,
    env: &Env,
) -> Value {
    let condition = condition.evaluate(env);

    if condition.is_abrupt() {
        return condition;
    }

    if condition.is_truthy() {
        consequence.evaluate(env)
    } else if let Some(alternative) = alternative {
        alternative.evaluate(env)
    } else {
        Value::Null
    }
}

fn eval_func_application(function: Value, args: Vec<Value>) -> Value {
    let function = match function {
        Value::Fn(function) => function,
        Value::Builtin(builtin) => {
            trace!(name = builtin.name, args = args.len(), "calling builtin");
            return (builtin.func)(&args);
        }
        _ => return runtime_error(format!("not a function: {}", function.type_name())),
    };

    if function.params.len() != args.len() {
        return runtime_error(format!(
            "wrong number of arguments: want={}, got={}",
            function.params.len(),
            args.len()
        ));
    }

    trace!(params = function.params.len(), body = %function.body, "applying function");

    let execution_env = Environment::new_with_outer(function.env.clone());
    function.params.iter().zip(args).for_each(|(param, arg)| {
        execution_env.borrow_mut().set(param, arg);
    });

    returned(function.body.evaluate(&execution_env))
}

fn eval_dict_literal(pairs: &[(Expr, Expr)], env: &Env) -> Value {
    let mut dict = BTreeMap::new();
    for (key_expr, value_expr) in pairs {
        let key = key_expr.evaluate(env);
        if key.is_abrupt() {
            return key;
        }
        let dict_key = match key.dict_key() {
            Some(dict_key) => dict_key,
            None => return runtime_error(format!("unusable as dict key: {}", key.type_name())),
        };

        let value = value_expr.evaluate(env);
        if value.is_abrupt() {
            return value;
        }

        dict.insert(dict_key, value);
    }
    Value::Dict(Rc::new(dict))
}

fn eval_index_expr(left: Value, index: Value) -> Value {
    match (&left, &index) {
        (Value::Vector(elements), Value::Int(i)) => usize::try_from(*i)
            .ok()
            .and_then(|i| elements.get(i))
            .cloned()
            .unwrap_or(Value::Null),
        (Value::Dict(pairs), _) => match index.dict_key() {
            Some(key) => pairs.get(&key).cloned().unwrap_or(Value::Null),
            None => runtime_error(format!("unusable as dict key: {}", index.type_name())),
        },
        _ => runtime_error(format!(
            "index operator not supported: {}[{}]",
            left.type_name(),
            index.type_name()
        )),
    }
}
