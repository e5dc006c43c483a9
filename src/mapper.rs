//! Name-keyed registries consulted during evaluation: user variables and
//! host-registered functions.

use std::{collections::HashMap, fmt, rc::Rc};

use crate::{
    ast::Node,
    coercion::{TargetType, coerce_to_type},
    error::EvalError,
    value::Value,
};

/// What a variable name is bound to.
#[derive(Debug, Clone)]
pub enum ValueExpression {
    /// Mutable slot holding a value
    Variable(Value),
    /// Expression re-evaluated on every read
    Deferred(Rc<Node>),
}

/// Variable name to bound expression. Keys are unique.
#[derive(Debug, Default, Clone)]
pub struct VariableMapper {
    variables: HashMap<String, ValueExpression>,
}

impl VariableMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, name: &str) -> Option<&ValueExpression> {
        self.variables.get(name)
    }

    /// Binds `name`, returning the previous binding.
    pub fn bind(
        &mut self,
        name: impl Into<String>,
        expression: ValueExpression,
    ) -> Result<Option<ValueExpression>, EvalError> {
        let name = name.into();
        if name.is_empty() {
            return Err(EvalError::InvalidArgument(
                "variable name must not be empty".to_string(),
            ));
        }
        Ok(self.variables.insert(name, expression))
    }

    /// Binds `name` to a mutable slot holding `value`.
    pub fn set_variable(
        &mut self,
        name: impl Into<String>,
        value: Value,
    ) -> Result<Option<ValueExpression>, EvalError> {
        self.bind(name, ValueExpression::Variable(value))
    }

    /// Returns the binding for `name`, creating a slot holding `seed` first if
    /// there is none.
    pub fn resolve_or_bind(&mut self, name: &str, seed: Value) -> &ValueExpression {
        self.variables
            .entry(name.to_string())
            .or_insert(ValueExpression::Variable(seed))
    }

    pub fn unbind(&mut self, name: &str) -> Option<ValueExpression> {
        self.variables.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }
}

pub type Callable = Rc<dyn Fn(&[Value]) -> Result<Value, EvalError>>;

/// A callable registered under `namespace:local`.
///
/// Arguments are converted to the declared parameter types before the call;
/// missing trailing arguments are passed as the converted Null.
#[derive(Clone)]
pub struct Function {
    params: Vec<TargetType>,
    variadic: Option<TargetType>,
    callable: Callable,
}

impl Function {
    pub fn new<P, F>(params: P, callable: F) -> Self
    where
        P: IntoIterator<Item = TargetType>,
        F: Fn(&[Value]) -> Result<Value, EvalError> + 'static,
    {
        Function {
            params: params.into_iter().collect(),
            variadic: None,
            callable: Rc::new(callable),
        }
    }

    /// Accepts any number of extra arguments of type `ty`.
    pub fn variadic(mut self, ty: TargetType) -> Self {
        self.variadic = Some(ty);
        self
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic.is_some()
    }

    pub fn accepts(&self, count: usize) -> bool {
        count <= self.params.len() || self.variadic.is_some()
    }

    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        if !self.accepts(args.len()) {
            return Err(EvalError::TooManyParameters {
                function: name.to_string(),
                expected: self.params.len(),
                found: args.len(),
            });
        }

        let mut coerced = Vec::with_capacity(args.len().max(self.params.len()));
        for (i, param) in self.params.iter().enumerate() {
            coerced.push(coerce_to_type(args.get(i).unwrap_or(&Value::Null), param)?);
        }
        if let Some(rest) = &self.variadic {
            for arg in args.iter().skip(self.params.len()) {
                coerced.push(coerce_to_type(arg, rest)?);
            }
        }

        (self.callable)(&coerced)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("params", &self.params)
            .field("variadic", &self.variadic)
            .finish_non_exhaustive()
    }
}

/// `(namespace, local)` to [`Function`]. Read-mostly once populated.
#[derive(Debug, Default, Clone)]
pub struct FunctionMapper {
    functions: HashMap<String, Function>,
}

impl FunctionMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapper preloaded with the `fn:` string library.
    pub fn with_standard_functions() -> Self {
        let mut mapper = Self::new();
        for (local, function) in crate::functions::standard() {
            mapper
                .functions
                .insert(Self::key(crate::functions::NAMESPACE, local), function);
        }
        mapper
    }

    fn key(namespace: &str, local: &str) -> String {
        format!("{namespace}:{local}")
    }

    /// Registers `namespace:local`. A name can only be registered once.
    pub fn register(
        &mut self,
        namespace: &str,
        local: &str,
        function: Function,
    ) -> Result<(), EvalError> {
        let key = Self::key(namespace, local);
        if self.functions.contains_key(&key) {
            return Err(EvalError::Redeclaration(key));
        }
        self.functions.insert(key, function);
        Ok(())
    }

    pub fn resolve(&self, namespace: &str, local: &str) -> Option<&Function> {
        self.functions.get(&Self::key(namespace, local))
    }

    /// Resolves `ns:local`, or a bare `local` in the default namespace.
    pub fn resolve_qualified(&self, name: &str) -> Option<&Function> {
        match name.split_once(':') {
            Some((namespace, local)) => self.resolve(namespace, local),
            None => self.resolve("", name),
        }
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
