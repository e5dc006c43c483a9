use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    rc::Rc,
};

use crate::{
    error::EvalError,
    mapper::{FunctionMapper, VariableMapper},
    resolver::{EmptyResolver, Resolver},
};

/// Per-session evaluation state.
///
/// Built by the host for one logical request or session and handed to every
/// evaluation in it. Not synchronized; do not share across threads.
///
/// ```
/// use elx_lang::{EvalContext, ExpressionCache};
/// use std::cell::RefCell;
///
/// let mut ctx = EvalContext::default();
/// ctx.put_context(RefCell::new(ExpressionCache::new()));
///
/// let cache = ctx.get_context::<RefCell<ExpressionCache>>().unwrap();
/// assert!(cache.borrow().is_empty());
/// ```
pub struct EvalContext {
    resolver: Rc<dyn Resolver>,
    variables: VariableMapper,
    functions: Rc<FunctionMapper>,
    property_resolved: bool,
    auto_bind_unknown: bool,
    objects: HashMap<TypeId, Rc<dyn Any>>,
}

impl Default for EvalContext {
    fn default() -> Self {
        EvalContext::new(EmptyResolver)
    }
}

impl EvalContext {
    pub fn new(resolver: impl Resolver + 'static) -> Self {
        Self::with_shared_resolver(Rc::new(resolver))
    }

    pub fn with_shared_resolver(resolver: Rc<dyn Resolver>) -> Self {
        EvalContext {
            resolver,
            variables: VariableMapper::new(),
            functions: Rc::new(FunctionMapper::new()),
            property_resolved: false,
            auto_bind_unknown: true,
            objects: HashMap::new(),
        }
    }

    pub fn with_functions(mut self, functions: FunctionMapper) -> Self {
        self.functions = Rc::new(functions);
        self
    }

    pub fn with_shared_functions(mut self, functions: Rc<FunctionMapper>) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_variables(mut self, variables: VariableMapper) -> Self {
        self.variables = variables;
        self
    }

    pub fn resolver(&self) -> Rc<dyn Resolver> {
        Rc::clone(&self.resolver)
    }

    pub fn variables(&self) -> &VariableMapper {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut VariableMapper {
        &mut self.variables
    }

    pub fn functions(&self) -> Rc<FunctionMapper> {
        Rc::clone(&self.functions)
    }

    /// Set by resolvers when they handled the last request.
    pub fn is_property_resolved(&self) -> bool {
        self.property_resolved
    }

    pub fn set_property_resolved(&mut self, resolved: bool) {
        self.property_resolved = resolved;
    }

    /// Whether reading an unknown identifier binds an empty variable for it.
    pub fn auto_bind_unknown(&self) -> bool {
        self.auto_bind_unknown
    }

    pub fn set_auto_bind_unknown(&mut self, enabled: bool) {
        self.auto_bind_unknown = enabled;
    }

    /// Registers an ambient object under its type, returning the previous one.
    pub fn put_context<T: Any>(&mut self, object: T) -> Option<Rc<dyn Any>> {
        self.put_shared_context(Rc::new(object))
    }

    pub fn put_shared_context<T: Any>(&mut self, object: Rc<T>) -> Option<Rc<dyn Any>> {
        self.objects.insert(TypeId::of::<T>(), object)
    }

    pub fn get_context<T: Any>(&self) -> Result<Rc<T>, EvalError> {
        self.objects
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|object| object.downcast::<T>().ok())
            .ok_or(EvalError::UnresolvedContext(type_name::<T>()))
    }

    pub fn has_context<T: Any>(&self) -> bool {
        self.objects.contains_key(&TypeId::of::<T>())
    }

    pub fn remove_context<T: Any>(&mut self) -> Option<Rc<dyn Any>> {
        self.objects.remove(&TypeId::of::<T>())
    }
}

impl fmt::Debug for EvalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalContext")
            .field("variables", &self.variables)
            .field("functions", &self.functions.len())
            .field("property_resolved", &self.property_resolved)
            .field("auto_bind_unknown", &self.auto_bind_unknown)
            .field("objects", &self.objects.len())
            .finish_non_exhaustive()
    }
}
