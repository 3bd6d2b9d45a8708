use crate::decimal::Decimal;
use crate::error::{Error, ErrorKind};
use crate::variables::VariableStore;
use std::collections::HashMap;

lazy_static::lazy_static! {
    /// The built-in functions every calculator recognises.
    pub static ref BUILTINS: FunctionRegistry = FunctionRegistry::with_builtins();
}

/// What a function may observe or emit besides its arguments.
pub struct CallContext<'a> {
    pub vars: &'a VariableStore,
    /// Snapshots of the variable store requested by `vars()`, in call order.
    pub dumps: &'a mut Vec<VariableStore>,
}

/// A function callable from an expression as `name(arg, ...)`.
///
/// # Example
/// ```rust
/// use decicalc::functions::{Builtin, CallContext};
/// use decicalc::{Decimal, Error};
///
/// struct Double;
///
/// impl Builtin for Double {
///     fn name(&self) -> &str { "double" }
///     fn min_args(&self) -> usize { 1 }
///     fn max_args(&self) -> Option<usize> { Some(1) }
///
///     fn execute(&self, args: Vec<Decimal>, _ctx: &mut CallContext<'_>) -> Result<Decimal, Error> {
///         Ok(args[0].add(&args[0]))
///     }
/// }
/// ```
pub trait Builtin: Send + Sync {
    /// The name of the function (case-insensitive)
    fn name(&self) -> &str;

    fn min_args(&self) -> usize;

    /// Maximum number of arguments allowed (None = unlimited)
    fn max_args(&self) -> Option<usize>;

    /// Arguments have already been checked against `min_args`/`max_args`.
    fn execute(&self, args: Vec<Decimal>, ctx: &mut CallContext<'_>) -> Result<Decimal, Error>;
}

#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Box<dyn Builtin>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self { functions: HashMap::new() }
    }

    /// Registry holding ceil, floor, abs, max, min and vars.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: Vec<Box<dyn Builtin>> = vec![
            Box::new(Ceil),
            Box::new(Floor),
            Box::new(Abs),
            Box::new(Max),
            Box::new(Min),
            Box::new(Vars),
        ];
        for function in builtins {
            registry.insert(function);
        }
        registry
    }

    fn insert(&mut self, function: Box<dyn Builtin>) {
        self.functions.insert(function.name().to_lowercase(), function);
    }

    pub fn register(&mut self, function: Box<dyn Builtin>) -> Result<(), Error> {
        if function.name().is_empty() {
            return Err(Error::new(ErrorKind::Registration, "Function name cannot be empty"));
        }
        if function.min_args() > function.max_args().unwrap_or(usize::MAX) {
            return Err(Error::new(
                ErrorKind::Registration,
                format!("{}: min_args cannot be greater than max_args", function.name()),
            ));
        }
        self.insert(function);
        Ok(())
    }

    /// Get a function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&dyn Builtin> {
        self.functions.get(&name.to_lowercase()).map(|f| f.as_ref())
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_lowercase())
    }

    /// Registered names, sorted.
    pub fn list_functions(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Validate the argument count and run the function.
    pub fn execute(&self, name: &str, args: Vec<Decimal>, ctx: &mut CallContext<'_>) -> Result<Decimal, Error> {
        let function = self
            .get(name)
            .ok_or_else(|| Error::malformed(format!("Unknown function: {}", name)))?;

        let arg_count = args.len();
        if arg_count < function.min_args() {
            return Err(Error::new(
                ErrorKind::Arity,
                format!("{} expects at least {} argument(s), got {}", function.name(), function.min_args(), arg_count),
            ));
        }
        if let Some(max_args) = function.max_args() {
            if arg_count > max_args {
                return Err(Error::new(
                    ErrorKind::Arity,
                    format!("{} expects at most {} argument(s), got {}", function.name(), max_args, arg_count),
                ));
            }
        }

        let result = function.execute(args, ctx)?;
        log::debug!("{}(..) = {}", function.name(), result);
        Ok(result)
    }
}

/// Adds one to positive values; everything else is returned unchanged.
pub struct Ceil;

impl Builtin for Ceil {
    fn name(&self) -> &str { "ceil" }
    fn min_args(&self) -> usize { 1 }
    fn max_args(&self) -> Option<usize> { Some(1) }

    fn execute(&self, args: Vec<Decimal>, _ctx: &mut CallContext<'_>) -> Result<Decimal, Error> {
        let x = &args[0];
        Ok(if x.is_positive() { x.add(&Decimal::one()) } else { x.clone() })
    }
}

/// Subtracts one from negative values; everything else is returned unchanged.
pub struct Floor;

impl Builtin for Floor {
    fn name(&self) -> &str { "floor" }
    fn min_args(&self) -> usize { 1 }
    fn max_args(&self) -> Option<usize> { Some(1) }

    fn execute(&self, args: Vec<Decimal>, _ctx: &mut CallContext<'_>) -> Result<Decimal, Error> {
        let x = &args[0];
        Ok(if x.is_negative() { x.sub(&Decimal::one()) } else { x.clone() })
    }
}

pub struct Abs;

impl Builtin for Abs {
    fn name(&self) -> &str { "abs" }
    fn min_args(&self) -> usize { 1 }
    fn max_args(&self) -> Option<usize> { Some(1) }

    fn execute(&self, args: Vec<Decimal>, _ctx: &mut CallContext<'_>) -> Result<Decimal, Error> {
        Ok(args[0].abs())
    }
}

pub struct Max;

impl Builtin for Max {
    fn name(&self) -> &str { "max" }
    fn min_args(&self) -> usize { 1 }
    fn max_args(&self) -> Option<usize> { None }

    fn execute(&self, args: Vec<Decimal>, _ctx: &mut CallContext<'_>) -> Result<Decimal, Error> {
        args.into_iter()
            .max()
            .ok_or_else(|| Error::new(ErrorKind::Arity, "max expects at least 1 argument(s), got 0"))
    }
}

pub struct Min;

impl Builtin for Min {
    fn name(&self) -> &str { "min" }
    fn min_args(&self) -> usize { 1 }
    fn max_args(&self) -> Option<usize> { None }

    fn execute(&self, args: Vec<Decimal>, _ctx: &mut CallContext<'_>) -> Result<Decimal, Error> {
        args.into_iter()
            .min()
            .ok_or_else(|| Error::new(ErrorKind::Arity, "min expects at least 1 argument(s), got 0"))
    }
}

/// Reports every variable binding and evaluates to zero.
pub struct Vars;

impl Builtin for Vars {
    fn name(&self) -> &str { "vars" }
    fn min_args(&self) -> usize { 0 }
    fn max_args(&self) -> Option<usize> { Some(0) }

    fn execute(&self, _args: Vec<Decimal>, ctx: &mut CallContext<'_>) -> Result<Decimal, Error> {
        ctx.dumps.push(ctx.vars.clone());
        Ok(Decimal::zero())
    }
}
