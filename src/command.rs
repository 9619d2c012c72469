use crate::coerce::{self, Rejection};
use crate::error::{CoercionError, DispatchError};
use crate::value::{FromValue, TypeTag, Value};
use anyhow::{Result, anyhow};

/// One declared parameter of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    declared_type: TypeTag,
    optional: bool,
    default: Option<Value>,
}

impl Parameter {
    /// A parameter every invocation must supply.
    pub fn required(name: impl Into<String>, declared_type: TypeTag) -> Self {
        Self {
            name: name.into(),
            declared_type,
            optional: false,
            default: None,
        }
    }

    /// An optional parameter that is left absent when omitted.
    pub fn optional(name: impl Into<String>, declared_type: TypeTag) -> Self {
        Self {
            name: name.into(),
            declared_type,
            optional: true,
            default: None,
        }
    }

    /// An optional parameter bound to `default` when omitted. The declared type
    /// is the default's type.
    pub fn with_default(name: impl Into<String>, default: impl Into<Value>) -> Self {
        let default = default.into();
        Self {
            name: name.into(),
            declared_type: default.type_tag(),
            optional: true,
            default: Some(default),
        }
    }

    /// Bind `value` when the parameter is omitted. Makes the parameter optional
    /// and keeps its declared type; registration rejects a default of another type.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.optional = true;
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> TypeTag {
        self.declared_type
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Coerce a raw argument for this parameter.
    pub fn coerce(&self, raw: &str) -> Result<Value, DispatchError> {
        coerce::coerce(self.declared_type, raw).map_err(|rejection| match rejection {
            Rejection::Malformed => DispatchError::Coercion(CoercionError {
                parameter: self.name.clone(),
                declared_type: self.declared_type,
                raw_value: raw.to_string(),
            }),
            Rejection::Unsupported => DispatchError::UnsupportedType {
                parameter: self.name.clone(),
                declared_type: self.declared_type,
            },
        })
    }
}

/// Name and ordered parameter list of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    name: String,
    parameters: Vec<Parameter>,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter.
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn required_count(&self) -> usize {
        self.parameters.iter().filter(|p| !p.optional).count()
    }

    pub fn optional_count(&self) -> usize {
        self.parameters.iter().filter(|p| p.optional).count()
    }
}

/// Parameter values bound for one invocation, in declaration order.
///
/// Every required slot holds a value. Optional slots hold the coerced argument,
/// the parameter's default, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    names: Vec<String>,
    values: Vec<Option<Value>>,
}

impl Arguments {
    pub(crate) fn new(parameters: &[Parameter], values: Vec<Option<Value>>) -> Self {
        Self {
            names: parameters.iter().map(|p| p.name.clone()).collect(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw bound value at `index`, if any.
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Typed value at `index`; fails if the slot is empty or holds another type.
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T> {
        self.get_opt(index)?
            .ok_or_else(|| anyhow!("argument '{}' has no value", self.name(index)))
    }

    /// Typed value at `index`, or `None` if the slot is empty.
    pub fn get_opt<T: FromValue>(&self, index: usize) -> Result<Option<T>> {
        match self.value(index) {
            None => Ok(None),
            Some(value) => T::from_value(value).map(Some).ok_or_else(|| {
                anyhow!(
                    "argument '{}' holds a {}, not the requested type",
                    self.name(index),
                    value.type_tag()
                )
            }),
        }
    }

    fn name(&self, index: usize) -> &str {
        self.names.get(index).map(String::as_str).unwrap_or("?")
    }
}

/// A named operation the console can dispatch to.
///
/// The signature is read once, when the operation is registered. `invoke`
/// receives one slot per declared parameter and returns the text to print.
/// An `Err` is reported to the user as the operation's own failure message.
pub trait Operation: Send + Sync {
    fn signature(&self) -> Signature;

    fn invoke(&self, args: &Arguments) -> Result<String>;
}

/// Operation backed by a closure, for libraries that don't warrant a type per command.
pub struct FnOperation<F> {
    signature: Signature,
    handler: F,
}

impl<F> FnOperation<F>
where
    F: Fn(&Arguments) -> Result<String> + Send + Sync,
{
    pub fn new(signature: Signature, handler: F) -> Self {
        Self { signature, handler }
    }
}

impl<F> Operation for FnOperation<F>
where
    F: Fn(&Arguments) -> Result<String> + Send + Sync,
{
    fn signature(&self) -> Signature {
        self.signature.clone()
    }

    fn invoke(&self, args: &Arguments) -> Result<String> {
        (self.handler)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Signature {
        Signature::new("f")
            .param(Parameter::required("a", TypeTag::Int32))
            .param(Parameter::with_default("b", 10i32))
            .param(Parameter::optional("c", TypeTag::String))
    }

    #[test]
    fn test_signature_counts() {
        let sig = sample();
        assert_eq!(sig.required_count(), 1);
        assert_eq!(sig.optional_count(), 2);
        assert_eq!(sig.parameters()[1].declared_type(), TypeTag::Int32);
        assert_eq!(sig.parameters()[1].default_value(), Some(&Value::Int32(10)));
        assert_eq!(sig.parameters()[2].default_value(), None);
    }

    #[test]
    fn test_explicit_default_keeps_declared_type() {
        let p = Parameter::required("ratio", TypeTag::Double).default(0.5f64);
        assert!(p.is_optional());
        assert_eq!(p.declared_type(), TypeTag::Double);
        assert_eq!(p.default_value(), Some(&Value::Double(0.5)));

        let mismatched = Parameter::optional("n", TypeTag::Int32).default("ten");
        assert_eq!(mismatched.declared_type(), TypeTag::Int32);
        assert_eq!(mismatched.default_value().map(Value::type_tag), Some(TypeTag::String));
    }

    #[test]
    fn test_parameter_coerce_reports_name() {
        let p = Parameter::required("count", TypeTag::UInt16);
        assert_eq!(p.coerce("7").unwrap(), Value::UInt16(7));
        match p.coerce("-7") {
            Err(DispatchError::Coercion(e)) => {
                assert_eq!(e.parameter, "count");
                assert_eq!(e.raw_value, "-7");
                assert_eq!(e.declared_type, TypeTag::UInt16);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parameter_coerce_unsupported() {
        let p = Parameter::required("blob", TypeTag::Object);
        assert!(matches!(
            p.coerce("x"),
            Err(DispatchError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_arguments_typed_access() {
        let sig = sample();
        let args = Arguments::new(
            sig.parameters(),
            vec![Some(Value::Int32(5)), Some(Value::Int32(10)), None],
        );
        assert_eq!(args.len(), 3);
        assert_eq!(args.get::<i32>(0).unwrap(), 5);
        assert_eq!(args.get_opt::<String>(2).unwrap(), None);
        assert!(args.get::<String>(2).is_err());
        let err = args.get::<String>(0).unwrap_err();
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_fn_operation_invokes_closure() {
        let op = FnOperation::new(sample(), |args: &Arguments| {
            Ok(format!("{}", args.get::<i32>(0)? + args.get::<i32>(1)?))
        });
        let args = Arguments::new(
            op.signature().parameters(),
            vec![Some(Value::Int32(1)), Some(Value::Int32(2)), None],
        );
        assert_eq!(op.invoke(&args).unwrap(), "3");
        assert_eq!(op.signature().name(), "f");
    }
}
