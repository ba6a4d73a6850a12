use std::rc::Rc;

use crate::{
    ast::{Expr, ExprId, LogicalOperator, Visibility},
    error::RuntimeError,
    interpreter::{
        environment::{BindingError, Environment},
        evaluator::core::{EvalResult, Interpreter},
        token::SourceLocation,
        value::{callable::Field, core::Value, native::NativeBinding},
    },
    util::num::{f64_to_index_checked, truncate_to_i64, usize_to_f64},
};

impl Interpreter<'_> {
    /// Evaluates an expression to a value.
    ///
    /// Operands are evaluated left to right. `&&`, `||`, `?:` and the
    /// ternary operator skip the operands they do not need.
    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal { value, .. } => Ok(Value::from(value)),
            Expr::ArrayLiteral { elements, .. } => {
                let elements = elements.iter()
                                       .map(|element| self.evaluate(element))
                                       .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::from(elements))
            },
            Expr::Variable { id, name, location } => self.lookup_variable(*id, name, *location),
            Expr::Assign { id,
                           name,
                           value,
                           location, } => {
                let value = self.evaluate(value)?;
                self.assign_variable(*id, name, value.clone(), *location)?;
                Ok(value)
            },
            Expr::Binary { left,
                           op,
                           right,
                           location, } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                Self::eval_binary(*op, &left, &right, *location)
            },
            Expr::Logical { left, op, right, .. } => {
                let left = self.evaluate(left)?.is_truthy();
                let result = match op {
                    LogicalOperator::And => left && self.evaluate(right)?.is_truthy(),
                    LogicalOperator::Or => left || self.evaluate(right)?.is_truthy(),
                };
                Ok(Value::Bool(result))
            },
            Expr::Bitwise { left,
                            op,
                            right,
                            location, } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                Self::eval_bitwise(*op, &left, &right, *location)
            },
            Expr::Unary { op, operand, location } => {
                let operand = self.evaluate(operand)?;
                Self::eval_unary(*op, &operand, *location)
            },
            Expr::PrefixCall { id,
                               name,
                               operand,
                               location, } => {
                let callee = self.lookup_variable(*id, name, *location)?;
                let operand = self.evaluate(operand)?;
                self.call_value(&callee, vec![operand], *location)
            },
            Expr::InfixCall { id,
                              name,
                              left,
                              right,
                              location, } => {
                let callee = self.lookup_variable(*id, name, *location)?;
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.call_value(&callee, vec![left, right], *location)
            },
            Expr::Ternary { condition,
                            then_branch,
                            else_branch,
                            .. } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            },
            Expr::Elvis { value, fallback, .. } => {
                let value = self.evaluate(value)?;
                if value.is_truthy() {
                    Ok(value)
                } else {
                    self.evaluate(fallback)
                }
            },
            Expr::Call { callee,
                         arguments,
                         location, } => {
                let callee = self.evaluate(callee)?;
                let arguments = arguments.iter()
                                         .map(|argument| self.evaluate(argument))
                                         .collect::<EvalResult<Vec<_>>>()?;
                self.call_value(&callee, arguments, *location)
            },
            Expr::Get { object, name, location } => {
                let object = self.evaluate(object)?;
                self.get_property(&object, name, *location)
            },
            Expr::Set { object,
                        name,
                        value,
                        location, } => {
                let object = self.evaluate(object)?;
                let value = self.evaluate(value)?;
                self.set_property(&object, name, value.clone(), *location)?;
                Ok(value)
            },
            Expr::ArrayGet { array, index, location } => {
                let array = self.evaluate(array)?;
                let index = self.evaluate(index)?;
                Self::index(&array, &index, *location)
            },
            Expr::ArraySet { array,
                             index,
                             value,
                             location, } => {
                let array = self.evaluate(array)?;
                let index = self.evaluate(index)?;
                let value = self.evaluate(value)?;
                Self::store_index(&array, &index, value.clone(), *location)?;
                Ok(value)
            },
            Expr::Grouping { expr, .. } => self.evaluate(expr),
            Expr::This { id, location } => self.lookup_variable(*id, "this", *location),
            Expr::Super { id, method, location } => self.evaluate_super(*id, method, *location),
        }
    }

    /// Reads a variable from the scope the resolver assigned it, or from the
    /// globals if it was not resolved to a local.
    pub(in crate::interpreter::evaluator) fn lookup_variable(&self,
                                                             id: ExprId,
                                                             name: &str,
                                                             location: SourceLocation)
                                                             -> EvalResult<Value> {
        let value = match self.resolutions.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        };
        value.ok_or_else(|| RuntimeError::UndefinedVariable { name: name.to_string(),
                                                              location })
    }

    fn assign_variable(&self,
                       id: ExprId,
                       name: &str,
                       value: Value,
                       location: SourceLocation)
                       -> EvalResult<()> {
        let result = match self.resolutions.get(&id) {
            Some(&distance) => Environment::assign_at(&self.environment, distance, name, value),
            None => self.globals.borrow_mut().assign(name, value),
        };
        result.map_err(|error| match error {
                  BindingError::Undefined => RuntimeError::UndefinedVariable { name: name.to_string(),
                                                                               location },
                  BindingError::Final => RuntimeError::FinalReassignment { name: name.to_string(),
                                                                           location },
              })
    }

    /// Reads `object.name`.
    ///
    /// Instances yield a field, or else a method bound to the instance.
    /// Modules yield a reference to one of their native functions. Arrays
    /// and strings expose `length`.
    pub(in crate::interpreter::evaluator) fn get_property(&self,
                                                          object: &Value,
                                                          name: &str,
                                                          location: SourceLocation)
                                                          -> EvalResult<Value> {
        match object {
            Value::Instance(instance) => {
                let instance = instance.borrow();
                if let Some(field) = instance.field(name) {
                    self.check_field_access(field, name, location)?;
                    return Ok(field.value.clone());
                }
                let method = instance.class.find_method(name);
                drop(instance);
                method.map(|method| Value::Function(Rc::new(method.bind(object.clone()))))
                      .ok_or_else(|| RuntimeError::UndefinedProperty { name: name.to_string(),
                                                                       location })
            },
            Value::Module(module) => {
                if !module.has_function(name) {
                    return Err(RuntimeError::UnknownNativeFunction { module: module.name()
                                                                                   .to_string(),
                                                                     name: name.to_string(),
                                                                     location });
                }
                Ok(Value::Native(Rc::new(NativeBinding { module: module.name().to_string(),
                                                         name:   name.to_string(),
                                                         arity:  None, })))
            },
            Value::Array(elements) if name == "length" => {
                Ok(Value::Number(usize_to_f64(elements.borrow().len())))
            },
            Value::Str(text) if name == "length" => {
                Ok(Value::Number(usize_to_f64(text.chars().count())))
            },
            other => Err(RuntimeError::PropertyOnNonObject { name: name.to_string(),
                                                             type_name: other.type_name(),
                                                             location }),
        }
    }

    /// Writes `object.name = value`. Unknown names become new public
    /// fields.
    fn set_property(&self,
                    object: &Value,
                    name: &str,
                    value: Value,
                    location: SourceLocation)
                    -> EvalResult<()> {
        let Value::Instance(instance) = object else {
            return Err(RuntimeError::PropertyOnNonObject { name: name.to_string(),
                                                           type_name: object.type_name(),
                                                           location });
        };
        let mut instance = instance.borrow_mut();
        let class_id = instance.class.id;
        match instance.field_mut(name) {
            Some(field) => {
                self.check_field_access(field, name, location)?;
                if field.is_final && field.assigned {
                    return Err(RuntimeError::FinalFieldReassignment { name: name.to_string(),
                                                                      location });
                }
                field.value = value;
                field.assigned = true;
            },
            None => instance.insert_field(name,
                                          Field { value,
                                                  visibility: Visibility::Public,
                                                  is_final: false,
                                                  assigned: true,
                                                  owner: class_id }),
        }
        Ok(())
    }

    fn check_field_access(&self,
                          field: &Field,
                          name: &str,
                          location: SourceLocation)
                          -> EvalResult<()> {
        if field.visibility == Visibility::Private && self.current_owner() != Some(field.owner) {
            return Err(RuntimeError::PrivateAccess { name: name.to_string(),
                                                     location });
        }
        Ok(())
    }

    /// `array[index]` and `string[index]`.
    fn index(target: &Value, index: &Value, location: SourceLocation) -> EvalResult<Value> {
        let position = Self::index_number(index, location)?;
        match target {
            Value::Array(elements) => {
                let elements = elements.borrow();
                let slot = Self::checked_index(position, elements.len(), location)?;
                Ok(elements[slot].clone())
            },
            Value::Str(text) => {
                let length = text.chars().count();
                let slot = Self::checked_index(position, length, location)?;
                text.chars()
                    .nth(slot)
                    .map(Value::Char)
                    .ok_or(RuntimeError::IndexOutOfBounds { index: truncate_to_i64(position),
                                                            length,
                                                            location })
            },
            other => Err(RuntimeError::type_mismatch(format!("cannot index {}", other.type_name()),
                                                     location)),
        }
    }

    fn store_index(target: &Value,
                   index: &Value,
                   value: Value,
                   location: SourceLocation)
                   -> EvalResult<()> {
        let position = Self::index_number(index, location)?;
        let Value::Array(elements) = target else {
            return Err(RuntimeError::type_mismatch(format!("cannot assign by index into {}",
                                                           target.type_name()),
                                                   location));
        };
        let mut elements = elements.borrow_mut();
        let slot = Self::checked_index(position, elements.len(), location)?;
        elements[slot] = value;
        Ok(())
    }

    fn index_number(index: &Value, location: SourceLocation) -> EvalResult<f64> {
        index.as_number().ok_or_else(|| {
                             RuntimeError::type_mismatch(format!("index must be a number, not {}",
                                                                 index.type_name()),
                                                         location)
                         })
    }

    fn checked_index(position: f64, length: usize, location: SourceLocation) -> EvalResult<usize> {
        f64_to_index_checked(position,
                             length,
                             RuntimeError::IndexOutOfBounds { index: truncate_to_i64(position),
                                                              length,
                                                              location })
    }
}
