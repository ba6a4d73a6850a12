use std::rc::Rc;

use crate::{
    ast::{Expr, Visibility},
    error::ResolveError,
    interpreter::{
        resolver::{
            class::ClassInfo,
            core::{ClassContext, ResolveResult, Resolver},
        },
        token::SourceLocation,
    },
};

impl Resolver {
    pub(in crate::interpreter::resolver) fn resolve_expr(&mut self, expr: &Expr) -> ResolveResult<()> {
        match expr {
            Expr::Literal { .. } => Ok(()),
            Expr::ArrayLiteral { elements, .. } => {
                elements.iter()
                        .try_for_each(|element| self.resolve_expr(element))
            },
            Expr::Variable { id, name, location } => {
                if self.scopes.len() > 1
                   && let Some(scope) = self.scopes.last()
                   && scope.get(name).is_some_and(|declared| !declared.defined)
                {
                    return Err(ResolveError::ReadInOwnInitializer { name:     name.clone(),
                                                                    location: *location, });
                }
                self.check_declared_before_use(name, *location)?;
                self.resolve_local(*id, name);
                Ok(())
            },
            Expr::Assign { id,
                           name,
                           value,
                           location, } => {
                self.resolve_expr(value)?;
                self.check_declared_before_use(name, *location)?;
                let final_kind = match self.lookup(name) {
                    Some((_, declared)) if declared.is_final => Some(declared.kind),
                    Some((Some(_), _)) => None,
                    _ => self.later_final_global(name).map(|hoisted| hoisted.kind),
                };
                if let Some(kind) = final_kind {
                    return Err(ResolveError::FinalReassignment { kind,
                                                                 name: name.clone(),
                                                                 location: *location });
                }
                self.resolve_local(*id, name);
                // Whatever the variable held before, its class is no longer
                // statically known.
                if let Some(declared) = self.lookup_mut(name) {
                    declared.instance_of = None;
                }
                Ok(())
            },
            Expr::Binary { left, right, .. }
            | Expr::Logical { left, right, .. }
            | Expr::Bitwise { left, right, .. }
            | Expr::Elvis { value: left,
                            fallback: right,
                            .. }
            | Expr::ArrayGet { array: left,
                               index: right,
                               .. } => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)
            },
            Expr::Unary { operand, .. } | Expr::Grouping { expr: operand, .. } => {
                self.resolve_expr(operand)
            },
            Expr::PrefixCall { id, name, operand, .. } => {
                self.resolve_local(*id, name);
                self.resolve_expr(operand)
            },
            Expr::InfixCall { id,
                              name,
                              left,
                              right,
                              .. } => {
                self.resolve_local(*id, name);
                self.resolve_expr(left)?;
                self.resolve_expr(right)
            },
            Expr::Ternary { condition,
                            then_branch,
                            else_branch,
                            .. } => {
                self.resolve_expr(condition)?;
                self.resolve_expr(then_branch)?;
                self.resolve_expr(else_branch)
            },
            Expr::Call { callee, arguments, .. } => {
                self.resolve_expr(callee)?;
                arguments.iter()
                         .try_for_each(|argument| self.resolve_expr(argument))
            },
            Expr::Get { object, name, location } => {
                self.resolve_expr(object)?;
                self.check_field_access(object, name, *location, false)
            },
            Expr::Set { object,
                        name,
                        value,
                        location, } => {
                self.resolve_expr(value)?;
                self.resolve_expr(object)?;
                self.check_field_access(object, name, *location, true)
            },
            Expr::ArraySet { array, index, value, .. } => {
                self.resolve_expr(array)?;
                self.resolve_expr(index)?;
                self.resolve_expr(value)
            },
            Expr::This { id, location } => {
                if self.class == ClassContext::None {
                    return Err(ResolveError::ThisOutsideClass { location: *location });
                }
                self.resolve_local(*id, "this");
                Ok(())
            },
            Expr::Super { id, location, .. } => {
                if self.class != ClassContext::Subclass {
                    return Err(ResolveError::SuperOutsideSubclass { location: *location });
                }
                self.resolve_local(*id, "super");
                Ok(())
            },
        }
    }

    /// The class of the instance `expr` produces, when it is a direct call
    /// of a statically known class.
    pub(in crate::interpreter::resolver) fn constructed_class(&self,
                                                              expr: &Expr)
                                                              -> Option<Rc<ClassInfo>> {
        let Expr::Call { callee, .. } = expr else {
            return None;
        };
        let Expr::Variable { name, .. } = callee.as_ref() else {
            return None;
        };
        self.lookup(name)
            .and_then(|(_, declared)| declared.class.clone())
    }

    /// Checks `object.name` against the field declarations of the object's
    /// class, when that class is known: `this` inside a class body, or a
    /// variable initialised by a constructor call.
    fn check_field_access(&self,
                          object: &Expr,
                          name: &str,
                          location: SourceLocation,
                          is_assignment: bool)
                          -> ResolveResult<()> {
        let class = match object {
            Expr::This { .. } => self.current.clone(),
            Expr::Variable { name, .. } => {
                self.lookup(name)
                    .and_then(|(_, declared)| declared.instance_of.clone())
            },
            _ => None,
        };
        let Some((owner, field)) = class.and_then(|class| class.find_field(name)) else {
            return Ok(());
        };

        let inside_owner = self.current
                               .as_ref()
                               .is_some_and(|current| Rc::ptr_eq(current, &owner));
        if field.visibility == Visibility::Private && !inside_owner {
            return Err(ResolveError::PrivateAccess { class: owner.name.clone(),
                                                     name: name.to_string(),
                                                     location });
        }
        if is_assignment && field.is_final && field.initialized {
            return Err(ResolveError::FinalFieldReassignment { name: name.to_string(),
                                                              location });
        }
        Ok(())
    }
}
