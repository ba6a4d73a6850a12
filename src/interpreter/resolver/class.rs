use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    ast::{ClassDecl, ExprId, FunctionDecl, SuperclassRef, Visibility},
    error::{ResolveError, resolve_error::DeclarationKind},
    interpreter::{
        resolver::core::{
            ClassContext, Declared, FunctionContext, ResolveResult, Resolver, method_context,
        },
        token::SourceLocation,
    },
};

/// A field as declared in a class body.
#[derive(Debug, Clone, Copy)]
pub(in crate::interpreter::resolver) struct FieldInfo {
    pub visibility:  Visibility,
    pub is_final:    bool,
    pub initialized: bool,
}

/// What the resolver knows statically about a class declaration.
#[derive(Debug)]
pub(in crate::interpreter::resolver) struct ClassInfo {
    pub name:          String,
    pub is_final:      bool,
    pub superclass:    Option<Rc<Self>>,
    pub final_methods: FxHashSet<String>,
    pub fields:        FxHashMap<String, FieldInfo>,
}

impl ClassInfo {
    fn from_declaration(declaration: &ClassDecl, superclass: Option<Rc<Self>>) -> Self {
        let final_methods = declaration.methods
                                       .iter()
                                       .filter(|method| method.is_final)
                                       .map(|method| method.name.clone())
                                       .collect();
        let fields = declaration.fields
                                .iter()
                                .map(|field| {
                                    (field.name.clone(),
                                     FieldInfo { visibility:  field.visibility,
                                                 is_final:    field.is_final,
                                                 initialized: field.initializer.is_some(), })
                                })
                                .collect();
        Self { name: declaration.name.clone(),
               is_final: declaration.is_final,
               superclass,
               final_methods,
               fields }
    }

    /// Finds `name` in this class or an ancestor, returning the declaring
    /// class with the field.
    pub(in crate::interpreter::resolver) fn find_field(self: &Rc<Self>,
                                                       name: &str)
                                                       -> Option<(Rc<Self>, FieldInfo)> {
        if let Some(field) = self.fields.get(name) {
            return Some((Rc::clone(self), *field));
        }
        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_field(name))
    }

    fn has_final_method(&self, name: &str) -> bool {
        self.final_methods.contains(name)
        || self.superclass
               .as_ref()
               .is_some_and(|superclass| superclass.has_final_method(name))
    }
}

impl Resolver {
    pub(in crate::interpreter::resolver) fn resolve_class(&mut self,
                                                          declaration: &ClassDecl)
                                                          -> ResolveResult<()> {
        self.declare(&declaration.name,
                     Declared::new(DeclarationKind::Class, declaration.is_final),
                     declaration.location)?;
        self.define(&declaration.name);

        let superclass = match &declaration.superclass {
            Some(superclass) => self.resolve_superclass(declaration, superclass)?,
            None => None,
        };
        if let Some(superclass) = &superclass {
            for method in &declaration.methods {
                check_override(superclass, &declaration.name, method)?;
            }
        }

        let info = Rc::new(ClassInfo::from_declaration(declaration, superclass));
        if let Some(declared) = self.innermost_mut(&declaration.name) {
            declared.class = Some(Rc::clone(&info));
        }
        tracing::trace!(class = %declaration.name,
                        fields = info.fields.len(),
                        "resolving class body");

        let enclosing_class = self.class;
        let enclosing_current = self.current.replace(info);
        let has_superclass = declaration.superclass.is_some();
        self.class = if has_superclass {
            ClassContext::Subclass
        } else {
            ClassContext::Class
        };

        // Field initialisers run when an instance is created.
        self.function_depth += 1;
        if has_superclass {
            self.begin_scope();
            self.declare_implicit("super");
        }
        self.begin_scope();
        self.declare_implicit("this");

        let result = self.resolve_class_body(declaration);

        self.end_scope();
        if has_superclass {
            self.end_scope();
        }
        self.function_depth -= 1;
        self.class = enclosing_class;
        self.current = enclosing_current;
        result
    }

    fn resolve_superclass(&mut self,
                          declaration: &ClassDecl,
                          superclass: &SuperclassRef)
                          -> ResolveResult<Option<Rc<ClassInfo>>> {
        if superclass.name == declaration.name {
            return Err(ResolveError::SelfInheritance { class:    declaration.name.clone(),
                                                       location: superclass.location, });
        }
        self.check_declared_before_use(&superclass.name, superclass.location)?;
        self.resolve_local(superclass.id, &superclass.name);

        let info = self.lookup(&superclass.name)
                       .and_then(|(_, declared)| declared.class.clone());
        if let Some(info) = &info
           && info.is_final
        {
            return Err(ResolveError::FinalInheritance { class:      declaration.name.clone(),
                                                        superclass: superclass.name.clone(),
                                                        location:   superclass.location, });
        }
        Ok(info)
    }

    fn resolve_class_body(&mut self, declaration: &ClassDecl) -> ResolveResult<()> {
        for field in &declaration.fields {
            if let Some(initializer) = &field.initializer {
                self.resolve_expr(initializer)?;
            }
        }
        for method in &declaration.methods {
            self.resolve_function(method, method_context(method))?;
        }
        Ok(())
    }

    /// Resolves `fun ClassName.method(...) { ... }`. The method body sees
    /// `this` but not `super`, and is not part of the class for private
    /// field access.
    pub(in crate::interpreter::resolver) fn resolve_extension(&mut self,
                                                              id: ExprId,
                                                              class_name: &str,
                                                              function: &FunctionDecl,
                                                              location: SourceLocation)
                                                              -> ResolveResult<()> {
        self.check_declared_before_use(class_name, location)?;
        self.resolve_local(id, class_name);

        let info = self.lookup(class_name)
                       .and_then(|(_, declared)| declared.class.clone());
        if let Some(info) = &info {
            if info.is_final {
                return Err(ResolveError::FinalExtension { class: class_name.to_string(),
                                                          location });
            }
            check_override(info, class_name, function)?;
        }

        let enclosing_class = self.class;
        let enclosing_current = self.current.take();
        self.class = ClassContext::Class;

        self.begin_scope();
        self.declare_implicit("this");
        let result = self.resolve_function(function, FunctionContext::Method);
        self.end_scope();

        self.class = enclosing_class;
        self.current = enclosing_current;
        result
    }

    fn declare_implicit(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            let mut declared = Declared::new(DeclarationKind::Variable, true);
            declared.defined = true;
            scope.insert(name.to_string(), declared);
        }
    }
}

fn check_override(superclass: &ClassInfo, class: &str, method: &FunctionDecl) -> ResolveResult<()> {
    if superclass.has_final_method(&method.name) {
        return Err(ResolveError::FinalOverride { class:    class.to_string(),
                                                 method:   method.name.clone(),
                                                 location: method.location, });
    }
    Ok(())
}
