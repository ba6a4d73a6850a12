use hsl::{
    error::{ResolveError, ScriptError, resolve_error::DeclarationKind},
    interpreter::{script::Script, token::SourceLocation, value::core::Value},
};

/// Resolves `src` and returns the error together with its rendered
/// diagnostics.
fn resolve_failure(src: &str) -> (ResolveError, Vec<String>) {
    let mut script = Script::new(src);
    match script.resolve() {
        Ok(()) => panic!("Resolution succeeded but was expected to fail:\n{src}"),
        Err(ScriptError::Resolve(error)) => (error, script.context().diagnostics().to_vec()),
        Err(other) => panic!("Expected a resolution error, got {other:?}"),
    }
}

fn assert_resolves(src: &str) {
    if let Err(e) = Script::new(src).resolve() {
        panic!("Resolution failed: {e:?}\n{src}");
    }
}

#[test]
fn final_variable_reassignment_points_at_the_assignment() {
    let (error, diagnostics) = resolve_failure("final var x = 1;\nx = 2;");
    assert_eq!(error,
               ResolveError::FinalReassignment { kind:     DeclarationKind::Variable,
                                                 name:     "x".to_string(),
                                                 location: SourceLocation::new(2, 1), });
    assert_eq!(diagnostics,
               ["Resolving error at 2:1: Cannot reassign final variable 'x'\nx = 2;\n^"]);
}

#[test]
fn final_variable_without_initializer_is_still_final() {
    let (_, diagnostics) = resolve_failure("final var x;\n{\n    x = 2;\n}");
    assert_eq!(diagnostics,
               ["Resolving error at 3:5: Cannot reassign final variable 'x'\n    x = 2;\n    ^"]);
}

#[test]
fn final_functions_and_classes_cannot_be_reassigned() {
    let (error, _) = resolve_failure("final fun f() {}\nf = 1;");
    assert!(matches!(error,
                     ResolveError::FinalReassignment { kind: DeclarationKind::Function,
                                                       .. }));

    let (_, diagnostics) = resolve_failure("final class A {}\nfun g() { A = nil; }");
    assert_eq!(diagnostics,
               ["Resolving error at 2:11: Cannot reassign final class 'A'\nfun g() { A = nil; }\n          ^"]);
}

#[test]
fn finals_cannot_be_redeclared_in_the_same_scope() {
    let (error, _) = resolve_failure("final var x = 1;\nvar x = 2;");
    assert!(matches!(error,
                     ResolveError::FinalRedeclaration { kind: DeclarationKind::Variable,
                                                        ref name,
                                                        .. } if name == "x"));

    let (error, _) = resolve_failure("final class A {}\nfun A() {}");
    assert!(matches!(error,
                     ResolveError::FinalRedeclaration { kind: DeclarationKind::Class,
                                                        .. }));
}

#[test]
fn shadowing_a_final_in_an_inner_scope_is_allowed() {
    assert_resolves("final var x = 1; { var x = 2; x = 3; }");
    assert_resolves("final var x = 1; fun f(x) { x = 2; return x; }");
    assert_resolves("var y = 1; y = 2; var y = 3;");
}

#[test]
fn final_classes_cannot_be_extended() {
    let (_, diagnostics) = resolve_failure("final class Base {}\nclass Derived extends Base {}");
    assert_eq!(diagnostics,
               ["Resolving error at 2:23: Class 'Derived' cannot extend final class 'Base'\n\
                 class Derived extends Base {}\n                      ^"]);
}

#[test]
fn final_methods_cannot_be_overridden() {
    let (error, _) = resolve_failure("class A { final fun id() { return 1; } }
                                      class B extends A {}
                                      class C extends B { fun id() { return 2; } }");
    assert!(matches!(error,
                     ResolveError::FinalOverride { ref class, ref method, .. }
                     if class == "C" && method == "id"));

    let (error, _) = resolve_failure("class A { final fun id() { return 1; } }
                                      fun A.id() { return 2; }");
    assert!(matches!(error, ResolveError::FinalOverride { .. }));
}

#[test]
fn final_extension_reports_the_class() {
    let (_, diagnostics) = resolve_failure("final class Sealed {}\nfun Sealed.open() {}");
    assert_eq!(diagnostics,
               ["Resolving error at 2:1: Cannot add extension methods to final class 'Sealed'\n\
                 fun Sealed.open() {}\n^"]);
}

#[test]
fn private_fields_are_checked_when_the_class_is_known() {
    let (_, diagnostics) = resolve_failure("class Vault { private var code = 1234; }\n\
                                            var v = Vault();\nprint v.code;");
    assert_eq!(diagnostics,
               ["Resolving error at 3:9: Cannot access private property 'code' of class 'Vault' outside its class\n\
                 print v.code;\n        ^"]);

    // Once reassigned, the variable's class is no longer known statically.
    assert_resolves("class Vault { private var code = 1234; }
                     var v = Vault();
                     v = nil;
                     fun peek() { return v.code; }");
}

#[test]
fn final_fields_with_initializers_cannot_be_assigned() {
    let (error, _) = resolve_failure("class Config { final var level = 3; fun raise() { this.level = 4; } }");
    assert!(matches!(error,
                     ResolveError::FinalFieldReassignment { ref name, .. } if name == "level"));

    // Assigned exactly once, from the constructor.
    assert_resolves("class Config { final var level; constructor(l) { this.level = l; } }");
}

#[test]
fn control_flow_outside_its_construct() {
    let cases = [("break;", "'break' used outside of a loop"),
                 ("continue;", "'continue' used outside of a loop"),
                 ("return;", "'return' used outside of a function"),
                 ("while (true) { fun f() { break; } }", "'break' used outside of a loop"),
                 ("repeat (2) { test (\"t\") { continue; } }", "'continue' used outside of a loop")];
    for (src, message) in cases {
        let (error, _) = resolve_failure(src);
        assert_eq!(error.to_string(), message, "{src}");
    }

    assert_resolves("while (true) { if (true) break; else continue; }");
    assert_resolves("fun f() { repeat (3) { return 1; } }");
    assert_resolves("test (\"returns\") { return true; }");
}

#[test]
fn local_cannot_read_itself_in_its_initializer() {
    let (error, _) = resolve_failure("fun f() { var a = a; }");
    assert!(matches!(error, ResolveError::ReadInOwnInitializer { ref name, .. } if name == "a"));

    // Globals resolve by name at run time.
    assert_resolves("var a = a;");
}

#[test]
fn resolution_stops_at_the_first_error() {
    let (error, diagnostics) = resolve_failure("break;\nfinal var x = 1;\nx = 2;");
    assert!(matches!(error, ResolveError::IllegalControlFlow { .. }));
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn resolving_does_not_run_anything() {
    let mut script = Script::new("var x = 1; print x; test (\"t\") { return false; }");
    script.bind_global("seed", Value::from(7.0));
    script.resolve().unwrap();
    script.resolve().unwrap();

    let context = script.context();
    assert!(context.is_resolved());
    assert!(context.output.is_empty());
    assert!(context.tests.is_empty());
    assert_eq!(context.global("x"), None);
    assert_eq!(context.globals().len(), 1);
    assert!(context.diagnostics().is_empty());
    assert_eq!(context.statements().len(), 3);
}

#[test]
fn failed_resolution_leaves_the_tree_unresolved() {
    let mut script = Script::new("final var x = 1; x = 2;");
    assert!(script.resolve().is_err());
    assert!(!script.context().is_resolved());

    // The same failure is reported again on retry.
    assert!(matches!(script.resolve(),
                     Err(ScriptError::Resolve(ResolveError::FinalReassignment { .. }))));
}

#[test]
fn names_cannot_be_used_before_their_declaration() {
    let (error, diagnostics) = resolve_failure("{\n    print y;\n    var y = 1;\n}");
    assert_eq!(error,
               ResolveError::UseBeforeDeclaration { name:     "y".to_string(),
                                                    location: SourceLocation::new(2, 11), });
    assert_eq!(diagnostics,
               ["Resolving error at 2:11: Cannot use 'y' before its declaration\n    print y;\n          ^"]);

    for src in ["print b; var b = 1;",
                "x = 2; var x = 1;",
                "if (true) { f(); } fun f() {}",
                "class B extends A {}\nclass A {}",
                "fun A.m() {}\nclass A {}"]
    {
        let (error, _) = resolve_failure(src);
        assert!(matches!(error, ResolveError::UseBeforeDeclaration { .. }), "{src}: {error:?}");
    }

    // Function bodies run later, so they may name what comes after them.
    assert_resolves("fun even(n) { return n == 0 ? true : odd(n - 1); }
                     fun odd(n) { return n == 0 ? false : even(n - 1); }");
    assert_resolves("var a = 1; { fun show() { return a; } var a = 2; }");
}

#[test]
fn functions_cannot_reassign_a_final_declared_later() {
    let (error, _) = resolve_failure("fun f() { x = 2; }\nfinal var x = 1;\nf();");
    assert_eq!(error,
               ResolveError::FinalReassignment { kind:     DeclarationKind::Variable,
                                                 name:     "x".to_string(),
                                                 location: SourceLocation::new(1, 11), });

    let (error, _) = resolve_failure("class Counter { fun reset() { total = 0; } }\nfinal var total = 5;");
    assert!(matches!(error,
                     ResolveError::FinalReassignment { ref name, .. } if name == "total"));

    // A final local further down a block is not what the function assigns.
    assert_resolves("{ fun f() { x = 2; } final var x = 1; }");
    // Top-level code runs before the binding becomes final.
    assert_resolves("var x = 1; x = 2; final var x = 3;");
}
