use std::fs;

use hsl::{
    error::{ResolveError, RuntimeError, ScriptError},
    evaluate,
    interpreter::{context::ScriptContext, evaluator::core::DEFAULT_MAX_CALL_DEPTH, value::core::Value},
};
use walkdir::WalkDir;

#[test]
fn example_scripts_work() {
    let mut count = 0;

    for entry in
        WalkDir::new("tests/scripts").into_iter()
                                     .filter_map(Result::ok)
                                     .filter(|e| e.path().extension().is_some_and(|ext| ext == "hsl"))
    {
        let path = entry.path();
        let source =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        count += 1;
        if let Err(e) = evaluate(&source) {
            panic!("Script {path:?} failed:\n{source}\nError: {e:?}");
        }
    }

    assert!(count > 0, "No scripts found in tests/scripts");
}

fn run(src: &str) -> ScriptContext {
    evaluate(src).unwrap_or_else(|e| panic!("Script failed: {e:?}\n{src}"))
}

fn assert_success(src: &str) {
    if let Err(e) = evaluate(src) {
        panic!("Script failed: {e:?}");
    }
}

fn assert_failure(src: &str) -> ScriptError {
    match evaluate(src) {
        Ok(_) => panic!("Script succeeded but was expected to fail"),
        Err(e) => e,
    }
}

fn global(src: &str, name: &str) -> Value {
    run(src).global(name)
            .unwrap_or_else(|| panic!("'{name}' is not defined"))
}

#[test]
fn arithmetic_and_precedence() {
    assert_eq!(global("var x = 1 + 2 * 3;", "x"), Value::from(7.0));
    assert_eq!(global("var x = (1 + 2) * 3;", "x"), Value::from(9.0));
    assert_eq!(global("var x = 7 / 2;", "x"), Value::from(3.5));
    assert_eq!(global("var x = 10 % 4;", "x"), Value::from(2.0));
    assert_eq!(global("var x = -10 % 4;", "x"), Value::from(-2.0));
    assert_eq!(global("var x = 2 - -3;", "x"), Value::from(5.0));
}

#[test]
fn division_by_zero_follows_ieee() {
    assert_eq!(global("var x = 1 / 0;", "x"), Value::from(f64::INFINITY));
    assert!(global("var x = 0 / 0;", "x").as_number()
                                         .is_some_and(f64::is_nan));
}

#[test]
fn numbers_print_without_trailing_zeros() {
    let context = run("print 3; print 2.5; print 1 / 0; print -0.5;");
    assert_eq!(context.output, ["3", "2.5", "inf", "-0.5"]);
}

#[test]
fn strings_and_chars() {
    assert_eq!(global("var s = \"a\" + 1;", "s"), Value::from("a1"));
    assert_eq!(global("var s = 1 + \"a\";", "s"), Value::from("1a"));
    assert_eq!(global("var s = \"x\" + true + nil;", "s"), Value::from("xtruenil"));
    assert_eq!(global("var b = \"abc\" < \"abd\";", "b"), Value::Bool(true));
    assert_eq!(global("var b = 'a' < 'b';", "b"), Value::Bool(true));
    assert_eq!(global("var c = \"abc\"[1];", "c"), Value::Char('b'));
    assert_eq!(global("var n = \"héllo\".length;", "n"), Value::from(5.0));
    assert_eq!(global("var s = \"tab\\there\";", "s"), Value::from("tab\there"));
}

#[test]
fn adding_incompatible_types_fails() {
    let error = assert_failure("var x = 1 + true;");
    assert!(matches!(error, ScriptError::Runtime(RuntimeError::TypeMismatch { .. })));

    let error = assert_failure("var x = 'a' * 2;");
    assert!(matches!(error, ScriptError::Runtime(RuntimeError::TypeMismatch { .. })));
}

#[test]
fn truthiness_ternary_and_elvis() {
    assert_eq!(global("var x = 0 ? \"yes\" : \"no\";", "x"), Value::from("yes"));
    assert_eq!(global("var x = \"\" ? \"yes\" : \"no\";", "x"), Value::from("yes"));
    assert_eq!(global("var x = nil ? \"yes\" : \"no\";", "x"), Value::from("no"));
    assert_eq!(global("var x = nil ?: \"fallback\";", "x"), Value::from("fallback"));
    assert_eq!(global("var x = false ?: 1;", "x"), Value::from(1.0));
    assert_eq!(global("var x = 0 ?: 1;", "x"), Value::from(0.0));
}

#[test]
fn logical_operators_short_circuit_and_yield_booleans() {
    assert_eq!(global("var x = nil || 2;", "x"), Value::Bool(true));
    assert_eq!(global("var x = 1 && nil;", "x"), Value::Bool(false));
    assert_success("var calls = 0;
                    fun touch() { calls = calls + 1; return true; }
                    var a = false && touch();
                    var b = true || touch();
                    test (\"no calls\") { return calls == 0; }");
}

#[test]
fn bitwise_operators() {
    let context = run("var a = 5; var b = 7;
                       var or = a | b;
                       var and = a & b;
                       var xor = a ^ b;
                       var shl = a << b;
                       var shr = a >> b;
                       var ushr = a >>> b;");
    let values: Vec<_> = ["or", "and", "xor", "shl", "shr", "ushr"].iter()
                                                                   .map(|name| context.global(name))
                                                                   .collect();
    let expected: Vec<_> = [7.0, 5.0, 2.0, 640.0, 0.0, 0.0].into_iter()
                                                           .map(|n| Some(Value::from(n)))
                                                           .collect();
    assert_eq!(values, expected);

    assert_eq!(global("var x = ~5;", "x"), Value::from(-6.0));
    assert_eq!(global("var x = -16 >> 2;", "x"), Value::from(-4.0));
    assert_eq!(global("var x = -1 >>> 28;", "x"), Value::from(15.0));
    assert_eq!(global("var x = 7.9 & 3.2;", "x"), Value::from(3.0));
    assert_eq!(global("var x = true ^ true;", "x"), Value::Bool(false));
    assert_eq!(global("var x = true | false;", "x"), Value::Bool(true));
}

#[test]
fn shift_falls_back_when_longer_sequence_is_unknown() {
    // `<<<` is not an operator: it lexes as `<<` followed by `<`.
    let error = assert_failure("var x = 1 <<< 2;");
    assert!(matches!(error, ScriptError::Parse(_)));
}

#[test]
fn variables_and_scopes() {
    assert_eq!(global("var a = 1; { var a = 2; } var b = a;", "b"), Value::from(1.0));
    assert_eq!(global("var a = 1; { a = 2; } var b = a;", "b"), Value::from(2.0));
    assert_eq!(global("var a;", "a"), Value::Nil);
    assert_success("var a = \"global\";
                    {
                        fun show() { return a; }
                        var first = show();
                        var a = \"block\";
                        test (\"closure keeps its binding\") { return show() == \"global\"; }
                    }");
}

#[test]
fn undefined_variable_is_a_runtime_error() {
    let error = assert_failure("print missing;");
    assert!(matches!(error, ScriptError::Runtime(RuntimeError::UndefinedVariable { .. })));

    let error = assert_failure("missing = 1;");
    assert!(matches!(error, ScriptError::Runtime(RuntimeError::UndefinedVariable { .. })));
}

#[test]
fn reading_a_local_in_its_own_initializer_fails() {
    let error = assert_failure("var a = 1; { var a = a + 1; }");
    assert!(matches!(error,
                     ScriptError::Resolve(ResolveError::ReadInOwnInitializer { .. })));
}

#[test]
fn loops() {
    assert_eq!(global("var i = 0; var sum = 0;
                       while (i < 5) { i = i + 1; if (i == 2) continue; if (i == 4) break; sum = sum + i; }",
                      "sum"),
               Value::from(4.0));
    assert_eq!(global("var n = 0; do n = n + 1; while (false);", "n"), Value::from(1.0));
    assert_eq!(global("var n = 0; repeat (3.7) n = n + 1;", "n"), Value::from(3.0));
    assert_eq!(global("var n = 0; repeat (-2) n = n + 1;", "n"), Value::from(0.0));
    assert_eq!(global("var n = 0; repeat (10) { n = n + 1; if (n == 4) break; }", "n"),
               Value::from(4.0));
}

#[test]
fn repeat_requires_a_number() {
    let error = assert_failure("repeat (\"3\") print 1;");
    assert!(matches!(error, ScriptError::Runtime(RuntimeError::TypeMismatch { .. })));
}

#[test]
fn misplaced_control_flow_is_rejected_before_running() {
    for src in ["break;", "continue;", "return 1;", "fun f() { break; }", "while (true) { fun g() { continue; } }"] {
        let error = assert_failure(src);
        assert!(matches!(error,
                         ScriptError::Resolve(ResolveError::IllegalControlFlow { .. })),
                "{src}: {error:?}");
    }
}

#[test]
fn functions_and_closures() {
    assert_eq!(global("fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
                       var x = fib(10);",
                      "x"),
               Value::from(55.0));
    assert_eq!(global("fun counter() {
                           var count = 0;
                           fun next() { count = count + 1; return count; }
                           return next;
                       }
                       var c = counter();
                       c(); c();
                       var x = c();",
                      "x"),
               Value::from(3.0));
    assert_eq!(global("function nothing() { return; } var x = nothing();", "x"), Value::Nil);
    assert_eq!(global("fun f() {} var x = f();", "x"), Value::Nil);
}

#[test]
fn calling_with_the_wrong_arity_fails() {
    let error = assert_failure("fun f(a, b) { return a; } f(1);");
    assert!(matches!(error,
                     ScriptError::Runtime(RuntimeError::ArityMismatch { expected: 2,
                                                                        found: 1,
                                                                        .. })));
}

#[test]
fn calling_a_non_callable_fails() {
    let error = assert_failure("var x = 1; x();");
    assert!(matches!(error,
                     ScriptError::Runtime(RuntimeError::NotCallable { type_name: "number",
                                                                      .. })));
}

#[test]
fn prefix_and_infix_functions() {
    assert_eq!(global("prefix fun neg(a) { return -a; } var x = neg 5;", "x"), Value::from(-5.0));
    // Infix applications bind tighter than `*`.
    assert_eq!(global("infix fun plus(a, b) { return a + b; } var x = 1 plus 2 * 3;", "x"),
               Value::from(9.0));
    assert_eq!(global("prefix fun twice(a) { return a * 2; } var x = twice twice 3;", "x"),
               Value::from(12.0));
    // Followed by a parenthesis, a prefix function is an ordinary call.
    assert_eq!(global("prefix fun neg(a) { return -a; } var x = neg(2) + 1;", "x"),
               Value::from(-1.0));
}

#[test]
fn arrays() {
    assert_eq!(global("var a = [1, 2, 3]; a[1] = 5; var x = a[1] + a.length;", "x"),
               Value::from(8.0));
    assert_eq!(global("var a = [1, [2, 3]]; var x = a[1][0];", "x"), Value::from(2.0));
    assert_eq!(run("print [1, \"two\", '3', nil];").output, ["[1, two, 3, nil]"]);

    // Arrays are shared by reference.
    assert_eq!(global("var a = [0]; var b = a; b[0] = 9; var x = a[0];", "x"),
               Value::from(9.0));
}

#[test]
fn array_indices_are_checked() {
    for src in ["var a = [1]; a[1];", "var a = [1]; a[-1];", "var a = [1]; a[0.5];", "\"ab\"[2];"] {
        let error = assert_failure(src);
        assert!(matches!(error,
                         ScriptError::Runtime(RuntimeError::IndexOutOfBounds { .. })),
                "{src}: {error:?}");
    }
}

#[test]
fn classes_fields_and_methods() {
    assert_eq!(global("class Counter {
                           var count = 0;
                           fun increment() { this.count = this.count + 1; return this; }
                       }
                       var c = Counter();
                       c.increment().increment();
                       var n = c.count;",
                      "n"),
               Value::from(2.0));

    assert_eq!(global("class Point {
                           var x; var y;
                           constructor(x, y) { this.x = x; this.y = y; }
                           fun sum() { return this.x + this.y; }
                       }
                       var s = Point(2, 3).sum();",
                      "s"),
               Value::from(5.0));

    assert_eq!(global("class Bag {} var b = Bag(); b.extra = 4; var x = b.extra;", "x"),
               Value::from(4.0));
    assert_eq!(run("class Bag {} print Bag; print Bag();").output, ["Bag", "Bag instance"]);
}

#[test]
fn constructor_without_declaration_takes_no_arguments() {
    let error = assert_failure("class A {} A(1);");
    assert!(matches!(error,
                     ScriptError::Runtime(RuntimeError::ArityMismatch { expected: 0,
                                                                        found: 1,
                                                                        .. })));
}

#[test]
fn returning_a_value_from_a_constructor_fails() {
    let error = assert_failure("class A { constructor() { return 1; } }");
    assert!(matches!(error, ScriptError::Resolve(ResolveError::ReturnFromConstructor { .. })));
    assert_success("class A { var x = 1; constructor() { return; this.x = 2; } }
                    test (\"early return keeps the instance\") { return A().x == 1; }");
}

#[test]
fn inheritance_and_super() {
    assert_eq!(global("class Animal {
                           var name;
                           constructor(name) { this.name = name; }
                           fun speak() { return this.name + \" makes a sound\"; }
                       }
                       class Dog extends Animal {
                           fun speak() { return super.speak() + \" (woof)\"; }
                       }
                       var s = Dog(\"Rex\").speak();",
                      "s"),
               Value::from("Rex makes a sound (woof)"));

    // Fields are initialised from the root of the chain downwards.
    assert_eq!(global("class A { var a = 1; }
                       class B extends A { var b = this.a + 1; }
                       var x = B().b;",
                      "x"),
               Value::from(2.0));
}

#[test]
fn this_and_super_outside_classes_fail() {
    let error = assert_failure("print this;");
    assert!(matches!(error, ScriptError::Resolve(ResolveError::ThisOutsideClass { .. })));

    let error = assert_failure("class A { fun f() { return super.f(); } }");
    assert!(matches!(error, ScriptError::Resolve(ResolveError::SuperOutsideSubclass { .. })));
}

#[test]
fn inheriting_from_a_non_class_fails() {
    let error = assert_failure("var NotAClass = 1; class A extends NotAClass {}");
    assert!(matches!(error,
                     ScriptError::Runtime(RuntimeError::SuperclassNotClass { .. })));

    let error = assert_failure("class A extends A {}");
    assert!(matches!(error, ScriptError::Resolve(ResolveError::SelfInheritance { .. })));
}

#[test]
fn private_fields() {
    assert_eq!(global("class Safe {
                           private var secret = 42;
                           fun reveal() { return this.secret; }
                       }
                       var x = Safe().reveal();",
                      "x"),
               Value::from(42.0));

    // Statically known: the variable holds a `Safe`.
    let error = assert_failure("class Safe { private var secret = 42; }
                                var s = Safe();
                                print s.secret;");
    assert!(matches!(error, ScriptError::Resolve(ResolveError::PrivateAccess { .. })));

    // Subclasses do not see their parent's private fields.
    let error = assert_failure("class Safe { private var secret = 42; }
                                class Sub extends Safe { fun peek() { return this.secret; } }");
    assert!(matches!(error, ScriptError::Resolve(ResolveError::PrivateAccess { .. })));

    // Only detectable at run time.
    let error = assert_failure("class Safe { private var secret = 42; }
                                fun peek(o) { return o.secret; }
                                peek(Safe());");
    assert!(matches!(error, ScriptError::Runtime(RuntimeError::PrivateAccess { .. })));
}

#[test]
fn final_fields() {
    assert_success("class Id {
                        final var value;
                        constructor(value) { this.value = value; }
                    }
                    var id = Id(3);
                    test (\"assigned once\") { return id.value == 3; }");

    let error = assert_failure("class P { final var x = 1; } var p = P(); p.x = 2;");
    assert!(matches!(error,
                     ScriptError::Resolve(ResolveError::FinalFieldReassignment { .. })));

    let error = assert_failure("class Id { final var value; constructor(v) { this.value = v; } }
                                fun change(o) { o.value = 4; }
                                change(Id(3));");
    assert!(matches!(error,
                     ScriptError::Runtime(RuntimeError::FinalFieldReassignment { .. })));
}

#[test]
fn extension_methods() {
    assert_eq!(global("class Greeter { var name = \"world\"; }
                       fun Greeter.greet() { return \"hello \" + this.name; }
                       var s = Greeter().greet();",
                      "s"),
               Value::from("hello world"));

    let error = assert_failure("final class Sealed {} fun Sealed.open() {}");
    assert!(matches!(error, ScriptError::Resolve(ResolveError::FinalExtension { .. })));

    let error = assert_failure("var Nope = 1; fun Nope.m() {}");
    assert!(matches!(error, ScriptError::Runtime(RuntimeError::NotAClass { .. })));

    // Extensions are not part of the class for private access.
    let error = assert_failure("class Safe { private var secret = 1; }
                                fun Safe.leak() { return this.secret; }
                                Safe().leak();");
    assert!(matches!(error, ScriptError::Runtime(RuntimeError::PrivateAccess { .. })));
}

#[test]
fn test_blocks_record_outcomes() {
    let context = run("test (\"passes\") { return 1 + 1 == 2; }
                       test (\"falls off the end\") { var x = 1; }");
    let names: Vec<_> = context.tests
                               .iter()
                               .map(|t| (t.name.as_str(), t.passed))
                               .collect();
    assert_eq!(names, [("passes", true), ("falls off the end", true)]);

    let error = assert_failure("test (\"fails\") { return 1 == 2; }");
    assert!(matches!(error,
                     ScriptError::Runtime(RuntimeError::TestFailed { ref name, .. }) if name == "fails"));
}

#[test]
fn comments_are_ignored() {
    assert_eq!(global("# hash\nvar x = 1; // line\n/* block\n comment */ var y = x + 1;", "y"),
               Value::from(2.0));
}

#[test]
fn constructors_chain_to_their_superclass() {
    assert_eq!(global("class Base {
                           var tag;
                           constructor(tag) { this.tag = tag; }
                       }
                       class Derived extends Base {
                           var extra;
                           constructor(tag, extra) {
                               super.constructor(tag + \"!\");
                               this.extra = extra;
                           }
                       }
                       var d = Derived(\"d\", 2);
                       var x = d.tag + d.extra;",
                      "x"),
               Value::from("d!2"));
}

#[test]
fn arrays_containing_themselves_print() {
    let context = run("var a = [0]; a[0] = a; print a; var b = [1, a]; print b;");
    assert_eq!(context.output, ["[[...]]", "[1, [[...]]]"]);
}

#[test]
fn runaway_recursion_is_a_runtime_error() {
    let error = assert_failure("fun f() { return f(); } f();");
    assert!(matches!(error,
                     ScriptError::Runtime(RuntimeError::CallDepthExceeded { limit: DEFAULT_MAX_CALL_DEPTH,
                                                                            .. })));
}
