use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use hsl::{
    ast::{Expr, LiteralValue, Statement},
    error::{Phase, RuntimeError, ScriptError},
    interpreter::{
        context::ScriptContext,
        customizer::Timing,
        evaluator::core::InterpreterOptions,
        lexer::registry::TokenRegistry,
        parser::core::{Grammar, ParseResult, Parser},
        script::Script,
        token::TokenType,
        value::{
            core::Value,
            native::{NativeModule, ParamType},
        },
    },
};

fn describe_module() -> NativeModule {
    NativeModule::new("kinds").function("describe", &[ParamType::Number], |_| Ok(Value::from("number")))
                              .function("describe", &[ParamType::Str], |_| Ok(Value::from("string")))
                              .function("describe", &[ParamType::Any], |_| Ok(Value::from("anything")))
                              .function("pick", &[ParamType::Any], |_| Ok(Value::from("first")))
                              .function("pick", &[ParamType::Any], |_| Ok(Value::from("second")))
                              .function("fail", &[], |_| Err("host refused".to_string()))
}

fn run(script: &mut Script) -> &ScriptContext {
    script.evaluate()
          .unwrap_or_else(|e| panic!("Script failed: {e:?}"))
}

fn runtime_error(script: &mut Script) -> RuntimeError {
    match script.evaluate() {
        Err(ScriptError::Runtime(error)) => error,
        Err(other) => panic!("Expected a runtime error, got {other:?}"),
        Ok(_) => panic!("Script succeeded but was expected to fail"),
    }
}

#[test]
fn host_globals_are_visible_to_scripts() {
    let mut script = Script::new("var allowed = age >= 18 && name != \"\";");
    script.bind_global("age", Value::from(21.0));
    script.bind_global("name", Value::from("Ada"));

    let context = run(&mut script);
    assert_eq!(context.global("allowed"), Some(Value::Bool(true)));
    assert_eq!(context.globals().len(), 3);
}

#[test]
fn scripts_can_call_native_functions_through_their_module() {
    let mut script = Script::new("module kinds;
                                  var a = kinds.describe(1);
                                  var b = kinds.describe(\"one\");
                                  var c = kinds.describe(true);");
    script.register_module(describe_module());

    let context = run(&mut script);
    let values: Vec<_> = ["a", "b", "c"].iter().map(|name| context.global(name)).collect();
    assert_eq!(values,
               [Some(Value::from("number")), Some(Value::from("string")), Some(Value::from("anything"))]);
}

#[test]
fn native_declarations_bind_a_global_name() {
    let mut script = Script::new("native fun kinds.describe(value);
                                  var a = describe('c');");
    script.register_module(describe_module());
    assert_eq!(run(&mut script).global("a"), Some(Value::from("anything")));

    let mut script = Script::new("native fun kinds.describe(value);\ndescribe(1, 2);");
    script.register_module(describe_module());
    assert!(matches!(runtime_error(&mut script),
                     RuntimeError::ArityMismatch { expected: 1,
                                                   found: 2,
                                                   .. }));
}

#[test]
fn ambiguous_overloads_fail_unless_permitted() {
    let source = "module kinds; var picked = kinds.pick(1);";

    let mut script = Script::new(source);
    script.register_module(describe_module());
    assert!(matches!(runtime_error(&mut script),
                     RuntimeError::AmbiguousOverload { candidates: 2, .. }));

    let options = InterpreterOptions::default().permit_ambiguous_external_functions(true);
    let mut script = Script::new(source).with_options(options);
    script.register_module(describe_module());
    assert_eq!(run(&mut script).global("picked"), Some(Value::from("first")));
}

#[test]
fn native_lookup_failures() {
    let mut script = Script::new("module missing;");
    assert!(matches!(runtime_error(&mut script), RuntimeError::UnknownModule { .. }));

    let mut script = Script::new("native fun kinds.nothing();");
    script.register_module(describe_module());
    assert!(matches!(runtime_error(&mut script),
                     RuntimeError::UnknownNativeFunction { ref name, .. } if name == "nothing"));

    let mut script = Script::new("module kinds; kinds.fail(1);");
    script.register_module(describe_module());
    assert!(matches!(runtime_error(&mut script), RuntimeError::NoMatchingOverload { .. }));

    let mut script = Script::new("module kinds; kinds.fail();");
    script.register_module(describe_module());
    assert!(matches!(runtime_error(&mut script),
                     RuntimeError::NativeFailure { ref message, .. } if message == "host refused"));
}

#[test]
fn native_functions_receive_script_values() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let module = NativeModule::new("log").function("write", &[ParamType::Any, ParamType::Callable], move |args| {
                                              log.borrow_mut().push(args[0].to_string());
                                              Ok(Value::Nil)
                                          });

    let mut script = Script::new("module log;
                                  fun f() {}
                                  log.write([1, 'a', \"b\"], f);
                                  log.write(1.5, log.write);");
    script.register_module(module);
    run(&mut script);

    assert_eq!(*seen.borrow(), ["[1, a, b]", "1.5"]);
}

#[test]
fn resolve_has_no_side_effects() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let module = NativeModule::new("effects").function("touch", &[], move |_| {
                                                  counter.set(counter.get() + 1);
                                                  Ok(Value::Nil)
                                              });

    let mut script = Script::new("module effects; effects.touch(); var done = true;");
    script.register_module(module);

    script.resolve().unwrap();
    script.resolve().unwrap();
    assert_eq!(calls.get(), 0);
    assert_eq!(script.context().global("done"), None);

    run(&mut script);
    assert_eq!(calls.get(), 1);
    assert_eq!(script.context().global("done"), Some(Value::Bool(true)));
}

#[test]
fn evaluation_is_restartable_with_persistent_globals() {
    let mut script = Script::new("var a = 1; runs = runs + 1; print runs;");
    script.bind_global("runs", Value::from(0.0));

    for expected in 1..=3 {
        let context = run(&mut script);
        assert_eq!(context.global("a"), Some(Value::from(1.0)));
        assert_eq!(context.global("runs"), Some(Value::from(f64::from(expected))));
        assert_eq!(context.output, [expected.to_string()]);
    }
}

#[test]
fn separate_scripts_do_not_share_state() {
    let mut first = Script::new("var shared = 1;");
    run(&mut first);

    let mut second = Script::new("print shared;");
    assert!(matches!(runtime_error(&mut second), RuntimeError::UndefinedVariable { .. }));
}

#[test]
fn customizers_run_around_every_phase_in_order() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut script = Script::new("var x = 1;");

    for phase in Phase::ALL {
        for timing in [Timing::After, Timing::Before] {
            let calls = Rc::clone(&calls);
            script.customize(phase,
                             timing,
                             move |_: &mut ScriptContext| -> Result<(), ScriptError> {
                                 calls.borrow_mut().push(format!("{phase} {timing:?}"));
                                 Ok(())
                             });
        }
    }
    run(&mut script);

    assert_eq!(*calls.borrow(),
               ["Tokenizing Before",
                "Tokenizing After",
                "Parsing Before",
                "Parsing After",
                "Resolving Before",
                "Resolving After",
                "Interpreting Before",
                "Interpreting After"]);

    // A second run only repeats the interpreting hooks.
    calls.borrow_mut().clear();
    run(&mut script);
    assert_eq!(*calls.borrow(), ["Interpreting Before", "Interpreting After"]);
}

#[test]
fn customizers_observe_and_mutate_the_context() {
    let mut script = Script::new("# config\nvar limit = base * 2;\nprint limit;\nprint \"dropped\";");

    script.customize(Phase::Tokenizing,
                     Timing::After,
                     |context: &mut ScriptContext| -> Result<(), ScriptError> {
                         match context.comments() {
                             [comment] if comment.text == " config" => Ok(()),
                             other => Err(ScriptError::customizer(Phase::Tokenizing, format!("{other:?}"))),
                         }
                     });
    script.customize(Phase::Parsing,
                     Timing::After,
                     |context: &mut ScriptContext| -> Result<(), ScriptError> {
                         if let Some(statements) = context.statements_mut() {
                             statements.pop();
                         }
                         Ok(())
                     });
    script.customize(Phase::Resolving,
                     Timing::After,
                     |context: &mut ScriptContext| -> Result<(), ScriptError> {
                         if context.statements_mut().is_some() {
                             return Err(ScriptError::customizer(Phase::Resolving, "AST still mutable"));
                         }
                         Ok(())
                     });
    script.customize(Phase::Interpreting,
                     Timing::Before,
                     |context: &mut ScriptContext| -> Result<(), ScriptError> {
                         context.define_global("base", Value::from(21.0));
                         Ok(())
                     });

    let context = run(&mut script);
    assert_eq!(context.global("limit"), Some(Value::from(42.0)));
    assert_eq!(context.output, ["42"]);
}

#[test]
fn failing_customizer_aborts_the_pipeline() {
    let mut script = Script::new("print 1;");
    script.customize(Phase::Parsing,
                     Timing::Before,
                     |_: &mut ScriptContext| -> Result<(), ScriptError> {
                         Err(ScriptError::customizer(Phase::Parsing, "parsing is disabled"))
                     });

    let error = script.evaluate().unwrap_err();
    assert_eq!(error.phase(), Phase::Parsing);
    assert!(script.context().statements().is_empty());
    assert_eq!(script.context().diagnostics(), ["Parsing error: parsing is disabled"]);
}

#[test]
fn runtime_diagnostics_point_at_the_call() {
    let mut script = Script::new("var x = 1;\nx();");
    assert!(script.evaluate().is_err());
    assert_eq!(script.context().diagnostics(),
               ["Interpreting error at 2:2: Can only call functions and classes, not number\nx();\n ^"]);
}

#[test]
fn lexing_reports_every_bad_character() {
    let mut script = Script::new("var a = 1 @ 2;\nvar b = $;");
    let Err(ScriptError::Lex(errors)) = script.evaluate() else {
        panic!("Expected lexing errors");
    };
    assert_eq!(errors.len(), 2);
    assert_eq!(script.context().diagnostics(),
               ["Tokenizing error at 1:11: Unexpected character '@'\nvar a = 1 @ 2;\n          ^",
                "Tokenizing error at 2:9: Unexpected character '$'\nvar b = $;\n        ^"]);
}

#[test]
fn output_and_tests_survive_a_failed_run() {
    let mut script = Script::new("print \"before\";
                                  test (\"ok\") { return true; }
                                  test (\"broken\") { return false; }
                                  print \"after\";");
    assert!(script.evaluate().is_err());

    let context = script.context();
    assert_eq!(context.output, ["before"]);
    let outcomes: Vec<_> = context.tests.iter().map(|t| (t.name.as_str(), t.passed)).collect();
    assert_eq!(outcomes, [("ok", true), ("broken", false)]);
}

#[test]
fn hosts_can_extend_tokens_and_grammar_together() {
    let mut registry = TokenRegistry::standard();
    let arrow = registry.register_custom("SEND", "=>>").unwrap();

    // `value =>> name;` stores `value` in the global `name`.
    let mut grammar = Grammar::standard();
    grammar.add_statement_parser(move |parser: &mut Parser<'_>| -> ParseResult<Option<Statement>> {
               if !parser.check_next(arrow) {
                   return Ok(None);
               }
               let start = parser.peek().location();
               let literal = parser.advance().literal.clone().unwrap_or(LiteralValue::Nil);
               let value = Expr::literal(literal, start);
               parser.advance();
               let target = parser.consume(TokenType::Identifier, "target name")?;
               parser.consume(TokenType::Semicolon, "';' after send")?;
               Ok(Some(Statement::VarDecl { name:        target.lexeme.clone(),
                                            initializer: Some(value),
                                            is_final:    false,
                                            location:    start, }))
           });

    let mut script = Script::with_registry("5 =>> five;\nvar ten = five * 2;", registry).with_grammar(grammar);
    assert_eq!(run(&mut script).global("ten"), Some(Value::from(10.0)));
}

#[test]
fn call_depth_is_configurable() {
    let source = "fun down(n) { if (n == 0) return 0; return down(n - 1); }
                  var shallow = down(5);
                  var deep = down(20);";
    let options = InterpreterOptions::default().max_call_depth(10);
    let mut script = Script::new(source).with_options(options);

    assert!(matches!(runtime_error(&mut script),
                     RuntimeError::CallDepthExceeded { limit: 10, .. }));
    assert_eq!(script.context().global("shallow"), Some(Value::from(0.0)));
    assert_eq!(script.context().global("deep"), None);
}
