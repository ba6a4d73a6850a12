use std::rc::Rc;

use hsl::{
    ast::{BinaryOperator, Expr, FunctionKind, Statement, Visibility},
    error::{ErrorReporter, ParseError, Phase},
    interpreter::{
        lexer::{core::Lexer, registry::TokenRegistry},
        parser::core::{Grammar, MAX_ARGUMENTS, ParseResult, Parser},
        token::{SourceLocation, TokenType},
    },
};

fn parse(src: &str) -> Result<Vec<Statement>, Vec<ParseError>> {
    let scanned = Lexer::new(src, &TokenRegistry::standard()).scan_tokens()
                                                             .unwrap_or_else(|e| panic!("Lexing failed: {e:?}"));
    Parser::new(&scanned.tokens).parse()
}

fn parse_ok(src: &str) -> Vec<Statement> {
    parse(src).unwrap_or_else(|e| panic!("Parsing failed: {e:?}\n{src}"))
}

fn parse_errors(src: &str) -> Vec<ParseError> {
    match parse(src) {
        Ok(statements) => panic!("Parsing succeeded but was expected to fail: {statements:?}"),
        Err(errors) => errors,
    }
}

fn single_expression(src: &str) -> Expr {
    match parse_ok(src).as_slice() {
        [Statement::Expression { expr, .. }] => expr.clone(),
        other => panic!("Expected one expression statement, got {other:?}"),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let expr = single_expression("1 + 2 * 3;");
    let Expr::Binary { op: BinaryOperator::Add,
                       right,
                       .. } = expr
    else {
        panic!("Expected an addition, got {expr:?}");
    };
    assert!(matches!(*right,
                     Expr::Binary { op: BinaryOperator::Mul,
                                    .. }));
}

#[test]
fn assignment_is_right_associative() {
    let expr = single_expression("a = b = 1;");
    let Expr::Assign { name, value, .. } = expr else {
        panic!("Expected an assignment, got {expr:?}");
    };
    assert_eq!(name, "a");
    assert!(matches!(*value, Expr::Assign { ref name, .. } if name == "b"));
}

#[test]
fn property_and_index_targets_become_setters() {
    assert!(matches!(single_expression("a.b = 1;"), Expr::Set { .. }));
    assert!(matches!(single_expression("a[0] = 1;"), Expr::ArraySet { .. }));
    assert!(matches!(single_expression("a.b.c[1].d = 1;"), Expr::Set { .. }));
}

#[test]
fn prefix_names_are_operators_only_after_declaration() {
    let statements = parse_ok("prefix fun neg(a) { return -a; } neg 5;");
    assert!(matches!(&statements[1],
                     Statement::Expression { expr: Expr::PrefixCall { name, .. }, .. } if name == "neg"));

    let errors = parse_errors("neg 5; prefix fun neg(a) { return -a; }");
    assert!(matches!(&errors[0],
                     ParseError::ExpectedToken { found, .. } if found == "5"));
}

#[test]
fn infix_application_chains_left_to_right() {
    let statements = parse_ok("infix fun max(a, b) { return a > b ? a : b; } 1 max 2 max 3;");
    let Statement::Expression { expr: Expr::InfixCall { left, .. },
                                .. } = &statements[1]
    else {
        panic!("Expected an infix call, got {:?}", statements[1]);
    };
    assert!(matches!(**left, Expr::InfixCall { .. }));
}

#[test]
fn operator_functions_check_their_arity() {
    let errors = parse_errors("prefix fun bad(a, b) { return a; }\ninfix fun worse(a) { return a; }");
    assert_eq!(errors,
               [ParseError::OperatorArity { kind:     "prefix",
                                            expected: 1,
                                            found:    2,
                                            location: SourceLocation::new(1, 12), },
                ParseError::OperatorArity { kind:     "infix",
                                            expected: 2,
                                            found:    1,
                                            location: SourceLocation::new(2, 11), }]);
}

#[test]
fn recovers_and_reports_every_error() {
    let errors = parse_errors("var = 1;\nprint ;\nvar ok = 2;\n1 = 2;");
    assert_eq!(errors.len(), 3, "{errors:?}");
    assert!(matches!(&errors[0],
                     ParseError::ExpectedToken { expected, found, .. }
                     if expected == "variable name" && found == "="));
    assert!(matches!(&errors[1], ParseError::ExpectedExpression { found, .. } if found == ";"));
    assert!(matches!(errors[2], ParseError::InvalidAssignmentTarget { .. }));
}

#[test]
fn parse_errors_render_with_a_caret() {
    let source = "var = 1;";
    let errors = parse_errors(source);
    let rendered = ErrorReporter::new(source).render_error(Phase::Parsing, &errors[0]);
    assert_eq!(rendered,
               "Parsing error at 1:5: Expected variable name, found '='\nvar = 1;\n    ^");
}

#[test]
fn missing_input_is_reported_as_end_of_input() {
    let errors = parse_errors("print 1");
    assert!(matches!(&errors[0],
                     ParseError::ExpectedToken { found, .. } if found == "end of input"));
}

#[test]
fn argument_and_parameter_limits() {
    let arguments = (0..=MAX_ARGUMENTS).map(|i| i.to_string())
                                       .collect::<Vec<_>>()
                                       .join(", ");
    let errors = parse_errors(&format!("f({arguments});"));
    assert!(matches!(errors[0], ParseError::TooManyArguments { limit: MAX_ARGUMENTS, .. }));

    let parameters = (0..=MAX_ARGUMENTS).map(|i| format!("p{i}"))
                                        .collect::<Vec<_>>()
                                        .join(", ");
    let errors = parse_errors(&format!("fun f({parameters}) {{}}"));
    assert!(matches!(errors[0], ParseError::TooManyParameters { limit: MAX_ARGUMENTS, .. }));
}

#[test]
fn class_declarations() {
    let statements = parse_ok("final class Point extends Base {
                                   private final var x = 0;
                                   var y;
                                   constructor(x) { this.x = x; }
                                   final fun length() { return 0; }
                               }");
    let Statement::Class(class) = &statements[0] else {
        panic!("Expected a class, got {:?}", statements[0]);
    };
    assert!(class.is_final);
    assert_eq!(class.superclass.as_ref().map(|s| s.name.as_str()), Some("Base"));

    let fields: Vec<_> = class.fields
                              .iter()
                              .map(|f| (f.name.as_str(), f.visibility, f.is_final, f.initializer.is_some()))
                              .collect();
    assert_eq!(fields,
               [("x", Visibility::Private, true, true), ("y", Visibility::Public, false, false)]);

    let methods: Vec<_> = class.methods
                               .iter()
                               .map(|m| (m.name.as_str(), m.kind, m.is_final))
                               .collect();
    assert_eq!(methods,
               [("constructor", FunctionKind::Constructor, false), ("length", FunctionKind::Method, true)]);
}

#[test]
fn invalid_class_members_are_reported() {
    let errors = parse_errors("class A { 1; }");
    assert!(matches!(&errors[0],
                     ParseError::InvalidClassMember { found, .. } if found == "1"));
}

#[test]
fn extension_and_native_declarations() {
    let statements = parse_ok("module math;\nnative fun math.max(a, b);\nfun Point.norm() { return 1; }");
    assert!(matches!(&statements[0], Statement::Module { name, .. } if name == "math"));
    assert!(matches!(&statements[1],
                     Statement::NativeFunction { module, name, params, .. }
                     if module == "math" && name == "max" && params.len() == 2));
    assert!(matches!(&statements[2],
                     Statement::Extension { class_name, function, .. }
                     if class_name == "Point" && function.name == "norm"));
}

#[test]
fn test_blocks_and_loops() {
    let statements = parse_ok("test (\"it works\") { return true; }
                               do print 1; while (false);
                               repeat (3) { print 2; }");
    assert!(matches!(&statements[0], Statement::Test { name, body, .. } if name == "it works" && body.len() == 1));
    assert!(matches!(statements[1], Statement::DoWhile { .. }));
    assert!(matches!(statements[2], Statement::Repeat { .. }));
}

#[test]
fn empty_grammar_only_knows_expressions() {
    let scanned = Lexer::new("print 1;", &TokenRegistry::standard()).scan_tokens()
                                                                     .unwrap();
    let errors = Parser::with_grammar(&scanned.tokens, Rc::new(Grammar::empty())).parse()
                                                                                 .unwrap_err();
    assert!(matches!(&errors[0], ParseError::ExpectedExpression { found, .. } if found == "print"));
}

#[test]
fn host_statement_parsers_extend_the_grammar() {
    let mut registry = TokenRegistry::standard();
    let shout = registry.register_custom("SHOUT", "!!!").unwrap();

    let mut grammar = Grammar::standard();
    grammar.add_statement_parser(move |parser: &mut Parser<'_>| -> ParseResult<Option<Statement>> {
               if !parser.check(shout) {
                   return Ok(None);
               }
               let location = parser.advance().location();
               let expr = parser.expression()?;
               parser.consume(TokenType::Semicolon, "';' after shout")?;
               Ok(Some(Statement::Print { expr, location }))
           });

    let scanned = Lexer::new("!!! \"hey\";", &registry).scan_tokens()
                                                       .unwrap();
    let statements = Parser::with_grammar(&scanned.tokens, Rc::new(grammar)).parse()
                                                                            .unwrap();
    assert!(matches!(&statements[..],
                     [Statement::Print { expr: Expr::Literal { .. }, .. }]));
}

#[test]
fn declining_node_parsers_do_not_consume_tokens() {
    let mut grammar = Grammar::empty();
    grammar.add_statement_parser(|parser: &mut Parser<'_>| -> ParseResult<Option<Statement>> {
               parser.advance();
               parser.advance();
               Ok(None)
           });

    let scanned = Lexer::new("1 + 2; a;", &TokenRegistry::standard()).scan_tokens()
                                                                      .unwrap();
    let statements = Parser::with_grammar(&scanned.tokens, Rc::new(grammar)).parse()
                                                                            .unwrap();
    assert!(matches!(&statements[..],
                     [Statement::Expression { expr: Expr::Binary { .. }, .. },
                      Statement::Expression { expr: Expr::Variable { .. }, .. }]));
}

#[test]
fn constructor_is_a_member_name() {
    let statements = parse_ok("class B extends A { constructor() { super.constructor(); } }\nb.constructor;");
    let Statement::Class(class) = &statements[0] else {
        panic!("Expected a class, got {:?}", statements[0]);
    };
    assert!(matches!(&class.methods[0].body[..],
                     [Statement::Expression { expr: Expr::Call { callee, .. }, .. }]
                     if matches!(**callee, Expr::Super { ref method, .. } if method == "constructor")));
    assert!(matches!(&statements[1],
                     Statement::Expression { expr: Expr::Get { name, .. }, .. } if name == "constructor"));
}
