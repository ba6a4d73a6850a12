use std::cmp::Ordering;

use crate::{
    ast::{BinaryOperator, BitwiseOperator, UnaryOperator},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        token::SourceLocation,
        value::core::Value,
    },
    util::num::truncate_to_i32,
};

impl Interpreter<'_> {
    /// Evaluates an arithmetic, comparison or equality operator.
    ///
    /// `+` concatenates the display forms of its operands when either one is
    /// a string, and otherwise requires two numbers. The other arithmetic
    /// operators follow IEEE-754, so dividing by zero yields an infinity or
    /// `NaN` rather than an error. Ordering works on numbers, strings and
    /// chars; equality works on everything.
    ///
    /// # Example
    /// ```
    /// use hsl::{
    ///     ast::BinaryOperator,
    ///     interpreter::{evaluator::core::Interpreter, token::SourceLocation, value::core::Value},
    /// };
    ///
    /// let at = SourceLocation::new(1, 1);
    /// let sum = Interpreter::eval_binary(BinaryOperator::Add,
    ///                                    &Value::from("n = "),
    ///                                    &Value::from(4.0),
    ///                                    at).unwrap();
    /// assert_eq!(sum, Value::from("n = 4"));
    ///
    /// let less = Interpreter::eval_binary(BinaryOperator::Less, &Value::from('a'), &Value::from('b'), at);
    /// assert_eq!(less.unwrap(), Value::Bool(true));
    /// ```
    pub fn eval_binary(op: BinaryOperator,
                       left: &Value,
                       right: &Value,
                       location: SourceLocation)
                       -> EvalResult<Value> {
        use BinaryOperator::{
            Add, Div, Equal, Greater, GreaterEqual, Less, LessEqual, Mod, Mul, NotEqual, Sub,
        };

        match op {
            Equal => Ok(Value::Bool(left == right)),
            NotEqual => Ok(Value::Bool(left != right)),
            Add => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::from(format!("{left}{right}"))),
                _ => Err(mismatch(op, left, right, location)),
            },
            Sub | Mul | Div | Mod => {
                let (Value::Number(a), Value::Number(b)) = (left, right) else {
                    return Err(mismatch(op, left, right, location));
                };
                Ok(Value::Number(match op {
                                     Sub => a - b,
                                     Mul => a * b,
                                     Div => a / b,
                                     _ => a % b,
                                 }))
            },
            Less | LessEqual | Greater | GreaterEqual => {
                let ordering = match (left, right) {
                    (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                    (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                    (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
                    _ => return Err(mismatch(op, left, right, location)),
                };
                let holds = match op {
                    Less => matches!(ordering, Some(Ordering::Less)),
                    LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                    Greater => matches!(ordering, Some(Ordering::Greater)),
                    _ => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                };
                Ok(Value::Bool(holds))
            },
        }
    }

    /// Evaluates a bitwise operator.
    ///
    /// Numbers are truncated to 32-bit two's-complement integers first and
    /// shift counts are taken modulo 32. `>>>` shifts in zeros and the result
    /// is read back as a signed 32-bit integer. On two booleans `&`, `|` and
    /// `^` act as non-short-circuiting logical operators.
    ///
    /// # Example
    /// ```
    /// use hsl::{
    ///     ast::BitwiseOperator,
    ///     interpreter::{evaluator::core::Interpreter, token::SourceLocation, value::core::Value},
    /// };
    ///
    /// let at = SourceLocation::new(1, 1);
    /// let shifted = Interpreter::eval_bitwise(BitwiseOperator::ShiftLeft,
    ///                                         &Value::from(5.0),
    ///                                         &Value::from(7.0),
    ///                                         at).unwrap();
    /// assert_eq!(shifted, Value::from(640.0));
    ///
    /// let unsigned = Interpreter::eval_bitwise(BitwiseOperator::UnsignedShiftRight,
    ///                                          &Value::from(-16.0),
    ///                                          &Value::from(28.0),
    ///                                          at).unwrap();
    /// assert_eq!(unsigned, Value::from(15.0));
    /// ```
    #[allow(clippy::cast_sign_loss)]
    #[allow(clippy::cast_possible_wrap)]
    pub fn eval_bitwise(op: BitwiseOperator,
                        left: &Value,
                        right: &Value,
                        location: SourceLocation)
                        -> EvalResult<Value> {
        use BitwiseOperator::{And, Or, ShiftLeft, ShiftRight, UnsignedShiftRight, Xor};

        match (left, right) {
            (Value::Bool(a), Value::Bool(b)) => match op {
                And => Ok(Value::Bool(a & b)),
                Or => Ok(Value::Bool(a | b)),
                Xor => Ok(Value::Bool(a ^ b)),
                _ => Err(RuntimeError::type_mismatch(format!("cannot use {op} on booleans"),
                                                     location)),
            },
            (Value::Number(a), Value::Number(b)) => {
                let (a, b) = (truncate_to_i32(*a), truncate_to_i32(*b));
                let result = match op {
                    And => a & b,
                    Or => a | b,
                    Xor => a ^ b,
                    ShiftLeft => a.wrapping_shl(b as u32),
                    ShiftRight => a.wrapping_shr(b as u32),
                    UnsignedShiftRight => (a as u32).wrapping_shr(b as u32) as i32,
                };
                Ok(Value::Number(f64::from(result)))
            },
            _ => Err(RuntimeError::type_mismatch(format!("cannot use {op} on {} and {}",
                                                         left.type_name(),
                                                         right.type_name()),
                                                 location)),
        }
    }

    /// Evaluates a built-in prefix operator.
    ///
    /// `!` works on any value through truthiness. `-` negates a number and
    /// `~` complements its 32-bit truncation.
    ///
    /// # Example
    /// ```
    /// use hsl::{
    ///     ast::UnaryOperator,
    ///     interpreter::{evaluator::core::Interpreter, token::SourceLocation, value::core::Value},
    /// };
    ///
    /// let at = SourceLocation::new(1, 1);
    /// assert_eq!(Interpreter::eval_unary(UnaryOperator::Not, &Value::Nil, at).unwrap(),
    ///            Value::Bool(true));
    /// assert_eq!(Interpreter::eval_unary(UnaryOperator::Complement, &Value::from(5.0), at).unwrap(),
    ///            Value::from(-6.0));
    /// ```
    pub fn eval_unary(op: UnaryOperator, operand: &Value, location: SourceLocation) -> EvalResult<Value> {
        match (op, operand) {
            (UnaryOperator::Not, value) => Ok(Value::Bool(!value.is_truthy())),
            (UnaryOperator::Negate, Value::Number(n)) => Ok(Value::Number(-n)),
            (UnaryOperator::Complement, Value::Number(n)) => {
                Ok(Value::Number(f64::from(!truncate_to_i32(*n))))
            },
            (_, value) => {
                let symbol = if op == UnaryOperator::Negate { '-' } else { '~' };
                Err(RuntimeError::type_mismatch(format!("cannot apply '{symbol}' to {}",
                                                        value.type_name()),
                                                location))
            },
        }
    }
}

fn mismatch(op: BinaryOperator, left: &Value, right: &Value, location: SourceLocation) -> RuntimeError {
    RuntimeError::type_mismatch(format!("cannot use '{op}' on {} and {}",
                                        left.type_name(),
                                        right.type_name()),
                                location)
}
