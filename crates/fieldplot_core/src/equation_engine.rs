use crate::traits::{Scalar, ScalarFunction};
use anyhow::{bail, Context, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts;
use std::fmt;
use thiserror::Error;

/// Failures while turning user text into bytecode.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),
    #[error("unexpected token {0}")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("unexpected input after expression: {0}")]
    TrailingInput(String),
    #[error("expression nests deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error("expression is longer than {0} tokens")]
    TooLong(usize),
}

/// Deepest nesting of parentheses, operators and calls the parser accepts.
pub const MAX_DEPTH: usize = 256;

/// Longest token sequence the parser accepts.
pub const MAX_TOKENS: usize = 10_000;

/// OpCodes for the Stack-based Virtual Machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpCode {
    /// Pushes a constant `f64` value onto the stack.
    LoadConst(f64),
    /// Pushes the value of a variable (by index) onto the stack.
    /// Indices follow the order the variables were declared to the compiler.
    LoadVar(usize),
    /// Pops top two values (b, a), pushes (a + b).
    Add,
    /// Pops top two values (b, a), pushes (a - b).
    Sub,
    /// Pops top two values (b, a), pushes (a * b).
    Mul,
    /// Pops top two values (b, a), pushes (a / b).
    Div,
    /// Pops top two values (b, a), pushes (a ^ b).
    Pow,
    /// Pops top value (a), pushes -a.
    Neg,
    Sin,
    Cos,
    Tan,
    Exp,
    /// Natural logarithm (`log` and `ln` both compile to this).
    Ln,
    Log10,
    Sqrt,
    Abs,
}

/// Represents a compiled sequence of operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bytecode {
    pub ops: Vec<OpCode>,
}

impl Bytecode {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }
}

/// Stack-based Virtual Machine for evaluating expressions.
///
/// The VM is stateless; `execute` takes all necessary context:
/// - `bytecode`: Instructions to run.
/// - `vars`: Variable values, indexed as declared to the [`Compiler`].
/// - `stack`: A mutable buffer for intermediate computations.
///
/// Malformed bytecode (stack underflow, a missing variable) evaluates to NaN.
pub struct VM;

impl VM {
    pub fn execute<T: Scalar>(bytecode: &Bytecode, vars: &[T], stack: &mut Vec<T>) -> T {
        stack.clear();
        Self::run(bytecode, vars, stack).unwrap_or_else(T::nan)
    }

    fn run<T: Scalar>(bytecode: &Bytecode, vars: &[T], stack: &mut Vec<T>) -> Option<T> {
        for op in &bytecode.ops {
            let value = match *op {
                OpCode::LoadConst(val) => T::from_f64(val)?,
                OpCode::LoadVar(idx) => *vars.get(idx)?,
                OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div | OpCode::Pow => {
                    let b = stack.pop()?;
                    let a = stack.pop()?;
                    match op {
                        OpCode::Add => a + b,
                        OpCode::Sub => a - b,
                        OpCode::Mul => a * b,
                        OpCode::Div => a / b,
                        _ => a.powf(b),
                    }
                }
                unary => {
                    let a = stack.pop()?;
                    match unary {
                        OpCode::Neg => -a,
                        OpCode::Sin => a.sin(),
                        OpCode::Cos => a.cos(),
                        OpCode::Tan => a.tan(),
                        OpCode::Exp => a.exp(),
                        OpCode::Ln => a.ln(),
                        OpCode::Log10 => a.log10(),
                        OpCode::Sqrt => a.sqrt(),
                        _ => a.abs(),
                    }
                }
            };
            stack.push(value);
        }
        stack.pop()
    }
}

// --- AST & Parser ---

/// Abstract Syntax Tree nodes for expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Binary(Box<Expr>, char, Box<Expr>), // char is operator +, -, *, /, ^
    Unary(char, Box<Expr>),             // only '-'
    Call(String, Box<Expr>),            // functions like sin(x)
}

/// Compiles an AST (`Expr`) into `Bytecode`.
///
/// Names resolve to variables first, then to the built-in constants `pi`
/// and `e`, so a variable called `e` shadows Euler's number.
pub struct Compiler {
    pub var_map: HashMap<String, usize>,
}

impl Compiler {
    pub fn new(var_names: &[&str]) -> Self {
        let var_map = var_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();
        Self { var_map }
    }

    pub fn compile(&self, expr: &Expr) -> Result<Bytecode, ExpressionError> {
        let mut ops = Vec::new();
        self.compile_recursive(expr, &mut ops)?;
        Ok(Bytecode { ops })
    }

    fn compile_recursive(&self, expr: &Expr, ops: &mut Vec<OpCode>) -> Result<(), ExpressionError> {
        match expr {
            Expr::Number(n) => ops.push(OpCode::LoadConst(*n)),
            Expr::Variable(name) => {
                if let Some(&idx) = self.var_map.get(name) {
                    ops.push(OpCode::LoadVar(idx));
                } else {
                    let value = constant(name)
                        .ok_or_else(|| ExpressionError::UnknownSymbol(name.clone()))?;
                    ops.push(OpCode::LoadConst(value));
                }
            }
            Expr::Binary(left, op, right) => {
                self.compile_recursive(left, ops)?;
                self.compile_recursive(right, ops)?;
                ops.push(match op {
                    '+' => OpCode::Add,
                    '-' => OpCode::Sub,
                    '*' => OpCode::Mul,
                    '/' => OpCode::Div,
                    '^' => OpCode::Pow,
                    other => return Err(ExpressionError::UnexpectedToken(format!("'{other}'"))),
                });
            }
            Expr::Unary(op, operand) => {
                self.compile_recursive(operand, ops)?;
                match op {
                    '-' => ops.push(OpCode::Neg),
                    other => return Err(ExpressionError::UnexpectedToken(format!("'{other}'"))),
                }
            }
            Expr::Call(func, arg) => {
                let op = function(func).ok_or_else(|| ExpressionError::UnknownFunction(func.clone()))?;
                self.compile_recursive(arg, ops)?;
                ops.push(op);
            }
        }
        Ok(())
    }
}

fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(consts::PI),
        "e" => Some(consts::E),
        _ => None,
    }
}

fn function(name: &str) -> Option<OpCode> {
    Some(match name {
        "sin" => OpCode::Sin,
        "cos" => OpCode::Cos,
        "tan" => OpCode::Tan,
        "exp" => OpCode::Exp,
        "log" | "ln" => OpCode::Ln,
        "log10" => OpCode::Log10,
        "sqrt" => OpCode::Sqrt,
        "abs" => OpCode::Abs,
        _ => return None,
    })
}

// --- Simple Parser ---

/// Parses a string expression into an AST.
///
/// Juxtaposition is multiplication, so `7t`, `2pi` and `2(t + 1)` parse
/// as products. `^` binds tighter than unary minus and is right
/// associative: `-t^2` is `-(t^2)`.
///
/// Input longer than [`MAX_TOKENS`] or nesting deeper than [`MAX_DEPTH`] is
/// rejected, so the compiler's recursion stays bounded.
pub fn parse(input: &str) -> Result<Expr, ExpressionError> {
    let tokens = tokenize(input)?;
    if tokens.len() > MAX_TOKENS {
        return Err(ExpressionError::TooLong(MAX_TOKENS));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_expression()?;
    if let Some(token) = parser.peek() {
        return Err(ExpressionError::TrailingInput(token.to_string()));
    }
    // Operator chains like `t+t+...+t` nest without recursing in the parser.
    if tree_depth(&expr) > MAX_DEPTH {
        return Err(ExpressionError::NestingTooDeep(MAX_DEPTH));
    }
    Ok(expr)
}

fn tree_depth(expr: &Expr) -> usize {
    let mut deepest = 0;
    let mut pending = vec![(expr, 1)];
    while let Some((node, depth)) = pending.pop() {
        deepest = deepest.max(depth);
        match node {
            Expr::Binary(left, _, right) => {
                pending.push((&**left, depth + 1));
                pending.push((&**right, depth + 1));
            }
            Expr::Unary(_, operand) | Expr::Call(_, operand) => {
                pending.push((&**operand, depth + 1));
            }
            Expr::Number(_) | Expr::Variable(_) => {}
        }
    }
    deepest
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl Token {
    /// Tokens that may begin an operand, and therefore an implicit product.
    fn starts_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Identifier(_) | Token::LParen)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Identifier(name) => write!(f, "'{name}'"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::Caret => write!(f, "'^'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            // Exponent only when digits follow, so `2e` stays `2 * e`.
            if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                let mut j = i + 1;
                if j < chars.len() && matches!(chars[j], '+' | '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let literal: String = chars[start..i].iter().collect();
            let value = literal
                .parse()
                .map_err(|_| ExpressionError::InvalidNumber(literal.clone()))?;
            tokens.push(Token::Number(value));
        } else if c.is_alphabetic() {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Identifier(chars[start..i].iter().collect()));
        } else {
            tokens.push(match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '^' => Token::Caret,
                '(' => Token::LParen,
                ')' => Token::RParen,
                other => return Err(ExpressionError::UnexpectedCharacter(other)),
            });
            i += 1;
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_rparen(&mut self) -> Result<(), ExpressionError> {
        match self.consume() {
            Some(Token::RParen) => Ok(()),
            Some(other) => Err(ExpressionError::UnexpectedToken(other.to_string())),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, ExpressionError> {
        self.parse_term()
    }

    fn parse_term(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_factor()?;

        while let Some(token) = self.peek() {
            let op = match token {
                Token::Plus => '+',
                Token::Minus => '-',
                _ => break,
            };
            self.consume();
            let right = self.parse_factor()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_unary()?;

        while let Some(token) = self.peek() {
            let op = match token {
                Token::Star | Token::Slash => {
                    let op = if *token == Token::Star { '*' } else { '/' };
                    self.consume();
                    op
                }
                t if t.starts_operand() => '*',
                _ => break,
            };
            let right = self.parse_unary()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    /// Every recursive path (parentheses, calls, `^`, prefix signs) passes
    /// through here, so this is where nesting is counted.
    fn parse_unary(&mut self) -> Result<Expr, ExpressionError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExpressionError::NestingTooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let expr = self.parse_signed();
        self.depth -= 1;
        expr
    }

    fn parse_signed(&mut self) -> Result<Expr, ExpressionError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.consume();
                let expr = self.parse_unary()?;
                Ok(Expr::Unary('-', Box::new(expr)))
            }
            Some(Token::Plus) => {
                self.consume();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, ExpressionError> {
        let base = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.consume();
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary(Box::new(base), '^', Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExpressionError> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Identifier(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.consume(); // eat '('
                    let arg = self.parse_expression()?;
                    self.expect_rparen()?;
                    Ok(Expr::Call(name, Box::new(arg)))
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Some(Token::LParen) => {
                let expr = self.parse_expression()?;
                self.expect_rparen()?;
                Ok(expr)
            }
            Some(other) => Err(ExpressionError::UnexpectedToken(other.to_string())),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }
}

// --- CompiledExpression ---

/// Parsed and compiled user text, ready to evaluate.
///
/// Holds its own VM stack behind a `RefCell` so evaluation through `&self`
/// does not allocate. This makes the expression `!Sync`.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    bytecode: Bytecode,
    arity: usize,
    stack: RefCell<Vec<f64>>,
}

impl CompiledExpression {
    /// Compiles `source` with the given variable names, in evaluation order.
    pub fn compile(source: &str, vars: &[&str]) -> Result<Self, ExpressionError> {
        let expr = parse(source)?;
        let bytecode = Compiler::new(vars).compile(&expr)?;
        Ok(Self {
            source: source.to_string(),
            bytecode,
            arity: vars.len(),
            stack: RefCell::new(Vec::with_capacity(16)),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Evaluates with `vars` in declaration order. Missing variables give NaN.
    pub fn eval(&self, vars: &[f64]) -> f64 {
        let mut stack = self.stack.borrow_mut();
        VM::execute(&self.bytecode, vars, &mut stack)
    }
}

/// Single-variable expressions act as `t -> f(t)` for parametric curves.
impl ScalarFunction for CompiledExpression {
    fn evaluate(&self, t: f64) -> f64 {
        self.eval(&[t])
    }
}

/// Evaluates closed text such as `2pi` or `0.001` to a finite number.
pub fn evaluate_constant(text: &str) -> Result<f64> {
    let expr = CompiledExpression::compile(text, &[])
        .with_context(|| format!("cannot read a number from `{text}`"))?;
    let value = expr.eval(&[]);
    if !value.is_finite() {
        bail!("`{text}` does not evaluate to a finite number");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str, t: f64) -> f64 {
        CompiledExpression::compile(source, &["t"])
            .expect("expression should compile")
            .evaluate(t)
    }

    #[test]
    fn respects_precedence_and_associativity() {
        assert_eq!(eval("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval("(1 + 2) * 3", 0.0), 9.0);
        assert_eq!(eval("2^3^2", 0.0), 512.0);
        assert_eq!(eval("10 - 4 - 3", 0.0), 3.0);
        assert_eq!(eval("-t^2", 3.0), -9.0);
        assert_eq!(eval("8 / 2 / 2", 0.0), 2.0);
    }

    #[test]
    fn juxtaposition_multiplies() {
        assert!((eval("2pi", 0.0) - 2.0 * consts::PI).abs() < 1e-12);
        assert!((eval("cos(7t)", 0.5) - (3.5f64).cos()).abs() < 1e-12);
        assert!((eval("sin(11t)", 0.2) - (2.2f64).sin()).abs() < 1e-12);
        assert_eq!(eval("2(t + 1)", 2.0), 6.0);
        assert_eq!(eval("3t^2", 2.0), 12.0);
    }

    #[test]
    fn constants_and_functions() {
        assert!((eval("e", 0.0) - consts::E).abs() < 1e-12);
        assert!((eval("log(e)", 0.0) - 1.0).abs() < 1e-12);
        assert!((eval("ln(e^2)", 0.0) - 2.0).abs() < 1e-12);
        assert!((eval("log10(1000)", 0.0) - 3.0).abs() < 1e-12);
        assert_eq!(eval("sqrt(abs(-16))", 0.0), 4.0);
        assert!((eval("tan(pi/4)", 0.0) - 1.0).abs() < 1e-12);
        assert!((eval("exp(1)", 0.0) - consts::E).abs() < 1e-12);
    }

    #[test]
    fn scientific_literals_need_exponent_digits() {
        assert_eq!(eval("1e-3", 0.0), 0.001);
        assert_eq!(eval("2.5E2", 0.0), 250.0);
        assert!((eval("2e", 0.0) - 2.0 * consts::E).abs() < 1e-12);
    }

    #[test]
    fn variables_shadow_constants() {
        let expr = CompiledExpression::compile("e + 1", &["e"]).expect("compiles");
        assert_eq!(expr.eval(&[4.0]), 5.0);
    }

    #[test]
    fn two_variable_expressions_follow_declaration_order() {
        let expr = CompiledExpression::compile("-y + 0.1yp", &["y", "yp"]).expect("compiles");
        assert_eq!(expr.arity(), 2);
        assert!((expr.eval(&[2.0, 10.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_variable_values_evaluate_to_nan() {
        let expr = CompiledExpression::compile("x + y", &["x", "y"]).expect("compiles");
        assert!(expr.eval(&[1.0]).is_nan());
    }

    #[test]
    fn reports_errors_instead_of_panicking() {
        let compile = |s: &str| CompiledExpression::compile(s, &["t"]).map(|_| ());
        assert_eq!(compile(""), Err(ExpressionError::UnexpectedEnd));
        assert_eq!(compile("sin(t"), Err(ExpressionError::UnexpectedEnd));
        assert_eq!(compile("1 +"), Err(ExpressionError::UnexpectedEnd));
        assert_eq!(compile("t)"), Err(ExpressionError::TrailingInput("')'".into())));
        assert_eq!(compile("q + 1"), Err(ExpressionError::UnknownSymbol("q".into())));
        assert_eq!(compile("foo(t)"), Err(ExpressionError::UnknownFunction("foo".into())));
        assert_eq!(compile("1.2.3"), Err(ExpressionError::InvalidNumber("1.2.3".into())));
        assert_eq!(compile("t # 2"), Err(ExpressionError::UnexpectedCharacter('#')));
        assert_eq!(compile("* t"), Err(ExpressionError::UnexpectedToken("'*'".into())));
    }

    #[test]
    fn deep_nesting_is_an_error_not_a_crash() {
        let compile = |s: &str| CompiledExpression::compile(s, &["t"]).map(|_| ());
        let nested = format!("{}t{}", "(".repeat(300), ")".repeat(300));
        assert_eq!(compile(&nested), Err(ExpressionError::NestingTooDeep(MAX_DEPTH)));
        let signs = format!("{}t", "-".repeat(300));
        assert_eq!(compile(&signs), Err(ExpressionError::NestingTooDeep(MAX_DEPTH)));
        let chain = format!("t{}", "+t".repeat(300));
        assert_eq!(compile(&chain), Err(ExpressionError::NestingTooDeep(MAX_DEPTH)));

        let huge = format!("{}t{}", "(".repeat(50_000), ")".repeat(50_000));
        assert_eq!(compile(&huge), Err(ExpressionError::TooLong(MAX_TOKENS)));

        let modest = format!("{}t{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(eval(&modest, 3.0), 3.0);
        assert_eq!(eval(&format!("t{}", "+t".repeat(100)), 1.0), 101.0);
    }

    #[test]
    fn vm_underflow_yields_nan() {
        let bytecode = Bytecode {
            ops: vec![OpCode::LoadConst(1.0), OpCode::Add],
        };
        let mut stack = Vec::new();
        assert!(VM::execute::<f64>(&bytecode, &[], &mut stack).is_nan());
        assert!(VM::execute::<f64>(&Bytecode::new(), &[], &mut stack).is_nan());
    }

    #[test]
    fn constant_text_evaluates_to_numbers() {
        assert!((evaluate_constant("2pi").expect("number") - 2.0 * consts::PI).abs() < 1e-12);
        assert_eq!(evaluate_constant("0.001").expect("number"), 0.001);
        assert!(evaluate_constant("t").is_err());
        assert!(evaluate_constant("1/0").is_err());
        assert!(evaluate_constant("").is_err());
    }
}
