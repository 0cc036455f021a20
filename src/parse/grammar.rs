use winnow::combinator::{alt, cut_err, delimited, not, opt, preceded, repeat, separated,
    terminated};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use crate::types::{BinaryOp, Expr, UnaryOp};

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

fn ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// -- Identifiers ------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., ident_char),
    )
        .take()
        .parse_next(input)
}

// -- Literals ---------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    let quote = one_of(['\'', '"']).parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        if ch == quote {
            return Ok(s);
        }
        match ch {
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '\'' => s.push('\''),
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn float_literal(input: &mut &str) -> ModalResult<f64> {
    // Only match floats that contain a decimal point
    (
        take_while(1.., |c: char| c.is_ascii_digit()),
        '.',
        take_while(1.., |c: char| c.is_ascii_digit()),
    )
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

fn int_literal(input: &mut &str) -> ModalResult<i64> {
    take_while(1.., |c: char| c.is_ascii_digit())
        .try_map(|s: &str| s.parse::<i64>())
        .parse_next(input)
}

// -- Operators --------------------------------------------------------------

fn or_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt((
        "||".value(BinaryOp::Or),
        terminated("or", not(one_of(ident_char))).value(BinaryOp::Or),
    ))
    .parse_next(input)
}

fn and_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt((
        "&&".value(BinaryOp::And),
        terminated("and", not(one_of(ident_char))).value(BinaryOp::And),
    ))
    .parse_next(input)
}

fn bit_or_op(input: &mut &str) -> ModalResult<BinaryOp> {
    terminated('|', not('|')).value(BinaryOp::BitOr).parse_next(input)
}

fn bit_xor_op(input: &mut &str) -> ModalResult<BinaryOp> {
    '^'.value(BinaryOp::BitXor).parse_next(input)
}

fn bit_and_op(input: &mut &str) -> ModalResult<BinaryOp> {
    terminated('&', not('&')).value(BinaryOp::BitAnd).parse_next(input)
}

fn equality_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt((
        "==".value(BinaryOp::Eq),
        "!=".value(BinaryOp::NotEq),
        "<>".value(BinaryOp::NotEq),
        terminated('=', not('=')).value(BinaryOp::Eq),
    ))
    .parse_next(input)
}

fn relational_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt((
        "<=".value(BinaryOp::LtEq),
        ">=".value(BinaryOp::GtEq),
        terminated('<', not(one_of(['<', '>']))).value(BinaryOp::Lt),
        terminated('>', not('>')).value(BinaryOp::Gt),
    ))
    .parse_next(input)
}

fn shift_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt(("<<".value(BinaryOp::Shl), ">>".value(BinaryOp::Shr))).parse_next(input)
}

fn additive_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt(('+'.value(BinaryOp::Plus), '-'.value(BinaryOp::Minus))).parse_next(input)
}

fn multiplicative_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt((
        '*'.value(BinaryOp::Times),
        '/'.value(BinaryOp::Div),
        '%'.value(BinaryOp::Modulo),
    ))
    .parse_next(input)
}

// -- Expression levels (loosest binding first) ------------------------------

pub(super) fn expression(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    ternary(input)
}

fn ternary(input: &mut &str) -> ModalResult<Expr> {
    let condition = or_expr(input)?;
    ws.parse_next(input)?;
    if opt('?').parse_next(input)?.is_some() {
        let then = cut_err(ternary)
            .context(StrContext::Expected(StrContextValue::Description(
                "ternary consequent",
            )))
            .parse_next(input)?;
        ws.parse_next(input)?;
        cut_err(':').parse_next(input)?;
        let otherwise = cut_err(ternary)
            .context(StrContext::Expected(StrContextValue::Description(
                "ternary alternative",
            )))
            .parse_next(input)?;
        Ok(Expr::ternary(condition, then, otherwise))
    } else {
        Ok(condition)
    }
}

fn fold_binary(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    rest.into_iter()
        .fold(first, |acc, (op, rhs)| Expr::binary(op, acc, rhs))
}

fn or_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = and_expr(input)?;
    let rest = repeat(0.., (preceded(ws, or_op), cut_err(and_expr))).parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = bit_or_expr(input)?;
    let rest = repeat(0.., (preceded(ws, and_op), cut_err(bit_or_expr))).parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn bit_or_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = bit_xor_expr(input)?;
    let rest = repeat(0.., (preceded(ws, bit_or_op), cut_err(bit_xor_expr))).parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn bit_xor_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = bit_and_expr(input)?;
    let rest = repeat(0.., (preceded(ws, bit_xor_op), cut_err(bit_and_expr))).parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn bit_and_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = equality(input)?;
    let rest = repeat(0.., (preceded(ws, bit_and_op), cut_err(equality))).parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn equality(input: &mut &str) -> ModalResult<Expr> {
    let first = relational(input)?;
    let rest = repeat(0.., (preceded(ws, equality_op), cut_err(relational))).parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn relational(input: &mut &str) -> ModalResult<Expr> {
    let first = shift(input)?;
    let rest = repeat(0.., (preceded(ws, relational_op), cut_err(shift))).parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn shift(input: &mut &str) -> ModalResult<Expr> {
    let first = additive(input)?;
    let rest = repeat(0.., (preceded(ws, shift_op), cut_err(additive))).parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn additive(input: &mut &str) -> ModalResult<Expr> {
    let first = multiplicative(input)?;
    let rest =
        repeat(0.., (preceded(ws, additive_op), cut_err(multiplicative))).parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn multiplicative(input: &mut &str) -> ModalResult<Expr> {
    let first = unary(input)?;
    let rest = repeat(0.., (preceded(ws, multiplicative_op), cut_err(unary))).parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn unary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    let op = opt(alt((
        '!'.value(UnaryOp::Not),
        '-'.value(UnaryOp::Negate),
        '~'.value(UnaryOp::BitNot),
    )))
    .parse_next(input)?;
    match op {
        Some(op) => {
            let operand = cut_err(unary).parse_next(input)?;
            Ok(Expr::unary(op, operand))
        }
        None => postfix(input),
    }
}

/// Member, call, and index chains: `a.b`, `a.b(x)`, `a.b[i]`, `a[i]`.
///
/// A `.name[index]` segment folds into a member whose right side is an
/// indexer over the plain identifier: the index applies to the named member
/// of the object, not to the whole chain so far. A bare `[index]` applies to
/// the accumulated chain.
fn postfix(input: &mut &str) -> ModalResult<Expr> {
    let mut acc = primary(input)?;
    loop {
        let checkpoint = input.checkpoint();
        ws.parse_next(input)?;
        if opt('.').parse_next(input)?.is_some() {
            ws.parse_next(input)?;
            let name = cut_err(ident)
                .context(StrContext::Expected(StrContextValue::Description(
                    "member name",
                )))
                .parse_next(input)?;
            if let Some(args) = opt(call_args).parse_next(input)? {
                acc = Expr::member(acc, Expr::function(name, args));
            } else if opt(preceded(ws, '[')).parse_next(input)?.is_some() {
                let index = cut_err(expression).parse_next(input)?;
                ws.parse_next(input)?;
                cut_err(']').parse_next(input)?;
                acc = Expr::member(acc, Expr::indexer(Expr::identifier(name), index));
            } else {
                acc = Expr::member(acc, Expr::identifier(name));
            }
        } else if opt('[').parse_next(input)?.is_some() {
            let index = cut_err(expression).parse_next(input)?;
            ws.parse_next(input)?;
            cut_err(']').parse_next(input)?;
            acc = Expr::indexer(acc, index);
        } else {
            input.reset(&checkpoint);
            return Ok(acc);
        }
    }
}

fn call_args(input: &mut &str) -> ModalResult<Vec<Expr>> {
    '('.parse_next(input)?;
    ws.parse_next(input)?;
    if opt(')').parse_next(input)?.is_some() {
        return Ok(Vec::new());
    }
    let args: Vec<Expr> =
        separated(1.., expression, (ws, ',')).parse_next(input)?;
    ws.parse_next(input)?;
    cut_err(')')
        .context(StrContext::Expected(StrContextValue::CharLiteral(')')))
        .parse_next(input)?;
    Ok(args)
}

fn primary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    alt((
        delimited('(', expression, (ws, cut_err(')'))),
        string_literal.map(|s| Expr::value(s)),
        float_literal.map(Expr::value),
        int_literal.map(Expr::value),
        delimited(('[', ws), ident, (ws, cut_err(']'))).map(Expr::identifier),
        ident_or_call,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

fn ident_or_call(input: &mut &str) -> ModalResult<Expr> {
    let name = ident.parse_next(input)?;
    match opt(call_args).parse_next(input)? {
        Some(args) => Ok(Expr::function(name, args)),
        None => Ok(Expr::identifier(name)),
    }
}
