//! Translation of predicate expressions into `$filter` text
//!
//! The translator walks a [`Filter`] tree and appends to a single output
//! buffer in visitation order. A fresh translator is used for every
//! expression, so no state leaks between translations.
//!
//! The output is ready to sit in a query string: string literals are
//! percent-encoded, everything else is plain text.

use super::filters::{BinaryOperator, Filter};
use crate::api::metadata::capitalize;
use crate::error::{Error, Result};

/// Text-matching functions the API understands, matched case-insensitively
const TEXT_FUNCTIONS: &[&str] = &["startswith", "endswith", "contains"];

/// Walks one predicate and renders it as API filter text
#[derive(Debug, Default)]
pub struct Translator {
    output: String,
}

impl Translator {
    /// Translate a predicate into filter text
    pub fn translate(filter: &Filter) -> Result<String> {
        let mut translator = Translator::default();
        translator.visit(filter)?;
        Ok(translator.output)
    }

    fn visit(&mut self, filter: &Filter) -> Result<()> {
        match filter {
            Filter::Field(name) => {
                self.output.push_str(&capitalize(name));
            }
            Filter::Value(value) => {
                self.output.push_str(&value.to_uri_literal());
            }
            Filter::Binary { left, op, right } => {
                let token = operator_token(*op)?;
                self.output.push('(');
                self.visit(left)?;
                self.output.push(' ');
                self.output.push_str(token);
                self.output.push(' ');
                self.visit(right)?;
                self.output.push(')');
            }
            Filter::Not(inner) => {
                self.output.push_str("not ");
                self.visit(inner)?;
            }
            Filter::Call {
                function,
                target,
                args,
            } => self.visit_call(function, target, args)?,
        }
        Ok(())
    }

    fn visit_call(&mut self, function: &str, target: &Filter, args: &[Filter]) -> Result<()> {
        let name = function.to_lowercase();
        if !TEXT_FUNCTIONS.contains(&name.as_str()) {
            return Err(Error::query_translation(format!(
                "function '{}' cannot be translated",
                function
            )));
        }

        let Filter::Field(field) = target else {
            return Err(Error::query_translation(format!(
                "'{}' must be called on a field",
                function
            )));
        };

        let argument = match args {
            [Filter::Value(value)] => value,
            _ => {
                return Err(Error::query_translation(format!(
                    "'{}' takes exactly one literal argument",
                    function
                )));
            }
        };

        self.output.push_str(&format!(
            "{}({},{})",
            name,
            capitalize(field),
            argument.to_uri_literal()
        ));
        Ok(())
    }
}

/// Map an operator to its filter token, failing for operators outside the
/// API's grammar
pub fn operator_token(op: BinaryOperator) -> Result<&'static str> {
    let token = match op {
        BinaryOperator::Equal => "eq",
        BinaryOperator::NotEqual => "ne",
        BinaryOperator::LessThan => "lt",
        BinaryOperator::LessThanOrEqual => "le",
        BinaryOperator::GreaterThan => "gt",
        BinaryOperator::GreaterThanOrEqual => "ge",
        BinaryOperator::And | BinaryOperator::AndAlso => "and",
        BinaryOperator::Or | BinaryOperator::OrElse => "or",
        other => return Err(Error::UnsupportedOperator(other.to_string())),
    };
    Ok(token)
}
