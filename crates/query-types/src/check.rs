//! Query typechecking.

use fnv::FnvHashMap;
use rayon::prelude::*;

use crate::config::Config;
use crate::error::{Result, TypeError, TypeErrorKind};
use crate::field::FieldType;
use crate::query::TypedQuery;
use crate::syntax::{Expr, Query, TokenKind};
use crate::unquote::unquote_string;
use crate::value::{Value, ValueData};

impl Config {
    /// Typechecks `query` for field and type validity.
    ///
    /// Expressions are checked in order and the first error aborts the
    /// check.
    pub fn check<'a>(&self, query: &'a Query) -> Result<TypedQuery<'a>> {
        let mut fields: FnvHashMap<String, Vec<Value<'a>>> = FnvHashMap::default();

        for expr in &query.exprs {
            let (field, field_type, value) = self.check_expr(expr)?;
            let values = fields.entry(field.to_string()).or_default();
            if field_type.is_singular() && !values.is_empty() {
                return Err(TypeError::new(
                    expr.pos,
                    TypeErrorKind::DuplicateField(field.to_string()),
                ));
            }
            values.push(value);
        }

        Ok(TypedQuery::new(query, fields))
    }

    /// Typechecks many queries in parallel. Results are in input order.
    pub fn check_all<'a>(&self, queries: &'a [Query]) -> Vec<Result<TypedQuery<'a>>> {
        queries.par_iter().map(|query| self.check(query)).collect()
    }

    fn check_expr<'a>(&self, expr: &'a Expr) -> Result<(&str, &FieldType, Value<'a>)> {
        let at = |kind: TypeErrorKind| TypeError::new(expr.pos, kind);

        let (field, field_type) = self.resolve_field(&expr.field, expr.not).map_err(at)?;
        log::trace!("checking {expr} as field {field:?}");

        let target = field_type.value_type_for(expr.value_type);
        let data = match expr.value_type {
            TokenKind::Literal | TokenKind::Pattern => ValueData::coerce(&expr.value, target),
            TokenKind::Quoted => unquote_string(&expr.value)
                .and_then(|unquoted| ValueData::coerce(&unquoted, target)),
        }
        .map_err(at)?;

        Ok((field, field_type, Value::new(expr, data)))
    }
}
