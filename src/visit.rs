//! Writers that build nothing: validation and authorization listing.

use std::borrow::Cow;

use crate::{
    Span,
    error::{Error, Result},
    lex::AuthorizationToken,
    traits::{AuthorizationValidator, ExpressionWriter, Operator},
};

/// The logical value of `token`, provided the content policy accepts it.
pub(crate) fn checked_value<'e>(
    validator: &dyn AuthorizationValidator,
    token: &AuthorizationToken<'e>,
) -> Result<Cow<'e, str>> {
    let value = token.value()?;
    if validator.is_valid(&value, token.character_set()) {
        Ok(value)
    } else {
        Err(Error::invalid_authorization(value.into_owned()))
    }
}

/// Checks structure and content, producing nothing.
pub(crate) struct ValidationWriter<'v> {
    pub validator: &'v dyn AuthorizationValidator,
}

impl<'e> ExpressionWriter<'e> for ValidationWriter<'_> {
    type Node = ();
    type Group = ();

    fn empty(&mut self) -> Result<()> {
        Ok(())
    }

    fn authorization(&mut self, token: &AuthorizationToken<'e>, _live: bool) -> Result<()> {
        checked_value(self.validator, token).map(|_| ())
    }

    fn start_group(&mut self, _op: Operator, _first: (), _span: Span) {}

    fn is_live(&self, _group: &()) -> bool {
        true
    }

    fn push(&mut self, _group: &mut (), _node: (), _span: Span) {}

    fn finish_group(&mut self, _group: (), _span: Span) -> Result<()> {
        Ok(())
    }
}

/// Hands every authorization occurrence, unescaped, to a callback in
/// source order.
pub(crate) struct FindWriter<'v, F> {
    pub validator: &'v dyn AuthorizationValidator,
    pub visit: F,
}

impl<'e, F: FnMut(&str)> ExpressionWriter<'e> for FindWriter<'_, F> {
    type Node = ();
    type Group = ();

    fn empty(&mut self) -> Result<()> {
        Ok(())
    }

    fn authorization(&mut self, token: &AuthorizationToken<'e>, _live: bool) -> Result<()> {
        let value = checked_value(self.validator, token)?;
        (self.visit)(&value);
        Ok(())
    }

    fn start_group(&mut self, _op: Operator, _first: (), _span: Span) {}

    fn is_live(&self, _group: &()) -> bool {
        true
    }

    fn push(&mut self, _group: &mut (), _node: (), _span: Span) {}

    fn finish_group(&mut self, _group: (), _span: Span) -> Result<()> {
        Ok(())
    }
}
