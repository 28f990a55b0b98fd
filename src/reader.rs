use crate::{
    Span,
    constants::{CLOSE_PAREN, OPEN_PAREN},
    error::{Error, Result},
    lex::Tokenizer,
    traits::{ExpressionWriter, Operator},
};

// ============================================================================
// Recursive-Descent Reader
// ============================================================================

/// Walks an access expression once, left to right, handing every leaf and
/// every run of siblings to an [`ExpressionWriter`].
///
/// Grammar reference:
///
/// ```text
/// access_expression := "" | expression
/// expression        := and_expression | or_expression
///                    | "(" expression ")" | access_token
/// and_expression    := term ("&" term)+
/// or_expression     := term ("|" term)+
/// term              := access_token | "(" expression ")"
/// ```
///
/// Precedence is carried by parentheses only: a run that meets the other
/// operator is rejected instead of being regrouped.
pub struct Reader<'e> {
    tokenizer: Tokenizer<'e>,
    max_depth: u32,
}

impl<'e> Reader<'e> {
    #[inline]
    pub fn new(expression: &'e [u8], max_depth: u32) -> Self {
        Self {
            tokenizer: Tokenizer::new(expression),
            max_depth,
        }
    }

    /// Read the whole input as an `<access_expression>`.
    pub fn read<W: ExpressionWriter<'e>>(mut self, writer: &mut W) -> Result<W::Node> {
        if !self.tokenizer.has_next() {
            return writer.empty();
        }

        let (node, _) = self.expression(writer, true, 0)?;

        if self.tokenizer.has_next() {
            return Err(self.tokenizer.error(format!(
                "Unexpected character '{}'",
                self.tokenizer.current_char()
            )));
        }
        Ok(node)
    }

    /// Parse an `<expression>`: one term, or a maximal run of terms joined
    /// by the same operator.
    fn expression<W: ExpressionWriter<'e>>(
        &mut self,
        writer: &mut W,
        live: bool,
        depth: u32,
    ) -> Result<(W::Node, Span)> {
        let (first, first_span) = self.term(writer, live, depth)?;

        let Some(op) = self.tokenizer.peek().and_then(Operator::from_byte) else {
            return Ok((first, first_span));
        };

        let mut span = first_span;
        let mut group = writer.start_group(op, first, first_span);
        while self.tokenizer.peek().and_then(Operator::from_byte) == Some(op) {
            self.tokenizer.advance();
            let sibling_live = live && writer.is_live(&group);
            let (node, node_span) = self.term(writer, sibling_live, depth)?;
            span = span.merge(node_span);
            writer.push(&mut group, node, node_span);
        }

        if self.tokenizer.peek().and_then(Operator::from_byte) == Some(op.other()) {
            return Err(self.tokenizer.error("Cannot mix '|' and '&'"));
        }

        Ok((writer.finish_group(group, span)?, span))
    }

    /// Parse a `<term>`: a parenthesized expression or an authorization.
    ///
    /// The returned span of a parenthesized term covers its parentheses, so
    /// an enclosing run spans its full source text. The node built inside
    /// keeps the span of what lies between them.
    fn term<W: ExpressionWriter<'e>>(
        &mut self,
        writer: &mut W,
        live: bool,
        depth: u32,
    ) -> Result<(W::Node, Span)> {
        match self.tokenizer.peek() {
            None => Err(self.tokenizer.error(
                "Expected a '(' character or an authorization token instead saw end of input",
            )),
            Some(OPEN_PAREN) => {
                if depth >= self.max_depth {
                    return Err(Error::nesting_depth(
                        self.tokenizer.expression(),
                        self.tokenizer.offset(),
                        self.max_depth,
                    ));
                }
                let open = self.tokenizer.offset();
                self.tokenizer.advance();
                let (inner, _) = self.expression(writer, live, depth + 1)?;
                self.tokenizer.expect(CLOSE_PAREN)?;
                Ok((inner, Span::new(open, self.tokenizer.offset())))
            }
            Some(_) => {
                let token = self.tokenizer.next_authorization()?;
                let node = writer.authorization(&token, live)?;
                Ok((node, token.span))
            }
        }
    }
}
