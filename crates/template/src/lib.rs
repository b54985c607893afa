//! Render Liquid templates against dynamically-typed data. The engine
//! covers the language pipeline — tokenization, expression evaluation, and
//! the control-flow tags (`if`, `for`, `case`, `capture`, `cycle`, and
//! friends) — and is agnostic of where templates or data come from. The
//! filter library is the embedder's: filters plug in through
//! [FilterRegistry].
//!
//! ```
//! use sluice_template::{Dictionary, Engine, Value};
//!
//! let engine = Engine::new();
//! let globals: Dictionary =
//!     [("name".to_owned(), Value::from("world"))].into_iter().collect();
//! let output = engine.render("hello {{ name }}", globals).unwrap();
//! assert_eq!(output, "hello world");
//! ```

mod context;
mod error;
mod expression;
mod filter;
mod lexer;
mod operator;
mod parser;
mod render;
mod tag;
#[cfg(test)]
mod test_util;
#[cfg(test)]
mod tests;
mod value;

pub use crate::{
    context::RenderContext,
    error::{FilterError, RenderError, RenderWarning},
    filter::{FilterFunction, FilterRegistry},
    lexer::Token,
    operator::{OperatorFunction, OperatorRegistry},
    tag::{Binding, Segment, Tag, TagKind, TagRegistry, TagSpec},
    value::{Dictionary, Range, Value},
};

use crate::parser::Parser;
use std::{convert::Infallible, str::FromStr};

/// A template engine: the three registries consulted while rendering.
/// Registries are populated at setup and read-only afterwards, so one
/// engine can serve any number of renders (concurrent ones included — each
/// render owns its own context and scope tree).
#[derive(Debug, Default)]
pub struct Engine {
    filters: FilterRegistry,
    operators: OperatorRegistry,
    tags: TagRegistry,
}

impl Engine {
    /// An engine with the built-in tags and operators installed and an
    /// empty filter table
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterRegistry {
        &mut self.filters
    }

    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }

    pub fn operators_mut(&mut self) -> &mut OperatorRegistry {
        &mut self.operators
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagRegistry {
        &mut self.tags
    }

    /// Parse and render a template source against the given globals
    pub fn render(
        &self,
        source: &str,
        globals: Dictionary,
    ) -> Result<String, RenderError> {
        self.render_template(&Template::new(source), globals)
    }

    /// Render a pre-lexed template against the given globals
    pub fn render_template(
        &self,
        template: &Template,
        globals: Dictionary,
    ) -> Result<String, RenderError> {
        Ok(self.render_report(template, globals)?.into_text())
    }

    /// Render to the ordered list of output fragments instead of one string
    pub fn render_fragments(
        &self,
        template: &Template,
        globals: Dictionary,
    ) -> Result<Vec<String>, RenderError> {
        Ok(self.render_report(template, globals)?.fragments)
    }

    /// Render and also hand back the soft diagnostics the render recorded
    pub fn render_report(
        &self,
        template: &Template,
        globals: Dictionary,
    ) -> Result<RenderOutput, RenderError> {
        let parser = Parser::new(self, template.tokens(), globals);
        let outcome = parser.parse()?;
        let fragments = render::compile(&outcome.arena, outcome.root);
        Ok(RenderOutput {
            fragments,
            warnings: outcome.context.into_warnings(),
        })
    }
}

/// A lexed template, reusable across renders. Lexing is total: malformed
/// delimiters degrade to text tokens rather than failing.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    pub fn new(source: &str) -> Self {
        Self {
            tokens: lexer::tokenize(source),
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl FromStr for Template {
    type Err = Infallible;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(source))
    }
}

/// The product of one render: output fragments in document order, plus any
/// soft diagnostics recorded along the way
#[derive(Debug)]
pub struct RenderOutput {
    pub fragments: Vec<String>,
    pub warnings: Vec<RenderWarning>,
}

impl RenderOutput {
    /// Concatenate the fragments into the rendered string
    pub fn into_text(self) -> String {
        self.fragments.concat()
    }
}
