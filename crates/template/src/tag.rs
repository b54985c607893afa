//! Tag definitions: keywords, argument grammars, scope behavior flags
//!
//! Tags are data, not subclasses: a [TagSpec] declares everything the
//! parser needs to drive a tag — its argument grammar, the named parameters
//! it recognizes, whether it opens a scope, and which opener kinds it
//! closes. Behavior hooks are dispatched on [TagKind] inside the parser.

use crate::{
    Engine,
    context::RenderContext,
    error::RenderError,
    expression,
    value::Value,
};
use indexmap::IndexMap;
use regex::Regex;

/// Every built-in tag behavior. Scope-closing tags have their own kinds so
/// closes-lists can name their openers precisely.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TagKind {
    Assign,
    Capture,
    EndCapture,
    Increment,
    Decrement,
    If,
    Elsif,
    Else,
    EndIf,
    Unless,
    EndUnless,
    Case,
    When,
    EndCase,
    For,
    EndFor,
    TableRow,
    EndTableRow,
    Break,
    Continue,
    Cycle,
    Comment,
    EndComment,
}

/// One element of a tag's ordered argument grammar
#[derive(Clone, Copy, Debug)]
pub enum Segment {
    /// An exact keyword, e.g. the `in` of a `for` tag
    Literal(&'static str),
    /// A single word bound as an identifier string
    Identifier(&'static str),
    /// The rest of the statement, evaluated as a filter chain and bound as
    /// a value
    Expression(&'static str),
    /// The rest of the statement, evaluated as an infix boolean expression
    /// and bound as a value
    Condition(&'static str),
    /// The rest of the statement split on commas, each piece evaluated as a
    /// literal/variable, bound as a list of values
    Group(&'static str),
}

/// The static description of a tag: everything the parser needs to match
/// its arguments and manage its scope
#[derive(Debug)]
pub struct TagSpec {
    pub kind: TagKind,
    pub keyword: &'static str,
    /// Ordered argument grammar, matched after parameter extraction
    pub grammar: &'static [Segment],
    /// Recognized named parameters (`key: value`, or a bareword yielding
    /// `true`), extracted from the payload right-to-left before the grammar
    /// runs
    pub parameters: &'static [&'static str],
    /// Does this tag push a scope?
    pub defines_scope: bool,
    /// Opener kinds this tag closes when it finds one as the current scope
    pub closes: &'static [TagKind],
    /// After closing a chain-tail scope (`else`/`when`), also close the
    /// enclosing scope (used by `endcase`/`endfor`)
    pub terminates_parent: bool,
}

/// Keyword → tag specs. A keyword may hold several specs; the parser tries
/// each in order and uses the first whose grammar matches.
#[derive(Debug)]
pub struct TagRegistry {
    specs: IndexMap<&'static str, Vec<&'static TagSpec>>,
}

impl TagRegistry {
    pub fn register(&mut self, spec: &'static TagSpec) {
        self.specs.entry(spec.keyword).or_default().push(spec);
    }

    pub fn get(&self, keyword: &str) -> Option<&[&'static TagSpec]> {
        self.specs.get(keyword).map(Vec::as_slice)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.specs.contains_key(keyword)
    }
}

/// All built-in control-flow tags
impl Default for TagRegistry {
    fn default() -> Self {
        let mut registry = Self {
            specs: IndexMap::new(),
        };
        for spec in BUILTIN_TAGS {
            registry.register(spec);
        }
        registry
    }
}

static BUILTIN_TAGS: &[TagSpec] = &[
    TagSpec {
        kind: TagKind::Assign,
        keyword: "assign",
        grammar: &[
            Segment::Identifier("target"),
            Segment::Literal("="),
            Segment::Expression("value"),
        ],
        parameters: &[],
        defines_scope: false,
        closes: &[],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::Capture,
        keyword: "capture",
        grammar: &[Segment::Identifier("target")],
        parameters: &[],
        defines_scope: true,
        closes: &[],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::EndCapture,
        keyword: "endcapture",
        grammar: &[],
        parameters: &[],
        defines_scope: false,
        closes: &[TagKind::Capture],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::Increment,
        keyword: "increment",
        grammar: &[Segment::Identifier("target")],
        parameters: &[],
        defines_scope: false,
        closes: &[],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::Decrement,
        keyword: "decrement",
        grammar: &[Segment::Identifier("target")],
        parameters: &[],
        defines_scope: false,
        closes: &[],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::If,
        keyword: "if",
        grammar: &[Segment::Condition("condition")],
        parameters: &[],
        defines_scope: true,
        closes: &[],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::Elsif,
        keyword: "elsif",
        grammar: &[Segment::Condition("condition")],
        parameters: &[],
        defines_scope: true,
        closes: &[TagKind::If, TagKind::Elsif],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::Else,
        keyword: "else",
        grammar: &[],
        parameters: &[],
        defines_scope: true,
        closes: &[TagKind::If, TagKind::Elsif, TagKind::When],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::EndIf,
        keyword: "endif",
        grammar: &[],
        parameters: &[],
        defines_scope: false,
        closes: &[TagKind::If, TagKind::Elsif, TagKind::Else],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::Unless,
        keyword: "unless",
        grammar: &[Segment::Condition("condition")],
        parameters: &[],
        defines_scope: true,
        closes: &[],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::EndUnless,
        keyword: "endunless",
        grammar: &[],
        parameters: &[],
        defines_scope: false,
        closes: &[TagKind::Unless],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::Case,
        keyword: "case",
        grammar: &[Segment::Condition("conditional")],
        parameters: &[],
        defines_scope: true,
        closes: &[],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::When,
        keyword: "when",
        grammar: &[Segment::Group("comparators")],
        parameters: &[],
        defines_scope: true,
        closes: &[TagKind::When],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::EndCase,
        keyword: "endcase",
        grammar: &[],
        parameters: &[],
        defines_scope: false,
        closes: &[TagKind::When, TagKind::Else, TagKind::Case],
        terminates_parent: true,
    },
    TagSpec {
        kind: TagKind::For,
        keyword: "for",
        grammar: &[
            Segment::Identifier("item"),
            Segment::Literal("in"),
            Segment::Expression("iterable"),
        ],
        parameters: &["limit", "offset", "reversed"],
        defines_scope: true,
        closes: &[],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::EndFor,
        keyword: "endfor",
        grammar: &[],
        parameters: &[],
        defines_scope: false,
        closes: &[TagKind::For, TagKind::Else],
        terminates_parent: true,
    },
    TagSpec {
        kind: TagKind::TableRow,
        keyword: "tablerow",
        grammar: &[
            Segment::Identifier("item"),
            Segment::Literal("in"),
            Segment::Expression("iterable"),
        ],
        parameters: &["cols", "limit", "offset"],
        defines_scope: true,
        closes: &[],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::EndTableRow,
        keyword: "endtablerow",
        grammar: &[],
        parameters: &[],
        defines_scope: false,
        closes: &[TagKind::TableRow],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::Break,
        keyword: "break",
        grammar: &[],
        parameters: &[],
        defines_scope: false,
        closes: &[],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::Continue,
        keyword: "continue",
        grammar: &[],
        parameters: &[],
        defines_scope: false,
        closes: &[],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::Cycle,
        keyword: "cycle",
        grammar: &[Segment::Group("values")],
        parameters: &["group"],
        defines_scope: false,
        closes: &[],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::Comment,
        keyword: "comment",
        grammar: &[],
        parameters: &[],
        defines_scope: true,
        closes: &[],
        terminates_parent: false,
    },
    TagSpec {
        kind: TagKind::EndComment,
        keyword: "endcomment",
        grammar: &[],
        parameters: &[],
        defines_scope: false,
        closes: &[TagKind::Comment],
        terminates_parent: false,
    },
];

/// A compiled argument binding
#[derive(Clone, Debug)]
pub enum Binding {
    /// A bare identifier, e.g. an assignment target
    Identifier(String),
    /// An evaluated value
    Value(Value),
    /// An evaluated comma-separated group
    Values(Vec<Value>),
}

/// A tag instance: a spec plus the bindings compiled from one statement
#[derive(Clone, Debug)]
pub struct Tag {
    pub spec: &'static TagSpec,
    bindings: IndexMap<&'static str, Binding>,
    parameters: IndexMap<&'static str, Value>,
}

impl Tag {
    /// Match a statement's arguments against the spec's grammar. Named
    /// parameters are extracted first (right-to-left); the grammar segments
    /// then consume what remains. Trailing words are an error.
    pub(crate) fn parse(
        spec: &'static TagSpec,
        remainder: &str,
        context: &mut RenderContext,
        engine: &Engine,
    ) -> Result<Self, RenderError> {
        let malformed = |reason: String| RenderError::MalformedStatement {
            keyword: spec.keyword.to_owned(),
            reason,
        };

        let (extracted, parameters) =
            extract_parameters(spec, remainder, context);
        let mut rest = extracted.trim();
        let mut bindings = IndexMap::new();

        for segment in spec.grammar {
            match segment {
                Segment::Literal(word) => {
                    let Some((next, remaining)) = next_word(rest) else {
                        return Err(malformed(format!("expected `{word}`")));
                    };
                    if next != *word {
                        return Err(malformed(format!(
                            "expected `{word}`, found `{next}`"
                        )));
                    }
                    rest = remaining;
                }
                Segment::Identifier(name) => {
                    let Some((word, remaining)) = next_word(rest) else {
                        return Err(malformed(format!(
                            "expected an identifier for `{name}`"
                        )));
                    };
                    if !is_identifier(word) {
                        return Err(malformed(format!(
                            "`{word}` is not a valid identifier"
                        )));
                    }
                    bindings
                        .insert(*name, Binding::Identifier(word.to_owned()));
                    rest = remaining;
                }
                Segment::Expression(name) => {
                    if rest.is_empty() {
                        return Err(malformed(format!("missing `{name}`")));
                    }
                    let value = expression::evaluate_filter_chain(
                        rest, context, engine,
                    )?;
                    bindings.insert(*name, Binding::Value(value));
                    rest = "";
                }
                Segment::Condition(name) => {
                    if rest.is_empty() {
                        return Err(malformed(format!("missing `{name}`")));
                    }
                    let value =
                        expression::evaluate_condition(rest, context, engine);
                    bindings.insert(*name, Binding::Value(value));
                    rest = "";
                }
                Segment::Group(name) => {
                    let values: Vec<Value> =
                        expression::split_top_level(rest, ',')
                            .into_iter()
                            .map(str::trim)
                            .filter(|piece| !piece.is_empty())
                            .map(|piece| {
                                expression::evaluate_term_text(piece, context)
                            })
                            .collect();
                    if values.is_empty() {
                        return Err(malformed(format!("missing `{name}`")));
                    }
                    bindings.insert(*name, Binding::Values(values));
                    rest = "";
                }
            }
        }

        if !rest.is_empty() {
            return Err(malformed(format!("unexpected trailing `{rest}`")));
        }
        Ok(Self {
            spec,
            bindings,
            parameters,
        })
    }

    /// Get an identifier binding by name
    pub fn identifier(&self, name: &'static str) -> Result<&str, RenderError> {
        match self.bindings.get(name) {
            Some(Binding::Identifier(identifier)) => Ok(identifier),
            _ => Err(self.missing(name)),
        }
    }

    /// Get a value binding by name
    pub fn value(&self, name: &'static str) -> Result<&Value, RenderError> {
        match self.bindings.get(name) {
            Some(Binding::Value(value)) => Ok(value),
            _ => Err(self.missing(name)),
        }
    }

    /// Get a group binding by name
    pub fn values(&self, name: &'static str) -> Result<&[Value], RenderError> {
        match self.bindings.get(name) {
            Some(Binding::Values(values)) => Ok(values),
            _ => Err(self.missing(name)),
        }
    }

    /// Get an extracted named parameter, if the statement carried it
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    fn missing(&self, binding: &'static str) -> RenderError {
        RenderError::MissingArtifact {
            keyword: self.spec.keyword.to_owned(),
            binding,
        }
    }
}

/// Extract the spec's recognized named parameters from the payload,
/// right-to-left. `key: value` yields the evaluated value; a bareword `key`
/// yields true. Returns the payload with the matches removed.
fn extract_parameters(
    spec: &TagSpec,
    remainder: &str,
    context: &mut RenderContext,
) -> (String, IndexMap<&'static str, Value>) {
    let mut text = remainder.to_owned();
    let mut parameters = IndexMap::new();
    for name in spec.parameters.iter().rev() {
        // Keyed form: `name: value` where value is a quoted string or a
        // single comma-free word. The pattern is built from a static
        // identifier, so it always compiles.
        let keyed = Regex::new(&format!(
            r#"(?:^|\s)({}\s*:\s*('[^']*'|"[^"]*"|[^\s,]+))"#,
            regex::escape(name)
        ))
        .unwrap();
        let found = keyed.captures_iter(&text).last().and_then(|captures| {
            let whole = captures.get(1)?;
            let value = captures.get(2)?;
            Some((whole.range(), value.as_str().to_owned()))
        });
        if let Some((range, value_text)) = found {
            let value = expression::evaluate_term_text(&value_text, context);
            parameters.insert(*name, value);
            text.replace_range(range, "");
            continue;
        }

        // Bareword form: `name` alone yields true
        let bare = Regex::new(&format!(
            r"(?:^|\s)({})(?:\s|$)",
            regex::escape(name)
        ))
        .unwrap();
        let found = bare
            .captures_iter(&text)
            .last()
            .and_then(|captures| Some(captures.get(1)?.range()));
        if let Some(range) = found {
            parameters.insert(*name, Value::Boolean(true));
            text.replace_range(range, "");
        }
    }
    (text, parameters)
}

/// Take the next whitespace-delimited word off the front of the statement
fn next_word(rest: &str) -> Option<(&str, &str)> {
    let rest = rest.trim_start();
    if rest.is_empty() {
        return None;
    }
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some((&rest[..end], rest[end..].trim_start()))
}

/// `[A-Za-z_][A-Za-z0-9_\-]*`
fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(expression::is_identifier_char)
}
