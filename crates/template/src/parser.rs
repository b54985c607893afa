//! The fused parse/render walk
//!
//! Liquid parsing and rendering are a single pass: the parser walks the
//! token stream, evaluating variables and running tag behavior as it goes,
//! and builds a tree of processed statements. Iteration tags re-enter their
//! own token range by rewinding the cursor once per item, so loop bodies
//! are re-parsed (and re-evaluated) each pass.
//!
//! Scopes live in an arena; parent/child links are arena indexes.

use crate::{
    Engine,
    context::RenderContext,
    error::{RenderError, RenderWarning},
    expression,
    lexer::{self, Token},
    render,
    tag::{Tag, TagKind},
    value::{Dictionary, Value},
};
use tracing::{debug, warn};

pub(crate) type ScopeId = usize;

const ROOT: ScopeId = 0;

/// Whether statements are currently being collected into a scope.
/// `Disabled` is permanent for the scope (false branches, `break`);
/// `Halted` is cleared when an iteration scope re-enters (`continue`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum OutputState {
    Enabled,
    Disabled,
    Halted,
}

/// A processed statement: a piece of output, or a nested scope
#[derive(Debug)]
pub(crate) enum Statement {
    Output(String),
    Scope(ScopeId),
}

/// One node of the scope tree
#[derive(Debug)]
pub(crate) struct ScopeNode {
    /// The tag that opened this scope; nil only for the root
    pub opener: Option<Tag>,
    pub parent: Option<ScopeId>,
    /// Processed statements in document order
    pub statements: Vec<Statement>,
    pub output_state: OutputState,
    /// The state inherited from the parent at open. Tags that re-enable a
    /// scope nested under a disabled interior (a matching `when`, a
    /// for-`else`) restore this rather than forcing `Enabled`.
    pub resume_state: OutputState,
    /// Sibling opener kinds to suppress at compile time once this scope has
    /// been emitted (a taken `if` suppresses its `elsif`/`else` tail)
    pub skip_kinds: &'static [TagKind],
    /// The scope was opened after an earlier branch of its chain was taken;
    /// its hooks never ran and it compiles to nothing
    pub suppressed: bool,
    /// Token index of the opener tag, for iteration rewind
    pub opener_index: usize,
    /// Context frames pushed on behalf of this scope
    pub overlay_frames: usize,
    pub iteration: Option<IterationState>,
    /// This scope's branch ran (condition truthy, `when` matched, loop
    /// produced items). Folded into the parent's `chain_taken` on close.
    pub branch_taken: bool,
    /// An earlier child branch of this scope's current chain was taken
    pub chain_taken: bool,
}

/// Live state of a `for`/`tablerow` scope
#[derive(Debug)]
pub(crate) struct IterationState {
    items: Vec<Value>,
    /// Index of the next item to serve
    next: usize,
    /// Loop variable name
    variable: String,
    /// Present for `tablerow` only
    table: Option<TableState>,
}

/// Row/cell bookkeeping for `tablerow`
#[derive(Debug)]
struct TableState {
    cols: usize,
    row: usize,
    column: usize,
    /// A cell is currently open and needs closing on the way out
    opened: bool,
}

/// What became of a scope when a closing tag hit it
enum CloseOutcome {
    /// The scope was popped; carries its opener kind
    Popped(TagKind),
    /// An iteration scope had items remaining: the cursor rewinds here and
    /// the scope stays current
    Rewound(usize),
}

/// The completed walk: the scope arena plus the context it mutated
pub(crate) struct ParseOutcome {
    pub arena: Vec<ScopeNode>,
    pub root: ScopeId,
    pub context: RenderContext,
}

pub(crate) struct Parser<'engine> {
    engine: &'engine Engine,
    tokens: &'engine [Token],
    arena: Vec<ScopeNode>,
    current: ScopeId,
    context: RenderContext,
}

impl<'engine> Parser<'engine> {
    pub fn new(
        engine: &'engine Engine,
        tokens: &'engine [Token],
        globals: Dictionary,
    ) -> Self {
        let root = ScopeNode {
            opener: None,
            parent: None,
            statements: Vec::new(),
            output_state: OutputState::Enabled,
            resume_state: OutputState::Enabled,
            skip_kinds: &[],
            suppressed: false,
            opener_index: 0,
            overlay_frames: 0,
            iteration: None,
            branch_taken: false,
            chain_taken: false,
        };
        Self {
            engine,
            tokens,
            arena: vec![root],
            current: ROOT,
            context: RenderContext::new(globals),
        }
    }

    /// Walk the token stream to completion
    pub fn parse(mut self) -> Result<ParseOutcome, RenderError> {
        let tokens = self.tokens;
        let mut cursor = 0;
        while cursor < tokens.len() {
            match &tokens[cursor] {
                Token::Text(text) => {
                    if self.enabled() {
                        self.emit(text.clone());
                    }
                }
                Token::Variable(payload) => {
                    if self.enabled() {
                        let value = expression::evaluate_payload(
                            payload,
                            &mut self.context,
                            self.engine,
                        )?;
                        self.emit(value.to_string());
                    }
                }
                Token::Tag(payload) => {
                    if let Some(rewind) = self.process_tag(payload, cursor)? {
                        cursor = rewind;
                        continue;
                    }
                }
            }
            cursor += 1;
        }

        // Unclosed scopes at EOF degrade to warnings
        while self.current != ROOT {
            let keyword = self.arena[self.current]
                .opener
                .as_ref()
                .map(|tag| tag.spec.keyword)
                .unwrap_or_default()
                .to_owned();
            self.context.record(RenderWarning::UnbalancedScopes { keyword });
            let frames = self.arena[self.current].overlay_frames;
            for _ in 0..frames {
                self.context.pop_frame();
            }
            self.current = self.arena[self.current].parent.unwrap_or(ROOT);
        }

        Ok(ParseOutcome {
            arena: self.arena,
            root: ROOT,
            context: self.context,
        })
    }

    /// Handle one tag token. Returns the cursor to rewind to when the tag
    /// closed an iteration scope with items remaining.
    fn process_tag(
        &mut self,
        payload: &str,
        cursor: usize,
    ) -> Result<Option<usize>, RenderError> {
        let engine = self.engine;
        let keyword = lexer::keyword_of(payload);
        let Some(specs) = engine.tags().get(keyword) else {
            warn!(keyword, "unknown tag keyword, skipping");
            return Ok(None);
        };
        let remainder = payload[keyword.len()..].trim();

        // A keyword may hold several specs; use the first that parses
        let mut parsed = None;
        let mut last_error = None;
        for &spec in specs {
            match Tag::parse(spec, remainder, &mut self.context, engine) {
                Ok(tag) => {
                    parsed = Some(tag);
                    break;
                }
                Err(error) => last_error = Some(error),
            }
        }
        let Some(tag) = parsed else {
            return Err(last_error.unwrap_or(RenderError::UnknownTag {
                keyword: keyword.to_owned(),
            }));
        };

        // 1. Close the current scope if this tag ends it
        let current_kind = self.opener_kind(self.current);
        let closes = current_kind
            .is_some_and(|kind| tag.spec.closes.contains(&kind));
        if closes {
            let kind = current_kind.unwrap_or(TagKind::Comment);
            match self.close_scope(kind)? {
                CloseOutcome::Rewound(target) => return Ok(Some(target)),
                CloseOutcome::Popped(first) => {
                    // `endcase`/`endfor` close a chain-tail scope and then
                    // the enclosing scope it belongs to
                    if tag.spec.terminates_parent
                        && matches!(first, TagKind::Else | TagKind::When)
                        && let Some(parent_kind) =
                            self.opener_kind(self.current)
                        && tag.spec.closes.contains(&parent_kind)
                    {
                        match self.close_scope(parent_kind)? {
                            CloseOutcome::Rewound(target) => {
                                return Ok(Some(target));
                            }
                            CloseOutcome::Popped(_) => {}
                        }
                    }
                }
            }
        } else if !tag.spec.closes.is_empty() && !tag.spec.defines_scope {
            // A dangling end tag; ignore it and keep going
            debug!(keyword, "closing tag does not match the open scope");
            return Ok(None);
        }

        // 2. Open a scope, or 3. run the inline behavior
        if tag.spec.defines_scope {
            self.open_scope(tag, cursor, closes)?;
        } else if self.enabled() {
            self.execute_inline(&tag)?;
        }
        Ok(None)
    }

    /// Close the current scope: run its close hook, drive the iteration
    /// protocol, and pop (unless the iteration re-entered)
    fn close_scope(&mut self, kind: TagKind) -> Result<CloseOutcome, RenderError> {
        let closed = self.current;

        // Iteration protocol: re-enter the loop body if items remain. A
        // `Disabled` state here means `break` (or an empty sequence), which
        // ends the loop regardless.
        if self.arena[closed].iteration.is_some()
            && self.arena[closed].output_state != OutputState::Disabled
            && self.has_next(closed)
        {
            if kind == TagKind::TableRow {
                self.advance_table(closed);
            }
            let overlay = self.serve_next(closed);
            self.context.pop_frame();
            self.context.push_frame(overlay);
            let resume = self.arena[closed].resume_state;
            self.set_output_state(closed, resume);
            return Ok(CloseOutcome::Rewound(
                self.arena[closed].opener_index + 1,
            ));
        }

        // The scope is ending for real: run close hooks
        match kind {
            TagKind::Capture => {
                if self.arena[closed].output_state == OutputState::Enabled {
                    let target = match self.arena[closed].opener.as_ref() {
                        Some(tag) => tag.identifier("target")?.to_owned(),
                        None => String::new(),
                    };
                    let text = render::compile_to_string(&self.arena, closed);
                    self.context.assign(target, Value::String(text));
                    // The captured output must not also be emitted
                    self.arena[closed].statements.clear();
                }
            }
            TagKind::TableRow => self.flush_table(closed),
            _ => {}
        }

        // Pop
        let frames = self.arena[closed].overlay_frames;
        for _ in 0..frames {
            self.context.pop_frame();
        }
        self.arena[closed].overlay_frames = 0;
        let parent = self.arena[closed].parent.unwrap_or(ROOT);
        let taken = self.arena[closed].branch_taken;
        self.arena[parent].chain_taken |= taken;
        self.current = parent;
        Ok(CloseOutcome::Popped(kind))
    }

    /// Push a new scope for a tag and run its open behavior.
    /// `closed_sibling` is true when the tag continues a chain by closing
    /// its predecessor (`elsif`, `else`, a later `when`).
    fn open_scope(
        &mut self,
        tag: Tag,
        cursor: usize,
        closed_sibling: bool,
    ) -> Result<(), RenderError> {
        let parent = self.current;
        if !closed_sibling {
            // A fresh chain starts under this parent
            self.arena[parent].chain_taken = false;
        }
        let kind = tag.spec.kind;
        let inherited = self.arena[parent].output_state;
        let suppressed = matches!(
            kind,
            TagKind::Elsif | TagKind::Else | TagKind::When
        ) && self.arena[parent].chain_taken;

        // Work out the open behavior while the tag is still owned here
        let mut state = if suppressed {
            OutputState::Disabled
        } else {
            inherited
        };
        let mut branch_taken = false;
        let mut skip_kinds: &'static [TagKind] = &[];
        let mut iteration = None;
        let mut overlay = None;
        let mut opening_output = None;

        if !suppressed {
            match kind {
                TagKind::If | TagKind::Elsif => {
                    if tag.value("condition")?.is_truthy() {
                        branch_taken = true;
                        skip_kinds = &[TagKind::Elsif, TagKind::Else];
                    } else {
                        state = OutputState::Disabled;
                    }
                }
                TagKind::Unless => {
                    if tag.value("condition")?.is_truthy() {
                        state = OutputState::Disabled;
                    } else {
                        branch_taken = true;
                    }
                }
                // The interior of a case is silent until a when matches
                TagKind::Case => state = OutputState::Disabled,
                TagKind::When => {
                    let matched = {
                        let case = self.arena[parent]
                            .opener
                            .as_ref()
                            .filter(|opener| opener.spec.kind == TagKind::Case);
                        let Some(case) = case else {
                            return Err(RenderError::InvalidInvocation {
                                keyword: "when".into(),
                                reason: "not inside a case".into(),
                            });
                        };
                        let conditional = case.value("conditional")?;
                        tag.values("comparators")?
                            .iter()
                            .any(|comparator| comparator == conditional)
                    };
                    if matched {
                        branch_taken = true;
                        skip_kinds = &[TagKind::When, TagKind::Else];
                        state = self.arena[parent].resume_state;
                    } else {
                        state = OutputState::Disabled;
                    }
                }
                TagKind::Else => {
                    branch_taken = true;
                    match self.opener_kind(parent) {
                        // for-else: runs only when the loop produced nothing
                        Some(TagKind::For) => {
                            let empty = self.arena[parent]
                                .iteration
                                .as_ref()
                                .is_some_and(|state| state.items.is_empty());
                            state = if empty {
                                self.arena[parent].resume_state
                            } else {
                                OutputState::Disabled
                            };
                        }
                        // case-else: the case interior is disabled, restore
                        // the ambient state
                        Some(TagKind::Case) => {
                            state = self.arena[parent].resume_state;
                        }
                        // Chain else after if/elsif: the inherited state
                        // already reflects the outer scope
                        _ => {}
                    }
                }
                TagKind::For | TagKind::TableRow => {
                    let items = self.expand_iterable(&tag)?;
                    let variable = tag.identifier("item")?.to_owned();
                    if items.is_empty() {
                        state = OutputState::Disabled;
                        iteration = Some(IterationState {
                            items,
                            next: 0,
                            variable,
                            table: (kind == TagKind::TableRow).then(|| {
                                TableState {
                                    cols: 0,
                                    row: 0,
                                    column: 0,
                                    opened: false,
                                }
                            }),
                        });
                    } else {
                        branch_taken = true;
                        let mut table = None;
                        if kind == TagKind::TableRow {
                            let cols = match tag.parameter("cols") {
                                Some(value) => value
                                    .as_integer()
                                    .filter(|cols| *cols > 0)
                                    .ok_or_else(|| {
                                        RenderError::InvalidInvocation {
                                            keyword: "tablerow".into(),
                                            reason: "`cols` must be a \
                                                positive integer"
                                                .into(),
                                        }
                                    })?
                                    as usize,
                                None => items.len(),
                            };
                            // Markup only flows when the scope is live; a
                            // tablerow inside a disabled branch iterates
                            // silently
                            let live = state == OutputState::Enabled;
                            if live {
                                opening_output = Some(
                                    "<tr class=\"row1\"><td class=\"col1\">"
                                        .to_owned(),
                                );
                            }
                            table = Some(TableState {
                                cols,
                                row: 1,
                                column: 1,
                                opened: live,
                            });
                        }
                        let mut iteration_state = IterationState {
                            items,
                            next: 0,
                            variable,
                            table,
                        };
                        overlay = Some(iteration_overlay(&mut iteration_state));
                        iteration = Some(iteration_state);
                    }
                }
                TagKind::Comment => state = OutputState::Disabled,
                TagKind::Capture => {}
                // Non-scope kinds never open a scope
                _ => {}
            }
        }

        let id = self.arena.len();
        let overlay_frames = usize::from(overlay.is_some());
        if let Some(overlay) = overlay {
            self.context.push_frame(overlay);
        }
        self.arena.push(ScopeNode {
            opener: Some(tag),
            parent: Some(parent),
            statements: opening_output
                .map(Statement::Output)
                .into_iter()
                .collect(),
            output_state: state,
            resume_state: inherited,
            skip_kinds,
            suppressed,
            opener_index: cursor,
            overlay_frames,
            iteration,
            branch_taken,
            chain_taken: false,
        });
        self.arena[parent].statements.push(Statement::Scope(id));
        self.current = id;
        Ok(())
    }

    /// Run a non-scope tag's behavior, appending any inline output
    fn execute_inline(&mut self, tag: &Tag) -> Result<(), RenderError> {
        match tag.spec.kind {
            TagKind::Assign => {
                let target = tag.identifier("target")?.to_owned();
                let value = tag.value("value")?.clone();
                self.context.assign(target, value);
            }
            TagKind::Increment => {
                let emitted = self.context.increment(tag.identifier("target")?);
                self.emit(emitted.to_string());
            }
            TagKind::Decrement => {
                let emitted = self.context.decrement(tag.identifier("target")?);
                self.emit(emitted.to_string());
            }
            TagKind::Cycle => {
                let values = tag.values("values")?.to_vec();
                if values.is_empty() {
                    return Ok(());
                }
                // No group names the iterator after the canonical form of
                // its value list, so sibling cycles over the same list
                // share state
                let key = match tag.parameter("group") {
                    Some(group) => format!("group:{group}"),
                    None => format!("values:{values:?}"),
                };
                let index = self.context.cycle_next(key, values.len());
                self.emit(values[index].to_string());
            }
            TagKind::Break => self.interrupt(OutputState::Disabled),
            TagKind::Continue => self.interrupt(OutputState::Halted),
            _ => {}
        }
        Ok(())
    }

    /// Expand a `for`/`tablerow` iterable into a value sequence, applying
    /// `offset`/`limit` (clamped to the sequence bounds) and `reversed`
    fn expand_iterable(&mut self, tag: &Tag) -> Result<Vec<Value>, RenderError> {
        let mut items = match tag.value("iterable")? {
            Value::Array(items) => items.clone(),
            Value::Range(range) => range.values(),
            _ => Vec::new(),
        };
        if let Some(value) = tag.parameter("offset") {
            let offset = self.integer_parameter(tag, "offset", value)?;
            let offset = offset.clamp(0, items.len() as i64) as usize;
            items.drain(..offset);
        }
        if let Some(value) = tag.parameter("limit") {
            let limit = self.integer_parameter(tag, "limit", value)?;
            let limit = limit.clamp(0, items.len() as i64) as usize;
            items.truncate(limit);
        }
        if tag
            .parameter("reversed")
            .is_some_and(Value::is_truthy)
        {
            items.reverse();
        }
        Ok(items)
    }

    fn integer_parameter(
        &self,
        tag: &Tag,
        name: &str,
        value: &Value,
    ) -> Result<i64, RenderError> {
        value
            .as_integer()
            .ok_or_else(|| RenderError::InvalidInvocation {
                keyword: tag.spec.keyword.to_owned(),
                reason: format!("`{name}` must be an integer"),
            })
    }

    /// `break`/`continue`: put the nearest enclosing `for` scope (and its
    /// descendants) into the given state
    fn interrupt(&mut self, state: OutputState) {
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            if self.opener_kind(id) == Some(TagKind::For) {
                self.set_output_state(id, state);
                return;
            }
            scope = self.arena[id].parent;
        }
        debug!("break/continue outside of a for loop, ignoring");
    }

    /// Does the iteration scope have an unserved item?
    fn has_next(&self, scope: ScopeId) -> bool {
        self.arena[scope]
            .iteration
            .as_ref()
            .is_some_and(|state| state.next < state.items.len())
    }

    /// Build the overlay for the next item and advance the iterator
    fn serve_next(&mut self, scope: ScopeId) -> Dictionary {
        match self.arena[scope].iteration.as_mut() {
            Some(state) => iteration_overlay(state),
            None => Dictionary::new(),
        }
    }

    /// Emit the cell/row transition markup between two tablerow items
    fn advance_table(&mut self, scope: ScopeId) {
        let markup = match self.arena[scope]
            .iteration
            .as_mut()
            .and_then(|state| state.table.as_mut())
        {
            // No cell was ever opened: the tablerow is iterating silently
            Some(table) if !table.opened => return,
            Some(table) if table.column + 1 > table.cols => {
                table.row += 1;
                table.column = 1;
                format!(
                    "</td></tr><tr class=\"row{}\"><td class=\"col1\">",
                    table.row
                )
            }
            Some(table) => {
                table.column += 1;
                format!("</td><td class=\"col{}\">", table.column)
            }
            None => return,
        };
        self.arena[scope].statements.push(Statement::Output(markup));
    }

    /// Close the trailing cell/row when a tablerow ends, so the emitted
    /// HTML stays balanced
    fn flush_table(&mut self, scope: ScopeId) {
        let opened = self.arena[scope]
            .iteration
            .as_ref()
            .and_then(|state| state.table.as_ref())
            .is_some_and(|table| table.opened);
        if opened {
            self.arena[scope]
                .statements
                .push(Statement::Output("</td></tr>".into()));
        }
    }

    /// Set a scope's output state, cascading to all descendants
    fn set_output_state(&mut self, scope: ScopeId, state: OutputState) {
        self.arena[scope].output_state = state;
        let children: Vec<ScopeId> = self.arena[scope]
            .statements
            .iter()
            .filter_map(|statement| match statement {
                Statement::Scope(child) => Some(*child),
                Statement::Output(_) => None,
            })
            .collect();
        for child in children {
            self.set_output_state(child, state);
        }
    }

    fn opener_kind(&self, scope: ScopeId) -> Option<TagKind> {
        self.arena[scope].opener.as_ref().map(|tag| tag.spec.kind)
    }

    fn enabled(&self) -> bool {
        self.arena[self.current].output_state == OutputState::Enabled
    }

    fn emit(&mut self, text: String) {
        if !text.is_empty() {
            self.arena[self.current]
                .statements
                .push(Statement::Output(text));
        }
    }
}

/// Bind the next item (and, for `for` loops, the `forloop` object) into an
/// overlay frame, advancing the iterator
fn iteration_overlay(state: &mut IterationState) -> Dictionary {
    let index = state.next;
    let Some(item) = state.items.get(index).cloned() else {
        return Dictionary::new();
    };
    state.next += 1;

    let mut overlay = Dictionary::new();
    overlay.insert(state.variable.clone(), item);
    if state.table.is_none() {
        let length = state.items.len() as i64;
        let index1 = index as i64 + 1;
        let forloop: Dictionary = [
            ("first", Value::Boolean(index1 == 1)),
            ("last", Value::Boolean(index1 == length)),
            ("index", Value::Integer(index1)),
            ("index0", Value::Integer(index1 - 1)),
            ("rindex", Value::Integer(length - index1 + 1)),
            ("rindex0", Value::Integer(length - index1)),
            ("length", Value::Integer(length)),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect();
        overlay.insert("forloop".to_owned(), Value::Dictionary(forloop));
    }
    overlay
}
