//! Typed query builder for message, chat and contact listings.
//!
//! Filters are collected as [`Predicate`]s in a [`QuerySpec`] and compiled once
//! into SQL text plus bound values. No caller-supplied text is ever spliced
//! into the SQL string.
//!
//! CHANGELOG:
//! - 02/01/2026 - Contact search moved onto the builder
//! - 01/30/2026 - Initial implementation

use rusqlite::types::Value;
use std::str::FromStr;

use super::queries;
use crate::error::{Error, Result};
use crate::models::{iso_bound_to_store_text, GROUP_JID_SUFFIX};

/// Max rows returned by contact search.
pub const CONTACT_SEARCH_LIMIT: u32 = 50;

pub const DEFAULT_LIMIT: u32 = 20;
pub const DEFAULT_CONTEXT_WINDOW: u32 = 1;

// ============================================================================
// Predicates
// ============================================================================

/// Columns that filters and sort keys may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    MessageId,
    MessageTimestamp,
    MessageSender,
    MessageChatJid,
    MessageContent,
    ChatJid,
    ChatName,
    ChatLastMessageTime,
}

impl Column {
    fn sql(self) -> &'static str {
        match self {
            Self::MessageId => "messages.id",
            Self::MessageTimestamp => "messages.timestamp",
            Self::MessageSender => "messages.sender",
            Self::MessageChatJid => "messages.chat_jid",
            Self::MessageContent => "messages.content",
            Self::ChatJid => "chats.jid",
            Self::ChatName => "chats.name",
            Self::ChatLastMessageTime => "chats.last_message_time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Lt,
    /// Case-insensitive substring match.
    Contains,
    /// Value does not end with the given suffix.
    NotEndsWith,
}

/// A single `column <op> value` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: Column,
    pub op: Operator,
    pub value: Value,
}

impl Predicate {
    pub fn new(column: Column, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            column,
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: Column, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Eq, value)
    }

    pub fn contains(column: Column, needle: &str) -> Self {
        Self::new(column, Operator::Contains, needle.to_string())
    }

    fn compile(&self, params: &mut Vec<Value>) -> String {
        let col = self.column.sql();
        match self.op {
            Operator::Eq => {
                params.push(self.value.clone());
                format!("{} = ?", col)
            }
            Operator::Gt => {
                params.push(self.value.clone());
                format!("{} > ?", col)
            }
            Operator::Lt => {
                params.push(self.value.clone());
                format!("{} < ?", col)
            }
            Operator::Contains => {
                params.push(Value::Text(format!("%{}%", escape_like(&text_of(&self.value)))));
                format!("LOWER({}) LIKE LOWER(?) ESCAPE '\\'", col)
            }
            Operator::NotEndsWith => {
                params.push(Value::Text(format!("%{}", escape_like(&text_of(&self.value)))));
                format!("{} NOT LIKE ? ESCAPE '\\'", col)
            }
        }
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Null | Value::Blob(_) => String::new(),
    }
}

/// Escape LIKE wildcards so user text matches literally.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// A WHERE-clause term: one predicate, or a disjunction of several.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Is(Predicate),
    AnyOf(Vec<Predicate>),
}

impl Clause {
    fn compile(&self, params: &mut Vec<Value>) -> String {
        match self {
            Self::Is(pred) => pred.compile(params),
            Self::AnyOf(preds) => {
                let parts: Vec<String> = preds.iter().map(|p| p.compile(params)).collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }
}

// ============================================================================
// Query spec
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: Column,
    pub descending: bool,
}

impl OrderTerm {
    pub fn asc(column: Column) -> Self {
        Self { column, descending: false }
    }

    pub fn desc(column: Column) -> Self {
        Self { column, descending: true }
    }
}

/// Zero-based page of `limit` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub page: u32,
}

impl Page {
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.limit)
    }
}

/// A base SELECT plus filters, ordering and pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub base: &'static str,
    pub clauses: Vec<Clause>,
    pub order_by: Vec<OrderTerm>,
    pub page: Option<Page>,
}

/// SQL text with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QuerySpec {
    pub fn new(base: &'static str) -> Self {
        Self {
            base,
            clauses: Vec::new(),
            order_by: Vec::new(),
            page: None,
        }
    }

    pub fn filter(mut self, pred: Predicate) -> Self {
        self.clauses.push(Clause::Is(pred));
        self
    }

    pub fn any_of(mut self, preds: Vec<Predicate>) -> Self {
        self.clauses.push(Clause::AnyOf(preds));
        self
    }

    pub fn order(mut self, term: OrderTerm) -> Self {
        self.order_by.push(term);
        self
    }

    pub fn paginate(mut self, limit: u32, page: u32) -> Self {
        self.page = Some(Page { limit, page });
        self
    }

    pub fn compile(&self) -> CompiledQuery {
        let mut params = Vec::new();
        let mut sql = self.base.trim().to_string();

        if !self.clauses.is_empty() {
            let terms: Vec<String> = self.clauses.iter().map(|c| c.compile(&mut params)).collect();
            sql.push_str("\nWHERE ");
            sql.push_str(&terms.join(" AND "));
        }

        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|t| format!("{} {}", t.column.sql(), if t.descending { "DESC" } else { "ASC" }))
                .collect();
            sql.push_str("\nORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        if let Some(page) = self.page {
            sql.push_str("\nLIMIT ? OFFSET ?");
            params.push(Value::Integer(i64::from(page.limit)));
            params.push(Value::Integer(i64::try_from(page.offset()).unwrap_or(i64::MAX)));
        }

        CompiledQuery { sql, params }
    }
}

// ============================================================================
// Message listing
// ============================================================================

/// Filters, pagination and context options for `list_messages`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFilter {
    /// ISO-8601; only messages strictly after this instant.
    pub after: Option<String>,
    /// ISO-8601; only messages strictly before this instant.
    pub before: Option<String>,
    pub sender_phone_number: Option<String>,
    pub chat_jid: Option<String>,
    /// Case-insensitive substring of the content.
    pub query: Option<String>,
    pub limit: u32,
    pub page: u32,
    pub include_context: bool,
    pub context_before: u32,
    pub context_after: u32,
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self {
            after: None,
            before: None,
            sender_phone_number: None,
            chat_jid: None,
            query: None,
            limit: DEFAULT_LIMIT,
            page: 0,
            include_context: true,
            context_before: DEFAULT_CONTEXT_WINDOW,
            context_after: DEFAULT_CONTEXT_WINDOW,
        }
    }
}

impl MessageFilter {
    /// Build the query; malformed time bounds fail with `InvalidArgument`.
    pub fn to_query_spec(&self) -> Result<QuerySpec> {
        let mut spec = QuerySpec::new(queries::MESSAGE_SELECT);

        if let Some(after) = non_empty(&self.after) {
            let bound = time_bound("after", after)?;
            spec = spec.filter(Predicate::new(Column::MessageTimestamp, Operator::Gt, bound));
        }
        if let Some(before) = non_empty(&self.before) {
            let bound = time_bound("before", before)?;
            spec = spec.filter(Predicate::new(Column::MessageTimestamp, Operator::Lt, bound));
        }
        if let Some(sender) = non_empty(&self.sender_phone_number) {
            spec = spec.filter(Predicate::eq(Column::MessageSender, sender.to_string()));
        }
        if let Some(chat_jid) = non_empty(&self.chat_jid) {
            spec = spec.filter(Predicate::eq(Column::MessageChatJid, chat_jid.to_string()));
        }
        if let Some(query) = non_empty(&self.query) {
            spec = spec.filter(Predicate::contains(Column::MessageContent, query));
        }

        Ok(spec
            .order(OrderTerm::desc(Column::MessageTimestamp))
            .order(OrderTerm::desc(Column::MessageId))
            .paginate(self.limit, self.page))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn time_bound(field: &'static str, raw: &str) -> Result<String> {
    iso_bound_to_store_text(raw).ok_or_else(|| {
        Error::invalid(field, format!("{} is not an ISO-8601 date", raw))
    })
}

// ============================================================================
// Chat listing
// ============================================================================

/// Sort key for `list_chats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatSort {
    #[default]
    LastActive,
    Name,
}

impl FromStr for ChatSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "last_active" => Ok(Self::LastActive),
            "name" => Ok(Self::Name),
            other => Err(Error::invalid(
                "sort_by",
                format!("unknown sort key '{}' (expected 'last_active' or 'name')", other),
            )),
        }
    }
}

/// Filters and pagination for `list_chats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatFilter {
    pub query: Option<String>,
    pub limit: u32,
    pub page: u32,
    pub include_last_message: bool,
    pub sort_by: ChatSort,
}

impl Default for ChatFilter {
    fn default() -> Self {
        Self {
            query: None,
            limit: DEFAULT_LIMIT,
            page: 0,
            include_last_message: true,
            sort_by: ChatSort::LastActive,
        }
    }
}

impl ChatFilter {
    pub fn to_query_spec(&self) -> QuerySpec {
        let base = if self.include_last_message {
            queries::CHAT_SELECT_WITH_LAST_MESSAGE
        } else {
            queries::CHAT_SELECT
        };
        let mut spec = QuerySpec::new(base);

        if let Some(query) = non_empty(&self.query) {
            spec = spec.any_of(vec![
                Predicate::contains(Column::ChatName, query),
                Predicate::contains(Column::ChatJid, query),
            ]);
        }

        spec = match self.sort_by {
            ChatSort::LastActive => spec.order(OrderTerm::desc(Column::ChatLastMessageTime)),
            ChatSort::Name => spec.order(OrderTerm::asc(Column::ChatName)),
        };

        spec.order(OrderTerm::asc(Column::ChatJid))
            .paginate(self.limit, self.page)
    }
}

/// Contact search: name or jid substring, direct chats only, (name, jid) order.
pub fn contact_search_spec(query: &str) -> QuerySpec {
    QuerySpec::new(queries::CONTACT_SELECT)
        .any_of(vec![
            Predicate::contains(Column::ChatName, query),
            Predicate::contains(Column::ChatJid, query),
        ])
        .filter(Predicate::new(
            Column::ChatJid,
            Operator::NotEndsWith,
            GROUP_JID_SUFFIX.to_string(),
        ))
        .order(OrderTerm::asc(Column::ChatName))
        .order(OrderTerm::asc(Column::ChatJid))
        .paginate(CONTACT_SEARCH_LIMIT, 0)
}
