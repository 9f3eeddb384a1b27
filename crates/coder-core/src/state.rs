use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use super::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MessageId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "you",
            Self::Assistant => "assistant",
        }
    }
}

/// One entry of the conversation history. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub text: String,
    /// Set only on assistant answers; the query that produced them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_query: Option<String>,
}

impl Message {
    /// Feedback is only dispatchable for answers that carry their query.
    pub fn is_rateable(&self) -> bool {
        self.original_query
            .as_deref()
            .is_some_and(|query| !query.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IngestFlow {
    Text,
    File,
}

impl IngestFlow {
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::File => "file",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyContent,
    NoFileSelected,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IngestStatus {
    #[default]
    Idle,
    Rejected(RejectReason),
    InProgress {
        file_name: Option<String>,
    },
    Succeeded,
    Failed,
}

impl IngestStatus {
    pub fn message(&self, flow: IngestFlow) -> String {
        match (self, flow) {
            (Self::Idle, _) => String::new(),
            (Self::Rejected(RejectReason::EmptyContent), _) => {
                "Content cannot be empty.".to_string()
            }
            (Self::Rejected(RejectReason::NoFileSelected), _) => {
                "Please select a file first.".to_string()
            }
            (Self::InProgress { .. }, IngestFlow::Text) => "Ingesting text...".to_string(),
            (Self::InProgress { file_name }, IngestFlow::File) => format!(
                "Ingesting file: {}...",
                file_name.as_deref().unwrap_or_default()
            ),
            (Self::Succeeded, IngestFlow::Text) => "Successfully ingested text!".to_string(),
            (Self::Succeeded, IngestFlow::File) => "Successfully ingested file!".to_string(),
            (Self::Failed, IngestFlow::Text) => "Failed to ingest text.".to_string(),
            (Self::Failed, IngestFlow::File) => "Failed to ingest file.".to_string(),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub path: PathBuf,
    pub name: String,
}

impl PendingFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, Default)]
pub struct IngestionState {
    statuses: BTreeMap<IngestFlow, IngestStatus>,
    pub text_buffer: String,
    pub file_path_input: String,
    pub pending_file: Option<PendingFile>,
}

impl IngestionState {
    pub fn status(&self, flow: IngestFlow) -> &IngestStatus {
        const IDLE: &IngestStatus = &IngestStatus::Idle;
        self.statuses.get(&flow).unwrap_or(IDLE)
    }

    pub fn status_message(&self, flow: IngestFlow) -> String {
        self.status(flow).message(flow)
    }

    pub(crate) fn set_status(&mut self, flow: IngestFlow, status: IngestStatus) {
        self.statuses.insert(flow, status);
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    history: Vec<Message>,
    pub query_buffer: String,
    pub in_flight: bool,
    last_id: u64,
}

impl ConversationState {
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.history.iter().find(|message| message.id == id)
    }

    pub fn latest_answer(&self) -> Option<&Message> {
        self.history
            .iter()
            .rev()
            .find(|message| message.sender == Sender::Assistant)
    }

    /// Append-only; ids are millisecond timestamps bumped to stay strictly increasing.
    pub(crate) fn append(
        &mut self,
        sender: Sender,
        text: String,
        original_query: Option<String>,
        now_ms: u64,
    ) -> MessageId {
        let id = now_ms.max(self.last_id.saturating_add(1));
        self.last_id = id;
        let id = MessageId(id);
        self.history.push(Message {
            id,
            sender,
            text,
            original_query,
        });
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Transient alert shown over the screen until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    IngestText,
    FilePath,
    Query,
    History,
}

impl FocusPane {
    pub fn next(self) -> Self {
        match self {
            Self::IngestText => Self::FilePath,
            Self::FilePath => Self::Query,
            Self::Query => Self::History,
            Self::History => Self::IngestText,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::IngestText => Self::History,
            Self::FilePath => Self::IngestText,
            Self::Query => Self::FilePath,
            Self::History => Self::Query,
        }
    }

    /// The text field edited while this pane has focus.
    pub fn input_field(self) -> Option<InputField> {
        match self {
            Self::IngestText => Some(InputField::IngestText),
            Self::FilePath => Some(InputField::FilePath),
            Self::Query => Some(InputField::Query),
            Self::History => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::IngestText => "Ingest text",
            Self::FilePath => "Ingest file",
            Self::Query => "Query",
            Self::History => "History",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    IngestText,
    FilePath,
    Query,
}

#[derive(Debug, Clone)]
pub struct ClientInteraction {
    pub focus: FocusPane,
    pub notice: Option<Notice>,
    pub show_activity: bool,
    pub selected_answer: Option<MessageId>,
}

impl Default for ClientInteraction {
    fn default() -> Self {
        Self {
            focus: FocusPane::Query,
            notice: None,
            show_activity: false,
            selected_answer: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    Ingestion,
    Conversation,
    Feedback,
    Client,
}

impl LogSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ingestion => "ingest",
            Self::Conversation => "query",
            Self::Feedback => "feedback",
            Self::Client => "client",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub seq: u64,
    pub level: LogLevel,
    pub ts_ms: Option<u64>,
    pub source: LogSource,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LogBuffer {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            next_seq: 1,
            buf: VecDeque::with_capacity(cap.max(1)),
        }
    }

    pub fn append(&mut self, mut entry: LogEntry) {
        entry.seq = self.next_seq;
        self.next_seq += 1;

        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.next_seq = 1;
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.buf.iter()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ClientState {
    pub config: Config,
    pub ingestion: IngestionState,
    pub conversation: ConversationState,
    pub interaction: ClientInteraction,
    pub logs: LogBuffer,
}

impl ClientState {
    pub fn new(config: Config) -> Self {
        let logs = LogBuffer::new(config.ui.log_capacity);
        Self {
            config,
            ingestion: IngestionState::default(),
            conversation: ConversationState::default(),
            interaction: ClientInteraction::default(),
            logs,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.backend.base_url
    }

    pub fn input(&self, field: InputField) -> &str {
        match field {
            InputField::IngestText => &self.ingestion.text_buffer,
            InputField::FilePath => &self.ingestion.file_path_input,
            InputField::Query => &self.conversation.query_buffer,
        }
    }

    pub(crate) fn input_mut(&mut self, field: InputField) -> &mut String {
        match field {
            InputField::IngestText => &mut self.ingestion.text_buffer,
            InputField::FilePath => &mut self.ingestion.file_path_input,
            InputField::Query => &mut self.conversation.query_buffer,
        }
    }

    /// Assistant answers that can be selected in the history pane, oldest first.
    pub fn answer_ids(&self) -> Vec<MessageId> {
        self.conversation
            .history()
            .iter()
            .filter(|message| message.sender == Sender::Assistant)
            .map(|message| message.id)
            .collect()
    }
}

pub fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
