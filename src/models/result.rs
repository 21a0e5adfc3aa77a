use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEntry {
    pub message: String,
    pub code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl ErrorEntry {
    pub fn new(message: impl Into<String>, code: u16) -> Self {
        Self {
            message: message.into(),
            code,
            data: None,
        }
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok(Option<T>),
    Err(Vec<ErrorEntry>),
}

/// Data-or-errors accumulator. Starts successful with no data; the first
/// recorded error moves it to `Err` for good.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult<T> {
    outcome: Outcome<T>,
}

impl<T> Default for OperationResult<T> {
    fn default() -> Self {
        Self {
            outcome: Outcome::Ok(None),
        }
    }
}

impl<T> OperationResult<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Ok(_))
    }

    pub fn add_error(&mut self, error: ErrorEntry) {
        if let Outcome::Err(errors) = &mut self.outcome {
            errors.push(error);
            return;
        }
        self.outcome = Outcome::Err(vec![error]);
    }

    /// Ignored once an error has been recorded.
    pub fn set_result(&mut self, data: T) {
        if let Outcome::Ok(slot) = &mut self.outcome {
            *slot = Some(data);
        }
    }

    pub fn data(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Ok(data) => data.as_ref(),
            Outcome::Err(_) => None,
        }
    }

    pub fn errors(&self) -> &[ErrorEntry] {
        match &self.outcome {
            Outcome::Ok(_) => &[],
            Outcome::Err(errors) => errors,
        }
    }

    pub fn outcome(&self) -> &Outcome<T> {
        &self.outcome
    }
}

/// Outcome of one notification channel.
///
/// A channel counts as sent only when nothing went wrong *and* the transport
/// reported delivery. Channels that were never tried stay `not_attempted`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSendResult {
    attempted: bool,
    result: OperationResult<bool>,
}

impl ChannelSendResult {
    pub fn not_attempted() -> Self {
        Self {
            attempted: false,
            result: OperationResult::new(),
        }
    }

    pub fn attempted() -> Self {
        Self {
            attempted: true,
            result: OperationResult::new(),
        }
    }

    pub fn was_attempted(&self) -> bool {
        self.attempted
    }

    pub fn add_error(&mut self, error: ErrorEntry) {
        self.result.add_error(error);
    }

    pub fn set_result(&mut self, delivered: bool) {
        self.result.set_result(delivered);
    }

    pub fn is_effectively_sent(&self) -> bool {
        self.result.is_success() && self.result.data() == Some(&true)
    }

    pub fn errors(&self) -> &[ErrorEntry] {
        self.result.errors()
    }
}

#[derive(Serialize)]
struct ChannelView<'a> {
    attempted: bool,
    success: bool,
    errors: &'a [ErrorEntry],
}

impl Serialize for ChannelSendResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ChannelView {
            attempted: self.attempted,
            success: self.is_effectively_sent(),
            errors: self.errors(),
        }
        .serialize(serializer)
    }
}
