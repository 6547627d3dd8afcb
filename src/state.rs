use crate::config::ModelId;
use crate::core::error::BotError;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

impl ResponseFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ResponseFormat::Text),
            "json" => Some(ResponseFormat::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Text => "text",
            ResponseFormat::Json => "json",
        }
    }
}

impl Default for ResponseFormat {
    fn default() -> Self {
        ResponseFormat::Text
    }
}

/// Per-user selection, created lazily with defaults on first interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserState {
    pub selected_model: ModelId,
    pub response_format: ResponseFormat,
}

/// In-memory store of user selections, shared across update tasks.
///
/// Entries are independent; one mutex around the map makes each single-key
/// read-modify-write atomic. The lock is never held across an await.
pub struct UserStateStore {
    registered: Vec<ModelId>,
    default_model: ModelId,
    states: Mutex<HashMap<i64, UserState>>,
}

impl UserStateStore {
    pub fn new(registered: Vec<ModelId>, default_model: ModelId) -> Self {
        Self {
            registered,
            default_model,
            states: Mutex::new(HashMap::new()),
        }
    }

    fn default_state(&self) -> UserState {
        UserState {
            selected_model: self.default_model,
            response_format: ResponseFormat::default(),
        }
    }

    pub fn is_registered(&self, model: ModelId) -> bool {
        self.registered.contains(&model)
    }

    /// Returns the user's state, creating and storing the default on first use.
    pub fn state(&self, user_id: i64) -> UserState {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        *states.entry(user_id).or_insert_with(|| self.default_state())
    }

    pub fn set_model(&self, user_id: i64, model: ModelId) -> Result<(), BotError> {
        if !self.is_registered(model) {
            return Err(BotError::InvalidModel(model.as_str().to_string()));
        }
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states
            .entry(user_id)
            .or_insert_with(|| self.default_state())
            .selected_model = model;
        Ok(())
    }

    pub fn set_format(&self, user_id: i64, format: ResponseFormat) {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states
            .entry(user_id)
            .or_insert_with(|| self.default_state())
            .response_format = format;
    }
}
