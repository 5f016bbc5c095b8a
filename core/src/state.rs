//! Presentation state for the todo list screen.

use crate::types::TodoItem;

/// Exactly one of these is current at any time. A new load replaces the
/// whole value; stale items are never shown next to `Loading` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Loading,
    Success(Vec<TodoItem>),
    Error(String),
}

impl UiState {
    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }

    pub fn items(&self) -> Option<&[TodoItem]> {
        match self {
            UiState::Success(items) => Some(items),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            UiState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// A successful load that returned nothing (the "empty" view, as opposed
    /// to an error).
    pub fn is_empty(&self) -> bool {
        matches!(self, UiState::Success(items) if items.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_loading() {
        assert!(UiState::default().is_loading());
    }

    #[test]
    fn empty_success_is_not_an_error() {
        let state = UiState::Success(Vec::new());
        assert!(state.is_empty());
        assert_eq!(state.items(), Some(&[][..]));
        assert_eq!(state.error_message(), None);
    }

    #[test]
    fn error_is_not_empty() {
        let state = UiState::Error("boom".to_string());
        assert!(!state.is_empty());
        assert!(!state.is_loading());
        assert_eq!(state.items(), None);
        assert_eq!(state.error_message(), Some("boom"));
    }
}
