use todo_core::{TodoItem, UiState};

pub fn render(state: &UiState) -> String {
    match state {
        UiState::Loading => "Loading todos...".to_string(),
        UiState::Success(items) if items.is_empty() => "No todos to show.".to_string(),
        UiState::Success(items) => items.iter().map(render_item).collect::<Vec<_>>().join("\n"),
        UiState::Error(message) => format!("Could not load todos: {message}"),
    }
}

fn render_item(item: &TodoItem) -> String {
    let mark = if item.completed { "[x]" } else { "[ ]" };
    format!("{mark} #{:<4} user {:<4} {}", item.id, item.user_id, item.title)
}
