use serde::{Deserialize, Serialize};

use super::repo::Todo;

/// Request body for creating a todo. The creator is never taken from the
/// payload; any injected `_creator` field is dropped on deserialization.
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub text: String,
}

/// Request body for updating a todo. Only `text` and `completed` are
/// accepted; everything else, `completedAt` included, is dropped.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TodoBody {
    pub todo: Todo,
}

#[derive(Debug, Serialize)]
pub struct TodoList {
    pub todos: Vec<Todo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_payload_allow_list() {
        // Injected fields beyond the allow-list are silently dropped.
        let body: UpdateTodoRequest = serde_json::from_value(json!({
            "text": "walk the dog",
            "completed": true,
            "completedAt": 12345,
            "_creator": "11111111-1111-1111-1111-111111111111",
            "_id": "22222222-2222-2222-2222-222222222222"
        }))
        .unwrap();

        assert_eq!(body.text.as_deref(), Some("walk the dog"));
        assert_eq!(body.completed, Some(true));
    }

    #[test]
    fn create_payload_ignores_creator() {
        let body: CreateTodoRequest = serde_json::from_value(json!({
            "text": "buy milk",
            "_creator": "11111111-1111-1111-1111-111111111111"
        }))
        .unwrap();

        assert_eq!(body.text, "buy milk");
    }

    #[test]
    fn update_payload_fields_optional() {
        let body: UpdateTodoRequest = serde_json::from_value(json!({})).unwrap();
        assert!(body.text.is_none());
        assert!(body.completed.is_none());
    }
}
