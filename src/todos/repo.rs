use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Todo record. Serialized field names mirror the document-store wire shape
/// clients already expect; `completed_at` is milliseconds since epoch.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Todo {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "_creator")]
    pub creator: Uuid,
    pub text: String,
    pub completed: bool,
    #[serde(rename = "completedAt")]
    pub completed_at: Option<i64>,
}

const TODO_COLUMNS: &str = "id, creator, text, completed, completed_at";

pub async fn insert(db: &PgPool, creator: Uuid, text: &str) -> sqlx::Result<Todo> {
    sqlx::query_as::<_, Todo>(&format!(
        r#"
        INSERT INTO todos (creator, text)
        VALUES ($1, $2)
        RETURNING {TODO_COLUMNS}
        "#,
    ))
    .bind(creator)
    .bind(text)
    .fetch_one(db)
    .await
}

pub async fn list_by_creator(db: &PgPool, creator: Uuid) -> sqlx::Result<Vec<Todo>> {
    sqlx::query_as::<_, Todo>(&format!(
        r#"
        SELECT {TODO_COLUMNS}
        FROM todos
        WHERE creator = $1
        ORDER BY created_at
        "#,
    ))
    .bind(creator)
    .fetch_all(db)
    .await
}

/// Every by-id query filters on creator as well, so a foreign id behaves
/// exactly like a missing one.
pub async fn find(db: &PgPool, id: Uuid, creator: Uuid) -> sqlx::Result<Option<Todo>> {
    sqlx::query_as::<_, Todo>(&format!(
        r#"
        SELECT {TODO_COLUMNS}
        FROM todos
        WHERE id = $1 AND creator = $2
        "#,
    ))
    .bind(id)
    .bind(creator)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid, creator: Uuid) -> sqlx::Result<Option<Todo>> {
    sqlx::query_as::<_, Todo>(&format!(
        r#"
        DELETE FROM todos
        WHERE id = $1 AND creator = $2
        RETURNING {TODO_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(creator)
    .fetch_optional(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    creator: Uuid,
    text: Option<&str>,
    completed: bool,
    completed_at: Option<i64>,
) -> sqlx::Result<Option<Todo>> {
    sqlx::query_as::<_, Todo>(&format!(
        r#"
        UPDATE todos
        SET text = COALESCE($3, text),
            completed = $4,
            completed_at = $5
        WHERE id = $1 AND creator = $2
        RETURNING {TODO_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(creator)
    .bind(text)
    .bind(completed)
    .bind(completed_at)
    .fetch_optional(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_wire_shape() {
        let todo = Todo {
            id: Uuid::new_v4(),
            creator: Uuid::new_v4(),
            text: "buy milk".into(),
            completed: false,
            completed_at: None,
        };

        let value = serde_json::to_value(&todo).unwrap();
        assert!(value.get("_id").is_some());
        assert!(value.get("_creator").is_some());
        assert_eq!(value["text"], "buy milk");
        assert_eq!(value["completed"], false);
        assert!(value["completedAt"].is_null());
    }

    #[test]
    fn completed_at_serializes_as_number() {
        let todo = Todo {
            id: Uuid::new_v4(),
            creator: Uuid::new_v4(),
            text: "done".into(),
            completed: true,
            completed_at: Some(333),
        };

        let value = serde_json::to_value(&todo).unwrap();
        assert_eq!(value["completedAt"], 333);
    }
}
