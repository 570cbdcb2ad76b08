use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocksmith_core::{DomainError, DomainResult, TodoId};

/// Todo status. Transitions are unconstrained (simple business tooling).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Open,
    InProgress,
    Done,
}

/// Todo priority.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Command: create a todo item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub todo_id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: update a todo item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TodoStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub occurred_at: DateTime<Utc>,
}

impl TodoItem {
    pub fn create(cmd: CreateTodo) -> DomainResult<Self> {
        let title = cmd.title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        Ok(Self {
            id: cmd.todo_id,
            title,
            description: cmd.description,
            status: TodoStatus::Open,
            priority: cmd.priority,
            due_date: cmd.due_date,
            created_at: cmd.occurred_at,
            updated_at: cmd.occurred_at,
        })
    }

    pub fn update(&mut self, cmd: UpdateTodo) -> DomainResult<()> {
        if let Some(title) = cmd.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(DomainError::validation("title cannot be empty"));
            }
            self.title = title;
        }
        if let Some(description) = cmd.description {
            self.description = description;
        }
        if let Some(status) = cmd.status {
            self.status = status;
        }
        if let Some(priority) = cmd.priority {
            self.priority = priority;
        }
        if let Some(due_date) = cmd.due_date {
            self.due_date = due_date;
        }
        self.updated_at = cmd.occurred_at;
        Ok(())
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TodoStatus::Done && self.due_date.is_some_and(|due| due < now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_cmd() -> CreateTodo {
        CreateTodo {
            todo_id: TodoId::new(),
            title: "Restock shelf B".to_string(),
            description: None,
            priority: Priority::High,
            due_date: None,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn new_todo_starts_open() {
        let todo = TodoItem::create(create_cmd()).unwrap();
        assert_eq!(todo.status, TodoStatus::Open);
        assert_eq!(todo.priority, Priority::High);
    }

    #[test]
    fn status_can_move_freely() {
        let mut todo = TodoItem::create(create_cmd()).unwrap();
        todo.update(UpdateTodo {
            status: Some(TodoStatus::Done),
            occurred_at: Utc::now(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(todo.status, TodoStatus::Done);

        // Reopening is allowed.
        todo.update(UpdateTodo {
            status: Some(TodoStatus::Open),
            occurred_at: Utc::now(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(todo.status, TodoStatus::Open);
    }

    #[test]
    fn done_items_are_never_overdue() {
        let now = Utc::now();
        let mut cmd = create_cmd();
        cmd.due_date = Some(now - Duration::days(1));
        let mut todo = TodoItem::create(cmd).unwrap();
        assert!(todo.is_overdue(now));

        todo.update(UpdateTodo {
            status: Some(TodoStatus::Done),
            occurred_at: now,
            ..Default::default()
        })
        .unwrap();
        assert!(!todo.is_overdue(now));
    }
}
