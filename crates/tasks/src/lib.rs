//! `stocksmith-tasks` — lightweight todo items for shop staff.

pub mod todo;

pub use todo::{CreateTodo, Priority, TodoItem, TodoStatus, UpdateTodo};
