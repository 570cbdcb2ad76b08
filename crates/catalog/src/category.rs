use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocksmith_core::{CategoryId, DomainError, DomainResult};

/// Product category.
///
/// Name uniqueness is enforced at the service layer (it needs a repo lookup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Command: create a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: update a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub occurred_at: DateTime<Utc>,
}

impl Category {
    pub fn create(cmd: CreateCategory) -> DomainResult<Self> {
        let name = cmd.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            id: cmd.category_id,
            name,
            description: cmd.description,
            created_at: cmd.occurred_at,
            updated_at: cmd.occurred_at,
        })
    }

    pub fn update(&mut self, cmd: UpdateCategory) -> DomainResult<()> {
        if let Some(name) = cmd.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(description) = cmd.description {
            self.description = description;
        }
        self.updated_at = cmd.occurred_at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_category_trims_name() {
        let category = Category::create(CreateCategory {
            category_id: CategoryId::new(),
            name: "  Beverages ".to_string(),
            description: None,
            occurred_at: Utc::now(),
        })
        .unwrap();
        assert_eq!(category.name, "Beverages");
    }

    #[test]
    fn rename_to_empty_is_rejected() {
        let mut category = Category::create(CreateCategory {
            category_id: CategoryId::new(),
            name: "Beverages".to_string(),
            description: None,
            occurred_at: Utc::now(),
        })
        .unwrap();

        let err = category
            .update(UpdateCategory {
                name: Some("".to_string()),
                occurred_at: Utc::now(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(category.name, "Beverages");
    }
}
