use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocksmith_core::{DomainError, DomainResult, LocationId};

/// Physical stock location (shelf, warehouse, shop floor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Command: create a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLocation {
    pub location_id: LocationId,
    pub name: String,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: update a location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLocation {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub occurred_at: DateTime<Utc>,
}

impl Location {
    pub fn create(cmd: CreateLocation) -> DomainResult<Self> {
        let name = cmd.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            id: cmd.location_id,
            name,
            description: cmd.description,
            created_at: cmd.occurred_at,
            updated_at: cmd.occurred_at,
        })
    }

    pub fn update(&mut self, cmd: UpdateLocation) -> DomainResult<()> {
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
    fn create_location_rejects_empty_name() {
        let err = Location::create(CreateLocation {
            location_id: LocationId::new(),
            name: " ".to_string(),
            description: None,
            occurred_at: Utc::now(),
        })
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
