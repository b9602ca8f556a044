use crate::ids::{ProfileId, ResidenceId, VisitId};
use crate::is_present;
use crate::model::UnknownVariant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisitType {
    #[default]
    Visit,
    Service,
    Recurring,
}

impl VisitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitType::Visit => "visit",
            VisitType::Service => "service",
            VisitType::Recurring => "recurring",
        }
    }
}

impl Display for VisitType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visit" => Ok(VisitType::Visit),
            "service" => Ok(VisitType::Service),
            "recurring" => Ok(VisitType::Recurring),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Visit {
    pub id: VisitId,
    pub visitor_name: String,
    pub visitor_surname: String,
    pub visitor_doc_id: String,
    pub visit_type: VisitType,
    pub scheduled_at: DateTime<Utc>,
    pub residence_id: ResidenceId,
    pub created_by: ProfileId,
    pub active: bool,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

impl Visit {
    pub fn create(id: VisitId, new_visit: NewVisit) -> Self {
        Self {
            id,
            visitor_name: new_visit.visitor_name,
            visitor_surname: new_visit.visitor_surname,
            visitor_doc_id: new_visit.visitor_doc_id,
            visit_type: new_visit.visit_type,
            scheduled_at: new_visit.scheduled_at,
            residence_id: new_visit.residence_id,
            created_by: new_visit.created_by,
            active: new_visit.active,
            created: Utc::now(),
            updated: None,
        }
    }
}

/// A visit that passed validation and is ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisit {
    pub visitor_name: String,
    pub visitor_surname: String,
    pub visitor_doc_id: String,
    pub visit_type: VisitType,
    pub scheduled_at: DateTime<Utc>,
    pub residence_id: ResidenceId,
    pub created_by: ProfileId,
    pub active: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VisitValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("'{0}' is not a valid residence id")]
    InvalidResidenceId(String),
}

/// Visit registration input as submitted by a resident. Text fields may be blank,
/// [`VisitRequest::validate`] decides whether they are usable.
#[derive(Debug, Clone)]
pub struct VisitRequest {
    pub visitor_name: String,
    pub visitor_surname: String,
    pub visitor_doc_id: String,
    pub visit_type: VisitType,
    pub scheduled_at: DateTime<Utc>,
    pub residence_id: String,
    pub activate_immediately: bool,
}

impl VisitRequest {
    /// Checks every required field and trims the visitor details.
    /// The scheduled time may be in the past.
    pub fn validate(self, created_by: ProfileId) -> Result<NewVisit, VisitValidationError> {
        let required = [
            ("visitor name", &self.visitor_name),
            ("visitor surname", &self.visitor_surname),
            ("visitor document id", &self.visitor_doc_id),
            ("residence id", &self.residence_id),
        ];

        if let Some((field, _)) = required.into_iter().find(|(_, value)| !is_present(value)) {
            return Err(VisitValidationError::Missing(field));
        }

        let residence_id = self
            .residence_id
            .parse::<ResidenceId>()
            .map_err(|_| VisitValidationError::InvalidResidenceId(self.residence_id.clone()))?;

        Ok(NewVisit {
            visitor_name: self.visitor_name.trim().to_string(),
            visitor_surname: self.visitor_surname.trim().to_string(),
            visitor_doc_id: self.visitor_doc_id.trim().to_string(),
            visit_type: self.visit_type,
            scheduled_at: self.scheduled_at,
            residence_id,
            created_by,
            active: self.activate_immediately,
        })
    }
}
