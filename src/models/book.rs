//! Book (catalog record) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Full book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    /// Publication year
    pub year: Option<i32>,
    /// ISBN, unique across the catalog
    pub isbn: String,
    pub available: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    pub description: Option<String>,
    pub year: Option<i32>,
    #[validate(length(min = 1, max = 20, message = "ISBN must be 1-20 characters"))]
    pub isbn: String,
    pub available: Option<bool>,
}

/// Update book request (partial update)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: Option<String>,
    pub description: Option<String>,
    pub year: Option<i32>,
    #[validate(length(min = 1, max = 20, message = "ISBN must be 1-20 characters"))]
    pub isbn: Option<String>,
    pub available: Option<bool>,
}

/// Book query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Exact ISBN lookup
    pub isbn: Option<String>,
}
