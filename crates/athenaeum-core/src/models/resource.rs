use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError as FieldValidationError};

use super::enums::{AcademicLevel, Category, Department, Visibility};
use crate::error::ValidationError;

/// Opaque catalog-assigned resource identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Catalog record: one logical resource referencing one or more stored files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ResourceRecord")]
pub struct Resource {
    pub resource_id: ResourceId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub department: Department,
    pub visibility: Visibility,
    pub academic_level: AcademicLevel,
    pub file_urls: Vec<String>,
    pub downloads: u64,
    pub view_count: u64,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Wire shape of a catalog record. Mongo-style payloads may carry `_id`,
/// `id`, or both next to each other.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceRecord {
    #[serde(default)]
    resource_id: Option<ResourceId>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<ResourceId>,
    #[serde(default)]
    id: Option<ResourceId>,
    title: String,
    #[serde(default)]
    description: String,
    category: Category,
    department: Department,
    #[serde(default)]
    visibility: Visibility,
    #[serde(default)]
    academic_level: AcademicLevel,
    file_urls: Vec<String>,
    #[serde(default)]
    downloads: u64,
    #[serde(default)]
    view_count: u64,
    #[serde(default)]
    is_deleted: bool,
    #[serde(default)]
    deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    deleted_by: Option<String>,
    #[serde(default)]
    created_by: Option<String>,
    #[serde(default)]
    updated_by: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ResourceRecord> for Resource {
    type Error = String;

    fn try_from(record: ResourceRecord) -> Result<Self, Self::Error> {
        let resource_id = record
            .resource_id
            .or(record.mongo_id)
            .or(record.id)
            .ok_or_else(|| "missing field `_id`".to_string())?;

        Ok(Self {
            resource_id,
            title: record.title,
            description: record.description,
            category: record.category,
            department: record.department,
            visibility: record.visibility,
            academic_level: record.academic_level,
            file_urls: record.file_urls,
            downloads: record.downloads,
            view_count: record.view_count,
            is_deleted: record.is_deleted,
            deleted_at: record.deleted_at,
            deleted_by: record.deleted_by,
            created_by: record.created_by,
            updated_by: record.updated_by,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Visibility state of a resource record. A permanently deleted resource has
/// no record at all, so it has no state here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Active,
    Trashed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Active => write!(f, "active"),
            LifecycleState::Trashed => write!(f, "trashed"),
        }
    }
}

impl Resource {
    pub fn lifecycle_state(&self) -> LifecycleState {
        if self.is_deleted {
            LifecycleState::Trashed
        } else {
            LifecycleState::Active
        }
    }

    /// Case-insensitive comparison used for duplicate detection.
    pub fn title_matches(&self, title: &str) -> bool {
        normalize_title(&self.title) == normalize_title(title)
    }
}

/// Normalized form of a title used as the deduplication key.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Validated metadata for a new resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub department: Department,
    pub visibility: Visibility,
    pub academic_level: AcademicLevel,
}

/// Create payload sent to the catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest<'a> {
    #[serde(flatten)]
    pub metadata: &'a ResourceMetadata,
    pub file_urls: &'a [String],
}

fn not_blank(value: &str) -> Result<(), FieldValidationError> {
    if value.trim().is_empty() {
        let mut err = FieldValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Raw upload form state. Category and department stay unset until the user
/// picks them; `validate_into_metadata` turns the draft into metadata or
/// field-level errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ResourceDraft {
    #[validate(
        custom(function = "not_blank", message = "Title is required"),
        length(max = 200, message = "Title is too long")
    )]
    pub title: String,
    #[validate(
        custom(function = "not_blank", message = "Description is required"),
        length(max = 5000, message = "Description is too long")
    )]
    pub description: String,
    #[validate(required(message = "Category is required"))]
    pub category: Option<Category>,
    #[validate(required(message = "Department is required"))]
    pub department: Option<Department>,
    pub visibility: Visibility,
    pub academic_level: AcademicLevel,
}

impl ResourceDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_department(mut self, department: Department) -> Self {
        self.department = Some(department);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_academic_level(mut self, academic_level: AcademicLevel) -> Self {
        self.academic_level = academic_level;
        self
    }

    pub fn validate_into_metadata(&self) -> Result<ResourceMetadata, ValidationError> {
        self.validate()?;
        match (self.category, self.department) {
            (Some(category), Some(department)) => Ok(ResourceMetadata {
                title: self.title.trim().to_string(),
                description: self.description.trim().to_string(),
                category,
                department,
                visibility: self.visibility,
                academic_level: self.academic_level,
            }),
            // validate() has already reported missing choices
            _ => Err(ValidationError::MissingFields(Vec::new())),
        }
    }
}

/// Partial update; absent fields are left untouched by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_level: Option<AcademicLevel>,
}

impl ResourcePatch {
    pub fn is_empty(&self) -> bool {
        self == &ResourcePatch::default()
    }
}
