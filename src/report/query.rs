use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::ReportStatus;

use super::access::QueryScope;

/// Raw listing parameters as they arrive on the query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub date: Option<String>,
    pub status: Option<String>,
    pub uploader_id: Option<Uuid>,
    pub uploader_name: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploaderFilter {
    Id(Uuid),
    /// "First Last"; resolved to owner ids by exact match before querying.
    Name(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilters {
    pub date: Option<NaiveDate>,
    pub status: Option<ReportStatus>,
    pub uploader: Option<UploaderFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Owner,
}

impl SortField {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "created_at" | "createdAt" => Ok(SortField::CreatedAt),
            "owner" | "employee" => Ok(SortField::Owner),
            other => Err(AppError::BadRequest(format!("Unknown sort field '{other}'"))),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "r.created_at",
            SortField::Owner => "owner_name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(AppError::BadRequest(format!("Unknown sort direction '{other}'"))),
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Zero-based page of fixed size. Indexes past the addressable range saturate to
/// an offset beyond every row, so they read as an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub index: i64,
    pub size: i64,
}

impl Page {
    pub fn offset(&self) -> i64 {
        self.index.saturating_mul(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub scope_owner: Option<Uuid>,
    pub owner_filter: Option<Vec<Uuid>>,
    pub status: Option<ReportStatus>,
    pub date: Option<NaiveDate>,
    pub sort: SortField,
    pub direction: SortDirection,
    pub page: Page,
}

impl ReportQuery {
    /// Combines the caller's scope with user filters. The scope always stays in
    /// force; an uploader filter can only narrow it.
    pub fn new(
        scope: QueryScope,
        filters: &ReportFilters,
        owner_filter: Option<Vec<Uuid>>,
        sort: SortField,
        direction: SortDirection,
        page: Page,
    ) -> Self {
        Self {
            scope_owner: scope.owner(),
            owner_filter,
            status: filters.status,
            date: filters.date,
            sort,
            direction,
            page,
        }
    }
}

pub struct ParsedParams {
    pub filters: ReportFilters,
    pub sort: SortField,
    pub direction: SortDirection,
    pub page_index: i64,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ListParams {
    pub fn parse(&self) -> Result<ParsedParams, AppError> {
        let date = non_empty(&self.date)
            .map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .map_err(|_| AppError::BadRequest(format!("Invalid date '{d}', expected YYYY-MM-DD")))
            })
            .transpose()?;

        let status = non_empty(&self.status)
            .map(|s| {
                s.parse::<ReportStatus>()
                    .map_err(|e| AppError::InvalidStatus(e.to_string()))
            })
            .transpose()?;

        let uploader = match (self.uploader_id, non_empty(&self.uploader_name)) {
            (Some(id), _) => Some(UploaderFilter::Id(id)),
            (None, Some(name)) => Some(UploaderFilter::Name(name.to_string())),
            (None, None) => None,
        };

        let sort = non_empty(&self.sort)
            .map(SortField::parse)
            .transpose()?
            .unwrap_or(SortField::CreatedAt);

        let direction = non_empty(&self.direction)
            .map(SortDirection::parse)
            .transpose()?
            .unwrap_or(SortDirection::Desc);

        let page_index = self.page.unwrap_or(0);
        if page_index < 0 {
            return Err(AppError::BadRequest("Page index must not be negative".to_string()));
        }

        Ok(ParsedParams {
            filters: ReportFilters {
                date,
                status,
                uploader,
            },
            sort,
            direction,
            page_index,
        })
    }
}
