use serde::{Deserialize, Serialize};

use crate::models::Pagination;

/// Single-resource envelope: `{ "data": { ... } }`.
#[derive(Debug, Deserialize, Serialize)]
pub struct DataWrapper<T> {
    pub data: T,
}

/// Collection envelope: `{ "data": [...], "meta": { "pagination": { ... } } }`.
#[derive(Debug, Deserialize, Serialize)]
pub struct CollectionWrapper<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Meta,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorWrapper {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub name: Option<String>,
    pub message: String,
}

impl<T> DataWrapper<T> {
    pub fn wrap(data: T) -> DataWrapper<T> {
        DataWrapper { data }
    }
}

impl<T> CollectionWrapper<T> {
    /// Pagination metadata, or a single page describing `data` when the server omitted it.
    pub fn pagination(&self) -> Pagination {
        self.meta.pagination.unwrap_or(Pagination {
            page: 1,
            page_size: self.data.len() as u32,
            page_count: 1,
            total: self.data.len() as u64,
        })
    }
}
