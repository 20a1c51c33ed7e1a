// SPDX-License-Identifier: Apache-2.0

//! Query execution against an opaque data source.
//!
//! Every source must apply one predicate set to both the page window and the
//! total count. Failures are returned as-is; nothing here retries.

use crate::limits::QueryLimits;
use crate::planner::{PageWindow, QueryPlan};
use crate::query_error::QueryError;
use cardex_model::Page;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    Sql(String),
    Validation(String),
    Unavailable(String),
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sql(msg) | Self::Validation(msg) | Self::Unavailable(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ExecError {}

/// Backing store collaborator.
pub trait DataSource {
    fn execute(&self, plan: &QueryPlan) -> Result<Page, ExecError>;
}

impl<T: DataSource + ?Sized> DataSource for &T {
    fn execute(&self, plan: &QueryPlan) -> Result<Page, ExecError> {
        (**self).execute(plan)
    }
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn execute(&self, plan: &QueryPlan) -> Result<Page, ExecError> {
        (**self).execute(plan)
    }
}

pub fn validate_window(window: PageWindow, limits: &QueryLimits) -> Result<(), ExecError> {
    if window.limit == 0 {
        return Err(ExecError::Validation("limit must be > 0".to_string()));
    }
    if window.limit > limits.max_limit {
        return Err(ExecError::Validation(format!(
            "limit {} exceeds max_limit {}",
            window.limit, limits.max_limit
        )));
    }
    Ok(())
}

pub fn execute(
    source: &dyn DataSource,
    plan: &QueryPlan,
    limits: &QueryLimits,
) -> Result<Page, QueryError> {
    validate_window(plan.window, limits)?;
    match source.execute(plan) {
        Ok(page) => {
            debug!(
                predicates = plan.predicates.len(),
                offset = plan.window.offset,
                limit = plan.window.limit,
                returned = page.items.len(),
                total = page.total,
                "query executed"
            );
            Ok(page)
        }
        Err(err) => {
            warn!(
                error = %err,
                offset = plan.window.offset,
                limit = plan.window.limit,
                "query execution failed"
            );
            Err(err.into())
        }
    }
}
