// SPDX-License-Identifier: Apache-2.0

use crate::executor::ExecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryErrorCode {
    Validation,
    Sql,
    Unavailable,
}

impl QueryErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "query_validation",
            Self::Sql => "query_sql",
            Self::Unavailable => "source_unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub code: QueryErrorCode,
    pub message: String,
}

impl QueryError {
    #[must_use]
    pub fn new(code: QueryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}
impl std::error::Error for QueryError {}

impl From<ExecError> for QueryError {
    fn from(value: ExecError) -> Self {
        match value {
            ExecError::Sql(msg) => Self::new(QueryErrorCode::Sql, msg),
            ExecError::Validation(msg) => Self::new(QueryErrorCode::Validation, msg),
            ExecError::Unavailable(msg) => Self::new(QueryErrorCode::Unavailable, msg),
        }
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::new(QueryErrorCode::Sql, value.to_string())
    }
}
