//! Date-range and identifier selection shared by search and export.

use chrono::NaiveDate;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, Select};
use serde::Deserialize;

use crate::entities::{cycle, vehicle};
use crate::models::forms::parse_date;
use crate::utils::paths::normalize_identifier;

/// Raw selection parameters as they arrive in a query string.
#[derive(Debug, Default, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterParams {
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Identifier substring, matched case-insensitively.
    pub q: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    query: Option<String>,
    unsatisfiable: bool,
}

/// Escape LIKE wildcard characters in a search string.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Blank values count as absent; anything else must parse or the whole
/// filter matches nothing.
fn bound(raw: Option<&str>) -> Result<Option<NaiveDate>, ()> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => parse_date(value).map(Some).ok_or(()),
    }
}

impl RecordFilter {
    /// Reversed bounds are swapped. The query is normalized like an
    /// identifier and lowercased; a blank query selects everything.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>, query: Option<&str>) -> Self {
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) if s > e => (Some(e), Some(s)),
            other => other,
        };
        let query = query
            .map(normalize_identifier)
            .filter(|q| !q.is_empty())
            .map(|q| q.to_lowercase());

        Self {
            start,
            end,
            query,
            unsatisfiable: false,
        }
    }

    pub fn from_params(params: &FilterParams) -> Self {
        match (
            bound(params.start_date.as_deref()),
            bound(params.end_date.as_deref()),
        ) {
            (Ok(start), Ok(end)) => Self::new(start, end, params.q.as_deref()),
            _ => {
                tracing::debug!(
                    start = ?params.start_date,
                    end = ?params.end_date,
                    "Filter | unparsable date bound, selecting nothing"
                );
                Self {
                    unsatisfiable: true,
                    ..Self::default()
                }
            }
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn is_unsatisfiable(&self) -> bool {
        self.unsatisfiable
    }

    fn condition<C: ColumnTrait + 'static>(&self, date_col: C, ident_col: C) -> Condition {
        let mut condition = Condition::all();
        if self.unsatisfiable {
            return condition.add(Expr::val(1).eq(0));
        }
        if let Some(start) = self.start {
            condition = condition.add(date_col.gte(start));
        }
        if let Some(end) = self.end {
            condition = condition.add(date_col.lte(end));
        }
        if let Some(query) = &self.query {
            let pattern: SimpleExpr = Expr::expr(Func::lower(Expr::col(ident_col)))
                .like(LikeExpr::new(format!("%{}%", escape_like(query))).escape('\\'));
            condition = condition.add(pattern);
        }
        condition
    }

    /// Matches on `date` and `cycle_id`.
    pub fn cycles(&self) -> Select<cycle::Entity> {
        cycle::Entity::find().filter(self.condition(cycle::Column::Date, cycle::Column::CycleId))
    }

    /// Matches on `entry_date` and `car_number`.
    pub fn vehicles(&self) -> Select<vehicle::Entity> {
        vehicle::Entity::find().filter(
            self.condition(vehicle::Column::EntryDate, vehicle::Column::CarNumber),
        )
    }

    /// `{base}_{start}_to_{end}.zip`, `{base}_from_{start}.zip`,
    /// `{base}_until_{end}.zip` or `{base}.zip`.
    pub fn archive_name(&self, base: &str) -> String {
        match (self.start, self.end) {
            (Some(start), Some(end)) => format!("{base}_{start}_to_{end}.zip"),
            (Some(start), None) => format!("{base}_from_{start}.zip"),
            (None, Some(end)) => format!("{base}_until_{end}.zip"),
            (None, None) => format!("{base}.zip"),
        }
    }
}
