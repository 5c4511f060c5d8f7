//! `SQLite` implementation of [`RestaurantStore`].
//!
//! All queries are raw SQL through `query_raw_params()`. Numeric columns
//! are cast explicitly so that integer-typed values loaded by the
//! ingestion pipeline still read back as `f64`, and nullable scores are
//! coalesced to zero.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use moosicbox_json_utils::database::ToValue as _;
use restaurant_safety_geo::{BoundingBox, Coordinates};
use restaurant_safety_restaurant_models::{
    Crime, CrimeFilter, CrimeRank, Inspection, InspectionScoreEntry, Restaurant, RestaurantInfo,
    RestaurantStub, StoredScores,
};
use switchy_database::{Database, DatabaseValue, Row};

use crate::{DbError, RestaurantStore};

const RESTAURANT_COLUMNS: &str = "restaurant_id, restaurant_name,
    COALESCE(restaurant_address, '') AS restaurant_address,
    CAST(restaurant_latitude AS REAL) AS restaurant_latitude,
    CAST(restaurant_longitude AS REAL) AS restaurant_longitude,
    COALESCE(CAST(inspection_score AS REAL), 0.0) AS inspection_score,
    COALESCE(CAST(safety_score AS REAL), 0.0) AS safety_score";

const CRIME_COLUMNS: &str = "c.crime_id, c.crime_date, c.crime_type, c.crime_description,
    CAST(COALESCE(c.if_arrest, 0) AS INTEGER) AS if_arrest,
    COALESCE(c.location_description, '') AS location_description,
    CAST(c.crime_latitude AS REAL) AS crime_latitude,
    CAST(c.crime_longitude AS REAL) AS crime_longitude";

const CRIME_RANK_COLUMNS: &str = "cr.crime_type,
    CAST(COALESCE(cr.if_arrest, 0) AS INTEGER) AS if_arrest,
    COALESCE(cr.location_description, '') AS location_description,
    COALESCE(CAST(cr.danger_score AS REAL), 0.0) AS danger_score";

/// [`RestaurantStore`] backed by a `switchy_database` connection.
#[derive(Clone)]
pub struct SqlRestaurantStore {
    db: Arc<dyn Database>,
}

impl SqlRestaurantStore {
    /// Wraps an open database connection.
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }
}

/// Builds a `LIKE` pattern matching `search` as a literal substring.
///
/// `%`, `_`, and the escape character itself are escaped with `\`, so the
/// query must declare `ESCAPE '\'`.
#[must_use]
pub fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Parses a stored date. Accepts `YYYY-MM-DD` with an optional trailing
/// time component (`T...` or ` ...`).
///
/// # Errors
///
/// Returns [`DbError::Conversion`] if the leading date cannot be parsed.
pub fn parse_date(value: &str) -> Result<NaiveDate, DbError> {
    let date_part = value.trim().get(..10).unwrap_or(value);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| DbError::Conversion {
        message: format!("Invalid date '{value}': {e}"),
    })
}

fn row_to_restaurant(row: &Row) -> Restaurant {
    Restaurant {
        restaurant_id: row.to_value("restaurant_id").unwrap_or(0),
        restaurant_name: row.to_value("restaurant_name").unwrap_or_default(),
        restaurant_address: row.to_value("restaurant_address").unwrap_or_default(),
        location: Coordinates::new(
            row.to_value("restaurant_latitude").unwrap_or(f64::NAN),
            row.to_value("restaurant_longitude").unwrap_or(f64::NAN),
        ),
        inspection_score: row.to_value("inspection_score").unwrap_or(0.0),
        safety_score: row.to_value("safety_score").unwrap_or(0.0),
    }
}

fn row_to_crime(row: &Row) -> Result<Crime, DbError> {
    let crime_id: i64 = row.to_value("crime_id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse crime id: {e}"),
    })?;
    let crime_date: String = row.to_value("crime_date").unwrap_or_default();
    let if_arrest: i64 = row.to_value("if_arrest").unwrap_or(0);

    Ok(Crime {
        crime_id,
        crime_date: parse_date(&crime_date)?,
        crime_type: row.to_value("crime_type").unwrap_or_default(),
        crime_description: row.to_value("crime_description").unwrap_or(None),
        if_arrest: if_arrest != 0,
        location_description: row.to_value("location_description").unwrap_or_default(),
        location: Coordinates::new(
            row.to_value("crime_latitude").unwrap_or(f64::NAN),
            row.to_value("crime_longitude").unwrap_or(f64::NAN),
        ),
    })
}

fn row_to_crime_rank(row: &Row) -> CrimeRank {
    let if_arrest: i64 = row.to_value("if_arrest").unwrap_or(0);

    CrimeRank {
        crime_type: row.to_value("crime_type").unwrap_or_default(),
        if_arrest: if_arrest != 0,
        location_description: row.to_value("location_description").unwrap_or_default(),
        danger_score: row.to_value("danger_score").unwrap_or(0.0),
    }
}

fn row_to_inspection(row: &Row) -> Result<Inspection, DbError> {
    let inspection_date: String = row.to_value("inspection_date").unwrap_or_default();

    Ok(Inspection {
        inspection_id: row.to_value("inspection_id").unwrap_or(0),
        restaurant_id: row.to_value("restaurant_id").unwrap_or(0),
        inspection_date: parse_date(&inspection_date)?,
        inspection_type: row.to_value("inspection_type").unwrap_or(None),
        risk_level: row.to_value("risk_level").unwrap_or_default(),
        inspection_result: row.to_value("inspection_result").unwrap_or_default(),
    })
}

/// Appends the four bounding-box predicates for the given coordinate
/// columns, numbering placeholders after the existing `params`.
fn push_bbox_filter(
    sql: &mut String,
    params: &mut Vec<DatabaseValue>,
    lat_column: &str,
    lon_column: &str,
    bbox: &BoundingBox,
) {
    let first = params.len() + 1;
    let _ = write!(
        sql,
        " AND {lat_column} BETWEEN ${} AND ${} AND {lon_column} BETWEEN ${} AND ${}",
        first,
        first + 1,
        first + 2,
        first + 3,
    );
    params.push(DatabaseValue::Real64(bbox.south));
    params.push(DatabaseValue::Real64(bbox.north));
    params.push(DatabaseValue::Real64(bbox.west));
    params.push(DatabaseValue::Real64(bbox.east));
}

#[async_trait]
impl RestaurantStore for SqlRestaurantStore {
    async fn search_restaurants(
        &self,
        search: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RestaurantStub>, DbError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT restaurant_id, restaurant_name FROM restaurant
                 WHERE LOWER(restaurant_name) LIKE LOWER($1) ESCAPE '\\'
                 ORDER BY restaurant_name DESC, restaurant_id ASC
                 LIMIT $2 OFFSET $3",
                &[
                    DatabaseValue::String(like_pattern(search)),
                    DatabaseValue::Int64(i64::from(limit)),
                    DatabaseValue::Int64(i64::from(offset)),
                ],
            )
            .await?;

        log::trace!("search '{search}' returned {} row(s)", rows.len());

        Ok(rows
            .iter()
            .map(|row| RestaurantStub {
                restaurant_id: row.to_value("restaurant_id").unwrap_or(0),
                restaurant_name: row.to_value("restaurant_name").unwrap_or_default(),
            })
            .collect())
    }

    async fn count_restaurants(&self, search: &str) -> Result<u64, DbError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT COUNT(*) AS total FROM restaurant
                 WHERE LOWER(restaurant_name) LIKE LOWER($1) ESCAPE '\\'",
                &[DatabaseValue::String(like_pattern(search))],
            )
            .await?;

        let total: i64 = rows.first().map_or(0, |r| r.to_value("total").unwrap_or(0));

        u64::try_from(total).map_err(|e| DbError::Conversion {
            message: format!("Negative restaurant count {total}: {e}"),
        })
    }

    async fn restaurant_info(
        &self,
        restaurant_id: i64,
    ) -> Result<Option<RestaurantInfo>, DbError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT restaurant_id, restaurant_name,
                        COALESCE(restaurant_address, '') AS restaurant_address
                 FROM restaurant WHERE restaurant_id = $1",
                &[DatabaseValue::Int64(restaurant_id)],
            )
            .await?;

        Ok(rows.first().map(|row| RestaurantInfo {
            restaurant_id: row.to_value("restaurant_id").unwrap_or(restaurant_id),
            restaurant_name: row.to_value("restaurant_name").unwrap_or_default(),
            restaurant_address: row.to_value("restaurant_address").unwrap_or_default(),
        }))
    }

    async fn restaurant_scores(
        &self,
        restaurant_id: i64,
    ) -> Result<Option<StoredScores>, DbError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT COALESCE(CAST(inspection_score AS REAL), 0.0) AS inspection_score,
                        COALESCE(CAST(safety_score AS REAL), 0.0) AS safety_score
                 FROM restaurant WHERE restaurant_id = $1",
                &[DatabaseValue::Int64(restaurant_id)],
            )
            .await?;

        Ok(rows.first().map(|row| StoredScores {
            inspection_score: row.to_value("inspection_score").unwrap_or(0.0),
            safety_score: row.to_value("safety_score").unwrap_or(0.0),
        }))
    }

    async fn restaurant_location(
        &self,
        restaurant_id: i64,
    ) -> Result<Option<Coordinates>, DbError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT CAST(restaurant_latitude AS REAL) AS restaurant_latitude,
                        CAST(restaurant_longitude AS REAL) AS restaurant_longitude
                 FROM restaurant WHERE restaurant_id = $1",
                &[DatabaseValue::Int64(restaurant_id)],
            )
            .await?;

        let Some(row) = rows.first() else {
            return Ok(None);
        };

        let location = Coordinates::new(
            row.to_value("restaurant_latitude").unwrap_or(f64::NAN),
            row.to_value("restaurant_longitude").unwrap_or(f64::NAN),
        );

        if location.is_valid() {
            Ok(Some(location))
        } else {
            Err(DbError::Conversion {
                message: format!("Restaurant {restaurant_id} has invalid coordinates"),
            })
        }
    }

    async fn restaurants_in_bbox(
        &self,
        bbox: &BoundingBox,
        exclude_id: i64,
    ) -> Result<Vec<Restaurant>, DbError> {
        let mut sql =
            format!("SELECT {RESTAURANT_COLUMNS} FROM restaurant WHERE restaurant_id <> $1");
        let mut params = vec![DatabaseValue::Int64(exclude_id)];
        push_bbox_filter(
            &mut sql,
            &mut params,
            "restaurant_latitude",
            "restaurant_longitude",
            bbox,
        );

        let rows = self.db.query_raw_params(&sql, &params).await?;
        log::trace!("{} restaurant candidate(s) in {bbox:?}", rows.len());

        Ok(rows
            .iter()
            .map(row_to_restaurant)
            .filter(|r| r.location.is_valid())
            .collect())
    }

    async fn inspections(
        &self,
        restaurant_id: i64,
        year: Option<i32>,
    ) -> Result<Vec<Inspection>, DbError> {
        let mut sql = String::from(
            "SELECT inspection_id, restaurant_id, inspection_date, inspection_type,
                    risk_level, inspection_result
             FROM inspection WHERE restaurant_id = $1",
        );
        let mut params = vec![DatabaseValue::Int64(restaurant_id)];

        if let Some(year) = year {
            sql.push_str(" AND CAST(strftime('%Y', inspection_date) AS INTEGER) = $2");
            params.push(DatabaseValue::Int64(i64::from(year)));
        }

        sql.push_str(" ORDER BY inspection_date DESC, inspection_id ASC");

        let rows = self.db.query_raw_params(&sql, &params).await?;

        rows.iter().map(row_to_inspection).collect()
    }

    async fn inspection_score_table(&self) -> Result<Vec<InspectionScoreEntry>, DbError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT risk_level, inspection_result,
                        COALESCE(CAST(inspection_score AS REAL), 0.0) AS inspection_score
                 FROM inspection_score",
                &[],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| InspectionScoreEntry {
                risk_level: row.to_value("risk_level").unwrap_or_default(),
                inspection_result: row.to_value("inspection_result").unwrap_or_default(),
                inspection_score: row.to_value("inspection_score").unwrap_or(0.0),
            })
            .collect())
    }

    async fn crimes_in_bbox(
        &self,
        bbox: &BoundingBox,
        filter: &CrimeFilter,
    ) -> Result<Vec<Crime>, DbError> {
        let mut sql = format!("SELECT {CRIME_COLUMNS} FROM crime c WHERE 1=1");
        let mut params = Vec::new();
        push_bbox_filter(
            &mut sql,
            &mut params,
            "c.crime_latitude",
            "c.crime_longitude",
            bbox,
        );

        if let Some(crime_type) = &filter.crime_type {
            params.push(DatabaseValue::String(crime_type.clone()));
            let _ = write!(sql, " AND c.crime_type = ${}", params.len());
        }

        if let Some(year) = filter.year {
            params.push(DatabaseValue::Int64(i64::from(year)));
            let _ = write!(
                sql,
                " AND CAST(strftime('%Y', c.crime_date) AS INTEGER) = ${}",
                params.len()
            );
        }

        let rows = self.db.query_raw_params(&sql, &params).await?;
        log::trace!("{} crime candidate(s) in {bbox:?}", rows.len());

        let mut crimes = Vec::with_capacity(rows.len());
        for row in &rows {
            match row_to_crime(row) {
                Ok(crime) if crime.location.is_valid() => crimes.push(crime),
                Ok(crime) => {
                    log::warn!("Skipping crime {} with invalid coordinates", crime.crime_id);
                }
                Err(e) => log::warn!("Skipping unreadable crime row: {e}"),
            }
        }

        Ok(crimes)
    }

    async fn crime(&self, crime_id: i64) -> Result<Vec<Crime>, DbError> {
        let rows = self
            .db
            .query_raw_params(
                &format!("SELECT {CRIME_COLUMNS} FROM crime c WHERE c.crime_id = $1"),
                &[DatabaseValue::Int64(crime_id)],
            )
            .await?;

        rows.iter().map(row_to_crime).collect()
    }

    async fn crime_ranks(&self) -> Result<Vec<CrimeRank>, DbError> {
        let rows = self
            .db
            .query_raw_params(&format!("SELECT {CRIME_RANK_COLUMNS} FROM crime_rank cr"), &[])
            .await?;

        Ok(rows.iter().map(row_to_crime_rank).collect())
    }

    async fn crime_rank_for_crime(&self, crime_id: i64) -> Result<Option<CrimeRank>, DbError> {
        let rows = self
            .db
            .query_raw_params(
                &format!(
                    "SELECT {CRIME_RANK_COLUMNS}
                     FROM crime c
                     JOIN crime_rank cr ON c.crime_type = cr.crime_type
                                       AND c.if_arrest = cr.if_arrest
                                       AND c.location_description = cr.location_description
                     WHERE c.crime_id = $1
                     LIMIT 1"
                ),
                &[DatabaseValue::Int64(crime_id)],
            )
            .await?;

        Ok(rows.first().map(row_to_crime_rank))
    }
}
