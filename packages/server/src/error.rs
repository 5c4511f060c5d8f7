//! Mapping of query errors to HTTP responses.

use actix_web::{HttpRequest, HttpResponse, error::QueryPayloadError};
use restaurant_safety_query::{ErrorKind, Missing, QueryError};
use restaurant_safety_server_models::ApiError;

/// The API endpoints, used to pick error messages and label log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/searchRestaurant`
    SearchRestaurant,
    /// `/getRestaurantInfo`
    RestaurantInfo,
    /// `/getInspectionScore`
    InspectionScore,
    /// `/getSafetyScore`
    SafetyScore,
    /// `/getDangerScore`
    DangerScore,
    /// `/getCrimeNearRes`
    CrimeNearRestaurant,
    /// `/getRestaurantInspection`
    RestaurantInspection,
    /// `/getNearbyRestaurant`
    NearbyRestaurant,
    /// `/getRestaurantOverallScore`
    RestaurantOverallScore,
    /// `/getRestaurantSummary`
    RestaurantSummary,
    /// `/getCrimeByID`
    CrimeById,
    /// `/getCrimeRankByID`
    CrimeRankById,
}

impl Endpoint {
    /// Route name without the leading slash.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SearchRestaurant => "searchRestaurant",
            Self::RestaurantInfo => "getRestaurantInfo",
            Self::InspectionScore => "getInspectionScore",
            Self::SafetyScore => "getSafetyScore",
            Self::DangerScore => "getDangerScore",
            Self::CrimeNearRestaurant => "getCrimeNearRes",
            Self::RestaurantInspection => "getRestaurantInspection",
            Self::NearbyRestaurant => "getNearbyRestaurant",
            Self::RestaurantOverallScore => "getRestaurantOverallScore",
            Self::RestaurantSummary => "getRestaurantSummary",
            Self::CrimeById => "getCrimeByID",
            Self::CrimeRankById => "getCrimeRankByID",
        }
    }

    /// Message sent with a 404 for `missing`.
    ///
    /// Existing clients match on these strings, including the crime lookup
    /// that reports missing inspection data.
    #[must_use]
    pub const fn not_found_message(self, missing: Missing) -> &'static str {
        match missing {
            Missing::Restaurant => match self {
                Self::RestaurantInfo | Self::RestaurantSummary => "Restaurant not found",
                _ => "Restaurant not found.",
            },
            Missing::Inspections | Missing::Crime => "No inspection data.",
            Missing::CrimesInArea => "No crime in target area.",
            Missing::CrimeRank => "Crime rank not found for the specified crime ID",
        }
    }

    /// Converts `err` into the JSON error response for this endpoint.
    #[must_use]
    pub fn error_response(self, err: &QueryError) -> HttpResponse {
        match err.kind() {
            ErrorKind::Client => {
                log::debug!("[{}] rejected request: {err}", self.name());
                HttpResponse::BadRequest().json(ApiError::new(client_message(err)))
            }
            ErrorKind::NotFound => {
                log::debug!("[{}] {err}", self.name());
                let message = match err {
                    QueryError::NotFound(missing) => self.not_found_message(*missing),
                    _ => "Not found.",
                };
                HttpResponse::NotFound().json(ApiError::new(message))
            }
            ErrorKind::Fatal => {
                log::error!("[{}] query failed: {err}", self.name());
                HttpResponse::InternalServerError()
                    .json(ApiError::new(format!("[{}]: Query error", self.name())))
            }
        }
    }
}

fn client_message(err: &QueryError) -> String {
    match err {
        QueryError::InvalidSortType(_) => "Error: Invalid sortType.".to_string(),
        QueryError::InvalidSortOrder(_) => "Error: Invalid sortOrder.".to_string(),
        QueryError::InvalidParameter { name } => format!("Error: Invalid {name}."),
        _ => "Error: Invalid request.".to_string(),
    }
}

/// Rejects malformed query strings with a JSON body instead of actix's
/// plain-text default.
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::debug!("[{}] malformed query string: {err}", req.path());

    let response =
        HttpResponse::BadRequest().json(ApiError::new("Error: Invalid query parameters."));

    actix_web::error::InternalError::from_response(err, response).into()
}
