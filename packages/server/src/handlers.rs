//! HTTP handler functions for the restaurant safety API.

use actix_web::{HttpResponse, web};
use restaurant_safety_query::{NearbyQuery, Page, Pagination, parse_sort_order, parse_sort_type};
use restaurant_safety_restaurant_models::{CrimeFilter, SortOrder, SortType};
use restaurant_safety_scoring::DEFAULT_SAFETY_RADIUS_KM;
use restaurant_safety_server_models::{
    ApiCrime, ApiCrimeRank, ApiDangerScore, ApiHealth, ApiInspection, ApiInspectionScore,
    ApiNearbyCrime, ApiNearbyRestaurant, ApiOverallScore, ApiRestaurantInfo, ApiRestaurantPage,
    ApiRestaurantStub, ApiRestaurantSummary, ApiSafetyScore, CrimeIdParams, CrimeNearParams,
    DangerScoreParams, InspectionParams, NearbyParams, RestaurantIdParams, SearchParams,
};

use crate::{AppState, Endpoint};

fn restaurant_page<T, U>(page: Page<T>, f: impl FnMut(T) -> U) -> ApiRestaurantPage<U> {
    let page = page.map(f);

    ApiRestaurantPage {
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages,
        total_results: page.total_results,
        restaurants: page.items,
    }
}

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /searchRestaurant`
///
/// Case-insensitive substring search on restaurant names, paginated.
pub async fn search_restaurant(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> HttpResponse {
    let result = state
        .run(async {
            let pagination = Pagination::from_optional(params.page, params.page_size)?;
            state.queries.search(&params.search_str, pagination).await
        })
        .await;

    match result {
        Ok(page) => HttpResponse::Ok().json(restaurant_page(page, ApiRestaurantStub::from)),
        Err(e) => Endpoint::SearchRestaurant.error_response(&e),
    }
}

/// `GET /getRestaurantInfo`
pub async fn restaurant_info(
    state: web::Data<AppState>,
    params: web::Query<RestaurantIdParams>,
) -> HttpResponse {
    match state.run(state.queries.restaurant_info(params.res_id)).await {
        Ok(info) => HttpResponse::Ok().json(ApiRestaurantInfo::from(info)),
        Err(e) => Endpoint::RestaurantInfo.error_response(&e),
    }
}

/// `GET /getInspectionScore`
pub async fn inspection_score(
    state: web::Data<AppState>,
    params: web::Query<RestaurantIdParams>,
) -> HttpResponse {
    match state.run(state.queries.stored_scores(params.res_id)).await {
        Ok(scores) => HttpResponse::Ok().json(ApiInspectionScore {
            restaurant_id: params.res_id,
            inspection_score: scores.inspection_score,
        }),
        Err(e) => Endpoint::InspectionScore.error_response(&e),
    }
}

/// `GET /getSafetyScore`
pub async fn safety_score(
    state: web::Data<AppState>,
    params: web::Query<RestaurantIdParams>,
) -> HttpResponse {
    match state.run(state.queries.stored_scores(params.res_id)).await {
        Ok(scores) => HttpResponse::Ok().json(ApiSafetyScore {
            restaurant_id: params.res_id,
            safety_score: scores.safety_score,
        }),
        Err(e) => Endpoint::SafetyScore.error_response(&e),
    }
}

/// `GET /getDangerScore`
///
/// Recomputes the safety score from crimes within `distance` km.
pub async fn danger_score(
    state: web::Data<AppState>,
    params: web::Query<DangerScoreParams>,
) -> HttpResponse {
    let radius_km = params.distance.unwrap_or(DEFAULT_SAFETY_RADIUS_KM);

    match state
        .run(state.queries.compute_safety_score(params.res_id, radius_km))
        .await
    {
        Ok(danger_score) => HttpResponse::Ok().json(ApiDangerScore {
            restaurant_id: params.res_id,
            danger_score,
        }),
        Err(e) => Endpoint::DangerScore.error_response(&e),
    }
}

/// `GET /getCrimeNearRes`
///
/// Crimes within `distance` km of a restaurant, nearest first.
pub async fn crime_near_restaurant(
    state: web::Data<AppState>,
    params: web::Query<CrimeNearParams>,
) -> HttpResponse {
    // The client sends an empty crimeType for "any type".
    let filter = CrimeFilter {
        crime_type: params.crime_type.clone().filter(|t| !t.is_empty()),
        year: params.crime_year,
    };

    match state
        .run(
            state
                .queries
                .crimes_near_restaurant(params.res_id, params.distance, &filter),
        )
        .await
    {
        Ok(crimes) => {
            let crimes: Vec<ApiNearbyCrime> = crimes
                .into_iter()
                .map(|c| ApiNearbyCrime::new(c.crime, c.distance))
                .collect();
            HttpResponse::Ok().json(crimes)
        }
        Err(e) => Endpoint::CrimeNearRestaurant.error_response(&e),
    }
}

/// `GET /getRestaurantInspection`
pub async fn restaurant_inspection(
    state: web::Data<AppState>,
    params: web::Query<InspectionParams>,
) -> HttpResponse {
    match state
        .run(state.queries.inspections(params.res_id, params.year))
        .await
    {
        Ok(rows) => {
            let inspections: Vec<ApiInspection> =
                rows.into_iter().map(ApiInspection::from).collect();
            HttpResponse::Ok().json(inspections)
        }
        Err(e) => Endpoint::RestaurantInspection.error_response(&e),
    }
}

/// `GET /getNearbyRestaurant`
///
/// Other restaurants within `distance` km, sorted by distance or overall
/// score. Every parameter is validated before the store is touched.
pub async fn nearby_restaurant(
    state: web::Data<AppState>,
    params: web::Query<NearbyParams>,
) -> HttpResponse {
    let result = state
        .run(async {
            let sort_type = params
                .sort_type
                .as_deref()
                .map(parse_sort_type)
                .transpose()?
                .unwrap_or(SortType::Distance);
            let sort_order = params
                .sort_order
                .as_deref()
                .map(parse_sort_order)
                .transpose()?
                .unwrap_or(SortOrder::Asc);
            let query = NearbyQuery::new(
                params.res_id,
                params.distance,
                Pagination::from_optional(params.page, params.page_size)?,
                sort_type,
                sort_order,
            )?;

            state.queries.nearby_restaurants(&query).await
        })
        .await;

    match result {
        Ok(page) => HttpResponse::Ok().json(restaurant_page(page, |r| {
            ApiNearbyRestaurant::new(r.restaurant, r.distance, r.overall_score)
        })),
        Err(e) => Endpoint::NearbyRestaurant.error_response(&e),
    }
}

/// `GET /getRestaurantOverallScore`
pub async fn overall_score(
    state: web::Data<AppState>,
    params: web::Query<RestaurantIdParams>,
) -> HttpResponse {
    match state.run(state.queries.stored_scores(params.res_id)).await {
        Ok(scores) => HttpResponse::Ok().json(ApiOverallScore {
            restaurant_id: params.res_id,
            overall_score: scores.overall_score,
            inspection_score: scores.inspection_score,
            safety_score: scores.safety_score,
        }),
        Err(e) => Endpoint::RestaurantOverallScore.error_response(&e),
    }
}

/// `GET /getRestaurantSummary`
///
/// Identity fields and scores, fetched concurrently.
pub async fn restaurant_summary(
    state: web::Data<AppState>,
    params: web::Query<RestaurantIdParams>,
) -> HttpResponse {
    match state
        .run(state.queries.restaurant_summary(params.res_id))
        .await
    {
        Ok(summary) => HttpResponse::Ok().json(ApiRestaurantSummary {
            restaurant_id: summary.info.restaurant_id,
            restaurant_name: summary.info.restaurant_name,
            restaurant_address: summary.info.restaurant_address,
            overall_score: summary.scores.overall_score,
            inspection_score: summary.scores.inspection_score,
            safety_score: summary.scores.safety_score,
        }),
        Err(e) => Endpoint::RestaurantSummary.error_response(&e),
    }
}

/// `GET /getCrimeByID`
pub async fn crime_by_id(
    state: web::Data<AppState>,
    params: web::Query<CrimeIdParams>,
) -> HttpResponse {
    match state.run(state.queries.crime(params.crime_id)).await {
        Ok(rows) => {
            let crimes: Vec<ApiCrime> = rows.into_iter().map(ApiCrime::from).collect();
            HttpResponse::Ok().json(crimes)
        }
        Err(e) => Endpoint::CrimeById.error_response(&e),
    }
}

/// `GET /getCrimeRankByID`
pub async fn crime_rank_by_id(
    state: web::Data<AppState>,
    params: web::Query<CrimeIdParams>,
) -> HttpResponse {
    match state.run(state.queries.crime_rank(params.crime_id)).await {
        Ok(rank) => HttpResponse::Ok().json(ApiCrimeRank::from(rank)),
        Err(e) => Endpoint::CrimeRankById.error_response(&e),
    }
}
