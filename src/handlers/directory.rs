// src/handlers/directory.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::Response};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    error::AppError,
    handlers::page,
    models::directory::{
        DirectoryCard, DirectoryFilter, DirectoryRow, FilterCard, FilterOptions, FilterRequest,
    },
    templates::Templates,
    utils::jwt::Principal,
};

/// Verified users that have a description, narrowed by `filter`.
///
/// Department, course and year are exact, case-sensitive matches done in
/// SQL. The search term is a case-insensitive substring of the name or
/// enrollment number; it is applied to the fetched rows because SQLite only
/// folds ASCII case. All predicates are ANDed.
pub(crate) async fn fetch_directory(
    pool: &SqlitePool,
    filter: &DirectoryFilter,
) -> Result<Vec<DirectoryRow>, sqlx::Error> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT u.id, u.name, u.enrollment_no, d.course, d.department, d.passing_year,
               d.short_desc, d.user_image, d.user_image_mime
        FROM user u
        JOIN user_desc d ON d.id = u.id
        WHERE u.is_verified = 1
        "#,
    );

    if let Some(department) = &filter.department {
        query.push(" AND d.department = ").push_bind(department.clone());
    }
    if let Some(course) = &filter.course {
        query.push(" AND d.course = ").push_bind(course.clone());
    }
    if let Some(year) = filter.passing_year {
        query.push(" AND d.passing_year = ").push_bind(year);
    }

    query.push(" ORDER BY u.id");

    let rows = query.build_query_as::<DirectoryRow>().fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .filter(|row| filter.matches_search(row))
        .collect())
}

/// Distinct dropdown values, taken from directory entries only so that
/// pending accounts do not leak through the filter controls.
async fn fetch_filter_options(pool: &SqlitePool) -> Result<FilterOptions, sqlx::Error> {
    let departments = sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT d.department
        FROM user_desc d JOIN user u ON u.id = d.id
        WHERE u.is_verified = 1 AND d.department IS NOT NULL AND d.department <> ''
        ORDER BY d.department
        "#,
    )
    .fetch_all(pool)
    .await?;

    let courses = sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT d.course
        FROM user_desc d JOIN user u ON u.id = d.id
        WHERE u.is_verified = 1 AND d.course IS NOT NULL AND d.course <> ''
        ORDER BY d.course
        "#,
    )
    .fetch_all(pool)
    .await?;

    let passing_years = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT DISTINCT d.passing_year
        FROM user_desc d JOIN user u ON u.id = d.id
        WHERE u.is_verified = 1 AND d.passing_year IS NOT NULL
        ORDER BY d.passing_year
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(FilterOptions {
        departments,
        courses,
        passing_years,
    })
}

/// Home page: every directory card plus the filter dropdown values.
pub async fn home(
    State(pool): State<SqlitePool>,
    State(templates): State<Arc<Templates>>,
    principal: Principal,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let cards: Vec<DirectoryCard> = fetch_directory(&pool, &DirectoryFilter::default())
        .await?
        .into_iter()
        .map(DirectoryCard::from)
        .collect();

    let options = fetch_filter_options(&pool).await?;

    page(
        &templates,
        jar,
        principal,
        "index",
        json!({
            "cards": cards,
            "departments": options.departments,
            "courses": options.courses,
            "passing_years": options.passing_years,
        }),
    )
}

/// JSON search behind the home page's filter bar.
pub async fn filter_cards(
    State(pool): State<SqlitePool>,
    Json(payload): Json<FilterRequest>,
) -> Result<Json<Vec<FilterCard>>, AppError> {
    let filter = DirectoryFilter::try_from(payload)?;

    let cards = fetch_directory(&pool, &filter)
        .await?
        .into_iter()
        .map(FilterCard::from)
        .collect();

    Ok(Json(cards))
}
