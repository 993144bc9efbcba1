// rest/routes/admin.rs — Dashboard, user management, analytics, and exports.
//
// Reporting windows are anchored to East Africa Time (UTC+3, no DST), the
// deployment's home timezone, then rendered back to UTC RFC 3339 strings so
// they compare correctly against stored row timestamps.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::{bad_request, internal_error, not_found, ApiError};
use crate::storage::UserRow;
use crate::AppContext;

// ─── Time windows ───────────────────────────────────────────────────────────

fn eat() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).expect("UTC+3 is a valid offset")
}

fn now_eat() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&eat())
}

/// Local midnight on `date` in the given fixed offset.
fn local_midnight(date: NaiveDate, tz: FixedOffset) -> DateTime<FixedOffset> {
    let local = NaiveDateTime::new(date, NaiveTime::MIN);
    let utc = local - Duration::seconds(tz.local_minus_utc() as i64);
    DateTime::from_naive_utc_and_offset(utc, tz)
}

/// Render a boundary the way row timestamps are stored (UTC RFC 3339), so
/// the SQL string comparisons order correctly.
fn boundary(dt: DateTime<FixedOffset>) -> String {
    dt.with_timezone(&Utc).to_rfc3339()
}

fn month_first(now: DateTime<FixedOffset>) -> NaiveDate {
    now.date_naive().with_day(1).unwrap_or(now.date_naive())
}

fn next_month(first: NaiveDate) -> NaiveDate {
    if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .unwrap_or(first)
}

// ─── User lookups ───────────────────────────────────────────────────────────

fn display_name(user: &UserRow) -> String {
    if !user.full_name.is_empty() {
        user.full_name.clone()
    } else if let Some((local, _)) = user.email.split_once('@') {
        local.to_string()
    } else {
        user.email.clone()
    }
}

/// Cached (name, email) lookup; recent-activity lists repeat users heavily.
async fn user_brief(
    ctx: &AppContext,
    cache: &mut HashMap<String, Option<(String, String)>>,
    user_id: &str,
) -> Result<Option<(String, String)>, ApiError> {
    if let Some(hit) = cache.get(user_id) {
        return Ok(hit.clone());
    }
    let found = ctx
        .storage
        .get_user(user_id)
        .await
        .map_err(internal_error)?
        .map(|u| (display_name(&u), u.email.clone()));
    cache.insert(user_id.to_string(), found.clone());
    Ok(found)
}

// ─── Dashboard ──────────────────────────────────────────────────────────────

pub async fn dashboard(State(ctx): State<Arc<AppContext>>) -> Result<Json<Value>, ApiError> {
    let now = now_eat();
    let tz = eat();
    let today = boundary(local_midnight(now.date_naive(), tz));
    let week = boundary(
        local_midnight(now.date_naive(), tz)
            - Duration::days(now.weekday().num_days_from_monday() as i64),
    );
    let month = boundary(local_midnight(month_first(now), tz));

    let s = &ctx.storage;
    let total_users = s.count_users().await.map_err(internal_error)?;
    let suspended_users = s.count_suspended_users().await.map_err(internal_error)?;
    let active_users_today = s
        .distinct_translation_users_since(&today)
        .await
        .map_err(internal_error)?;
    let translations_today = s
        .count_translations_since(&today)
        .await
        .map_err(internal_error)?;
    let translations_week = s
        .count_translations_since(&week)
        .await
        .map_err(internal_error)?;
    let translations_month = s
        .count_translations_since(&month)
        .await
        .map_err(internal_error)?;
    let total_favorites = s.count_favorites_total().await.map_err(internal_error)?;

    let mut cache = HashMap::new();
    let recent = s.recent_translations(10).await.map_err(internal_error)?;
    let mut recent_activity = Vec::with_capacity(recent.len());
    for row in &recent {
        let brief = match &row.user_id {
            Some(uid) => user_brief(ctx.as_ref(), &mut cache, uid).await?,
            None => None,
        };
        let (user_name, user_email) =
            brief.unwrap_or_else(|| ("Guest User".to_string(), String::new()));
        recent_activity.push(json!({
            "user_name": user_name,
            "user_email": user_email,
            "timestamp": row.timestamp,
            "original_text": row.original_text,
            "translated_text": row.translated_text,
            "source_language": "Somali",
            "target_language": "English",
        }));
    }

    let top_users_month = top_users(ctx.as_ref(), &mut cache, &month).await?;
    let top_users_week = top_users(ctx.as_ref(), &mut cache, &week).await?;

    Ok(Json(json!({
        "total_users": total_users,
        "active_users_today": active_users_today,
        "suspended_users": suspended_users,
        "translations_today": translations_today,
        "translations_week": translations_week,
        "translations_month": translations_month,
        "total_favorites": total_favorites,
        "recent_activity": recent_activity,
        "top_users_month": top_users_month,
        "top_users_week": top_users_week,
    })))
}

async fn top_users(
    ctx: &AppContext,
    cache: &mut HashMap<String, Option<(String, String)>>,
    since: &str,
) -> Result<Vec<Value>, ApiError> {
    let rows = ctx
        .storage
        .top_translation_users_since(since, 5)
        .await
        .map_err(internal_error)?;
    let mut out = Vec::with_capacity(rows.len());
    for (user_id, count) in rows {
        let (full_name, email) = user_brief(ctx, cache, &user_id)
            .await?
            .unwrap_or_else(|| ("Anonymous User".to_string(), String::new()));
        out.push(json!({
            "user_id": user_id,
            "full_name": full_name,
            "email": email,
            "translation_count": count,
        }));
    }
    Ok(out)
}

// ─── User management ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list_users(
    State(ctx): State<Arc<AppContext>>,
    Query(q): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = q.page.unwrap_or(1).max(1);
    let limit = q.limit.unwrap_or(10).clamp(1, 100);

    let total = ctx.storage.count_users().await.map_err(internal_error)?;
    let users = ctx
        .storage
        .list_users_page(page, limit)
        .await
        .map_err(internal_error)?;

    let mut enriched = Vec::with_capacity(users.len());
    for user in users {
        let translations_count = ctx
            .storage
            .count_translations(&user.id)
            .await
            .map_err(internal_error)?;
        let favorites_count = ctx
            .storage
            .count_favorites(&user.id)
            .await
            .map_err(internal_error)?;

        let mut value = serde_json::to_value(&user).map_err(|e| internal_error(e.into()))?;
        if let Value::Object(map) = &mut value {
            map.insert("translations_count".into(), json!(translations_count));
            map.insert("favorites_count".into(), json!(favorites_count));
        }
        enriched.push(value);
    }

    Ok(Json(json!({
        "users": enriched,
        "total": total,
        "page": page,
        "limit": limit,
        "pages": (total + limit - 1) / limit,
    })))
}

pub async fn suspend(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let updated = ctx
        .storage
        .set_user_suspended(&id, true)
        .await
        .map_err(internal_error)?;
    if !updated {
        return Err(not_found("User not found"));
    }
    Ok(Json(json!({ "message": "User suspended successfully" })))
}

pub async fn unsuspend(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let updated = ctx
        .storage
        .set_user_suspended(&id, false)
        .await
        .map_err(internal_error)?;
    if !updated {
        return Err(not_found("User not found"));
    }
    Ok(Json(json!({ "message": "User unsuspended successfully" })))
}

pub async fn user_stats(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let Some(user) = ctx.storage.get_user(&id).await.map_err(internal_error)? else {
        return Err(not_found("User not found"));
    };

    let total_translations = ctx
        .storage
        .count_translations(&id)
        .await
        .map_err(internal_error)?;
    let total_favorites = ctx
        .storage
        .count_favorites(&id)
        .await
        .map_err(internal_error)?;
    let week_ago = boundary(now_eat() - Duration::days(7));
    let recent_translations = ctx
        .storage
        .count_user_translations_since(&id, &week_ago)
        .await
        .map_err(internal_error)?;

    let translations = ctx
        .storage
        .list_translations(&id, 1, 10)
        .await
        .map_err(internal_error)?;
    let favorites: Vec<_> = ctx
        .storage
        .list_favorites(&id)
        .await
        .map_err(internal_error)?
        .into_iter()
        .take(10)
        .collect();

    Ok(Json(json!({
        "user": user,
        "stats": {
            "total_translations": total_translations,
            "total_favorites": total_favorites,
            "recent_translations": recent_translations,
        },
        "translations": translations,
        "favorites": favorites,
    })))
}

// ─── Analytics ──────────────────────────────────────────────────────────────

pub async fn analytics(State(ctx): State<Arc<AppContext>>) -> Result<Json<Value>, ApiError> {
    let now = now_eat();
    let tz = eat();
    let today_start = local_midnight(now.date_naive(), tz);
    let week_start =
        today_start - Duration::days(now.weekday().num_days_from_monday() as i64);
    let month_start = local_midnight(month_first(now), tz);

    let s = &ctx.storage;
    let translations_today = s
        .count_translations_since(&boundary(today_start))
        .await
        .map_err(internal_error)?;
    let translations_week = s
        .count_translations_since(&boundary(week_start))
        .await
        .map_err(internal_error)?;
    let translations_month = s
        .count_translations_since(&boundary(month_start))
        .await
        .map_err(internal_error)?;

    let daily_active_users = s
        .distinct_translation_users_since(&boundary(today_start))
        .await
        .map_err(internal_error)?;
    let weekly_active_users = s
        .distinct_translation_users_since(&boundary(week_start))
        .await
        .map_err(internal_error)?;
    let monthly_active_users = s
        .distinct_translation_users_since(&boundary(month_start))
        .await
        .map_err(internal_error)?;

    let favorites_used = s.count_favorites_total().await.map_err(internal_error)?;
    let history_accessed = s.count_translations_total().await.map_err(internal_error)?;
    let voice_input_used = s.count_recordings_total().await.map_err(internal_error)?;

    // Oldest day first.
    let mut usage_patterns = Vec::with_capacity(7);
    for i in (0..7i64).rev() {
        let day_start = today_start - Duration::days(i);
        let day_end = day_start + Duration::days(1);
        let count = s
            .count_translations_between(&boundary(day_start), &boundary(day_end))
            .await
            .map_err(internal_error)?;
        usage_patterns.push(json!({
            "date": day_start.format("%Y-%m-%d").to_string(),
            "count": count,
        }));
    }

    let mut user_retention = Vec::with_capacity(4);
    for i in (0..4i64).rev() {
        let start = week_start - Duration::weeks(i);
        let end = start + Duration::weeks(1);
        let active_users = s
            .distinct_translation_users_between(&boundary(start), &boundary(end))
            .await
            .map_err(internal_error)?;
        user_retention.push(json!({
            "week": start.format("%Y-%m-%d").to_string(),
            "active_users": active_users,
        }));
    }

    Ok(Json(json!({
        "translation_volume": {
            "today": translations_today,
            "this_week": translations_week,
            "this_month": translations_month,
        },
        "user_engagement": {
            "daily_active_users": daily_active_users,
            "weekly_active_users": weekly_active_users,
            "monthly_active_users": monthly_active_users,
        },
        "popular_features": {
            "favorites_used": favorites_used,
            "history_accessed": history_accessed,
            "voice_input_used": voice_input_used,
        },
        "usage_patterns": usage_patterns,
        "user_retention": user_retention,
    })))
}

// ─── Reports & exports ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReportQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Resolve the requested window: explicit date range, year(+month), or the
/// current month when nothing is given. The end bound is exclusive.
fn report_window(
    q: &ReportQuery,
) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>), ApiError> {
    let tz = eat();
    let now = now_eat();

    if q.start_date.is_some() || q.end_date.is_some() {
        let (Some(start_raw), Some(end_raw)) = (&q.start_date, &q.end_date) else {
            return Err(bad_request("Both start_date and end_date are required"));
        };
        let parse = |raw: &str| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| bad_request("Invalid date format, expected YYYY-MM-DD"))
        };
        let start = parse(start_raw)?;
        let end = parse(end_raw)?;
        // Inclusive end date.
        return Ok((
            local_midnight(start, tz),
            local_midnight(end, tz) + Duration::days(1),
        ));
    }

    match (q.year, q.month) {
        (year, Some(m)) => {
            let year = year.unwrap_or_else(|| now.year());
            let start = NaiveDate::from_ymd_opt(year, m, 1)
                .ok_or_else(|| bad_request("Invalid year or month"))?;
            Ok((local_midnight(start, tz), local_midnight(next_month(start), tz)))
        }
        (Some(year), None) => {
            let start = NaiveDate::from_ymd_opt(year, 1, 1)
                .ok_or_else(|| bad_request("Invalid year"))?;
            let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)
                .ok_or_else(|| bad_request("Invalid year"))?;
            Ok((local_midnight(start, tz), local_midnight(end, tz)))
        }
        (None, None) => {
            let start = month_first(now);
            Ok((local_midnight(start, tz), local_midnight(next_month(start), tz)))
        }
    }
}

pub async fn translations_report(
    State(ctx): State<Arc<AppContext>>,
    Query(q): Query<ReportQuery>,
) -> Result<Json<Value>, ApiError> {
    let (start, end) = report_window(&q)?;
    let (start_s, end_s) = (boundary(start), boundary(end));
    let page = q.page.unwrap_or(1).max(1);
    let limit = q.limit.unwrap_or(50).clamp(1, 500);

    let total = ctx
        .storage
        .count_translations_between(&start_s, &end_s)
        .await
        .map_err(internal_error)?;
    let unique_users = ctx
        .storage
        .distinct_translation_users_between(&start_s, &end_s)
        .await
        .map_err(internal_error)?;
    let rows = ctx
        .storage
        .list_translations_between(&start_s, &end_s)
        .await
        .map_err(internal_error)?;

    let mut language_pairs: HashMap<&str, i64> = HashMap::new();
    for row in &rows {
        let key = match row.detected_language.as_deref() {
            Some("so") => "Somali-English",
            _ => "Unknown-English",
        };
        *language_pairs.entry(key).or_insert(0) += 1;
    }

    let page_rows: Vec<_> = rows
        .iter()
        .skip(((page - 1) * limit) as usize)
        .take(limit as usize)
        .collect();

    Ok(Json(json!({
        "total": total,
        "page": page,
        "limit": limit,
        "pages": (total + limit - 1) / limit,
        "period": { "start": start_s, "end": end_s },
        "translations": page_rows,
        "statistics": {
            "unique_users": unique_users,
            "language_pairs": language_pairs,
        },
    })))
}

fn csv_escape(field: &str) -> String {
    field.replace('"', "\"\"")
}

fn csv_attachment(content: String, stem: &str) -> impl IntoResponse {
    let filename = format!("{stem}_{}.csv", Utc::now().format("%Y-%m-%d"));
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        content,
    )
}

pub async fn export_users(
    State(ctx): State<Arc<AppContext>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = ctx.storage.list_users().await.map_err(internal_error)?;

    let mut csv = String::from("Name,Email,Role,Created At,Status\n");
    for user in &users {
        let created = DateTime::parse_from_rfc3339(&user.created_at)
            .map(|d| d.format("%m/%d/%Y").to_string())
            .unwrap_or_default();
        let status = if user.is_suspended { "Suspended" } else { "Active" };
        csv.push_str(&format!(
            "\"{}\",\"{}\",\"{}\",\"{}\",\"{}\"\n",
            csv_escape(&user.full_name),
            csv_escape(&user.email),
            csv_escape(&user.role),
            created,
            status,
        ));
    }

    Ok(csv_attachment(csv, "users_export"))
}

pub async fn export_translations(
    State(ctx): State<Arc<AppContext>>,
    Query(q): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (start, end) = report_window(&q)?;
    let rows = ctx
        .storage
        .list_translations_between(&boundary(start), &boundary(end))
        .await
        .map_err(internal_error)?;

    let mut cache = HashMap::new();
    let mut csv =
        String::from("Timestamp,User,Original Text,Translated Text,Detected Language,Confidence\n");
    for row in &rows {
        let user = match &row.user_id {
            Some(uid) => user_brief(ctx.as_ref(), &mut cache, uid)
                .await?
                .map(|(_, email)| email)
                .unwrap_or_default(),
            None => "Guest".to_string(),
        };
        let confidence = row
            .language_confidence
            .map(|c| format!("{c:.2}"))
            .unwrap_or_default();
        csv.push_str(&format!(
            "\"{}\",\"{}\",\"{}\",\"{}\",\"{}\",\"{}\"\n",
            csv_escape(&row.timestamp),
            csv_escape(&user),
            csv_escape(&row.original_text),
            csv_escape(&row.translated_text),
            row.detected_language.as_deref().unwrap_or(""),
            confidence,
        ));
    }

    Ok(csv_attachment(csv, "translations_export"))
}
