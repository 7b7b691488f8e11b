//! Aggregate queries behind the admin report and the IP history search.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::visit::format_timestamp;
use crate::models::{IpHistoryRow, ReportQuery, ReportRow};

/// Escape `LIKE` wildcards so the input matches as a literal substring.
/// Pairs with `ESCAPE '\'` in the query.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn build_report_sql(query: &ReportQuery) -> String {
    let url_clause = |alias: &str| {
        if query.url.is_empty() {
            String::new()
        } else {
            format!(" AND {alias}url_visited LIKE ? ESCAPE '\\'")
        }
    };

    format!(
        r#"
        SELECT
            ips.ip_address,
            ips.url_visited,
            MAX(ips.visit_time) AS visit_time,
            SUM(ips.visit_count) AS visit_count,
            IFNULL(ip_count.visit_count_ip, 0) AS visit_count_ip
        FROM ip_statistics ips
        LEFT JOIN (
            SELECT ip_address, SUM(visit_count) AS visit_count_ip
            FROM ip_statistics
            WHERE visit_time >= ?{inner_url}
            GROUP BY ip_address
        ) AS ip_count ON ips.ip_address = ip_count.ip_address
        WHERE ips.visit_time >= ?{outer_url}
        GROUP BY ips.ip_address, ips.url_visited
        ORDER BY {order} {direction}, ips.ip_address ASC, ips.url_visited ASC
        "#,
        inner_url = url_clause(""),
        outer_url = url_clause("ips."),
        order = query.sort_column.sql_expr(),
        direction = query.sort_direction.as_sql(),
    )
}

/// Aggregate visits per (ip, url) pair inside the query's window ending at `now`.
pub async fn query_report(
    pool: &SqlitePool,
    query: &ReportQuery,
    now: DateTime<Utc>,
) -> Result<Vec<ReportRow>, sqlx::Error> {
    let sql = build_report_sql(query);
    let since = format_timestamp(now - query.filter.window());
    let pattern = format!("%{}%", escape_like(&query.url));

    let mut q = sqlx::query_as::<_, ReportRow>(&sql).bind(&since);
    if !query.url.is_empty() {
        q = q.bind(&pattern);
    }
    q = q.bind(&since);
    if !query.url.is_empty() {
        q = q.bind(&pattern);
    }

    let rows = q.fetch_all(pool).await?;
    tracing::debug!(
        filter = %query.filter,
        sort_column = query.sort_column.as_str(),
        rows = rows.len(),
        "report query"
    );
    Ok(rows)
}

/// Every stored row for exactly `ip`, newest first. Blank input issues no query.
pub async fn search_by_ip(pool: &SqlitePool, ip: &str) -> Result<Vec<IpHistoryRow>, sqlx::Error> {
    let ip = ip.trim();
    if ip.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as(
        r#"
        SELECT ip_address, url_visited, visit_time
        FROM ip_statistics
        WHERE ip_address = ?
        ORDER BY visit_time DESC
        "#,
    )
    .bind(ip)
    .fetch_all(pool)
    .await
}

/// Delete rows last visited before `cutoff`. Only reachable from the CLI.
pub async fn prune_before(pool: &SqlitePool, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM ip_statistics WHERE visit_time < ?")
        .bind(format_timestamp(cutoff))
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
