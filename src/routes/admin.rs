use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Form, Router,
};
use chrono::Utc;
use serde::Deserialize;
use url::form_urlencoded;

use crate::error::AppError;
use crate::models::visit::display_timestamp;
use crate::models::{
    IpHistoryRow, ReportFilter, ReportParams, ReportQuery, ReportRow, SortColumn,
};
use crate::report::{query_report, search_by_ip};
use crate::AppState;

const REPORT_PATH: &str = "/admin/ip-statistics";
const SEARCH_PATH: &str = "/admin/search-ip";

struct TabLink {
    href: String,
    title: &'static str,
    active: bool,
}

struct ColumnLink {
    href: String,
    label: &'static str,
}

struct ReportRowView {
    ip_address: String,
    url_visited: String,
    visit_time: String,
    visit_count: i64,
    visit_count_ip: i64,
}

impl From<ReportRow> for ReportRowView {
    fn from(row: ReportRow) -> Self {
        Self {
            visit_time: display_timestamp(&row.visit_time),
            ip_address: row.ip_address,
            url_visited: row.url_visited,
            visit_count: row.visit_count,
            visit_count_ip: row.visit_count_ip,
        }
    }
}

struct HistoryRowView {
    ip_address: String,
    url_visited: String,
    visit_time: String,
}

impl From<IpHistoryRow> for HistoryRowView {
    fn from(row: IpHistoryRow) -> Self {
        Self {
            visit_time: display_timestamp(&row.visit_time),
            ip_address: row.ip_address,
            url_visited: row.url_visited,
        }
    }
}

#[derive(Template)]
#[template(path = "admin/report.html")]
struct ReportTemplate {
    tabs: Vec<TabLink>,
    columns: Vec<ColumnLink>,
    rows: Vec<ReportRowView>,
    filter: &'static str,
    url: String,
    sort: &'static str,
    sort_column: &'static str,
    search_path: &'static str,
}

#[derive(Template)]
#[template(path = "admin/search.html")]
struct SearchTemplate {
    search_ip: String,
    searched: bool,
    rows: Vec<HistoryRowView>,
    report_path: &'static str,
}

#[derive(Deserialize)]
pub struct SearchForm {
    search_ip: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(REPORT_PATH, get(report_page))
        .route(SEARCH_PATH, get(search_page).post(search_submit))
}

fn report_href(pairs: &[(&str, &str)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{REPORT_PATH}?{query}")
}

fn build_tabs(active: ReportFilter) -> Vec<TabLink> {
    ReportFilter::ALL
        .into_iter()
        .map(|filter| TabLink {
            href: report_href(&[("filter", filter.as_str())]),
            title: filter.title(),
            active: filter == active,
        })
        .collect()
}

/// Header links sort by their column with the current direction flipped.
fn build_columns(query: &ReportQuery) -> Vec<ColumnLink> {
    let toggled = query.sort_direction.toggle().as_sql();
    SortColumn::ALL
        .into_iter()
        .map(|column| {
            let mut pairs = vec![("filter", query.filter.as_str())];
            if !query.url.is_empty() {
                pairs.push(("url", query.url.as_str()));
            }
            pairs.push(("sort_column", column.as_str()));
            pairs.push(("sort", toggled));
            ColumnLink {
                href: report_href(&pairs),
                label: column.label(),
            }
        })
        .collect()
}

async fn report_page(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Html<String>, AppError> {
    let query = ReportQuery::from(params);
    let rows = query_report(&state.db, &query, Utc::now()).await?;

    let template = ReportTemplate {
        tabs: build_tabs(query.filter),
        columns: build_columns(&query),
        rows: rows.into_iter().map(ReportRowView::from).collect(),
        filter: query.filter.as_str(),
        sort: query.sort_direction.as_sql(),
        sort_column: query.sort_column.as_str(),
        url: query.url,
        search_path: SEARCH_PATH,
    };
    Ok(Html(template.render()?))
}

async fn search_page() -> Result<Html<String>, AppError> {
    let template = SearchTemplate {
        search_ip: String::new(),
        searched: false,
        rows: vec![],
        report_path: REPORT_PATH,
    };
    Ok(Html(template.render()?))
}

async fn search_submit(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, AppError> {
    let search_ip = super::search_input(form.search_ip)?;
    let rows = search_by_ip(&state.db, &search_ip).await?;

    let template = SearchTemplate {
        searched: !search_ip.is_empty(),
        search_ip,
        rows: rows.into_iter().map(HistoryRowView::from).collect(),
        report_path: REPORT_PATH,
    };
    Ok(Html(template.render()?))
}
