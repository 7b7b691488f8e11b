use chrono::Duration;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lookback window of the admin report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ReportFilter {
    #[default]
    #[serde(rename = "day")]
    Day,
    #[serde(rename = "7days")]
    SevenDays,
    #[serde(rename = "15days")]
    FifteenDays,
    #[serde(rename = "30days")]
    ThirtyDays,
    #[serde(rename = "180days")]
    HalfYear,
}

impl ReportFilter {
    pub const ALL: [ReportFilter; 5] = [
        ReportFilter::Day,
        ReportFilter::SevenDays,
        ReportFilter::FifteenDays,
        ReportFilter::ThirtyDays,
        ReportFilter::HalfYear,
    ];

    /// Unknown or missing values fall back to one day.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("7days") => ReportFilter::SevenDays,
            Some("15days") => ReportFilter::FifteenDays,
            Some("30days") => ReportFilter::ThirtyDays,
            Some("180days") => ReportFilter::HalfYear,
            _ => ReportFilter::Day,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportFilter::Day => "day",
            ReportFilter::SevenDays => "7days",
            ReportFilter::FifteenDays => "15days",
            ReportFilter::ThirtyDays => "30days",
            ReportFilter::HalfYear => "180days",
        }
    }

    pub fn window(self) -> Duration {
        match self {
            ReportFilter::Day => Duration::days(1),
            ReportFilter::SevenDays => Duration::days(7),
            ReportFilter::FifteenDays => Duration::days(15),
            ReportFilter::ThirtyDays => Duration::days(30),
            ReportFilter::HalfYear => Duration::days(180),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportFilter::Day => "Today",
            ReportFilter::SevenDays => "Last 7 Days",
            ReportFilter::FifteenDays => "Last 15 Days",
            ReportFilter::ThirtyDays => "Last 30 Days",
            ReportFilter::HalfYear => "Last 180 Days",
        }
    }
}

impl std::fmt::Display for ReportFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output columns the report may be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    IpAddress,
    UrlVisited,
    #[default]
    VisitTime,
    VisitCount,
    VisitCountIp,
}

impl SortColumn {
    pub const ALL: [SortColumn; 5] = [
        SortColumn::IpAddress,
        SortColumn::UrlVisited,
        SortColumn::VisitTime,
        SortColumn::VisitCount,
        SortColumn::VisitCountIp,
    ];

    /// Anything outside the known column set becomes `visit_time`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("ip_address") => SortColumn::IpAddress,
            Some("url_visited") => SortColumn::UrlVisited,
            Some("visit_count") => SortColumn::VisitCount,
            Some("visit_count_ip") => SortColumn::VisitCountIp,
            _ => SortColumn::VisitTime,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::IpAddress => "ip_address",
            SortColumn::UrlVisited => "url_visited",
            SortColumn::VisitTime => "visit_time",
            SortColumn::VisitCount => "visit_count",
            SortColumn::VisitCountIp => "visit_count_ip",
        }
    }

    /// The only text that ever reaches the report's ORDER BY clause.
    pub fn sql_expr(self) -> &'static str {
        match self {
            SortColumn::IpAddress => "ips.ip_address",
            SortColumn::UrlVisited => "ips.url_visited",
            SortColumn::VisitTime => "MAX(ips.visit_time)",
            SortColumn::VisitCount => "SUM(ips.visit_count)",
            SortColumn::VisitCountIp => "IFNULL(ip_count.visit_count_ip, 0)",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortColumn::IpAddress => "IP Address",
            SortColumn::UrlVisited => "URL Visited",
            SortColumn::VisitTime => "Last Visit Time",
            SortColumn::VisitCount => "Visit Count",
            SortColumn::VisitCountIp => "Visit Count IP",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Raw report parameters as they arrive in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub filter: Option<String>,
    pub url: Option<String>,
    pub sort: Option<String>,
    pub sort_column: Option<String>,
}

/// Validated report parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportQuery {
    pub filter: ReportFilter,
    pub url: String,
    pub sort_column: SortColumn,
    pub sort_direction: SortDirection,
}

impl From<ReportParams> for ReportQuery {
    fn from(params: ReportParams) -> Self {
        Self {
            filter: ReportFilter::from_param(params.filter.as_deref()),
            url: params.url.unwrap_or_default().trim().to_string(),
            sort_column: SortColumn::from_param(params.sort_column.as_deref()),
            sort_direction: SortDirection::from_param(params.sort.as_deref()),
        }
    }
}

/// One aggregated (ip_address, url_visited) pair inside the report window.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReportRow {
    pub ip_address: String,
    pub url_visited: String,
    pub visit_time: String,
    pub visit_count: i64,
    pub visit_count_ip: i64,
}
