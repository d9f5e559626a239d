//! Spacecraft health dashboards.
//!
//! All figures are fixed placeholders. The hourly trend series is derived
//! from the hour index so that two calls at the same instant return the same
//! body; only the timestamps move with the clock.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::format_timestamp;
use crate::schema::{FieldSpec, FieldType, Schema};

/// Status reported while every subsystem is within limits.
pub const NOMINAL: &str = "nominal";

/// Number of hourly points in the daily trend series.
pub const DAILY_TREND_HOURS: i64 = 24;

const fn percent(name: &'static str) -> FieldSpec {
    FieldSpec::required(name, FieldType::Number).range(0.0, 100.0)
}

const fn count(name: &'static str) -> FieldSpec {
    FieldSpec::required(name, FieldType::Number).range(0.0, 4_294_967_295.0)
}

/// Per-subsystem stability, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityMetrics {
    pub attitude_stability: f64,
    pub orbit_stability: f64,
    pub thermal_stability: f64,
    pub power_stability: f64,
    pub communication_stability: f64,
}

impl StabilityMetrics {
    pub fn nominal() -> Self {
        Self {
            attitude_stability: 95.5,
            orbit_stability: 98.2,
            thermal_stability: 87.3,
            power_stability: 92.8,
            communication_stability: 96.1,
        }
    }
}

const STABILITY_METRICS_FIELDS: &[FieldSpec] = &[
    percent("attitude_stability"),
    percent("orbit_stability"),
    percent("thermal_stability"),
    percent("power_stability"),
    percent("communication_stability"),
];

/// Response of `GET /api/stability/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    pub metrics: StabilityMetrics,
    pub status: String,
    pub timestamp: String,
}

impl Schema for StabilityReport {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("metrics", FieldType::Object).nested(STABILITY_METRICS_FIELDS),
        FieldSpec::required("status", FieldType::String).min_length(1),
        FieldSpec::required("timestamp", FieldType::String).min_length(1),
    ];
}

/// Response of `GET /api/comprehensive/data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveReport {
    pub metrics: StabilityMetrics,
    pub status: String,
    pub alerts: Vec<String>,
    pub timestamp: String,
}

impl Schema for ComprehensiveReport {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("metrics", FieldType::Object).nested(STABILITY_METRICS_FIELDS),
        FieldSpec::required("status", FieldType::String).min_length(1),
        FieldSpec::required("alerts", FieldType::Array).items(FieldType::String),
        FieldSpec::required("timestamp", FieldType::String).min_length(1),
    ];
}

pub fn stability_report(now: DateTime<Utc>) -> StabilityReport {
    StabilityReport {
        metrics: StabilityMetrics::nominal(),
        status: NOMINAL.to_string(),
        timestamp: format_timestamp(now),
    }
}

pub fn comprehensive_report(now: DateTime<Utc>) -> ComprehensiveReport {
    ComprehensiveReport {
        metrics: StabilityMetrics::nominal(),
        status: NOMINAL.to_string(),
        alerts: Vec::new(),
        timestamp: format_timestamp(now),
    }
}

/// Lifetime totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    /// Hours in service.
    pub total_operational_time: u32,
    pub total_anomalies_detected: u32,
    pub average_stability: f64,
    pub current_health_score: f64,
}

const ANALYTICS_SUMMARY_FIELDS: &[FieldSpec] = &[
    count("total_operational_time"),
    count("total_anomalies_detected"),
    percent("average_stability"),
    percent("current_health_score"),
];

/// Latest value of one subsystem metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    pub value: f64,
    pub trend: String,
    pub status: String,
}

impl MetricReading {
    fn nominal(value: f64, trend: &str) -> Self {
        Self {
            value,
            trend: trend.to_string(),
            status: NOMINAL.to_string(),
        }
    }
}

const METRIC_READING_FIELDS: &[FieldSpec] = &[
    percent("value"),
    FieldSpec::required("trend", FieldType::String).min_length(1),
    FieldSpec::required("status", FieldType::String).min_length(1),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentMetrics {
    pub power_consumption: MetricReading,
    pub thermal_control: MetricReading,
    pub communication_quality: MetricReading,
    pub orbit_stability: MetricReading,
}

const CURRENT_METRICS_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("power_consumption", FieldType::Object).nested(METRIC_READING_FIELDS),
    FieldSpec::required("thermal_control", FieldType::Object).nested(METRIC_READING_FIELDS),
    FieldSpec::required("communication_quality", FieldType::Object).nested(METRIC_READING_FIELDS),
    FieldSpec::required("orbit_stability", FieldType::Object).nested(METRIC_READING_FIELDS),
];

/// One hourly sample of the trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: String,
    pub stability_score: f64,
    pub anomaly_count: u32,
    pub power_efficiency: f64,
    pub thermal_status: f64,
    pub communication_quality: f64,
}

const TREND_POINT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("timestamp", FieldType::String).min_length(1),
    FieldSpec::required("stability_score", FieldType::Number).range(85.0, 98.0),
    FieldSpec::required("anomaly_count", FieldType::Number).range(0.0, 3.0),
    FieldSpec::required("power_efficiency", FieldType::Number).range(90.0, 99.0),
    FieldSpec::required("thermal_status", FieldType::Number).range(85.0, 95.0),
    FieldSpec::required("communication_quality", FieldType::Number).range(92.0, 99.0),
];

/// Aggregates over a week or a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub average_stability: f64,
    pub total_anomalies: u32,
    pub power_efficiency: f64,
    pub communication_uptime: f64,
}

const PERIOD_SUMMARY_FIELDS: &[FieldSpec] = &[
    percent("average_stability"),
    count("total_anomalies"),
    percent("power_efficiency"),
    percent("communication_uptime"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trends {
    /// Oldest first; the last point is the current hour.
    pub daily: Vec<TrendPoint>,
    pub weekly_summary: PeriodSummary,
    pub monthly_summary: PeriodSummary,
}

const TRENDS_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("daily", FieldType::Array).nested(TREND_POINT_FIELDS),
    FieldSpec::required("weekly_summary", FieldType::Object).nested(PERIOD_SUMMARY_FIELDS),
    FieldSpec::required("monthly_summary", FieldType::Object).nested(PERIOD_SUMMARY_FIELDS),
];

/// Response of `GET /api/analytics/data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub summary: AnalyticsSummary,
    pub current_metrics: CurrentMetrics,
    pub trends: Trends,
}

impl Schema for AnalyticsReport {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("summary", FieldType::Object).nested(ANALYTICS_SUMMARY_FIELDS),
        FieldSpec::required("current_metrics", FieldType::Object).nested(CURRENT_METRICS_FIELDS),
        FieldSpec::required("trends", FieldType::Object).nested(TRENDS_FIELDS),
    ];
}

/// Hourly samples ending at `now`, oldest first.
pub fn daily_trends(now: DateTime<Utc>) -> Vec<TrendPoint> {
    (0..DAILY_TREND_HOURS)
        .map(|hour| {
            let step = hour as u32;
            TrendPoint {
                timestamp: format_timestamp(now - TimeDelta::hours(DAILY_TREND_HOURS - 1 - hour)),
                stability_score: 85.0 + f64::from(step * 37 % 130) / 10.0,
                anomaly_count: step * 5 % 4,
                power_efficiency: 90.0 + f64::from(step * 53 % 90) / 10.0,
                thermal_status: 85.0 + f64::from(step * 29 % 100) / 10.0,
                communication_quality: 92.0 + f64::from(step * 41 % 70) / 10.0,
            }
        })
        .collect()
}

pub fn analytics_report(now: DateTime<Utc>) -> AnalyticsReport {
    AnalyticsReport {
        summary: AnalyticsSummary {
            total_operational_time: 720,
            total_anomalies_detected: 15,
            average_stability: 94.5,
            current_health_score: 96.2,
        },
        current_metrics: CurrentMetrics {
            power_consumption: MetricReading::nominal(95.5, "stable"),
            thermal_control: MetricReading::nominal(92.3, "improving"),
            communication_quality: MetricReading::nominal(97.8, "stable"),
            orbit_stability: MetricReading::nominal(98.1, "stable"),
        },
        trends: Trends {
            daily: daily_trends(now),
            weekly_summary: PeriodSummary {
                average_stability: 93.8,
                total_anomalies: 8,
                power_efficiency: 95.2,
                communication_uptime: 99.1,
            },
            monthly_summary: PeriodSummary {
                average_stability: 94.1,
                total_anomalies: 32,
                power_efficiency: 94.8,
                communication_uptime: 98.7,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::check;
    use chrono::TimeZone;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 21, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_reports_pass_their_schemas() {
        assert!(check(&stability_report(instant())).is_ok());
        assert!(check(&comprehensive_report(instant())).is_ok());
        assert!(check(&analytics_report(instant())).is_ok());
    }

    #[test]
    fn test_daily_trends_span_last_day() {
        let trends = daily_trends(instant());
        assert_eq!(trends.len(), 24);
        assert_eq!(trends[0].timestamp, "2024-01-20T13:00:00.000000Z");
        assert_eq!(trends[23].timestamp, "2024-01-21T12:00:00.000000Z");
    }

    #[test]
    fn test_daily_trends_are_repeatable() {
        assert_eq!(daily_trends(instant()), daily_trends(instant()));
    }

    #[test]
    fn test_comprehensive_report_wire_form() {
        let json = serde_json::to_value(comprehensive_report(instant())).unwrap();
        assert_eq!(json["metrics"]["orbit_stability"], 98.2);
        assert_eq!(json["status"], "nominal");
        assert_eq!(json["alerts"], serde_json::json!([]));
    }

    #[test]
    fn test_out_of_range_trend_rejected() {
        let mut report = analytics_report(instant());
        report.trends.daily[3].stability_score = 120.0;
        let failure = check(&report).unwrap_err();
        assert_eq!(failure.fields(), vec!["trends.daily[3].stability_score"]);
    }
}
