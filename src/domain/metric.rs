//! Metric Catalogue — The Closed Set of Tracked Health Metrics
//!
//! Every point written to the store is keyed by one of these sixteen
//! names. The set is closed: anything else in an API response is
//! ignored by the extractor.

use std::fmt;
use std::str::FromStr;

/// Response category a metric is nested under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Sleep,
    Movement,
    Recovery,
    Temperature,
    Heart,
    Activity,
}

impl Category {
    /// Key of the category object in a nested response document.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Movement => "movement",
            Self::Recovery => "recovery",
            Self::Temperature => "temperature",
            Self::Heart => "heart",
            Self::Activity => "activity",
        }
    }
}

/// One of the sixteen tracked health metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricName {
    SleepScore,
    TotalSleep,
    AwakeTime,
    DeepSleep,
    RemSleep,
    LightSleep,
    SleepEfficiency,
    MovementScore,
    TotalSteps,
    TotalCalories,
    PhaseAdvanceSteps,
    RecoveryScore,
    AverageTemperature,
    AvgRhr,
    AvgHrv,
    ActivityMins,
}

impl MetricName {
    /// All metrics in canonical (output) order.
    pub const ALL: [Self; 16] = [
        Self::SleepScore,
        Self::TotalSleep,
        Self::AwakeTime,
        Self::DeepSleep,
        Self::RemSleep,
        Self::LightSleep,
        Self::SleepEfficiency,
        Self::MovementScore,
        Self::TotalSteps,
        Self::TotalCalories,
        Self::PhaseAdvanceSteps,
        Self::RecoveryScore,
        Self::AverageTemperature,
        Self::AvgRhr,
        Self::AvgHrv,
        Self::ActivityMins,
    ];

    /// Field name used both in API responses and as the store field key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SleepScore => "sleep_score",
            Self::TotalSleep => "total_sleep",
            Self::AwakeTime => "awake_time",
            Self::DeepSleep => "deep_sleep",
            Self::RemSleep => "rem_sleep",
            Self::LightSleep => "light_sleep",
            Self::SleepEfficiency => "sleep_efficiency",
            Self::MovementScore => "movement_score",
            Self::TotalSteps => "total_steps",
            Self::TotalCalories => "total_calories",
            Self::PhaseAdvanceSteps => "phase_advance_steps",
            Self::RecoveryScore => "recovery_score",
            Self::AverageTemperature => "average_temperature",
            Self::AvgRhr => "avg_rhr",
            Self::AvgHrv => "avg_hrv",
            Self::ActivityMins => "activity_mins",
        }
    }

    /// Category object this metric lives under in nested documents.
    pub const fn category(self) -> Category {
        match self {
            Self::SleepScore
            | Self::TotalSleep
            | Self::AwakeTime
            | Self::DeepSleep
            | Self::RemSleep
            | Self::LightSleep
            | Self::SleepEfficiency => Category::Sleep,
            Self::MovementScore
            | Self::TotalSteps
            | Self::TotalCalories
            | Self::PhaseAdvanceSteps => Category::Movement,
            Self::RecoveryScore => Category::Recovery,
            Self::AverageTemperature => Category::Temperature,
            Self::AvgRhr | Self::AvgHrv => Category::Heart,
            Self::ActivityMins => Category::Activity,
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a name outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric name: {0}")]
pub struct UnknownMetric(pub String);

impl FromStr for MetricName {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}
