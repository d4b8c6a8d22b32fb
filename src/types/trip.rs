use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, Result};

/// How the travelers reach the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Flight,
    Train,
    Car,
}

impl TravelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Train => "train",
            Self::Car => "car",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = EstimateError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "flight" => Ok(Self::Flight),
            "train" => Ok(Self::Train),
            "car" => Ok(Self::Car),
            other => Err(EstimateError::InvalidRequest(format!(
                "unknown travel mode `{other}` (expected flight, train or car)"
            ))),
        }
    }
}

/// Spending tier the estimate should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetLevel {
    Budget,
    Medium,
    Luxury,
}

impl BudgetLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Medium => "medium",
            Self::Luxury => "luxury",
        }
    }
}

impl fmt::Display for BudgetLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetLevel {
    type Err = EstimateError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "budget" => Ok(Self::Budget),
            "medium" => Ok(Self::Medium),
            "luxury" => Ok(Self::Luxury),
            other => Err(EstimateError::InvalidRequest(format!(
                "unknown budget level `{other}` (expected budget, medium or luxury)"
            ))),
        }
    }
}

/// A validated trip submission. Construct it through [`TripRequest::builder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripRequest {
    origin: String,
    destination: String,
    travel_mode: TravelMode,
    duration_days: u32,
    travel_date: String,
    traveler_count: u32,
    budget_level: BudgetLevel,
}

impl TripRequest {
    pub fn builder() -> TripRequestBuilder {
        TripRequestBuilder::default()
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn travel_mode(&self) -> TravelMode {
        self.travel_mode
    }

    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }

    pub fn travel_date(&self) -> &str {
        &self.travel_date
    }

    pub fn traveler_count(&self) -> u32 {
        self.traveler_count
    }

    pub fn budget_level(&self) -> BudgetLevel {
        self.budget_level
    }

    /// Nights of accommodation implied by the trip length.
    pub fn nights(&self) -> u32 {
        self.duration_days.saturating_sub(1)
    }
}

/// Builder mirroring the planning form, including its default values.
#[derive(Debug, Clone)]
pub struct TripRequestBuilder {
    origin: String,
    destination: String,
    travel_mode: TravelMode,
    duration_days: u32,
    travel_date: String,
    traveler_count: u32,
    budget_level: BudgetLevel,
}

impl Default for TripRequestBuilder {
    fn default() -> Self {
        Self {
            origin: String::new(),
            destination: String::new(),
            travel_mode: TravelMode::Flight,
            duration_days: 3,
            travel_date: String::new(),
            traveler_count: 2,
            budget_level: BudgetLevel::Medium,
        }
    }
}

impl TripRequestBuilder {
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    pub fn travel_mode(mut self, travel_mode: TravelMode) -> Self {
        self.travel_mode = travel_mode;
        self
    }

    pub fn duration_days(mut self, duration_days: u32) -> Self {
        self.duration_days = duration_days;
        self
    }

    pub fn travel_date(mut self, travel_date: impl Into<String>) -> Self {
        self.travel_date = travel_date.into();
        self
    }

    pub fn traveler_count(mut self, traveler_count: u32) -> Self {
        self.traveler_count = traveler_count;
        self
    }

    pub fn budget_level(mut self, budget_level: BudgetLevel) -> Self {
        self.budget_level = budget_level;
        self
    }

    /// Validate the form fields and freeze the request.
    pub fn build(self) -> Result<TripRequest> {
        let origin = self.origin.trim().to_string();
        let destination = self.destination.trim().to_string();

        if origin.is_empty() {
            return Err(EstimateError::InvalidRequest(
                "`origin` must not be empty".to_string(),
            ));
        }
        if destination.is_empty() {
            return Err(EstimateError::InvalidRequest(
                "`destination` must not be empty".to_string(),
            ));
        }
        if self.duration_days == 0 {
            return Err(EstimateError::InvalidRequest(
                "`duration_days` must be at least 1".to_string(),
            ));
        }
        if self.traveler_count == 0 {
            return Err(EstimateError::InvalidRequest(
                "`traveler_count` must be at least 1".to_string(),
            ));
        }

        Ok(TripRequest {
            origin,
            destination,
            travel_mode: self.travel_mode,
            duration_days: self.duration_days,
            travel_date: self.travel_date.trim().to_string(),
            traveler_count: self.traveler_count,
            budget_level: self.budget_level,
        })
    }
}
