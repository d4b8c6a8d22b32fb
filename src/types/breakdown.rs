use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::trip::{TravelMode, TripRequest};

/// Round-trip transport to the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transportation {
    #[serde(deserialize_with = "lenient::travel_mode")]
    #[schemars(with = "String")]
    pub mode: TravelMode,
    #[serde(deserialize_with = "lenient::rupees")]
    #[schemars(with = "f64")]
    pub cost: u64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    #[schemars(with = "Option<String>")]
    pub details: String,
}

/// Lodging for every night of the trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Accommodation {
    #[serde(deserialize_with = "lenient::rupees")]
    #[schemars(with = "f64")]
    pub per_night: u64,
    #[serde(deserialize_with = "lenient::rupees")]
    #[schemars(with = "f64")]
    pub total_nights: u64,
    #[serde(deserialize_with = "lenient::rupees")]
    #[schemars(with = "f64")]
    pub total_cost: u64,
    #[serde(default, rename = "type", deserialize_with = "lenient::or_default")]
    #[schemars(with = "Option<String>")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    #[schemars(with = "Option<String>")]
    pub details: String,
}

/// A per-day expense such as meals or local transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyCost {
    #[serde(deserialize_with = "lenient::rupees")]
    #[schemars(with = "f64")]
    pub per_day: u64,
    #[serde(deserialize_with = "lenient::rupees")]
    #[schemars(with = "f64")]
    pub total_days: u64,
    #[serde(deserialize_with = "lenient::rupees")]
    #[schemars(with = "f64")]
    pub total_cost: u64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    #[schemars(with = "Option<String>")]
    pub details: String,
}

/// Darshan fees, prasad and local activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TempleAndActivities {
    #[serde(deserialize_with = "lenient::rupees")]
    #[schemars(with = "f64")]
    pub entrance_fees: u64,
    #[serde(deserialize_with = "lenient::rupees")]
    #[schemars(with = "f64")]
    pub activities: u64,
    #[serde(deserialize_with = "lenient::rupees")]
    #[schemars(with = "f64")]
    pub total_cost: u64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    #[schemars(with = "Option<String>")]
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Miscellaneous {
    #[serde(deserialize_with = "lenient::rupees")]
    #[schemars(with = "f64")]
    pub amount: u64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    #[schemars(with = "Option<String>")]
    pub details: String,
}

/// Estimate exactly as the inference endpoint returned it, before reconciliation.
///
/// Aggregates are optional here: the model is asked to leave them at zero and
/// the normalizer fills them in from the category totals.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimatePayload {
    pub transportation: Transportation,
    pub accommodation: Accommodation,
    pub food: DailyCost,
    pub local_transport: DailyCost,
    pub temple_and_activities: TempleAndActivities,
    pub miscellaneous: Miscellaneous,
    #[serde(default, deserialize_with = "lenient::optional_rupees")]
    #[schemars(with = "Option<f64>")]
    pub total_cost: Option<u64>,
    #[serde(default, deserialize_with = "lenient::optional_rupees")]
    #[schemars(with = "Option<f64>")]
    pub per_person_cost: Option<u64>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    #[schemars(with = "Option<Vec<String>>")]
    pub recommendations: Vec<String>,
}

impl EstimatePayload {
    /// Sum of the six category totals.
    pub fn categories_total(&self) -> u64 {
        [
            self.transportation.cost,
            self.accommodation.total_cost,
            self.food.total_cost,
            self.local_transport.total_cost,
            self.temple_and_activities.total_cost,
            self.miscellaneous.amount,
        ]
        .iter()
        .fold(0u64, |acc, value| acc.saturating_add(*value))
    }
}

/// Normalized, internally consistent cost estimate for a trip.
///
/// Serializes to the same camelCase shape the endpoint is asked to produce, so
/// a serialized breakdown can be fed back through the normalizer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub transportation: Transportation,
    pub accommodation: Accommodation,
    pub food: DailyCost,
    pub local_transport: DailyCost,
    pub temple_and_activities: TempleAndActivities,
    pub miscellaneous: Miscellaneous,
    pub total_cost: u64,
    pub per_person_cost: u64,
    pub recommendations: Vec<String>,
}

impl CostBreakdown {
    /// Category label and amount pairs in display order
    pub fn categories(&self) -> [(&'static str, u64); 6] {
        [
            ("Transportation", self.transportation.cost),
            ("Accommodation", self.accommodation.total_cost),
            ("Food & Dining", self.food.total_cost),
            ("Local Transport", self.local_transport.total_cost),
            ("Temple & Activities", self.temple_and_activities.total_cost),
            ("Miscellaneous", self.miscellaneous.amount),
        ]
    }

    /// Generate a human-readable summary of the estimate
    pub fn summary(&self, request: &TripRequest) -> String {
        let mut lines = Vec::new();

        lines.push("=== Your Trip Estimate ===".to_string());
        lines.push(format!(
            "{} -> {}",
            request.origin(),
            request.destination()
        ));
        lines.push(format!(
            "{} days • {} travelers • {} budget",
            request.duration_days(),
            request.traveler_count(),
            capitalize(request.budget_level().as_str())
        ));
        if !request.travel_date().is_empty() {
            lines.push(format!("Travel date: {}", request.travel_date()));
        }

        lines.push(String::new());
        lines.push(format!("Total Estimated Cost: {}", format_inr(self.total_cost)));
        lines.push(format!("{} per person", format_inr(self.per_person_cost)));

        lines.push(String::new());
        lines.push("--- Cost Breakdown ---".to_string());
        for (label, amount) in self.categories() {
            lines.push(format!("{:<20} {:>12}", label, format_inr(amount)));
        }

        lines.push(String::new());
        lines.push(format!(
            "Transportation: {} ({})",
            capitalize(self.transportation.mode.as_str()),
            self.transportation.details
        ));
        lines.push(format!(
            "Accommodation: {} per night x {} nights, {}",
            format_inr(self.accommodation.per_night),
            self.accommodation.total_nights,
            self.accommodation.kind
        ));
        lines.push(format!(
            "Food: {} per day x {} days",
            format_inr(self.food.per_day),
            self.food.total_days
        ));
        lines.push(format!(
            "Local transport: {} per day x {} days",
            format_inr(self.local_transport.per_day),
            self.local_transport.total_days
        ));
        lines.push(format!(
            "Temple: {} entrance fees + {} activities",
            format_inr(self.temple_and_activities.entrance_fees),
            format_inr(self.temple_and_activities.activities)
        ));

        if !self.recommendations.is_empty() {
            lines.push(String::new());
            lines.push("--- Travel Tips ---".to_string());
            for tip in &self.recommendations {
                lines.push(format!("- {}", tip));
            }
        }

        lines.join("\n")
    }
}

/// Format whole rupees with Indian digit grouping, e.g. `₹1,23,456`.
pub fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return format!("₹{digits}");
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("₹{},{}", groups.join(","), tail)
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lenient deserializers for model-produced values.
mod lenient {
    use serde::{de::Error, Deserialize, Deserializer};

    use crate::types::trip::TravelMode;

    fn to_rupees(value: f64) -> Result<u64, String> {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("expected a non-negative amount, got {value}"));
        }
        Ok(value.round() as u64)
    }

    pub(super) fn rupees<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        to_rupees(value).map_err(D::Error::custom)
    }

    pub(super) fn optional_rupees<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<f64>::deserialize(deserializer)?
            .map(to_rupees)
            .transpose()
            .map_err(D::Error::custom)
    }

    /// Treats an explicit `null` like an absent field.
    pub(super) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    pub(super) fn travel_mode<'de, D>(deserializer: D) -> Result<TravelMode, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<TravelMode>().map_err(D::Error::custom)
    }
}
