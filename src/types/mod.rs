pub mod breakdown;
pub mod trip;

pub use breakdown::{
    format_inr, Accommodation, CostBreakdown, DailyCost, EstimatePayload, Miscellaneous,
    TempleAndActivities, Transportation,
};
pub use trip::{BudgetLevel, TravelMode, TripRequest, TripRequestBuilder};
