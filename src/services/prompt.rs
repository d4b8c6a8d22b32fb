use crate::types::trip::TripRequest;

/// System turn sent with every estimation request.
pub const SYSTEM_INSTRUCTION: &str = "You are a travel budget expert specializing in Indian temple tourism. Always respond with valid JSON only, no markdown formatting.";

const TRANSPORT_EXAMPLE: u64 = 15_000;
const PER_NIGHT_EXAMPLE: u64 = 2_000;
const FOOD_PER_DAY_EXAMPLE: u64 = 800;
const LOCAL_PER_DAY_EXAMPLE: u64 = 500;
const ENTRANCE_FEES_EXAMPLE: u64 = 200;
const ACTIVITIES_EXAMPLE: u64 = 1_500;
const MISC_EXAMPLE: u64 = 2_000;

/// Build the user prompt for a trip.
///
/// Pure and deterministic: the same request always yields the same text. The
/// embedded JSON template pre-fills example amounts derived from the trip length.
pub fn build_prompt(request: &TripRequest) -> String {
    let mode = request.travel_mode().as_str();
    let days = u64::from(request.duration_days());
    let nights = u64::from(request.nights());
    let travelers = request.traveler_count();
    let budget = request.budget_level().as_str();

    format!(
        r#"You are a travel budget estimation assistant for Indian temple tourism. Based on the following trip details, provide a detailed cost breakdown in JSON format.

Trip Details:
- From: {origin}
- To Temple: {destination}
- Travel Mode: {mode}
- Duration: {days} days
- Travel Date: {date}
- Number of Travelers: {travelers}
- Budget Level: {budget}

Provide realistic Indian Rupee (INR) costs for {travelers} travelers at {budget} budget level.

Return ONLY valid JSON in this exact structure (no markdown, no additional text):
{{
  "transportation": {{
    "mode": "{mode}",
    "cost": {transport},
    "details": "Round trip {mode} fare for {travelers} persons"
  }},
  "accommodation": {{
    "perNight": {per_night},
    "totalNights": {nights},
    "totalCost": {stay_total},
    "type": "3-star hotel",
    "details": "Double occupancy room with breakfast"
  }},
  "food": {{
    "perDay": {food_per_day},
    "totalDays": {days},
    "totalCost": {food_total},
    "details": "3 meals per person per day"
  }},
  "localTransport": {{
    "perDay": {local_per_day},
    "totalDays": {days},
    "totalCost": {local_total},
    "details": "Auto/taxi for local sightseeing"
  }},
  "templeAndActivities": {{
    "entranceFees": {fees},
    "activities": {activities},
    "totalCost": {temple_total},
    "details": "Temple darshan, prasad, and local activities"
  }},
  "miscellaneous": {{
    "amount": {misc},
    "details": "Shopping, tips, emergency fund"
  }},
  "totalCost": 0,
  "perPersonCost": 0,
  "recommendations": [
    "Book transportation tickets in advance for better prices",
    "Carry cash as many temples don't accept cards",
    "Check temple timings and dress code before visiting"
  ]
}}"#,
        origin = request.origin(),
        destination = request.destination(),
        date = request.travel_date(),
        transport = TRANSPORT_EXAMPLE,
        per_night = PER_NIGHT_EXAMPLE,
        stay_total = nights * PER_NIGHT_EXAMPLE,
        food_per_day = FOOD_PER_DAY_EXAMPLE,
        food_total = days * FOOD_PER_DAY_EXAMPLE,
        local_per_day = LOCAL_PER_DAY_EXAMPLE,
        local_total = days * LOCAL_PER_DAY_EXAMPLE,
        fees = ENTRANCE_FEES_EXAMPLE,
        activities = ACTIVITIES_EXAMPLE,
        temple_total = ENTRANCE_FEES_EXAMPLE + ACTIVITIES_EXAMPLE,
        misc = MISC_EXAMPLE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::trip::{BudgetLevel, TravelMode};

    fn tirupati() -> TripRequest {
        TripRequest::builder()
            .origin("Delhi")
            .destination("Tirupati")
            .travel_mode(TravelMode::Flight)
            .duration_days(3)
            .travel_date("03/14/2026")
            .traveler_count(2)
            .budget_level(BudgetLevel::Medium)
            .build()
            .unwrap()
    }

    #[test]
    fn test_prompt_restates_trip() {
        let prompt = build_prompt(&tirupati());

        assert!(prompt.contains("- From: Delhi"));
        assert!(prompt.contains("- To Temple: Tirupati"));
        assert!(prompt.contains("- Travel Mode: flight"));
        assert!(prompt.contains("- Duration: 3 days"));
        assert!(prompt.contains("- Travel Date: 03/14/2026"));
        assert!(prompt.contains("- Number of Travelers: 2"));
        assert!(prompt.contains("- Budget Level: medium"));
        assert!(prompt.contains("Return ONLY valid JSON"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_prompt(&tirupati()), build_prompt(&tirupati()));
    }

    #[test]
    fn test_template_is_valid_json_with_derived_examples() {
        let prompt = build_prompt(&tirupati());
        let start = prompt.find('{').unwrap();
        let template: serde_json::Value = serde_json::from_str(&prompt[start..]).unwrap();

        assert_eq!(template["accommodation"]["totalNights"], 2);
        assert_eq!(template["accommodation"]["totalCost"], 4000);
        assert_eq!(template["food"]["totalDays"], 3);
        assert_eq!(template["food"]["totalCost"], 2400);
        assert_eq!(template["localTransport"]["totalCost"], 1500);
        assert_eq!(template["templeAndActivities"]["totalCost"], 1700);
        assert_eq!(template["totalCost"], 0);
        assert_eq!(template["recommendations"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_single_day_trip_floors_nights_at_zero() {
        let request = TripRequest::builder()
            .origin("Varanasi")
            .destination("Sarnath")
            .travel_mode(TravelMode::Car)
            .duration_days(1)
            .build()
            .unwrap();
        let prompt = build_prompt(&request);

        assert!(prompt.contains("\"totalNights\": 0,"));
        assert!(prompt.contains("\"mode\": \"car\""));
    }
}
