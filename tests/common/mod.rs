#![allow(dead_code)]

use serde_json::{json, Value};
use trip_budget_rs::{BudgetLevel, TravelMode, TripRequest};

/// Delhi -> Tirupati, 3 days, 2 travelers, medium budget.
pub fn tirupati_request() -> TripRequest {
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

/// Category totals sum to 26100; aggregates omitted.
pub fn tirupati_payload() -> Value {
    json!({
        "transportation": {
            "mode": "flight",
            "cost": 15000,
            "details": "Round trip flight fare for 2 persons"
        },
        "accommodation": {
            "perNight": 2000,
            "totalNights": 2,
            "totalCost": 4000,
            "type": "3-star hotel",
            "details": "Double occupancy room with breakfast"
        },
        "food": {
            "perDay": 800,
            "totalDays": 3,
            "totalCost": 2400,
            "details": "3 meals per person per day"
        },
        "localTransport": {
            "perDay": 333,
            "totalDays": 3,
            "totalCost": 1000,
            "details": "Auto/taxi for local sightseeing"
        },
        "templeAndActivities": {
            "entranceFees": 200,
            "activities": 1500,
            "totalCost": 1700,
            "details": "Temple darshan, prasad, and local activities"
        },
        "miscellaneous": {
            "amount": 2000,
            "details": "Shopping, tips, emergency fund"
        },
        "recommendations": [
            "Book Tirumala darshan slots online in advance"
        ]
    })
}

/// Wrap assistant text in a chat-completion response envelope.
pub fn envelope(content: &str) -> String {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "llama-3.3-70b-versatile",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}
