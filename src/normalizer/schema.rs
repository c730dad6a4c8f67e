use serde::Deserialize;

const AMENITIES: [&str; 8] = [
    "Furnishings",
    "Parking",
    "Garage",
    "Garden/terrace",
    "Balcony/patio",
    "Disabled access",
    "Living room",
    "Broadband included",
];

const HOUSEHOLD_PREFERENCES: [&str; 8] = [
    "Couples OK?",
    "Smoking OK?",
    "Pets OK?",
    "Occupation",
    "References?",
    "Min age",
    "Max age",
    "Gender",
];

const CURRENT_HOUSEHOLD: [&str; 13] = [
    "# housemates",
    "# flatmates",
    "Total # rooms",
    "Age",
    "Ages",
    "Smoker?",
    "Any pets?",
    "Language",
    "Nationality",
    "Gender",
    "Interests",
    "Occupation",
    "Orientation",
];

const ROOM_AVAILABLE: [&str; 3] = ["Available", "Minimum term", "Maximum term"];

/// Expected keys for each keyed section of a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListingSchema {
    pub amenities: Vec<String>,
    pub household_preferences: Vec<String>,
    pub current_household: Vec<String>,
    pub room_available: Vec<String>,
}

impl Default for ListingSchema {
    fn default() -> Self {
        fn owned(keys: &[&str]) -> Vec<String> {
            keys.iter().map(|k| k.to_string()).collect()
        }

        Self {
            amenities: owned(&AMENITIES),
            household_preferences: owned(&HOUSEHOLD_PREFERENCES),
            current_household: owned(&CURRENT_HOUSEHOLD),
            room_available: owned(&ROOM_AVAILABLE),
        }
    }
}
