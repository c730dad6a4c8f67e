pub mod clean;
pub mod keyed;
pub mod rooms;
pub mod schema;

use crate::model::{
    FieldError, ListingType, NormalizeError, NormalizedListing, PropertyPrice, RawListing,
};
use keyed::{to_mapping, value_after};
pub use schema::ListingSchema;

const AD_REF_PREFIX: &str = "Ad ref#";
const SECURITY_DEPOSIT_KEY: &str = "Security deposit";

/// Turns one scraped listing into its output record.
///
/// Fails with `MissingIdentifier` when no token carries an ad ref, and with
/// `MalformedPositionalField` when a positional field is shorter than the page
/// layout implies. Either way the listing must be dropped as a whole.
pub fn normalize_listing(
    raw: RawListing,
    schema: &ListingSchema,
) -> Result<NormalizedListing, NormalizeError> {
    let raw = raw.map_fields(clean::clean);
    let url = raw.url.as_str();
    let malformed = |source: FieldError| NormalizeError::MalformedPositionalField {
        url: url.to_string(),
        source,
    };

    let ad_ref = raw
        .ad_ref
        .iter()
        .find(|token| token.starts_with(AD_REF_PREFIX))
        .cloned()
        .ok_or_else(|| NormalizeError::MissingIdentifier {
            url: url.to_string(),
        })?;

    let listing_type = listing_type(&raw.listing_type).map_err(malformed)?;
    let property_price =
        property_price(&raw.property_price, &raw.room_deposit).map_err(malformed)?;
    let room_price = rooms::reconcile(&raw.room_price, &raw.room_deposit).map_err(malformed)?;

    Ok(NormalizedListing {
        ad_ref,
        listing_type,
        property_price,
        room_price,
        room_available: to_mapping(&raw.room_available, &schema.room_available),
        amenities: to_mapping(&raw.amenities, &schema.amenities),
        household_preferences: to_mapping(&raw.household_preferences, &schema.household_preferences),
        current_household: to_mapping(&raw.current_household, &schema.current_household),
    })
}

fn listing_type(tokens: &[String]) -> Result<ListingType, FieldError> {
    match tokens {
        [list_type, location, postcode, ..] => Ok(ListingType {
            list_type: list_type.clone(),
            location: location.clone(),
            postcode: postcode.clone(),
        }),
        _ => Err(FieldError::new(
            "listing_type",
            format!("expected 3 tokens, found {}", tokens.len()),
        )),
    }
}

fn property_price(tokens: &[String], room_deposit: &[String]) -> Result<PropertyPrice, FieldError> {
    let Some((price, description)) = tokens.split_first() else {
        return Ok(PropertyPrice::default());
    };

    let deposit = value_after(room_deposit, SECURITY_DEPOSIT_KEY).ok_or_else(|| {
        FieldError::new("room_deposit", format!("no value for {SECURITY_DEPOSIT_KEY:?}"))
    })?;

    Ok(PropertyPrice {
        price: Some(price.clone()),
        description: Some(description.join(" ")),
        deposit: Some(deposit.to_string()),
    })
}
