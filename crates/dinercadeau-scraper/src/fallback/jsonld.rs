//! Fallback A: schema.org JSON-LD extraction.

use dinercadeau_core::{merge_tags, normalize_country, Restaurant};
use reqwest::Url;
use serde_json::Value;

use crate::client::resolve_url;
use crate::html::script_blocks;
use crate::value::{collapse_whitespace, count, first_present, first_text, number, string_list, text};

const ACCEPTED_TYPES: [&str; 2] = ["Restaurant", "FoodEstablishment"];

/// Extract restaurants from `<script type="application/ld+json">` blocks.
///
/// Blocks that are not valid JSON are skipped.
pub(crate) fn extract_jsonld_restaurants(html: &str, base: &Url) -> Vec<Restaurant> {
    let mut results = Vec::new();

    for block in script_blocks(html) {
        if block.script_type.as_deref() != Some("application/ld+json") {
            continue;
        }
        let value: Value = match serde_json::from_str(block.body) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed JSON-LD block");
                continue;
            }
        };

        // Accept top-level object, array, or @graph container.
        let mut candidates: Vec<&Value> = match &value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        let graphs: Vec<&Value> = candidates
            .iter()
            .filter_map(|item| item.get("@graph").and_then(Value::as_array))
            .flatten()
            .collect();
        candidates.extend(graphs);

        results.extend(
            candidates
                .into_iter()
                .filter_map(|item| jsonld_item_to_restaurant(item, base)),
        );
    }

    results
}

/// `@type` may be a plain string or an array of strings.
fn type_names(item: &Value) -> Vec<String> {
    item.get("@type").map(string_list).unwrap_or_default()
}

fn jsonld_item_to_restaurant(item: &Value, base: &Url) -> Option<Restaurant> {
    let types = type_names(item);
    if !types
        .iter()
        .any(|t| ACCEPTED_TYPES.iter().any(|a| t.eq_ignore_ascii_case(a)))
    {
        return None;
    }

    let name = first_text(item, &["name"])?;
    let href = first_text(item, &["url", "@id"])?;
    let url = resolve_url(base, &href)?;
    let mut restaurant = Restaurant::new(&name, &url)?;

    let address = item.get("address").and_then(|a| match a {
        Value::Array(items) => items.iter().find(|i| i.is_object()),
        Value::Object(_) => Some(a),
        _ => None,
    });
    if let Some(address) = address {
        restaurant.city = first_text(address, &["addressLocality"]);
        restaurant.address = first_text(address, &["streetAddress"]);
        restaurant.postal_code = first_text(address, &["postalCode"]);
        // addressCountry may itself be a Country object.
        let country = address.get("addressCountry").and_then(|c| match c {
            Value::Object(_) => first_text(c, &["name"]),
            other => text(other),
        });
        restaurant.country = normalize_country(country.as_deref());
    }

    restaurant.description = first_text(item, &["description", "disambiguatingDescription"])
        .and_then(|d| collapse_whitespace(&d));

    if let Some(rating) = item.get("aggregateRating") {
        restaurant.rating = rating.get("ratingValue").and_then(number);
        restaurant.review_count = ["reviewCount", "ratingCount"]
            .iter()
            .filter_map(|key| rating.get(key))
            .find_map(count);
    }

    let cuisines = item.get("servesCuisine").map(string_list).unwrap_or_default();
    let categories = item.get("category").map(string_list).unwrap_or_default();
    restaurant.tags = merge_tags(cuisines.iter().chain(&types).chain(&categories));

    restaurant.price_range = price_range(item);

    // geo.latitude / geo.longitude may be strings or numbers in the wild.
    let geo = item.get("geo");
    let coordinate = |key: &str| {
        item.get(key)
            .and_then(number)
            .or_else(|| geo.and_then(|g| g.get(key)).and_then(number))
    };
    restaurant.latitude = coordinate("latitude");
    restaurant.longitude = coordinate("longitude");

    Some(restaurant)
}

/// `offers.price` with its currency, else the free-text `priceRange`.
fn price_range(item: &Value) -> Option<String> {
    let offer = item.get("offers").and_then(|o| match o {
        Value::Array(items) => items.first(),
        other => Some(other),
    });
    if let Some(offer) = offer {
        if let Some(price) = first_present(offer, &["price"]).and_then(text) {
            return Some(match first_text(offer, &["priceCurrency"]) {
                Some(currency) => format!("{price} {currency}"),
                None => price,
            });
        }
    }
    first_text(item, &["priceRange"])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.diner-cadeau.nl").unwrap()
    }

    fn wrap(json: &str) -> String {
        format!(r#"<html><script type="application/ld+json">{json}</script></html>"#)
    }

    #[test]
    fn extracts_restaurant_with_address_rating_and_geo() {
        let html = wrap(
            r#"{
                "@context": "https://schema.org",
                "@type": "Restaurant",
                "name": "De Klok",
                "url": "/r/de-klok",
                "address": {
                    "@type": "PostalAddress",
                    "streetAddress": "Oudegracht 12",
                    "addressLocality": "Utrecht",
                    "postalCode": "3511 AB",
                    "addressCountry": "Nederland"
                },
                "description": "Klassieke  keuken",
                "aggregateRating": {"ratingValue": "8.6", "ratingCount": 41},
                "servesCuisine": ["Frans", "Seizoens"],
                "priceRange": "€€",
                "geo": {"latitude": "52.0912", "longitude": 5.1201}
            }"#,
        );
        let found = extract_jsonld_restaurants(&html, &base());
        assert_eq!(found.len(), 1);
        let r = &found[0];
        assert_eq!(r.name, "De Klok");
        assert_eq!(r.url, "https://www.diner-cadeau.nl/r/de-klok");
        assert_eq!(r.city.as_deref(), Some("Utrecht"));
        assert_eq!(r.address.as_deref(), Some("Oudegracht 12"));
        assert_eq!(r.country, "Netherlands");
        assert_eq!(r.description.as_deref(), Some("Klassieke keuken"));
        assert_eq!(r.rating, Some(8.6));
        assert_eq!(r.review_count, Some(41));
        assert_eq!(r.tags, vec!["Frans", "Seizoens", "Restaurant"]);
        assert_eq!(r.price_range.as_deref(), Some("€€"));
        assert_eq!(r.latitude, Some(52.0912));
        assert_eq!(r.longitude, Some(5.1201));
    }

    #[test]
    fn graph_container_and_type_arrays_are_expanded() {
        let html = wrap(
            r#"{"@graph": [
                {"@type": "WebPage", "name": "Listing", "url": "/restaurant"},
                {"@type": ["FoodEstablishment", "LocalBusiness"], "name": "Bistro", "@id": "https://www.diner-cadeau.nl/r/bistro",
                 "offers": {"price": "49.50", "priceCurrency": "EUR"}, "category": "Bistro"}
            ]}"#,
        );
        let found = extract_jsonld_restaurants(&html, &base());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "https://www.diner-cadeau.nl/r/bistro");
        assert_eq!(found[0].price_range.as_deref(), Some("49.50 EUR"));
        assert_eq!(
            found[0].tags,
            vec!["FoodEstablishment", "LocalBusiness", "Bistro"]
        );
    }

    #[test]
    fn malformed_blocks_and_other_scripts_are_skipped() {
        let html = format!(
            "{}{}{}",
            wrap("{not json"),
            r#"<script type="application/json">{"@type":"Restaurant","name":"X","url":"/r/x"}</script>"#,
            wrap(r#"[{"@type":"Restaurant","name":"Y","url":"/r/y"},{"@type":"Restaurant","name":"No url"}]"#)
        );
        let found = extract_jsonld_restaurants(&html, &base());
        let names: Vec<&str> = found.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Y"]);
    }
}
