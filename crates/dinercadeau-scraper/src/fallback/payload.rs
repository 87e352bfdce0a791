//! Fallback B: search of embedded Nuxt payloads.
//!
//! Listing pages bootstrap the client app with either a
//! `window.__NUXT__ = {...}` assignment or `<script type="application/json">`
//! payloads. Their shape is not stable, so the decoded trees are searched for
//! objects that look like restaurants.

use std::collections::HashSet;

use dinercadeau_core::{merge_tags, Restaurant};
use reqwest::Url;
use serde_json::Value;

use crate::bundle::scanner::balanced_object_outside_strings;
use crate::client::resolve_url;
use crate::html::script_blocks;
use crate::value::{collapse_whitespace, count, first_present, first_text, number, string_list, text};

/// Nodes nested deeper than this are not visited.
const MAX_DEPTH: usize = 64;

const NUXT_ASSIGNMENT: &str = "window.__NUXT__";

const NAME_KEYS: &[&str] = &["name", "title"];
const URL_KEYS: &[&str] = &["url", "permalink", "link", "slug"];
const LOCATION_KEYS: &[&str] = &["address", "location", "city", "plaats"];
const TAG_KEYS: &[&str] = &["categories", "labels", "tags", "cuisines"];

/// Extract restaurants from every decodable payload on the page, unique by
/// URL in first-seen order.
pub(crate) fn extract_payload_restaurants(html: &str, base: &Url) -> Vec<Restaurant> {
    let mut seen_urls = HashSet::new();
    let mut results = Vec::new();

    for payload in script_payloads(html) {
        for candidate in candidate_objects(&payload) {
            let Some(restaurant) = candidate_to_restaurant(candidate, base) else {
                continue;
            };
            if seen_urls.insert(restaurant.url.clone()) {
                results.push(restaurant);
            }
        }
    }

    results
}

/// Decodes the JSON payloads embedded in inline scripts, in document order.
fn script_payloads(html: &str) -> Vec<Value> {
    let mut payloads = Vec::new();

    for block in script_blocks(html) {
        if block.script_type.as_deref() == Some("application/json") {
            match serde_json::from_str::<Value>(block.body) {
                Ok(value) => payloads.push(value),
                Err(e) => tracing::debug!(error = %e, "failed to decode JSON script block"),
            }
            continue;
        }

        let Some(assignment) = block.body.find(NUXT_ASSIGNMENT) else {
            continue;
        };
        let Some(open) = block.body[assignment..]
            .find('{')
            .map(|rel| assignment + rel)
        else {
            continue;
        };
        match decode_assignment(block.body, open) {
            Ok(value) => payloads.push(value),
            Err(error) => tracing::debug!(error = %error, "failed to decode window.__NUXT__ payload"),
        }
    }

    payloads
}

/// Decodes the object literal opening at `open`. Braces inside string values
/// do not end the object.
fn decode_assignment(body: &str, open: usize) -> Result<Value, String> {
    let literal = balanced_object_outside_strings(body, open).map_err(|e| e.to_string())?;
    serde_json::from_str::<Value>(literal).map_err(|e| e.to_string())
}

/// Walks `root` depth-first and returns every object that looks like a
/// restaurant, in document order.
///
/// Traversal uses an explicit stack, so pathological nesting cannot overflow
/// the call stack. Nodes already visited are skipped by address.
fn candidate_objects(root: &Value) -> Vec<&Value> {
    let mut found = Vec::new();
    let mut visited: HashSet<usize> = HashSet::new();
    let mut stack: Vec<(&Value, usize)> = vec![(root, 0)];

    while let Some((node, depth)) = stack.pop() {
        if depth > MAX_DEPTH {
            continue;
        }
        let children: Vec<&Value> = match node {
            Value::Object(map) => {
                if !visited.insert(std::ptr::from_ref(node) as usize) {
                    continue;
                }
                if looks_like_restaurant(node) {
                    found.push(node);
                }
                map.values().collect()
            }
            Value::Array(items) => items.iter().collect(),
            _ => continue,
        };
        // Reversed so the first child is popped first.
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }

    found
}

fn looks_like_restaurant(entry: &Value) -> bool {
    first_text(entry, NAME_KEYS).is_some()
        && URL_KEYS.iter().any(|key| entry.get(key).is_some())
        && LOCATION_KEYS.iter().any(|key| entry.get(key).is_some())
}

fn candidate_to_restaurant(entry: &Value, base: &Url) -> Option<Restaurant> {
    let name = first_text(entry, NAME_KEYS)?;
    let href = URL_KEYS
        .iter()
        .filter_map(|key| entry.get(key))
        .find_map(link_text)?;
    let url = resolve_url(base, &href)?;
    let mut restaurant = Restaurant::new(&name, &url)?;

    restaurant.description = first_text(entry, &["excerpt", "description", "intro"])
        .and_then(|d| collapse_whitespace(&d));

    let tags: Vec<String> = TAG_KEYS
        .iter()
        .filter_map(|key| entry.get(key))
        .flat_map(tag_values)
        .collect();
    restaurant.tags = merge_tags(tags);

    restaurant.rating = ["rating", "score", "averageRating"]
        .iter()
        .filter_map(|key| entry.get(key))
        .find_map(number);
    restaurant.review_count = ["reviews", "review_count", "ratingCount"]
        .iter()
        .filter_map(|key| entry.get(key))
        .find_map(count);

    let location = location_object(entry);
    let field = |keys: &[&str]| location.and_then(|l| first_text(l, keys));
    restaurant.city = field(&["city", "plaats"]).or_else(|| first_text(entry, &["city", "plaats"]));
    restaurant.address = field(&["address", "street", "streetAddress"])
        .or_else(|| entry.get("address").and_then(text));
    restaurant.postal_code = field(&["postal_code", "postalCode", "zip", "zipcode"]);
    let coordinate = |keys: &[&str]| {
        location
            .and_then(|l| first_present(l, keys))
            .and_then(number)
    };
    restaurant.latitude = coordinate(&["lat", "latitude"]);
    restaurant.longitude = coordinate(&["lng", "longitude"]);

    Some(restaurant)
}

/// A link given as a string, an `{href}`/`{url}` object, or a list whose
/// first string wins.
fn link_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(_) => first_text(value, &["href", "url"]),
        Value::Array(items) => items.iter().find_map(|item| match item {
            Value::String(_) => text(item),
            _ => None,
        }),
        other => text(other),
    }
}

/// Tags given as a string, a list, or an object whose values are the tags.
fn tag_values(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => map.values().flat_map(string_list).collect(),
        other => string_list(other),
    }
}

/// The `location` (or `address`) object, or the first object of a list.
fn location_object(entry: &Value) -> Option<&Value> {
    let location = first_present(entry, &["location", "address"])?;
    match location {
        Value::Object(_) => Some(location),
        Value::Array(items) => items.first().filter(|first| first.is_object()),
        _ => None,
    }
}
