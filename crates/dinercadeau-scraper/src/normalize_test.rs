use serde_json::json;

use super::*;

fn base() -> Url {
    Url::parse("https://www.diner-cadeau.nl").unwrap()
}

// -----------------------------------------------------------------------
// normalize_record
// -----------------------------------------------------------------------

#[test]
fn normalize_record_minimal_listing() {
    let record = json!({
        "title": "Cafe X",
        "linkHref": "/r/cafe-x",
        "metaData": {"a": "Vegan"},
        "label": "Top10"
    });
    let restaurant = normalize_record(&record, &base()).unwrap();

    assert_eq!(restaurant.name, "Cafe X");
    assert!(restaurant.url.starts_with("https://"));
    assert!(restaurant.url.ends_with("/r/cafe-x"));
    assert_eq!(restaurant.tags, vec!["Top10", "Vegan"]);
    assert_eq!(restaurant.description, None);
    assert_eq!(restaurant.rating, None);
    assert_eq!(restaurant.latitude, None);
    assert_eq!(restaurant.longitude, None);
    assert_eq!(restaurant.country, "Netherlands");
}

#[test]
fn normalize_record_drops_missing_title_or_link() {
    assert!(normalize_record(&json!({"linkHref": "/r/a"}), &base()).is_none());
    assert!(normalize_record(&json!({"title": "A"}), &base()).is_none());
    assert!(normalize_record(&json!({"title": "  ", "linkHref": "/r/a"}), &base()).is_none());
    assert!(normalize_record(&json!("not an object"), &base()).is_none());
}

#[test]
fn normalize_record_full_listing() {
    let record = json!({
        "title": "De Klok",
        "linkHref": "https://www.diner-cadeau.nl/r/de-klok",
        "city": "Utrecht",
        "street": "Oudegracht 12",
        "postalCode": "3511 AB",
        "country": "Nederland",
        "lat": "52.0912",
        "lng": 5.1201,
        "rating": "8,4",
        "reviewCount": "132",
        "label": "Nieuw",
        "region": "Utrecht",
        "metaData": {"keuken": "Frans", "extra": ["Terras", "frans"], "stars": 2},
        "websiteLink": {"label": "Website", "href": "https://deklok.nl"},
        "description": [
            {"type": "paragraph", "children": [{"text": "Klassieke "}, {"text": "keuken."}]},
            {"type": "paragraph", "children": [{"text": "Aan de  gracht."}]}
        ]
    });
    let restaurant = normalize_record(&record, &base()).unwrap();

    assert_eq!(restaurant.url, "https://www.diner-cadeau.nl/r/de-klok");
    assert_eq!(restaurant.city.as_deref(), Some("Utrecht"));
    assert_eq!(restaurant.address.as_deref(), Some("Oudegracht 12"));
    assert_eq!(restaurant.postal_code.as_deref(), Some("3511 AB"));
    assert_eq!(restaurant.country, "Netherlands");
    assert_eq!(restaurant.latitude, Some(52.0912));
    assert_eq!(restaurant.longitude, Some(5.1201));
    assert_eq!(restaurant.rating, Some(8.4));
    assert_eq!(restaurant.review_count, Some(132));
    assert_eq!(
        restaurant.tags,
        vec!["Nieuw", "Utrecht", "Frans", "Terras", "2", "Website"]
    );
    assert_eq!(
        restaurant.description.as_deref(),
        Some("Klassieke keuken. Aan de gracht.")
    );
}

#[test]
fn normalize_record_uses_aliases() {
    let record = json!({
        "name": "Bistro Y",
        "url": "r/bistro-y",
        "plaats": "Zeist",
        "latitude": 52.08,
        "longitude": "5.23",
        "description": "  Gezellig\n bistro  "
    });
    let restaurant = normalize_record(&record, &base()).unwrap();

    assert_eq!(restaurant.url, "https://www.diner-cadeau.nl/r/bistro-y");
    assert_eq!(restaurant.city.as_deref(), Some("Zeist"));
    assert_eq!(restaurant.latitude, Some(52.08));
    assert_eq!(restaurant.longitude, Some(5.23));
    assert_eq!(restaurant.description.as_deref(), Some("Gezellig bistro"));
}

#[test]
fn normalize_record_empty_rich_text_is_absent() {
    let record = json!({
        "title": "A",
        "linkHref": "/r/a",
        "description": [{"type": "paragraph", "children": [{"text": "  "}]}]
    });
    let restaurant = normalize_record(&record, &base()).unwrap();
    assert_eq!(restaurant.description, None);
}

#[test]
fn normalize_record_keeps_foreign_country() {
    let record = json!({"title": "A", "linkHref": "/r/a", "country": " Belgium "});
    let restaurant = normalize_record(&record, &base()).unwrap();
    assert_eq!(restaurant.country, "Belgium");
}

// -----------------------------------------------------------------------
// RawRecord
// -----------------------------------------------------------------------

#[test]
fn raw_record_first_usable_alias_wins() {
    let record = json!({"title": "", "name": "Fallback", "link": null, "url": "/r/f"});
    let raw = RawRecord::from_value(&record);
    assert_eq!(raw.title.as_deref(), Some("Fallback"));
    assert_eq!(raw.link.as_deref(), Some("/r/f"));
}

#[test]
fn raw_record_website_string() {
    let raw = RawRecord::from_value(&json!({"website": "Eigen site"}));
    assert_eq!(raw.website.as_deref(), Some("Eigen site"));
}

#[test]
fn raw_record_metadata_list() {
    let raw = RawRecord::from_value(&json!({"metadata": ["Vegan", " ", "Halal"]}));
    assert_eq!(raw.metadata, vec!["Vegan", "Halal"]);
}

// -----------------------------------------------------------------------
// normalize_records
// -----------------------------------------------------------------------

#[test]
fn normalize_records_keeps_order_and_skips_invalid() {
    let records = [
        json!({"title": "A", "linkHref": "/r/a"}),
        json!({"title": "B"}),
        json!({"title": "C", "linkHref": "/r/c"}),
    ];
    let window: Vec<&Value> = records.iter().collect();
    let names: Vec<String> = normalize_records(&window, &base())
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["A", "C"]);
}
