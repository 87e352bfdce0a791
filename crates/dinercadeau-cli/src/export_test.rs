use super::*;

use chrono::{TimeZone, Utc};

fn sample() -> Restaurant {
    let mut r = Restaurant::new("Cafe X", "https://www.diner-cadeau.nl/r/cafe-x").unwrap();
    r.city = Some("Utrecht".to_string());
    r.address = Some("Oudegracht 1".to_string());
    r.tags = vec!["Top10".to_string(), "Vegan".to_string()];
    r.rating = Some(8.0);
    r.review_count = Some(12);
    r.latitude = Some(52.09);
    r.longitude = Some(5.12);
    r.distance_km_from_utrecht = Some(0.123_456);
    r.scraped_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    r
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("csv should be readable")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn writes_header_and_formatted_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let rows = write_csv(&[sample()], &path, false).expect("write should succeed");
    assert_eq!(rows, 1);

    let lines = read_lines(&path);
    assert_eq!(lines[0], CSV_HEADER.join(","));
    assert_eq!(
        lines[1],
        "Cafe X,https://www.diner-cadeau.nl/r/cafe-x,Utrecht,Oudegracht 1,,Netherlands,,\
         Top10;Vegan,,8.00,12,52.090000,5.120000,0.123,diner-cadeau,2024-03-01T12:30:00Z"
    );
}

#[test]
fn creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/deeper/out.csv");

    write_csv(&[], &path, false).expect("write should succeed");

    assert_eq!(read_lines(&path), vec![CSV_HEADER.join(",")]);
}

#[test]
fn append_to_existing_file_skips_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    write_csv(&[sample()], &path, false).unwrap();
    write_csv(&[sample()], &path, true).unwrap();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines.iter().filter(|l| l.starts_with("name,")).count(),
        1,
        "header must appear once"
    );
}

#[test]
fn append_to_missing_file_writes_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.csv");

    write_csv(&[sample()], &path, true).unwrap();

    let lines = read_lines(&path);
    assert_eq!(lines[0], CSV_HEADER.join(","));
    assert_eq!(lines.len(), 2);
}

#[test]
fn overwrite_replaces_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    write_csv(&[sample(), sample()], &path, false).unwrap();
    write_csv(&[sample()], &path, false).unwrap();

    assert_eq!(read_lines(&path).len(), 2);
}

#[test]
fn fields_with_commas_are_quoted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let mut r = sample();
    r.description = Some("Lunch, diner".to_string());

    write_csv(&[r], &path, false).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"Lunch, diner\""), "got: {content}");
}
