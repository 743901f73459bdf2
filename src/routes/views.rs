use chrono::{DateTime, Utc};
use url::Url;

use crate::models::trip::{Trip, TripWithOwner};

/// Trip card as shown on the explore page and the dashboard.
#[derive(Debug, Clone)]
pub struct TripCardView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub location: String,
    pub dates: String,
    pub cost: String,
    pub image_url: String,
    pub is_public: bool,
}

impl From<&TripWithOwner> for TripCardView {
    fn from(item: &TripWithOwner) -> Self {
        let trip = &item.trip;
        Self {
            id: trip.id.clone(),
            title: trip.title.clone(),
            author: item.user.name.clone(),
            location: trip.location.clone(),
            dates: format_range(trip),
            cost: trip.total_cost.map(format_cost).unwrap_or_default(),
            image_url: trip.image_url.clone().unwrap_or_default(),
            is_public: trip.is_public,
        }
    }
}

pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%d.%m.%Y").to_string()
}

pub fn input_date(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

pub fn format_range(trip: &Trip) -> String {
    format!("{} – {}", format_date(trip.start_date), format_date(trip.end_date))
}

/// Russian-style amount: non-breaking space between thousands, comma before
/// kopecks, rouble sign at the end.
pub fn format_cost(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push('\u{a0}');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    match frac {
        0 => format!("{sign}{grouped} ₽"),
        f if f % 10 == 0 => format!("{sign}{grouped},{} ₽", f / 10),
        f => format!("{sign}{grouped},{f:02} ₽"),
    }
}

/// OpenStreetMap link centred on the trip coordinates, when both are set.
pub fn map_link(latitude: Option<f64>, longitude: Option<f64>) -> Option<String> {
    let (lat, lon) = (latitude?, longitude?);
    let mut url = Url::parse_with_params(
        "https://www.openstreetmap.org/",
        &[("mlat", lat.to_string()), ("mlon", lon.to_string())],
    )
    .ok()?;
    url.set_fragment(Some(&format!("map=12/{lat}/{lon}")));
    Some(url.into())
}

pub fn optional_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
