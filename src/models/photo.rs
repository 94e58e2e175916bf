//! Photo data models and API request/response types.
//!
//! This module defines:
//! - `Photo`: database entity, also the JSON shape returned to clients
//! - `NewPhoto` / `PhotoChanges`: what the service hands to the store
//! - `UpdatePhotoRequest`: JSON body of `PUT /api/photos/{id}`
//! - weekday derivation for the optional `day` label

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

/// Represents a photo record from the database.
///
/// # Database Table
///
/// Maps to the `photos` table. `image_url` and `public_id` are written once
/// when the image is uploaded and are never touched by updates.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 7,
///   "title": "Harbour at dusk",
///   "description": "Boats coming in",
///   "date": "15/March/2024",
///   "day": "Friday",
///   "imageUrl": "https://res.cloudinary.com/demo/image/upload/v1/noticing_eye_photos/a1b2.jpg",
///   "publicId": "noticing_eye_photos/a1b2",
///   "createdAt": "2024-03-15T18:02:11Z",
///   "updatedAt": "2024-03-15T18:02:11Z"
/// }
/// ```
#[derive(Debug, Clone, sqlx::FromRow, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i32,
    pub title: String,
    pub description: String,

    /// Free-form display date, "day/Month/year" or ISO.
    pub date: String,

    /// Weekday label, e.g. "Friday".
    pub day: Option<String>,

    pub image_url: String,

    /// Image host identifier, needed to delete the binary later. Rows created
    /// by older upload paths may not have one.
    pub public_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A photo row ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub title: String,
    pub description: String,
    pub date: String,
    pub day: Option<String>,
    pub image_url: String,
    pub public_id: Option<String>,
}

/// The complete set of mutable columns of a photo.
#[derive(Debug, Clone)]
pub struct PhotoChanges {
    pub title: String,
    pub description: String,
    pub date: String,
    pub day: Option<String>,
}

/// Request body for updating a photo.
///
/// Every field is optional; absent fields keep their stored value. Any other
/// field in the payload (`imageUrl`, `publicId`, ...) is ignored.
///
/// `day` distinguishes an absent key (`None`) from an explicit `null`
/// (`Some(None)`), which clears the label.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePhotoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub day: Option<Option<String>>,
    pub date: Option<String>,
}

/// Wrap any value that is present in the payload, `null` included, in `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `{ "message": ..., "photo": {...} }` returned by create and update.
#[derive(Debug, Serialize)]
pub struct PhotoEnvelope {
    pub message: &'static str,
    pub photo: Photo,
}

/// Trim a user-supplied weekday label, treating blank as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Work out the weekday name for a display date.
///
/// Accepts `d/Month/yyyy` (month as full name, three-letter abbreviation or
/// number) and ISO dates (`yyyy-mm-dd`, optionally followed by a time).
/// Returns `None` for anything else.
pub fn derive_weekday(date: &str) -> Option<String> {
    let date = date.trim();

    let parsed = if date.contains('/') {
        parse_day_month_year(date)
    } else {
        date.get(..10)
            .and_then(|ymd| NaiveDate::parse_from_str(ymd, "%Y-%m-%d").ok())
    };

    parsed.map(|d| weekday_name(d.weekday()).to_string())
}

fn parse_day_month_year(date: &str) -> Option<NaiveDate> {
    let mut parts = date.split('/').map(str::trim);
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let day: u32 = day.parse().ok()?;
    let month = month_number(month)?;
    let year: i32 = year.parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(month: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];

    if let Ok(n) = month.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }

    let lower = month.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|name| *name == lower || (lower.len() == 3 && name.starts_with(&lower)))
        .map(|idx| idx as u32 + 1)
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_from_day_month_year() {
        assert_eq!(derive_weekday("15/March/2024").as_deref(), Some("Friday"));
        assert_eq!(derive_weekday("1/january/2000").as_deref(), Some("Saturday"));
        assert_eq!(derive_weekday("25/Dec/2023").as_deref(), Some("Monday"));
        assert_eq!(derive_weekday("25/12/2023").as_deref(), Some("Monday"));
    }

    #[test]
    fn weekday_from_iso_date() {
        assert_eq!(derive_weekday("2024-03-15").as_deref(), Some("Friday"));
        assert_eq!(
            derive_weekday("2024-03-15T09:30:00.000Z").as_deref(),
            Some("Friday")
        );
    }

    #[test]
    fn unparseable_dates_have_no_weekday() {
        assert_eq!(derive_weekday("last summer"), None);
        assert_eq!(derive_weekday("31/February/2024"), None);
        assert_eq!(derive_weekday("15/Marchember/2024"), None);
        assert_eq!(derive_weekday("1/2/3/4"), None);
        assert_eq!(derive_weekday(""), None);
    }

    #[test]
    fn blank_labels_are_absent() {
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(Some(" Monday ".into())).as_deref(), Some("Monday"));
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn update_request_tells_null_day_from_absent_day() {
        let absent: UpdatePhotoRequest = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert_eq!(absent.day, None);

        let null: UpdatePhotoRequest = serde_json::from_str(r#"{"day":null}"#).unwrap();
        assert_eq!(null.day, Some(None));

        let given: UpdatePhotoRequest = serde_json::from_str(r#"{"day":"Monday"}"#).unwrap();
        assert_eq!(given.day, Some(Some("Monday".to_string())));
    }

    #[test]
    fn photo_serializes_in_camel_case() {
        let now = Utc::now();
        let photo = Photo {
            id: 1,
            title: "t".into(),
            description: "d".into(),
            date: "2024-03-15".into(),
            day: None,
            image_url: "https://img/1.jpg".into(),
            public_id: Some("folder/1".into()),
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&photo).unwrap();
        assert_eq!(value["imageUrl"], "https://img/1.jpg");
        assert_eq!(value["publicId"], "folder/1");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("image_url").is_none());
    }
}
