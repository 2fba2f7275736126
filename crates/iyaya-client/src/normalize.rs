//! Response-envelope normalization.
//!
//! The backend wraps payloads inconsistently: `{data:{data:{bookings:[..]}}}`,
//! `{data:{bookings:[..]}}`, `{bookings:[..]}`, or a bare array. Each
//! resource type has one normalization function with an explicit priority
//! list of source paths, so callers never branch on envelope shape.

use iyaya_core::{
    Application, Booking, BookingPage, Caregiver, CaregiverPage, Child, Conversation, Job, JobPage,
    Message, Notification, PrivacyRequest, Rating, Result, ServiceError,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Resolves a dot-separated path inside a JSON value. An empty path yields
/// the value itself.
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |node, key| node.get(key))
}

/// Returns the first path that resolves to an array, together with its
/// parent container (for sibling fields like `total`).
fn first_array<'a>(value: &'a Value, paths: &[&str]) -> Option<(&'a Value, &'a Value)> {
    for path in paths {
        if let Some(node) = lookup(value, path)
            && node.is_array()
        {
            let parent = match path.rsplit_once('.') {
                Some((head, _)) => lookup(value, head).unwrap_or(value),
                None => value,
            };
            return Some((parent, node));
        }
    }
    // A bare top-level array has no envelope at all.
    if value.is_array() {
        return Some((value, value));
    }
    None
}

fn deserialize_items<T: DeserializeOwned>(items: &Value) -> Result<Vec<T>> {
    serde_json::from_value(items.clone()).map_err(ServiceError::from)
}

fn u64_field(container: &Value, name: &str) -> Option<u64> {
    container.get(name).and_then(Value::as_u64)
}

/// Unwraps a single-entity envelope (`data.data` → `data` → root) and
/// deserializes it.
///
/// # Errors
///
/// Returns an unknown-kind error when the payload does not match `T`.
pub fn entity<T: DeserializeOwned>(value: &Value) -> Result<T> {
    for path in ["data.data", "data"] {
        if let Some(node) = lookup(value, path)
            && node.is_object()
            && let Ok(parsed) = serde_json::from_value::<T>(node.clone())
        {
            return Ok(parsed);
        }
    }
    serde_json::from_value(value.clone()).map_err(ServiceError::from)
}

/// Normalizes any booking-list envelope to the canonical [`BookingPage`].
///
/// # Errors
///
/// Returns an error when the located array does not contain bookings.
pub fn bookings(value: &Value) -> Result<BookingPage> {
    const PATHS: &[&str] = &["data.data.bookings", "data.bookings", "bookings"];
    let Some((container, items)) = first_array(value, PATHS) else {
        return Ok(BookingPage::empty());
    };
    let bookings: Vec<Booking> = deserialize_items(items)?;
    let total = u64_field(container, "total").unwrap_or(bookings.len() as u64);
    Ok(BookingPage {
        total,
        page: u64_field(container, "page").unwrap_or(1),
        limit: u64_field(container, "limit").unwrap_or(10),
        bookings,
    })
}

/// Normalizes any job-list envelope to a [`JobPage`].
///
/// # Errors
///
/// Returns an error when the located array does not contain jobs.
pub fn jobs(value: &Value) -> Result<JobPage> {
    const PATHS: &[&str] = &["data.data.jobs", "data.jobs", "jobs"];
    let Some((container, items)) = first_array(value, PATHS) else {
        return Ok(JobPage::default());
    };
    let jobs: Vec<Job> = deserialize_items(items)?;
    let total = u64_field(container, "total").unwrap_or(jobs.len() as u64);
    Ok(JobPage { jobs, total })
}

/// Normalizes any caregiver-search envelope to a [`CaregiverPage`].
///
/// # Errors
///
/// Returns an error when the located array does not contain caregivers.
pub fn caregivers(value: &Value) -> Result<CaregiverPage> {
    const PATHS: &[&str] = &[
        "data.data.caregivers",
        "data.caregivers",
        "caregivers",
        "data.providers",
        "providers",
    ];
    let Some((container, items)) = first_array(value, PATHS) else {
        return Ok(CaregiverPage::default());
    };
    let caregivers: Vec<Caregiver> = deserialize_items(items)?;
    let total = u64_field(container, "total").unwrap_or(caregivers.len() as u64);
    Ok(CaregiverPage { caregivers, total })
}

/// Normalizes an application-list envelope.
///
/// # Errors
///
/// Returns an error when the located array does not contain applications.
pub fn applications(value: &Value) -> Result<Vec<Application>> {
    const PATHS: &[&str] = &["data.data.applications", "data.applications", "applications"];
    match first_array(value, PATHS) {
        Some((_, items)) => deserialize_items(items),
        None => Ok(Vec::new()),
    }
}

/// Normalizes a conversation-list envelope.
///
/// # Errors
///
/// Returns an error when the located array does not contain conversations.
pub fn conversations(value: &Value) -> Result<Vec<Conversation>> {
    const PATHS: &[&str] = &[
        "data.data.conversations",
        "data.conversations",
        "conversations",
    ];
    match first_array(value, PATHS) {
        Some((_, items)) => deserialize_items(items),
        None => Ok(Vec::new()),
    }
}

/// Normalizes a message-list envelope.
///
/// # Errors
///
/// Returns an error when the located array does not contain messages.
pub fn messages(value: &Value) -> Result<Vec<Message>> {
    const PATHS: &[&str] = &["data.data.messages", "data.messages", "messages"];
    match first_array(value, PATHS) {
        Some((_, items)) => deserialize_items(items),
        None => Ok(Vec::new()),
    }
}

/// Normalizes a rating-list envelope.
///
/// # Errors
///
/// Returns an error when the located array does not contain ratings.
pub fn ratings(value: &Value) -> Result<Vec<Rating>> {
    const PATHS: &[&str] = &["data.data.ratings", "data.ratings", "ratings", "reviews"];
    match first_array(value, PATHS) {
        Some((_, items)) => deserialize_items(items),
        None => Ok(Vec::new()),
    }
}

/// Normalizes a child-profile-list envelope.
///
/// # Errors
///
/// Returns an error when the located array does not contain child profiles.
pub fn children(value: &Value) -> Result<Vec<Child>> {
    const PATHS: &[&str] = &["data.data.children", "data.children", "children"];
    match first_array(value, PATHS) {
        Some((_, items)) => deserialize_items(items),
        None => Ok(Vec::new()),
    }
}

/// Normalizes a notification-list envelope.
///
/// # Errors
///
/// Returns an error when the located array does not contain notifications.
pub fn notifications(value: &Value) -> Result<Vec<Notification>> {
    const PATHS: &[&str] = &[
        "data.data.notifications",
        "data.notifications",
        "notifications",
    ];
    match first_array(value, PATHS) {
        Some((_, items)) => deserialize_items(items),
        None => Ok(Vec::new()),
    }
}

/// Normalizes a privacy-request-list envelope.
///
/// # Errors
///
/// Returns an error when the located array does not contain privacy requests.
pub fn privacy_requests(value: &Value) -> Result<Vec<PrivacyRequest>> {
    const PATHS: &[&str] = &["data.data.requests", "data.requests", "requests"];
    match first_array(value, PATHS) {
        Some((_, items)) => deserialize_items(items),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn booking_array() -> Value {
        json!([
            {"id": "b1", "status": "confirmed"},
            {"id": "b2", "status": "pending"}
        ])
    }

    #[test]
    fn bookings_normalize_identically_across_envelopes() {
        let variants = [
            json!({"data": {"data": {"bookings": booking_array(), "total": 2}}}),
            json!({"data": {"bookings": booking_array(), "total": 2}}),
            json!({"bookings": booking_array(), "total": 2}),
        ];
        let pages: Vec<BookingPage> = variants.iter().map(|v| bookings(v).unwrap()).collect();
        for page in &pages {
            assert_eq!(page.total, 2);
            assert_eq!(page.bookings.len(), 2);
            assert_eq!(page.bookings[0].id, "b1");
            assert_eq!(page.bookings[1].id, "b2");
        }
    }

    #[test]
    fn bookings_from_bare_array() {
        let page = bookings(&booking_array()).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 10);
    }

    #[test]
    fn bookings_missing_entirely_yields_empty_page() {
        let page = bookings(&json!({"message": "ok"})).unwrap();
        assert!(page.bookings.is_empty());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn pagination_fields_come_from_the_matching_level() {
        let value = json!({"data": {"bookings": booking_array(), "total": 40, "page": 3, "limit": 20}});
        let page = bookings(&value).unwrap();
        assert_eq!(page.total, 40);
        assert_eq!(page.page, 3);
        assert_eq!(page.limit, 20);
    }

    #[test]
    fn jobs_prefer_inner_envelope() {
        let value = json!({"data": {"jobs": [{"id": "j1", "title": "Evening sitter"}]}});
        let page = jobs(&value).unwrap();
        assert_eq!(page.jobs.len(), 1);
        assert_eq!(page.jobs[0].title, "Evening sitter");
    }

    #[test]
    fn caregivers_accept_providers_alias() {
        let value = json!({"providers": [{"id": "c1", "name": "Maria"}]});
        let page = caregivers(&value).unwrap();
        assert_eq!(page.caregivers.len(), 1);
        assert_eq!(page.caregivers[0].name, "Maria");
    }

    #[test]
    fn conversations_from_flat_and_wrapped() {
        let flat = json!({"conversations": [{"id": "c1"}]});
        let wrapped = json!({"data": {"conversations": [{"id": "c1"}]}});
        assert_eq!(
            conversations(&flat).unwrap()[0].id,
            conversations(&wrapped).unwrap()[0].id
        );
    }

    #[test]
    fn entity_unwraps_nested_data() {
        let value = json!({"data": {"data": {"id": "j9", "title": "Weekend nanny"}}});
        let job: Job = entity(&value).unwrap();
        assert_eq!(job.id, "j9");
    }

    #[test]
    fn entity_accepts_flat_object() {
        let value = json!({"id": "j9", "title": "Weekend nanny"});
        let job: Job = entity(&value).unwrap();
        assert_eq!(job.title, "Weekend nanny");
    }

    #[test]
    fn entity_type_mismatch_is_an_error() {
        let value = json!({"data": "not an object"});
        assert!(entity::<Job>(&value).is_err());
    }

    #[test]
    fn lookup_resolves_dotted_paths() {
        let value = json!({"a": {"b": {"c": 1}}});
        assert_eq!(lookup(&value, "a.b.c"), Some(&json!(1)));
        assert_eq!(lookup(&value, ""), Some(&value));
        assert!(lookup(&value, "a.x").is_none());
    }
}
