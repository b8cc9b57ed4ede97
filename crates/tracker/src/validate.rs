use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use watchlog_core::types::{
    AddItemRequest, ItemPatch, MediaType, NaturalKey, SuppliedMetadata, WatchStatus,
};

use crate::ListError;

pub const NOTE_MAX_LEN: usize = 1000;
pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 10;

/// A validated add request.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub key: NaturalKey,
    pub status: Option<WatchStatus>,
    pub metadata: SuppliedMetadata,
}

/// A validated patch. Same shape as [`ItemPatch`] with domain types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidPatch {
    pub status: Option<WatchStatus>,
    pub rating: Option<Option<u8>>,
    pub self_note: Option<Option<String>>,
    pub watched_seasons: Option<Vec<u32>>,
    pub date_completed: Option<Option<DateTime<Utc>>>,
}

fn finish<T>(
    fields: serde_json::Map<String, Value>,
    ok: impl FnOnce() -> T,
) -> Result<T, ListError> {
    if fields.is_empty() {
        Ok(ok())
    } else {
        Err(ListError::Validation(Value::Object(fields)))
    }
}

fn parse_status(
    raw: &Option<String>,
    fields: &mut serde_json::Map<String, Value>,
) -> Option<WatchStatus> {
    let raw = raw.as_deref()?;
    let status = WatchStatus::parse(raw);
    if status.is_none() {
        fields.insert(
            "status".to_string(),
            json!(["must be one of planToWatch, watching, completed"]),
        );
    }
    status
}

pub fn validate_add(req: &AddItemRequest) -> Result<NewItem, ListError> {
    let mut fields = serde_json::Map::new();

    let api_id = match req.api_id {
        Some(id) if id > 0 => Some(id),
        Some(_) => {
            fields.insert("apiId".to_string(), json!(["must be a positive integer"]));
            None
        }
        None => {
            fields.insert("apiId".to_string(), json!(["is required"]));
            None
        }
    };

    let media_type = match req.media_type.as_deref() {
        Some(raw) => {
            let parsed = MediaType::parse(raw);
            if parsed.is_none() {
                fields.insert(
                    "mediaType".to_string(),
                    json!(["must be one of movie, tv, anime"]),
                );
            }
            parsed
        }
        None => {
            fields.insert("mediaType".to_string(), json!(["is required"]));
            None
        }
    };

    let status = parse_status(&req.status, &mut fields);

    let mut metadata = req.metadata.clone();
    metadata.title = metadata
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    match (api_id, media_type) {
        (Some(api_id), Some(media_type)) if fields.is_empty() => Ok(NewItem {
            key: NaturalKey::new(api_id, media_type),
            status,
            metadata,
        }),
        _ => Err(ListError::Validation(Value::Object(fields))),
    }
}

pub fn validate_patch(patch: &ItemPatch) -> Result<ValidPatch, ListError> {
    let mut fields = serde_json::Map::new();

    let status = parse_status(&patch.status, &mut fields);

    let rating = match patch.rating {
        Some(Some(r)) if (MIN_RATING..=MAX_RATING).contains(&r) => Some(Some(r as u8)),
        Some(Some(_)) => {
            fields.insert(
                "rating".to_string(),
                json!([format!("must be between {MIN_RATING} and {MAX_RATING}")]),
            );
            None
        }
        Some(None) => Some(None),
        None => None,
    };

    let self_note = match &patch.self_note {
        Some(Some(note)) => {
            let note = note.trim();
            if note.chars().count() > NOTE_MAX_LEN {
                fields.insert(
                    "selfNote".to_string(),
                    json!([format!("must not exceed {NOTE_MAX_LEN} characters")]),
                );
                None
            } else {
                Some(Some(note.to_string()))
            }
        }
        Some(None) => Some(None),
        None => None,
    };

    let watched_seasons = match &patch.watched_seasons {
        Some(seasons) if seasons.iter().any(|s| *s < 1 || *s > u32::MAX as i64) => {
            fields.insert(
                "watchedSeasons".to_string(),
                json!(["season numbers must be positive integers"]),
            );
            None
        }
        Some(seasons) => {
            let mut seasons: Vec<u32> = seasons.iter().map(|s| *s as u32).collect();
            seasons.sort_unstable();
            seasons.dedup();
            Some(seasons)
        }
        None => None,
    };

    finish(fields, || ValidPatch {
        status,
        rating,
        self_note,
        watched_seasons,
        date_completed: patch.date_completed,
    })
}

/// Validate a season toggle. Returns `(season, total_seasons)`.
pub fn validate_season(season: i64, total: Option<i64>) -> Result<(u32, Option<u32>), ListError> {
    let mut fields = serde_json::Map::new();

    if season < 1 || season > u32::MAX as i64 {
        fields.insert(
            "seasonNumber".to_string(),
            json!(["must be a positive integer"]),
        );
    }
    if let Some(t) = total {
        if t < 1 || t > u32::MAX as i64 {
            fields.insert(
                "totalSeasons".to_string(),
                json!(["must be a positive integer"]),
            );
        }
    }

    finish(fields, || (season as u32, total.map(|t| t as u32)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_req(api_id: Option<i64>, media_type: Option<&str>) -> AddItemRequest {
        AddItemRequest {
            api_id,
            media_type: media_type.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn add_requires_api_id_and_media_type() {
        let err = validate_add(&add_req(None, None)).unwrap_err();
        let ListError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert!(fields.get("apiId").is_some());
        assert!(fields.get("mediaType").is_some());
    }

    #[test]
    fn add_rejects_unknown_media_type_and_status() {
        let mut req = add_req(Some(1), Some("book"));
        req.status = Some("dropped".into());
        let ListError::Validation(fields) = validate_add(&req).unwrap_err() else {
            panic!("expected validation error");
        };
        assert!(fields.get("mediaType").is_some());
        assert!(fields.get("status").is_some());
    }

    #[test]
    fn add_accepts_minimal_request() {
        let item = validate_add(&add_req(Some(1396), Some("tv"))).unwrap();
        assert_eq!(item.key, NaturalKey::new(1396, MediaType::Tv));
        assert_eq!(item.status, None);
    }

    #[test]
    fn rating_out_of_range_is_rejected() {
        for bad in [0, 11, -3] {
            let patch = ItemPatch {
                rating: Some(Some(bad)),
                ..Default::default()
            };
            assert!(matches!(
                validate_patch(&patch),
                Err(ListError::Validation(_))
            ));
        }
        let patch = ItemPatch {
            rating: Some(None),
            ..Default::default()
        };
        assert_eq!(validate_patch(&patch).unwrap().rating, Some(None));
    }

    #[test]
    fn note_length_is_bounded() {
        let patch = ItemPatch {
            self_note: Some(Some("x".repeat(NOTE_MAX_LEN + 1))),
            ..Default::default()
        };
        assert!(validate_patch(&patch).is_err());

        let patch = ItemPatch {
            self_note: Some(Some(format!("  {}  ", "x".repeat(NOTE_MAX_LEN)))),
            ..Default::default()
        };
        let valid = validate_patch(&patch).unwrap();
        assert_eq!(valid.self_note.unwrap().unwrap().len(), NOTE_MAX_LEN);
    }

    #[test]
    fn watched_seasons_are_sorted_and_deduplicated() {
        let patch = ItemPatch {
            watched_seasons: Some(vec![3, 1, 3, 2]),
            ..Default::default()
        };
        assert_eq!(
            validate_patch(&patch).unwrap().watched_seasons,
            Some(vec![1, 2, 3])
        );

        let patch = ItemPatch {
            watched_seasons: Some(vec![1, 0]),
            ..Default::default()
        };
        assert!(validate_patch(&patch).is_err());
    }

    #[test]
    fn season_numbers_must_be_positive() {
        assert_eq!(validate_season(2, Some(5)).unwrap(), (2, Some(5)));
        assert!(validate_season(0, None).is_err());
        assert!(validate_season(1, Some(0)).is_err());
    }
}
