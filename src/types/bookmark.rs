use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A bookmark as returned by the linkding `/api/bookmarks/` endpoint.
///
/// Fields the companion does not interpret (`is_archived`, `unread`, ...)
/// are kept in `extra` so a full `PUT` sends them back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub website_title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag_names: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bookmark {
    /// Title shown to the user: `title`, then `website_title`, then the url.
    pub fn display_title(&self) -> &str {
        if !self.title.is_empty() {
            return &self.title;
        }
        match self.website_title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => &self.url,
        }
    }

    /// Returns a copy of this bookmark carrying `tags` instead of its current tag set.
    pub fn with_tags(&self, tags: Vec<String>) -> Self {
        Self {
            tag_names: tags,
            ..self.clone()
        }
    }
}

/// Body of `POST /api/bookmarks/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBookmark {
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_names: Vec<String>,
}

impl NewBookmark {
    /// Builds a creation request; a missing or blank title falls back to the url.
    pub fn new(url: &str, title: Option<&str>) -> Self {
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => url.to_string(),
        };
        Self {
            url: url.to_string(),
            title,
            tag_names: Vec::new(),
        }
    }
}

/// User edits from the edit form. `None` leaves the field untouched.
///
/// `tags` is the raw comma-separated input, e.g. `"work.eng, reading, "`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookmarkEdit {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
}

/// One page of the paginated bookmark listing.
#[derive(Debug, Clone, Deserialize)]
pub struct BookmarkPage {
    #[serde(default)]
    pub count: Option<u64>,
    pub next: Option<String>,
    pub results: Vec<Bookmark>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
