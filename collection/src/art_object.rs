use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_url: Option<String>,
    pub web: Option<String>,
}

/// Describes one rendition of an object's image (`webImage` or `headerImage`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescriptor {
    pub guid: String,
    pub offset_percentage_x: f64,
    pub offset_percentage_y: f64,
    pub width: u64,
    pub height: u64,
    pub url: String,
}

impl ImageDescriptor {
    pub fn has_http_url(&self) -> bool {
        self.url.contains("http")
    }
}

/// A record as it appears in a collection list. Which fields are actually
/// present depends on the query, so nearly everything is optional here and
/// the schema decides what is required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArtObject {
    pub links: Option<Links>,
    pub id: Option<String>,
    pub object_number: Option<String>,
    pub title: Option<String>,
    pub has_image: Option<bool>,
    pub principal_or_first_maker: Option<String>,
    pub long_title: Option<String>,
    pub show_image: Option<bool>,
    pub permit_download: Option<bool>,
    pub web_image: Option<ImageDescriptor>,
    pub header_image: Option<ImageDescriptor>,
    pub production_places: Option<Vec<String>>,
}

impl ArtObject {
    /// Case-insensitive search over the maker, title and long title.
    pub fn mentions<T: AsRef<str>>(&self, needle: T) -> bool {
        let needle = needle.as_ref().to_lowercase();
        [
            &self.principal_or_first_maker,
            &self.title,
            &self.long_title,
        ]
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(&needle))
    }

    pub fn production_places(&self) -> &[String] {
        self.production_places.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionList {
    pub art_objects: Vec<ArtObject>,
    pub count: Option<u64>,
}

impl CollectionList {
    pub fn first_object_number(&self) -> Option<&str> {
        self.art_objects
            .first()
            .and_then(|art_object| art_object.object_number.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtObjectDetail {
    pub id: String,
    pub object_number: String,
    pub title: String,
    pub principal_or_first_maker: String,
    pub description: Option<String>,
    pub has_image: Option<bool>,
    pub web_image: Option<ImageDescriptor>,
    pub header_image: Option<ImageDescriptor>,
    pub production_places: Option<Vec<String>>,
}

/// The envelope the detail endpoint wraps its record in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtObjectDetailResponse {
    pub art_object: ArtObjectDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub status: i64,
    pub error: String,
    pub message: Option<String>,
}
