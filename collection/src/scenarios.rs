use thiserror::Error;

use crate::{
    art_object::{ArtObject, ArtObjectDetailResponse, CollectionList},
    checks::{Checks, HardFailure},
    client::{build_agent, raw_get, ApiResponse, CollectionClient, CollectionQuery},
    config::ApiConfig,
    error::Error,
    runner::Scenario,
    schema::{self, ValidationError},
};

pub const LANGUAGES: [&'static str; 2] = ["en", "nl"];

pub const ARTISTS: [&'static str; 3] = ["Rembrandt", "Vermeer", "Van Gogh"];

pub const PAGE_SIZES: [u32; 3] = [1, 5, 50];

pub const NONSENSE_QUERY: &'static str = "asdqwezxc!@#";

pub const PLACE: &'static str = "Amsterdam";

/// Note the plural "collections"; the real endpoint is "collection".
pub const MISTYPED_ENDPOINT: &'static str = "/collections/BK-NM-1010";

pub const INVALID_KEY: &'static str = "INVALID_KEY";

const PAGINATION_PAGE_SIZE: u32 = 5;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error(transparent)]
    Check(#[from] HardFailure),

    #[error(transparent)]
    Api(#[from] Error),
}

impl From<ValidationError> for ScenarioError {
    fn from(err: ValidationError) -> Self {
        ScenarioError::Api(err.into())
    }
}

pub type ScenarioResult = Result<(), ScenarioError>;

/// Every scenario, in the order they're reported.
pub fn catalog() -> Vec<Scenario> {
    let mut scenarios = vec![];
    for lang in LANGUAGES {
        scenarios.push(Scenario::new(
            format!("language-variance/{lang}"),
            move |config, checks| language_variance(config, checks, lang),
        ));
    }
    for lang in LANGUAGES {
        scenarios.push(Scenario::new(
            format!("round-trip/{lang}"),
            move |config, checks| round_trip(config, checks, lang),
        ));
    }
    scenarios.push(Scenario::new("not-found", not_found));
    for artist in ARTISTS {
        scenarios.push(Scenario::new(
            format!("artist-search/{artist}"),
            move |config, checks| artist_search(config, checks, artist),
        ));
    }
    scenarios.push(Scenario::new("nonsense-search", nonsense_search));
    for page_size in PAGE_SIZES {
        scenarios.push(Scenario::new(
            format!("page-size/{page_size}"),
            move |config, checks| page_size_limit(config, checks, page_size),
        ));
    }
    scenarios.push(Scenario::new("image-only", image_only));
    scenarios.push(Scenario::new(format!("place/{PLACE}"), |config, checks| {
        place_filter(config, checks, PLACE)
    }));
    scenarios.push(Scenario::new("pagination", pagination));
    scenarios.push(Scenario::new("auth/missing-key", missing_key));
    scenarios.push(Scenario::new("auth/invalid-key", invalid_key));
    scenarios
}

fn fetch_list(
    client: &CollectionClient,
    checks: &mut Checks,
    query: &CollectionQuery,
    label: &str,
) -> Result<CollectionList, ScenarioError> {
    let result = client.list_response(query);
    checks.hard_status(format!("{label} returns 200"), &result, 200)?;
    Ok(schema::collection_list().validate_as(result?.body)?)
}

fn label_for(index: usize, art_object: &ArtObject) -> String {
    match &art_object.object_number {
        Some(object_number) => object_number.clone(),
        None => format!("artObjects[{index}]"),
    }
}

pub fn language_variance(config: &ApiConfig, checks: &mut Checks, lang: &str) -> ScenarioResult {
    let client = CollectionClient::new(config, lang)?;
    let list = fetch_list(
        &client,
        checks,
        &CollectionQuery::new(),
        &format!("collection list [lang={lang}]"),
    )?;
    checks.hard("collection list is not empty", !list.art_objects.is_empty())?;

    let object_number = list.first_object_number().unwrap_or_default().to_owned();
    checks.hard("first entry has an objectNumber", !object_number.is_empty())?;

    let result = client.detail_response(&object_number);
    checks.hard_status(format!("detail for {object_number} returns 200"), &result, 200)?;
    let detail: ArtObjectDetailResponse = schema::art_object_detail().validate_as(result?.body)?;
    checks.soft("detail has an id", !detail.art_object.id.is_empty());
    checks.soft("detail has a title", !detail.art_object.title.is_empty());
    Ok(())
}

/// The detail view of a listed object describes the same object.
pub fn round_trip(config: &ApiConfig, checks: &mut Checks, lang: &str) -> ScenarioResult {
    let client = CollectionClient::new(config, lang)?;
    let list = fetch_list(
        &client,
        checks,
        &CollectionQuery::new(),
        &format!("collection list [lang={lang}]"),
    )?;
    let Some(listed) = list.art_objects.first() else {
        checks.hard("collection list is not empty", false)?;
        return Ok(());
    };
    let object_number = listed.object_number.clone().unwrap_or_default();
    checks.hard("first entry has an objectNumber", !object_number.is_empty())?;

    let detail = client.detail(&object_number)?;
    checks.soft_eq("objectNumber matches", detail.object_number.as_str(), object_number.as_str());
    if let Some(title) = &listed.title {
        checks.soft_eq("title matches", detail.title.as_str(), title.as_str());
    }
    if let Some(id) = &listed.id {
        checks.soft_eq("id matches", detail.id.as_str(), id.as_str());
    }
    Ok(())
}

pub fn not_found(config: &ApiConfig, checks: &mut Checks) -> ScenarioResult {
    let client = CollectionClient::new(config, "en")?;
    let result = client.get(MISTYPED_ENDPOINT, &[]);
    checks.hard_status(format!("{MISTYPED_ENDPOINT} returns 404"), &result, 404)?;
    Ok(())
}

pub fn artist_search(config: &ApiConfig, checks: &mut Checks, artist: &str) -> ScenarioResult {
    let client = CollectionClient::new(config, "en")?;
    let result = client.list_response(&CollectionQuery::new().search(artist));
    checks.soft_status(format!("search for {artist} returns 200"), &result, 200);
    let list: CollectionList = schema::collection_list().validate_as(result?.body)?;
    checks.soft(
        format!("search for {artist} has results"),
        !list.art_objects.is_empty(),
    );
    checks.soft(
        format!("some result mentions {artist}"),
        list.art_objects.iter().any(|art_object| art_object.mentions(artist)),
    );
    Ok(())
}

/// No matches is a successful, empty answer rather than an error.
pub fn nonsense_search(config: &ApiConfig, checks: &mut Checks) -> ScenarioResult {
    let client = CollectionClient::new(config, "en")?;
    let list = fetch_list(
        &client,
        checks,
        &CollectionQuery::new().search(NONSENSE_QUERY),
        &format!("search for {NONSENSE_QUERY:?}"),
    )?;
    checks.hard_eq("result count", list.art_objects.len(), 0)?;
    Ok(())
}

pub fn page_size_limit(config: &ApiConfig, checks: &mut Checks, page_size: u32) -> ScenarioResult {
    let client = CollectionClient::new(config, "en")?;
    let list = fetch_list(
        &client,
        checks,
        &CollectionQuery::new().page_size(page_size),
        &format!("collection list [ps={page_size}]"),
    )?;
    if let Some(count) = list.count {
        checks.hard_with(
            format!("upstream total >= {page_size}"),
            count >= page_size as u64,
            format!("upstream reported count {count}"),
        )?;
    }
    checks.hard_eq("result count", list.art_objects.len(), page_size as usize)?;
    Ok(())
}

pub fn image_only(config: &ApiConfig, checks: &mut Checks) -> ScenarioResult {
    let client = CollectionClient::new(config, "en")?;
    let list = fetch_list(
        &client,
        checks,
        &CollectionQuery::new().images_only(true),
        "collection list [imgonly=true]",
    )?;
    checks.hard("collection list is not empty", !list.art_objects.is_empty())?;
    for (i, art_object) in list.art_objects.iter().enumerate() {
        let label = label_for(i, art_object);
        checks.soft(
            format!("{label} has a webImage"),
            art_object.web_image.is_some(),
        );
        if let Some(web_image) = &art_object.web_image {
            checks.soft_with(
                format!("{label} webImage url is http(s)"),
                web_image.has_http_url(),
                format!("url was {:?}", web_image.url),
            );
        }
    }
    Ok(())
}

/// Entries without production places are skipped; the upstream data is
/// incomplete for a lot of objects.
pub fn place_filter(config: &ApiConfig, checks: &mut Checks, place: &str) -> ScenarioResult {
    let client = CollectionClient::new(config, "en")?;
    let list = fetch_list(
        &client,
        checks,
        &CollectionQuery::new().place(place),
        &format!("collection list [place={place}]"),
    )?;
    checks.hard("collection list is not empty", !list.art_objects.is_empty())?;
    for (i, art_object) in list.art_objects.iter().enumerate() {
        let places = art_object.production_places();
        if places.is_empty() {
            continue;
        }
        checks.soft_with(
            format!("{} was produced in {place}", label_for(i, art_object)),
            places.iter().any(|p| p == place),
            format!("productionPlaces were {places:?}"),
        );
    }
    Ok(())
}

pub fn pagination(config: &ApiConfig, checks: &mut Checks) -> ScenarioResult {
    let client = CollectionClient::new(config, "en")?;
    let mut pages = vec![];
    for page in [1, 2] {
        let list = fetch_list(
            &client,
            checks,
            &CollectionQuery::new()
                .page(page)
                .page_size(PAGINATION_PAGE_SIZE),
            &format!("page {page} [ps={PAGINATION_PAGE_SIZE}]"),
        )?;
        pages.push(list);
    }
    for (page, list) in pages.iter().enumerate() {
        checks.hard_eq(
            format!("page {} result count", page + 1),
            list.art_objects.len(),
            PAGINATION_PAGE_SIZE as usize,
        )?;
    }
    let first = pages[0].first_object_number();
    let second = pages[1].first_object_number();
    checks.hard(
        "pages start with different objects",
        first.is_some() && first != second,
    )?;
    Ok(())
}

fn unauthenticated_get(config: &ApiConfig, params: &[(&str, &str)]) -> crate::Result<ApiResponse> {
    let agent = build_agent(config.timeout());
    raw_get(&agent, &format!("{}/en/collection", config.base_url()), params)
}

pub fn missing_key(config: &ApiConfig, checks: &mut Checks) -> ScenarioResult {
    let result = unauthenticated_get(config, &[("q", "rembrandt")]);
    checks.hard_status("request without key returns 401", &result, 401)?;
    Ok(())
}

pub fn invalid_key(config: &ApiConfig, checks: &mut Checks) -> ScenarioResult {
    let result = unauthenticated_get(config, &[("key", INVALID_KEY), ("q", "rembrandt")]);
    checks.hard_status("request with invalid key returns 401", &result, 401)?;
    Ok(())
}
