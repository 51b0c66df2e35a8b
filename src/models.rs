#![allow(dead_code)]

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

/// The `{data, errors}` envelope every GraphQL response arrives in.
///
/// Both halves are optional and may appear together, so callers look at
/// `errors` before trusting `data`.
#[derive(Debug, Deserialize, Clone)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GraphQlError {
    pub message: String,
    pub status: Option<i32>,
}

/// Reads a `null` list the same as a missing one.
pub fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl<T> GraphQlResponse<T> {
    pub fn first_error(&self) -> Option<&GraphQlError> {
        self.errors.as_ref().and_then(|errors| errors.first())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaData {
    #[serde(rename = "Media")]
    pub media: Option<Media>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PageData {
    #[serde(rename = "Page")]
    pub page: Option<Page>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Page {
    #[serde(rename = "pageInfo")]
    pub page_info: Option<PageInfo>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub media: Vec<Media>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PageInfo {
    pub total: Option<i32>,
    #[serde(rename = "currentPage")]
    pub current_page: Option<i32>,
    #[serde(rename = "lastPage")]
    pub last_page: Option<i32>,
    #[serde(rename = "hasNextPage")]
    pub has_next_page: Option<bool>,
    #[serde(rename = "perPage")]
    pub per_page: Option<i32>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Media {
    pub id: Option<i32>,
    pub title: Option<MediaTitle>,
    pub description: Option<String>,
    pub episodes: Option<i32>,
    pub duration: Option<i32>,
    pub status: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<FuzzyDate>,
    #[serde(rename = "endDate")]
    pub end_date: Option<FuzzyDate>,
    pub season: Option<String>,
    #[serde(rename = "seasonYear")]
    pub season_year: Option<i32>,
    pub format: Option<String>,
    pub genres: Option<Vec<String>>,
    pub tags: Option<Vec<MediaTag>>,
    #[serde(rename = "averageScore")]
    pub average_score: Option<i32>,
    pub popularity: Option<i32>,
    pub studios: Option<StudioConnection>,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<CoverImage>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MediaTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CoverImage {
    #[serde(rename = "extraLarge")]
    pub extra_large: Option<String>,
    pub large: Option<String>,
    pub medium: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StudioConnection {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub nodes: Vec<Studio>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Studio {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaTag {
    pub name: Option<String>,
    pub rank: Option<i32>,
}

/// Season filter accepted by the `Page.media(season:)` argument.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaSeason {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl MediaSeason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Winter => "WINTER",
            Self::Spring => "SPRING",
            Self::Summer => "SUMMER",
            Self::Fall => "FALL",
        }
    }
}

impl std::fmt::Display for MediaSeason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Media {
    /// Romaji, then English, then native.
    pub fn headline_title(&self) -> Option<&str> {
        let title = self.title.as_ref()?;
        title
            .romaji
            .as_deref()
            .or(title.english.as_deref())
            .or(title.native.as_deref())
    }

    pub fn studio_names(&self) -> Vec<&str> {
        self.studios
            .as_ref()
            .map(|s| s.nodes.iter().filter_map(|n| n.name.as_deref()).collect())
            .unwrap_or_default()
    }
}

impl FuzzyDate {
    /// `None` unless at least the year is known; missing month or day print as `??`.
    pub fn display(&self) -> Option<String> {
        let year = self.year?;
        let part = |v: Option<i32>| v.map(|n| n.to_string()).unwrap_or_else(|| "??".into());
        Some(format!("{}-{}-{}", year, part(self.month), part(self.day)))
    }
}
