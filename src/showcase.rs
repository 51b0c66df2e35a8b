use crate::api::{AniListClient, decode, variables};
use crate::error::TransportError;
use crate::models::{Media, MediaData, MediaSeason, MediaTitle, PageData, nullable_vec};
use crate::render::{TOP_TAG_COUNT, top_tags};
use clap::ValueEnum;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

const BASIC_INFO_QUERY: &str = r#"
query ($id: Int) {
  Media(id: $id, type: ANIME) {
    id
    title { romaji, english, native }
    episodes
    duration
    status
    season
    seasonYear
    format
    genres
    averageScore
  }
}
"#;

const CHARACTERS_QUERY: &str = r#"
query ($id: Int) {
  Media(id: $id, type: ANIME) {
    title { romaji }
    characters(sort: ROLE, perPage: 5) {
      edges {
        node {
          id
          name { full, native }
          gender
          age
        }
        role
        voiceActors(language: JAPANESE) {
          id
          name { full, native }
        }
      }
    }
  }
}
"#;

const STUDIO_WORKS_QUERY: &str = r#"
query ($id: Int) {
  Studio(id: $id) {
    id
    name
    isAnimationStudio
    media(sort: POPULARITY_DESC, perPage: 5) {
      nodes {
        id
        title { romaji }
        format
        seasonYear
        averageScore
      }
    }
  }
}
"#;

const SEASON_RANKINGS_QUERY: &str = r#"
query ($season: MediaSeason, $seasonYear: Int) {
  Page(page: 1, perPage: 10) {
    media(season: $season, seasonYear: $seasonYear, type: ANIME, sort: SCORE_DESC) {
      id
      title { romaji }
      format
      episodes
      averageScore
      popularity
      studios(isMain: true) { nodes { name } }
    }
  }
}
"#;

const GENRE_TAG_QUERY: &str = r#"
query ($genre: String, $tag: String) {
  Page(page: 1, perPage: 5) {
    media(genre: $genre, tag: $tag, type: ANIME, sort: POPULARITY_DESC) {
      id
      title { romaji }
      format
      seasonYear
      averageScore
      genres
      tags { name, rank }
    }
  }
}
"#;

const DEMON_SLAYER_ID: i32 = 101922;
const ATTACK_ON_TITAN_ID: i32 = 16498;
const UFOTABLE_ID: i32 = 43;

#[derive(Debug, Deserialize, Clone)]
pub struct CharactersData {
    #[serde(rename = "Media")]
    pub media: Option<CharacterMedia>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CharacterMedia {
    pub title: Option<MediaTitle>,
    pub characters: Option<CharacterConnection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CharacterConnection {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub edges: Vec<CharacterEdge>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CharacterEdge {
    pub node: Option<Character>,
    pub role: Option<String>,
    #[serde(rename = "voiceActors", default, deserialize_with = "nullable_vec")]
    pub voice_actors: Vec<Person>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Character {
    pub name: Option<PersonName>,
    pub gender: Option<String>,
    pub age: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Person {
    pub name: Option<PersonName>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PersonName {
    pub full: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StudioData {
    #[serde(rename = "Studio")]
    pub studio: Option<StudioWorks>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StudioWorks {
    pub name: Option<String>,
    #[serde(rename = "isAnimationStudio")]
    pub is_animation_studio: Option<bool>,
    pub media: Option<MediaNodes>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaNodes {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub nodes: Vec<Media>,
}

/// The canned example queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Example {
    Basic,
    Characters,
    Studio,
    Rankings,
    Tags,
}

impl Example {
    pub const ALL: [Example; 5] = [
        Example::Basic,
        Example::Characters,
        Example::Studio,
        Example::Rankings,
        Example::Tags,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            Self::Basic => "EXAMPLE: BASIC ANIME INFORMATION",
            Self::Characters => "EXAMPLE: ANIME CHARACTERS",
            Self::Studio => "EXAMPLE: STUDIO WORKS",
            Self::Rankings => "EXAMPLE: SEASONAL RANKINGS",
            Self::Tags => "EXAMPLE: GENRES AND TAGS",
        }
    }

    pub fn run(&self, client: &AniListClient) -> Result<String, TransportError> {
        match self {
            Self::Basic => basic_info(client, DEMON_SLAYER_ID),
            Self::Characters => characters(client, ATTACK_ON_TITAN_ID),
            Self::Studio => studio_works(client, UFOTABLE_ID),
            Self::Rankings => season_rankings(client, MediaSeason::Winter, 2023),
            Self::Tags => genre_and_tag(client, "Action", "Time Travel"),
        }
    }
}

pub fn basic_info(client: &AniListClient, id: i32) -> Result<String, TransportError> {
    let value = client.execute(BASIC_INFO_QUERY, Some(&variables(json!({ "id": id }))))?;
    render_with(value, |data: &MediaData| match &data.media {
        Some(media) => format_basic_info(media),
        None => "No media found.".to_string(),
    })
}

pub fn characters(client: &AniListClient, id: i32) -> Result<String, TransportError> {
    let value = client.execute(CHARACTERS_QUERY, Some(&variables(json!({ "id": id }))))?;
    render_with(value, |data: &CharactersData| match &data.media {
        Some(media) => format_characters(media),
        None => "No media found.".to_string(),
    })
}

pub fn studio_works(client: &AniListClient, id: i32) -> Result<String, TransportError> {
    let value = client.execute(STUDIO_WORKS_QUERY, Some(&variables(json!({ "id": id }))))?;
    render_with(value, |data: &StudioData| match &data.studio {
        Some(studio) => format_studio_works(studio),
        None => "No studio found.".to_string(),
    })
}

pub fn season_rankings(
    client: &AniListClient,
    season: MediaSeason,
    year: i32,
) -> Result<String, TransportError> {
    let vars = variables(json!({ "season": season, "seasonYear": year }));
    let value = client.execute(SEASON_RANKINGS_QUERY, Some(&vars))?;
    render_with(value, |data: &PageData| {
        let media = data.page.as_ref().map(|p| p.media.as_slice()).unwrap_or_default();
        format_season_rankings(season, year, media)
    })
}

pub fn genre_and_tag(
    client: &AniListClient,
    genre: &str,
    tag: &str,
) -> Result<String, TransportError> {
    let vars = variables(json!({ "genre": genre, "tag": tag }));
    let value = client.execute(GENRE_TAG_QUERY, Some(&vars))?;
    render_with(value, |data: &PageData| {
        let media = data.page.as_ref().map(|p| p.media.as_slice()).unwrap_or_default();
        format_genre_and_tag(genre, tag, media)
    })
}

fn render_with<T, F>(value: Value, format: F) -> Result<String, TransportError>
where
    T: DeserializeOwned,
    F: FnOnce(&T) -> String,
{
    let response = decode::<T>(value)?;
    if let Some(error) = response.first_error() {
        return Ok(format!("Error: {}", error.message));
    }
    Ok(response
        .data
        .as_ref()
        .map(format)
        .unwrap_or_else(|| "No data returned.".to_string()))
}

fn person_name(name: Option<&PersonName>) -> Option<String> {
    let name = name?;
    match (name.full.as_deref(), name.native.as_deref()) {
        (Some(full), Some(native)) => Some(format!("{} ({})", full, native)),
        (Some(full), None) => Some(full.to_string()),
        (None, Some(native)) => Some(native.to_string()),
        (None, None) => None,
    }
}

fn romaji(title: Option<&MediaTitle>) -> &str {
    title
        .and_then(|t| t.romaji.as_deref())
        .unwrap_or("Unknown Title")
}

/// `(TV, 2019)`, `(TV)` or nothing, depending on what is known.
fn format_year_suffix(media: &Media) -> String {
    let parts: Vec<String> = media
        .format
        .iter()
        .cloned()
        .chain(media.season_year.map(|y| y.to_string()))
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

pub fn format_basic_info(media: &Media) -> String {
    let mut lines = vec!["Basic Anime Information:".to_string()];
    if let Some(title) = &media.title {
        let names: Vec<&str> = [title.romaji.as_deref(), title.native.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !names.is_empty() {
            lines.push(format!("Title: {}", names.join(" / ")));
        }
    }
    if let Some(episodes) = media.episodes {
        lines.push(format!("Episodes: {}", episodes));
    }
    if let Some(duration) = media.duration {
        lines.push(format!("Duration: {} minutes per episode", duration));
    }
    if let Some(status) = &media.status {
        lines.push(format!("Status: {}", status));
    }
    if let (Some(season), Some(year)) = (&media.season, media.season_year) {
        lines.push(format!("Season: {} {}", season, year));
    }
    if let Some(format) = &media.format {
        lines.push(format!("Format: {}", format));
    }
    if let Some(genres) = &media.genres
        && !genres.is_empty()
    {
        lines.push(format!("Genres: {}", genres.join(", ")));
    }
    if let Some(score) = media.average_score {
        lines.push(format!("Average Score: {}/100", score));
    }
    lines.join("\n")
}

pub fn format_characters(media: &CharacterMedia) -> String {
    let mut lines = vec![format!("Characters in {}:", romaji(media.title.as_ref()))];
    let edges = media
        .characters
        .as_ref()
        .map(|c| c.edges.as_slice())
        .unwrap_or_default();

    for (i, edge) in edges.iter().enumerate() {
        let character = edge.node.as_ref();
        let name = person_name(character.and_then(|c| c.name.as_ref()))
            .unwrap_or_else(|| "Unknown".to_string());
        lines.push(format!("\n{}. {}", i + 1, name));
        if let Some(role) = &edge.role {
            lines.push(format!("   Role: {}", role));
        }
        if let Some(gender) = character.and_then(|c| c.gender.as_deref()) {
            lines.push(format!("   Gender: {}", gender));
        }
        if let Some(age) = character.and_then(|c| c.age.as_deref()) {
            lines.push(format!("   Age: {}", age));
        }
        if let Some(actor) = edge
            .voice_actors
            .first()
            .and_then(|va| person_name(va.name.as_ref()))
        {
            lines.push(format!("   Voice Actor: {}", actor));
        }
    }
    lines.join("\n")
}

pub fn format_studio_works(studio: &StudioWorks) -> String {
    let mut lines = Vec::new();
    if let Some(name) = &studio.name {
        lines.push(format!("Studio: {}", name));
    }
    if let Some(animation) = studio.is_animation_studio {
        lines.push(format!(
            "Animation Studio: {}",
            if animation { "Yes" } else { "No" }
        ));
    }

    let works = studio
        .media
        .as_ref()
        .map(|m| m.nodes.as_slice())
        .unwrap_or_default();
    if !works.is_empty() {
        lines.push("\nPopular Works:".to_string());
    }
    for (i, media) in works.iter().enumerate() {
        lines.push(format!(
            "{}. {}{}",
            i + 1,
            romaji(media.title.as_ref()),
            format_year_suffix(media)
        ));
        if let Some(score) = media.average_score {
            lines.push(format!("   Score: {}/100", score));
        }
    }
    lines.join("\n")
}

pub fn format_season_rankings(season: MediaSeason, year: i32, media: &[Media]) -> String {
    let mut lines = vec![format!("Top Anime of {} {} (by Score):", season, year)];
    for (i, entry) in media.iter().enumerate() {
        let format = entry
            .format
            .as_deref()
            .map(|f| format!(" ({})", f))
            .unwrap_or_default();
        lines.push(format!("{}. {}{}", i + 1, romaji(entry.title.as_ref()), format));
        if let Some(episodes) = entry.episodes {
            lines.push(format!("   Episodes: {}", episodes));
        }
        if let Some(score) = entry.average_score {
            lines.push(format!("   Score: {}/100", score));
        }
        if let Some(popularity) = entry.popularity {
            lines.push(format!("   Popularity: {}", popularity));
        }
        let studio = entry.studio_names().first().copied().unwrap_or("Unknown");
        lines.push(format!("   Studio: {}", studio));
        lines.push(String::new());
    }
    lines.join("\n")
}

pub fn format_genre_and_tag(genre: &str, tag: &str, media: &[Media]) -> String {
    let mut lines = vec![format!("Popular {} Anime with {}:", genre, tag)];
    for (i, entry) in media.iter().enumerate() {
        lines.push(format!(
            "{}. {}{}",
            i + 1,
            romaji(entry.title.as_ref()),
            format_year_suffix(entry)
        ));
        if let Some(score) = entry.average_score {
            lines.push(format!("   Score: {}/100", score));
        }
        if let Some(genres) = &entry.genres
            && !genres.is_empty()
        {
            lines.push(format!("   Genres: {}", genres.join(", ")));
        }
        let tags = entry
            .tags
            .as_deref()
            .map(|t| top_tags(t, TOP_TAG_COUNT))
            .unwrap_or_default();
        if !tags.is_empty() {
            lines.push(format!("   Top Tags: {}", tags.join(", ")));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}
