//! Music playback control
//!
//! The capability speaks to a [`MusicService`]; [`SpotifyClient`] implements it
//! against the Spotify Web API using a long-lived OAuth refresh token.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{
    ActionDescriptor, ActionTable, Capability, CapabilityDescriptor, Parameters, param_i64,
    param_str,
};
use crate::{Error, Result};

const API_BASE: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Refresh the access token this long before it expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Time the player needs to switch tracks before `current` reflects it
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// What a search should return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Track,
    Artist,
    Album,
}

impl SearchKind {
    /// Parse a user-supplied type, defaulting to tracks
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_lowercase).as_deref() {
            Some("artist" | "artista") => Self::Artist,
            Some("album" | "álbum") => Self::Album,
            _ => Self::Track,
        }
    }

    /// Web API type name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Artist => "artist",
            Self::Album => "album",
        }
    }
}

/// A search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    pub name: String,
    pub uri: String,
    /// First credited artist, for tracks
    pub artist: Option<String>,
}

/// Currently playing item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub track: String,
    pub artist: String,
    pub is_playing: bool,
}

/// A user playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub name: String,
    pub uri: String,
    pub track_count: u32,
}

/// What to start playing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackTarget {
    /// Resume whatever was playing
    Resume,
    /// Play specific track URIs
    Tracks(Vec<String>),
    /// Play a playlist/album context URI
    Context(String),
}

/// Remote music player
#[async_trait]
pub trait MusicService: Send + Sync {
    /// Search the catalog
    async fn search(&self, query: &str, kind: SearchKind, limit: u32) -> Result<Vec<SearchItem>>;

    /// Start or resume playback
    async fn play(&self, target: PlaybackTarget) -> Result<()>;

    /// Pause playback
    async fn pause(&self) -> Result<()>;

    /// Skip to the next track
    async fn next(&self) -> Result<()>;

    /// Go back to the previous track
    async fn previous(&self) -> Result<()>;

    /// Currently playing item, if any
    async fn now_playing(&self) -> Result<Option<NowPlaying>>;

    /// Set volume percent (0-100)
    async fn set_volume(&self, level: u8) -> Result<()>;

    /// The user's playlists
    async fn playlists(&self, limit: u32) -> Result<Vec<Playlist>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MusicAction {
    PlayPlaylist,
    Playlists,
    Pause,
    Next,
    Previous,
    Search,
    Current,
    Volume,
    Play,
}

// Longer names first: every playlist action name contains "play"
static ACTIONS: ActionTable<MusicAction> = ActionTable::new(&[
    (&["play_playlist", "reproducir_playlist"], MusicAction::PlayPlaylist),
    (&["playlist", "listas"], MusicAction::Playlists),
    (&["pause", "pausa", "stop", "detener"], MusicAction::Pause),
    (&["next", "siguiente", "skip"], MusicAction::Next),
    (&["prev", "anterior"], MusicAction::Previous),
    (&["search", "busca"], MusicAction::Search),
    (&["current", "actual", "sonando", "now_playing"], MusicAction::Current),
    (&["volume", "volumen"], MusicAction::Volume),
    (&["play", "reproduc", "resume", "pon"], MusicAction::Play),
]);

/// Music control capability
pub struct MusicCapability {
    descriptor: CapabilityDescriptor,
    service: Option<Arc<dyn MusicService>>,
    settle_delay: Duration,
}

impl MusicCapability {
    /// Create the capability; `None` means credentials are missing
    #[must_use]
    pub fn new(service: Option<Arc<dyn MusicService>>) -> Self {
        Self {
            descriptor: descriptor(),
            service,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Override the pause between skipping and reading the current track
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    async fn dispatch(
        &self,
        service: &dyn MusicService,
        action: MusicAction,
        params: &Parameters,
    ) -> Result<String> {
        match action {
            MusicAction::Play => match param_str(params, "query") {
                Some(query) => {
                    let hits = service.search(&query, SearchKind::Track, 1).await?;
                    let Some(track) = hits.into_iter().next() else {
                        return Ok(format!("❌ No encontré '{query}'"));
                    };
                    service
                        .play(PlaybackTarget::Tracks(vec![track.uri.clone()]))
                        .await?;
                    Ok(format!(
                        "🎵 Reproduciendo: {} - {}",
                        track.name,
                        track.artist.unwrap_or_default()
                    ))
                }
                None => {
                    service.play(PlaybackTarget::Resume).await?;
                    Ok("▶️ Reproducción reanudada".to_string())
                }
            },
            MusicAction::Pause => {
                service.pause().await?;
                Ok("⏸️ Pausado".to_string())
            }
            MusicAction::Next => {
                service.next().await?;
                tokio::time::sleep(self.settle_delay).await;
                current(service).await
            }
            MusicAction::Previous => {
                service.previous().await?;
                tokio::time::sleep(self.settle_delay).await;
                current(service).await
            }
            MusicAction::Search => {
                let Some(query) = param_str(params, "query") else {
                    return Ok("❌ Especifica qué buscar".to_string());
                };
                let kind = SearchKind::parse(param_str(params, "type").as_deref());
                let hits = service.search(&query, kind, 5).await?;
                if hits.is_empty() {
                    return Ok(format!("❌ No encontré resultados para '{query}'"));
                }

                let mut out = format!("🔍 Resultados para '{query}':\n");
                for (i, item) in hits.iter().enumerate() {
                    match &item.artist {
                        Some(artist) => {
                            let _ = writeln!(out, "{}. {} - {artist}", i + 1, item.name);
                        }
                        None => {
                            let _ = writeln!(out, "{}. {}", i + 1, item.name);
                        }
                    }
                }
                Ok(out)
            }
            MusicAction::Current => current(service).await,
            MusicAction::Volume => {
                let level = param_i64(params, "level").unwrap_or(50).clamp(0, 100);
                let level = u8::try_from(level).unwrap_or(50);
                service.set_volume(level).await?;
                Ok(format!("🔊 Volumen: {level}%"))
            }
            MusicAction::Playlists => {
                let lists = service.playlists(10).await?;
                if lists.is_empty() {
                    return Ok("📝 No tienes playlists".to_string());
                }

                let mut out = "📝 Tus playlists:\n".to_string();
                for (i, pl) in lists.iter().enumerate() {
                    let _ = writeln!(out, "{}. {} ({} canciones)", i + 1, pl.name, pl.track_count);
                }
                Ok(out)
            }
            MusicAction::PlayPlaylist => {
                let Some(name) = param_str(params, "name") else {
                    return Ok("❌ Especifica el nombre de la playlist".to_string());
                };
                let needle = name.to_lowercase();
                let lists = service.playlists(50).await?;
                match lists
                    .into_iter()
                    .find(|pl| pl.name.to_lowercase().contains(&needle))
                {
                    Some(pl) => {
                        service.play(PlaybackTarget::Context(pl.uri)).await?;
                        Ok(format!("🎵 Reproduciendo playlist: {}", pl.name))
                    }
                    None => Ok(format!("❌ No encontré playlist '{name}'")),
                }
            }
        }
    }
}

async fn current(service: &dyn MusicService) -> Result<String> {
    Ok(match service.now_playing().await? {
        Some(now) => {
            let status = if now.is_playing { "▶️" } else { "⏸️" };
            format!("{status} {} - {}", now.track, now.artist)
        }
        None => "🔇 No hay nada reproduciéndose".to_string(),
    })
}

fn descriptor() -> CapabilityDescriptor {
    CapabilityDescriptor::new("music", "Control de Spotify: reproducir, pausar, buscar, playlists")
        .action(
            ActionDescriptor::new("play", "Reproduce música (actual o busca una canción)")
                .param("query", "string (opcional)"),
        )
        .action(ActionDescriptor::new("pause", "Pausa la reproducción actual"))
        .action(ActionDescriptor::new("next", "Salta a la siguiente canción"))
        .action(ActionDescriptor::new("previous", "Vuelve a la canción anterior"))
        .action(
            ActionDescriptor::new("search", "Busca canciones, artistas o álbumes")
                .param("query", "string")
                .param("type", "track|artist|album"),
        )
        .action(ActionDescriptor::new("current", "Muestra la canción actual"))
        .action(ActionDescriptor::new("volume", "Ajusta el volumen (0-100)").param("level", "int"))
        .action(ActionDescriptor::new("playlists", "Lista tus playlists"))
        .action(
            ActionDescriptor::new("play_playlist", "Reproduce una playlist por nombre")
                .param("name", "string"),
        )
}

#[async_trait]
impl Capability for MusicCapability {
    fn describe(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, action: &str, parameters: &Parameters) -> String {
        let Some(service) = self.service.as_deref() else {
            return "❌ Spotify no está autenticado. Configura tus credenciales.".to_string();
        };

        let Some(resolved) = ACTIONS.resolve(action) else {
            return format!("❌ Acción '{action}' no reconocida");
        };

        tracing::debug!(action, ?resolved, "music action");

        match self.dispatch(service, resolved, parameters).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(action, error = %e, "music service call failed");
                format!("❌ Error en Spotify: {e}")
            }
        }
    }
}

/// OAuth access token with its expiry
struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct SearchResponse {
    tracks: Option<Page<TrackObject>>,
    artists: Option<Page<NamedObject>>,
    albums: Option<Page<NamedObject>>,
}

#[derive(Deserialize)]
struct Page<T> {
    items: Vec<T>,
}

#[derive(Deserialize)]
struct NamedObject {
    name: String,
    uri: String,
}

#[derive(Deserialize)]
struct TrackObject {
    name: String,
    uri: String,
    #[serde(default)]
    artists: Vec<NamedObject>,
}

#[derive(Deserialize)]
struct PlaybackState {
    #[serde(default)]
    is_playing: bool,
    item: Option<TrackObject>,
}

#[derive(Deserialize)]
struct PlaylistObject {
    name: String,
    uri: String,
    tracks: PlaylistTracks,
}

#[derive(Deserialize)]
struct PlaylistTracks {
    total: u32,
}

/// Spotify Web API client
///
/// Holds the authenticated session; one instance per process.
pub struct SpotifyClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    refresh_token: SecretString,
    token: Mutex<Option<AccessToken>>,
}

impl SpotifyClient {
    /// Create a client from developer credentials and a refresh token
    ///
    /// # Errors
    ///
    /// Returns error if any credential is empty
    pub fn new(
        client_id: String,
        client_secret: SecretString,
        refresh_token: SecretString,
    ) -> Result<Self> {
        if client_id.is_empty()
            || client_secret.expose_secret().is_empty()
            || refresh_token.expose_secret().is_empty()
        {
            return Err(Error::Config(
                "Spotify requires client_id, client_secret and refresh_token".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            client_id,
            client_secret,
            refresh_token,
            token: Mutex::new(None),
        })
    }

    /// Return a valid access token, refreshing it when close to expiry
    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;

        if let Some(token) = guard.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                return Ok(token.value.clone());
            }
        }

        tracing::debug!("refreshing Spotify access token");

        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.refresh_token.expose_secret()),
            ])
            .send()
            .await?;

        let response = check_status(response).await?;
        let token: TokenResponse = response.json().await?;

        let value = token.access_token.clone();
        *guard = Some(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(value)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let token = self.access_token().await?;
        let response = self
            .client
            .get(format!("{API_BASE}{path}"))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        check_status(response).await
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<()> {
        let token = self.access_token().await?;
        let mut request = self
            .client
            .request(method, format!("{API_BASE}{path}"))
            .bearer_auth(token);

        request = match body {
            Some(body) => request.json(&body),
            None => request.header(reqwest::header::CONTENT_LENGTH, "0"),
        };

        check_status(request.send().await?).await?;
        Ok(())
    }
}

/// Map non-success statuses to `Error::Transport`
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!(status = %status, body = %body, "Spotify API error");
    Err(Error::Transport {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl MusicService for SpotifyClient {
    async fn search(&self, query: &str, kind: SearchKind, limit: u32) -> Result<Vec<SearchItem>> {
        let response = self
            .get(
                "/search",
                &[
                    ("q", query.to_string()),
                    ("type", kind.as_str().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        let result: SearchResponse = response.json().await?;

        let items = match kind {
            SearchKind::Track => result
                .tracks
                .map(|p| p.items)
                .unwrap_or_default()
                .into_iter()
                .map(|t| SearchItem {
                    artist: t.artists.into_iter().next().map(|a| a.name),
                    name: t.name,
                    uri: t.uri,
                })
                .collect(),
            SearchKind::Artist | SearchKind::Album => {
                let page = if kind == SearchKind::Artist {
                    result.artists
                } else {
                    result.albums
                };
                page.map(|p| p.items)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|o| SearchItem {
                        name: o.name,
                        uri: o.uri,
                        artist: None,
                    })
                    .collect()
            }
        };

        Ok(items)
    }

    async fn play(&self, target: PlaybackTarget) -> Result<()> {
        let body = match target {
            PlaybackTarget::Resume => None,
            PlaybackTarget::Tracks(uris) => Some(serde_json::json!({ "uris": uris })),
            PlaybackTarget::Context(uri) => Some(serde_json::json!({ "context_uri": uri })),
        };
        self.send(reqwest::Method::PUT, "/me/player/play", body).await
    }

    async fn pause(&self) -> Result<()> {
        self.send(reqwest::Method::PUT, "/me/player/pause", None).await
    }

    async fn next(&self) -> Result<()> {
        self.send(reqwest::Method::POST, "/me/player/next", None).await
    }

    async fn previous(&self) -> Result<()> {
        self.send(reqwest::Method::POST, "/me/player/previous", None)
            .await
    }

    async fn now_playing(&self) -> Result<Option<NowPlaying>> {
        let response = self.get("/me/player", &[]).await?;
        // 204 means no active device
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let state: PlaybackState = response.json().await?;
        Ok(state.item.map(|item| NowPlaying {
            artist: item
                .artists
                .into_iter()
                .next()
                .map(|a| a.name)
                .unwrap_or_default(),
            track: item.name,
            is_playing: state.is_playing,
        }))
    }

    async fn set_volume(&self, level: u8) -> Result<()> {
        self.send(
            reqwest::Method::PUT,
            &format!("/me/player/volume?volume_percent={level}"),
            None,
        )
        .await
    }

    async fn playlists(&self, limit: u32) -> Result<Vec<Playlist>> {
        let response = self
            .get("/me/playlists", &[("limit", limit.to_string())])
            .await?;
        let page: Page<PlaylistObject> = response.json().await?;

        Ok(page
            .items
            .into_iter()
            .map(|p| Playlist {
                name: p.name,
                uri: p.uri,
                track_count: p.tracks.total,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use serde_json::json;

    use super::*;

    /// In-memory player
    #[derive(Default)]
    struct FakePlayer {
        now: StdMutex<Option<NowPlaying>>,
        played: StdMutex<Vec<PlaybackTarget>>,
        volume: StdMutex<Option<u8>>,
        fail: bool,
    }

    impl FakePlayer {
        fn playing(track: &str, artist: &str) -> Self {
            Self {
                now: StdMutex::new(Some(NowPlaying {
                    track: track.to_string(),
                    artist: artist.to_string(),
                    is_playing: true,
                })),
                ..Self::default()
            }
        }

        fn check(&self) -> Result<()> {
            if self.fail {
                Err(Error::Transport {
                    status: 404,
                    body: "no active device".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl MusicService for FakePlayer {
        async fn search(&self, query: &str, kind: SearchKind, _limit: u32) -> Result<Vec<SearchItem>> {
            self.check()?;
            if query == "nada" {
                return Ok(Vec::new());
            }
            Ok(vec![SearchItem {
                name: query.to_string(),
                uri: format!("spotify:{}:1", kind.as_str()),
                artist: (kind == SearchKind::Track).then(|| "Artista".to_string()),
            }])
        }

        async fn play(&self, target: PlaybackTarget) -> Result<()> {
            self.check()?;
            self.played.lock().unwrap().push(target);
            Ok(())
        }

        async fn pause(&self) -> Result<()> {
            self.check()?;
            if let Some(now) = self.now.lock().unwrap().as_mut() {
                now.is_playing = false;
            }
            Ok(())
        }

        async fn next(&self) -> Result<()> {
            self.check()?;
            *self.now.lock().unwrap() = Some(NowPlaying {
                track: "Siguiente".to_string(),
                artist: "Otro".to_string(),
                is_playing: true,
            });
            Ok(())
        }

        async fn previous(&self) -> Result<()> {
            self.check()
        }

        async fn now_playing(&self) -> Result<Option<NowPlaying>> {
            self.check()?;
            Ok(self.now.lock().unwrap().clone())
        }

        async fn set_volume(&self, level: u8) -> Result<()> {
            self.check()?;
            *self.volume.lock().unwrap() = Some(level);
            Ok(())
        }

        async fn playlists(&self, _limit: u32) -> Result<Vec<Playlist>> {
            self.check()?;
            Ok(vec![
                Playlist {
                    name: "Gym Hits".to_string(),
                    uri: "spotify:playlist:gym".to_string(),
                    track_count: 30,
                },
                Playlist {
                    name: "Chill".to_string(),
                    uri: "spotify:playlist:chill".to_string(),
                    track_count: 12,
                },
            ])
        }
    }

    fn capability(player: &Arc<FakePlayer>) -> MusicCapability {
        let service: Arc<dyn MusicService> = player.clone();
        MusicCapability::new(Some(service)).with_settle_delay(Duration::ZERO)
    }

    fn params(value: serde_json::Value) -> Parameters {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn unauthenticated_service_explains_itself() {
        let music = MusicCapability::new(None);
        assert_eq!(
            music.invoke("play", &Parameters::new()).await,
            "❌ Spotify no está autenticado. Configura tus credenciales."
        );
    }

    #[tokio::test]
    async fn current_is_idempotent() {
        let player = Arc::new(FakePlayer::playing("Clocks", "Coldplay"));
        let music = capability(&player);

        let first = music.invoke("current", &Parameters::new()).await;
        let second = music.invoke("current", &Parameters::new()).await;
        assert_eq!(first, "▶️ Clocks - Coldplay");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn play_with_query_searches_then_plays_track() {
        let player = Arc::new(FakePlayer::default());
        let reply = capability(&player)
            .invoke("play", &params(json!({"query": "Despacito"})))
            .await;

        assert_eq!(reply, "🎵 Reproduciendo: Despacito - Artista");
        assert_eq!(
            *player.played.lock().unwrap(),
            vec![PlaybackTarget::Tracks(vec!["spotify:track:1".to_string()])]
        );
    }

    #[tokio::test]
    async fn play_without_query_resumes() {
        let player = Arc::new(FakePlayer::default());
        let reply = capability(&player).invoke("reproducir", &Parameters::new()).await;

        assert_eq!(reply, "▶️ Reproducción reanudada");
        assert_eq!(*player.played.lock().unwrap(), vec![PlaybackTarget::Resume]);
    }

    #[tokio::test]
    async fn playlist_actions_win_over_plain_play() {
        let player = Arc::new(FakePlayer::default());
        let music = capability(&player);

        let listed = music.invoke("playlists", &Parameters::new()).await;
        assert_eq!(
            listed,
            "📝 Tus playlists:\n1. Gym Hits (30 canciones)\n2. Chill (12 canciones)\n"
        );

        let played = music
            .invoke("play_playlist", &params(json!({"name": "gym"})))
            .await;
        assert_eq!(played, "🎵 Reproduciendo playlist: Gym Hits");
        assert_eq!(
            *player.played.lock().unwrap(),
            vec![PlaybackTarget::Context("spotify:playlist:gym".to_string())]
        );
    }

    #[tokio::test]
    async fn near_miss_playlist_names_list_instead_of_playing() {
        let player = Arc::new(FakePlayer::default());
        let music = capability(&player);

        for action in ["list_playlist", "playlist", "show_playlist"] {
            let reply = music.invoke(action, &Parameters::new()).await;
            assert!(reply.starts_with("📝 Tus playlists:"), "{action}: {reply}");
        }
        assert!(player.played.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn next_reports_new_track() {
        let player = Arc::new(FakePlayer::playing("Uno", "A"));
        let reply = capability(&player).invoke("siguiente", &Parameters::new()).await;
        assert_eq!(reply, "▶️ Siguiente - Otro");
    }

    #[tokio::test]
    async fn volume_is_clamped() {
        let player = Arc::new(FakePlayer::default());
        let reply = capability(&player)
            .invoke("volume", &params(json!({"level": 180})))
            .await;

        assert_eq!(reply, "🔊 Volumen: 100%");
        assert_eq!(*player.volume.lock().unwrap(), Some(100));
    }

    #[tokio::test]
    async fn search_lists_results_or_explains_empty() {
        let player = Arc::new(FakePlayer::default());
        let music = capability(&player);

        assert_eq!(
            music
                .invoke("search", &params(json!({"query": "Queen", "type": "artist"})))
                .await,
            "🔍 Resultados para 'Queen':\n1. Queen\n"
        );
        assert_eq!(
            music.invoke("search", &params(json!({"query": "nada"}))).await,
            "❌ No encontré resultados para 'nada'"
        );
        assert_eq!(
            music.invoke("search", &Parameters::new()).await,
            "❌ Especifica qué buscar"
        );
    }

    #[tokio::test]
    async fn service_errors_become_replies() {
        let player = Arc::new(FakePlayer {
            fail: true,
            ..FakePlayer::default()
        });
        let reply = capability(&player).invoke("pause", &Parameters::new()).await;
        assert_eq!(
            reply,
            "❌ Error en Spotify: upstream error 404: no active device"
        );
    }

    #[tokio::test]
    async fn unknown_action_is_not_recognized() {
        let player = Arc::new(FakePlayer::default());
        let reply = capability(&player).invoke("shuffle", &Parameters::new()).await;
        assert_eq!(reply, "❌ Acción 'shuffle' no reconocida");
    }

    #[test]
    fn search_kind_defaults_to_track() {
        assert_eq!(SearchKind::parse(None), SearchKind::Track);
        assert_eq!(SearchKind::parse(Some("Artist")), SearchKind::Artist);
        assert_eq!(SearchKind::parse(Some("álbum")), SearchKind::Album);
        assert_eq!(SearchKind::parse(Some("podcast")), SearchKind::Track);
    }

    #[test]
    fn spotify_client_requires_credentials() {
        let result = SpotifyClient::new(
            String::new(),
            SecretString::from("secret".to_string()),
            SecretString::from("refresh".to_string()),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
