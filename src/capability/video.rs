//! YouTube search and playback through `yt-dlp`
//!
//! Searching needs no API key; results are opened on the device with
//! `termux-open-url`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::{
    ActionDescriptor, ActionTable, Capability, CapabilityDescriptor, CommandRunner, Parameters,
    param_bool, param_i64, param_str,
};

const DEFAULT_LIMIT: i64 = 5;
const MAX_LIMIT: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VideoAction {
    OpenUrl,
    PlayFirst,
    Search,
}

// "play_video" is matched before the generic "play" keyword
static ACTIONS: ActionTable<VideoAction> = ActionTable::new(&[
    (&["play_video", "open_video"], VideoAction::OpenUrl),
    (&["pon", "reproduce", "play", "abre"], VideoAction::PlayFirst),
    (&["buscar", "search", "busca", "encuentra"], VideoAction::Search),
]);

/// One line of `yt-dlp --dump-json` output
#[derive(Debug, Deserialize)]
struct VideoEntry {
    title: Option<String>,
    url: Option<String>,
    duration_string: Option<String>,
}

/// Video search capability
pub struct VideoCapability {
    descriptor: CapabilityDescriptor,
    runner: Arc<dyn CommandRunner>,
}

impl VideoCapability {
    /// Create the capability
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        if !runner.available("yt-dlp") {
            tracing::warn!("yt-dlp not found on PATH, video search will fail");
        }

        Self {
            descriptor: descriptor(),
            runner,
        }
    }

    async fn search(&self, params: &Parameters, auto_play: bool) -> String {
        let Some(query) = param_str(params, "query") else {
            return "❌ Especifica qué buscar".to_string();
        };
        let limit = param_i64(params, "limit")
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT);

        tracing::info!(query = %query, limit, auto_play, "searching videos");

        let args = vec![
            format!("ytsearch{limit}:{query}"),
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--flat-playlist".to_string(),
        ];

        let output = match self.runner.run("yt-dlp", &args, None).await {
            Ok(out) if out.success => out.stdout,
            Ok(out) => return format!("❌ Error buscando: {}", out.stderr.trim()),
            Err(e) => return format!("❌ Error buscando: {e}"),
        };

        let videos: Vec<(String, String)> = output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str::<VideoEntry>(line).ok())
            .filter_map(|v| {
                let url = v.url?;
                let title = v.title.unwrap_or_else(|| url.clone());
                let duration = v.duration_string.unwrap_or_else(|| "??:??".to_string());
                Some((format!("{title} ({duration})"), url))
            })
            .collect();

        let Some((first_label, first_url)) = videos.first() else {
            return format!("❌ No encontré videos para '{query}'");
        };

        if auto_play {
            self.open(first_url).await;
            return format!("▶️ Reproduciendo: {first_label}");
        }

        let listing: Vec<String> = videos
            .iter()
            .map(|(label, url)| format!("- {label}\n  URL: {url}"))
            .collect();
        format!("📺 Videos encontrados:\n{}", listing.join("\n"))
    }

    async fn play(&self, params: &Parameters) -> String {
        let Some(url) = param_str(params, "url") else {
            return "❌ Especifica la URL del video".to_string();
        };
        self.open(&url).await;
        "▶️ Abriendo video...".to_string()
    }

    async fn open(&self, url: &str) {
        if let Err(e) = self
            .runner
            .run("termux-open-url", &[url.to_string()], None)
            .await
        {
            tracing::warn!(url, error = %e, "failed to open video url");
        }
    }
}

fn descriptor() -> CapabilityDescriptor {
    CapabilityDescriptor::new("video", "Búsqueda avanzada de videos en YouTube")
        .action(
            ActionDescriptor::new("search_video", "Busca videos en YouTube con detalles")
                .param("query", "string")
                .param("limit", "int (default 5)")
                .param("auto_play", "bool"),
        )
        .action(ActionDescriptor::new("play_video", "Abre un video específico").param("url", "string"))
}

#[async_trait]
impl Capability for VideoCapability {
    fn describe(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, action: &str, parameters: &Parameters) -> String {
        let auto_play = param_bool(parameters, "auto_play").unwrap_or(false);
        let resolved = ACTIONS.resolve(action);

        tracing::debug!(action, ?resolved, auto_play, "video action");

        match resolved {
            Some(VideoAction::OpenUrl) => {
                if param_str(parameters, "url").is_some() {
                    self.play(parameters).await
                } else {
                    // Classifier picked play_video for a search phrase
                    self.search(parameters, true).await
                }
            }
            Some(VideoAction::PlayFirst) => self.search(parameters, true).await,
            Some(VideoAction::Search) => self.search(parameters, auto_play).await,
            None => format!("❌ Acción '{action}' desconocida para YouTube"),
        }
    }
}
