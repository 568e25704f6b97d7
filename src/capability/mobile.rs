//! Android device control
//!
//! Uses Termux:API helpers when running inside Termux, or `adb` from a PC.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use super::{
    ActionDescriptor, ActionTable, Capability, CapabilityDescriptor, CommandRunner, Parameters,
    param_i64, param_str,
};

/// Termux installs its prefix here on every Android device
pub const TERMUX_PREFIX: &str = "/data/data/com.termux";

const LAUNCHER_CATEGORY: &str = "android.intent.category.LAUNCHER";

/// Default vibration length in milliseconds
const DEFAULT_VIBRATION_MS: i64 = 500;

/// How device commands are delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceBackend {
    /// Running on the phone itself, with Termux:API installed
    Termux,
    /// Driving a connected phone over `adb`
    Adb,
    /// Neither Termux nor a working `adb`
    Unavailable,
}

impl DeviceBackend {
    /// Detect the backend for this machine
    pub async fn detect(runner: &dyn CommandRunner) -> Self {
        if Path::new(TERMUX_PREFIX).exists() {
            tracing::info!("mobile capability: termux mode");
            return Self::Termux;
        }

        let adb_ok = runner
            .run("adb", &["devices".to_string()], None)
            .await
            .is_ok_and(|out| out.success);

        if adb_ok {
            tracing::info!("mobile capability: adb mode");
            Self::Adb
        } else {
            tracing::warn!("mobile capability: no termux and no adb available");
            Self::Unavailable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MobileAction {
    OpenApp,
    Notify,
    Vibrate,
    Toast,
    Clipboard,
    Speak,
}

static ACTIONS: ActionTable<MobileAction> = ActionTable::new(&[
    (
        &["abrir", "open", "launch", "iniciar", "ejecutar", "app"],
        MobileAction::OpenApp,
    ),
    (&["notif", "aviso", "alerta"], MobileAction::Notify),
    (&["vibr"], MobileAction::Vibrate),
    (&["toast", "mensaje"], MobileAction::Toast),
    (&["copi", "clipboard", "portapapeles"], MobileAction::Clipboard),
    (&["habla", "deci", "speak", "tts", "voz"], MobileAction::Speak),
]);

/// Launch targets for a known app
#[derive(Debug, Clone, Copy)]
struct AppEntry {
    package: &'static str,
    url: &'static str,
    /// Deep link for searches, `{query}` is replaced with the encoded query
    search_url: Option<&'static str>,
}

static APPS: &[(&str, AppEntry)] = &[
    (
        "whatsapp",
        AppEntry {
            package: "com.whatsapp",
            url: "https://wa.me",
            search_url: Some("https://wa.me/?text={query}"),
        },
    ),
    (
        "telegram",
        AppEntry {
            package: "org.telegram.messenger",
            url: "https://t.me",
            search_url: None,
        },
    ),
    (
        "instagram",
        AppEntry {
            package: "com.instagram.android",
            url: "https://instagram.com",
            search_url: None,
        },
    ),
    (
        "spotify",
        AppEntry {
            package: "com.spotify.music",
            url: "spotify://",
            search_url: Some("spotify:search:{query}"),
        },
    ),
    (
        "youtube",
        AppEntry {
            package: "com.google.android.youtube",
            url: "https://youtube.com",
            search_url: Some("https://www.youtube.com/results?search_query={query}"),
        },
    ),
    (
        "gmail",
        AppEntry {
            package: "com.google.android.gm",
            url: "https://mail.google.com",
            search_url: None,
        },
    ),
    (
        "chrome",
        AppEntry {
            package: "com.android.chrome",
            url: "https://google.com",
            search_url: Some("https://www.google.com/search?q={query}"),
        },
    ),
    (
        "twitter",
        AppEntry {
            package: "com.twitter.android",
            url: "https://twitter.com",
            search_url: Some("https://twitter.com/search?q={query}"),
        },
    ),
    (
        "x",
        AppEntry {
            package: "com.twitter.android",
            url: "https://x.com",
            search_url: Some("https://x.com/search?q={query}"),
        },
    ),
    (
        "tiktok",
        AppEntry {
            package: "com.zhiliaoapp.musically",
            url: "https://tiktok.com",
            search_url: Some("https://www.tiktok.com/search?q={query}"),
        },
    ),
    (
        "facebook",
        AppEntry {
            package: "com.facebook.katana",
            url: "https://facebook.com",
            search_url: None,
        },
    ),
    (
        "maps",
        AppEntry {
            package: "com.google.android.apps.maps",
            url: "https://maps.google.com",
            search_url: Some("geo:0,0?q={query}"),
        },
    ),
    (
        "netflix",
        AppEntry {
            package: "com.netflix.mediaclient",
            url: "https://netflix.com",
            search_url: Some("http://www.netflix.com/search/{query}"),
        },
    ),
];

fn lookup_app(name: &str) -> Option<&'static AppEntry> {
    APPS.iter().find(|(n, _)| *n == name).map(|(_, e)| e)
}

/// Device control capability
pub struct MobileCapability {
    descriptor: CapabilityDescriptor,
    backend: DeviceBackend,
    runner: Arc<dyn CommandRunner>,
}

impl MobileCapability {
    /// Create the capability with an explicit backend
    #[must_use]
    pub fn new(backend: DeviceBackend, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            descriptor: descriptor(),
            backend,
            runner,
        }
    }

    /// Create the capability, detecting the backend for this machine
    pub async fn detect(runner: Arc<dyn CommandRunner>) -> Self {
        let backend = DeviceBackend::detect(runner.as_ref()).await;
        Self::new(backend, runner)
    }

    /// Backend in use
    #[must_use]
    pub const fn backend(&self) -> DeviceBackend {
        self.backend
    }

    /// Run a command, treating spawn failures as an unsuccessful exit
    async fn run(&self, program: &str, args: &[&str], stdin: Option<&str>) -> bool {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        match self.runner.run(program, &args, stdin).await {
            Ok(out) => out.success,
            Err(e) => {
                tracing::warn!(program, error = %e, "device command failed");
                false
            }
        }
    }

    async fn open_app(&self, params: &Parameters) -> String {
        let app_name = param_str(params, "app_name")
            .unwrap_or_default()
            .to_lowercase();
        let query = param_str(params, "query");
        let app = lookup_app(&app_name);

        match self.backend {
            DeviceBackend::Termux => {
                let Some(app) = app else {
                    return format!("❌ App '{app_name}' no configurada");
                };

                if let (Some(query), Some(template)) = (query.as_deref(), app.search_url) {
                    let url = template.replace("{query}", &urlencoding::encode(query));
                    self.run("termux-open-url", &[&url], None).await;
                    return format!("✅ Buscando '{query}' en {app_name}");
                }

                let launched = self
                    .run(
                        "monkey",
                        &["-p", app.package, "-c", LAUNCHER_CATEGORY, "1"],
                        None,
                    )
                    .await
                    || self
                        .run(
                            "am",
                            &[
                                "start",
                                "-a",
                                "android.intent.action.MAIN",
                                "-c",
                                LAUNCHER_CATEGORY,
                                "-p",
                                app.package,
                            ],
                            None,
                        )
                        .await;

                if launched {
                    return format!("✅ Abriendo {app_name}");
                }

                if self.run("termux-open-url", &[app.url], None).await {
                    format!("✅ Abriendo {app_name} (via web)")
                } else {
                    format!("❌ No se pudo abrir {app_name}")
                }
            }
            DeviceBackend::Adb => {
                let package = app.map_or(app_name.as_str(), |a| a.package);
                self.run(
                    "adb",
                    &["shell", "monkey", "-p", package, "-c", LAUNCHER_CATEGORY, "1"],
                    None,
                )
                .await;
                format!("✅ Abriendo {app_name}")
            }
            DeviceBackend::Unavailable => "❌ ADB no está disponible".to_string(),
        }
    }

    async fn notify(&self, params: &Parameters) -> String {
        if self.backend != DeviceBackend::Termux {
            return "❌ Notificaciones solo disponibles en Termux".to_string();
        }

        let title = param_str(params, "title").unwrap_or_else(|| "Asistente".to_string());
        let message = param_str(params, "message").unwrap_or_default();
        self.run("termux-notification", &["-t", &title, "-c", &message], None)
            .await;
        format!("🔔 Notificación enviada: {title}")
    }

    async fn vibrate(&self, params: &Parameters) -> String {
        if self.backend != DeviceBackend::Termux {
            return termux_only("Vibración");
        }

        let duration = param_i64(params, "duration")
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_VIBRATION_MS);
        self.run("termux-vibrate", &["-d", &duration.to_string()], None)
            .await;
        format!("📳 Vibrando por {duration}ms")
    }

    async fn toast(&self, params: &Parameters) -> String {
        if self.backend != DeviceBackend::Termux {
            return termux_only("Toast");
        }

        let message = param_str(params, "message").unwrap_or_default();
        self.run("termux-toast", &[&message], None).await;
        "💬 Toast mostrado".to_string()
    }

    async fn clipboard(&self, params: &Parameters) -> String {
        if self.backend != DeviceBackend::Termux {
            return termux_only("Portapapeles");
        }

        let text = param_str(params, "text").unwrap_or_default();
        self.run("termux-clipboard-set", &[], Some(&text)).await;
        "📋 Copiado al portapapeles".to_string()
    }

    async fn speak(&self, params: &Parameters) -> String {
        if self.backend != DeviceBackend::Termux {
            return termux_only("TTS");
        }

        let text = param_str(params, "text").unwrap_or_default();
        self.run("termux-tts-speak", &[&text], None).await;
        format!("🔊 Hablando: {text}")
    }
}

fn termux_only(feature: &str) -> String {
    format!("❌ {feature} solo disponible en Termux")
}

fn descriptor() -> CapabilityDescriptor {
    CapabilityDescriptor::new(
        "mobile",
        "Control del dispositivo móvil: abrir apps, enviar notificaciones",
    )
    .action(ActionDescriptor::new("open_app", "Abre una aplicación por nombre").param("app_name", "string"))
    .action(
        ActionDescriptor::new("notify", "Envía una notificación")
            .param("title", "string")
            .param("message", "string"),
    )
    .action(ActionDescriptor::new("vibrate", "Hace vibrar el dispositivo").param("duration", "int (ms)"))
    .action(ActionDescriptor::new("toast", "Muestra un toast en pantalla").param("message", "string"))
    .action(ActionDescriptor::new("clipboard", "Copia texto al portapapeles").param("text", "string"))
    .action(ActionDescriptor::new("tts", "Habla un texto en voz alta").param("text", "string"))
}

#[async_trait]
impl Capability for MobileCapability {
    fn describe(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, action: &str, parameters: &Parameters) -> String {
        let resolved = ACTIONS.resolve(action).or_else(|| {
            // Bare app names still mean "open it"
            param_str(parameters, "app_name").map(|_| MobileAction::OpenApp)
        });

        tracing::debug!(action, ?resolved, backend = ?self.backend, "mobile action");

        match resolved {
            Some(MobileAction::OpenApp) => self.open_app(parameters).await,
            Some(MobileAction::Notify) => self.notify(parameters).await,
            Some(MobileAction::Vibrate) => self.vibrate(parameters).await,
            Some(MobileAction::Toast) => self.toast(parameters).await,
            Some(MobileAction::Clipboard) => self.clipboard(parameters).await,
            Some(MobileAction::Speak) => self.speak(parameters).await,
            None => format!("❌ Acción '{action}' no reconocida"),
        }
    }
}
