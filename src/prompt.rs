//! Prompt builders for the persona and the intent classifier

/// Instructions for the classification call
pub const CLASSIFIER_SYSTEM_PROMPT: &str = "Eres un clasificador de intenciones. \
Decides si un comando del usuario corresponde a una herramienta disponible. \
Respondes únicamente con un objeto JSON, sin texto adicional.";

/// Build the persona system prompt used for free-form replies
///
/// `manifest` is the rendered capability manifest; `video_hints` adds the
/// play-versus-search guidance for the video capability.
#[must_use]
pub fn persona_prompt(wake_word: &str, manifest: &str, video_hints: bool) -> String {
    let mut prompt = format!(
        "Eres un asistente personal llamado \"{wake_word}\".
Tu objetivo es ayudar al usuario con tareas en su dispositivo móvil.

CAPACIDADES DISPONIBLES:
{manifest}

REGLAS:
1. Responde siempre en español de forma concisa y amigable
2. Si no puedes hacer algo, explica por qué
3. Para acciones en apps, usa las capacidades disponibles
4. Sé proactivo pero no invasivo
"
    );

    if video_hints {
        prompt.push_str(
            r#"
IMPORTANTE PARA VIDEO:
- Si el usuario dice "pon", "reproduce", "abre" o "play" → pasa {"auto_play": true} en parameters
- Si el usuario dice "busca", "encuentra" o "search" → no pases auto_play
- Ejemplo: "pon Despacito en youtube" → {"capability": "video", "action": "search_video", "parameters": {"query": "Despacito", "auto_play": true}}
"#,
        );
    }

    prompt.push_str("\nResponde de forma natural y útil.");
    prompt
}

/// Build the user prompt for the classification call
#[must_use]
pub fn classification_prompt(command: &str, manifest: &str) -> String {
    format!(
        r#"Analiza este comando y determina si requiere una de estas herramientas.

Herramientas disponibles:
{manifest}

Comando: "{command}"

Responde SOLO en formato JSON:
{{"requires_capability": true/false, "capability": "nombre", "action": "accion", "parameters": {{}}}}

Si no requiere ninguna herramienta, responde: {{"requires_capability": false}}"#
    )
}
