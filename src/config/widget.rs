use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("widget config IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("widget config parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Branding and copy for the widget. Everything user-visible is injected from
/// here so that a deployment can restyle the widget without forking markup.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WidgetConfig {
    /// Display name of the assistant, also substituted into the system prompt.
    pub title: String,

    /// System instruction template. `{title}` is replaced with `title`.
    pub system_prompt: String,

    /// Optional assistant greeting seeded into a fresh conversation.
    pub welcome_message: Option<String>,

    /// Landing-screen copy under the title.
    pub tagline: String,

    /// Label of the landing-screen call to action.
    pub cta_label: String,

    /// Input placeholder on the chat screen.
    pub placeholder: String,

    /// Opaque attribution string sent upstream with every request.
    pub branding_id: String,

    /// Optional watermark line; when set it is rendered in the footer and
    /// included in the upstream payload.
    pub watermark_text: Option<String>,
    pub watermark_link: Option<String>,

    /// Assistant-turn copy substituted on transport failure or non-OK status.
    pub fallback_error: String,

    /// Assistant-turn copy substituted when the reply shape is unrecognized.
    pub fallback_apology: String,

    #[serde(skip)]
    pub last_loaded: Option<SystemTime>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            title: "Chat Assistant".to_string(),
            system_prompt: "You are {title}, a friendly and helpful AI assistant.".to_string(),
            welcome_message: Some(
                "Hello! I'm your assistant. How can I help you today?".to_string()
            ),
            tagline: "Smart answers for every question. Start a conversation below.".to_string(),
            cta_label: "Start chatting".to_string(),
            placeholder: "Type a message...".to_string(),
            branding_id: "CHATLET_V1".to_string(),
            watermark_text: None,
            watermark_link: None,
            fallback_error: "Sorry, the connection was interrupted. Please try again later."
                .to_string(),
            fallback_apology: "Sorry, something went wrong.".to_string(),
            last_loaded: None,
        }
    }
}

impl WidgetConfig {
    /// The system instruction with template placeholders substituted.
    pub fn system_instruction(&self) -> String {
        self.system_prompt.replace("{title}", &self.title)
    }
}

/// Load the widget config from `path`, falling back to built-in defaults when
/// the file does not exist.
pub fn load_widget_config(path: &str) -> Result<Arc<WidgetConfig>, ConfigError> {
    let mut config = if Path::new(path).exists() {
        let file_content = fs::read_to_string(path)?;
        serde_json::from_str::<WidgetConfig>(&file_content)?
    } else {
        info!("Widget config '{}' not found, using built-in defaults", path);
        WidgetConfig::default()
    };
    config.last_loaded = Some(SystemTime::now());
    Ok(Arc::new(config))
}

/// Re-read the widget config when the file changed on disk since the current
/// config was loaded. Returns `None` when nothing changed.
pub fn reload_widget_config_if_changed<P: AsRef<Path>>(
    path: P,
    current_config: &Arc<WidgetConfig>
) -> Result<Option<Arc<WidgetConfig>>, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    let metadata = fs::metadata(path)?;

    if let Ok(modified) = metadata.modified() {
        let stale = match current_config.last_loaded {
            Some(last_loaded) => modified > last_loaded,
            None => true,
        };
        if stale {
            info!("Widget config changed, reloading...");
            let new_config = load_widget_config(path.to_str().unwrap_or_default())?;
            return Ok(Some(new_config));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_for_missing_fields() {
        let config: WidgetConfig = serde_json::from_str(r#"{ "title": "Helpdesk" }"#).unwrap();
        assert_eq!(config.title, "Helpdesk");
        assert_eq!(config.branding_id, "CHATLET_V1");
        assert!(config.watermark_text.is_none());
    }

    #[test]
    fn system_instruction_substitutes_title() {
        let config = WidgetConfig {
            title: "Helpdesk".to_string(),
            ..WidgetConfig::default()
        };
        assert_eq!(
            config.system_instruction(),
            "You are Helpdesk, a friendly and helpful AI assistant."
        );
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_widget_config("does-not-exist.json").unwrap();
        assert_eq!(config.title, "Chat Assistant");
        assert!(config.last_loaded.is_some());
    }

    #[test]
    fn reload_picks_up_rewritten_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widget.json");
        fs::write(&path, r#"{ "title": "First" }"#).unwrap();

        let mut loaded = load_widget_config(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.title, "First");

        // Backdate the loaded timestamp so the rewrite below counts as newer.
        let mut stale = (*loaded).clone();
        stale.last_loaded = Some(SystemTime::UNIX_EPOCH);
        loaded = Arc::new(stale);

        let mut file = fs::OpenOptions::new().write(true).truncate(true).open(&path).unwrap();
        file.write_all(br#"{ "title": "Second" }"#).unwrap();
        drop(file);

        let reloaded = reload_widget_config_if_changed(&path, &loaded).unwrap();
        assert_eq!(reloaded.unwrap().title, "Second");
    }
}
