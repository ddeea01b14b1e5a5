use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Upstream Endpoint Args ---
    /// URL of the hosted chat-completion endpoint the widget relays to.
    #[arg(long, env = "CHAT_ENDPOINT_URL")]
    pub endpoint_url: String,

    // --- State Store Args ---
    /// Snapshot store backend for conversation state (file, memory).
    #[arg(long, env = "STATE_TYPE", default_value = "file")]
    pub state_type: String,

    /// Directory holding snapshot files when the file backend is selected.
    #[arg(long, env = "STATE_DIR", default_value = ".chatlet")]
    pub state_dir: String,

    // --- Widget Args ---
    /// Path to the widget configuration file (branding, copy, prompts).
    /// Built-in defaults are used when the file does not exist.
    #[arg(long, env = "WIDGET_CONFIG_PATH", default_value = "widget.json")]
    pub widget_config_path: String,

    // --- Server Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
