//! `docfox status` — show configuration and capability status.

use docfox_capabilities::{CapabilitiesConfig, NotifyConfig};
use docfox_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let registry = docfox_capabilities::default_registry(&CapabilitiesConfig {
        save_dir: config.save_dir.clone(),
        docs_dir: config.docs_dir.clone(),
        notify: NotifyConfig {
            bot_token: config.chat.bot_token.clone(),
            default_channel: config.chat.default_channel.clone(),
        },
    });

    let mut names = registry.names();
    names.sort();

    println!();
    println!("  docfox status");
    println!("  ─────────────");
    println!("  Config dir:      {}", AppConfig::config_dir().display());
    println!("  Model:           {}", config.model);
    println!("  Endpoint:        {}", config.api_url);
    println!(
        "  API key:         {}",
        if config.has_api_key() { "configured" } else { "MISSING" }
    );
    println!("  Max turns:       {}", config.max_turns);
    println!("  Session backend: {}", config.session.backend);
    println!("  Docs corpus:     {}", config.docs_dir.display());
    println!("  Save dir:        {}", config.save_dir.display());
    println!("  Capabilities:    {}", names.join(", "));
    println!(
        "  Chat notify:     {}",
        if config.chat.bot_token.is_some() { "enabled" } else { "disabled (skipped)" }
    );
    println!();

    Ok(())
}
