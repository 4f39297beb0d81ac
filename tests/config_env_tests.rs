// Environment layer of configuration loading
//
// Kept in its own test binary: environment variables are process-wide and
// would leak into the file-based tests in config_tests.rs.

use anyhow::Result;
use std::io::Write;
use voice_relay::config::Config;

#[test]
fn test_environment_overrides_file_and_defaults() -> Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(
        file,
        r#"
[service.tcp]
port = 6000

[gemini]
api_key = "from-file"
"#
    )?;

    std::env::set_var("VOICE_RELAY_GEMINI__API_KEY", "12345");
    std::env::set_var("VOICE_RELAY_SERVICE__TCP__PORT", "7100");
    std::env::set_var("VOICE_RELAY_ELEVENLABS__API_KEY", "xi-test");

    let loaded = Config::load(file.path().to_str().unwrap_or_default());

    std::env::remove_var("VOICE_RELAY_GEMINI__API_KEY");
    std::env::remove_var("VOICE_RELAY_SERVICE__TCP__PORT");
    std::env::remove_var("VOICE_RELAY_ELEVENLABS__API_KEY");

    let config = loaded?;
    assert_eq!(config.gemini.api_key, "12345", "Environment beats the file");
    assert_eq!(config.service.tcp.port, 7100);
    assert_eq!(config.elevenlabs.api_key, "xi-test", "Environment beats defaults");
    assert_eq!(config.service.tcp.host, "0.0.0.0");
    assert_eq!(config.gemini.model, "gemini-1.5-flash");
    assert!(config.validate().is_ok());

    Ok(())
}
