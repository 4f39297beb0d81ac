// Integration tests for configuration loading and validation

use anyhow::Result;
use std::io::Write;
use voice_relay::config::Config;
use voice_relay::{AudioFormat, ServerSettings, SessionConfig};

#[test]
fn test_defaults_match_device_protocol() {
    let config = Config::default();

    assert_eq!(config.service.tcp.address(), "0.0.0.0:50007");
    assert_eq!(config.service.tcp.backlog, 1);
    assert_eq!(config.audio.chunk_size, 1024);
    assert_eq!(config.audio.end_marker, "END_RECORDING_SIGNAL");
    assert_eq!(config.audio.format(), AudioFormat::default());
    assert_eq!(config.gemini.model, "gemini-1.5-flash");
    assert!(config.gemini.prompt.starts_with("You are a helpful assistant."));
    assert_eq!(config.elevenlabs.voice_id, "EXAVITQu4vr4xnSDxMaL");
    assert_eq!(config.elevenlabs.model_id, "eleven_multilingual_v2");
    assert_eq!(config.elevenlabs.output_format, "pcm_16000");
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_falls_back_to_defaults() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("absent");

    let config = Config::load(path.to_str().unwrap_or("absent"))?;

    assert_eq!(config.service.tcp.port, 50007);
    assert_eq!(config.audio.sample_rate, 16000);

    Ok(())
}

#[test]
fn test_file_overrides_selected_fields() -> Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(
        file,
        r#"
[service.tcp]
port = 6000

[audio]
sample_rate = 8000
end_marker = "STOP"

[gemini]
model = "gemini-2.0-flash"
"#
    )?;

    let config = Config::load(file.path().to_str().unwrap_or_default())?;

    assert_eq!(config.service.tcp.port, 6000);
    assert_eq!(config.service.tcp.host, "0.0.0.0", "Unset fields keep defaults");
    assert_eq!(config.audio.sample_rate, 8000);
    assert_eq!(config.audio.channels, 1);
    assert_eq!(config.audio.end_marker, "STOP");
    assert_eq!(config.gemini.model, "gemini-2.0-flash");
    assert_eq!(config.elevenlabs.output_format, "pcm_16000");

    Ok(())
}

#[test]
fn test_validation_rejects_bad_audio_settings() {
    let mut config = Config::default();
    config.audio.end_marker.clear();
    assert!(config.validate().is_err(), "Empty marker");

    let mut config = Config::default();
    config.audio.chunk_size = 0;
    assert!(config.validate().is_err(), "Zero chunk size");

    let mut config = Config::default();
    config.audio.sample_width = 5;
    assert!(config.validate().is_err(), "Sample width out of range");

    let mut config = Config::default();
    config.service.tcp.backlog = 0;
    assert!(config.validate().is_err(), "Zero backlog");

    let mut config = Config::default();
    config.audio.channels = 20000;
    config.audio.sample_width = 4;
    assert!(config.validate().is_err(), "Block align overflows u16");

    let mut config = Config::default();
    config.audio.sample_rate = 2_000_000_000;
    config.audio.channels = 2;
    assert!(config.validate().is_err(), "Byte rate overflows u32");
}

#[test]
fn test_session_and_server_settings_follow_config() {
    let mut config = Config::default();
    config.service.tcp.host = "127.0.0.1".to_string();
    config.service.tcp.port = 7000;
    config.audio.chunk_size = 512;
    config.audio.end_marker = "DONE".to_string();

    let session = SessionConfig::from(&config.audio);
    assert_eq!(session.chunk_size, 512);
    assert_eq!(session.end_marker, b"DONE".to_vec());
    assert_eq!(session.format, config.audio.format());

    let settings = ServerSettings::from_config(&config);
    assert_eq!(settings.address, "127.0.0.1:7000");
    assert_eq!(settings.backlog, 1);
    assert_eq!(settings.session, session);
}
