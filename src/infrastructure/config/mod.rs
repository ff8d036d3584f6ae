use crate::domain::synthesis::{BackendTarget, VoiceConfig, DEFAULT_POLL_INTERVAL, DEFAULT_VOICE_NAME};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub run_mode: RunMode,
    pub log_format: LogFormat,
    pub pipeline: PipelineSettings,
    pub synthesis_provider: SynthesisProvider,
    pub storage_provider: StorageProvider,
    pub aws_region: String,
    pub google_access_token: Option<String>,
    pub scan_bucket: Option<String>,
    pub scan_interval: Duration,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Server,
    Scan,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisProvider {
    Google,
    Polly,
}

impl fmt::Display for SynthesisProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisProvider::Google => f.write_str("google"),
            SynthesisProvider::Polly => f.write_str("polly"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageProvider {
    Gcs,
    S3,
    /// Buckets are subdirectories of `root`
    Local { root: PathBuf },
}

impl StorageProvider {
    /// Whether the backend stores object attributes such as content type
    pub fn supports_attributes(&self) -> bool {
        !matches!(self, StorageProvider::Local { .. })
    }
}

impl fmt::Display for StorageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageProvider::Gcs => f.write_str("gcs"),
            StorageProvider::S3 => f.write_str("s3"),
            StorageProvider::Local { .. } => f.write_str("local"),
        }
    }
}

/// Settings read once at startup but validated per invocation: a missing
/// project or location fails each pipeline run, not the process.
#[derive(Debug, Clone, Default)]
pub struct PipelineSettings {
    pub project: Option<String>,
    pub location: Option<String>,
    pub voice_name: Option<String>,
    pub poll_interval: Duration,
}

/// Settings after the required values have been checked
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub target: BackendTarget,
    pub voice: VoiceConfig,
}

impl PipelineSettings {
    pub fn resolve(&self) -> Result<ResolvedSettings, String> {
        let (project, location) = match (&self.project, &self.location) {
            (Some(project), Some(location)) => (project.clone(), location.clone()),
            _ => {
                return Err(
                    "environment variables PROJECT_NUMBER and GCP_LOCATION must be set"
                        .to_string(),
                )
            }
        };

        let voice_name = match &self.voice_name {
            Some(name) => name.clone(),
            None => {
                tracing::info!(
                    voice = DEFAULT_VOICE_NAME,
                    "TTS_VOICE_NAME not set, using default voice"
                );
                DEFAULT_VOICE_NAME.to_string()
            }
        };

        Ok(ResolvedSettings {
            target: BackendTarget { project, location },
            voice: VoiceConfig::new(voice_name),
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from any variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let config = Config {
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: non_empty("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()?,
            run_mode: match non_empty("RUN_MODE").map(|s| s.to_lowercase()).as_deref() {
                None | Some("server") => RunMode::Server,
                Some("scan") => RunMode::Scan,
                Some(other) => return Err(format!("unknown RUN_MODE: {}", other).into()),
            },
            log_format: match non_empty("LOG_FORMAT").map(|s| s.to_lowercase()).as_deref() {
                None | Some("pretty") => LogFormat::Pretty,
                Some("json") => LogFormat::Json,
                Some(other) => return Err(format!("unknown LOG_FORMAT: {}", other).into()),
            },
            pipeline: PipelineSettings {
                project: non_empty("PROJECT_NUMBER"),
                location: non_empty("GCP_LOCATION"),
                voice_name: non_empty("TTS_VOICE_NAME"),
                poll_interval: match non_empty("POLL_INTERVAL_SECS") {
                    Some(secs) => Duration::from_secs(secs.parse()?),
                    None => DEFAULT_POLL_INTERVAL,
                },
            },
            synthesis_provider: match non_empty("SYNTHESIS_PROVIDER")
                .map(|s| s.to_lowercase())
                .as_deref()
            {
                None | Some("google") => SynthesisProvider::Google,
                Some("polly") => SynthesisProvider::Polly,
                Some(other) => return Err(format!("unknown SYNTHESIS_PROVIDER: {}", other).into()),
            },
            storage_provider: match non_empty("STORAGE_PROVIDER")
                .map(|s| s.to_lowercase())
                .as_deref()
            {
                None | Some("gcs") => StorageProvider::Gcs,
                Some("s3") => StorageProvider::S3,
                Some("local") => StorageProvider::Local {
                    root: non_empty("LOCAL_STORAGE_ROOT")
                        .map(PathBuf::from)
                        .unwrap_or_else(|| PathBuf::from("./storage")),
                },
                Some(other) => return Err(format!("unknown STORAGE_PROVIDER: {}", other).into()),
            },
            aws_region: non_empty("AWS_REGION").unwrap_or_else(|| "eu-west-1".to_string()),
            google_access_token: non_empty("GOOGLE_OAUTH_ACCESS_TOKEN"),
            scan_bucket: non_empty("SCAN_BUCKET"),
            scan_interval: Duration::from_secs(
                non_empty("SCAN_INTERVAL_SECS")
                    .unwrap_or_else(|| "60".to_string())
                    .parse()?,
            ),
        };

        // Polly writes its output to S3 and the completed object is moved there
        if config.synthesis_provider == SynthesisProvider::Polly
            && config.storage_provider != StorageProvider::S3
        {
            return Err(format!(
                "SYNTHESIS_PROVIDER=polly requires STORAGE_PROVIDER=s3, got {}",
                config.storage_provider
            )
            .into());
        }

        Ok(config)
    }
}
