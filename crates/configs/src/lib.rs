use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

/// Process-wide configuration, constructed once at startup and handed to the
/// constructors of the document store and the image store client.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub image_store: ImageStoreConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub uri: String,
    /// Used when the connection string does not name a database.
    #[serde(default = "default_database_name")]
    pub database_name: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { uri: String::new(), database_name: default_database_name(), collection: default_collection() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageStoreConfig {
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub signature_algorithm: SignatureAlgorithm,
}

impl Default for ImageStoreConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            api_base_url: default_api_base_url(),
            signature_algorithm: SignatureAlgorithm::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_field_name")]
    pub field_name: String,
    #[serde(default = "default_folder")]
    pub folder: String,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_allowed_formats")]
    pub allowed_formats: Vec<String>,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            field_name: default_field_name(),
            folder: default_folder(),
            max_files: default_max_files(),
            allowed_formats: default_allowed_formats(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 5000 }
fn default_database_name() -> String { "test".into() }
fn default_collection() -> String { "products".into() }
fn default_api_base_url() -> String { "https://api.cloudinary.com/v1_1".into() }
fn default_field_name() -> String { "images".into() }
fn default_folder() -> String { "products".into() }
fn default_max_files() -> usize { 10 }
fn default_allowed_formats() -> Vec<String> { vec!["jpg".into(), "png".into(), "jpeg".into()] }
fn default_max_body_bytes() -> usize { 50 * 1024 * 1024 }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

/// Read the TOML file at `path`. A file that does not exist is `Ok(None)`;
/// an unreadable or malformed file is an error.
pub fn load_if_present(path: &str) -> Result<Option<AppConfig>> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse(&content).map(Some).map_err(|e| anyhow!("invalid config file {path}: {e}")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow!("cannot read config file {path}: {e}")),
    }
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load from the TOML file if one exists, otherwise start from defaults;
    /// in both cases blanks are filled from the environment (`HOST`, `PORT`
    /// and `MONGO_DB` always override) and the result validated.
    pub fn load_and_validate() -> Result<Self> {
        Self::load_and_validate_from(&config_path())
    }

    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = load_if_present(path)?.unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.normalize_with(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::normalize_and_validate`] with an explicit variable lookup.
    pub fn normalize_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.server.normalize(&lookup)?;
        self.database.normalize(&lookup);
        self.database.validate()?;
        self.image_store.normalize(&lookup);
        self.image_store.validate()?;
        self.upload.normalize(&lookup)?;
        self.upload.validate()?;
        Ok(())
    }
}

fn fill_blank<F>(slot: &mut String, lookup: &F, key: &str)
where
    F: Fn(&str) -> Option<String>,
{
    if slot.trim().is_empty() {
        if let Some(v) = lookup(key) {
            *slot = v;
        }
    }
}

impl ServerConfig {
    fn normalize<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            self.host = host;
        }
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if let Some(port) = lookup("PORT") {
            self.port = port.trim().parse::<u16>().map_err(|e| anyhow!("invalid PORT {port:?}: {e}"))?;
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads.is_none() {
            self.worker_threads = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok());
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

impl DatabaseConfig {
    fn normalize<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fill_blank(&mut self.uri, lookup, "MONGO_URI");
        // Override, not fill: `database_name` always has a default.
        if let Some(name) = lookup("MONGO_DB").filter(|n| !n.trim().is_empty()) {
            self.database_name = name;
        }
        if self.database_name.trim().is_empty() {
            self.database_name = default_database_name();
        }
        if self.collection.trim().is_empty() {
            self.collection = default_collection();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.uri.trim().is_empty() {
            return Err(anyhow!("database.uri is empty; set it in config.toml or MONGO_URI"));
        }
        let lower = self.uri.to_lowercase();
        if !(lower.starts_with("mongodb://") || lower.starts_with("mongodb+srv://")) {
            return Err(anyhow!("database.uri must start with mongodb:// or mongodb+srv://"));
        }
        Ok(())
    }
}

impl ImageStoreConfig {
    fn normalize<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fill_blank(&mut self.cloud_name, lookup, "CLOUDINARY_CLOUD_NAME");
        fill_blank(&mut self.api_key, lookup, "CLOUDINARY_API_KEY");
        fill_blank(&mut self.api_secret, lookup, "CLOUDINARY_API_SECRET");
        if self.api_base_url.trim().is_empty() {
            self.api_base_url = default_api_base_url();
        }
        while self.api_base_url.ends_with('/') {
            self.api_base_url.pop();
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("cloud_name", &self.cloud_name),
            ("api_key", &self.api_key),
            ("api_secret", &self.api_secret),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("image_store.{name} is empty; set it in config.toml or CLOUDINARY_* variables"));
            }
        }
        Ok(())
    }

    /// Endpoint for image uploads on this account.
    pub fn upload_url(&self) -> String {
        format!("{}/{}/image/upload", self.api_base_url, self.cloud_name)
    }
}

impl UploadConfig {
    fn normalize<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("UPLOAD_MAX_BODY_BYTES") {
            self.max_body_bytes = v
                .trim()
                .parse::<usize>()
                .map_err(|e| anyhow!("invalid UPLOAD_MAX_BODY_BYTES {v:?}: {e}"))?;
        }
        self.allowed_formats = self
            .allowed_formats
            .iter()
            .map(|f| f.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|f| !f.is_empty())
            .collect();
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.field_name.trim().is_empty() {
            return Err(anyhow!("upload.field_name must not be empty"));
        }
        if self.max_files == 0 {
            return Err(anyhow!("upload.max_files must be >= 1"));
        }
        if self.allowed_formats.is_empty() {
            return Err(anyhow!("upload.allowed_formats must list at least one format"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("upload.max_body_bytes must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("MONGO_URI", "mongodb://localhost:27017"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CLOUDINARY_API_SECRET", "secret"),
        ]
    }

    #[test]
    fn env_only_config_gets_defaults() {
        let mut cfg = AppConfig::default();
        cfg.normalize_with(env(&full_env())).unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.database.database_name, "test");
        assert_eq!(cfg.database.collection, "products");
        assert_eq!(cfg.upload.max_files, 10);
        assert_eq!(cfg.upload.folder, "products");
        assert_eq!(cfg.upload.field_name, "images");
        assert_eq!(cfg.upload.allowed_formats, vec!["jpg", "png", "jpeg"]);
        assert_eq!(cfg.image_store.upload_url(), "https://api.cloudinary.com/v1_1/demo/image/upload");
    }

    #[test]
    fn port_from_env_overrides_default() {
        let mut vars = full_env();
        vars.push(("PORT", "8099"));
        let mut cfg = AppConfig::default();
        cfg.normalize_with(env(&vars)).unwrap();
        assert_eq!(cfg.server.port, 8099);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut vars = full_env();
        vars.push(("PORT", "not-a-port"));
        let mut cfg = AppConfig::default();
        assert!(cfg.normalize_with(env(&vars)).is_err());
    }

    #[test]
    fn missing_mongo_uri_is_rejected() {
        let vars: Vec<_> = full_env().into_iter().filter(|(k, _)| *k != "MONGO_URI").collect();
        let mut cfg = AppConfig::default();
        let err = cfg.normalize_with(env(&vars)).unwrap_err();
        assert!(err.to_string().contains("MONGO_URI"));
    }

    #[test]
    fn non_mongo_uri_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.database.uri = "postgres://localhost/db".into();
        assert!(cfg.normalize_with(env(&full_env())).is_err());
    }

    #[test]
    fn missing_image_credentials_are_rejected() {
        let vars: Vec<_> = full_env().into_iter().filter(|(k, _)| *k != "CLOUDINARY_API_SECRET").collect();
        let mut cfg = AppConfig::default();
        let err = cfg.normalize_with(env(&vars)).unwrap_err();
        assert!(err.to_string().contains("api_secret"));
    }

    #[test]
    fn toml_values_take_precedence_over_env() {
        let mut cfg = parse(
            r#"
            [server]
            port = 7000

            [database]
            uri = "mongodb+srv://cluster.example.net/shop"

            [image_store]
            cloud_name = "acme"
            api_key = "k"
            api_secret = "s"
            signature_algorithm = "sha256"
            api_base_url = "http://localhost:9000/v1_1/"

            [upload]
            max_files = 3
            allowed_formats = [".PNG", "jpg"]
            "#,
        )
        .unwrap();
        cfg.normalize_with(env(&full_env())).unwrap();
        assert_eq!(cfg.server.port, 7000);
        assert_eq!(cfg.database.uri, "mongodb+srv://cluster.example.net/shop");
        assert_eq!(cfg.image_store.cloud_name, "acme");
        assert_eq!(cfg.image_store.signature_algorithm, SignatureAlgorithm::Sha256);
        assert_eq!(cfg.image_store.upload_url(), "http://localhost:9000/v1_1/acme/image/upload");
        assert_eq!(cfg.upload.max_files, 3);
        assert_eq!(cfg.upload.allowed_formats, vec!["png", "jpg"]);
    }

    #[test]
    fn mongo_db_overrides_file_database_name() {
        let mut cfg = parse("[database]\ndatabase_name = \"shop\"\n").unwrap();
        let mut vars = full_env();
        vars.push(("MONGO_DB", "catalog"));
        cfg.normalize_with(env(&vars)).unwrap();
        assert_eq!(cfg.database.database_name, "catalog");

        let mut cfg = parse("[database]\ndatabase_name = \"shop\"\n").unwrap();
        cfg.normalize_with(env(&full_env())).unwrap();
        assert_eq!(cfg.database.database_name, "shop");
    }

    fn temp_config(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("catalog-{}-{name}.toml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_config_file_means_defaults() {
        let path = std::env::temp_dir().join(format!("catalog-{}-absent.toml", std::process::id()));
        assert!(load_if_present(path.to_str().unwrap()).unwrap().is_none());
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let path = temp_config("malformed", "[server\nport = 7000\n");
        let err = load_if_present(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("invalid config file"));
        assert!(AppConfig::load_and_validate_from(path.to_str().unwrap()).is_err());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn present_config_file_is_read() {
        let path = temp_config("present", "[server]\nport = 7001\n");
        let cfg = load_if_present(path.to_str().unwrap()).unwrap().expect("file exists");
        assert_eq!(cfg.server.port, 7001);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn zero_file_cap_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.upload.max_files = 0;
        assert!(cfg.normalize_with(env(&full_env())).is_err());
    }
}
