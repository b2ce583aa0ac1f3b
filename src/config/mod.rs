use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FilterEntry {
    pub label: String,
    pub filter: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    pub backend: Option<String>,
    #[serde(alias = "base_dir", alias = "base_url")]
    pub base: Option<String>,
    #[serde(alias = "projetos")]
    pub projects_endpoint: Option<String>,
    #[serde(alias = "certificados")]
    pub certificates_endpoint: Option<String>,
    pub store_url: Option<String>,
    pub store_token: Option<String>,
    pub timeout: Option<usize>,
    pub proxy: Option<String>,
    pub projects_selector: Option<String>,
    pub certificates_selector: Option<String>,
    #[serde(alias = "isotope_grid")]
    pub grid_selector: Option<String>,
    pub filter_buttons_selector: Option<String>,
    pub projects_error_selector: Option<String>,
    pub certificates_error_selector: Option<String>,
    pub project_item_classes: Option<String>,
    pub certificate_item_classes: Option<String>,
    pub project_image_height: Option<String>,
    #[serde(alias = "card_image_height")]
    pub certificate_image_height: Option<String>,
    pub default_category: Option<String>,
    pub filters: Option<Vec<FilterEntry>>,
    pub title: Option<String>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".portfolio-cards").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r##"# portfolio-cards config
#
# Location (default):
#   ~/.portfolio-cards/config.yml

# Data source: "static" (JSON files or URLs) or "documents" (remote collections)
backend: static

# Static backend: endpoints are resolved against `base` (a directory or a URL)
base: .
projects_endpoint: json/projects.json
certificates_endpoint: json/certificates.json

# Documents backend: GET {store_url}/{projects_endpoint}
# store_url: https://store.example.com/v1/collections
# store_token: ""

# HTTP
timeout: 10
# proxy: http://127.0.0.1:8080

# Page
projects_selector: "#projects-container"
certificates_selector: "#certificates-container"
grid_selector: ".portfolio-grid"
filter_buttons_selector: ".portfolio-filter li"
# projects_error_selector: "#projects-error"
# certificates_error_selector: "#certificates-error"

# Cards
project_item_classes: "col-lg-4 col-md-6 all"
certificate_item_classes: "col-lg-3 col-md-4 col-sm-6 mb-4"
project_image_height: 250px
certificate_image_height: 200px
default_category: all

# Filter bar (derived from project categories when omitted)
# filters:
#   - label: All
#     filter: "*"
#   - label: Web
#     filter: ".web"

# Output
# title: Portfolio
# output: ./portfolio.html
# output_format: html
no_color: false
"##
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(())
}
