use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// The fixed set of collections a portfolio page renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Projects,
    Certificates,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Projects, Collection::Certificates];

    pub fn name(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Certificates => "certificates",
        }
    }

    /// Keys a wrapped payload may use for this collection, canonical first.
    pub fn payload_keys(self) -> &'static [&'static str] {
        match self {
            Self::Projects => &["projects", "projetos"],
            Self::Certificates => &["certificates", "certificados"],
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.payload_keys().contains(&value.as_str()))
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    #[serde(alias = "texto", deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

/// One portfolio item. Projects and certificates share the shape; the
/// renderer decides which fields it shows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(alias = "titulo", deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(alias = "descricao")]
    pub description: Option<String>,
    #[serde(alias = "imagem", deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(alias = "categoria")]
    pub category: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub links: Vec<Link>,
    #[serde(alias = "emissor")]
    pub issuer: Option<String>,
    #[serde(alias = "credentialUrl", alias = "credencial")]
    pub credential_url: Option<String>,
}

/// `null` reads as the field's default, the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Id>::deserialize(deserializer)? {
        Some(Id::Text(s)) => Some(s),
        Some(Id::Number(n)) => Some(n.to_string()),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_keys_deserialize() {
        let record: Record = serde_json::from_value(serde_json::json!({
            "titulo": "Loja",
            "imagem": "img/loja.png",
            "descricao": "E-commerce",
            "categoria": "web",
            "links": [{"texto": "Demo", "url": "https://example.com"}]
        }))
        .unwrap();
        assert_eq!(record.title, "Loja");
        assert_eq!(record.image, "img/loja.png");
        assert_eq!(record.category.as_deref(), Some("web"));
        assert_eq!(record.links[0].text, "Demo");
    }

    #[test]
    fn numeric_id_becomes_string() {
        let record: Record = serde_json::from_value(serde_json::json!({"id": 7})).unwrap();
        assert_eq!(record.id.as_deref(), Some("7"));
        assert!(record.title.is_empty());
    }

    #[test]
    fn null_reads_as_missing() {
        let record: Record = serde_json::from_value(serde_json::json!({
            "title": null,
            "image": "a.png",
            "links": null,
            "issuer": null
        }))
        .unwrap();
        assert!(record.title.is_empty());
        assert!(record.links.is_empty());
        assert!(record.issuer.is_none());
    }

    #[test]
    fn collection_parse_accepts_legacy_names() {
        assert_eq!(Collection::parse("Projetos"), Some(Collection::Projects));
        assert_eq!(Collection::parse("certificates"), Some(Collection::Certificates));
        assert_eq!(Collection::parse("blog"), None);
    }
}
