// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;

const SUPPORTED: &[&str] = &["pt", "en"];

// Extrator de idioma: "pt-BR,pt;q=0.9,en;q=0.8" -> "pt"
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Locale {
    pub fn lang(&self) -> &str {
        &self.0
    }

    pub fn from_header(value: Option<&str>) -> Self {
        let lang = value
            .map(accept_language::parse)
            .and_then(|tags| {
                // Primeiro idioma aceito que temos no catálogo
                tags.iter()
                    .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
                    .find(|lang| SUPPORTED.contains(&lang.as_str()))
            })
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        Locale(lang)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Ok(Locale::from_header(header_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_supported_language() {
        assert_eq!(Locale::from_header(Some("pt-BR,pt;q=0.9")).lang(), "pt");
        assert_eq!(Locale::from_header(Some("de-DE,en;q=0.5")).lang(), "en");
        assert_eq!(Locale::from_header(Some("de-DE")).lang(), "pt");
        assert_eq!(Locale::from_header(None).lang(), "pt");
    }
}
