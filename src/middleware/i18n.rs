// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::SUPPORTED_LANGUAGES;

// Extrator de idioma (Accept-Language). Só devolve idiomas que o catálogo conhece.
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale("en".to_string())
    }
}

impl Locale {
    /// "pt-BR,pt;q=0.9,en;q=0.8" -> "pt". Respeita a ordem de qualidade do header.
    pub fn from_header(header_str: &str) -> Self {
        accept_language::parse(header_str)
            .into_iter()
            .filter_map(|tag| tag.split('-').next().map(str::to_lowercase))
            .find(|lang| SUPPORTED_LANGUAGES.contains(&lang.as_str()))
            .map(Locale)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_supported_language() {
        assert_eq!(Locale::from_header("pt-BR,pt;q=0.9,en;q=0.8").0, "pt");
        assert_eq!(Locale::from_header("es").0, "es");
        assert_eq!(Locale::from_header("de-DE,fr;q=0.5").0, "en");
        assert_eq!(Locale::from_header("fr;q=0.9,es-MX;q=0.8").0, "es");
    }
}
