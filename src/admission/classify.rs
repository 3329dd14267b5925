//! Provider classification heuristic.

use serde::Serialize;

/// How a resource's network provider was judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    /// Provider does not match any infrastructure keyword.
    Eligible,
    /// Provider matched a hosting/infrastructure keyword.
    Infrastructure { keyword: String },
    /// No metadata to judge (probe failed).
    Unclassified,
}

impl Classification {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Classification::Eligible)
    }
}

/// Case-insensitive keyword matcher over provider strings.
#[derive(Debug, Clone)]
pub struct Classifier {
    keywords: Vec<String>,
}

impl Classifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Classify a provider string. A missing provider is eligible.
    pub fn classify(&self, provider: Option<&str>) -> Classification {
        let provider = provider.unwrap_or_default().to_lowercase();
        match self.keywords.iter().find(|k| provider.contains(k.as_str())) {
            Some(keyword) => Classification::Infrastructure {
                keyword: keyword.clone(),
            },
            None => Classification::Eligible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;

    fn classifier() -> Classifier {
        Classifier::new(ValidationConfig::default().infrastructure_keywords)
    }

    #[test]
    fn test_hosting_providers_are_flagged() {
        let c = classifier();
        assert_eq!(
            c.classify(Some("AMAZON-02")),
            Classification::Infrastructure { keyword: "amazon".into() }
        );
        assert_eq!(
            c.classify(Some("Hetzner Online GmbH")),
            Classification::Infrastructure { keyword: "hetzner".into() }
        );
    }

    #[test]
    fn test_consumer_isp_is_eligible() {
        let c = classifier();
        assert!(c.classify(Some("Comcast Cable Communications")).is_eligible());
        assert!(c.classify(Some("Deutsche Telekom AG")).is_eligible());
    }

    #[test]
    fn test_missing_provider_is_eligible() {
        assert!(classifier().classify(None).is_eligible());
    }

    #[test]
    fn test_blank_keywords_are_ignored() {
        let c = Classifier::new(["", "  ", "OVH"]);
        assert!(c.classify(Some("anything")).is_eligible());
        assert!(!c.classify(Some("OVH SAS")).is_eligible());
    }
}
