//! TMDB API client
//!
//! Reference [`MetadataProvider`] over the TMDB v3 REST API.
//!
//! Endpoints:
//! - Movie credits: `/movie/{id}/credits`
//! - Series credits: cast from `/tv/{id}/credits`, crew from `/tv/{id}/aggregate_credits`
//!   (the plain credits endpoint only lists the latest season's crew)
//! - Person credits: `/person/{id}/movie_credits` and `/person/{id}/tv_credits`
//!
//! No retries or caching: a failed request surfaces as a [`ProviderError`].

use super::{
    MetadataProvider, ProviderError, RawCreditList, RawCrewCredit, RawPersonCredits,
    RawTitleCredits,
};
use crate::model::{MediaKind, TitleKey};
use async_trait::async_trait;
use costar_common::config::ProviderConfig;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("costar/", env!("CARGO_PKG_VERSION"));

/// Crew member on `/tv/{id}/aggregate_credits`, one entry per person with all jobs
#[derive(Debug, Clone, Deserialize)]
struct AggregateCrewMember {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    profile_path: Option<String>,
    #[serde(default)]
    popularity: Option<f64>,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    jobs: Vec<AggregateJob>,
}

#[derive(Debug, Clone, Deserialize)]
struct AggregateJob {
    #[serde(default)]
    job: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AggregateCredits {
    #[serde(default)]
    crew: Vec<AggregateCrewMember>,
}

impl AggregateCredits {
    /// One crew credit per (person, job), matching the plain credits shape
    fn flatten_crew(self) -> Vec<RawCrewCredit> {
        let mut crew = Vec::new();
        for member in self.crew {
            let base = RawCrewCredit {
                id: member.id,
                name: member.name,
                profile_path: member.profile_path,
                popularity: member.popularity,
                job: None,
                department: member.department,
            };
            if member.jobs.is_empty() {
                crew.push(base);
                continue;
            }
            for job in member.jobs {
                crew.push(RawCrewCredit {
                    job: job.job,
                    ..base.clone()
                });
            }
        }
        crew
    }
}

/// TMDB API client
pub struct TmdbClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Build a client from provider configuration
    ///
    /// Fails with [`ProviderError::MissingApiKey`] when neither the environment
    /// nor the config file supplies a key.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .resolved_api_key()
            .ok_or(ProviderError::MissingApiKey)?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(url = %url, "Querying TMDB API");

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(path.to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn title_credits(&self, title: TitleKey) -> Result<RawTitleCredits, ProviderError> {
        match title.media_kind {
            MediaKind::Movie => self.get_json(&format!("/movie/{}/credits", title.id)).await,
            MediaKind::Series => {
                let cast_path = format!("/tv/{}/credits", title.id);
                let crew_path = format!("/tv/{}/aggregate_credits", title.id);
                let (credits, aggregate) = tokio::try_join!(
                    self.get_json::<RawTitleCredits>(&cast_path),
                    self.get_json::<AggregateCredits>(&crew_path),
                )?;
                Ok(RawTitleCredits {
                    cast: credits.cast,
                    crew: aggregate.flatten_crew(),
                })
            }
        }
    }

    async fn person_credits(&self, person_id: u64) -> Result<RawPersonCredits, ProviderError> {
        let movie_path = format!("/person/{}/movie_credits", person_id);
        let tv_path = format!("/person/{}/tv_credits", person_id);
        let (movie, tv) = tokio::try_join!(
            self.get_json::<RawCreditList>(&movie_path),
            self.get_json::<RawCreditList>(&tv_path),
        )?;
        Ok(RawPersonCredits { movie, tv })
    }
}
