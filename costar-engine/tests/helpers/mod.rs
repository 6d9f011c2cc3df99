//! Shared test helpers
//!
//! [`FakeProvider`] serves canned credit lists and can fail or hold back
//! individual requests.

#![allow(dead_code)]

use async_trait::async_trait;
use costar_engine::provider::{
    RawCastCredit, RawCreditList, RawCrewCredit, RawPersonCastCredit, RawPersonCredits,
    RawPersonCrewCredit, RawTitleCredits,
};
use costar_engine::{MetadataProvider, ProviderError, TitleKey};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// In-memory metadata provider
#[derive(Default)]
pub struct FakeProvider {
    titles: HashMap<TitleKey, RawTitleCredits>,
    people: HashMap<u64, RawPersonCredits>,
    failing: HashSet<u64>,
    gates: HashMap<u64, Arc<Notify>>,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, key: TitleKey, credits: RawTitleCredits) -> Self {
        self.titles.insert(key, credits);
        self
    }

    pub fn with_person(mut self, id: u64, credits: RawPersonCredits) -> Self {
        self.people.insert(id, credits);
        self
    }

    /// Requests for this id fail with a network error
    pub fn failing(mut self, id: u64) -> Self {
        self.failing.insert(id);
        self
    }

    /// Requests for this id wait until the returned handle is notified
    pub fn gated(&mut self, id: u64) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.insert(id, Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn before_request(&self, id: u64) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gates.get(&id) {
            gate.notified().await;
        }
        if self.failing.contains(&id) {
            return Err(ProviderError::Network("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    async fn title_credits(&self, title: TitleKey) -> Result<RawTitleCredits, ProviderError> {
        self.before_request(title.id).await?;
        self.titles
            .get(&title)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("title {}", title)))
    }

    async fn person_credits(&self, person_id: u64) -> Result<RawPersonCredits, ProviderError> {
        self.before_request(person_id).await?;
        self.people
            .get(&person_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("person {}", person_id)))
    }
}

pub fn cast(id: u64, name: &str, character: &str, popularity: f64) -> RawCastCredit {
    RawCastCredit {
        id,
        name: name.to_string(),
        profile_path: None,
        popularity: Some(popularity),
        character: Some(character.to_string()),
    }
}

pub fn crew(id: u64, name: &str, job: &str, department: &str) -> RawCrewCredit {
    RawCrewCredit {
        id,
        name: name.to_string(),
        profile_path: None,
        popularity: None,
        job: Some(job.to_string()),
        department: Some(department.to_string()),
    }
}

pub fn title_credits(cast: Vec<RawCastCredit>, crew: Vec<RawCrewCredit>) -> RawTitleCredits {
    RawTitleCredits { cast, crew }
}

pub fn movie_role(id: u64, title: &str, date: &str, character: &str) -> RawPersonCastCredit {
    RawPersonCastCredit {
        id,
        title: Some(title.to_string()),
        release_date: Some(date.to_string()),
        popularity: Some(1.0),
        poster_path: None,
        character: Some(character.to_string()),
    }
}

pub fn movie_job(id: u64, title: &str, date: &str, job: &str) -> RawPersonCrewCredit {
    RawPersonCrewCredit {
        id,
        title: Some(title.to_string()),
        release_date: Some(date.to_string()),
        popularity: Some(1.0),
        poster_path: None,
        job: Some(job.to_string()),
        department: Some("Directing".to_string()),
    }
}

pub fn movie_credits(cast: Vec<RawPersonCastCredit>, crew: Vec<RawPersonCrewCredit>) -> RawPersonCredits {
    RawPersonCredits {
        movie: RawCreditList { cast, crew },
        tv: RawCreditList::default(),
    }
}
