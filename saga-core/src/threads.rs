//! Dormant threads: queued future consequences awaiting a trigger.
//!
//! A thread is created by narrator command, lives in the active set, and is
//! removed exactly once when surfaced. Trigger keywords are extracted once
//! at creation and never change; matching against player input is read-only
//! and only ever returns hints for the narrator to act on.

use crate::keywords::{self, MAX_CACHED_KEYWORDS, MIN_KEYWORD_OVERLAP};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Unique identifier for a dormant thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(Uuid);

impl ThreadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How hard a consequence lands when it surfaces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Severity {
    Minor,
    Moderate,
    Major,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Minor => "Minor",
            Severity::Moderate => "Moderate",
            Severity::Major => "Major",
        }
    }

    /// Parse from a command-surface string (case-insensitive).
    pub fn parse(s: &str) -> Option<Severity> {
        match s.trim().to_lowercase().as_str() {
            "minor" => Some(Severity::Minor),
            "moderate" => Some(Severity::Moderate),
            "major" => Some(Severity::Major),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A queued future consequence. Immutable after creation except removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DormantThread {
    pub id: ThreadId,

    /// Where this thread came from (the deed that seeded it).
    pub origin: String,

    /// Human-readable trigger condition, for the narrator's eyes.
    pub trigger_condition: String,

    /// What happens when the thread surfaces.
    pub consequence: String,

    pub severity: Severity,

    /// Session the thread was queued in.
    pub created_session: u32,

    /// Keywords extracted from the trigger condition at creation.
    pub trigger_keywords: Vec<String>,
}

impl DormantThread {
    pub fn new(
        origin: impl Into<String>,
        trigger_condition: impl Into<String>,
        consequence: impl Into<String>,
        severity: Severity,
        created_session: u32,
    ) -> Self {
        let trigger_condition = trigger_condition.into();
        let trigger_keywords = keywords::extract_capped(&trigger_condition, MAX_CACHED_KEYWORDS);
        Self {
            id: ThreadId::new(),
            origin: origin.into(),
            trigger_condition,
            consequence: consequence.into(),
            severity,
            created_session,
            trigger_keywords,
        }
    }
}

/// A candidate trigger match against player input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMatch {
    pub thread_id: ThreadId,
    pub severity: Severity,
    /// |overlap| / |thread keywords|, in (0, 1].
    pub score: f32,
    pub matched_keywords: Vec<String>,
    /// The consequence text, so the narrator can weigh the hint.
    pub consequence: String,
}

/// The set of active dormant threads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadRegistry {
    active: Vec<DormantThread>,
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a new thread into the active set.
    pub fn queue(
        &mut self,
        origin: impl Into<String>,
        trigger_condition: impl Into<String>,
        consequence: impl Into<String>,
        severity: Severity,
        session: u32,
    ) -> &DormantThread {
        let thread = DormantThread::new(origin, trigger_condition, consequence, severity, session);
        self.active.push(thread);
        self.active.last().expect("thread just pushed")
    }

    /// Add an already-built thread (used by demand escalation).
    pub fn queue_thread(&mut self, thread: DormantThread) -> &DormantThread {
        self.active.push(thread);
        self.active.last().expect("thread just pushed")
    }

    /// Match player input against every active thread. Read-only.
    ///
    /// A thread is reported only when at least `MIN_KEYWORD_OVERLAP` of its
    /// cached keywords appear in the input. Results are sorted by score
    /// descending, severity (Major first) breaking ties.
    pub fn check_triggers(&self, player_input: &str) -> Vec<ThreadMatch> {
        let input_keywords = keywords::extract(player_input);
        let mut matches: Vec<ThreadMatch> = self
            .active
            .iter()
            .filter_map(|thread| {
                let matched = keywords::overlap(&thread.trigger_keywords, &input_keywords);
                if matched.len() < MIN_KEYWORD_OVERLAP {
                    return None;
                }
                let score = matched.len() as f32 / thread.trigger_keywords.len() as f32;
                Some(ThreadMatch {
                    thread_id: thread.id,
                    severity: thread.severity,
                    score,
                    matched_keywords: matched,
                    consequence: thread.consequence.clone(),
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(b.severity.cmp(&a.severity))
        });
        matches
    }

    /// Remove a thread from the active set, exactly once.
    ///
    /// A repeat call for the same id finds nothing and returns `None`; the
    /// active set is unaffected.
    pub fn surface(&mut self, id: ThreadId) -> Option<DormantThread> {
        let index = self.active.iter().position(|t| t.id == id)?;
        Some(self.active.remove(index))
    }

    pub fn get(&self, id: ThreadId) -> Option<&DormantThread> {
        self.active.iter().find(|t| t.id == id)
    }

    /// All active threads, oldest first.
    pub fn active(&self) -> &[DormantThread] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
