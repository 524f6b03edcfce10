// SPDX-License-Identifier: MIT

//! Client-side test attempt lifecycle.
//!
//! This module is the embeddable core of what the browser runs while a
//! user takes a test: the `not started -> in progress -> submitted` state
//! machine, the countdown timer, and persistence of in-progress answers
//! keyed by test id so a page reload resumes the same attempt.
//!
//! The server never sees mid-attempt state; it only receives the final
//! ordered answer list. Persisted attempt state is cleared only after the
//! submission has been confirmed successful, so a failed POST leaves the
//! answers recoverable for a retry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where an attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptPhase {
    NotStarted,
    InProgress,
    /// A submission has been handed off and is awaiting confirmation.
    Submitting,
    Submitted,
}

/// One answer in the final submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub question_id: i32,
    pub selected_option: String,
}

/// Snapshot persisted after every change, keyed by test id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAttempt {
    pub answers: HashMap<i32, String>,
    pub remaining_secs: u32,
}

/// Local persistence for in-progress attempts (localStorage in the
/// browser, in-memory in tests).
pub trait AttemptStore {
    fn save(&mut self, test_id: i32, state: &SavedAttempt);
    fn load(&self, test_id: i32) -> Option<SavedAttempt>;
    fn clear(&mut self, test_id: i32);
}

/// In-memory store used by tests and non-browser embeddings.
#[derive(Debug, Default)]
pub struct MemoryAttemptStore {
    entries: HashMap<i32, SavedAttempt>,
}

impl AttemptStore for MemoryAttemptStore {
    fn save(&mut self, test_id: i32, state: &SavedAttempt) {
        self.entries.insert(test_id, state.clone());
    }

    fn load(&self, test_id: i32) -> Option<SavedAttempt> {
        self.entries.get(&test_id).cloned()
    }

    fn clear(&mut self, test_id: i32) {
        self.entries.remove(&test_id);
    }
}

/// Outcome of one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// The countdown reached zero; the caller must submit now.
    Expired,
}

/// A single user's pass through one test's questions.
#[derive(Debug)]
pub struct TestAttempt {
    test_id: i32,
    /// Question ids in presentation order; fixes submission ordering.
    question_order: Vec<i32>,
    answers: HashMap<i32, String>,
    remaining_secs: u32,
    phase: AttemptPhase,
}

impl TestAttempt {
    /// Create an attempt that has not been started yet.
    pub fn new(test_id: i32, question_order: Vec<i32>, duration_secs: u32) -> Self {
        Self {
            test_id,
            question_order,
            answers: HashMap::new(),
            remaining_secs: duration_secs,
            phase: AttemptPhase::NotStarted,
        }
    }

    pub fn phase(&self) -> AttemptPhase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Begin the attempt, resuming a persisted one for this test id if
    /// the store has it (page-reload recovery).
    pub fn start(&mut self, store: &mut dyn AttemptStore) {
        if self.phase != AttemptPhase::NotStarted {
            return;
        }

        if let Some(saved) = store.load(self.test_id) {
            self.answers = saved.answers;
            self.remaining_secs = saved.remaining_secs;
            tracing::debug!(
                test_id = self.test_id,
                remaining_secs = self.remaining_secs,
                "Resumed persisted attempt"
            );
        }

        self.phase = AttemptPhase::InProgress;
        self.persist(store);
    }

    /// Record (or change) an answer and persist the new snapshot.
    pub fn select_answer(&mut self, store: &mut dyn AttemptStore, question_id: i32, option: &str) {
        if self.phase != AttemptPhase::InProgress {
            return;
        }

        self.answers.insert(question_id, option.to_string());
        self.persist(store);
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `Expired` exactly once, on the tick that reaches zero;
    /// further ticks at zero are inert.
    pub fn tick(&mut self, store: &mut dyn AttemptStore) -> TickOutcome {
        if self.phase != AttemptPhase::InProgress || self.remaining_secs == 0 {
            return TickOutcome::Running;
        }

        self.remaining_secs -= 1;
        self.persist(store);

        if self.remaining_secs == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running
        }
    }

    /// Freeze the attempt for submission and return the ordered answer
    /// list, or None when a submission is already in flight (the guard
    /// against the manual-submit / timer-expiry race) or the attempt is
    /// not in progress.
    pub fn begin_submission(&mut self) -> Option<Vec<AnswerSubmission>> {
        if self.phase != AttemptPhase::InProgress {
            return None;
        }

        self.phase = AttemptPhase::Submitting;

        Some(
            self.question_order
                .iter()
                .filter_map(|qid| {
                    self.answers.get(qid).map(|option| AnswerSubmission {
                        question_id: *qid,
                        selected_option: option.clone(),
                    })
                })
                .collect(),
        )
    }

    /// The POST succeeded; only now is the persisted snapshot dropped.
    pub fn confirm_submitted(&mut self, store: &mut dyn AttemptStore) {
        if self.phase != AttemptPhase::Submitting {
            return;
        }

        store.clear(self.test_id);
        self.phase = AttemptPhase::Submitted;
    }

    /// The POST failed; the attempt returns to in-progress with its
    /// persisted answers intact so the submission can be retried.
    pub fn submission_failed(&mut self) {
        if self.phase == AttemptPhase::Submitting {
            self.phase = AttemptPhase::InProgress;
        }
    }

    fn persist(&self, store: &mut dyn AttemptStore) {
        store.save(
            self.test_id,
            &SavedAttempt {
                answers: self.answers.clone(),
                remaining_secs: self.remaining_secs,
            },
        );
    }
}
