//! Client-held session state: the per-challenge state machine, per-guess
//! feedback coloring, and the persisted snapshot for daily-mode resume.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::challenge::Challenge;
use crate::guess::Guess;

/// Lifecycle of one puzzle session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Challenge fetch in flight; no guesses accepted.
    Loading,
    /// Challenge ready, board editable.
    Playing,
    /// A valid guess hit the optimum. Terminal.
    Won,
    /// Guess budget exhausted or the player gave up. Terminal.
    Lost,
}

impl SessionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Won | SessionStatus::Lost)
    }
}

/// Feedback color for one guessed hub against the canonical route.
/// Cosmetic only; win/loss is governed solely by the distance gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HubFeedback {
    /// Right hub in the right position.
    Exact,
    /// Hub appears in the canonical route at another position.
    Present,
    Miss,
}

/// Color a guessed hub sequence against the canonical hubs.
///
/// Two passes: exact positional matches first, then any remaining guessed hub
/// may claim any remaining unmatched canonical hub. Each canonical hub is
/// claimed at most once.
#[must_use]
pub fn score_feedback(guessed: &[String], canonical: &[String]) -> Vec<HubFeedback> {
    let mut feedback = vec![HubFeedback::Miss; guessed.len()];
    let mut claimed = vec![false; canonical.len()];

    for (i, hub) in guessed.iter().enumerate() {
        if canonical.get(i) == Some(hub) {
            feedback[i] = HubFeedback::Exact;
            claimed[i] = true;
        }
    }
    for (i, hub) in guessed.iter().enumerate() {
        if feedback[i] == HubFeedback::Exact {
            continue;
        }
        for (j, candidate) in canonical.iter().enumerate() {
            if !claimed[j] && candidate == hub {
                feedback[i] = HubFeedback::Present;
                claimed[j] = true;
                break;
            }
        }
    }
    feedback
}

/// Storage key for a persisted session: one entry per challenge per UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub challenge_id: String,
    pub date: NaiveDate,
}

impl SessionKey {
    #[must_use]
    pub fn new(challenge_id: &str, date: NaiveDate) -> Self {
        Self {
            challenge_id: challenge_id.to_string(),
            date,
        }
    }

    /// Flat key for string-keyed stores (browser local storage and the like).
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("layover:{}:{}", self.challenge_id, self.date)
    }
}

/// What survives a reload: the valid guesses so far plus whatever the player
/// had typed into the hub input boxes. Daily mode only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub guesses: Vec<Guess>,
    #[serde(default)]
    pub hub_inputs: Vec<String>,
}

/// Per-challenge player progress.
///
/// Only valid guesses are recorded and counted; invalid ones surface their
/// error and leave the machine untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    status: SessionStatus,
    challenge: Option<Challenge>,
    guesses: Vec<Guess>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Fresh session awaiting its challenge.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Loading,
            challenge: None,
            guesses: Vec::new(),
        }
    }

    /// Enter `Playing` once the challenge fetch completes.
    pub fn challenge_ready(&mut self, challenge: Challenge) {
        self.challenge = Some(challenge);
        self.guesses.clear();
        self.status = SessionStatus::Playing;
    }

    /// Rebuild a daily session from a persisted snapshot, replaying the
    /// recorded guesses so the status lands where the player left off.
    #[must_use]
    pub fn restore(challenge: Challenge, snapshot: &SessionSnapshot) -> Self {
        let mut session = Self::new();
        session.challenge_ready(challenge);
        for guess in &snapshot.guesses {
            session.record_guess(guess.clone());
        }
        session
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    /// Valid guesses recorded so far, in submission order.
    #[must_use]
    pub fn guesses(&self) -> &[Guess] {
        &self.guesses
    }

    #[must_use]
    pub fn guesses_remaining(&self) -> u8 {
        let budget = self
            .challenge
            .as_ref()
            .map_or(0, |challenge| challenge.max_guesses);
        budget.saturating_sub(u8::try_from(self.guesses.len()).unwrap_or(u8::MAX))
    }

    /// Record one validated guess and advance the machine.
    ///
    /// Invalid guesses and guesses arriving outside `Playing` leave the state
    /// unchanged; the returned status reflects whatever the machine is in.
    pub fn record_guess(&mut self, guess: Guess) -> SessionStatus {
        if self.status != SessionStatus::Playing || !guess.is_valid {
            return self.status;
        }
        let winning = guess.is_winning();
        self.guesses.push(guess);
        if winning {
            self.status = SessionStatus::Won;
        } else if self.guesses_remaining() == 0 {
            self.status = SessionStatus::Lost;
        }
        self.status
    }

    /// Concede the current puzzle. Practice mode only; daily puzzles must be
    /// played out or abandoned to the day rollover.
    pub fn give_up(&mut self) -> SessionStatus {
        let practice = self
            .challenge
            .as_ref()
            .is_some_and(|challenge| !challenge.mode.is_daily());
        if practice && self.status == SessionStatus::Playing {
            self.status = SessionStatus::Lost;
        }
        self.status
    }

    /// Feedback coloring for one guess against the canonical route.
    #[must_use]
    pub fn feedback_for(&self, guess: &Guess) -> Vec<HubFeedback> {
        match &self.challenge {
            Some(challenge) => score_feedback(&guess.hubs, challenge.canonical_hubs()),
            None => vec![HubFeedback::Miss; guess.hubs.len()],
        }
    }

    /// Snapshot for persistence, carrying the current hub input boxes along.
    #[must_use]
    pub fn snapshot(&self, hub_inputs: Vec<String>) -> SessionSnapshot {
        SessionSnapshot {
            guesses: self.guesses.clone(),
            hub_inputs,
        }
    }
}
