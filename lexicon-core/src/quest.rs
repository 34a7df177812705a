//! Etymology quest: riddle rounds with level and score.
//!
//! A round moves through
//!
//! ```text
//! Idle ──begin_load──▶ Loading ──apply_loaded──▶ Presented ──submit──▶ Resolved
//!   ▲                     │                                              │
//!   └──── load failed ────┘◀──────────────────── next ───────────────────┘
//! ```
//!
//! Every `begin_load` issues a fresh [`QuestTicket`]. Only the reply for the
//! newest ticket is applied; a late reply for an older one is dropped so it
//! cannot overwrite the riddle, level or score of the round on screen.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::QuestId;

/// Vocabulary tier a quest is pitched at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Levels 1–3.
    Beginner,
    /// Levels 4–7.
    Intermediate,
    /// Level 8 and up.
    Advanced,
}

impl Difficulty {
    /// Tier for a quest level.
    #[must_use]
    pub fn from_level(level: u32) -> Self {
        match level {
            0..=3 => Self::Beginner,
            4..=7 => Self::Intermediate,
            _ => Self::Advanced,
        }
    }

    /// Label used in prompts and on screen.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An etymology riddle. Lives only for the round it was fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtymologyQuest {
    /// Quest identifier.
    pub id: QuestId,
    /// The "ancient tale" describing the word without naming it.
    pub riddle: String,
    /// Expected answer, trimmed and lowercased.
    pub answer: String,
    /// Level the quest was generated for.
    pub level: u32,
    /// Tier derived from `level`.
    pub difficulty: Difficulty,
    /// Set once the player has answered correctly.
    pub unlocked: bool,
}

impl EtymologyQuest {
    /// Build a quest, normalizing the answer.
    #[must_use]
    pub fn new(riddle: impl Into<String>, answer: &str, level: u32) -> Self {
        Self {
            id: QuestId::new(),
            riddle: riddle.into(),
            answer: normalize_answer(answer),
            level,
            difficulty: Difficulty::from_level(level),
            unlocked: false,
        }
    }

    /// Exact comparison of a player's answer against the expected one.
    #[must_use]
    pub fn is_correct(&self, attempt: &str) -> bool {
        normalize_answer(attempt) == self.answer
    }
}

/// Trim and lowercase an answer.
#[must_use]
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Sequence number for one quest-slot request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuestTicket(u64);

impl QuestTicket {
    /// The raw sequence number.
    #[must_use]
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// How a submitted answer was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Exact match.
    Correct,
    /// Anything else.
    Incorrect,
}

/// Result of judging an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgement {
    /// Correct or not.
    pub verdict: Verdict,
    /// The expected answer, revealed either way.
    pub answer: String,
    /// Points earned by this answer.
    pub points: u32,
    /// Score after this answer.
    pub score: u32,
}

/// Where the current round stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestState {
    /// No quest requested yet, or the last load failed.
    Idle,
    /// A quest request is in flight.
    Loading {
        /// The ticket whose reply will be accepted.
        ticket: QuestTicket,
    },
    /// A riddle awaits an answer.
    Presented {
        /// The riddle on screen.
        quest: EtymologyQuest,
    },
    /// The round has been answered.
    Resolved {
        /// The answered riddle.
        quest: EtymologyQuest,
        /// How it was judged.
        verdict: Verdict,
    },
}

/// What happened to a reply handed to [`QuestGame::apply_loaded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The quest is now presented.
    Applied,
    /// A newer request superseded this one; the reply was dropped.
    Stale,
}

/// The quest round state machine plus level and score.
#[derive(Debug, Clone)]
pub struct QuestGame {
    state: QuestState,
    level: u32,
    score: u32,
    points_per_level: u32,
    next_ticket: u64,
    level_up_pending: bool,
}

impl Default for QuestGame {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

impl QuestGame {
    /// Start a game at `level`, awarding `points_per_level × level` per win.
    #[must_use]
    pub fn new(level: u32, points_per_level: u32) -> Self {
        Self {
            state: QuestState::Idle,
            level: level.max(1),
            score: 0,
            points_per_level,
            next_ticket: 0,
            level_up_pending: false,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &QuestState {
        &self.state
    }

    /// Current level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// The quest on screen, presented or resolved.
    #[must_use]
    pub fn current_quest(&self) -> Option<&EtymologyQuest> {
        match &self.state {
            QuestState::Presented { quest } | QuestState::Resolved { quest, .. } => Some(quest),
            QuestState::Idle | QuestState::Loading { .. } => None,
        }
    }

    /// Whether `ticket` is the newest one issued and still awaited.
    #[must_use]
    pub fn is_current(&self, ticket: QuestTicket) -> bool {
        matches!(self.state, QuestState::Loading { ticket: t } if t == ticket)
    }

    /// Enter `Loading` and issue a ticket for the request about to be sent.
    ///
    /// Any reply still in flight for an earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> QuestTicket {
        self.next_ticket += 1;
        let ticket = QuestTicket(self.next_ticket);
        self.state = QuestState::Loading { ticket };
        debug!(ticket = ticket.0, level = self.level, "Quest load started");
        ticket
    }

    /// Present `quest` if `ticket` is still the newest request.
    pub fn apply_loaded(&mut self, ticket: QuestTicket, quest: EtymologyQuest) -> LoadOutcome {
        if !self.is_current(ticket) {
            debug!(ticket = ticket.0, latest = self.next_ticket, "Stale quest reply dropped");
            return LoadOutcome::Stale;
        }
        info!(quest = %quest.id, level = quest.level, difficulty = %quest.difficulty, "Quest presented");
        self.state = QuestState::Presented { quest };
        LoadOutcome::Applied
    }

    /// Record that the request for `ticket` failed.
    ///
    /// Returns the game to `Idle` if the ticket is current; a failure for a
    /// superseded ticket is ignored and reported as [`LoadOutcome::Stale`].
    pub fn fail_load(&mut self, ticket: QuestTicket) -> LoadOutcome {
        if !self.is_current(ticket) {
            return LoadOutcome::Stale;
        }
        self.state = QuestState::Idle;
        LoadOutcome::Applied
    }

    /// Judge an answer to the presented quest.
    ///
    /// Returns `None` when no quest is awaiting an answer or the attempt is
    /// blank. A correct answer adds `level × points_per_level` to the score
    /// and schedules a level-up for the next round.
    pub fn submit(&mut self, attempt: &str) -> Option<Judgement> {
        if attempt.trim().is_empty() {
            return None;
        }
        let QuestState::Presented { quest } = &self.state else {
            return None;
        };

        let mut quest = quest.clone();
        let (verdict, points) = if quest.is_correct(attempt) {
            quest.unlocked = true;
            (Verdict::Correct, self.level.saturating_mul(self.points_per_level))
        } else {
            (Verdict::Incorrect, 0)
        };

        self.score = self.score.saturating_add(points);
        self.level_up_pending = verdict == Verdict::Correct;
        info!(?verdict, points, score = self.score, level = self.level, "Quest answered");

        let answer = quest.answer.clone();
        self.state = QuestState::Resolved { quest, verdict };
        Some(Judgement {
            verdict,
            answer,
            points,
            score: self.score,
        })
    }

    /// Move on: apply a pending level-up, then start loading the next quest.
    pub fn next(&mut self) -> QuestTicket {
        if std::mem::take(&mut self.level_up_pending) {
            self.level = self.level.saturating_add(1);
            info!(level = self.level, "Level up");
        }
        self.begin_load()
    }

    /// Jump to `level` and start loading a quest for it.
    pub fn set_level(&mut self, level: u32) -> QuestTicket {
        self.level = level.max(1);
        self.level_up_pending = false;
        self.begin_load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presented(game: &mut QuestGame, answer: &str) {
        let ticket = game.begin_load();
        let quest = EtymologyQuest::new("A tale of happy accidents", answer, game.level());
        assert_eq!(game.apply_loaded(ticket, quest), LoadOutcome::Applied);
    }

    #[test]
    fn difficulty_tiers() {
        assert_eq!(Difficulty::from_level(1), Difficulty::Beginner);
        assert_eq!(Difficulty::from_level(3), Difficulty::Beginner);
        assert_eq!(Difficulty::from_level(4), Difficulty::Intermediate);
        assert_eq!(Difficulty::from_level(7), Difficulty::Intermediate);
        assert_eq!(Difficulty::from_level(8), Difficulty::Advanced);
    }

    #[test]
    fn answer_is_normalized_on_creation() {
        let quest = EtymologyQuest::new("riddle", "  Serendipity ", 1);
        assert_eq!(quest.answer, "serendipity");
    }

    #[test]
    fn trailing_space_and_case_are_forgiven() {
        let mut game = QuestGame::default();
        presented(&mut game, "serendipity");

        let judgement = game.submit("Serendipity ").expect("judged");
        assert_eq!(judgement.verdict, Verdict::Correct);
        assert_eq!(judgement.points, 10);
        assert_eq!(game.score(), 10);
        assert!(game.current_quest().expect("quest").unlocked);
    }

    #[test]
    fn no_partial_credit() {
        let mut game = QuestGame::default();
        presented(&mut game, "serendipity");

        let judgement = game.submit("serendipitous").expect("judged");
        assert_eq!(judgement.verdict, Verdict::Incorrect);
        assert_eq!(judgement.answer, "serendipity");
        assert_eq!(game.score(), 0);

        game.next();
        assert_eq!(game.level(), 1, "level unchanged after a miss");
    }

    #[test]
    fn correct_answer_levels_up_on_next() {
        let mut game = QuestGame::new(3, 10);
        presented(&mut game, "quarantine");
        game.submit("quarantine").expect("judged");
        assert_eq!(game.score(), 30);
        assert_eq!(game.level(), 3, "level advances only on the next load");

        game.next();
        assert_eq!(game.level(), 4);
        assert!(matches!(game.state(), QuestState::Loading { .. }));
    }

    #[test]
    fn blank_or_unprompted_submissions_are_ignored() {
        let mut game = QuestGame::default();
        assert!(game.submit("anything").is_none(), "nothing presented yet");

        presented(&mut game, "salary");
        assert!(game.submit("   ").is_none());
        assert!(matches!(game.state(), QuestState::Presented { .. }));

        game.submit("salary").expect("judged");
        assert!(game.submit("salary").is_none(), "already resolved");
        assert_eq!(game.score(), 10);
    }

    #[test]
    fn stale_reply_is_discarded() {
        let mut game = QuestGame::new(2, 10);
        let old = game.begin_load();
        let new = game.set_level(5);

        let fresh = EtymologyQuest::new("fresh riddle", "sabotage", 5);
        assert_eq!(game.apply_loaded(new, fresh.clone()), LoadOutcome::Applied);

        let late = EtymologyQuest::new("late riddle", "salary", 2);
        assert_eq!(game.apply_loaded(old, late), LoadOutcome::Stale);

        assert_eq!(game.current_quest(), Some(&fresh));
        assert_eq!(game.level(), 5);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn failed_load_returns_to_idle_only_when_current() {
        let mut game = QuestGame::default();
        let old = game.begin_load();
        let new = game.begin_load();

        assert_eq!(game.fail_load(old), LoadOutcome::Stale);
        assert!(game.is_current(new));
        assert_eq!(game.fail_load(new), LoadOutcome::Applied);
        assert_eq!(game.state(), &QuestState::Idle);
    }

    #[test]
    fn tickets_increase_monotonically() {
        let mut game = QuestGame::default();
        let a = game.begin_load();
        let b = game.next();
        let c = game.set_level(9);
        assert!(a < b && b < c);
        assert_eq!(c.sequence(), 3);
    }

    #[test]
    fn huge_level_saturates_score_and_level() {
        let mut game = QuestGame::new(1, 10);
        game.set_level(u32::MAX);
        presented(&mut game, "salary");

        let judgement = game.submit("salary").expect("judged");
        assert_eq!(judgement.points, u32::MAX);
        assert_eq!(game.score(), u32::MAX);

        game.next();
        assert_eq!(game.level(), u32::MAX);
    }
}
