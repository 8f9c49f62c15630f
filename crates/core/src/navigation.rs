use std::fmt;

use crate::answers::is_answer_complete;
use crate::model::{Answer, Question, QuestionKind};
use crate::phase::MemoryPhase;

/// Text of the forward button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavLabel {
    Skip,
    Next,
    Finish,
    Ready,
}

impl fmt::Display for NavLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NavLabel::Skip => "Skip",
            NavLabel::Next => "Next",
            NavLabel::Finish => "Finish",
            NavLabel::Ready => "I'm Ready",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub label: NavLabel,
}

/// Where the question sits in the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavContext {
    pub index: usize,
    pub total: usize,
    /// Some earlier question can still be revisited. Passed memory questions never can.
    pub earlier_reachable: bool,
    pub requires_all_answered: bool,
    /// Every question that still counts is answered.
    pub attempt_complete: bool,
}

impl NavContext {
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.total
    }
}

/// Keys the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Enter,
    ArrowRight,
    ArrowLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Forward,
    Back,
}

impl NavKey {
    /// Parse a DOM-style key name (`Enter`, `ArrowRight`, `ArrowLeft`).
    #[must_use]
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "Enter" => Some(Self::Enter),
            "ArrowRight" => Some(Self::ArrowRight),
            "ArrowLeft" => Some(Self::ArrowLeft),
            _ => None,
        }
    }

    #[must_use]
    pub fn action(self) -> NavAction {
        match self {
            NavKey::Enter | NavKey::ArrowRight => NavAction::Forward,
            NavKey::ArrowLeft => NavAction::Back,
        }
    }
}

/// Decide which controls are enabled for the current question.
///
/// `phase` is only read for memory questions; `None` is treated as memorization.
#[must_use]
pub fn navigation_state(
    question: &Question,
    answer: Option<&Answer>,
    phase: Option<MemoryPhase>,
    ctx: NavContext,
) -> NavigationState {
    let complete = is_answer_complete(question, answer);
    let is_last = ctx.is_last();
    let finish_allowed = !ctx.requires_all_answered || ctx.attempt_complete;

    let can_go_back = question.kind() != QuestionKind::MemoryPair && ctx.earlier_reachable;

    let (can_go_forward, label) = match question.kind() {
        QuestionKind::MemoryPair => match phase.unwrap_or(MemoryPhase::Memorization) {
            MemoryPhase::Memorization => (true, NavLabel::Ready),
            MemoryPhase::Recall if is_last => (complete && finish_allowed, NavLabel::Finish),
            MemoryPhase::Recall => (complete, NavLabel::Next),
        },
        QuestionKind::MultipleChoice | QuestionKind::FillInGap => {
            if is_last {
                (finish_allowed, NavLabel::Finish)
            } else if complete {
                (true, NavLabel::Next)
            } else {
                (true, NavLabel::Skip)
            }
        }
    };

    NavigationState {
        can_go_back,
        can_go_forward,
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemoryPairs, QuestionId, SlotId};
    use std::collections::{BTreeMap, BTreeSet};

    fn ctx(index: usize, total: usize) -> NavContext {
        NavContext {
            index,
            total,
            earlier_reachable: index > 0,
            requires_all_answered: false,
            attempt_complete: false,
        }
    }

    fn gap() -> Question {
        Question::fill_in_gap(QuestionId::new(1), "I enjoy ___").unwrap()
    }

    fn memory() -> Question {
        let pairs = vec![vec!["red".to_string(), "rose".to_string()]];
        let missing = BTreeMap::from([(0, BTreeSet::from([1]))]);
        Question::memory_pair(
            QuestionId::new(9),
            "Remember",
            MemoryPairs::new(pairs, &missing, 10).unwrap(),
        )
    }

    #[test]
    fn unanswered_gap_can_be_skipped() {
        let nav = navigation_state(&gap(), None, None, ctx(1, 3));
        assert!(nav.can_go_back);
        assert!(nav.can_go_forward);
        assert_eq!(nav.label, NavLabel::Skip);
    }

    #[test]
    fn answered_gap_says_next_and_first_cannot_go_back() {
        let answer = Answer::Text { text: "eating".into() };
        let nav = navigation_state(&gap(), Some(&answer), None, ctx(0, 3));
        assert!(!nav.can_go_back);
        assert_eq!(nav.label, NavLabel::Next);
    }

    #[test]
    fn last_question_finishes_and_mixed_requires_everything() {
        let nav = navigation_state(&gap(), None, None, ctx(2, 3));
        assert_eq!(nav.label, NavLabel::Finish);
        assert!(nav.can_go_forward);

        let strict = NavContext {
            requires_all_answered: true,
            ..ctx(2, 3)
        };
        let nav = navigation_state(&gap(), None, None, strict);
        assert_eq!(nav.label, NavLabel::Finish);
        assert!(!nav.can_go_forward);

        let done = NavContext {
            attempt_complete: true,
            ..strict
        };
        assert!(navigation_state(&gap(), None, None, done).can_go_forward);
    }

    #[test]
    fn memory_question_never_goes_back() {
        let q = memory();
        let nav = navigation_state(&q, None, Some(MemoryPhase::Memorization), ctx(2, 4));
        assert!(!nav.can_go_back);
        assert!(nav.can_go_forward);
        assert_eq!(nav.label.to_string(), "I'm Ready");
    }

    #[test]
    fn recall_forward_waits_for_all_slots() {
        let q = memory();
        let nav = navigation_state(&q, None, Some(MemoryPhase::Recall), ctx(0, 2));
        assert!(!nav.can_go_forward);
        assert_eq!(nav.label, NavLabel::Next);

        let filled = Answer::Slots {
            values: BTreeMap::from([(SlotId::new(0, 1), "rose".to_string())]),
        };
        let nav = navigation_state(&q, Some(&filled), Some(MemoryPhase::Recall), ctx(0, 2));
        assert!(nav.can_go_forward);
    }

    #[test]
    fn nothing_reachable_behind_means_no_back() {
        let only_memory_behind = NavContext {
            earlier_reachable: false,
            ..ctx(1, 2)
        };
        assert!(!navigation_state(&gap(), None, None, only_memory_behind).can_go_back);
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(NavKey::from_key_name("Enter").map(NavKey::action), Some(NavAction::Forward));
        assert_eq!(NavKey::ArrowRight.action(), NavAction::Forward);
        assert_eq!(NavKey::ArrowLeft.action(), NavAction::Back);
        assert_eq!(NavKey::from_key_name("Escape"), None);
    }
}
