use std::fmt::Write as _;

use assess_core::model::{MemoryPairs, Question, SlotId};
use assess_core::phase::MemoryPhase;
use services::AttemptSnapshot;

/// Text shown for the current question.
pub fn question(question: &Question, snapshot: &AttemptSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}/{}] {}  ({}s left)",
        snapshot.index + 1,
        snapshot.progress.total,
        question.kind(),
        snapshot.attempt_remaining
    );
    if !question.prompt().is_empty() {
        let _ = writeln!(out, "{}", question.prompt());
    }

    if let Some(options) = question.options() {
        for (i, option) in options.iter().enumerate() {
            let _ = writeln!(out, "  {i}) {option}");
        }
    }
    if let Some(memory) = question.memory() {
        let recalling = snapshot.phase == Some(MemoryPhase::Recall);
        out.push_str(&pairs(memory, recalling));
        if recalling {
            let _ = writeln!(out, "  {} word(s) to recall", memory.slot_count());
        }
        if let Some(left) = snapshot.phase_remaining {
            let what = if recalling { "recall" } else { "memorize" };
            let _ = writeln!(out, "  ({what}: {left}s)");
        }
    }

    out.push_str(&controls(snapshot));
    out
}

/// One line describing which controls are enabled.
pub fn controls(snapshot: &AttemptSnapshot) -> String {
    let nav = snapshot.navigation;
    format!(
        "back: {}  forward: {} [{}]  answered {}/{}",
        if nav.can_go_back { "yes" } else { "no" },
        if nav.can_go_forward { "yes" } else { "no" },
        nav.label,
        snapshot.progress.answered,
        snapshot.progress.total
    )
}

fn pairs(memory: &MemoryPairs, recalling: bool) -> String {
    let mut out = String::new();
    for (p, words) in memory.pairs().iter().enumerate() {
        let shown: Vec<String> = words
            .iter()
            .enumerate()
            .map(|(w, word)| {
                let slot = SlotId::new(p, w);
                if recalling && memory.is_missing(slot) {
                    format!("____({slot})")
                } else {
                    word.clone()
                }
            })
            .collect();
        let _ = writeln!(out, "  {}", shown.join(" - "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    #[test]
    fn recall_hides_missing_words() {
        let missing = BTreeMap::from([(0, BTreeSet::from([1]))]);
        let memory =
            MemoryPairs::new(vec![vec!["salt".into(), "pepper".into()]], &missing, 10).unwrap();
        assert_eq!(pairs(&memory, false), "  salt - pepper\n");
        assert_eq!(pairs(&memory, true), "  salt - ____(0-1)\n");
    }
}
