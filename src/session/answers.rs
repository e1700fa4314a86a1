use std::collections::BTreeMap;

use crate::models::{Question, QuestionId};

/// Question id to chosen option index, kept in step with each question's
/// `submitted_answer`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerBook {
    choices: BTreeMap<QuestionId, usize>,
}

impl AnswerBook {
    /// Records a choice. Returns `false` if it was already recorded.
    pub fn record(&mut self, question_id: QuestionId, choice: usize) -> bool {
        self.choices.insert(question_id, choice) != Some(choice)
    }

    pub fn get(&self, question_id: QuestionId) -> Option<usize> {
        self.choices.get(&question_id).copied()
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn clear(&mut self) {
        self.choices.clear();
    }

    /// Rebuilds the book from freshly fetched questions.
    pub fn rebuild_from(&mut self, questions: &[Question]) {
        self.choices = questions
            .iter()
            .filter_map(|q| q.submitted_answer.map(|a| (q.id, a.choice_index)))
            .collect();
    }

    /// True when every question's `submitted_answer` matches the book.
    pub fn agrees_with(&self, questions: &[Question]) -> bool {
        let answered = questions.iter().filter(|q| q.submitted_answer.is_some()).count();
        answered == self.choices.len()
            && questions
                .iter()
                .all(|q| q.submitted_answer.map(|a| a.choice_index) == self.get(q.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmittedAnswer;
    use chrono::Utc;

    fn question(id: QuestionId, answer: Option<usize>) -> Question {
        Question {
            id,
            text: format!("Q{id}"),
            options: vec!["a".into(), "b".into(), "c".into()],
            marks: None,
            topic: None,
            submitted_answer: answer.map(|choice_index| SubmittedAnswer {
                choice_index,
                answered_at: Utc::now(),
            }),
        }
    }

    #[test]
    fn test_record_same_choice_twice_is_noop() {
        let mut book = AnswerBook::default();
        assert!(book.record(1, 2));
        let before = book.clone();
        assert!(!book.record(1, 2));
        assert_eq!(book, before);

        assert!(book.record(1, 0));
        assert_eq!(book.get(1), Some(0));
    }

    #[test]
    fn test_rebuild_drops_stale_entries() {
        let mut book = AnswerBook::default();
        book.record(99, 1);

        let questions = vec![question(1, Some(2)), question(2, None)];
        book.rebuild_from(&questions);

        assert_eq!(book.get(99), None);
        assert_eq!(book.get(1), Some(2));
        assert_eq!(book.len(), 1);
        assert!(book.agrees_with(&questions));
    }
}
