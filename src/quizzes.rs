//! Filtering and ordering of evaluated quizzes.

use std::cmp::Ordering;

use clap::ValueEnum;

use crate::models::EvaluatedQuiz;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortKey {
    #[default]
    Date,
    Marks,
    Course,
}

/// Natural order per key: newest first, highest marks first, course A-Z.
/// `ascending` flips it.
pub fn filter_and_sort(
    quizzes: &[EvaluatedQuiz],
    search: Option<&str>,
    key: SortKey,
    ascending: bool,
) -> Vec<EvaluatedQuiz> {
    let needle = search.map(str::to_lowercase).filter(|s| !s.is_empty());

    let mut selected: Vec<EvaluatedQuiz> = quizzes
        .iter()
        .filter(|q| match &needle {
            Some(needle) => {
                q.master_course_code.to_lowercase().contains(needle)
                    || q.quiz_uc.to_lowercase().contains(needle)
            }
            None => true,
        })
        .cloned()
        .collect();

    selected.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Date => b.logged_in_at().cmp(&a.logged_in_at()),
            SortKey::Marks => b
                .marks_obtained
                .partial_cmp(&a.marks_obtained)
                .unwrap_or(Ordering::Equal),
            SortKey::Course => a.master_course_code.cmp(&b.master_course_code),
        };
        if ascending { ordering.reverse() } else { ordering }
    });

    selected
}
