//! crates/study_assistant_core/src/analytics.rs
//!
//! Pure aggregation over a history of quiz results. Nothing here keeps state
//! between calls; every figure is re-derived from the slice it is given.

use crate::domain::QuizResult;
use chrono::{DateTime, Utc};

/// Topics averaging below this percentage are reported as weak.
pub const DEFAULT_WEAK_TOPIC_THRESHOLD: u32 = 60;

/// One point of the score-over-time series.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorePoint {
    pub date: DateTime<Utc>,
    pub score_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicAverage {
    pub topic: String,
    pub average_percent: u32,
    pub attempts: usize,
}

/// Everything the analytics view shows, for a non-empty history.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSummary {
    pub average_score_percent: f64,
    pub average_time_seconds: f64,
    pub total_quizzes: usize,
    pub timeline: Vec<ScorePoint>,
    pub topics: Vec<TopicAverage>,
    pub weak_topics: Vec<TopicAverage>,
}

/// Mean of each result's score percentage. `None` for an empty history.
pub fn average_score_percent(results: &[QuizResult]) -> Option<f64> {
    mean(results.iter().map(QuizResult::score_percent))
}

/// Mean time taken in seconds. `None` for an empty history.
pub fn average_time_seconds(results: &[QuizResult]) -> Option<f64> {
    mean(results.iter().map(|r| r.time_taken_secs as f64))
}

/// One rounded score percentage per result, in history order.
pub fn score_timeline(results: &[QuizResult]) -> Vec<ScorePoint> {
    results
        .iter()
        .map(|r| ScorePoint {
            date: r.date,
            score_percent: r.rounded_percent(),
        })
        .collect()
}

/// Average score per topic, in order of each topic's first appearance. The
/// unrounded percentages are averaged and the mean is rounded once.
pub fn topic_averages(results: &[QuizResult]) -> Vec<TopicAverage> {
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
    for result in results {
        match groups.iter_mut().find(|(topic, _)| *topic == result.topic) {
            Some((_, scores)) => scores.push(result.score_percent()),
            None => groups.push((result.topic.as_str(), vec![result.score_percent()])),
        }
    }

    groups
        .into_iter()
        .map(|(topic, scores)| TopicAverage {
            topic: topic.to_string(),
            attempts: scores.len(),
            average_percent: mean(scores.into_iter()).unwrap_or_default().round() as u32,
        })
        .collect()
}

/// Topics averaging strictly below `threshold`, weakest first. Equal averages
/// keep their original order.
pub fn weak_topics(topics: &[TopicAverage], threshold: u32) -> Vec<TopicAverage> {
    let mut weak: Vec<TopicAverage> = topics
        .iter()
        .filter(|t| t.average_percent < threshold)
        .cloned()
        .collect();
    weak.sort_by_key(|t| t.average_percent);
    weak
}

/// Builds the full summary. `None` when there is no history yet.
pub fn summarize(results: &[QuizResult], threshold: u32) -> Option<AnalyticsSummary> {
    let average_score_percent = average_score_percent(results)?;
    let average_time_seconds = average_time_seconds(results)?;
    let topics = topic_averages(results);
    let weak_topics = weak_topics(&topics, threshold);
    Some(AnalyticsSummary {
        average_score_percent,
        average_time_seconds,
        total_quizzes: results.len(),
        timeline: score_timeline(results),
        topics,
        weak_topics,
    })
}

/// Formats a duration in seconds as `Xm Ys`.
pub fn format_minutes_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}m {}s", total / 60, total % 60)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GradedAnswer, QuestionId, QuestionKind, QuizQuestion};
    use chrono::{Duration, TimeZone};

    fn result(topic: &str, score: u32, total: u32, secs: u64, day: i64) -> QuizResult {
        let answers = (0..total)
            .map(|i| GradedAnswer {
                question: QuizQuestion {
                    id: QuestionId(i as usize),
                    question: format!("Q{i}"),
                    kind: QuestionKind::TrueFalse,
                    answer: "True".to_string(),
                    explanation: String::new(),
                },
                user_answer: if i < score { "True" } else { "False" }.to_string(),
                is_correct: i < score,
            })
            .collect();
        QuizResult {
            topic: topic.to_string(),
            score,
            total_questions: total,
            time_taken_secs: secs,
            date: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::days(day),
            answers,
        }
    }

    fn topic(name: &str, average: u32) -> TopicAverage {
        TopicAverage {
            topic: name.to_string(),
            average_percent: average,
            attempts: 1,
        }
    }

    #[test]
    fn empty_history_has_no_averages() {
        assert_eq!(average_score_percent(&[]), None);
        assert_eq!(average_time_seconds(&[]), None);
        assert!(score_timeline(&[]).is_empty());
        assert!(topic_averages(&[]).is_empty());
        assert_eq!(summarize(&[], DEFAULT_WEAK_TOPIC_THRESHOLD), None);
    }

    #[test]
    fn average_score_is_mean_of_percentages() {
        let history = [result("A", 2, 5, 30, 0), result("B", 4, 4, 90, 1)];
        assert_eq!(average_score_percent(&history), Some(70.0));
        assert_eq!(average_time_seconds(&history), Some(60.0));
    }

    #[test]
    fn timeline_rounds_and_keeps_order() {
        let history = [result("A", 1, 3, 10, 2), result("A", 2, 3, 10, 0)];
        let timeline = score_timeline(&history);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].score_percent, 33);
        assert_eq!(timeline[1].score_percent, 67);
        assert!(timeline[0].date > timeline[1].date);
    }

    #[test]
    fn topics_group_by_first_appearance() {
        let history = [
            result("Graphs", 1, 2, 10, 0),
            result("Trees", 3, 3, 10, 1),
            result("Graphs", 2, 3, 10, 2),
        ];
        let topics = topic_averages(&history);
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].topic, "Graphs");
        // (50 + 66.67) / 2 = 58.33
        assert_eq!(topics[0].average_percent, 58);
        assert_eq!(topics[0].attempts, 2);
        assert_eq!(topics[1].topic, "Trees");
        assert_eq!(topics[1].average_percent, 100);
    }

    #[test]
    fn weak_topics_are_sorted_weakest_first() {
        let topics = [topic("A", 80), topic("B", 55), topic("C", 40), topic("D", 61)];
        let weak = weak_topics(&topics, 60);
        let names: Vec<&str> = weak.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(names, vec!["C", "B"]);
    }

    #[test]
    fn weak_topic_ties_keep_original_order() {
        let topics = [topic("X", 50), topic("Y", 20), topic("Z", 50)];
        let weak = weak_topics(&topics, 60);
        let names: Vec<&str> = weak.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(names, vec!["Y", "X", "Z"]);
    }

    #[test]
    fn threshold_is_exclusive() {
        let topics = [topic("Edge", 60)];
        assert!(weak_topics(&topics, 60).is_empty());
        assert_eq!(weak_topics(&topics, 61).len(), 1);
    }

    #[test]
    fn summary_is_recomputable() {
        let history = [result("A", 1, 4, 30, 0), result("B", 3, 4, 45, 1)];
        let first = summarize(&history, 60).unwrap();
        let second = summarize(&history, 60).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total_quizzes, 2);
        assert_eq!(first.weak_topics.len(), 1);
        assert_eq!(first.weak_topics[0].topic, "A");
    }

    #[test]
    fn durations_format_as_minutes_and_seconds() {
        assert_eq!(format_minutes_seconds(0.0), "0m 0s");
        assert_eq!(format_minutes_seconds(125.0), "2m 5s");
        assert_eq!(format_minutes_seconds(90.4), "1m 30s");
        assert_eq!(format_minutes_seconds(59.6), "1m 0s");
    }
}
