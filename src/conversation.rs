use std::collections::BTreeMap;

use crate::client::SentimentClassifier;
use crate::error::Result;
use crate::log_store::LogStore;
use crate::mood::classify;
use crate::tables::{self, RandomSource, WebActivity};
use crate::types::{Energy, Mood, MoodRecord, Social};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum QuestionKey {
    Mood,
    Energy,
    Social,
}

#[derive(Debug, PartialEq)]
pub(crate) enum QuestionKind {
    Text,
    Select(&'static [&'static str]),
}

#[derive(Debug, PartialEq)]
pub(crate) struct Question {
    pub key: QuestionKey,
    pub text: &'static str,
    pub kind: QuestionKind,
}

pub(crate) static QUESTIONS: [Question; 3] = [
    Question {
        key: QuestionKey::Mood,
        text: "How are you feeling today? 🌼",
        kind: QuestionKind::Text,
    },
    Question {
        key: QuestionKey::Energy,
        text: "How is your energy right now? (Low/Medium/High)",
        kind: QuestionKind::Select(&["Low", "Medium", "High"]),
    },
    Question {
        key: QuestionKey::Social,
        text: "Do you feel like being social or solo?",
        kind: QuestionKind::Select(&["Social", "Solo", "Either"]),
    },
];

impl Question {
    /// Canonical form of `raw`, or `None` when it does not answer the question.
    /// Select questions take an option name or its 1-based number.
    pub(crate) fn accept(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match self.kind {
            QuestionKind::Text => Some(raw.to_string()),
            QuestionKind::Select(options) => options
                .iter()
                .enumerate()
                .find(|(i, option)| {
                    option.eq_ignore_ascii_case(raw) || raw.parse::<usize>() == Ok(i + 1)
                })
                .map(|(_, option)| option.to_string()),
        }
    }
}

/// Everything shown on the results screen. Computed once per analysis.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Outcome {
    pub text: String,
    pub mood: Mood,
    pub polarity: f64,
    pub tip: &'static str,
    pub activity: &'static str,
    pub web: WebActivity,
    pub quote: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum State {
    Asking(usize),
    Summary,
    Results(Box<Outcome>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Action {
    Answer(String),
    Proceed,
    /// Render the current state again without side effects.
    Show,
    Surprise,
    Restart,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Reply {
    Ask {
        question: &'static Question,
        progress: u8,
    },
    Warning(String),
    Summary {
        answers: Vec<(&'static Question, String)>,
        progress: u8,
    },
    Results {
        outcome: Box<Outcome>,
        /// Set when the analysis could not be written to the log.
        notice: Option<String>,
    },
    Surprise(&'static str),
    NotNow(&'static str),
}

/// What a transition may touch besides the session itself.
pub(crate) struct Services<'a> {
    pub classifier: &'a dyn SentimentClassifier,
    pub store: &'a LogStore,
    pub rng: &'a mut dyn RandomSource,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Session {
    state: State,
    answers: BTreeMap<QuestionKey, String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: State::Asking(0),
            answers: BTreeMap::new(),
        }
    }
}

impl Session {
    pub(crate) fn state(&self) -> &State {
        &self.state
    }

    /// Share of the intake done, in percent.
    pub(crate) fn progress(&self) -> u8 {
        let total = QUESTIONS.len() + 1;
        let step = match self.state {
            State::Asking(i) => i,
            State::Summary => QUESTIONS.len(),
            State::Results(_) => total,
        };
        (step * 100 / total) as u8
    }

    /// On error the session is left as it was.
    pub(crate) fn apply(&mut self, action: Action, services: &mut Services<'_>) -> Result<Reply> {
        match action {
            Action::Answer(raw) => match self.state {
                State::Asking(i) => Ok(self.record_answer(i, &raw)),
                _ => Ok(self.not_now()),
            },
            Action::Proceed => match self.state {
                State::Summary => self.analyze(services),
                _ => Ok(self.not_now()),
            },
            Action::Surprise => match self.state {
                State::Results(_) => Ok(Reply::Surprise(tables::random_activity(services.rng))),
                _ => Ok(self.not_now()),
            },
            Action::Restart => match self.state {
                State::Results(_) => {
                    *self = Self::default();
                    Ok(self.render())
                }
                _ => Ok(self.not_now()),
            },
            Action::Show => Ok(self.render()),
        }
    }

    fn record_answer(&mut self, i: usize, raw: &str) -> Reply {
        let question = &QUESTIONS[i];
        let Some(answer) = question.accept(raw) else {
            return Reply::Warning(match question.kind {
                QuestionKind::Text => "Please answer before continuing.".to_string(),
                QuestionKind::Select(options) => {
                    format!("Please choose one of: {}", options.join(", "))
                }
            });
        };
        self.answers.insert(question.key, answer);
        self.state = if i + 1 < QUESTIONS.len() {
            State::Asking(i + 1)
        } else {
            State::Summary
        };
        self.render()
    }

    fn not_now(&self) -> Reply {
        Reply::NotNow(match self.state {
            State::Asking(_) => "Answer the question first.",
            State::Summary => "Confirm your answers to see suggestions.",
            State::Results(_) => "Use #surprise, #restart or #exit.",
        })
    }

    fn render(&self) -> Reply {
        match &self.state {
            State::Asking(i) => Reply::Ask {
                question: &QUESTIONS[*i],
                progress: self.progress(),
            },
            State::Summary => Reply::Summary {
                answers: QUESTIONS
                    .iter()
                    .map(|q| (q, self.answers.get(&q.key).cloned().unwrap_or_default()))
                    .collect(),
                progress: self.progress(),
            },
            State::Results(outcome) => Reply::Results {
                outcome: outcome.clone(),
                notice: None,
            },
        }
    }

    fn answer(&self, key: QuestionKey) -> &str {
        self.answers.get(&key).map(String::as_str).unwrap_or_default()
    }

    fn reask(&mut self, key: QuestionKey, message: String) -> Reply {
        let index = QUESTIONS.iter().position(|q| q.key == key).unwrap_or(0);
        self.answers.remove(&key);
        self.state = State::Asking(index);
        Reply::Warning(message)
    }

    /// Entering `Results`: classify, pick suggestions, append to the log.
    fn analyze(&mut self, services: &mut Services<'_>) -> Result<Reply> {
        let text = self.answer(QuestionKey::Mood).to_string();
        if text.is_empty() {
            return Ok(self.reask(QuestionKey::Mood, "Please answer before continuing.".into()));
        }
        let energy = match self.answer(QuestionKey::Energy).parse::<Energy>() {
            Ok(energy) => energy,
            Err(e) => return Ok(self.reask(QuestionKey::Energy, e)),
        };
        let social = match self.answer(QuestionKey::Social).parse::<Social>() {
            Ok(social) => social,
            Err(e) => return Ok(self.reask(QuestionKey::Social, e)),
        };

        let (mood, polarity) = classify(services.classifier, &text)?;

        let outcome = Box::new(Outcome {
            tip: tables::tip(mood, services.rng),
            activity: tables::activity(mood, energy, social),
            web: tables::web_activity(mood, energy, social),
            quote: tables::random_quote(services.rng),
            text: text.clone(),
            mood,
            polarity,
        });

        let notice = match services.store.append(MoodRecord::now(text, mood, polarity)) {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(error = %err, "could not save mood record");
                Some(format!("This mood was not saved: {}", err))
            }
        };

        self.state = State::Results(outcome.clone());
        Ok(Reply::Results { outcome, notice })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::client::fake::FixedClassifier;
    use crate::error::CompanionError;
    use crate::tables::fake::SequenceRandom;

    struct Harness {
        _dir: TempDir,
        store: LogStore,
        classifier: FixedClassifier,
        rng: SequenceRandom,
        session: Session,
    }

    impl Harness {
        fn new(classifier: FixedClassifier) -> Self {
            let dir = TempDir::new().unwrap();
            let store = LogStore::new(dir.path().join("mood_log.json"));
            Self {
                _dir: dir,
                store,
                classifier,
                rng: SequenceRandom::default(),
                session: Session::default(),
            }
        }

        fn apply(&mut self, action: Action) -> Result<Reply> {
            let mut services = Services {
                classifier: &self.classifier,
                store: &self.store,
                rng: &mut self.rng,
            };
            self.session.apply(action, &mut services)
        }

        fn answer(&mut self, raw: &str) -> Reply {
            self.apply(Action::Answer(raw.to_string())).unwrap()
        }

        fn intake(&mut self, mood: &str, energy: &str, social: &str) {
            self.answer(mood);
            self.answer(energy);
            self.answer(social);
        }

        fn results(&mut self) -> Box<Outcome> {
            match self.apply(Action::Proceed).unwrap() {
                Reply::Results { outcome, notice } => {
                    assert_eq!(notice, None);
                    outcome
                }
                other => panic!("expected results, got {other:?}"),
            }
        }
    }

    #[test]
    fn intake_walks_through_questions_to_summary() {
        let mut h = Harness::new(FixedClassifier::new("POSITIVE", 0.95));
        assert_eq!(h.session.progress(), 0);

        match h.answer("I love this sunny day") {
            Reply::Ask { question, progress } => {
                assert_eq!(question.key, QuestionKey::Energy);
                assert_eq!(progress, 25);
            }
            other => panic!("unexpected {other:?}"),
        }
        h.answer("high");
        match h.answer("2") {
            Reply::Summary { answers, progress } => {
                assert_eq!(progress, 75);
                let given: Vec<_> = answers.iter().map(|(_, a)| a.as_str()).collect();
                assert_eq!(given, vec!["I love this sunny day", "High", "Solo"]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(h.session.state(), &State::Summary);
        assert_eq!(h.classifier.calls.get(), 0);
    }

    #[test]
    fn empty_answer_keeps_question() {
        let mut h = Harness::new(FixedClassifier::new("POSITIVE", 0.95));
        h.answer("fine");
        assert!(matches!(h.answer("   "), Reply::Warning(_)));
        assert_eq!(h.session.state(), &State::Asking(1));
        assert!(!h.session.answers.contains_key(&QuestionKey::Energy));
        assert!(h.store.read_all().unwrap().is_empty());
    }

    #[test]
    fn unknown_option_keeps_question() {
        let mut h = Harness::new(FixedClassifier::new("POSITIVE", 0.95));
        h.answer("fine");
        assert!(matches!(h.answer("very"), Reply::Warning(_)));
        assert!(matches!(h.answer("4"), Reply::Warning(_)));
        assert_eq!(h.session.state(), &State::Asking(1));
    }

    #[test]
    fn sunny_day_scenario() {
        let mut h = Harness::new(FixedClassifier::new("POSITIVE", 0.95));
        h.intake("I love this sunny day", "High", "Social");
        let outcome = h.results();

        assert_eq!(outcome.mood, Mood::Positive);
        assert_eq!(outcome.polarity, 0.95);
        assert_eq!(outcome.activity, tables::PICNIC);
        assert_eq!(outcome.web, tables::GARDEN_TOUR);
        assert!(tables::tips(Mood::Positive).contains(&outcome.tip));
        assert!(tables::QUOTES.contains(&outcome.quote));

        let records = h.store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "I love this sunny day");
        assert_eq!(records[0].mood, Mood::Positive);
        assert_eq!(records[0].polarity, 0.95);
    }

    #[test]
    fn terrible_day_scenario() {
        let mut h = Harness::new(FixedClassifier::new("NEGATIVE", 0.88));
        h.intake("I feel terrible", "Low", "Either");
        let outcome = h.results();

        assert_eq!(outcome.mood, Mood::Negative);
        assert_eq!(outcome.polarity, -0.88);
        assert_eq!(outcome.activity, tables::YOGA);
        assert_eq!(outcome.web, tables::MEDITATION);
    }

    #[test]
    fn unsure_classifier_gives_neutral() {
        let mut h = Harness::new(FixedClassifier::new("POSITIVE", 0.5));
        h.intake("meh", "Medium", "Social");
        let outcome = h.results();

        assert_eq!(outcome.mood, Mood::Neutral);
        assert_eq!(outcome.polarity, 0.0);
        assert_eq!(outcome.activity, tables::TEA);
        assert_eq!(h.store.read_all().unwrap()[0].mood, Mood::Neutral);
    }

    #[test]
    fn showing_results_again_has_no_side_effects() {
        let mut h = Harness::new(FixedClassifier::new("POSITIVE", 0.95));
        h.intake("I love this sunny day", "High", "Social");
        let first = h.results();

        for _ in 0..3 {
            match h.apply(Action::Show).unwrap() {
                Reply::Results { outcome, .. } => assert_eq!(outcome, first),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(matches!(h.apply(Action::Proceed).unwrap(), Reply::NotNow(_)));
        assert_eq!(h.classifier.calls.get(), 1);
        assert_eq!(h.store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn unavailable_classifier_stays_in_summary() {
        let mut h = Harness::new(FixedClassifier::unavailable());
        h.intake("hello", "Low", "Solo");
        assert!(matches!(
            h.apply(Action::Proceed),
            Err(CompanionError::ClassifierUnavailable(_))
        ));
        assert_eq!(h.session.state(), &State::Summary);
        assert!(h.store.read_all().unwrap().is_empty());
    }

    #[test]
    fn failed_save_still_shows_results() {
        let mut h = Harness::new(FixedClassifier::new("NEGATIVE", 0.9));
        std::fs::write(h.store.path(), "[{").unwrap();
        h.intake("tired", "High", "Solo");
        match h.apply(Action::Proceed).unwrap() {
            Reply::Results { outcome, notice } => {
                assert_eq!(outcome.activity, tables::STROLL);
                assert!(notice.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn surprise_and_restart_only_from_results() {
        let mut h = Harness::new(FixedClassifier::new("POSITIVE", 0.95));
        assert!(matches!(h.apply(Action::Restart).unwrap(), Reply::NotNow(_)));
        assert!(matches!(h.apply(Action::Surprise).unwrap(), Reply::NotNow(_)));
        h.intake("great", "High", "Solo");
        assert!(matches!(h.apply(Action::Restart).unwrap(), Reply::NotNow(_)));
        h.results();

        match h.apply(Action::Surprise).unwrap() {
            Reply::Surprise(activity) => assert!(tables::SURPRISES.contains(&activity)),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(h.session.state(), State::Results(_)));

        match h.apply(Action::Restart).unwrap() {
            Reply::Ask { question, progress } => {
                assert_eq!(question.key, QuestionKey::Mood);
                assert_eq!(progress, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(h.session, Session::default());
        assert_eq!(h.store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn second_round_appends_second_record() {
        let mut h = Harness::new(FixedClassifier::new("POSITIVE", 0.95));
        h.intake("one", "High", "Social");
        h.results();
        h.apply(Action::Restart).unwrap();
        h.intake("two", "Low", "Solo");
        h.results();

        let texts: Vec<_> = h.store.read_all().unwrap().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(h.classifier.calls.get(), 2);
    }
}
