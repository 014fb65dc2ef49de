use rand::Rng as _;

use crate::types::{Energy, Mood, Social};

/// Source of "pick one of `n`" choices for the suggestion pools.
pub(crate) trait RandomSource {
    /// Returns an index in `0..n`. `n` is never zero.
    fn pick(&mut self, n: usize) -> usize;
}

pub(crate) struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&mut self, n: usize) -> usize {
        rand::thread_rng().gen_range(0..n)
    }
}

fn choose<'a>(rng: &mut dyn RandomSource, pool: &[&'a str]) -> &'a str {
    pool[rng.pick(pool.len()) % pool.len()]
}

static POSITIVE_TIPS: [&str; 3] = [
    "Keep that sunshine energy! Go outside and enjoy the breeze 🌿",
    "Celebrate your mood with a walk among flowers 🌷",
    "Share your joy with someone today!",
];

static NEGATIVE_TIPS: [&str; 3] = [
    "It’s okay to feel down. Try deep breathing outdoors 🍃",
    "Spring brings change — take a moment to reset 🌱",
    "Drink water, listen to birds, and be kind to yourself 🐦",
];

static NEUTRAL_TIPS: [&str; 3] = [
    "Find joy in small things today — maybe a flower or a breeze 🌼",
    "Balance is beautiful. Journal your thoughts.",
    "Try mindful tea time under the sun ☀️",
];

pub(crate) static PICNIC: &str = "Organize a picnic with friends in a park! 🍉🌳";
pub(crate) static NATURE_WALK: &str = "Go for a nature walk and take photos of flowers! 🌷📸";
pub(crate) static YOGA: &str = "Try gentle yoga or mindful breathing by an open window. 🧘‍♂️🌱";
pub(crate) static STROLL: &str = "Take a stroll and listen to the birds. 🐦";
pub(crate) static TEA: &str = "Invite a friend for tea outdoors. 🍵🌼";
pub(crate) static READING: &str = "Read a book under a tree or start a spring journal. 📖🌳";
pub(crate) static FALLBACK_ACTIVITY: &str =
    "Open your window, breathe in spring air, and notice something beautiful! 🌸";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WebActivity {
    pub label: &'static str,
    pub url: &'static str,
}

pub(crate) static GARDEN_TOUR: WebActivity = WebActivity {
    label: "Join a live virtual garden tour",
    url: "https://www.youtube.com/results?search_query=virtual+garden+tour",
};
pub(crate) static MEDITATION: WebActivity = WebActivity {
    label: "Try a guided meditation for spring renewal",
    url: "https://www.youtube.com/results?search_query=spring+guided+meditation",
};
pub(crate) static SCENERY: WebActivity = WebActivity {
    label: "Watch relaxing spring scenery",
    url: "https://www.youtube.com/results?search_query=spring+relaxing+scenery",
};
pub(crate) static ONLINE_EVENT: WebActivity = WebActivity {
    label: "Join a spring-themed online event",
    url: "https://www.eventbrite.com/d/online/spring/",
};
pub(crate) static FLOWER_GARDEN: WebActivity = WebActivity {
    label: "Explore a virtual flower garden",
    url: "https://artsandculture.google.com/project/flowers",
};

pub(crate) static QUOTES: [&str; 8] = [
    "Spring: a lovely reminder of how beautiful change can truly be.",
    "Where flowers bloom, so does hope. – Lady Bird Johnson",
    "No matter how long the winter, spring is sure to follow.",
    "The earth laughs in flowers. – Ralph Waldo Emerson",
    "Spring adds new life and new beauty to all that is. – Jessica Harrelson",
    "Blossom by blossom the spring begins. – Algernon Charles Swinburne",
    "Every spring is the only spring, a perpetual astonishment. – Ellis Peters",
    "If we had no winter, the spring would not be so pleasant. – Anne Bradstreet",
];

pub(crate) static SURPRISES: [&str; 9] = [
    "Paint or draw a spring scene! 🎨",
    "Try a new herbal tea and sip it outside. 🍵",
    "Make a flower crown from wildflowers. 🌼",
    "Write a poem about spring. ✍️",
    "Plant a seed and watch it grow. 🌱",
    "Go cloud-watching and spot shapes. ☁️",
    "Listen to a spring playlist and dance! 🎶",
    "Press flowers in a book. 📖🌸",
    "Make a gratitude list inspired by nature. 🌳",
];

pub(crate) fn tips(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Positive => &POSITIVE_TIPS,
        Mood::Negative => &NEGATIVE_TIPS,
        Mood::Neutral => &NEUTRAL_TIPS,
    }
}

pub(crate) fn tip(mood: Mood, rng: &mut dyn RandomSource) -> &'static str {
    choose(rng, tips(mood))
}

/// First matching rule wins. Positive without high energy gets the fallback.
pub(crate) fn activity(mood: Mood, energy: Energy, social: Social) -> &'static str {
    match (mood, energy, social) {
        (Mood::Positive, Energy::High, Social::Social) => PICNIC,
        (Mood::Positive, Energy::High, _) => NATURE_WALK,
        (Mood::Negative, Energy::Low, _) => YOGA,
        (Mood::Negative, _, _) => STROLL,
        (Mood::Neutral, _, Social::Social) => TEA,
        (Mood::Neutral, _, _) => READING,
        _ => FALLBACK_ACTIVITY,
    }
}

/// Negative mood is checked before low energy.
pub(crate) fn web_activity(mood: Mood, energy: Energy, social: Social) -> WebActivity {
    match (mood, energy, social) {
        (Mood::Positive, Energy::High, _) => GARDEN_TOUR,
        (Mood::Negative, _, _) => MEDITATION,
        (_, Energy::Low, _) => SCENERY,
        (_, _, Social::Social) => ONLINE_EVENT,
        _ => FLOWER_GARDEN,
    }
}

pub(crate) fn random_quote(rng: &mut dyn RandomSource) -> &'static str {
    choose(rng, &QUOTES)
}

pub(crate) fn random_activity(rng: &mut dyn RandomSource) -> &'static str {
    choose(rng, &SURPRISES)
}
