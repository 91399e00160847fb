//! Static advice, reference links, and tips keyed by mood.
//!
//! Everything here is a pure lookup: the same mood always yields the
//! same text.

use crate::models::{Mood, Resource};
use std::fmt;

const DEFAULT_ADVICE: &str = "You're feeling neutral. Try a small enjoyable activity.";

/// Recommendation shown for the most frequent emotion of a scan.
///
/// Unrecognized or missing labels fall back to the default text.
pub fn advice_for(label: Option<&str>) -> &'static str {
    match label.and_then(Mood::from_label) {
        Some(Mood::Happy) => {
            "Keep doing what you're doing! Share your happiness or write down what made you feel good."
        }
        Some(Mood::Sad) => {
            "Try journaling your thoughts, connect with a friend, or take a short walk. If sadness persists, consider talking to a professional."
        }
        Some(Mood::Angry) => {
            "Pause and take deep breaths, step away from the trigger, or try muscle relaxation."
        }
        Some(Mood::Surprise) => {
            "Take a moment to process it. Celebrate if it's positive; breathe and assess calmly if not."
        }
        Some(Mood::Fear) => {
            "Try grounding techniques, slow breathing, and remind yourself you're safe."
        }
        Some(Mood::Disgust) => {
            "Shift your attention to something pleasant, or reframe the thought causing disgust."
        }
        Some(Mood::Neutral) | None => DEFAULT_ADVICE,
    }
}

/// The primary reference link for a mood.
pub fn reference_for(mood: Option<Mood>) -> Resource {
    match mood {
        Some(Mood::Sad) => Resource::new(
            "Visit resources for sadness",
            "https://www.betterhelp.com/advice/depression/",
        ),
        Some(Mood::Neutral) => Resource::new(
            "Explore wellness tips",
            "https://www.psychologytoday.com/us/basics/wellness",
        ),
        Some(Mood::Happy) => {
            Resource::new("Spread happiness", "https://www.actionforhappiness.org/")
        }
        Some(Mood::Angry) => Resource::new(
            "Anger management resources",
            "https://www.mind.org.uk/information-support/types-of-mental-health-problems/anger/",
        ),
        Some(Mood::Fear) => {
            Resource::new("Help for anxiety/fear", "https://www.anxietycanada.com/")
        }
        Some(Mood::Disgust) => Resource::new(
            "Understanding disgust",
            "https://www.psychologytoday.com/us/basics/emotion/disgust",
        ),
        Some(Mood::Surprise) => Resource::new(
            "Learn about surprise",
            "https://www.psychologytoday.com/us/basics/emotion/surprise",
        ),
        None => Resource::new(
            "General mental health resources",
            "https://www.mentalhealth.org.uk/explore-mental-health",
        ),
    }
}

/// Further reading for a mood.
pub fn resources_for(mood: Option<Mood>) -> Vec<Resource> {
    match mood {
        Some(Mood::Sad) => vec![
            Resource::new(
                "Professional help for sadness",
                "https://www.betterhelp.com/advice/depression/",
            ),
            Resource::new(
                "Mind: Depression resources",
                "https://www.mind.org.uk/information-support/types-of-mental-health-problems/depression/",
            ),
            Resource::new(
                "Psychology Today: Understanding Depression",
                "https://www.psychologytoday.com/us/basics/depression",
            ),
        ],
        Some(Mood::Neutral) => vec![
            Resource::new(
                "Wellness tips",
                "https://fourwellness.co/blog/31-simple-wellness-tips-for-healthy-and-happy-livings",
            ),
            Resource::new(
                "Verywell Mind: Wellness",
                "https://www.verywellmind.com/wellness-4157210",
            ),
            Resource::new("Action for Happiness", "https://www.actionforhappiness.org/"),
        ],
        Some(Mood::Happy) => vec![
            Resource::new("Spread happiness", "https://www.actionforhappiness.org/"),
            Resource::new(
                "Psychology Today: Happiness",
                "https://www.psychologytoday.com/us/basics/happiness",
            ),
            Resource::new("TED Talks: Happiness", "https://www.ted.com/topics/happiness"),
        ],
        Some(Mood::Angry) => vec![
            Resource::new(
                "Anger management resources",
                "https://www.mind.org.uk/information-support/types-of-mental-health-problems/anger/",
            ),
            Resource::new(
                "Psychology Today: Anger",
                "https://www.psychologytoday.com/us/basics/anger",
            ),
            Resource::new(
                "Healthline: How to Control Anger",
                "https://www.healthline.com/health/mental-health/how-to-control-anger",
            ),
        ],
        Some(Mood::Fear) => vec![
            Resource::new("Help for anxiety/fear", "https://www.anxietycanada.com/"),
            Resource::new(
                "Psychology Today: Anxiety",
                "https://www.psychologytoday.com/us/basics/anxiety",
            ),
            Resource::new(
                "Mind: Anxiety & Panic Attacks",
                "https://www.mind.org.uk/information-support/types-of-mental-health-problems/anxiety-and-panic-attacks/",
            ),
        ],
        Some(Mood::Disgust) => vec![
            Resource::new(
                "Understanding Disgust",
                "https://www.paulekman.com/universal-emotions/what-is-disgust/",
            ),
            Resource::new(
                "Verywell Mind: Disgust",
                "https://www.verywellmind.com/what-is-disgust-2795412",
            ),
        ],
        Some(Mood::Surprise) => vec![Resource::new(
            "Learn about Surprise",
            "https://www.paulekman.com/universal-emotions/what-is-surprise/",
        )],
        None => vec![
            Resource::new(
                "Mental Health Foundation",
                "https://www.mentalhealth.org.uk/explore-mental-health",
            ),
            Resource::new(
                "Psychology Today: Wellness",
                "https://www.psychologytoday.com/us/basics/wellness",
            ),
        ],
    }
}

/// How strongly an emotion was expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntensityBand {
    Low,
    Moderate,
    High,
}

impl IntensityBand {
    pub fn from_intensity(intensity: f64) -> Self {
        if intensity >= 70.0 {
            IntensityBand::High
        } else if intensity >= 40.0 {
            IntensityBand::Moderate
        } else {
            IntensityBand::Low
        }
    }

    /// Opening line of the tip list for this band.
    pub fn prefix(&self) -> &'static str {
        match self {
            IntensityBand::Low => "Mild intensity detected - a short break may help.",
            IntensityBand::Moderate => {
                "Moderate intensity - try 5-10 minutes of intentional grounding or breathing."
            }
            IntensityBand::High => "High intensity - prioritize calming actions now.",
        }
    }
}

impl fmt::Display for IntensityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntensityBand::Low => write!(f, "low"),
            IntensityBand::Moderate => write!(f, "moderate"),
            IntensityBand::High => write!(f, "high"),
        }
    }
}

/// Practical tips for a mood at a given intensity (0-100).
///
/// The first entry is always the band prefix.
pub fn tips_for(mood: Option<Mood>, intensity: f64) -> Vec<String> {
    let band = IntensityBand::from_intensity(intensity);
    let high = band == IntensityBand::High;

    let mut tips: Vec<&str> = vec![band.prefix()];

    match mood {
        Some(Mood::Happy) => {
            tips.push("Nice! Keep doing what you're doing - try to capture this moment.");
            tips.push("Share your happiness with someone or jot down three things you're grateful for.");
        }
        Some(Mood::Sad) => {
            tips.push("Try writing about what's bothering you - journaling often helps.");
            tips.push("Connect with a friend or take a short walk to change environment.");
            if high {
                tips.push("If sadness is intense or persistent, consider talking to a mental health professional.");
            }
        }
        Some(Mood::Angry) => {
            tips.push("Pause: take 5 slow deep breaths (inhale 4s, hold 4s, exhale 6s).");
            tips.push("Step away from the trigger for a few minutes - a short walk can help calm your body.");
            if high {
                tips.push("Use progressive muscle relaxation or count back from 100 to refocus.");
            }
        }
        Some(Mood::Surprise) => {
            tips.push("Take a moment to orient yourself and label what surprised you.");
            tips.push("If surprised positively, jot it down; if negatively, take a deep breath and assess.");
        }
        Some(Mood::Fear) => {
            tips.push("Grounding: name 5 things you can see, 4 you can touch, 3 you can hear.");
            tips.push("Try controlled breathing and remind yourself you are safe right now.");
            if high {
                tips.push("If fear/anxiety is frequent, consider talking to a counselor.");
            }
        }
        Some(Mood::Disgust) => {
            tips.push("Shift attention to something neutral or pleasant (favorite song, gentle stretch).");
            tips.push("Practice slow breathing and try to reframe the thought causing disgust.");
        }
        Some(Mood::Neutral) | None => {
            tips.push("You're neutral - maybe try a short activity you enjoy (music, stretch, drink water).");
        }
    }

    tips.into_iter().map(String::from).collect()
}
