use crate::models::Question;
use crate::transcript;

struct SeedQuestion {
    id: &'static str,
    title: &'static str,
    audio_url: &'static str,
    time_limit_sec: Option<u32>,
    transcript: &'static str,
}

const SEED: [SeedQuestion; 2] = [
    SeedQuestion {
        id: "seed-hotel",
        title: "Hotel Facilities",
        audio_url: "https://audio.example.com/listening/hotel-facilities.mp3",
        time_limit_sec: Some(120),
        transcript: "Welcome to the Grand Hotel. We offer a range of [amenities] for our guests, \
                     including a fully equipped gym where you can [exercise] at any time of day.",
    },
    SeedQuestion {
        id: "seed-station",
        title: "Train Announcement",
        audio_url: "https://audio.example.com/listening/train-announcement.mp3",
        time_limit_sec: None,
        transcript: "The train to [Manchester] will depart from platform [4] in ten minutes. \
                     Please keep your [luggage] with you at all times.",
    },
];

/// Built-in questions used when no stored collection is available.
pub fn seed_questions() -> Vec<Question> {
    SEED.iter()
        .map(|seed| {
            let parsed = transcript::parse(seed.transcript);
            Question {
                id: seed.id.to_string(),
                title: seed.title.to_string(),
                audio_url: seed.audio_url.to_string(),
                time_limit_sec: seed.time_limit_sec,
                tokens: parsed.tokens,
                blanks: parsed.blanks,
            }
        })
        .collect()
}
