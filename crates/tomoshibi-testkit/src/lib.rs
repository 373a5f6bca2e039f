// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::{Date, Duration, Month};
use tomoshibi_app::{CardTone, GalleryItem, ImageItem, ItemId, Status, StatusCard};

const SUBJECTS: [&str; 16] = [
    "Fox", "Heron", "Lantern", "Teapot", "Harbor", "Maple", "Comet", "Kettle", "Owl", "Bridge",
    "Moth", "Orchard", "Tram", "Lighthouse", "Koi", "Cedar",
];
const MOODS: [&str; 12] = [
    "Quiet", "Amber", "Rainy", "Pixel", "Midnight", "Paper", "Tiny", "Golden", "Misty", "Neon",
    "Sleepy", "Wandering",
];
const IMAGE_TAGS: [&str; 10] = [
    "animal", "night", "city", "pixel", "portrait", "food", "sea", "forest", "winter", "study",
];
const OWNERS: [&str; 8] = [
    "Mika", "Sora", "Ren", "Aoi", "Haru", "Yui", "Kai", "Nagi",
];

const CARD_NAMES: [&str; 14] = [
    "Akari", "Shuu", "Tomo", "Rin", "Yuzu", "Hinata", "Kaede", "Minato", "Sena", "Itsuki",
    "Nozomi", "Fuuka", "Ritsu", "Chihiro",
];
const ACTIVITIES: [&str; 12] = [
    "pottery",
    "film photography",
    "bouldering",
    "zine making",
    "coffee roasting",
    "night walks",
    "piano",
    "tabletop RPGs",
    "embroidery",
    "bread baking",
    "cycling",
    "bookbinding",
];
const STRENGTHS: [&str; 8] = [
    "patient listener",
    "calm under pressure",
    "finds the fun part",
    "remembers every name",
    "keeps promises",
    "great at kickoffs",
    "fixes anything",
    "spots the pattern",
];
const WEAKNESSES: [&str; 8] = [
    "mornings",
    "loud rooms",
    "long meetings",
    "vague requests",
    "cold coffee",
    "deadlines set yesterday",
    "too many tabs",
    "small talk",
];
const STATUS_LABELS: [&str; 6] = ["focus", "stamina", "charm", "curiosity", "calm", "luck"];
const CARD_TAGS: [&str; 8] = [
    "craft", "outdoor", "music", "maker", "night", "food", "study", "team",
];
const TONES: [CardTone; 3] = [CardTone::Beige, CardTone::Sand, CardTone::Linen];

pub fn image(id: &str, title: &str, tags: &[&str]) -> ImageItem {
    ImageItem {
        id: ItemId::new(id),
        title: title.to_owned(),
        src: format!("/cards/{id}.png"),
        alt: None,
        tags: strings(tags),
        notes: None,
        owner: None,
        created: None,
    }
}

pub fn card(id: &str, name: &str, tags: &[&str]) -> StatusCard {
    StatusCard {
        id: ItemId::new(id),
        name: name.to_owned(),
        activities: Vec::new(),
        good: None,
        weak: None,
        statuses: Vec::new(),
        tags: strings(tags),
        instagram: None,
        bio: None,
        tone: None,
        icon_url: None,
    }
}

pub fn status(label: &str, value: f64) -> Status {
    Status {
        label: label.to_owned(),
        value,
    }
}

/// The two-item collection used across the filter and navigation tests.
pub fn fox_and_jay() -> Vec<ImageItem> {
    vec![
        image("a", "Red Fox", &["animal", "red"]),
        image("b", "Blue Jay", &["animal", "blue"]),
    ]
}

/// Cards `a` and `b` carrying the same tags as [`fox_and_jay`].
pub fn fox_and_jay_cards() -> Vec<StatusCard> {
    vec![
        card("a", "Red Fox", &["animal", "red"]),
        card("b", "Blue Jay", &["animal", "blue"]),
    ]
}

pub fn ids<T: GalleryItem>(items: &[&T]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.id().as_str().to_owned())
        .collect()
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

pub const IMAGES_JSON: &str = r#"[
  {"id":"a","title":"Red Fox","src":"/cards/a.png","tags":["animal","red"],"owner":"Mika","created":"2025-08-14"},
  {"id":"b","title":"Blue Jay","src":"/cards/b.png","alt":"a jay on a branch","tags":["animal","blue"],"notes":"drawn at dusk"}
]"#;

pub const CARDS_JSON: &str = r#"[
  {"id":"a","name":"Red Fox","activities":["night walks"],"good":"quick","weak":"rain",
   "statuses":[{"label":"focus","value":80},{"label":"calm","value":130}],"tags":["animal","red"],"tone":"sand"},
  {"id":"b","name":"Blue Jay","activities":["singing"],"good":"loud","weak":"cats",
   "statuses":[{"label":"focus","value":-10}],"tags":["animal","blue"]}
]"#;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for larger collections. Same seed, same items.
#[derive(Debug, Clone)]
pub struct GalleryFaker {
    rng: DeterministicRng,
    next_id: usize,
}

impl GalleryFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 0,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn image(&mut self) -> ImageItem {
        let id = self.next_id("img");
        let title = format!("{} {}", self.pick(&MOODS), self.pick(&SUBJECTS));
        let tags = self.pick_many(&IMAGE_TAGS, 1, 4);
        let owner = self.rng.bool().then(|| self.pick(&OWNERS).to_owned());
        let notes = self
            .rng
            .bool()
            .then(|| format!("sketched during {}", self.pick(&MOODS).to_lowercase()));
        let created = self.rng.bool().then(|| self.date_in_2025());
        ImageItem {
            src: format!("/cards/{id}.png"),
            id: ItemId::new(id),
            title,
            alt: None,
            tags,
            notes,
            owner,
            created,
        }
    }

    pub fn card(&mut self) -> StatusCard {
        let id = self.next_id("card");
        let name = self.pick(&CARD_NAMES).to_owned();
        let statuses = self
            .pick_many(&STATUS_LABELS, 3, 5)
            .into_iter()
            .map(|label| Status {
                label,
                // Deliberately strays outside 0..=100 now and then.
                value: self.int_n(131) as f64 - 15.0,
            })
            .collect();
        StatusCard {
            id: ItemId::new(id),
            instagram: self
                .rng
                .bool()
                .then(|| format!("@{}", name.to_lowercase())),
            name,
            activities: self.pick_many(&ACTIVITIES, 1, 3),
            good: Some(self.pick(&STRENGTHS).to_owned()),
            weak: Some(self.pick(&WEAKNESSES).to_owned()),
            statuses,
            tags: self.pick_many(&CARD_TAGS, 1, 3),
            bio: None,
            tone: Some(TONES[self.int_n(TONES.len())]),
            icon_url: None,
        }
    }

    pub fn images(&mut self, count: usize) -> Vec<ImageItem> {
        (0..count).map(|_| self.image()).collect()
    }

    pub fn cards(&mut self, count: usize) -> Vec<StatusCard> {
        (0..count).map(|_| self.card()).collect()
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{:03}", self.next_id)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn pick_many(&mut self, items: &[&str], min: usize, max: usize) -> Vec<String> {
        let count = min + self.rng.int_n(max - min + 1);
        let mut picked = Vec::with_capacity(count);
        while picked.len() < count.min(items.len()) {
            let candidate = items[self.rng.int_n(items.len())];
            if !picked.iter().any(|existing: &String| existing == candidate) {
                picked.push(candidate.to_owned());
            }
        }
        picked
    }

    fn date_in_2025(&mut self) -> Date {
        let start = Date::from_calendar_date(2025, Month::January, 1).unwrap_or(Date::MIN);
        start + Duration::days(self.int_n(365) as i64)
    }
}
