//! Caption templates describing who is speaking and how.

use rand::Rng;

const TEMPLATES: &[&str] = &[
    "A {gender} speaker delivers a {style} and medium-paced explanation.",
    "A {gender} voice speaks in a {style} tone, clearly and at a steady pace.",
    "In a {style} manner, a {gender} teacher explains the topic to a student.",
    "A {gender} narrator talks with a {style} delivery and natural pauses.",
    "The speech is given by a {gender} speaker who sounds {style}.",
    "A {style} {gender} voice explains the idea in plain words.",
    "A {gender} speaker, sounding {style}, walks the listener through the concept.",
    "With a {style} delivery, a {gender} voice describes the subject step by step.",
    "A {gender} educator speaks in a {style} way at a moderate speed.",
    "Close-mic recording of a {gender} speaker with a {style} tone.",
    "A {gender} voice gives a short {style} lesson.",
    "The listener hears a {gender} speaker explaining things in a {style} voice.",
    "A {gender} tutor explains the topic with a {style} attitude.",
    "Spoken by a {gender} voice with a {style} character and clear articulation.",
    "A {style} explanation delivered by a {gender} speaker in a quiet room.",
    "A {gender} presenter talks in a {style} style, neither rushed nor slow.",
    "This clip features a {gender} speaker whose delivery is {style}.",
    "A {gender} voice, {style} in tone, answers a curious question.",
    "An expressive {gender} speaker explains the concept in a {style} mood.",
    "A {gender} speaker explains the material with a {style}, engaging delivery.",
    "A {gender} voice shares a brief explanation, sounding {style} throughout.",
    "In a {style} voice, a {gender} speaker breaks the idea down for beginners.",
];

/// Index into the template catalog. Keeping the id lets a caption be
/// re-rendered once the final gender label is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateId(usize);

#[derive(Debug, Clone, Default)]
pub struct DescriptionTemplater;

impl DescriptionTemplater {
    pub fn new() -> Self {
        Self
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> TemplateId {
        TemplateId(rng.gen_range(0..TEMPLATES.len()))
    }

    pub fn render(&self, id: TemplateId, gender_token: &str, style: &str) -> String {
        TEMPLATES[id.0 % TEMPLATES.len()]
            .replace("{gender}", gender_token)
            .replace("{style}", style)
    }
}
