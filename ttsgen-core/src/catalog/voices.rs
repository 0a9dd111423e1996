use crate::labeling::Gender;

/// Prebuilt Gemini voices: name, catalog gender, pitch character.
pub(crate) const BUILTIN_VOICES: &[(&str, Gender, &str)] = &[
    ("Puck", Gender::Male, "medium-low"),
    ("Leda", Gender::Female, "medium"),
    ("Zephyr", Gender::Male, "low"),
    ("Kore", Gender::Female, "high"),
    ("Charon", Gender::Male, "deep"),
    ("Aoede", Gender::Female, "bright/melodic"),
    ("Gacrux", Gender::Female, "mature"),
    ("Achird", Gender::Female, "soft"),
    ("Sulafat", Gender::Female, "steady"),
    ("Orus", Gender::Male, "bright"),
];
