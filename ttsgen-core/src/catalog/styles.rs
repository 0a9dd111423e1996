/// Mood and delivery tags a sample can be spoken in.
pub(crate) const BUILTIN_STYLES: &[&str] = &[
    "cheerful",
    "gentle",
    "energetic",
    "whispering",
    "slow",
    "authoritative",
    "playful",
    "calm",
    "excited",
    "sad",
    "surprised",
    "serious",
    "friendly",
    "cry",
    "enthusiastic",
    "soothing",
    "firm",
    "formal",
    "anxious",
    "curious",
    "mellow",
    "bright",
    "commanding",
    "kind",
    "animated",
    "laugh",
];
