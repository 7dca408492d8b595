/// Twist-aware dialogue styling: literal phrase substitutions per style.
///
/// Replacements are case-sensitive substring swaps applied in table order
/// over the whole line, so a later entry sees the output of earlier ones.

use crate::schema::twist::{DialogueStyle, Twist};

/// A named, ordered substitution table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleTransform {
    pub name: &'static str,
    pub replacements: &'static [(&'static str, &'static str)],
}

impl StyleTransform {
    pub fn apply(&self, text: &str) -> String {
        self.replacements
            .iter()
            .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
    }
}

pub const NOIR: StyleTransform = StyleTransform {
    name: "noir",
    replacements: &[
        ("job", "gig"),
        ("money", "dough"),
        ("guy", "mook"),
        ("Hey there", "Listen here, doll"),
        ("problems", "trouble"),
        ("business", "racket"),
    ],
};

pub const WESTERN: StyleTransform = StyleTransform {
    name: "western",
    replacements: &[
        ("Hey there", "Howdy, partner"),
        ("job", "bounty"),
        ("money", "gold"),
        ("guy", "varmint"),
        ("problems", "trouble"),
        ("business", "dealings"),
        ("find", "track down"),
    ],
};

pub const CYBERPUNK: StyleTransform = StyleTransform {
    name: "cyberpunk",
    replacements: &[
        ("job", "data contract"),
        ("money", "credits"),
        ("guy", "user"),
        ("Hey there", "Greetings, citizen"),
        ("problems", "system errors"),
        ("eliminate", "delete"),
        ("find", "locate via GPS"),
    ],
};

pub const MEDIEVAL: StyleTransform = StyleTransform {
    name: "medieval",
    replacements: &[
        ("Hey there", "Hail and well met"),
        ("job", "quest"),
        ("money", "gold coins"),
        ("guy", "knave"),
        ("problems", "troubles"),
        ("business", "affairs"),
        ("eliminate", "vanquish"),
        ("find", "seek out"),
    ],
};

pub const APOCALYPTIC: StyleTransform = StyleTransform {
    name: "apocalyptic",
    replacements: &[
        ("Hey there", "Survivor"),
        ("job", "mission"),
        ("money", "supplies"),
        ("guy", "scavenger"),
        ("problems", "threats"),
        ("business", "survival"),
        ("eliminate", "neutralize"),
        ("find", "track"),
    ],
};

impl DialogueStyle {
    /// The substitution table for this style, if it has one.
    pub fn transform(&self) -> Option<&'static StyleTransform> {
        match self {
            Self::Noir => Some(&NOIR),
            Self::Western => Some(&WESTERN),
            Self::Corporate => Some(&CYBERPUNK),
            Self::Medieval => Some(&MEDIEVAL),
            Self::Apocalyptic => Some(&APOCALYPTIC),
            _ => None,
        }
    }
}

/// The literal line shown for `npc_id` under `twist`.
///
/// NPCs without a variation entry, and styles without a transform, get
/// `base_text` back unchanged.
pub fn styled_line(base_text: &str, npc_id: &str, twist: &Twist) -> String {
    match twist
        .variation(npc_id)
        .and_then(|variation| variation.dialogue_style.transform())
    {
        Some(transform) => transform.apply(base_text),
        None => base_text.to_string(),
    }
}
