//! Per-domain presets: video search queries and domain keyword patterns.

use crate::config::Domain;

/// Search queries run during discovery, in order.
pub fn preset_queries(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Sneaker => &[
            "sneaker review",
            "running shoes review",
            "basketball shoes review",
            "Nike shoes review",
            "Adidas shoes review",
            "barefoot shoes review",
            "Air Jordan review",
            "Asics running review",
            "Brooks running review",
        ],
        Domain::Pharma => &[
            "medicine review",
            "drug review",
            "supplement review",
            "over the counter medicine review",
            "pain relief review",
            "asthma inhaler review",
            "antibiotics review",
        ],
        Domain::Food => &[
            "food review",
            "restaurant review",
            "fast food review",
            "menu review",
            "taste test review",
            "snack review",
        ],
        Domain::Steam => &[
            "steam game review",
            "pc game review",
            "new game review",
            "indie game review",
            "AAA game review",
            "game performance review",
        ],
    }
}

/// Case-insensitive regex patterns; a comment is on-topic if any of them matches.
pub fn domain_keywords(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Sneaker => &[
            r"sneaker", r"shoe", r"jordan", r"nike", r"adidas", r"yeezy", r"air\s?max",
            r"dunk", r"boost", r"asics", r"brooks", r"cushion", r"sole", r"fit",
        ],
        Domain::Pharma => &[
            r"medic", r"drug", r"pill", r"tablet", r"dose", r"side\s?effects?", r"pharma",
            r"prescri", r"supplement", r"vitamin", r"inhaler", r"antibiotic", r"pain", r"doctor",
        ],
        Domain::Food => &[
            r"food", r"tast", r"delicious", r"flavou?r", r"restaurant", r"menu", r"burger",
            r"pizza", r"snack", r"eat", r"meal", r"cook", r"fries", r"chicken",
        ],
        Domain::Steam => &[
            r"game", r"steam", r"play", r"fps", r"graphics", r"\bpc\b", r"dlc", r"level",
            r"boss", r"story", r"multiplayer", r"performance", r"patch",
        ],
    }
}
