use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gallery category inferred from an image filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Exterior,
    Pool,
    Interior,
    Rooms,
    Wellness,
    Sports,
}

/// Keyword chain, evaluated top to bottom. First match wins, so `pool`
/// beats `exterior` for a name containing both.
const KEYWORD_CHAIN: &[(Category, &[&str])] = &[
    (Category::Rooms, &["bedroom", "room", "suite", "bed"]),
    (Category::Wellness, &["wellness", "spa", "sauna", "bath"]),
    (Category::Sports, &["sport", "padel", "gym", "activity"]),
    (
        Category::Interior,
        &["living", "dining", "kitchen", "interior", "inside"],
    ),
    (Category::Pool, &["pool"]),
    (Category::Exterior, &["exterior", "view", "drone", "terrace"]),
];

const MIN_TITLE_LEN: usize = 4;

impl Category {
    /// Display order of the public filter bar
    pub const ALL: [Category; 6] = [
        Category::Exterior,
        Category::Pool,
        Category::Interior,
        Category::Rooms,
        Category::Wellness,
        Category::Sports,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Category::Exterior => "exterior",
            Category::Pool => "pool",
            Category::Interior => "interior",
            Category::Rooms => "rooms",
            Category::Wellness => "wellness",
            Category::Sports => "sports",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Exterior => "Exterior & Views",
            Category::Pool => "Pool",
            Category::Interior => "Interior",
            Category::Rooms => "Bedrooms",
            Category::Wellness => "Wellness",
            Category::Sports => "Sports",
        }
    }

    /// Title used when the filename does not yield a usable one
    pub fn default_title(&self) -> &'static str {
        match self {
            Category::Exterior => "Villa Exterior",
            Category::Pool => "Swimming Pool",
            Category::Interior => "Villa Interior",
            Category::Rooms => "Bedroom Suite",
            Category::Wellness => "Wellness Area",
            Category::Sports => "Sports Facilities",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.id() == s)
            .ok_or_else(|| format!("Unknown gallery category '{}'", s))
    }
}

/// Infer a category from keywords in the filename.
///
/// - `Exterior & Pool (3).jpg` → `Pool`
/// - `Bedroom2.jpg` → `Rooms`
/// - `random.jpg` → `Exterior`
pub fn categorize(filename: &str) -> Category {
    let lower = filename.to_lowercase();
    KEYWORD_CHAIN
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Exterior)
}

/// Derive a human title from a filename.
///
/// Strips the extension, duplicate counters like `(3)` and any other
/// digits, and turns dashes and underscores into spaces. Returns `None` when
/// fewer than four characters survive.
///
/// - `Exterior & Pool (3).jpg` → `Some("Exterior & Pool")`
/// - `Villa-Sunset_View.jpeg` → `Some("Villa Sunset View")`
/// - `img_04.png` → `None`
pub fn clean_title(filename: &str) -> Option<String> {
    let stem = match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    };

    let without_counters = strip_digit_groups(stem);
    let cleaned: String = without_counters
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();

    let title = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.chars().count() < MIN_TITLE_LEN {
        None
    } else {
        Some(title)
    }
}

/// Title shown for an image: the cleaned filename, or the category default
pub fn display_title(filename: &str, category: Category) -> String {
    clean_title(filename).unwrap_or_else(|| category.default_title().to_string())
}

/// Canonical marketing sentence for every photo of a category
pub fn describe(category: Category) -> &'static str {
    match category {
        Category::Exterior => {
            "Sweeping views across the estate, framed by Mediterranean gardens and open sky."
        }
        Category::Pool => {
            "A private infinity pool with sun loungers, made for long afternoons in the sun."
        }
        Category::Interior => {
            "Light-filled living spaces designed for gathering, dining and unwinding together."
        }
        Category::Rooms => "Serene bedroom suites with premium linens and calm, natural tones.",
        Category::Wellness => {
            "A private wellness retreat with spa comforts to restore body and mind."
        }
        Category::Sports => {
            "On-site sports facilities to stay active without leaving the villa."
        }
    }
}

/// Remove `(digits)` groups, keeping any other parenthesized text
fn strip_digit_groups(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find('(') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(')') {
            Some(close)
                if close > 0 && after[..close].chars().all(|c| c.is_ascii_digit()) =>
            {
                rest = &after[close + 1..];
            }
            _ => {
                out.push('(');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_priority_chain() {
        assert_eq!(categorize("Exterior & Pool (3).jpg"), Category::Pool);
        assert_eq!(categorize("Bedroom2.jpg"), Category::Rooms);
        assert_eq!(categorize("random.jpg"), Category::Exterior);
        assert_eq!(categorize("SPA-evening.png"), Category::Wellness);
        assert_eq!(categorize("padel_court.webp"), Category::Sports);
        assert_eq!(categorize("Dining Area.jpg"), Category::Interior);
        assert_eq!(categorize("drone-shot-01.jpg"), Category::Exterior);
    }

    #[test]
    fn test_categorize_first_match_wins() {
        // "bathroom" contains both "bath" and "room"; rooms is checked first
        assert_eq!(categorize("master-bathroom.jpg"), Category::Rooms);
        // interior beats pool
        assert_eq!(categorize("indoor-pool-inside.jpg"), Category::Interior);
        // pool beats exterior
        assert_eq!(categorize("pool-view.jpg"), Category::Pool);
    }

    #[test]
    fn test_clean_title_examples() {
        assert_eq!(
            clean_title("Exterior & Pool (3).jpg").as_deref(),
            Some("Exterior & Pool")
        );
        assert_eq!(
            clean_title("Villa-Sunset_View.jpeg").as_deref(),
            Some("Villa Sunset View")
        );
        assert_eq!(clean_title("Bedroom2.jpg").as_deref(), Some("Bedroom"));
        assert_eq!(clean_title("img_04.png"), None);
        assert_eq!(clean_title("(1).jpg"), None);
    }

    #[test]
    fn test_clean_title_keeps_non_digit_parens() {
        assert_eq!(
            clean_title("Terrace (north).jpg").as_deref(),
            Some("Terrace (north)")
        );
        assert_eq!(
            clean_title("Garden (2) (12).jpg").as_deref(),
            Some("Garden")
        );
    }

    #[test]
    fn test_clean_title_without_extension() {
        assert_eq!(clean_title("Living_Room").as_deref(), Some("Living Room"));
        assert_eq!(clean_title(".hidden").as_deref(), Some(".hidden"));
    }

    #[test]
    fn test_display_title_falls_back_to_category() {
        let category = categorize("img_04.png");
        assert_eq!(display_title("img_04.png", category), "Villa Exterior");
        assert_eq!(display_title("spa_1.jpg", Category::Wellness), "Wellness Area");
        assert_eq!(
            display_title("Exterior & Pool (3).jpg", Category::Pool),
            "Exterior & Pool"
        );
    }

    #[test]
    fn test_describe_is_per_category() {
        assert_eq!(describe(Category::Pool), describe(categorize("pool-2.jpg")));
        assert_ne!(describe(Category::Pool), describe(Category::Rooms));
    }

    #[test]
    fn test_category_round_trip_ids() {
        for category in Category::ALL {
            assert_eq!(category.id().parse::<Category>(), Ok(category));
        }
        assert!("garden".parse::<Category>().is_err());
    }
}
