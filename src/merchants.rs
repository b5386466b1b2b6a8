//! Merchant normalization and categorization.
//!
//! Raw card descriptors ("SQ *BLUE BOTTLE #0412 OAKLAND CA") are cleaned and
//! matched against a keyword table. Matching is a case-insensitive substring
//! search; the first entry wins, so more specific keywords come first.

use crate::models::Category;

/// Canonical merchant name and category for a raw descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMerchant {
    pub name: String,
    pub category: Category,
}

const PROCESSOR_PREFIXES: &[&str] = &[
    "sq *", "sq*", "tst* ", "tst*", "paypal *", "paypal*", "pos ", "sp * ", "sp *", "pp*",
    "dd *", "ach ",
];

const MERCHANTS: &[(&str, &str, Category)] = &[
    // Income
    ("payroll", "Payroll", Category::Income),
    ("direct dep", "Payroll", Category::Income),
    ("salary", "Salary", Category::Income),
    ("interest paid", "Interest", Category::Income),
    // Coffee
    ("starbucks", "Starbucks", Category::Coffee),
    ("blue bottle", "Blue Bottle Coffee", Category::Coffee),
    ("dunkin", "Dunkin'", Category::Coffee),
    ("peet", "Peet's Coffee", Category::Coffee),
    ("tim hortons", "Tim Hortons", Category::Coffee),
    ("coffee", "Coffee Shop", Category::Coffee),
    ("cafe", "Cafe", Category::Coffee),
    // Subscriptions
    ("netflix", "Netflix", Category::Subscriptions),
    ("spotify", "Spotify", Category::Subscriptions),
    ("hulu", "Hulu", Category::Subscriptions),
    ("disney plus", "Disney+", Category::Subscriptions),
    ("disneyplus", "Disney+", Category::Subscriptions),
    ("youtube premium", "YouTube Premium", Category::Subscriptions),
    ("apple.com/bill", "Apple", Category::Subscriptions),
    ("icloud", "iCloud", Category::Subscriptions),
    ("amazon prime", "Amazon Prime", Category::Subscriptions),
    ("prime video", "Amazon Prime", Category::Subscriptions),
    ("audible", "Audible", Category::Subscriptions),
    ("planet fitness", "Planet Fitness", Category::Subscriptions),
    ("peloton", "Peloton", Category::Subscriptions),
    // Groceries
    ("whole foods", "Whole Foods", Category::Groceries),
    ("wholefds", "Whole Foods", Category::Groceries),
    ("trader joe", "Trader Joe's", Category::Groceries),
    ("safeway", "Safeway", Category::Groceries),
    ("kroger", "Kroger", Category::Groceries),
    ("aldi", "Aldi", Category::Groceries),
    ("costco", "Costco", Category::Groceries),
    ("instacart", "Instacart", Category::Groceries),
    // Dining
    ("doordash", "DoorDash", Category::Dining),
    ("uber eats", "Uber Eats", Category::Dining),
    ("ubereats", "Uber Eats", Category::Dining),
    ("grubhub", "Grubhub", Category::Dining),
    ("chipotle", "Chipotle", Category::Dining),
    ("mcdonald", "McDonald's", Category::Dining),
    ("sweetgreen", "Sweetgreen", Category::Dining),
    ("domino", "Domino's", Category::Dining),
    ("pizza", "Pizza", Category::Dining),
    ("restaurant", "Restaurant", Category::Dining),
    // Transport (after "uber eats" so rides and food stay apart)
    ("uber", "Uber", Category::Transport),
    ("lyft", "Lyft", Category::Transport),
    ("shell", "Shell", Category::Transport),
    ("chevron", "Chevron", Category::Transport),
    ("exxon", "Exxon", Category::Transport),
    ("bart", "BART", Category::Transport),
    ("mta", "MTA", Category::Transport),
    ("parking", "Parking", Category::Transport),
    // Shopping
    ("amazon", "Amazon", Category::Shopping),
    ("amzn", "Amazon", Category::Shopping),
    ("target", "Target", Category::Shopping),
    ("walmart", "Walmart", Category::Shopping),
    ("best buy", "Best Buy", Category::Shopping),
    ("ikea", "IKEA", Category::Shopping),
    ("etsy", "Etsy", Category::Shopping),
    // Entertainment
    ("amc", "AMC Theatres", Category::Entertainment),
    ("ticketmaster", "Ticketmaster", Category::Entertainment),
    ("steam", "Steam", Category::Entertainment),
    ("playstation", "PlayStation", Category::Entertainment),
    // Bills
    ("pg&e", "PG&E", Category::Bills),
    ("comcast", "Comcast", Category::Bills),
    ("xfinity", "Comcast", Category::Bills),
    ("verizon", "Verizon", Category::Bills),
    ("t-mobile", "T-Mobile", Category::Bills),
    ("at&t", "AT&T", Category::Bills),
    ("geico", "GEICO", Category::Bills),
    ("rent", "Rent", Category::Bills),
    ("electric", "Electric Utility", Category::Bills),
    // Health
    ("cvs", "CVS", Category::Health),
    ("walgreens", "Walgreens", Category::Health),
    ("pharmacy", "Pharmacy", Category::Health),
    ("dental", "Dental", Category::Health),
    // Travel
    ("airbnb", "Airbnb", Category::Travel),
    ("delta air", "Delta", Category::Travel),
    ("united air", "United", Category::Travel),
    ("marriott", "Marriott", Category::Travel),
    ("hilton", "Hilton", Category::Travel),
    ("expedia", "Expedia", Category::Travel),
    // Transfers
    ("venmo", "Venmo", Category::Transfers),
    ("zelle", "Zelle", Category::Transfers),
    ("transfer", "Transfer", Category::Transfers),
];

/// Synonyms accepted when a user names a category in free text.
const CATEGORY_SYNONYMS: &[(&str, Category)] = &[
    ("restaurants", Category::Dining),
    ("restaurant", Category::Dining),
    ("eating out", Category::Dining),
    ("takeout", Category::Dining),
    ("food delivery", Category::Dining),
    ("lattes", Category::Coffee),
    ("latte", Category::Coffee),
    ("grocery", Category::Groceries),
    ("food shopping", Category::Groceries),
    ("rides", Category::Transport),
    ("gas", Category::Transport),
    ("commute", Category::Transport),
    ("clothes", Category::Shopping),
    ("online shopping", Category::Shopping),
    ("movies", Category::Entertainment),
    ("games", Category::Entertainment),
    ("streaming", Category::Subscriptions),
    ("subscription", Category::Subscriptions),
    ("utilities", Category::Bills),
    ("bill", Category::Bills),
    ("trips", Category::Travel),
    ("flights", Category::Travel),
    ("medical", Category::Health),
];

/// Normalize a raw merchant descriptor into a canonical name and category.
pub fn normalize(raw: &str) -> NormalizedMerchant {
    let cleaned = clean_descriptor(raw);
    let haystack = cleaned.to_lowercase();

    for (keyword, name, category) in MERCHANTS {
        if contains_keyword(&haystack, keyword) {
            return NormalizedMerchant {
                name: (*name).to_string(),
                category: *category,
            };
        }
    }

    let name = if cleaned.is_empty() {
        "Unknown".to_string()
    } else {
        title_case(&cleaned)
    };
    NormalizedMerchant {
        name,
        category: Category::Other,
    }
}

/// Resolve a category from a category name, synonym, or merchant keyword.
pub fn category_for_keyword(text: &str) -> Option<Category> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    if let Ok(category) = needle.parse::<Category>() {
        return Some(category);
    }
    if let Some(stripped) = needle.strip_suffix('s') {
        if let Ok(category) = stripped.parse::<Category>() {
            return Some(category);
        }
    }
    CATEGORY_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == needle)
        .map(|(_, category)| *category)
}

/// Canonical merchant name if `text` names a known merchant.
pub fn known_merchant(text: &str) -> Option<&'static str> {
    let needle = text.trim().to_lowercase();
    if needle.len() < 3 {
        return None;
    }
    MERCHANTS
        .iter()
        .find(|(keyword, name, category)| {
            *category != Category::Income
                && (contains_keyword(&needle, keyword) || name.to_lowercase() == needle)
        })
        .map(|(_, name, _)| *name)
}

/// Short keywords ("mta", "amc", "rent") only match on word boundaries so they
/// do not fire inside unrelated words ("parentheses", "camcorder").
fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    if keyword.len() > 4 {
        return haystack.contains(keyword);
    }
    haystack
        .split(|c: char| !c.is_alphanumeric() && c != '&' && c != '-')
        .any(|word| word == keyword || (keyword.len() == 4 && word.starts_with(keyword)))
}

/// Strip processor prefixes, store numbers and trailing location noise.
fn clean_descriptor(raw: &str) -> String {
    let mut s = raw.trim().to_string();

    let lower = s.to_lowercase();
    for prefix in PROCESSOR_PREFIXES {
        if lower.starts_with(prefix) {
            s = s[prefix.len()..].trim_start().to_string();
            break;
        }
    }

    // Everything after a store number is location noise.
    if let Some(idx) = s.find('#') {
        s.truncate(idx);
    }

    let words: Vec<&str> = s.split_whitespace().collect();
    let mut keep = words.len();
    while keep > 1 {
        let word = words[keep - 1];
        let is_number = word.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '*');
        let is_state = word.len() == 2 && word.chars().all(|c| c.is_ascii_uppercase());
        if is_number || is_state {
            keep -= 1;
        } else {
            break;
        }
    }

    words[..keep].join(" ").trim_matches(|c: char| c == '*' || c == '-').trim().to_string()
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_processor_prefix_and_store_number() {
        let m = normalize("SQ *BLUE BOTTLE #0412 OAKLAND CA");
        assert_eq!(m.name, "Blue Bottle Coffee");
        assert_eq!(m.category, Category::Coffee);
    }

    #[test]
    fn uber_eats_is_dining_but_uber_is_transport() {
        assert_eq!(normalize("UBER EATS 8005928996").category, Category::Dining);
        assert_eq!(normalize("UBER *TRIP HELP.UBER.COM").category, Category::Transport);
    }

    #[test]
    fn short_keywords_need_word_boundaries() {
        assert_eq!(normalize("MTA*NYCT PAYGO").category, Category::Transport);
        assert_eq!(normalize("Parentheses Bookshop").category, Category::Other);
        assert_eq!(normalize("Camcorder World").category, Category::Other);
    }

    #[test]
    fn unknown_merchants_are_title_cased() {
        let m = normalize("JOES HARDWARE 0042 PORTLAND OR");
        assert_eq!(m.name, "Joes Hardware 0042 Portland");
        assert_eq!(m.category, Category::Other);

        let m = normalize("LOCAL BAKERY 12345");
        assert_eq!(m.name, "Local Bakery");
    }

    #[test]
    fn empty_descriptor_is_unknown() {
        let m = normalize("   ");
        assert_eq!(m.name, "Unknown");
        assert_eq!(m.category, Category::Other);
    }

    #[test]
    fn payroll_maps_to_income() {
        assert_eq!(normalize("ACME CORP PAYROLL").category, Category::Income);
        assert_eq!(normalize("ACME CORP PAYROLL").name, "Payroll");
    }

    #[test]
    fn category_keywords_and_synonyms() {
        assert_eq!(category_for_keyword("Dining"), Some(Category::Dining));
        assert_eq!(category_for_keyword("restaurants"), Some(Category::Dining));
        assert_eq!(category_for_keyword("subscriptions"), Some(Category::Subscriptions));
        assert_eq!(category_for_keyword("bills"), Some(Category::Bills));
        assert_eq!(category_for_keyword("lattes"), Some(Category::Coffee));
        assert_eq!(category_for_keyword("yachts"), None);
    }

    #[test]
    fn known_merchant_lookup() {
        assert_eq!(known_merchant("starbucks"), Some("Starbucks"));
        assert_eq!(known_merchant("Uber Eats"), Some("Uber Eats"));
        assert_eq!(known_merchant("xy"), None);
    }
}
