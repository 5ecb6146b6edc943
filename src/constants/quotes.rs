pub const DEFAULT_API_URL: &str = "https://dummyjson.com/quotes";
pub const DEFAULT_API_LIMIT: u32 = 100;
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://quotes.db?mode=rwc";

pub const QUOTES_KEY: &str = "quotes";
pub const LAST_CATEGORY_KEY: &str = "lastCategory";
pub const LAST_VIEWED_KEY: &str = "lastViewedQuote";

/// sentinel label that selects every quote.
pub const ALL_CATEGORIES: &str = "all";

pub const QUOTES_PER_PAGE: usize = 10;

/// seeded into an empty store as `(text, category)`, numbered from 1.
pub const DEFAULT_QUOTES: [(&str, &str); 3] = [
    (
        "Life isn't about getting and having, it's about giving and being.",
        "Kevin Kruse",
    ),
    (
        "Whatever the mind of man can conceive and believe, it can achieve.",
        "Napoleon Hill",
    ),
    (
        "Strive not to be a success, but rather to be of value.",
        "Albert Einstein",
    ),
];

/// largest attachment accepted by `quote import`.
pub const MAX_IMPORT_BYTES: u32 = 1024 * 1024;
