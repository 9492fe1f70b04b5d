//! Canonical sign labels and the versioned synonym table.
//!
//! Both the runtime classifier and the offline dataset tooling normalize
//! labels through this one mapping, so the two cannot silently diverge.
//! Bump [`LABEL_TABLE_VERSION`] whenever an entry is added or changed;
//! regenerated training data must record the version it was produced with.

/// Version of the synonym table below.
pub const LABEL_TABLE_VERSION: u32 = 1;

/// Canonical label emitted when no sign is recognized.
pub const IDLE: &str = "idle";

/// Canonical label for a classification the store could not resolve.
pub const UNKNOWN: &str = "unknown";

/// Synonym pairs: historical or colloquial label -> canonical label.
///
/// Applied after lowercasing and whitespace collapsing. Order is
/// irrelevant; lookups are exact-match on the normalized form.
const SYNONYMS: &[(&str, &str)] = &[
    ("rabbit", "hare"),
    ("bunny", "hare"),
    ("pig", "boar"),
    ("hog", "boar"),
    ("cock", "rooster"),
    ("chicken", "rooster"),
    ("mouse", "rat"),
    ("cow", "ox"),
    ("sheep", "ram"),
    ("none", IDLE),
];

/// Normalize a raw label to its canonical form.
///
/// Lowercases, collapses internal whitespace runs to a single space, trims,
/// then resolves through the synonym table.
///
/// # Examples
///
/// ```
/// use signsense_core::labels::canonical;
///
/// assert_eq!(canonical("  Tiger "), "tiger");
/// assert_eq!(canonical("Rabbit"), "hare");
/// assert_eq!(canonical("dragon  sign"), "dragon sign");
/// ```
pub fn canonical(raw: &str) -> String {
    let normalized = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    for (from, to) in SYNONYMS {
        if normalized == *from {
            return (*to).to_string();
        }
    }
    normalized
}

/// Whether a canonical label represents the absence of a recognized sign.
///
/// Both [`IDLE`] and [`UNKNOWN`] invalidate accumulated voting evidence.
pub fn is_rejection(label: &str) -> bool {
    label == IDLE || label == UNKNOWN
}
