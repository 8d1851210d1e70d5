//! Edit distance and did-you-mean suggestions.

/// Largest edit distance still surfaced as a suggestion.
pub const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Case-sensitive Levenshtein distance between two strings, counted in
/// `char`s.
///
/// # Examples
///
/// ```
/// use command_dispatch::distance::levenshtein;
///
/// assert_eq!(levenshtein("buidl", "build"), 2);
/// assert_eq!(levenshtein("kitten", "sitting"), 3);
/// assert_eq!(levenshtein("", "abc"), 3);
/// ```
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Picks the closest candidate to `typo`, if it is within
/// [`MAX_SUGGESTION_DISTANCE`]. Ties go to the earliest candidate.
///
/// # Examples
///
/// ```
/// use command_dispatch::distance::suggest;
///
/// assert_eq!(suggest("biuld", ["build", "deploy"]), Some("build".to_string()));
/// assert_eq!(suggest("xyz", ["build", "deploy"]), None);
/// ```
pub fn suggest<'c, I>(typo: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'c str>,
{
    let mut best: Option<(usize, &str)> = None;
    for candidate in candidates {
        let d = levenshtein(typo, candidate);
        if best.is_none_or(|(min, _)| d < min) {
            best = Some((d, candidate));
        }
    }

    best.filter(|(d, _)| *d <= MAX_SUGGESTION_DISTANCE)
        .map(|(_, c)| c.to_string())
}
