pub mod application;
pub mod job;
pub mod user;

/// Trims skill names and drops blanks, keeping input order.
pub fn clean_skills<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
