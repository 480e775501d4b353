//! Option filtering for the list widgets.

use std::fmt;
use std::sync::Arc;

/// Signature of a filter: query and full option list in, indices of the
/// options to show out (in display order).
pub type FilterFn = dyn Fn(&str, &[String]) -> Vec<usize> + Send + Sync;

/// A pluggable option filter.
#[derive(Clone)]
pub struct Filter(Arc<FilterFn>);

impl Filter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &[String]) -> Vec<usize> + Send + Sync + 'static,
    {
        Filter(Arc::new(f))
    }

    /// Run the filter, dropping out of range and repeated indices.
    pub fn apply(&self, query: &str, options: &[String]) -> Vec<usize> {
        let mut seen = vec![false; options.len()];
        (self.0)(query, options)
            .into_iter()
            .filter(|&i| i < options.len() && !std::mem::replace(&mut seen[i], true))
            .collect()
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
    }
}

/// Case-insensitive substring match.
pub fn default_filter(query: &str, options: &[String]) -> Vec<usize> {
    let query = query.to_lowercase();
    options
        .iter()
        .enumerate()
        .filter(|(_, opt)| opt.to_lowercase().contains(&query))
        .map(|(i, _)| i)
        .collect()
}

/// Indices of the options visible for `query`. The first filter given wins;
/// an empty query shows everything.
pub fn visible_indices(query: &str, options: &[String], filters: &[Option<&Filter>]) -> Vec<usize> {
    if query.is_empty() {
        return (0..options.len()).collect();
    }
    match filters.iter().flatten().next() {
        Some(filter) => filter.apply(query, options),
        None => default_filter(query, options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> Vec<String> {
        ["Red", "blue", "green", "Light Blue"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_is_case_insensitive() {
        assert_eq!(default_filter("BLU", &colors()), vec![1, 3]);
        assert_eq!(default_filter("zzz", &colors()), Vec::<usize>::new());
    }

    #[test]
    fn test_empty_query_shows_all() {
        let never = Filter::new(|_, _| Vec::new());
        assert_eq!(visible_indices("", &colors(), &[Some(&never)]), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_first_filter_wins_and_is_sanitised() {
        let reversed = Filter::new(|_, opts| (0..opts.len() + 2).rev().chain([0]).collect());
        let never = Filter::new(|_, _| Vec::new());
        assert_eq!(
            visible_indices("x", &colors(), &[None, Some(&reversed), Some(&never)]),
            vec![3, 2, 1, 0]
        );
    }
}
