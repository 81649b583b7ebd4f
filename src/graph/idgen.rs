//! Prefixed, zero-padded id allocation.

/// Allocate the next id for `prefix`, given every id currently in use.
///
/// Candidate ids are matched by substring, the "highest" one is picked by a
/// descending lexicographic sort, and its first run of digits (0 when there is
/// none) is incremented and left-padded with zeros to `digits`. The
/// lexicographic pick can mis-order variable-width numeric suffixes ("x9"
/// sorts above "x10"); ids stay fixed-width in practice, which keeps the sort
/// and the numeric order identical.
pub fn next_id<'a, I>(existing: I, prefix: &str, digits: usize) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut matching: Vec<&str> = existing
        .into_iter()
        .filter(|id| id.contains(prefix))
        .collect();
    matching.sort_unstable();

    let current = matching
        .last()
        .and_then(|highest| first_digit_run(highest))
        .unwrap_or(0);

    format!("{prefix}{:0>digits$}", (current + 1).to_string())
}

/// The first contiguous run of ASCII digits in `id`, parsed as a number.
fn first_digit_run(id: &str) -> Option<u64> {
    let start = id.find(|c: char| c.is_ascii_digit())?;
    let run: &str = &id[start..];
    let end = run
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(run.len());
    run[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_one_when_nothing_matches() {
        assert_eq!(next_id([], "prefix", 4), "prefix0001");
        assert_eq!(next_id(["other001"], "prefix", 4), "prefix0001");
    }

    #[test]
    fn increments_highest_existing() {
        let ids = ["prefix001", "prefix004", "prefix002"];
        assert_eq!(next_id(ids, "prefix", 3), "prefix005");
    }

    #[test]
    fn matches_prefix_as_substring() {
        let ids = ["itemprefix007", "itemprefix002"];
        assert_eq!(next_id(ids, "itemprefix", 3), "itemprefix008");
    }

    #[test]
    fn id_without_digits_counts_as_zero() {
        assert_eq!(next_id(["prefix"], "prefix", 4), "prefix0001");
    }

    #[test]
    fn pads_to_requested_width_without_truncating() {
        assert_eq!(next_id(["p1"], "p", 4), "p0002");
        assert_eq!(next_id(["p99999"], "p", 3), "p100000");
    }

    #[test]
    fn lexicographic_pick_is_preserved_for_mixed_widths() {
        // "prefix9" sorts above "prefix10": the next id derives from 9.
        let ids = ["prefix9", "prefix10"];
        assert_eq!(next_id(ids, "prefix", 2), "prefix10");
    }

    #[test]
    fn never_returns_an_id_already_in_use() {
        let ids = ["prefix001", "prefix002", "prefix003"];
        let fresh = next_id(ids, "prefix", 3);
        assert!(!ids.contains(&fresh.as_str()));
    }
}
