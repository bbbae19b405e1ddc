/// Strips the `[...] ` continuation markers Linguee leaves in clipped
/// sentences.
pub fn tidy_markers(s: &str) -> String {
    s.replace("[...] ", "")
}

/// Edit distance over chars, single-row DP.
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
    for (i, ca) in a.iter().enumerate() {
        let mut cur = Vec::with_capacity(b.len() + 1);
        cur.push(i + 1);
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            let val = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
            cur.push(val);
        }
        prev = cur;
    }
    prev[b.len()]
}

/// Drops later entries within `threshold` edits of an earlier one. Example
/// feeds repeat near-identical sentences across sources.
pub fn dedup_similar(mut items: Vec<String>, threshold: usize) -> Vec<String> {
    let mut i = 0;
    while i < items.len() {
        let mut j = i + 1;
        while j < items.len() {
            if levenshtein(&items[i], &items[j]) < threshold {
                items.remove(j);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
    items
}
