//! English-aware name comparison used to infer relationships.
//!
//! Two tiers: [`same_concept`] compares singular forms exactly, while
//! [`similarity`] tolerates typos and abbreviations through a normalized
//! Levenshtein distance.
//!
//! Suffix rules match ASCII case-insensitively, so "USERS" singularizes to
//! "USER" and [`same_concept`] treats it as "User". The retained stem keeps
//! its casing; irregular forms come back in table form.

/// Words that have no distinct plural form.
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
];

/// `(singular, plural)` pairs that no suffix rule covers.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
];

#[derive(Debug, Clone, Copy)]
enum Guard {
    Any,
    /// A preceding character must exist and must not be one of these.
    NotAfter(&'static str),
    /// The suffix must be the whole word.
    WholeWord,
}

#[derive(Debug, Clone, Copy)]
struct SuffixRule {
    from: &'static str,
    to: &'static str,
    guard: Guard,
}

const fn rule(from: &'static str, to: &'static str) -> SuffixRule {
    SuffixRule {
        from,
        to,
        guard: Guard::Any,
    }
}

const fn guarded(from: &'static str, to: &'static str, guard: Guard) -> SuffixRule {
    SuffixRule { from, to, guard }
}

const VOWELS_Y: &str = "aeiouy";

// Most specific first; the trailing empty-suffix rule catches everything.
const PLURAL_RULES: &[SuffixRule] = &[
    guarded("ox", "oxen", Guard::WholeWord),
    rule("quiz", "quizzes"),
    rule("mouse", "mice"),
    rule("louse", "lice"),
    rule("matrix", "matrices"),
    rule("vertex", "vertices"),
    rule("index", "indices"),
    rule("x", "xes"),
    rule("ch", "ches"),
    rule("ss", "sses"),
    rule("sh", "shes"),
    rule("quy", "quies"),
    guarded("y", "ies", Guard::NotAfter(VOWELS_Y)),
    rule("hive", "hives"),
    guarded("fe", "ves", Guard::NotAfter("f")),
    rule("lf", "lves"),
    rule("rf", "rves"),
    rule("sis", "ses"),
    rule("tum", "ta"),
    rule("ium", "ia"),
    rule("buffalo", "buffaloes"),
    rule("tomato", "tomatoes"),
    rule("bus", "buses"),
    rule("alias", "aliases"),
    rule("status", "statuses"),
    rule("octopus", "octopi"),
    rule("virus", "viri"),
    rule("axis", "axes"),
    rule("testis", "testes"),
    rule("s", "s"),
    rule("", "s"),
];

// Mirror of PLURAL_RULES, keyed on the plural side.
const SINGULAR_RULES: &[SuffixRule] = &[
    guarded("oxen", "ox", Guard::WholeWord),
    rule("quizzes", "quiz"),
    rule("mice", "mouse"),
    rule("lice", "louse"),
    rule("matrices", "matrix"),
    rule("vertices", "vertex"),
    rule("indices", "index"),
    rule("aliases", "alias"),
    rule("statuses", "status"),
    rule("buses", "bus"),
    rule("xes", "x"),
    rule("ches", "ch"),
    rule("sses", "ss"),
    rule("shes", "sh"),
    rule("quies", "quy"),
    guarded("ies", "y", Guard::NotAfter(VOWELS_Y)),
    rule("hives", "hive"),
    rule("lves", "lf"),
    rule("rves", "rf"),
    guarded("ves", "fe", Guard::NotAfter("f")),
    rule("alyses", "alysis"),
    rule("gnoses", "gnosis"),
    rule("theses", "thesis"),
    rule("nopses", "nopsis"),
    rule("crises", "crisis"),
    rule("ta", "tum"),
    rule("ia", "ium"),
    rule("buffaloes", "buffalo"),
    rule("tomatoes", "tomato"),
    rule("octopi", "octopus"),
    rule("viri", "virus"),
    rule("testes", "testis"),
    // Singular words that already end in "s".
    rule("alias", "alias"),
    rule("status", "status"),
    rule("bus", "bus"),
    rule("octopus", "octopus"),
    rule("virus", "virus"),
    rule("axis", "axis"),
    rule("sis", "sis"),
    rule("ss", "ss"),
    rule("s", ""),
];

impl SuffixRule {
    /// Rewrites the suffix, keeping the casing of every character the
    /// rewrite leaves in place.
    fn apply(&self, word: &str) -> Option<String> {
        let at = word.len().checked_sub(self.from.len())?;
        if !word.is_char_boundary(at) {
            return None;
        }
        let (stem, tail) = word.split_at(at);
        if !tail.eq_ignore_ascii_case(self.from) {
            return None;
        }

        let admitted = match self.guard {
            Guard::Any => true,
            Guard::WholeWord => stem.is_empty(),
            Guard::NotAfter(set) => stem
                .chars()
                .next_back()
                .is_some_and(|c| !set.contains(c.to_ascii_lowercase())),
        };
        if !admitted {
            return None;
        }

        let kept = self
            .from
            .bytes()
            .zip(self.to.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        Some(format!("{stem}{}{}", &tail[..kept], &self.to[kept..]))
    }
}

fn is_uncountable(word: &str) -> bool {
    let lower = word.to_lowercase();
    UNCOUNTABLE.contains(&lower.as_str())
}

fn apply_first(rules: &[SuffixRule], word: &str) -> String {
    rules
        .iter()
        .find_map(|r| r.apply(word))
        .unwrap_or_else(|| word.to_string())
}

pub fn pluralize(word: &str) -> String {
    if is_uncountable(word) {
        return word.to_string();
    }

    let lower = word.to_lowercase();
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == lower) {
        return (*plural).to_string();
    }

    apply_first(PLURAL_RULES, word)
}

pub fn singularize(word: &str) -> String {
    if is_uncountable(word) {
        return word.to_string();
    }

    let lower = word.to_lowercase();
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, p)| *p == lower) {
        return (*singular).to_string();
    }

    apply_first(SINGULAR_RULES, word)
}

/// True when both names reduce to the same case-folded singular form,
/// e.g. "Users" and "user". Does not look inside compound names like "user_id".
pub fn same_concept(a: &str, b: &str) -> bool {
    singularize(a).to_lowercase() == singularize(b).to_lowercase()
}

/// Classic edit distance with unit costs. Case-sensitive; callers fold case.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut matrix = vec![vec![0usize; a.len() + 1]; b.len() + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=b.len() {
        for j in 1..=a.len() {
            matrix[i][j] = if b[i - 1] == a[j - 1] {
                matrix[i - 1][j - 1]
            } else {
                (matrix[i - 1][j - 1] + 1)
                    .min(matrix[i][j - 1] + 1)
                    .min(matrix[i - 1][j] + 1)
            };
        }
    }

    matrix[b.len()][a.len()]
}

/// Normalized, case-insensitive edit distance in `[0, 1]`. Lower is closer.
pub fn similarity(a: &str, b: &str) -> f32 {
    // Lowercasing can add characters ('İ' becomes "i\u{307}"), so measure the folded forms.
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    levenshtein_distance(&a, &b) as f32 / max_len as f32
}
