// Document slug derivation.
//
// A slug is the law's official abbreviation (jurabk), lower-cased, with German
// umlauts transliterated and everything that is not a word character or `-`
// folded to `_`. It names the output directory `<first char>/<slug>/`.

use std::sync::LazyLock;

use regex::Regex;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w-]").unwrap());

const TRANSLITERATIONS: [(char, &str); 4] = [('ä', "ae"), ('ö', "oe"), ('ü', "ue"), ('ß', "ss")];

/// Derive the output slug from a law abbreviation.
pub fn slugify(abbreviation: &str) -> String {
    let lowered = abbreviation.trim().to_lowercase();
    let mut transliterated = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match TRANSLITERATIONS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => transliterated.push_str(to),
            None => transliterated.push(c),
        }
    }
    NON_WORD.replace_all(&transliterated, "_").into_owned()
}
