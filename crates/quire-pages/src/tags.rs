//! Tag normalisation.

/// URL prefix of tag listing pages.
pub const TAGS_PREFIX: &str = "/tags";

/// Convert a tag into a kebab-case URL segment.
///
/// Accented Latin letters are folded to ASCII first (`Café` is `cafe`).
/// Words are split at non-alphanumeric characters, at lower-to-upper case
/// changes, at the end of an acronym (`XMLHttp` is `xml` + `http`) and
/// between letters and digits, except for ordinals like `1st` or `42nd`.
/// Apostrophes vanish instead of splitting.
pub fn kebab_case(tag: &str) -> String {
    let mut plain = String::with_capacity(tag.len());
    for c in tag.chars() {
        if is_apostrophe(c) || is_combining_mark(c) {
            continue;
        }
        match deburr(c) {
            Some(folded) => plain.push_str(folded),
            None => plain.push(c),
        }
    }

    let chars: Vec<char> = plain.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            flush(&mut current, &mut words);
            continue;
        }

        if let Some(&prev) = i.checked_sub(1).and_then(|p| chars.get(p)) {
            let next = chars.get(i + 1).copied();
            if !current.is_empty() && is_boundary(prev, c, next) && !is_ordinal(&chars, i) {
                flush(&mut current, &mut words);
            }
        }

        current.extend(c.to_lowercase());
    }
    flush(&mut current, &mut words);

    words.join("-")
}

/// Output path of the listing page for a normalised tag slug.
pub fn tag_path(slug: &str) -> String {
    format!("{}/{}/", TAGS_PREFIX, slug)
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}')
}

fn is_boundary(prev: char, cur: char, next: Option<char>) -> bool {
    let digit_change = prev.is_numeric() != cur.is_numeric();
    let camel = prev.is_lowercase() && cur.is_uppercase();
    let acronym_end =
        prev.is_uppercase() && cur.is_uppercase() && next.is_some_and(char::is_lowercase);

    digit_change || camel || acronym_end
}

/// Whether `chars[i..i + 2]` is the ordinal suffix of the digit before it.
fn is_ordinal(chars: &[char], i: usize) -> bool {
    let (Some(&digit), Some(&first), Some(&second)) = (
        i.checked_sub(1).and_then(|p| chars.get(p)),
        chars.get(i),
        chars.get(i + 1),
    ) else {
        return false;
    };

    let expected = match digit {
        '1' => "st",
        '2' => "nd",
        '3' => "rd",
        d if d.is_ascii_digit() => "th",
        _ => return false,
    };

    let suffix: String = [first, second].iter().collect();
    let after = chars.get(i + 2).copied();

    if suffix == expected {
        !after.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    } else if suffix == expected.to_ascii_uppercase() {
        !after.is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    } else {
        false
    }
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// ASCII spelling of a Latin-1 or Latin Extended-A letter.
fn deburr(c: char) -> Option<&'static str> {
    let folded = match c {
        'À'..='Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'à'..='å' | 'ā' | 'ă' | 'ą' => "a",
        'Ç' | 'Ć' | 'Ĉ' | 'Ċ' | 'Č' => "C",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'Ð' | 'Ď' | 'Đ' => "D",
        'ð' | 'ď' | 'đ' => "d",
        'È'..='Ë' | 'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => "E",
        'è'..='ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => "G",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'Ĥ' | 'Ħ' => "H",
        'ĥ' | 'ħ' => "h",
        'Ì'..='Ï' | 'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => "I",
        'ì'..='ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'Ĵ' => "J",
        'ĵ' => "j",
        'Ķ' => "K",
        'ķ' | 'ĸ' => "k",
        'Ĺ' | 'Ļ' | 'Ľ' | 'Ŀ' | 'Ł' => "L",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'Ñ' | 'Ń' | 'Ņ' | 'Ň' | 'Ŋ' => "N",
        'ñ' | 'ń' | 'ņ' | 'ň' | 'ŋ' => "n",
        'Ò'..='Ö' | 'Ø' | 'Ō' | 'Ŏ' | 'Ő' => "O",
        'ò'..='ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'Ŕ' | 'Ŗ' | 'Ř' => "R",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'Ś' | 'Ŝ' | 'Ş' | 'Š' => "S",
        'ś' | 'ŝ' | 'ş' | 'š' | 'ſ' => "s",
        'Ţ' | 'Ť' | 'Ŧ' => "T",
        'ţ' | 'ť' | 'ŧ' => "t",
        'Ù'..='Ü' | 'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => "U",
        'ù'..='ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'Ŵ' => "W",
        'ŵ' => "w",
        'Ý' | 'Ŷ' | 'Ÿ' => "Y",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'Ź' | 'Ż' | 'Ž' => "Z",
        'ź' | 'ż' | 'ž' => "z",
        'Æ' => "Ae",
        'æ' => "ae",
        'Þ' => "Th",
        'þ' => "th",
        'ß' => "ss",
        'Ĳ' => "IJ",
        'ĳ' => "ij",
        'Œ' => "Oe",
        'œ' => "oe",
        'ŉ' => "n",
        _ => return None,
    };
    Some(folded)
}

fn flush(current: &mut String, words: &mut Vec<String>) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_words_with_hyphens() {
        assert_eq!(kebab_case("Open Source"), "open-source");
        assert_eq!(kebab_case("Go"), "go");
        assert_eq!(kebab_case("distributed systems"), "distributed-systems");
    }

    #[test]
    fn splits_camel_case_and_acronyms() {
        assert_eq!(kebab_case("JavaScript"), "java-script");
        assert_eq!(kebab_case("XMLHttpRequest"), "xml-http-request");
        assert_eq!(kebab_case("AWS"), "aws");
    }

    #[test]
    fn separates_digits() {
        assert_eq!(kebab_case("HTML5 Canvas"), "html-5-canvas");
        assert_eq!(kebab_case("web3"), "web-3");
    }

    #[test]
    fn drops_punctuation_and_apostrophes() {
        assert_eq!(kebab_case("C++"), "c");
        assert_eq!(kebab_case("Node.js"), "node-js");
        assert_eq!(kebab_case("don't panic"), "dont-panic");
        assert_eq!(kebab_case("  --Systems--  "), "systems");
        assert_eq!(kebab_case("++"), "");
    }

    #[test]
    fn folds_accents() {
        assert_eq!(kebab_case("Café"), "cafe");
        assert_eq!(kebab_case("Ünïcödé"), "unicode");
        assert_eq!(kebab_case("Straße"), "strasse");
        assert_eq!(kebab_case("Cafe\u{301} Culture"), "cafe-culture");
    }

    #[test]
    fn keeps_ordinals_together() {
        assert_eq!(kebab_case("1st Place"), "1st-place");
        assert_eq!(kebab_case("21st Century"), "21st-century");
        assert_eq!(kebab_case("2nd"), "2nd");
        assert_eq!(kebab_case("3RD"), "3rd");
        assert_eq!(kebab_case("4th"), "4th");
        assert_eq!(kebab_case("11th"), "11-th");
        assert_eq!(kebab_case("1stly"), "1-stly");
    }

    #[test]
    fn builds_tag_paths() {
        assert_eq!(tag_path("open-source"), "/tags/open-source/");
    }
}
