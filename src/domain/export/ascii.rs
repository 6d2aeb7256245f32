//! ASCII folding for the PDF export. The built-in PDF fonts only cover WinAnsi, so product names
//! are reduced to their closest ASCII spelling before being written.

const FOLDS: &[(char, &str)] = &[
    ('ą', "a"), ('ć', "c"), ('ę', "e"), ('ł', "l"), ('ń', "n"), ('ó', "o"), ('ś', "s"),
    ('ź', "z"), ('ż', "z"), ('Ą', "A"), ('Ć', "C"), ('Ę', "E"), ('Ł', "L"), ('Ń', "N"),
    ('Ó', "O"), ('Ś', "S"), ('Ź', "Z"), ('Ż', "Z"),
    ('à', "a"), ('á', "a"), ('â', "a"), ('ã', "a"), ('ä', "a"), ('å', "a"), ('æ', "ae"),
    ('ç', "c"), ('è', "e"), ('é', "e"), ('ê', "e"), ('ë', "e"), ('ì', "i"), ('í', "i"),
    ('î', "i"), ('ï', "i"), ('ñ', "n"), ('ò', "o"), ('ô', "o"), ('õ', "o"), ('ö', "o"),
    ('ø', "o"), ('ù', "u"), ('ú', "u"), ('û', "u"), ('ü', "u"), ('ý', "y"), ('ÿ', "y"),
    ('ß', "ss"), ('č', "c"), ('ď', "d"), ('ě', "e"), ('ň', "n"), ('ř', "r"), ('š', "s"),
    ('ť', "t"), ('ů', "u"), ('ž', "z"),
    ('À', "A"), ('Á', "A"), ('Â', "A"), ('Ã', "A"), ('Ä', "A"), ('Å', "A"), ('Æ', "AE"),
    ('Ç', "C"), ('È', "E"), ('É', "E"), ('Ê', "E"), ('Ë', "E"), ('Ì', "I"), ('Í', "I"),
    ('Î', "I"), ('Ï', "I"), ('Ñ', "N"), ('Ò', "O"), ('Ô', "O"), ('Õ', "O"), ('Ö', "O"),
    ('Ø', "O"), ('Ù', "U"), ('Ú', "U"), ('Û', "U"), ('Ü', "U"), ('Ý', "Y"), ('Č', "C"),
    ('Ď', "D"), ('Ě', "E"), ('Ň', "N"), ('Ř', "R"), ('Š', "S"), ('Ť', "T"), ('Ů', "U"),
    ('Ž', "Z"),
];

/// Folds `text` to printable ASCII. Letters without a known spelling become `?`; control
/// characters become spaces.
pub fn to_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            out.push(if c.is_ascii_control() { ' ' } else { c });
        } else if let Some((_, folded)) = FOLDS.iter().find(|(from, _)| *from == c) {
            out.push_str(folded);
        } else if c.is_whitespace() {
            out.push(' ');
        } else {
            out.push('?');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::to_ascii;

    #[test]
    fn polish_letters() {
        assert_eq!(to_ascii("Żółć gęślą jaźń"), "Zolc gesla jazn");
        assert_eq!(to_ascii("ŁOPATA"), "LOPATA");
    }

    #[test]
    fn ascii_is_untouched() {
        assert_eq!(to_ascii("Nails (50mm) \\ x"), "Nails (50mm) \\ x");
    }

    #[test]
    fn unknown_symbols_become_question_marks() {
        assert_eq!(to_ascii("box 📦"), "box ?");
        assert_eq!(to_ascii("a\tb"), "a b");
    }
}
