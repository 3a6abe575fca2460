//! Character width conversion for Japanese text.
//!
//! Alphanumerics map through the fixed U+FEE0 offset between Basic Latin and
//! the Halfwidth and Fullwidth Forms block. Katakana has no such offset, so it
//! goes through an explicit table where voiced and semi-voiced kana expand to
//! a base character plus a half-width sound mark.

/// Offset between an ASCII character and its full-width form.
const FULLWIDTH_OFFSET: u32 = 0xFEE0;

/// Half-width voiced sound mark (dakuten).
const HALFWIDTH_VOICED: char = 'ﾞ';
/// Half-width semi-voiced sound mark (handakuten).
const HALFWIDTH_SEMI_VOICED: char = 'ﾟ';

/// Full-width katakana and kana punctuation with their half-width forms.
const KANA_TABLE: &[(char, &str)] = &[
    ('。', "｡"),
    ('「', "｢"),
    ('」', "｣"),
    ('、', "､"),
    ('・', "･"),
    ('ヲ', "ｦ"),
    ('ァ', "ｧ"),
    ('ィ', "ｨ"),
    ('ゥ', "ｩ"),
    ('ェ', "ｪ"),
    ('ォ', "ｫ"),
    ('ャ', "ｬ"),
    ('ュ', "ｭ"),
    ('ョ', "ｮ"),
    ('ッ', "ｯ"),
    ('ー', "ｰ"),
    ('ア', "ｱ"),
    ('イ', "ｲ"),
    ('ウ', "ｳ"),
    ('エ', "ｴ"),
    ('オ', "ｵ"),
    ('カ', "ｶ"),
    ('キ', "ｷ"),
    ('ク', "ｸ"),
    ('ケ', "ｹ"),
    ('コ', "ｺ"),
    ('サ', "ｻ"),
    ('シ', "ｼ"),
    ('ス', "ｽ"),
    ('セ', "ｾ"),
    ('ソ', "ｿ"),
    ('タ', "ﾀ"),
    ('チ', "ﾁ"),
    ('ツ', "ﾂ"),
    ('テ', "ﾃ"),
    ('ト', "ﾄ"),
    ('ナ', "ﾅ"),
    ('ニ', "ﾆ"),
    ('ヌ', "ﾇ"),
    ('ネ', "ﾈ"),
    ('ノ', "ﾉ"),
    ('ハ', "ﾊ"),
    ('ヒ', "ﾋ"),
    ('フ', "ﾌ"),
    ('ヘ', "ﾍ"),
    ('ホ', "ﾎ"),
    ('マ', "ﾏ"),
    ('ミ', "ﾐ"),
    ('ム', "ﾑ"),
    ('メ', "ﾒ"),
    ('モ', "ﾓ"),
    ('ヤ', "ﾔ"),
    ('ユ', "ﾕ"),
    ('ヨ', "ﾖ"),
    ('ラ', "ﾗ"),
    ('リ', "ﾘ"),
    ('ル', "ﾙ"),
    ('レ', "ﾚ"),
    ('ロ', "ﾛ"),
    ('ワ', "ﾜ"),
    ('ン', "ﾝ"),
    ('゛', "ﾞ"),
    ('゜', "ﾟ"),
    ('ガ', "ｶﾞ"),
    ('ギ', "ｷﾞ"),
    ('グ', "ｸﾞ"),
    ('ゲ', "ｹﾞ"),
    ('ゴ', "ｺﾞ"),
    ('ザ', "ｻﾞ"),
    ('ジ', "ｼﾞ"),
    ('ズ', "ｽﾞ"),
    ('ゼ', "ｾﾞ"),
    ('ゾ', "ｿﾞ"),
    ('ダ', "ﾀﾞ"),
    ('ヂ', "ﾁﾞ"),
    ('ヅ', "ﾂﾞ"),
    ('デ', "ﾃﾞ"),
    ('ド', "ﾄﾞ"),
    ('バ', "ﾊﾞ"),
    ('ビ', "ﾋﾞ"),
    ('ブ', "ﾌﾞ"),
    ('ベ', "ﾍﾞ"),
    ('ボ', "ﾎﾞ"),
    ('パ', "ﾊﾟ"),
    ('ピ', "ﾋﾟ"),
    ('プ', "ﾌﾟ"),
    ('ペ', "ﾍﾟ"),
    ('ポ', "ﾎﾟ"),
    ('ヴ', "ｳﾞ"),
    ('ヷ', "ﾜﾞ"),
    ('ヺ', "ｦﾞ"),
];

fn is_halfwidth_alnum(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

fn is_fullwidth_alnum(c: char) -> bool {
    matches!(c, '０'..='９' | 'Ａ'..='Ｚ' | 'ａ'..='ｚ')
}

fn shift(c: char, up: bool) -> char {
    let code = c as u32;
    let shifted = if up {
        code + FULLWIDTH_OFFSET
    } else {
        code - FULLWIDTH_OFFSET
    };
    char::from_u32(shifted).unwrap_or(c)
}

/// Convert full-width letters and digits (`Ａ`, `ｚ`, `３`) to ASCII.
///
/// Full-width punctuation and kana are left alone.
pub fn to_halfwidth_alnum(text: &str) -> String {
    text.chars()
        .map(|c| if is_fullwidth_alnum(c) { shift(c, false) } else { c })
        .collect()
}

/// Convert ASCII letters and digits to their full-width forms.
pub fn to_fullwidth_alnum(text: &str) -> String {
    text.chars()
        .map(|c| if is_halfwidth_alnum(c) { shift(c, true) } else { c })
        .collect()
}

/// Convert full-width katakana to half-width katakana.
///
/// Voiced kana become two characters (`ガ` → `ｶﾞ`). Hiragana is unchanged.
pub fn to_halfwidth_kana(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match KANA_TABLE.iter().find(|(full, _)| *full == c) {
            Some((_, half)) => out.push_str(half),
            None => out.push(c),
        }
    }
    out
}

/// Convert half-width katakana to full-width katakana.
///
/// A base kana followed by `ﾞ` or `ﾟ` is recombined into the single voiced
/// character when one exists.
pub fn to_fullwidth_kana(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(&mark) = chars.peek() {
            if mark == HALFWIDTH_VOICED || mark == HALFWIDTH_SEMI_VOICED {
                let mut pair = String::with_capacity(8);
                pair.push(c);
                pair.push(mark);
                if let Some(full) = lookup_fullwidth(&pair) {
                    out.push(full);
                    chars.next();
                    continue;
                }
            }
        }

        let mut single = [0u8; 4];
        match lookup_fullwidth(c.encode_utf8(&mut single)) {
            Some(full) => out.push(full),
            None => out.push(c),
        }
    }

    out
}

fn lookup_fullwidth(half: &str) -> Option<char> {
    KANA_TABLE
        .iter()
        .find(|(_, h)| *h == half)
        .map(|(full, _)| *full)
}

/// Replace each digit with the zero of the same width (`7` → `0`, `７` → `０`).
pub fn zero_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '0'..='9' => '0',
            '０'..='９' => '０',
            other => other,
        })
        .collect()
}

/// Remove every half-width and full-width digit.
pub fn strip_digits(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '0'..='9' | '０'..='９'))
        .collect()
}
