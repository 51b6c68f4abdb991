//! Language data.

use super::{EnglishSpeller, Language, Script};

/// Characters that cause synthesis artifacts and their replacements.
const PUNCTUATION_SWITCH: &[(char, &str)] = &[
    ('\u{2018}', "'"),  // Left single quote
    ('\u{2019}', "'"),  // Right single quote
    ('\u{201a}', "'"),  // Low single quote
    ('\u{201c}', "\""), // Left double quote
    ('\u{201d}', "\""), // Right double quote
    ('\u{201e}', "\""), // Low double quote
    ('\u{00ab}', "\""), // Left-pointing double angle quote
    ('\u{00bb}', "\""), // Right-pointing double angle quote
    ('\u{2039}', "'"),  // Single left-pointing angle quote
    ('\u{203a}', "'"),  // Single right-pointing angle quote
    ('\u{2013}', "-"),  // En dash
    ('\u{2011}', "-"),  // Non-breaking hyphen
    ('\u{2012}', "-"),  // Figure dash
    ('\u{2015}', "-"),  // Horizontal bar
    ('\u{2032}', "'"),  // Prime
    ('\u{2033}', "\""), // Double prime
    ('\u{200b}', ""),   // Zero-width space
    ('\u{200c}', ""),   // Zero-width non-joiner
    ('\u{feff}', ""),   // BOM
    ('\u{00ad}', ""),   // Soft hyphen
];

const ENG_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Mr.", "Mister"),
    ("Mrs.", "Misses"),
    ("Ms.", "Miss"),
    ("Dr.", "Doctor"),
    ("Prof.", "Professor"),
    ("Jr.", "Junior"),
    ("Sr.", "Senior"),
    ("Capt.", "Captain"),
    ("Gen.", "General"),
    ("Lt.", "Lieutenant"),
    ("Sgt.", "Sergeant"),
    ("Rev.", "Reverend"),
    ("Mt.", "Mount"),
    ("vs.", "versus"),
    ("etc.", "et cetera"),
    ("e.g.", "for example"),
    ("i.e.", "that is"),
    ("approx.", "approximately"),
];

const FRA_ABBREVIATIONS: &[(&str, &str)] = &[
    ("M.", "Monsieur"),
    ("MM.", "Messieurs"),
    ("Mme", "Madame"),
    ("Mmes", "Mesdames"),
    ("Mlle", "Mademoiselle"),
    ("Dr", "Docteur"),
    ("Pr", "Professeur"),
    ("St", "Saint"),
    ("Ste", "Sainte"),
    ("etc.", "et cetera"),
    ("p.ex.", "par exemple"),
];

const DEU_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Dr.", "Doktor"),
    ("Prof.", "Professor"),
    ("Hr.", "Herr"),
    ("Fr.", "Frau"),
    ("z.B.", "zum Beispiel"),
    ("d.h.", "das heißt"),
    ("usw.", "und so weiter"),
    ("bzw.", "beziehungsweise"),
    ("ca.", "circa"),
    ("Nr.", "Nummer"),
];

const SPA_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Sr.", "Señor"),
    ("Sra.", "Señora"),
    ("Srta.", "Señorita"),
    ("Dr.", "Doctor"),
    ("Dra.", "Doctora"),
    ("Ud.", "Usted"),
    ("Uds.", "Ustedes"),
    ("etc.", "etcétera"),
];

const ITA_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Sig.", "Signor"),
    ("Sig.ra", "Signora"),
    ("Dott.", "Dottor"),
    ("Prof.", "Professor"),
    ("ecc.", "eccetera"),
];

const POR_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Sr.", "Senhor"),
    ("Sra.", "Senhora"),
    ("Dr.", "Doutor"),
    ("Dra.", "Doutora"),
    ("etc.", "et cetera"),
];

const ENG_MATH: &[(&str, &str)] = &[
    ("0", "zero"),
    ("1", "one"),
    ("2", "two"),
    ("3", "three"),
    ("4", "four"),
    ("5", "five"),
    ("6", "six"),
    ("7", "seven"),
    ("8", "eight"),
    ("9", "nine"),
    (".", "point"),
    (",", "comma"),
    ("+", "plus"),
    ("-", "minus"),
    ("×", "times"),
    ("*", "times"),
    ("x", "times"),
    ("÷", "divided by"),
    ("/", "divided by"),
    ("=", "equals"),
    ("≠", "does not equal"),
    ("<", "less than"),
    (">", "greater than"),
    ("≤", "less than or equal to"),
    ("≥", "greater than or equal to"),
    ("±", "plus or minus"),
    ("%", "percent"),
    ("√", "square root of"),
    ("π", "pi"),
    ("^", "to the power of"),
    ("∞", "infinity"),
];

const FRA_MATH: &[(&str, &str)] = &[
    ("0", "zéro"),
    ("1", "un"),
    ("2", "deux"),
    ("3", "trois"),
    ("4", "quatre"),
    ("5", "cinq"),
    ("6", "six"),
    ("7", "sept"),
    ("8", "huit"),
    ("9", "neuf"),
    (".", "virgule"),
    (",", "virgule"),
    ("+", "plus"),
    ("-", "moins"),
    ("×", "fois"),
    ("*", "fois"),
    ("x", "fois"),
    ("÷", "divisé par"),
    ("/", "divisé par"),
    ("=", "égal"),
    ("<", "inférieur à"),
    (">", "supérieur à"),
    ("±", "plus ou moins"),
    ("%", "pour cent"),
    ("√", "racine carrée de"),
    ("π", "pi"),
    ("^", "puissance"),
];

const DEU_MATH: &[(&str, &str)] = &[
    ("0", "null"),
    ("1", "eins"),
    ("2", "zwei"),
    ("3", "drei"),
    ("4", "vier"),
    ("5", "fünf"),
    ("6", "sechs"),
    ("7", "sieben"),
    ("8", "acht"),
    ("9", "neun"),
    (".", "Komma"),
    (",", "Komma"),
    ("+", "plus"),
    ("-", "minus"),
    ("×", "mal"),
    ("*", "mal"),
    ("x", "mal"),
    ("÷", "geteilt durch"),
    ("/", "geteilt durch"),
    ("=", "gleich"),
    ("<", "kleiner als"),
    (">", "größer als"),
    ("±", "plus minus"),
    ("%", "Prozent"),
    ("√", "Wurzel aus"),
    ("π", "pi"),
    ("^", "hoch"),
];

const SPA_MATH: &[(&str, &str)] = &[
    ("0", "cero"),
    ("1", "uno"),
    ("2", "dos"),
    ("3", "tres"),
    ("4", "cuatro"),
    ("5", "cinco"),
    ("6", "seis"),
    ("7", "siete"),
    ("8", "ocho"),
    ("9", "nueve"),
    (".", "punto"),
    (",", "coma"),
    ("+", "más"),
    ("-", "menos"),
    ("×", "por"),
    ("*", "por"),
    ("x", "por"),
    ("÷", "dividido por"),
    ("/", "dividido por"),
    ("=", "igual a"),
    ("<", "menor que"),
    (">", "mayor que"),
    ("±", "más o menos"),
    ("%", "por ciento"),
    ("√", "raíz cuadrada de"),
    ("π", "pi"),
    ("^", "elevado a"),
];

const ITA_MATH: &[(&str, &str)] = &[
    ("0", "zero"),
    ("1", "uno"),
    ("2", "due"),
    ("3", "tre"),
    ("4", "quattro"),
    ("5", "cinque"),
    ("6", "sei"),
    ("7", "sette"),
    ("8", "otto"),
    ("9", "nove"),
    (".", "virgola"),
    (",", "virgola"),
    ("+", "più"),
    ("-", "meno"),
    ("×", "per"),
    ("*", "per"),
    ("x", "per"),
    ("÷", "diviso"),
    ("/", "diviso"),
    ("=", "uguale a"),
    ("<", "minore di"),
    (">", "maggiore di"),
    ("±", "più o meno"),
    ("%", "percento"),
    ("√", "radice quadrata di"),
    ("π", "pi greco"),
    ("^", "elevato a"),
];

const POR_MATH: &[(&str, &str)] = &[
    ("0", "zero"),
    ("1", "um"),
    ("2", "dois"),
    ("3", "três"),
    ("4", "quatro"),
    ("5", "cinco"),
    ("6", "seis"),
    ("7", "sete"),
    ("8", "oito"),
    ("9", "nove"),
    (".", "vírgula"),
    (",", "vírgula"),
    ("+", "mais"),
    ("-", "menos"),
    ("×", "vezes"),
    ("*", "vezes"),
    ("x", "vezes"),
    ("÷", "dividido por"),
    ("/", "dividido por"),
    ("=", "igual a"),
    ("<", "menor que"),
    (">", "maior que"),
    ("±", "mais ou menos"),
    ("%", "por cento"),
    ("√", "raiz quadrada de"),
    ("π", "pi"),
    ("^", "elevado a"),
];

const ZHO_MATH: &[(&str, &str)] = &[
    ("0", "零"),
    ("1", "一"),
    ("2", "二"),
    ("3", "三"),
    ("4", "四"),
    ("5", "五"),
    ("6", "六"),
    ("7", "七"),
    ("8", "八"),
    ("9", "九"),
    (".", "点"),
    (",", "逗号"),
    ("+", "加"),
    ("-", "减"),
    ("×", "乘"),
    ("*", "乘"),
    ("x", "乘"),
    ("÷", "除以"),
    ("/", "除以"),
    ("=", "等于"),
    ("<", "小于"),
    (">", "大于"),
    ("%", "百分之"),
    ("π", "派"),
];

const JPN_MATH: &[(&str, &str)] = &[
    ("0", "ゼロ"),
    ("1", "いち"),
    ("2", "に"),
    ("3", "さん"),
    ("4", "よん"),
    ("5", "ご"),
    ("6", "ろく"),
    ("7", "なな"),
    ("8", "はち"),
    ("9", "きゅう"),
    (".", "てん"),
    (",", "コンマ"),
    ("+", "たす"),
    ("-", "ひく"),
    ("×", "かける"),
    ("*", "かける"),
    ("x", "かける"),
    ("÷", "わる"),
    ("/", "わる"),
    ("=", "イコール"),
    ("<", "しょうなり"),
    (">", "だいなり"),
    ("%", "パーセント"),
    ("π", "パイ"),
];

const KOR_MATH: &[(&str, &str)] = &[
    ("0", "영"),
    ("1", "일"),
    ("2", "이"),
    ("3", "삼"),
    ("4", "사"),
    ("5", "오"),
    ("6", "육"),
    ("7", "칠"),
    ("8", "팔"),
    ("9", "구"),
    (".", "점"),
    (",", "쉼표"),
    ("+", "더하기"),
    ("-", "빼기"),
    ("×", "곱하기"),
    ("*", "곱하기"),
    ("x", "곱하기"),
    ("÷", "나누기"),
    ("/", "나누기"),
    ("=", "는"),
    ("<", "보다 작다"),
    (">", "보다 크다"),
    ("%", "퍼센트"),
    ("π", "파이"),
];

const THA_MATH: &[(&str, &str)] = &[
    ("0", "ศูนย์"),
    ("1", "หนึ่ง"),
    ("2", "สอง"),
    ("3", "สาม"),
    ("4", "สี่"),
    ("5", "ห้า"),
    ("6", "หก"),
    ("7", "เจ็ด"),
    ("8", "แปด"),
    ("9", "เก้า"),
    (".", "จุด"),
    (",", "จุลภาค"),
    ("+", "บวก"),
    ("-", "ลบ"),
    ("×", "คูณ"),
    ("*", "คูณ"),
    ("x", "คูณ"),
    ("÷", "หาร"),
    ("/", "หาร"),
    ("=", "เท่ากับ"),
    ("%", "เปอร์เซ็นต์"),
];

const ENG_SPECIAL: &[(char, &str)] = &[
    ('&', "and"),
    ('@', "at"),
    ('#', "number"),
    ('©', "copyright"),
    ('®', "registered"),
    ('™', "trademark"),
    ('§', "section"),
    ('°', "degrees"),
];

const FRA_SPECIAL: &[(char, &str)] = &[
    ('&', "et"),
    ('@', "arobase"),
    ('#', "numéro"),
    ('§', "paragraphe"),
    ('°', "degrés"),
];

const DEU_SPECIAL: &[(char, &str)] = &[
    ('&', "und"),
    ('@', "at"),
    ('#', "Nummer"),
    ('§', "Paragraph"),
    ('°', "Grad"),
];

const SPA_SPECIAL: &[(char, &str)] = &[
    ('&', "y"),
    ('@', "arroba"),
    ('#', "número"),
    ('§', "sección"),
    ('°', "grados"),
];

const ITA_SPECIAL: &[(char, &str)] = &[
    ('&', "e"),
    ('@', "chiocciola"),
    ('#', "numero"),
    ('§', "sezione"),
    ('°', "gradi"),
];

const POR_SPECIAL: &[(char, &str)] = &[
    ('&', "e"),
    ('@', "arroba"),
    ('#', "número"),
    ('§', "seção"),
    ('°', "graus"),
];

const CJK_SPECIAL: &[(char, &str)] = &[];

pub(super) static LANGUAGES: &[Language] = &[
    Language {
        iso3: "eng",
        iso1: "en",
        name: "English",
        max_chars: 250,
        script: Script::SpaceDelimited,
        abbreviations: ENG_ABBREVIATIONS,
        chapter_words: &["chapter", "part", "book", "section", "volume", "act", "scene"],
        math_phonemes: ENG_MATH,
        special_chars: ENG_SPECIAL,
        punctuation_switch: PUNCTUATION_SWITCH,
        year_words: true,
        speller: Some(&EnglishSpeller),
    },
    Language {
        iso3: "fra",
        iso1: "fr",
        name: "French",
        max_chars: 250,
        script: Script::SpaceDelimited,
        abbreviations: FRA_ABBREVIATIONS,
        chapter_words: &["chapitre", "partie", "livre", "tome", "section", "acte"],
        math_phonemes: FRA_MATH,
        special_chars: FRA_SPECIAL,
        punctuation_switch: PUNCTUATION_SWITCH,
        year_words: false,
        speller: None,
    },
    Language {
        iso3: "deu",
        iso1: "de",
        name: "German",
        max_chars: 250,
        script: Script::SpaceDelimited,
        abbreviations: DEU_ABBREVIATIONS,
        chapter_words: &["kapitel", "teil", "buch", "abschnitt", "band", "akt"],
        math_phonemes: DEU_MATH,
        special_chars: DEU_SPECIAL,
        punctuation_switch: PUNCTUATION_SWITCH,
        year_words: false,
        speller: None,
    },
    Language {
        iso3: "spa",
        iso1: "es",
        name: "Spanish",
        max_chars: 250,
        script: Script::SpaceDelimited,
        abbreviations: SPA_ABBREVIATIONS,
        chapter_words: &["capítulo", "parte", "libro", "sección", "tomo", "acto"],
        math_phonemes: SPA_MATH,
        special_chars: SPA_SPECIAL,
        punctuation_switch: PUNCTUATION_SWITCH,
        year_words: false,
        speller: None,
    },
    Language {
        iso3: "ita",
        iso1: "it",
        name: "Italian",
        max_chars: 250,
        script: Script::SpaceDelimited,
        abbreviations: ITA_ABBREVIATIONS,
        chapter_words: &["capitolo", "parte", "libro", "sezione", "volume", "atto"],
        math_phonemes: ITA_MATH,
        special_chars: ITA_SPECIAL,
        punctuation_switch: PUNCTUATION_SWITCH,
        year_words: false,
        speller: None,
    },
    Language {
        iso3: "por",
        iso1: "pt",
        name: "Portuguese",
        max_chars: 250,
        script: Script::SpaceDelimited,
        abbreviations: POR_ABBREVIATIONS,
        chapter_words: &["capítulo", "parte", "livro", "seção", "volume", "ato"],
        math_phonemes: POR_MATH,
        special_chars: POR_SPECIAL,
        punctuation_switch: PUNCTUATION_SWITCH,
        year_words: false,
        speller: None,
    },
    Language {
        iso3: "zho",
        iso1: "zh",
        name: "Chinese",
        max_chars: 80,
        script: Script::Chinese,
        abbreviations: &[],
        chapter_words: &[],
        math_phonemes: ZHO_MATH,
        special_chars: CJK_SPECIAL,
        punctuation_switch: PUNCTUATION_SWITCH,
        year_words: false,
        speller: None,
    },
    Language {
        iso3: "jpn",
        iso1: "ja",
        name: "Japanese",
        max_chars: 80,
        script: Script::Japanese,
        abbreviations: &[],
        chapter_words: &[],
        math_phonemes: JPN_MATH,
        special_chars: CJK_SPECIAL,
        punctuation_switch: PUNCTUATION_SWITCH,
        year_words: false,
        speller: None,
    },
    Language {
        iso3: "kor",
        iso1: "ko",
        name: "Korean",
        max_chars: 120,
        script: Script::Korean,
        abbreviations: &[],
        chapter_words: &[],
        math_phonemes: KOR_MATH,
        special_chars: CJK_SPECIAL,
        punctuation_switch: PUNCTUATION_SWITCH,
        year_words: false,
        speller: None,
    },
    Language {
        iso3: "tha",
        iso1: "th",
        name: "Thai",
        max_chars: 120,
        script: Script::Thai,
        abbreviations: &[],
        chapter_words: &[],
        math_phonemes: THA_MATH,
        special_chars: CJK_SPECIAL,
        punctuation_switch: PUNCTUATION_SWITCH,
        year_words: false,
        speller: None,
    },
];
