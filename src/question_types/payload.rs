// src/question_types/payload.rs

use serde_json::{Map, Value};

/// Field names accepted on the wire. The first entry is the canonical name,
/// the rest are legacy names still found in stored stage content and older clients.
pub mod fields {
    pub const TYPE: &[&str] = &["type", "soru_turu"];
    pub const STAGED: &[&str] = &["staged", "asamali"];
    pub const STAGES: &[&str] = &["stages", "asamalar"];
    pub const STAGE_NUMBER: &[&str] = &["stage_number", "asama_numarasi"];
    pub const STAGE_CONTENT: &[&str] = &["content", "icerik"];
    pub const OPTIONS: &[&str] = &["options", "secenekler"];
    pub const EXTRA: &[&str] = &["extra", "ek_bilgi"];

    pub const QUESTION_NUMBER: &[&str] = &["question_number", "soru_numarasi"];
    pub const NAME: &[&str] = &["name", "soru_adi"];
    pub const QUESTION_TEXT: &[&str] = &["question_text", "soru_metni"];
    pub const INSTRUCTION: &[&str] = &["instruction", "yonerge"];
    pub const INSTRUCTION_AUDIO: &[&str] = &["instruction_audio", "yonerge_ses_dosyasi"];
    pub const OPTION_BACKGROUND_IMAGE: &[&str] =
        &["option_background_image", "secenek_arka_plan_gorseli"];
    pub const POINTS: &[&str] = &["points", "soru_puan"];
    pub const STARS: &[&str] = &["stars", "soru_yildiz"];
    pub const CHECK_MARK_IMAGE: &[&str] = &["check_mark_image", "dogru_tik_gorsel"];

    pub const IMAGE: &[&str] = &["image", "soru_gorseli"];
    pub const AUDIO: &[&str] = &["audio", "ses_dosyasi"];
    pub const VIDEO_URL: &[&str] = &["video_url"];
    pub const BACKGROUND_IMAGE: &[&str] = &["background_image", "arka_plan_gorsel_yatay"];
    /// Scene image of dialogue and give-image questions. Activities store it as
    /// the landscape background, books as the question image.
    pub const SCENE_IMAGE: &[&str] =
        &["background_image", "arka_plan_gorsel_yatay", "image", "soru_gorseli"];
    pub const BACKGROUND_IMAGE_PORTRAIT: &[&str] =
        &["background_image_portrait", "arka_plan_gorsel_dikey"];
    pub const CORRECT_WORD: &[&str] = &["correct_word", "dogru_kelime"];
    pub const CORRECT_SENTENCE: &[&str] = &["correct_sentence", "dogru_cumle"];
    pub const BLANK_INDICES: &[&str] = &["blank_indices", "bosluk_indeksleri"];
    pub const TARGET: &[&str] = &["target", "hedef_konum"];
    pub const BOXES: &[&str] = &["boxes", "kutucuklar"];
    pub const CORRECT_ORDER: &[&str] = &["correct_order", "dogru_sira"];
    pub const CORRECT_INDEX: &[&str] = &["correct_index", "dogru_cevap_index"];
    pub const GROUP1: &[&str] = &["group1", "grup1"];
    pub const GROUP2: &[&str] = &["group2", "grup2"];
    pub const WORDS: &[&str] = &["words", "kelimeler"];

    pub const OPTION_TEXT: &[&str] = &["text", "secenek_metni", "metin", "metin_yazi"];
    pub const OPTION_IMAGE: &[&str] = &["image", "secenek_gorseli", "gorsel"];
    pub const OPTION_AUDIO: &[&str] = &["audio", "secenek_ses_dosyasi"];
    pub const OPTION_COLOR: &[&str] = &["color", "secenek_rengi"];
    pub const OPTION_CATEGORY: &[&str] = &["category", "kategori"];
    pub const OPTION_IS_CORRECT: &[&str] = &["is_correct", "dogru_cevap"];
    pub const OPTION_SORT_ORDER: &[&str] = &["sort_order", "siralama"];
}

/// Returns the first non-null value stored under any of `keys`.
pub fn lookup<'v>(value: &'v Value, keys: &[&str]) -> Option<&'v Value> {
    let object = value.as_object()?;
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|v| !v.is_null())
}

/// Read-only view over a question payload or a stage's content.
///
/// Lookups consult the object itself first and then its parsed `extra`
/// object, so structured fields may be submitted at either level.
#[derive(Debug, Clone)]
pub struct Payload<'a> {
    root: &'a Value,
    extra: Map<String, Value>,
}

impl<'a> Payload<'a> {
    pub fn new(root: &'a Value) -> Self {
        let extra = parse_extra(lookup(root, fields::EXTRA));
        Self { root, extra }
    }

    pub fn root(&self) -> &'a Value {
        self.root
    }

    pub fn get(&self, keys: &[&str]) -> Option<&Value> {
        lookup(self.root, keys).or_else(|| {
            keys.iter()
                .filter_map(|key| self.extra.get(*key))
                .find(|v| !v.is_null())
        })
    }

    pub fn text(&self, keys: &[&str]) -> Option<String> {
        non_empty_text(self.get(keys))
    }

    pub fn array(&self, keys: &[&str]) -> Option<&Vec<Value>> {
        self.get(keys).and_then(Value::as_array)
    }

    /// The `type` identifier as submitted, untrimmed.
    pub fn type_id(&self) -> Option<&'a str> {
        lookup(self.root, fields::TYPE).and_then(Value::as_str)
    }

    pub fn is_staged(&self) -> bool {
        is_truthy(lookup(self.root, fields::STAGED))
    }

    /// Submitted stages; anything other than an array counts as none.
    pub fn stages(&self) -> &'a [Value] {
        lookup(self.root, fields::STAGES)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Submitted options, read from the top level only since that is the list
    /// that gets stored. Anything other than an array counts as none.
    pub fn options(&self) -> &'a [Value] {
        lookup(self.root, fields::OPTIONS)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Parses the free-form `extra` object. Strings are decoded as JSON; anything
/// that does not yield an object, including malformed JSON, becomes empty.
pub fn parse_extra(value: Option<&Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

/// Extracts a stage's content object.
///
/// A stage is either `{ stage_number, content }`, where `content` may be an
/// object or a JSON-encoded string, or a bare content object.
pub fn stage_content(stage: &Value) -> Value {
    let Some(object) = stage.as_object() else {
        return Value::Object(Map::new());
    };
    match lookup(stage, fields::STAGE_CONTENT) {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Value::Object(map),
            _ => Value::Object(Map::new()),
        },
        Some(_) => Value::Object(Map::new()),
        None => Value::Object(object.clone()),
    }
}

/// Accepts `true`, `1`, `"1"` and `"true"`.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::String(s)) => s == "1" || s == "true",
        _ => false,
    }
}

/// Trimmed string; `None` for non-strings and blanks.
pub fn non_empty_text(value: Option<&Value>) -> Option<String> {
    let text = value?.as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Numbers and numeric strings.
pub fn as_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Whole numbers, including numeric strings such as `"2"`.
pub fn as_index(value: Option<&Value>) -> Option<i64> {
    let n = as_number(value)?;
    (n.fract() == 0.0).then_some(n as i64)
}
