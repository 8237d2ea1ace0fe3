//! Reading plain JS values handed over by the page: item lists, option
//! objects and rating maps. Anything missing or mistyped keeps the default.

use ksb_core::{Category, EngineConfig, ItemSpec, RatingSource, RawRating};
use wasm_bindgen::{JsCast, JsValue};

fn field(obj: &JsValue, key: &str) -> Option<JsValue> {
    if !obj.is_object() {
        return None;
    }
    js_sys::Reflect::get(obj, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn string_field(obj: &JsValue, key: &str) -> Option<String> {
    field(obj, key).and_then(|v| v.as_string())
}

fn number_field(obj: &JsValue, key: &str) -> Option<f64> {
    field(obj, key)
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
}

/// `[{ id, type | category, title }, ...]`. Entries without an id are skipped.
pub fn read_items(value: &JsValue) -> Vec<ItemSpec> {
    let Some(arr) = value.dyn_ref::<js_sys::Array>() else {
        log::warn!("[scene] items is not an array, starting empty");
        return Vec::new();
    };
    arr.iter()
        .filter_map(|v| {
            let id = string_field(&v, "id")?;
            let category = string_field(&v, "type")
                .or_else(|| string_field(&v, "category"))
                .unwrap_or_default();
            let title = string_field(&v, "title").unwrap_or_else(|| id.clone());
            Some(ItemSpec::new(id, Category::from_label(&category), title))
        })
        .collect()
}

pub fn read_config(options: &JsValue) -> EngineConfig {
    let mut config = EngineConfig::default();
    if let Some(url) = string_field(options, "figureUrl").filter(|u| !u.is_empty()) {
        config.figure_url = Some(url);
    }
    if let Some(v) = number_field(options, "minRadius") {
        config.camera.min_radius = v as f32;
    }
    if let Some(v) = number_field(options, "maxRadius") {
        config.camera.max_radius = v as f32;
    }
    if let Some(v) = number_field(options, "seed") {
        config.seed = v.abs() as u64;
    }
    config
}

/// A bare rating value: number, numeric string, or nothing.
pub fn scalar_rating(value: &JsValue) -> RawRating {
    if let Some(n) = value.as_f64() {
        RawRating::Number(n)
    } else if let Some(s) = value.as_string() {
        RawRating::Text(s)
    } else {
        RawRating::Missing
    }
}

/// A store entry: either a bare rating or `{ rating, comment }`.
pub fn entry_rating(value: &JsValue) -> RawRating {
    if value.is_object() {
        field(value, "rating").map_or(RawRating::Missing, |v| scalar_rating(&v))
    } else {
        scalar_rating(value)
    }
}

pub fn read_rating_map(value: &JsValue) -> Vec<(String, RawRating)> {
    let Some(obj) = value.dyn_ref::<js_sys::Object>() else {
        return Vec::new();
    };
    js_sys::Object::entries(obj)
        .iter()
        .filter_map(|pair| {
            let pair = pair.dyn_into::<js_sys::Array>().ok()?;
            let id = pair.get(0).as_string()?;
            Some((id, entry_rating(&pair.get(1))))
        })
        .collect()
}

/// Ratings store living on the page, e.g. the form's answer cache.
pub struct JsRatingStore {
    store: JsValue,
}

impl JsRatingStore {
    pub fn new(store: JsValue) -> Self {
        Self { store }
    }

    fn call(&self, method: &str, args: &js_sys::Array) -> Option<JsValue> {
        let f = field(&self.store, method)?.dyn_into::<js_sys::Function>().ok()?;
        match f.apply(&self.store, args) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("[rating] {}() threw: {:?}", method, e);
                None
            }
        }
    }
}

impl RatingSource for JsRatingStore {
    fn rating(&self, id: &str) -> RawRating {
        let args = js_sys::Array::of1(&JsValue::from_str(id));
        self.call("getRating", &args)
            .map_or(RawRating::Missing, |v| entry_rating(&v))
    }

    fn all_ratings(&self) -> Vec<(String, RawRating)> {
        self.call("getAllRatings", &js_sys::Array::new())
            .map(|v| read_rating_map(&v))
            .unwrap_or_default()
    }
}
