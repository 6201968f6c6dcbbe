// src/question_types/validators/choices.rs

use std::collections::HashSet;

use serde_json::Value;

use super::{QuestionValidator, StageContext, check_stages, require_text};
use crate::question_types::{
    payload::{Payload, as_index, as_number, fields, is_truthy, lookup, non_empty_text},
    rejection::{Rejection, ValidationResult},
};

fn has_text(item: &Value) -> bool {
    non_empty_text(lookup(item, fields::OPTION_TEXT)).is_some()
}

fn has_image(item: &Value) -> bool {
    non_empty_text(lookup(item, fields::OPTION_IMAGE)).is_some()
}

fn is_correct(item: &Value) -> bool {
    is_truthy(lookup(item, fields::OPTION_IS_CORRECT))
}

/// `kutucugu_surukle_birak`: boxes are dragged onto a target point of the image.
pub struct DragToBox;

/// Target point given as `{x, y}` percentages of the image.
fn valid_target(target: Option<&Value>) -> bool {
    let Some(target) = target.filter(|t| t.is_object()) else {
        return false;
    };
    let in_range = |n: Option<f64>| n.is_some_and(|n| (0.0..=100.0).contains(&n));
    in_range(as_number(target.get("x"))) && in_range(as_number(target.get("y")))
}

fn valid_boxes(boxes: Option<&Value>) -> bool {
    let Some(boxes) = boxes.and_then(Value::as_array).filter(|b| !b.is_empty()) else {
        return false;
    };
    let correct = boxes.iter().filter(|b| is_correct(b)).count();
    correct == 1 && boxes.iter().all(|b| has_text(b) || has_image(b))
}

fn drag_to_box(view: &Payload<'_>) -> ValidationResult {
    require_text(view, fields::IMAGE, "question image is required")?;
    if !valid_target(view.get(fields::TARGET)) {
        return Err(Rejection::new(
            "target position must be given as x/y percentages between 0 and 100",
        ));
    }
    if !valid_boxes(view.get(fields::BOXES)) {
        return Err(Rejection::new(
            "add at least one box with text or an image and mark exactly one as correct",
        ));
    }
    Ok(())
}

impl QuestionValidator for DragToBox {
    fn validate(&self, payload: &Payload<'_>, ctx: &StageContext<'_>) -> ValidationResult {
        check_stages(ctx, drag_to_box).unwrap_or_else(|| drag_to_box(payload))
    }
}

/// `bak_ve_kutucuk_sec`: text boxes under an image, one picked by index.
pub struct LookAndPickBox;

fn look_and_pick_box(view: &Payload<'_>) -> ValidationResult {
    require_text(view, fields::IMAGE, "question image is required")?;
    let options = view.options();
    let index_in_range = as_index(view.get(fields::CORRECT_INDEX))
        .is_some_and(|i| i >= 0 && (i as usize) < options.len());
    if options.is_empty() || !index_in_range || !options.iter().all(has_text) {
        return Err(Rejection::new(
            "add at least one option with text and select the correct one",
        ));
    }
    Ok(())
}

impl QuestionValidator for LookAndPickBox {
    fn validate(&self, payload: &Payload<'_>, ctx: &StageContext<'_>) -> ValidationResult {
        check_stages(ctx, look_and_pick_box).unwrap_or_else(|| look_and_pick_box(payload))
    }
}

/// `dogru_resme_tikla`: listen, then click the right one of two images.
pub struct ClickCorrectImage;

fn click_correct_image(view: &Payload<'_>) -> ValidationResult {
    require_text(view, fields::AUDIO, "question audio is required")?;
    require_text(view, fields::IMAGE, "question audio image is required")?;
    let options = view.options();
    if options.len() != 2 || !options.iter().all(has_image) {
        return Err(Rejection::new("exactly two option images are required"));
    }
    match as_index(view.get(fields::CORRECT_INDEX)) {
        Some(0) | Some(1) => Ok(()),
        _ => Err(Rejection::new(
            "the correct answer must be image 1 or image 2",
        )),
    }
}

impl QuestionValidator for ClickCorrectImage {
    fn validate(&self, payload: &Payload<'_>, ctx: &StageContext<'_>) -> ValidationResult {
        check_stages(ctx, click_correct_image).unwrap_or_else(|| click_correct_image(payload))
    }
}

/// `gorsel_sirala`: images put in order; `correct_order[position]` names the
/// option shown at that position.
pub struct ImageOrdering;

/// True when `order` uses every index in `0..n` exactly once.
fn is_permutation(order: &[Value], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = HashSet::with_capacity(n);
    order.iter().all(|raw| match as_index(Some(raw)) {
        Some(i) if i >= 0 && (i as usize) < n => seen.insert(i),
        _ => false,
    })
}

fn image_ordering(view: &Payload<'_>) -> ValidationResult {
    let options = view.options();
    let order = view
        .array(fields::CORRECT_ORDER)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    if options.len() < 2 || !options.iter().all(has_image) || !is_permutation(order, options.len())
    {
        return Err(Rejection::new(
            "add at least two images and a correct order using each position exactly once",
        ));
    }
    Ok(())
}

impl QuestionValidator for ImageOrdering {
    fn validate(&self, payload: &Payload<'_>, ctx: &StageContext<'_>) -> ValidationResult {
        check_stages(ctx, image_ordering).unwrap_or_else(|| image_ordering(payload))
    }
}
