// src/question_types/validators/media.rs

use super::{QuestionValidator, StageContext, check_stages, require_text};
use crate::question_types::{
    payload::{Payload, fields},
    rejection::ValidationResult,
};

/// `dinle_sec`: an audio clip plus the image that plays it.
/// Stages only carry the playback image.
pub struct ListenAndChoose;

impl QuestionValidator for ListenAndChoose {
    fn validate(&self, payload: &Payload<'_>, ctx: &StageContext<'_>) -> ValidationResult {
        if let Some(result) = check_stages(ctx, |stage| {
            require_text(stage, fields::IMAGE, "playback icon image is required")
        }) {
            return result;
        }
        require_text(payload, fields::AUDIO, "question audio is required")?;
        require_text(payload, fields::IMAGE, "playback icon image is required")
    }
}

/// `video_dinleme`
pub struct VideoListening;

impl QuestionValidator for VideoListening {
    fn validate(&self, payload: &Payload<'_>, ctx: &StageContext<'_>) -> ValidationResult {
        if ctx.is_staged {
            return Ok(());
        }
        require_text(payload, fields::VIDEO_URL, "video URL or path is required")
    }
}

/// `diyalog`
pub struct Dialogue;

impl QuestionValidator for Dialogue {
    fn validate(&self, payload: &Payload<'_>, ctx: &StageContext<'_>) -> ValidationResult {
        if ctx.is_staged {
            return Ok(());
        }
        require_text(
            payload,
            fields::SCENE_IMAGE,
            "dialogue background image is required",
        )
    }
}

/// `gorsel_ver_yazi_iste`: the image is required whether staged or not.
pub struct GiveImageAskText;

impl QuestionValidator for GiveImageAskText {
    fn validate(&self, payload: &Payload<'_>, _ctx: &StageContext<'_>) -> ValidationResult {
        require_text(payload, fields::SCENE_IMAGE, "image is required")
    }
}
