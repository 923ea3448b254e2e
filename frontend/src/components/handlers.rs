use super::super::{Model, Msg, SelectedImage};
use super::utils::{first_accepted_file, generate_id, is_accepted, trigger_download};
use crate::api;
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::{PredictionResponse, REPORT_FILE_NAME, ReportRequest};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

pub fn handle_file_selected(model: &mut Model, ctx: &Context<Model>, file: GlooFile) -> bool {
    if !is_accepted(&file.name(), &file.raw_mime_type()) {
        model.error = Some(format!(
            "Unsupported file {}. Please upload a jpg, jpeg or png image.",
            file.name()
        ));
        return true;
    }

    let id = generate_id();
    model.image = Some(SelectedImage {
        id,
        file: file.clone(),
        preview_url: ObjectUrl::from(file.clone()),
    });
    model.prediction = None;
    model.report_url = None;
    model.error = None;
    model.loading = true;

    let link = ctx.link().clone();
    spawn_local(async move {
        match api::predict(&file).await {
            Ok(response) => link.send_message(Msg::PredictionReady(id, response)),
            Err(e) => link.send_message(Msg::PredictionFailed(id, e)),
        }
    });

    true
}

pub fn handle_clear_file(model: &mut Model) -> bool {
    model.image = None;
    model.prediction = None;
    model.report_url = None;
    model.error = None;
    model.loading = false;
    true
}

/// True when a reply tagged `id` is for the image still on screen.
fn is_current(current: Option<u64>, id: u64) -> bool {
    current == Some(id)
}

pub fn handle_prediction_ready(model: &mut Model, id: u64, response: PredictionResponse) -> bool {
    if !is_current(model.image.as_ref().map(|image| image.id), id) {
        return false;
    }

    log::info!(
        "[{}] {} scored {:.4} via the {} model",
        response.request_id,
        response.label,
        response.score,
        response.route
    );
    model.prediction = Some(response);
    model.loading = false;
    true
}

pub fn handle_prediction_failed(model: &mut Model, id: u64, error: String) -> bool {
    if !is_current(model.image.as_ref().map(|image| image.id), id) {
        log::warn!("Dropping error for a replaced upload: {}", error);
        return false;
    }

    model.error = Some(error);
    model.loading = false;
    true
}

pub fn handle_generate_report(model: &mut Model, ctx: &Context<Model>) -> bool {
    let Some(prediction) = model.prediction.as_ref() else {
        model.error = Some("Upload an image before generating a report.".into());
        return true;
    };

    let request = ReportRequest {
        user_name: model.user_name.clone(),
        score: prediction.score,
        file_name: prediction.file_name.clone(),
    };
    model.generating_report = true;
    model.error = None;

    let link = ctx.link().clone();
    spawn_local(async move {
        match api::generate_report(&request).await {
            Ok(bytes) => link.send_message(Msg::ReportReady(bytes)),
            Err(e) => link.send_message(Msg::SetError(Some(e))),
        }
    });

    true
}

pub fn handle_report_ready(model: &mut Model, bytes: Vec<u8>) -> bool {
    model.generating_report = false;
    match trigger_download(&bytes, "application/pdf", REPORT_FILE_NAME) {
        Ok(url) => model.report_url = Some(url),
        Err(e) => model.error = Some(e),
    }
    true
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    match event.data_transfer().and_then(|dt| dt.files()) {
        Some(file_list) => match first_accepted_file(&file_list) {
            Some(file) => ctx.link().send_message(Msg::FileSelected(file)),
            None => model.error = Some("Please drop a jpg, jpeg or png image.".into()),
        },
        None => log::warn!("Drop event carried no files"),
    }

    true
}

pub fn handle_paste(ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if let Some(file_list) = event.clipboard_data().and_then(|dt| dt.files()) {
        if let Some(file) = first_accepted_file(&file_list) {
            event.prevent_default();
            ctx.link().send_message(Msg::FileSelected(file));
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_for_replaced_uploads_are_stale() {
        assert!(is_current(Some(3), 3));
        assert!(!is_current(Some(4), 3));
        assert!(!is_current(None, 3));
    }
}
