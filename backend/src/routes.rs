use std::path::PathBuf;

use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use log::info;
use shared::{PredictionResponse, REPORT_FILE_NAME, ReportRequest};
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::ApiError;
use crate::pipeline::DetectionPipeline;
use crate::pipeline::decision::classify;
use crate::report::{self, ReportRecord};
use crate::upload::read_image_upload;

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: Option<PathBuf>) {
    cfg.service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/predict").route(web::post().to(predict)))
        .service(web::resource("/api/report").route(web::post().to(generate_report)));

    if let Some(dir) = frontend_dir {
        cfg.service(Files::new("/", dir).index_file("index.html"));
    }
}

async fn health(pipeline: web::Data<DetectionPipeline>) -> HttpResponse {
    HttpResponse::Ok().json(pipeline.health())
}

async fn predict(
    pipeline: web::Data<DetectionPipeline>,
    upload_config: web::Data<UploadConfig>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let upload = read_image_upload(payload, upload_config.max_bytes).await?;
    info!(
        "[{}] Received {} ({} bytes, {})",
        request_id,
        upload.file_name,
        upload.bytes.len(),
        upload.content_type.as_deref().unwrap_or("no content type")
    );

    let pipeline = pipeline.into_inner();
    let bytes = upload.bytes;
    let result = web::block(move || pipeline.analyze(&bytes))
        .await
        .map_err(|e| ApiError::Blocking(e.to_string()))??;

    info!(
        "[{}] {} model scored {:.4} -> {}",
        request_id, result.route, result.score, result.label
    );

    Ok(HttpResponse::Ok().json(PredictionResponse {
        request_id: request_id.to_string(),
        label: result.label,
        score: result.score,
        route: result.route,
        file_name: upload.file_name,
    }))
}

async fn generate_report(request: web::Json<ReportRequest>) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    if !(0.0..=1.0).contains(&request.score) {
        return Err(ApiError::InvalidRequest(format!(
            "score {} is outside [0, 1]",
            request.score
        )));
    }

    let record = ReportRecord::now(
        request.user_name,
        classify(request.score),
        request.score,
        request.file_name,
    );
    let pdf = report::render(&record)?;
    info!(
        "Generated report for {} ({} bytes)",
        record.source_filename,
        pdf.len()
    );

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(REPORT_FILE_NAME.to_string())],
        })
        .body(pdf))
}
