use gloo_file::File as GlooFile;
use gloo_net::http::{Request, Response};
use shared::{ErrorResponse, PredictionResponse, ReportRequest};

pub async fn predict(file: &GlooFile) -> Result<PredictionResponse, String> {
    let form_data =
        web_sys::FormData::new().map_err(|_| "Could not create form data.".to_string())?;
    form_data
        .append_with_blob("image", file.as_ref())
        .map_err(|_| "Could not attach the image.".to_string())?;

    let response = Request::post("/api/predict")
        .body(form_data)
        .map_err(|e| format!("Failed to build request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        return Err(server_error(response).await);
    }
    response
        .json::<PredictionResponse>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

/// Asks the server to render the report and returns the PDF bytes.
pub async fn generate_report(request: &ReportRequest) -> Result<Vec<u8>, String> {
    let response = Request::post("/api/report")
        .json(request)
        .map_err(|e| format!("Failed to build request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        return Err(server_error(response).await);
    }
    response
        .binary()
        .await
        .map_err(|e| format!("Failed to read report: {}", e))
}

async fn server_error(response: Response) -> String {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => format!("Server error: {}", status),
    }
}
