use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// File name the generated report is offered under.
pub const REPORT_FILE_NAME: &str = "report.pdf";

/// Media type recorded in every report.
pub const MEDIA_TYPE: &str = "Image";

/// Upload extensions accepted by both the picker and the server.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum Label {
    Real,
    Fake,
}

/// Which of the two loaded predictors served a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Route {
    Primary,
    Secondary,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionResponse {
    pub request_id: String,
    pub label: Label,
    pub score: f32,
    pub route: Route,
    pub file_name: String,
}

/// Report inputs echoed back by the browser. The label is re-derived from `score` server-side.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReportRequest {
    pub user_name: String,
    pub score: f32,
    pub file_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelStatus {
    pub input_size: u32,
    pub backend: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HealthResponse {
    pub status: String,
    pub active_route: Option<Route>,
    pub primary: Option<ModelStatus>,
    pub secondary: Option<ModelStatus>,
}

/// Returns true when `file_name` ends in one of [`ACCEPTED_EXTENSIONS`].
pub fn has_accepted_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}
