pub mod handlers;
pub mod header;
pub mod preview_area;
pub mod report_section;
pub mod upload_section;
pub mod utils;
