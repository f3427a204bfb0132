//! User-facing reply text.

use claimdesk_core::{AdapterError, AdapterKind};

pub const GREETING: &str = "Chào! Gửi ảnh hiện trường, PDF biên bản hoặc mô tả vụ việc để tôi phân tích. \
Gõ 'tạo báo cáo' để xuất PDF.";
pub const EMPTY_MESSAGE_HINT: &str =
    "Tin nhắn trống. Hãy mô tả vụ việc, gửi ảnh/tài liệu, hoặc gõ 'tạo báo cáo'.";
pub const INTERNAL_ERROR: &str = "Đã xảy ra lỗi nội bộ. Vui lòng thử lại sau.";
pub const RETRY_LATER: &str = "Vui lòng thử lại sau.";
pub const REPORT_READY: &str = "Báo cáo tạo xong.";

pub const FETCH_DISABLED: &str = "chức năng lấy nội dung web đang tắt";
pub const NOTHING_TO_REPORT: &str = "chưa có nội dung để lập báo cáo";
pub const ATTACH_A_FILE: &str = "hãy gửi kèm ảnh hoặc tài liệu cần trích xuất";
pub const NO_TEXT_FOUND: &str = "không tìm thấy văn bản trong tệp";

/// How many extracted characters are echoed back before "...".
pub const PREVIEW_CHARS: usize = 800;

pub fn fetch_confirmation(url: &str, chars: usize, preview: &str) -> String {
    format!("Đã thêm {chars} ký tự từ {url} vào ngữ cảnh.\n\n{preview}")
}

pub fn extraction_reply(preview: &str) -> String {
    format!("Văn bản trích xuất:\n{preview}")
}

pub fn analysis_failed_note(err: &AdapterError) -> String {
    format!("(Không phân tích tự động được: {})", err.cause())
}

/// Turn an adapter failure into something the user can act on.
pub fn user_message(err: &AdapterError) -> String {
    let prefix = match err.kind() {
        AdapterKind::Extraction => "Không trích xuất được nội dung",
        AdapterKind::Fetch => "Không lấy được nội dung trang",
        AdapterKind::Completion => "Không xử lý được yêu cầu",
        AdapterKind::Render => "Không tạo được báo cáo",
    };
    if err.retryable() {
        format!("{prefix}: {}. {RETRY_LATER}", err.cause())
    } else {
        format!("{prefix}: {}.", err.cause())
    }
}
