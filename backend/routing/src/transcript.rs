use chrono::{DateTime, Utc};
use claimdesk_core::{SourceTag, Turn, UserId};

fn label(turn: &Turn) -> String {
    match turn.source {
        Some(tag) if tag != SourceTag::Chat => format!("{} ({tag})", turn.role),
        _ => turn.role.to_string(),
    }
}

/// Turns in chronological order, one labelled paragraph each.
pub fn format_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", label(turn), turn.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Full report text: header, transcript, and the assessment if there is one.
pub fn report_body(user: &UserId, generated_at: DateTime<Utc>, turns: &[Turn], analysis: Option<&str>) -> String {
    let mut body = format!(
        "Người dùng: {user}\nThời gian: {}\n\n{}",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        format_transcript(turns)
    );
    if let Some(analysis) = analysis {
        body.push_str("\n\nĐÁNH GIÁ\n\n");
        body.push_str(analysis);
    }
    body
}

pub fn report_file_name(user: &UserId, generated_at: DateTime<Utc>) -> String {
    let safe: String = user
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("report_{safe}_{}.pdf", generated_at.timestamp())
}
