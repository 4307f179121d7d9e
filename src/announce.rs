//! Call-out announcements for the hall.
//!
//! When staff call the next applicant the engine renders a short text in the
//! applicant's language and hands it to an [`Announcer`] after the call has
//! committed. Speech synthesis, if any, lives behind that trait.

use serde::Serialize;

use crate::error::Result;

/// A rendered call-out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Announcement {
    pub seq_no: i64,
    pub full_name: String,
    pub desk: Option<String>,
    /// Language the text was rendered in.
    pub language: String,
    pub text: String,
}

impl Announcement {
    /// Render the call-out for a ticket. Unknown or missing languages fall
    /// back to Russian.
    pub fn render(
        seq_no: i64,
        full_name: &str,
        desk: Option<&str>,
        language: Option<&str>,
    ) -> Self {
        let language = match language.map(str::to_lowercase).as_deref() {
            Some("kk") => "kk",
            Some("en") => "en",
            _ => "ru",
        };

        let desk_label = desk.unwrap_or(match language {
            "kk" => "көрсетілмеген",
            "en" => "unassigned",
            _ => "не указан",
        });

        let text = match language {
            "kk" => format!("Талон нөмірі {seq_no}, {desk_label} үстеліне өтіңіз"),
            "en" => format!("Ticket number {seq_no}, please proceed to desk {desk_label}"),
            _ => format!("Талон номер {seq_no}, пройдите к столу {desk_label}"),
        };

        Self {
            seq_no,
            full_name: full_name.to_string(),
            desk: desk.map(str::to_string),
            language: language.to_string(),
            text,
        }
    }
}

/// Delivers announcements. Errors are logged by the engine and never undo
/// the call that produced the announcement.
pub trait Announcer: Send + Sync {
    fn announce(&self, announcement: &Announcement) -> Result<()>;
}

/// Writes announcements to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnnouncer;

impl Announcer for TracingAnnouncer {
    fn announce(&self, announcement: &Announcement) -> Result<()> {
        tracing::info!(
            seq_no = announcement.seq_no,
            desk = announcement.desk.as_deref().unwrap_or("-"),
            language = %announcement.language,
            text = %announcement.text,
            "announcement"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_language() {
        let en = Announcement::render(12, "Aru", Some("3"), Some("en"));
        assert_eq!(en.text, "Ticket number 12, please proceed to desk 3");

        let kk = Announcement::render(12, "Aru", Some("3"), Some("KK"));
        assert_eq!(kk.language, "kk");
        assert!(kk.text.contains("12") && kk.text.contains("3 үстеліне"));

        let ru = Announcement::render(12, "Aru", Some("3"), Some("ru"));
        assert_eq!(ru.text, "Талон номер 12, пройдите к столу 3");
    }

    #[test]
    fn unknown_language_falls_back_to_russian() {
        let a = Announcement::render(4, "Aru", None, Some("de"));
        assert_eq!(a.language, "ru");
        assert_eq!(a.text, "Талон номер 4, пройдите к столу не указан");

        let b = Announcement::render(4, "Aru", Some("7"), None);
        assert_eq!(b.language, "ru");
    }
}
