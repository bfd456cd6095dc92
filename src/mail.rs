//! Email draft for a freshly exported report

use chrono::NaiveDate;
use serde::Serialize;

/// A `mailto:` draft pointing the recipient at an exported workbook.
///
/// Mail clients cannot receive attachments through a `mailto:` URL, so the
/// body asks the sender to attach the downloaded file by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailDraft {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl MailDraft {
    pub fn new(recipient: &str, building_name: &str, date: NaiveDate, filename: &str) -> Self {
        let subject = format!("Inventory Report: {} - {}", building_name, date);
        let body = format!(
            "Hello,\n\n\
             Please find the inventory report for {} from {} attached.\n\n\
             (You will need to manually attach the file named \"{}\" that was just downloaded to your device.)\n\n\
             Thank you.",
            building_name, date, filename
        );
        Self {
            recipient: recipient.trim().to_string(),
            subject,
            body,
        }
    }

    pub fn mailto_url(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.recipient,
            urlencoding::encode(&self.subject),
            urlencoding::encode(&self.body)
        )
    }
}
