use es_client::{FeedbackEntry, RowStoreClient};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::session::SessionContext;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedbackDraft {
    /// 1..=5; 0 means no rating was picked.
    pub rating: u8,
    pub message: String,
    /// Where the feedback was given from, e.g. `simulator`.
    pub page: String,
}

impl FeedbackDraft {
    /// Builds the row to insert. A blank message is stored as absent.
    pub fn to_entry(&self, session: &SessionContext) -> AppResult<FeedbackEntry> {
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::InvalidInput("Please select a rating".to_string()));
        }
        let active = session.require()?;
        let message = self.message.trim();
        Ok(FeedbackEntry {
            user_id: active.user.id.clone(),
            user_email: active.user.email.clone(),
            rating: self.rating,
            message: (!message.is_empty()).then(|| message.to_string()),
            page: self.page.clone(),
        })
    }
}

pub async fn submit_feedback(
    rows: &RowStoreClient,
    session: &SessionContext,
    draft: &FeedbackDraft,
) -> AppResult<()> {
    let entry = draft.to_entry(session)?;
    let active = session.require()?;
    rows.insert_feedback(&active.access_token, &entry).await?;
    info!(rating = entry.rating, page = %entry.page, "feedback submitted");
    Ok(())
}
