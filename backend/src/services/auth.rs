use tracing::warn;

use crate::{
    db::store::TeacherDirectory,
    models::teacher::Teacher,
    services::announcements::AnnouncementError,
};

/// Existence check: the returned `Teacher` is the capability every
/// authenticated announcement operation asks for.
pub async fn verify_teacher(
    directory: &dyn TeacherDirectory,
    username: &str,
) -> Result<Teacher, AnnouncementError> {
    if username.is_empty() {
        warn!("announcement request without username");
        return Err(AnnouncementError::Unauthorized);
    }
    match directory.find_teacher(username).await? {
        Some(teacher) => Ok(teacher),
        None => {
            warn!(username, "unknown teacher rejected");
            Err(AnnouncementError::Unauthorized)
        }
    }
}
