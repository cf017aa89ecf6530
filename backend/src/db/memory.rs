use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    db::store::{AnnouncementStore, TeacherDirectory},
    models::{
        announcement::{Announcement, AnnouncementId, AnnouncementPatch, NewAnnouncement},
        teacher::Teacher,
    },
};

/// Process-local store keeping records in insertion order. Used by the test
/// suites in place of Postgres.
#[derive(Default)]
pub struct MemoryStore {
    announcements: RwLock<Vec<Announcement>>,
    teachers: RwLock<HashMap<String, Teacher>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_teachers<I, S>(usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let teachers = usernames
            .into_iter()
            .map(|u| {
                let username = u.into();
                let teacher = Teacher {
                    username: username.clone(),
                    display_name: None,
                    created_at: Utc::now(),
                };
                (username, teacher)
            })
            .collect();
        Self {
            announcements: RwLock::default(),
            teachers: RwLock::new(teachers),
        }
    }
}

#[async_trait]
impl AnnouncementStore for MemoryStore {
    async fn list_active(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Announcement>> {
        let rows = self.announcements.read().await;
        Ok(rows.iter().filter(|a| a.is_active_at(now)).cloned().collect())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Announcement>> {
        Ok(self.announcements.read().await.clone())
    }

    async fn find(&self, id: AnnouncementId) -> anyhow::Result<Option<Announcement>> {
        let rows = self.announcements.read().await;
        Ok(rows.iter().find(|a| a.id == id).cloned())
    }

    async fn insert(&self, new: &NewAnnouncement) -> anyhow::Result<Announcement> {
        let announcement = Announcement {
            id: AnnouncementId::new(),
            message: new.message.clone(),
            start_date: new.start_date,
            expiration_date: new.expiration_date,
        };
        self.announcements.write().await.push(announcement.clone());
        Ok(announcement)
    }

    async fn update(
        &self,
        id: AnnouncementId,
        patch: &AnnouncementPatch,
    ) -> anyhow::Result<Option<Announcement>> {
        let mut rows = self.announcements.write().await;
        Ok(rows.iter_mut().find(|a| a.id == id).map(|a| {
            *a = a.overlay(patch);
            a.clone()
        }))
    }

    async fn delete(&self, id: AnnouncementId) -> anyhow::Result<bool> {
        let mut rows = self.announcements.write().await;
        let before = rows.len();
        rows.retain(|a| a.id != id);
        Ok(rows.len() < before)
    }
}

#[async_trait]
impl TeacherDirectory for MemoryStore {
    async fn find_teacher(&self, username: &str) -> anyhow::Result<Option<Teacher>> {
        Ok(self.teachers.read().await.get(username).cloned())
    }
}
