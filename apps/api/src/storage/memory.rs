use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Resume, UserDetails};
use crate::storage::{ResumeStore, StoreError};

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    resumes: RwLock<Vec<Resume>>,
    user_details: RwLock<Option<UserDetails>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeStore for MemoryStore {
    async fn save(&self, resume: Resume) -> Result<Uuid, StoreError> {
        let id = resume.id;
        self.resumes.write().await.push(resume);
        Ok(id)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Resume>, StoreError> {
        Ok(self
            .resumes
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn get_all(&self) -> Result<Vec<Resume>, StoreError> {
        Ok(self.resumes.read().await.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.resumes.write().await.retain(|r| r.id != id);
        Ok(())
    }

    async fn update_title(&self, id: Uuid, title: &str) -> Result<(), StoreError> {
        let mut resumes = self.resumes.write().await;
        let resume = resumes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        resume.title = title.to_string();
        Ok(())
    }

    async fn save_user_details(&self, details: UserDetails) -> Result<(), StoreError> {
        *self.user_details.write().await = Some(details);
        Ok(())
    }

    async fn get_user_details(&self) -> Result<Option<UserDetails>, StoreError> {
        Ok(self.user_details.read().await.clone())
    }

    async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.resumes.read().await.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewResume;

    fn resume(content: &str) -> Resume {
        Resume::new(NewResume {
            content: content.to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_save_get_and_list_in_creation_order() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await.unwrap());

        let a = store.save(resume("# A")).await.unwrap();
        let b = store.save(resume("# B")).await.unwrap();

        assert_eq!(store.get_by_id(a).await.unwrap().unwrap().content, "# A");
        let all = store.get_all().await.unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a, b]);
        assert!(!store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_update_title_and_delete() {
        let store = MemoryStore::new();
        let id = store.save(resume("# A")).await.unwrap();

        store.update_title(id, "Acme").await.unwrap();
        assert_eq!(store.get_by_id(id).await.unwrap().unwrap().title, "Acme");

        store.delete(id).await.unwrap();
        assert!(store.get_by_id(id).await.unwrap().is_none());
        assert!(matches!(
            store.update_title(id, "x").await,
            Err(StoreError::NotFound(missing)) if missing == id
        ));
        // Deleting again is a no-op.
        store.delete(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_user_details_single_record() {
        let store = MemoryStore::new();
        assert!(!store.has_user_details().await.unwrap());

        store
            .save_user_details(UserDetails {
                name: "Jane".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .save_user_details(UserDetails {
                name: "Jane Doe".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(store.has_user_details().await.unwrap());
        assert_eq!(store.get_user_details().await.unwrap().unwrap().name, "Jane Doe");
    }
}
