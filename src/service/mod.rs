use crate::{
    dto::{CreateNoteRequest, NoteResponse, UpdateNoteRequest},
    models::Note,
    repository::{Repository, StoreError},
};

use std::sync::Arc;

/// Async front of the store shared by all HTTP handlers.
///
/// Store calls block on SQLite, so each one runs on tokio's blocking pool.
#[derive(Clone)]
pub struct NoteService {
    repo: Arc<Repository>,
}

impl NoteService {
    pub const fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Repository) -> Result<T, StoreError> + Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        tokio::task::spawn_blocking(move || op(&repo)).await?
    }

    pub async fn create_note(&self, request: CreateNoteRequest) -> Result<Note, StoreError> {
        let mut note = Note::from_params(request.title, request.content)?;
        self.run(move |repo| {
            repo.create_note(&mut note)?;
            Ok(note)
        })
        .await
    }

    pub async fn get_note(&self, id: i64) -> Result<Option<Note>, StoreError> {
        self.run(move |repo| repo.get_note(id)).await
    }

    pub async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        self.run(Repository::list_notes).await
    }

    /// Applies only the fields present in `request` on top of the stored note.
    pub async fn update_note(
        &self,
        id: i64,
        request: UpdateNoteRequest,
    ) -> Result<Note, StoreError> {
        self.run(move |repo| {
            repo.update_with(id, |note| {
                if let Some(title) = request.title {
                    note.set_title(title)?;
                }
                if let Some(content) = request.content {
                    note.set_content(content);
                }
                Ok(())
            })
        })
        .await
    }

    pub async fn delete_note(&self, id: i64) -> Result<bool, StoreError> {
        self.run(move |repo| repo.delete_note(id)).await
    }

    pub async fn search_notes(&self, query: Option<String>) -> Result<Vec<Note>, StoreError> {
        self.run(move |repo| repo.search_notes(query.as_deref()))
            .await
    }

    pub async fn count_notes(&self) -> Result<i64, StoreError> {
        self.run(Repository::count_notes).await
    }

    pub async fn bulk_delete(&self, ids: Vec<String>) -> Result<usize, StoreError> {
        self.run(move |repo| repo.bulk_delete(&ids)).await
    }
}

impl From<&Note> for NoteResponse {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id(),
            title: note.title().to_string(),
            content: note.content().to_string(),
            created_at: note.created_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::TestStore;

    fn service(env: &TestStore) -> NoteService {
        NoteService::new(Arc::clone(&env.repo))
    }

    fn create_request(title: &str, content: &str) -> CreateNoteRequest {
        CreateNoteRequest {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
        }
    }

    #[tokio::test]
    async fn create_then_get() {
        let env = TestStore::new();
        let service = service(&env);

        let created = service
            .create_note(create_request("Shopping", "milk, eggs"))
            .await
            .unwrap();
        let fetched = service.get_note(created.id()).await.unwrap().unwrap();

        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn create_rejects_missing_fields_without_storing() {
        let env = TestStore::new();
        let service = service(&env);

        let err = service
            .create_note(CreateNoteRequest {
                title: None,
                content: Some("body".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));

        let err = service
            .create_note(CreateNoteRequest {
                title: Some("Title".into()),
                content: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));

        assert_eq!(service.count_notes().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn partial_update_keeps_absent_fields() {
        let env = TestStore::new();
        let service = service(&env);
        let created = service
            .create_note(create_request("Shopping", "milk, eggs"))
            .await
            .unwrap();

        let updated = service
            .update_note(
                created.id(),
                UpdateNoteRequest {
                    title: Some("Groceries".into()),
                    content: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title(), "Groceries");
        assert_eq!(updated.content(), "milk, eggs");
        assert_eq!(updated.created_at(), created.created_at());

        let fetched = service.get_note(created.id()).await.unwrap().unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn partial_update_of_missing_note_is_not_found() {
        let env = TestStore::new();
        let service = service(&env);

        let err = service
            .update_note(
                999_999,
                UpdateNoteRequest {
                    title: Some("x".into()),
                    content: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound(999_999)));
    }

    #[tokio::test]
    async fn partial_update_with_invalid_title_changes_nothing() {
        let env = TestStore::new();
        let service = service(&env);
        let created = service
            .create_note(create_request("Keep", "body"))
            .await
            .unwrap();

        let err = service
            .update_note(
                created.id(),
                UpdateNoteRequest {
                    title: Some("   ".into()),
                    content: Some("changed".into()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidArgument(_)));
        let fetched = service.get_note(created.id()).await.unwrap().unwrap();
        assert_eq!(fetched.title(), "Keep");
        assert_eq!(fetched.content(), "body");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_partial_updates_keep_both_fields() {
        let env = TestStore::new();
        let service = Arc::new(service(&env));
        let created = service
            .create_note(create_request("T", "C"))
            .await
            .unwrap();
        let id = created.id();

        for round in 0..100 {
            let titles = Arc::clone(&service);
            let title = tokio::spawn(async move {
                titles
                    .update_note(
                        id,
                        UpdateNoteRequest {
                            title: Some(format!("T{round}")),
                            content: None,
                        },
                    )
                    .await
            });
            let contents = Arc::clone(&service);
            let content = tokio::spawn(async move {
                contents
                    .update_note(
                        id,
                        UpdateNoteRequest {
                            title: None,
                            content: Some(format!("C{round}")),
                        },
                    )
                    .await
            });
            title.await.unwrap().unwrap();
            content.await.unwrap().unwrap();

            let fetched = service.get_note(id).await.unwrap().unwrap();
            assert_eq!(fetched.title(), format!("T{round}"), "round {round}");
            assert_eq!(fetched.content(), format!("C{round}"), "round {round}");
        }
    }

    #[tokio::test]
    async fn search_and_bulk_delete() {
        let env = TestStore::new();
        let service = service(&env);
        for (title, content) in [("foo", "a"), ("bar", "foo"), ("baz", "c")] {
            service
                .create_note(create_request(title, content))
                .await
                .unwrap();
        }

        let hits = service.search_notes(Some("foo".into())).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(service.search_notes(None).await.unwrap().is_empty());

        let removed = service
            .bulk_delete(vec!["1".into(), "2".into(), "999999".into()])
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(service.count_notes().await.unwrap(), 1);
    }

    #[test]
    fn note_response_copies_all_fields() {
        let mut note = Note::new("Title", "Body").unwrap();
        note.set_id(4).unwrap();

        let response = NoteResponse::from(&note);

        assert_eq!(response.id, 4);
        assert_eq!(response.title, "Title");
        assert_eq!(response.content, "Body");
        assert_eq!(response.created_at, note.created_at());
    }
}
