//! Visit CRUD service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::visit::{Visit, VisitPayload},
    repository::VisitsStore,
    validation::validate_visit,
};

pub const VISIT_NOT_FOUND: &str = "Visit not found";

#[derive(Clone)]
pub struct VisitsService {
    store: Arc<dyn VisitsStore>,
}

impl VisitsService {
    pub fn new(store: Arc<dyn VisitsStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Visit>> {
        self.store.list().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Visit> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(VISIT_NOT_FOUND.to_string()))
    }

    /// Validate the whole payload and store a new visit
    pub async fn create(&self, payload: &VisitPayload) -> AppResult<Visit> {
        let visit = validate_visit(payload).map_err(AppError::Validation)?;
        let created = self.store.insert(&visit, None).await?;
        tracing::debug!("Visit {} created", created.id);
        Ok(created)
    }

    /// Replace all four business fields of an existing visit.
    ///
    /// Existence is checked before the payload, so an unknown id is always
    /// a not-found whatever the body contains.
    pub async fn update(&self, id: i64, payload: &VisitPayload) -> AppResult<Visit> {
        self.get_by_id(id).await?;
        let visit = validate_visit(payload).map_err(AppError::Validation)?;
        self.store
            .update(id, &visit)
            .await?
            .ok_or_else(|| AppError::NotFound(VISIT_NOT_FOUND.to_string()))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(VISIT_NOT_FOUND.to_string()));
        }
        tracing::debug!("Visit {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::visit::NewVisit, repository::MockVisitsStore};
    use chrono::Utc;
    use mockall::predicate::eq;
    use serde_json::json;

    fn stored(id: i64, visit: &NewVisit, user_id: Option<i64>) -> Visit {
        Visit {
            id,
            user_id,
            name: visit.name.clone(),
            email: visit.email.clone(),
            latitude: visit.latitude,
            longitude: visit.longitude,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payload(value: serde_json::Value) -> VisitPayload {
        serde_json::from_value(value).unwrap()
    }

    fn alice() -> VisitPayload {
        payload(json!({"name": "Alice", "email": "a@b.com", "latitude": 10, "longitude": 20}))
    }

    #[tokio::test]
    async fn test_create_stores_validated_fields() {
        let mut store = MockVisitsStore::new();
        store
            .expect_insert()
            .withf(|v, user| v.name == "Alice" && v.email == "a@b.com" && user.is_none())
            .times(1)
            .returning(|v, user| Ok(stored(1, v, user)));

        let service = VisitsService::new(Arc::new(store));
        let visit = service.create(&alice()).await.unwrap();

        assert_eq!(visit.id, 1);
        assert_eq!(visit.latitude, 10.0);
        assert_eq!(visit.longitude, 20.0);
    }

    #[tokio::test]
    async fn test_create_rejects_without_touching_store() {
        let mut store = MockVisitsStore::new();
        store.expect_insert().never();

        let service = VisitsService::new(Arc::new(store));
        let err = service
            .create(&payload(json!({"name": "Al", "email": "bad-email", "latitude": 95, "longitude": 20})))
            .await
            .unwrap_err();

        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name", "email", "latitude"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let mut store = MockVisitsStore::new();
        store.expect_find().with(eq(42)).returning(|_| Ok(None));

        let service = VisitsService::new(Arc::new(store));
        assert!(matches!(service.get_by_id(42).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found_even_with_bad_payload() {
        let mut store = MockVisitsStore::new();
        store.expect_find().returning(|_| Ok(None));
        store.expect_update().never();

        let service = VisitsService::new(Arc::new(store));
        let err = service.update(9, &VisitPayload::default()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.update(9, &alice()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_requires_every_field() {
        let mut store = MockVisitsStore::new();
        let existing = stored(
            3,
            &NewVisit {
                name: "Old".into(),
                email: "old@b.com".into(),
                latitude: 0.0,
                longitude: 0.0,
            },
            None,
        );
        store.expect_find().returning(move |_| Ok(Some(existing.clone())));
        store.expect_update().never();

        let service = VisitsService::new(Arc::new(store));
        let err = service
            .update(3, &payload(json!({"name": "Only the name"})))
            .await
            .unwrap_err();

        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email", "latitude", "longitude"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let mut store = MockVisitsStore::new();
        let existing = stored(
            3,
            &NewVisit {
                name: "Old".into(),
                email: "old@b.com".into(),
                latitude: 0.0,
                longitude: 0.0,
            },
            Some(5),
        );
        store.expect_find().returning(move |_| Ok(Some(existing.clone())));
        store
            .expect_update()
            .withf(|id, v| *id == 3 && v.name == "Alice")
            .times(1)
            .returning(|id, v| Ok(Some(stored(id, v, Some(5)))));

        let service = VisitsService::new(Arc::new(store));
        let visit = service.update(3, &alice()).await.unwrap();
        assert_eq!(visit.name, "Alice");
        assert_eq!(visit.email, "a@b.com");
        assert_eq!(visit.user_id, Some(5));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let mut store = MockVisitsStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_delete()
            .with(eq(4))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        store
            .expect_delete()
            .with(eq(4))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));

        let service = VisitsService::new(Arc::new(store));
        assert!(service.delete(4).await.is_ok());
        assert!(matches!(service.delete(4).await, Err(AppError::NotFound(_))));
    }
}
