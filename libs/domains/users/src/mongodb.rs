//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use database::mongodb::{is_duplicate_key_error, to_stored_document, uuid_bson};
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Role, RoleCounts, User, UserFilter};
use crate::repository::UserRepository;

const COLLECTION: &str = "users";

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<User>(COLLECTION),
        }
    }

    fn documents(&self) -> Collection<Document> {
        self.collection.clone_with_type::<Document>()
    }

    /// Unique email plus a role index for the admin listing
    #[instrument(skip(self))]
    pub async fn create_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("email_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder().keys(doc! { "role": 1 }).build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(collection = COLLECTION, "Indexes ensured");
        Ok(())
    }

    fn build_filter(filter: &UserFilter) -> Document {
        let mut doc = doc! {};

        if let Some(role) = filter.role {
            doc.insert("role", role.as_str());
        }

        if let Some(active) = filter.is_active {
            doc.insert("is_active", active);
        }

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = regex::escape(search);
            doc.insert(
                "$or",
                vec![
                    doc! { "name": { "$regex": &pattern, "$options": "i" } },
                    doc! { "email": { "$regex": &pattern, "$options": "i" } },
                ],
            );
        }

        doc
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: User) -> UserResult<User> {
        let document = to_stored_document(&user)?;

        match self.documents().insert_one(document).await {
            Ok(_) => {
                tracing::info!(role = %user.role, "User created");
                Ok(user)
            }
            Err(e) if is_duplicate_key_error(&e) => Err(UserError::DuplicateEmail(user.email)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .sort(doc! { "_id": -1 })
            .skip(filter.offset)
            .limit(filter.limit)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: UserFilter) -> UserResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::build_filter(&filter))
            .await?)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: User) -> UserResult<User> {
        let document = to_stored_document(&user)?;

        let result = match self
            .documents()
            .replace_one(doc! { "_id": uuid_bson(user.id) }, document)
            .await
        {
            Ok(result) => result,
            Err(e) if is_duplicate_key_error(&e) => {
                return Err(UserError::DuplicateEmail(user.email));
            }
            Err(e) => return Err(e.into()),
        };

        if result.matched_count == 0 {
            return Err(UserError::NotFound(user.id));
        }

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn count_by_role(&self) -> UserResult<RoleCounts> {
        let mut counts = RoleCounts::default();

        for role in Role::ALL {
            let count = self
                .collection
                .count_documents(doc! { "role": role.as_str() })
                .await?;
            counts.set(role, count);
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoUserRepository::build_filter(&UserFilter::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_role_and_status() {
        let doc = MongoUserRepository::build_filter(&UserFilter {
            role: Some(Role::StudentCoordinator),
            is_active: Some(false),
            ..Default::default()
        });
        assert_eq!(doc.get_str("role").unwrap(), "STUDENT_COORDINATOR");
        assert!(!doc.get_bool("is_active").unwrap());
    }

    #[test]
    fn test_build_filter_escapes_search() {
        let doc = MongoUserRepository::build_filter(&UserFilter {
            search: Some("a.b+".into()),
            ..Default::default()
        });
        let clauses = doc.get_array("$or").unwrap();
        let name = clauses[0].as_document().unwrap().get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), r"a\.b\+");
    }

    #[test]
    fn test_build_filter_ignores_blank_search() {
        let doc = MongoUserRepository::build_filter(&UserFilter {
            search: Some("   ".into()),
            ..Default::default()
        });
        assert!(!doc.contains_key("$or"));
    }

    mod integration {
        use super::*;
        use test_utils::{TestDataBuilder, TestMongo};

        #[tokio::test]
        #[ignore = "requires Docker"]
        async fn test_unique_email_and_round_trip() {
            let mongo = TestMongo::new().await;
            let data = TestDataBuilder::from_test_name("test_unique_email_and_round_trip");
            let repo = MongoUserRepository::new(&mongo.database());
            repo.create_indexes().await.unwrap();

            let email = data.email("ada");
            let user = User::new(email.clone(), "Ada".into(), "hash".into(), Role::Student);
            let id = user.id;
            repo.create(user.clone()).await.unwrap();

            let fetched = repo.get_by_id(id).await.unwrap().unwrap();
            assert_eq!(fetched.email, email);
            assert_eq!(fetched.role, Role::Student);

            let mut duplicate = user;
            duplicate.id = Uuid::now_v7();
            let result = repo.create(duplicate).await;
            assert!(matches!(result, Err(UserError::DuplicateEmail(_))));

            let counts = repo.count_by_role().await.unwrap();
            assert_eq!(counts.student, 1);
        }
    }
}
