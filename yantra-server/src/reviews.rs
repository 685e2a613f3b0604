//! Review submission rules
//!
//! Signed-in reviewers are trusted and published immediately. Guests must
//! leave a name and a valid email, and their reviews wait for moderation.

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use shared::models::{Review, ReviewCreate, UserUpsert};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::SessionIdentity;
use crate::db;
use crate::error::{BoxError, ServiceResult};
use crate::orders::user_from_session;

/// Review ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub content_item_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub image_url: Option<String>,
    pub user_id: Option<Uuid>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub is_approved: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Turn a submission into a review for a registered user (`Some(user_id)`)
/// or a guest (`None`).
///
/// A signed-in user may still ask to post as a guest with `isGuestReview`.
pub fn prepare_review(input: ReviewCreate, user_id: Option<Uuid>) -> Result<NewReview, AppError> {
    if !(1..=5).contains(&input.rating) {
        return Err(AppError::new(ErrorCode::RatingOutOfRange)
            .with_detail("rating", input.rating));
    }
    input.validate()?;

    let comment = non_blank(input.comment);
    let image_url = non_blank(input.image_url);

    match user_id.filter(|_| !input.is_guest_review) {
        Some(user_id) => Ok(NewReview {
            content_item_id: input.product_id,
            rating: input.rating,
            comment,
            image_url,
            user_id: Some(user_id),
            guest_name: None,
            guest_email: None,
            is_approved: true,
        }),
        None => {
            let (Some(guest_name), Some(guest_email)) =
                (non_blank(input.guest_name), non_blank(input.guest_email))
            else {
                return Err(AppError::new(ErrorCode::GuestIdentityRequired));
            };
            Ok(NewReview {
                content_item_id: input.product_id,
                rating: input.rating,
                comment,
                image_url,
                user_id: None,
                guest_name: Some(guest_name),
                guest_email: Some(guest_email.to_lowercase()),
                is_approved: false,
            })
        }
    }
}

/// Review storage seam
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn product_exists(&self, id: Uuid) -> Result<bool, BoxError>;

    /// Create or refresh the local user record, returning its id
    async fn upsert_user(&self, user: &UserUpsert) -> ServiceResult<Uuid>;

    async fn insert_review(&self, review: &NewReview) -> Result<Review, BoxError>;
}

#[async_trait]
impl ReviewStore for PgPool {
    async fn product_exists(&self, id: Uuid) -> Result<bool, BoxError> {
        db::content::exists(self, id).await
    }

    async fn upsert_user(&self, user: &UserUpsert) -> ServiceResult<Uuid> {
        Ok(db::users::upsert(self, user).await?.id)
    }

    async fn insert_review(&self, review: &NewReview) -> Result<Review, BoxError> {
        db::reviews::insert(self, review).await
    }
}

/// Submit a review as the session user, or as a guest without one
pub async fn submit_review<S>(
    store: &S,
    session: Option<&SessionIdentity>,
    input: ReviewCreate,
) -> ServiceResult<Review>
where
    S: ReviewStore + ?Sized,
{
    let wants_user = session.is_some() && !input.is_guest_review;

    // Reject bad input before touching storage
    prepare_review(input.clone(), wants_user.then(Uuid::nil))?;

    if !store.product_exists(input.product_id).await? {
        return Err(AppError::new(ErrorCode::ProductNotFound)
            .with_detail("productId", input.product_id.to_string())
            .into());
    }

    let user_id = match session.filter(|_| wants_user) {
        Some(identity) => Some(store.upsert_user(&user_from_session(identity)?).await?),
        None => None,
    };

    let review = prepare_review(input, user_id)?;
    let created = store.insert_review(&review).await?;
    tracing::info!(
        review_id = %created.id,
        product_id = %created.content_item_id,
        approved = created.is_approved,
        "Review submitted"
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::MemoryCatalog;

    fn submission(rating: i32) -> ReviewCreate {
        ReviewCreate {
            product_id: Uuid::new_v4(),
            rating,
            comment: Some("  Powerful yantra  ".into()),
            image_url: None,
            guest_name: None,
            guest_email: None,
            is_guest_review: false,
        }
    }

    const SCHEMA: &str = include_str!("../migrations/20250101000000_init.sql");

    /// Mirror of the `reviews_author` table constraint
    fn single_author(review: &NewReview) -> bool {
        match review.user_id {
            Some(_) => review.guest_name.is_none() && review.guest_email.is_none(),
            None => review.guest_name.is_some() && review.guest_email.is_some(),
        }
    }

    fn guest(mut input: ReviewCreate) -> ReviewCreate {
        input.guest_name = Some("Ravi".into());
        input.guest_email = Some("ravi@example.com".into());
        input
    }

    fn session() -> SessionIdentity {
        SessionIdentity {
            external_id: "user_2abc".into(),
            email: Some("asha@example.com".into()),
            name: Some("Asha Rao".into()),
            is_admin: false,
        }
    }

    #[test]
    fn prepared_reviews_have_exactly_one_author() {
        assert!(SCHEMA.contains("CONSTRAINT reviews_author CHECK"));

        let user = Uuid::new_v4();
        let cases = [
            (submission(5), Some(user)),
            (guest(submission(5)), Some(user)),
            (guest(submission(4)), None),
            (
                ReviewCreate {
                    is_guest_review: true,
                    ..guest(submission(3))
                },
                Some(user),
            ),
        ];
        for (input, user_id) in cases {
            let review = prepare_review(input, user_id).unwrap();
            assert!(single_author(&review), "{review:?}");
        }
    }

    #[test]
    fn registered_reviews_are_auto_approved() {
        let user = Uuid::new_v4();
        let review = prepare_review(submission(5), Some(user)).unwrap();
        assert!(review.is_approved);
        assert_eq!(review.user_id, Some(user));
        assert_eq!(review.comment.as_deref(), Some("Powerful yantra"));
        assert!(review.guest_email.is_none());
    }

    #[test]
    fn guest_reviews_need_name_and_email_and_wait_for_approval() {
        let err = prepare_review(submission(4), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::GuestIdentityRequired);

        let mut input = submission(4);
        input.guest_name = Some("Ravi".into());
        input.guest_email = Some("   ".into());
        let err = prepare_review(input, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::GuestIdentityRequired);

        let mut input = submission(4);
        input.guest_name = Some("Ravi".into());
        input.guest_email = Some("Ravi@Example.com".into());
        let review = prepare_review(input, None).unwrap();
        assert!(!review.is_approved);
        assert_eq!(review.user_id, None);
        assert_eq!(review.guest_email.as_deref(), Some("ravi@example.com"));
    }

    #[test]
    fn signed_in_user_can_post_as_guest() {
        let mut input = submission(3);
        input.is_guest_review = true;
        input.guest_name = Some("Anonymous devotee".into());
        input.guest_email = Some("anon@example.com".into());
        let review = prepare_review(input, Some(Uuid::new_v4())).unwrap();
        assert_eq!(review.user_id, None);
        assert!(!review.is_approved);
    }

    #[test]
    fn rating_and_email_are_validated() {
        for rating in [0, 6, -1] {
            let err = prepare_review(submission(rating), Some(Uuid::new_v4())).unwrap_err();
            assert_eq!(err.code, ErrorCode::RatingOutOfRange);
        }

        let mut input = submission(5);
        input.guest_name = Some("Ravi".into());
        input.guest_email = Some("not-an-email".into());
        let err = prepare_review(input, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn guest_review_is_stored_pending() {
        let catalog = MemoryCatalog::default();
        let product = catalog.add_item("sri-yantra", 600, &[], "In Stock");

        let input = ReviewCreate {
            product_id: product,
            ..guest(submission(5))
        };
        let review = submit_review(&catalog, None, input).await.unwrap();
        assert!(!review.is_approved);
        assert_eq!(review.user_id, None);
        assert_eq!(review.guest_name.as_deref(), Some("Ravi"));
        assert_eq!(catalog.reviews().len(), 1);
    }

    #[tokio::test]
    async fn guest_review_without_identity_writes_nothing() {
        let catalog = MemoryCatalog::default();
        let product = catalog.add_item("sri-yantra", 600, &[], "In Stock");

        let input = ReviewCreate {
            product_id: product,
            is_guest_review: true,
            ..submission(5)
        };
        let err = submit_review(&catalog, Some(&session()), input)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::GuestIdentityRequired));
        assert!(catalog.reviews().is_empty());
        assert!(catalog.users().is_empty());
    }

    #[tokio::test]
    async fn session_review_is_published_under_the_user() {
        let catalog = MemoryCatalog::default();
        let product = catalog.add_item("sri-yantra", 600, &[], "In Stock");

        let input = ReviewCreate {
            product_id: product,
            ..submission(4)
        };
        let review = submit_review(&catalog, Some(&session()), input)
            .await
            .unwrap();
        assert!(review.is_approved);
        assert!(review.user_id.is_some());
        assert_eq!(catalog.users(), vec!["user_2abc".to_string()]);
    }

    #[tokio::test]
    async fn review_of_unknown_product_is_not_found() {
        let catalog = MemoryCatalog::default();
        let err = submit_review(&catalog, None, guest(submission(5)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ProductNotFound));
        assert!(catalog.reviews().is_empty());
    }
}
