use tracing::instrument;

use artistry_core::AppError;
use artistry_db::Store;
use artistry_models::{CourseStatus, CreatePaymentIntentDto, PaymentIntentResponse};

use crate::metrics::track_payment_intent;
use crate::modules::payments::gateway::PaymentGateway;
use crate::utils::tracing::ErrorExt;

pub struct PaymentService;

impl PaymentService {
    /// Opens a payment intent for an approved course. The amount is always
    /// the stored course price.
    #[instrument(skip(store, gateway))]
    pub async fn create_payment_intent(
        store: &dyn Store,
        gateway: &dyn PaymentGateway,
        currency: &str,
        dto: CreatePaymentIntentDto,
    ) -> Result<PaymentIntentResponse, AppError> {
        let course = store
            .find_course(dto.course_id)
            .await?
            .filter(|course| course.status == CourseStatus::Approved)
            .ok_or_else(|| AppError::not_found("Course not found"))?;

        if course.price_cents <= 0 {
            return Err(AppError::bad_request("Course is free; no payment is required"));
        }

        let intent = gateway
            .create_payment_intent(course.price_cents, currency)
            .await
            .log_error("create_payment_intent");
        track_payment_intent(intent.is_ok());

        let intent = intent.map_err(AppError::internal)?;

        Ok(PaymentIntentResponse {
            client_secret: intent.client_secret,
            payment_intent_id: intent.id,
            amount_cents: course.price_cents,
            currency: currency.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::payments::gateway::{PaymentError, PaymentIntent};
    use artistry_core::ErrorKind;
    use artistry_db::MemoryStore;
    use artistry_models::{CourseId, NewCourse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGateway {
        calls: Mutex<Vec<(i64, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn create_payment_intent(
            &self,
            amount_minor: i64,
            currency: &str,
        ) -> Result<PaymentIntent, PaymentError> {
            self.calls
                .lock()
                .unwrap()
                .push((amount_minor, currency.to_string()));
            if self.fail {
                return Err(PaymentError::Rejected {
                    status: 402,
                    message: "card declined".to_string(),
                });
            }
            Ok(PaymentIntent {
                id: "pi_test".to_string(),
                client_secret: "pi_test_secret".to_string(),
            })
        }
    }

    async fn approved_course(store: &MemoryStore, price_cents: i64) -> CourseId {
        let course = store
            .insert_course(&NewCourse {
                title: "Ceramics".to_string(),
                description: None,
                image_url: None,
                instructor_email: "i@x.io".to_string(),
                instructor_name: None,
                price_cents,
                seats: 4,
            })
            .await
            .unwrap();
        store
            .transition_course_status(course.id, CourseStatus::Pending, CourseStatus::Approved)
            .await
            .unwrap();
        course.id
    }

    #[tokio::test]
    async fn test_amount_comes_from_course_price() {
        let store = MemoryStore::new();
        let gateway = RecordingGateway::default();
        let course_id = approved_course(&store, 7500).await;

        let response = PaymentService::create_payment_intent(
            &store,
            &gateway,
            "usd",
            CreatePaymentIntentDto { course_id },
        )
        .await
        .unwrap();

        assert_eq!(response.client_secret, "pi_test_secret");
        assert_eq!(response.amount_cents, 7500);
        assert_eq!(
            *gateway.calls.lock().unwrap(),
            vec![(7500, "usd".to_string())]
        );
    }

    #[tokio::test]
    async fn test_processor_failure_is_internal() {
        let store = MemoryStore::new();
        let gateway = RecordingGateway {
            fail: true,
            ..Default::default()
        };
        let course_id = approved_course(&store, 7500).await;

        let err = PaymentService::create_payment_intent(
            &store,
            &gateway,
            "usd",
            CreatePaymentIntentDto { course_id },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InternalError);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[tokio::test]
    async fn test_unknown_course_never_reaches_processor() {
        let store = MemoryStore::new();
        let gateway = RecordingGateway::default();

        let err = PaymentService::create_payment_intent(
            &store,
            &gateway,
            "usd",
            CreatePaymentIntentDto {
                course_id: CourseId::new(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(gateway.calls.lock().unwrap().is_empty());
    }
}
