#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tutorme::models::{GradeRef, SubjectRef, TutorRef};
use tutorme::services::email::{EmailBody, EmailError, EmailService};
use tutorme::store::{InMemoryTutorRequestStore, TutorRequestStore};

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // `test_log` may already have installed a subscriber.
        let _ = tracing_subscriber::fmt()
            .with_env_filter("tutorme=debug")
            .with_test_writer()
            .try_init();
    });
}

/// A mock email service that stores sent emails for testing purposes.
/// This is ideal for integration tests as it doesn't produce console output.
#[derive(Debug, Default)]
pub struct MockEmailer {
    sent_emails: Mutex<Vec<SentEmail>>,
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub body: EmailBody,
}

impl MockEmailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all sent emails for testing verification
    pub fn get_sent_emails(&self) -> Vec<SentEmail> {
        self.sent_emails.lock().unwrap().clone()
    }

    /// Get the count of sent emails
    pub fn sent_count(&self) -> usize {
        self.sent_emails.lock().unwrap().len()
    }

    /// Get the last sent email
    pub fn last_sent_email(&self) -> Option<SentEmail> {
        self.sent_emails.lock().unwrap().last().cloned()
    }

    /// Acknowledgements are sent from a background task, so poll for them.
    pub async fn wait_for(&self, expected: usize) -> usize {
        for _ in 0..50 {
            if self.sent_count() >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.sent_count()
    }
}

#[async_trait]
impl EmailService for MockEmailer {
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &EmailBody,
    ) -> Result<(), EmailError> {
        let email = SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.clone(),
        };

        self.sent_emails.lock().unwrap().push(email);
        Ok(())
    }
}

/// Transport that rejects every message.
#[derive(Debug, Default)]
pub struct FailingEmailer;

#[async_trait]
impl EmailService for FailingEmailer {
    async fn send_email(&self, _: &str, _: &str, _: &EmailBody) -> Result<(), EmailError> {
        Err(EmailError::SendFailed("SMTP server unavailable".into()))
    }
}

/// Catalog entries seeded into the store behind a spawned app.
pub struct Catalog {
    pub grade: GradeRef,
    pub maths: SubjectRef,
    pub science: SubjectRef,
    pub tutor: TutorRef,
}

pub struct TestApp {
    pub address: String,
    pub catalog: Catalog,
    pub store: Arc<InMemoryTutorRequestStore>,
}

impl TestApp {
    /// A valid create payload referencing the seeded catalog.
    pub fn tutor_request_payload(&self) -> Value {
        json!({
            "name": "Nimal Perera",
            "email": "nimal@example.com",
            "phoneNumber": "077 123 4567",
            "district": "Colombo",
            "city": "Nugegoda",
            "medium": "English",
            "grade": [self.catalog.grade.id],
            "tutors": [
                {
                    "subjects": [self.catalog.maths.id],
                    "duration": "2 hours",
                    "frequency": "Weekly",
                    "preferredTutorType": "Graduate"
                },
                {
                    "subjects": [self.catalog.science.id, self.catalog.maths.id],
                    "duration": "1 hour",
                    "frequency": "Twice a week",
                    "preferredTutorType": "Undergraduate"
                }
            ]
        })
    }
}

/// Spawns the application backed by an in-memory store and returns it
/// together with the given email transport.
///
/// Returned address format: `http://127.0.0.1:8492`
pub async fn spawn_app_with(email_service: Arc<dyn EmailService>) -> TestApp {
    init_tracing_once();

    let store = Arc::new(InMemoryTutorRequestStore::new());
    let catalog = Catalog {
        grade: store.insert_grade("Grade 11"),
        maths: store.insert_subject("Mathematics"),
        science: store.insert_subject("Science"),
        tutor: store.insert_tutor("Kamal Silva", "kamal@example.com"),
    };

    // Randomly choose an available port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    let app_store: Arc<dyn TutorRequestStore> = store.clone();
    tokio::spawn(async move {
        let app = tutorme::app_with_services(app_store, email_service);
        axum::serve(listener, app).await.unwrap();
    });

    let address = format!("http://127.0.0.1:{port}");

    // Wait for server to be ready
    let client = reqwest::Client::new();
    for _ in 0..10 {
        if client
            .get(format!("{address}/health-check"))
            .send()
            .await
            .is_ok()
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    TestApp {
        address,
        catalog,
        store,
    }
}

/// Spawns the application with a [`MockEmailer`].
pub async fn spawn_app() -> (TestApp, Arc<MockEmailer>) {
    let mock_emailer = Arc::new(MockEmailer::new());
    let app = spawn_app_with(mock_emailer.clone()).await;
    (app, mock_emailer)
}

/// Creates a tutor request through the API and returns the response body.
pub async fn create_tutor_request(client: &reqwest::Client, app: &TestApp, payload: &Value) -> Value {
    let response = client
        .post(format!("{}/api/request-tutor", app.address))
        .json(payload)
        .send()
        .await
        .expect("Failed to create tutor request");

    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}
